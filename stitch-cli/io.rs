use std::path::Path;

use image::{Rgb, RgbImage};
use stitch_core::{AlphaRaster, ColorRaster, Raster};

use crate::{PanoramaError, PanoramaResult};

/// Decode an image file into an RGB raster
pub fn load_image<P: AsRef<Path>>(path: P) -> PanoramaResult<ColorRaster> {
    let path = path.as_ref();
    let rgb = image::open(path)
        .map_err(|source| PanoramaError::LoadFailure {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();

    let (w, h) = rgb.dimensions();
    log::debug!("Loaded {} ({}x{})", path.display(), w, h);
    Ok(Raster::from_vec(w as usize, h as usize, rgb.pixels().map(|p| p.0).collect())?)
}

/// Load every path in order; the first failure aborts the sequence
pub fn load_sequence<P: AsRef<Path>>(paths: &[P]) -> PanoramaResult<Vec<ColorRaster>> {
    if paths.is_empty() {
        return Err(PanoramaError::EmptySequence);
    }
    paths.iter().map(load_image).collect()
}

pub fn to_rgb_image(raster: &ColorRaster) -> RgbImage {
    RgbImage::from_fn(raster.width() as u32, raster.height() as u32, |x, y| {
        Rgb(raster.get(x as usize, y as usize))
    })
}

/// Encode `raster`; the format follows the file extension
pub fn save_image<P: AsRef<Path>>(raster: &ColorRaster, path: P) -> PanoramaResult<()> {
    let path = path.as_ref();
    to_rgb_image(raster)
        .save(path)
        .map_err(|source| PanoramaError::WriteFailure {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Saved {}x{} image to {}", raster.width(), raster.height(), path.display());
    Ok(())
}

/// Alpha raster scaled to 8-bit grey
pub fn alpha_to_image(alpha: &AlphaRaster) -> image::GrayImage {
    image::GrayImage::from_fn(alpha.width() as u32, alpha.height() as u32, |x, y| {
        let a = alpha.get(x as usize, y as usize);
        image::Luma([(a.clamp(0.0, 1.0) * 255.0).round() as u8])
    })
}

/// Write the canvas alpha as a greyscale image
pub fn save_alpha<P: AsRef<Path>>(alpha: &AlphaRaster, path: P) -> PanoramaResult<()> {
    let path = path.as_ref();
    alpha_to_image(alpha)
        .save(path)
        .map_err(|source| PanoramaError::WriteFailure {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Saved {}x{} alpha coverage to {}", alpha.width(), alpha.height(), path.display());
    Ok(())
}
