use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use stitch_core::{ColorRaster, Correspondence};

use crate::io::to_rgb_image;
use crate::{PanoramaError, PanoramaResult};

const PALETTE: [Rgb<u8>; 6] = [
    Rgb([255, 0, 0]),
    Rgb([0, 255, 0]),
    Rgb([0, 128, 255]),
    Rgb([255, 255, 0]),
    Rgb([255, 0, 255]),
    Rgb([0, 255, 255]),
];

/// `from` and `to` side by side with each correspondence circled and joined
pub fn draw_matches(from: &ColorRaster, to: &ColorRaster, matches: &[Correspondence]) -> RgbImage {
    let left = to_rgb_image(from);
    let right = to_rgb_image(to);
    let x_shift = left.width();

    let mut canvas = RgbImage::new(left.width() + right.width(), left.height().max(right.height()));
    image::imageops::replace(&mut canvas, &left, 0, 0);
    image::imageops::replace(&mut canvas, &right, x_shift as i64, 0);

    for (i, m) in matches.iter().enumerate() {
        let colour = PALETTE[i % PALETTE.len()];
        let a = (m.from.x as f32, m.from.y as f32);
        let b = (m.to.x as f32 + x_shift as f32, m.to.y as f32);

        draw_hollow_circle_mut(&mut canvas, (a.0 as i32, a.1 as i32), 4, colour);
        draw_hollow_circle_mut(&mut canvas, (b.0 as i32, b.1 as i32), 4, colour);
        draw_line_segment_mut(&mut canvas, a, b, colour);
    }
    canvas
}

/// Write the match image for image `index` and its left neighbour into `dir`
pub fn save_matches<P: AsRef<Path>>(
    dir: P,
    index: usize,
    from: &ColorRaster,
    to: &ColorRaster,
    matches: &[Correspondence],
) -> PanoramaResult<PathBuf> {
    let path = dir
        .as_ref()
        .join(format!("matches_{:03}_{:03}.png", index.saturating_sub(1), index));
    draw_matches(from, to, matches)
        .save(&path)
        .map_err(|source| PanoramaError::WriteFailure {
            path: path.clone(),
            source,
        })?;
    log::debug!("Saved {} matches to {}", matches.len(), path.display());
    Ok(path)
}
