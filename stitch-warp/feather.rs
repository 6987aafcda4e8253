use rayon::prelude::*;
use stitch_core::{AlphaRaster, Pixel, Raster, StitchError, StitchResult};

/// Linear edge feathering.
///
/// A pixel's weight is its distance to the nearest border divided by half
/// the shorter image side. Distances count `y + 1` from the top and
/// `height - y - 1` from the bottom (likewise for columns), so the top and
/// left ring sit at `1 / max_distance` while the bottom and right ring are 0.
pub struct FeatherMaskBuilder;

impl FeatherMaskBuilder {
    /// Feather mask for a `width` x `height` image
    pub fn build(width: usize, height: usize) -> StitchResult<AlphaRaster> {
        let mut mask = Raster::new(width, height);
        Self::fill(&mut mask)?;
        Ok(mask)
    }

    /// Mask sized after `image`
    pub fn for_image<T: Pixel>(image: &Raster<T>) -> StitchResult<AlphaRaster> {
        Self::build(image.width(), image.height())
    }

    /// Overwrite `mask` with the feather weights of `image`.
    ///
    /// Fails with `DimensionMismatch` if the two differ in size.
    pub fn build_into<T: Pixel>(image: &Raster<T>, mask: &mut AlphaRaster) -> StitchResult<()> {
        image.ensure_same_dimensions(mask)?;
        Self::fill(mask)
    }

    fn fill(mask: &mut AlphaRaster) -> StitchResult<()> {
        let (width, height) = mask.dimensions();
        let max_distance = width.min(height) / 2;
        if max_distance == 0 {
            return Err(StitchError::DegenerateDimensions { width, height });
        }
        let max_distance = max_distance as f64;

        mask.data_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let y_distance = edge_distance(y, height);
                for (x, value) in row.iter_mut().enumerate() {
                    *value = edge_distance(x, width).min(y_distance) as f64 / max_distance;
                }
            });
        Ok(())
    }
}

/// Distance of index `i` to the nearer end of `0..len`
fn edge_distance(i: usize, len: usize) -> usize {
    (i + 1).min(len - i - 1)
}
