use rayon::prelude::*;
use stitch_core::{AlphaRaster, ColorRaster, Pixel, Rgb, StitchResult};

/// What happened to the canvas during one composite call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeStats {
    /// Pixels where both images had content and were blended
    pub blended: usize,
    /// Background canvas pixels that received the new image
    pub copied: usize,
    /// Canvas pixels with content that the new image did not cover
    pub kept: usize,
}

impl std::ops::Add for CompositeStats {
    type Output = CompositeStats;

    fn add(self, rhs: CompositeStats) -> CompositeStats {
        CompositeStats {
            blended: self.blended + rhs.blended,
            copied: self.copied + rhs.copied,
            kept: self.kept + rhs.kept,
        }
    }
}

/// Alpha-weighted merge of a warped image into the running canvas.
///
/// Where both have content the result is
/// `(a_new * new + a_canvas * canvas) / (a_new + a_canvas)` per channel and the
/// canvas alpha becomes the larger of the two weights. Background canvas
/// pixels take the new pixel and its alpha as is. Everything else is left alone.
pub struct AlphaCompositor;

impl AlphaCompositor {
    pub fn composite(
        new_image: &ColorRaster,
        new_mask: &AlphaRaster,
        canvas: &mut ColorRaster,
        canvas_mask: &mut AlphaRaster,
    ) -> StitchResult<CompositeStats> {
        canvas.ensure_same_dimensions(new_image)?;
        canvas.ensure_same_dimensions(new_mask)?;
        canvas.ensure_same_dimensions(canvas_mask)?;

        let width = canvas.width();
        if canvas.is_empty() {
            return Ok(CompositeStats::default());
        }

        let stats = canvas
            .data_mut()
            .par_chunks_mut(width)
            .zip(canvas_mask.data_mut().par_chunks_mut(width))
            .zip(new_image.data().par_chunks(width))
            .zip(new_mask.data().par_chunks(width))
            .map(|(((canvas_row, alpha_row), new_row), new_alpha_row)| {
                let mut stats = CompositeStats::default();
                for x in 0..width {
                    let (new, a_new) = (new_row[x], new_alpha_row[x]);
                    let (old, a_old) = (canvas_row[x], alpha_row[x]);

                    match (new.is_background(), old.is_background()) {
                        (false, false) => {
                            canvas_row[x] = blend(new, a_new, old, a_old);
                            alpha_row[x] = a_new.max(a_old);
                            stats.blended += 1;
                        }
                        (false, true) => {
                            canvas_row[x] = new;
                            alpha_row[x] = a_new;
                            stats.copied += 1;
                        }
                        (true, false) => stats.kept += 1,
                        (true, true) => {}
                    }
                }
                stats
            })
            .reduce(CompositeStats::default, |a, b| a + b);

        Ok(stats)
    }
}

/// Weighted mean of two colours; equal weights when both alphas are zero
fn blend(new: Rgb, a_new: f64, old: Rgb, a_old: f64) -> Rgb {
    let total = a_new + a_old;
    let t = if total > 0.0 { a_new / total } else { 0.5 };
    old.lerp(new, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::{Raster, StitchError};

    #[test]
    fn test_equal_alpha_gives_mean() {
        let new: ColorRaster = Raster::filled(4, 3, [100, 20, 255]);
        let new_mask: AlphaRaster = Raster::filled(4, 3, 0.5);
        let mut canvas: ColorRaster = Raster::filled(4, 3, [200, 40, 1]);
        let mut canvas_mask: AlphaRaster = Raster::filled(4, 3, 0.5);

        let stats = AlphaCompositor::composite(&new, &new_mask, &mut canvas, &mut canvas_mask).unwrap();

        assert_eq!(stats, CompositeStats { blended: 12, copied: 0, kept: 0 });
        assert!(canvas.data().iter().all(|&p| p == [150, 30, 128]));
        assert!(canvas_mask.data().iter().all(|&a| a == 0.5));
    }

    #[test]
    fn test_weights_favour_stronger_alpha() {
        let new: ColorRaster = Raster::filled(1, 1, [200, 200, 200]);
        let new_mask: AlphaRaster = Raster::filled(1, 1, 0.75);
        let mut canvas: ColorRaster = Raster::filled(1, 1, [100, 100, 100]);
        let mut canvas_mask: AlphaRaster = Raster::filled(1, 1, 0.25);

        AlphaCompositor::composite(&new, &new_mask, &mut canvas, &mut canvas_mask).unwrap();
        assert_eq!(canvas.get(0, 0), [175, 175, 175]);
        assert_eq!(canvas_mask.get(0, 0), 0.75);
    }

    #[test]
    fn test_zero_alpha_falls_back_to_mean() {
        let new: ColorRaster = Raster::filled(1, 1, [10, 10, 10]);
        let new_mask: AlphaRaster = Raster::new(1, 1);
        let mut canvas: ColorRaster = Raster::filled(1, 1, [30, 30, 30]);
        let mut canvas_mask: AlphaRaster = Raster::new(1, 1);

        AlphaCompositor::composite(&new, &new_mask, &mut canvas, &mut canvas_mask).unwrap();
        assert_eq!(canvas.get(0, 0), [20, 20, 20]);
    }

    #[test]
    fn test_empty_canvas_copies_verbatim() {
        let new: ColorRaster = Raster::from_fn(6, 5, |x, y| [x as u8 + 1, y as u8 + 1, 9]);
        let new_mask: AlphaRaster = Raster::from_fn(6, 5, |x, _| x as f64 / 10.0);
        let mut canvas: ColorRaster = Raster::new(6, 5);
        let mut canvas_mask: AlphaRaster = Raster::new(6, 5);

        let stats = AlphaCompositor::composite(&new, &new_mask, &mut canvas, &mut canvas_mask).unwrap();

        assert_eq!(stats.copied, 30);
        assert_eq!(canvas, new);
        assert_eq!(canvas_mask, new_mask);
    }

    #[test]
    fn test_background_in_new_image_keeps_canvas() {
        let mut new: ColorRaster = Raster::new(3, 1);
        new.set(2, 0, [50, 50, 50]);
        let new_mask: AlphaRaster = Raster::filled(3, 1, 1.0);
        let mut canvas: ColorRaster = Raster::new(3, 1);
        canvas.set(0, 0, [7, 7, 7]);
        let mut canvas_mask: AlphaRaster = Raster::filled(3, 1, 0.3);

        let stats = AlphaCompositor::composite(&new, &new_mask, &mut canvas, &mut canvas_mask).unwrap();

        assert_eq!(stats, CompositeStats { blended: 0, copied: 1, kept: 1 });
        assert_eq!(canvas.data(), &[[7, 7, 7], [0, 0, 0], [50, 50, 50]]);
        assert_eq!(canvas_mask.data(), &[0.3, 0.3, 1.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let new: ColorRaster = Raster::new(4, 4);
        let new_mask: AlphaRaster = Raster::new(4, 3);
        let mut canvas: ColorRaster = Raster::new(4, 4);
        let mut canvas_mask: AlphaRaster = Raster::new(4, 4);

        let err = AlphaCompositor::composite(&new, &new_mask, &mut canvas, &mut canvas_mask).unwrap_err();
        assert_eq!(
            err,
            StitchError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 3),
            }
        );
    }
}
