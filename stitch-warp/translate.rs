use rayon::prelude::*;
use stitch_core::{Pixel, Raster, Translation};

/// Place `src` into a `width` x `height` frame shifted by `offset`.
///
/// Output pixel `(x, y)` samples the source at `(x - dx, y - dy)` with
/// bilinear interpolation; samples outside the source count as background.
/// Integer offsets reproduce the source exactly. Anything shifted past the
/// frame is clipped.
pub fn translate<T: Pixel>(src: &Raster<T>, offset: Translation, width: usize, height: usize) -> Raster<T> {
    let mut output = Raster::new(width, height);
    if output.is_empty() || src.is_empty() {
        return output;
    }

    // the fractional part is shared by every output pixel
    let base_x = (-offset.dx).floor();
    let base_y = (-offset.dy).floor();
    let fx = -offset.dx - base_x;
    let fy = -offset.dy - base_y;
    let (base_x, base_y) = (base_x as i64, base_y as i64);

    let sample = |x: i64, y: i64| src.get_checked(x, y).unwrap_or_default();

    output
        .data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = y as i64 + base_y;
            if sy < -1 || sy >= src.height() as i64 {
                return;
            }
            for (x, out) in row.iter_mut().enumerate() {
                let sx = x as i64 + base_x;
                if sx < -1 || sx >= src.width() as i64 {
                    continue;
                }
                *out = if fx == 0.0 && fy == 0.0 {
                    sample(sx, sy)
                } else {
                    let top = sample(sx, sy).lerp(sample(sx + 1, sy), fx);
                    let bottom = sample(sx, sy + 1).lerp(sample(sx + 1, sy + 1), fx);
                    top.lerp(bottom, fy)
                };
            }
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::{AlphaRaster, ColorRaster};

    fn gradient(width: usize, height: usize) -> ColorRaster {
        Raster::from_fn(width, height, |x, y| [(x * 10 + 5) as u8, (y * 10 + 5) as u8, 100])
    }

    #[test]
    fn test_integer_offset_is_exact() {
        let src = gradient(10, 8);
        let out = translate(&src, Translation::new(5.0, 3.0), 30, 20);

        assert_eq!(out.dimensions(), (30, 20));
        for y in 0..8 {
            for x in 0..10 {
                assert_eq!(out.get(x + 5, y + 3), src.get(x, y));
            }
        }
        assert_eq!(out.content_pixels(), 80);
        assert!(out.get(4, 3).is_background());
        assert!(out.get(15, 3).is_background());
    }

    #[test]
    fn test_zero_offset_same_frame() {
        let src = gradient(12, 9);
        assert_eq!(translate(&src, Translation::default(), 12, 9), src);
    }

    #[test]
    fn test_content_past_frame_is_clipped() {
        let src = gradient(10, 10);
        let out = translate(&src, Translation::new(-4.0, 6.0), 10, 10);

        assert_eq!(out.get(0, 6), src.get(4, 0));
        assert_eq!(out.get(5, 9), src.get(9, 3));
        assert_eq!(out.content_pixels(), 6 * 4);
    }

    #[test]
    fn test_fractional_offset_interpolates() {
        let src: AlphaRaster = Raster::from_fn(4, 1, |x, _| x as f64);
        let out = translate(&src, Translation::new(0.5, 0.0), 6, 1);

        // x = 2 samples halfway between source columns 1 and 2
        assert!((out.get(2, 0) - 1.5).abs() < 1e-12);
        assert!((out.get(3, 0) - 2.5).abs() < 1e-12);
        // past the right edge the source fades into background
        assert!((out.get(4, 0) - 1.5).abs() < 1e-12);
        assert_eq!(out.get(5, 0), 0.0);
    }

    #[test]
    fn test_empty_inputs() {
        let src: ColorRaster = Raster::new(0, 0);
        let out = translate(&src, Translation::new(1.0, 1.0), 5, 5);
        assert_eq!(out.content_pixels(), 0);
        assert!(translate(&gradient(3, 3), Translation::default(), 0, 4).is_empty());
    }
}
