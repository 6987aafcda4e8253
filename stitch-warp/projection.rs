use rayon::prelude::*;
use stitch_core::{Pixel, ProjectionMode, ProjectionParameters, Raster};

/// Inverse-maps a planar raster onto a sphere or cylinder of radius `focal_length`.
///
/// Every output pixel `(x, y)` becomes an angle pair around the image centre,
/// is lifted onto the surface and re-projected onto the image plane; the
/// nearest input pixel is copied. Output pixels whose source falls outside
/// the input stay background. The centre pixel always maps to itself.
#[derive(Debug, Clone, Copy)]
pub struct RadialProjector {
    params: ProjectionParameters,
}

impl RadialProjector {
    pub fn new(params: ProjectionParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ProjectionParameters {
        &self.params
    }

    /// Input pixel sampled for output pixel `(x, y)` of a `width` x `height` raster
    pub fn source_pixel(&self, x: usize, y: usize, width: usize, height: usize) -> Option<(usize, usize)> {
        let f = self.params.focal_length;
        let x_center = (width / 2) as f64;
        let y_center = (height / 2) as f64;

        let theta = (x as f64 - x_center) / f;
        let v = (y as f64 - y_center) / f;
        let (xp, yp, zp) = surface_point(self.params.mode, theta, v);

        // behind the image plane
        if !(zp > 0.0) {
            return None;
        }

        let x_in = (f * xp / zp + x_center).round();
        let y_in = (f * yp / zp + y_center).round();

        if x_in > -1.0 && x_in < width as f64 && y_in > -1.0 && y_in < height as f64 {
            Some((x_in as usize, y_in as usize))
        } else {
            None
        }
    }

    /// Same-sized projected copy of `input`; colour and alpha rasters share the geometry.
    pub fn project<T: Pixel>(&self, input: &Raster<T>) -> Raster<T> {
        let (width, height) = input.dimensions();
        let mut output = Raster::new(width, height);
        if output.is_empty() {
            return output;
        }

        output
            .data_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    if let Some((xi, yi)) = self.source_pixel(x, y, width, height) {
                        *out = input.get(xi, yi);
                    }
                }
            });

        output
    }
}

/// Point on the unit surface for horizontal angle `theta` and vertical
/// coordinate `v` (latitude on the sphere, height on the cylinder)
fn surface_point(mode: ProjectionMode, theta: f64, v: f64) -> (f64, f64, f64) {
    match mode {
        ProjectionMode::Spherical => (theta.sin() * v.cos(), v.sin(), theta.cos() * v.cos()),
        ProjectionMode::Cylindrical => (theta.sin(), v, theta.cos()),
    }
}
