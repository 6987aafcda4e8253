use crate::error::{StitchError, StitchResult};

/// 8-bit colour sample in decode order (R, G, B)
pub type Rgb = [u8; 3];

/// A sample type a [`Raster`] can hold.
///
/// The default value is the background: projection holes and unwritten
/// canvas pixels keep it, and compositing treats it as "no content".
pub trait Pixel: Copy + Default + PartialEq + Send + Sync {
    const CHANNELS: usize;

    fn is_background(&self) -> bool {
        *self == Self::default()
    }

    /// Linear interpolation towards `other`, `t` in `[0, 1]`.
    fn lerp(self, other: Self, t: f64) -> Self;
}

impl Pixel for Rgb {
    const CHANNELS: usize = 3;

    fn lerp(self, other: Self, t: f64) -> Self {
        let mut out = [0u8; 3];
        for (c, o) in out.iter_mut().enumerate() {
            let v = self[c] as f64 * (1.0 - t) + other[c] as f64 * t;
            *o = v.round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

impl Pixel for f64 {
    const CHANNELS: usize = 1;

    fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }
}

/// Row-major 2D grid of pixels. Dimensions are fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// 3-channel colour raster
pub type ColorRaster = Raster<Rgb>;

/// Single-channel alpha raster with values in `[0, 1]`
pub type AlphaRaster = Raster<f64>;

impl<T: Pixel> Raster<T> {
    /// Raster filled with background
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> StitchResult<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(StitchError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Builds a raster by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    /// Sample at signed coordinates, `None` outside the raster.
    pub fn get_checked(&self, x: i64, y: i64) -> Option<T> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.data[y as usize * self.width + x as usize])
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[y * self.width + x] = value;
    }

    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn same_dimensions<U: Pixel>(&self, other: &Raster<U>) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Fails with `DimensionMismatch` unless `other` has this raster's size.
    pub fn ensure_same_dimensions<U: Pixel>(&self, other: &Raster<U>) -> StitchResult<()> {
        if !self.same_dimensions(other) {
            return Err(StitchError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }

    /// Number of pixels that are not background
    pub fn content_pixels(&self) -> usize {
        self.data.iter().filter(|p| !p.is_background()).count()
    }
}
