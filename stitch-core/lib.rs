mod config;
mod error;
mod raster;

pub use config::{CanvasConfig, FeatureConfig, MatchConfig, RansacConfig, StitchConfig};
pub use error::{StitchError, StitchResult};
pub use raster::{AlphaRaster, ColorRaster, Pixel, Raster, Rgb};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Point in an image's pixel frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 2D shift between two image frames, also used for absolute canvas placements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translation {
    pub dx: f64,
    pub dy: f64,
}

impl Translation {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn apply(&self, p: Point2) -> Point2 {
        Point2::new(p.x + self.dx, p.y + self.dy)
    }
}

impl std::ops::Add for Translation {
    type Output = Translation;

    fn add(self, rhs: Translation) -> Translation {
        Translation::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.dx, self.dy)
    }
}

/// Matched point pair between image A (`from`) and image B (`to`).
/// Lower `score` means a better match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correspondence {
    pub from: Point2,
    pub to: Point2,
    pub score: f64,
}

impl Correspondence {
    pub fn new(from: Point2, to: Point2, score: f64) -> Self {
        Self { from, to, score }
    }

    /// Shift that carries `from` onto `to`
    pub fn offset(&self) -> Translation {
        Translation::new(self.to.x - self.from.x, self.to.y - self.from.y)
    }
}

/// Curved surface images are reprojected onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProjectionMode {
    #[default]
    Spherical,
    Cylindrical,
}

impl std::fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionMode::Spherical => write!(f, "spherical"),
            ProjectionMode::Cylindrical => write!(f, "cylindrical"),
        }
    }
}

impl std::str::FromStr for ProjectionMode {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spherical" | "sphere" => Ok(ProjectionMode::Spherical),
            "cylindrical" | "cylinder" => Ok(ProjectionMode::Cylindrical),
            other => Err(StitchError::InvalidConfig(format!("unknown projection mode '{}'", other))),
        }
    }
}

/// Projection shared by every image in a run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectionParameters {
    pub mode: ProjectionMode,
    pub focal_length: f64,
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Spherical,
            focal_length: 2800.0,
        }
    }
}

/// Source of candidate point matches between two colour rasters.
///
/// Implementations return every candidate they find; filtering is left
/// to the caller.
pub trait CorrespondenceFinder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn find_candidates(&self, from: &ColorRaster, to: &ColorRaster) -> Result<Vec<Correspondence>, Self::Error>;
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correspondence_offset() {
        let c = Correspondence::new(Point2::new(10.0, 20.0), Point2::new(15.5, 18.0), 4.0);
        assert_eq!(c.offset(), Translation::new(5.5, -2.0));
        assert_eq!(c.offset().apply(c.from), c.to);
    }

    #[test]
    fn test_translation_accumulates() {
        let chain = [Translation::new(0.0, 60.0), Translation::new(400.0, -2.0), Translation::new(395.0, 1.0)];
        let total = chain.iter().copied().fold(Translation::default(), |acc, t| acc + t);
        assert_eq!(total, Translation::new(795.0, 59.0));
    }

    #[test]
    fn test_projection_mode_parsing() {
        assert_eq!("spherical".parse::<ProjectionMode>().unwrap(), ProjectionMode::Spherical);
        assert_eq!("Cylindrical".parse::<ProjectionMode>().unwrap(), ProjectionMode::Cylindrical);
        assert!("planar".parse::<ProjectionMode>().is_err());
        assert_eq!(ProjectionMode::Cylindrical.to_string(), "cylindrical");
    }

    #[test]
    fn test_default_projection() {
        let p = ProjectionParameters::default();
        assert_eq!(p.mode, ProjectionMode::Spherical);
        assert_eq!(p.focal_length, 2800.0);
    }
}
