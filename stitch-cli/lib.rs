//! Panorama stitching pipeline: correspondence filtering, translation
//! estimation and the orchestrator that chains pairwise shifts into a mosaic.

pub mod adapter;
pub mod estimator;
pub mod io;
pub mod orchestrator;
pub mod visualize;

pub use adapter::{CorrespondenceAdapter, filter_good_matches};
pub use estimator::{TranslationEstimator, TranslationFit};
pub use orchestrator::{Panorama, PanoramaOrchestrator, PairReport, StitchReport, canvas_dimensions, initial_offset};

use std::path::{Path, PathBuf};

use stitch_core::{StitchConfig, StitchError};
use stitch_features::{FeatureError, OrbFinder};

#[derive(Debug)]
pub enum PanoramaError {
    Stitch(StitchError),
    Feature(FeatureError),
    LoadFailure { path: PathBuf, source: image::ImageError },
    WriteFailure { path: PathBuf, source: image::ImageError },
    Config { path: PathBuf, message: String },
    EmptySequence,
    /// Projection or masking of one input image failed
    Prepare { index: usize, source: StitchError },
    /// Matching, estimation or compositing failed for image `index` and its left neighbour
    Pair { index: usize, source: Box<dyn std::error::Error + Send + Sync> },
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for PanoramaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanoramaError::Stitch(e) => write!(f, "Stitching error: {}", e),
            PanoramaError::Feature(e) => write!(f, "Feature error: {}", e),
            PanoramaError::LoadFailure { path, source } => {
                write!(f, "Failed to load image {}: {}", path.display(), source)
            }
            PanoramaError::WriteFailure { path, source } => {
                write!(f, "Failed to write image {}: {}", path.display(), source)
            }
            PanoramaError::Config { path, message } => {
                write!(f, "Failed to read configuration {}: {}", path.display(), message)
            }
            PanoramaError::EmptySequence => write!(f, "No input images given"),
            PanoramaError::Prepare { index, source } => write!(f, "Image {}: {}", index, source),
            PanoramaError::Pair { index, source } => {
                write!(f, "Pair {}-{}: {}", index.saturating_sub(1), index, source)
            }
            PanoramaError::ThreadPool(e) => write!(f, "Thread pool error: {}", e),
        }
    }
}

impl std::error::Error for PanoramaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PanoramaError::Stitch(e) | PanoramaError::Prepare { source: e, .. } => Some(e),
            PanoramaError::Feature(e) => Some(e),
            PanoramaError::LoadFailure { source, .. } | PanoramaError::WriteFailure { source, .. } => Some(source),
            PanoramaError::Pair { source, .. } => Some(source.as_ref()),
            PanoramaError::ThreadPool(e) => Some(e),
            PanoramaError::Config { .. } | PanoramaError::EmptySequence => None,
        }
    }
}

impl From<StitchError> for PanoramaError {
    fn from(err: StitchError) -> Self {
        PanoramaError::Stitch(err)
    }
}

impl From<FeatureError> for PanoramaError {
    fn from(err: FeatureError) -> Self {
        PanoramaError::Feature(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for PanoramaError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        PanoramaError::ThreadPool(err)
    }
}

pub type PanoramaResult<T> = Result<T, PanoramaError>;

/// Load `paths` in order and stitch them with ORB correspondences
pub fn stitch_files<P: AsRef<Path>>(paths: &[P], config: &StitchConfig) -> PanoramaResult<Panorama> {
    config.validate()?;
    let images = io::load_sequence(paths)?;
    log::info!("Stitching {} images...", images.len());

    let orchestrator = PanoramaOrchestrator::new(OrbFinder::new(config.features.clone()), config);
    orchestrator.stitch(&images)
}
