mod arc;
mod brief;
mod error;
mod fast;
mod matcher;
mod types;

pub use brief::BriefGenerator;
pub use error::{FeatureError, FeatureResult};
pub use fast::{FastDetector, non_maximum_suppression};
pub use matcher::HammingMatcher;
pub use types::{Descriptor, DescriptorMatch, Image, Keypoint, ScoredKeypoint, hamming_distance};

use stitch_core::{ColorRaster, Correspondence, CorrespondenceFinder, FeatureConfig, Point2};

/// Luma (BT.601 weights) of a colour raster as a row-major 8-bit image
pub fn to_gray(raster: &ColorRaster) -> Image {
    raster
        .data()
        .iter()
        .map(|&[r, g, b]| (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8)
        .collect()
}

/// FAST corner detection combined with steered BRIEF descriptors
pub struct OrbExtractor {
    fast_detector: FastDetector,
    brief_generator: BriefGenerator,
}

impl OrbExtractor {
    pub fn new(cfg: &FeatureConfig, width: usize, height: usize) -> FeatureResult<Self> {
        let fast_detector = FastDetector::new(cfg, width, height)?;
        let brief_generator = BriefGenerator::new(width, height, cfg.patch_size, cfg.pattern_seed);

        Ok(Self {
            fast_detector,
            brief_generator,
        })
    }

    pub fn detect_keypoints(&self, img: &Image) -> FeatureResult<Vec<Keypoint>> {
        self.fast_detector.detect_keypoints(img)
    }

    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<Descriptor> {
        self.brief_generator.generate_descriptors(img, kps)
    }

    /// Detect keypoints and generate descriptors in one step
    pub fn detect_and_describe(&self, img: &Image) -> FeatureResult<(Vec<Keypoint>, Vec<Descriptor>)> {
        let kps = self.detect_keypoints(img)?;
        let desc = self.generate_descriptors(img, &kps);
        Ok((kps, desc))
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.fast_detector.dimensions()
    }
}

/// Correspondence finder backed by ORB-style features and Hamming matching.
///
/// Every keypoint of the `from` image yields one candidate (its nearest
/// neighbour in `to`), scored by descriptor distance.
#[derive(Debug, Clone, Default)]
pub struct OrbFinder {
    cfg: FeatureConfig,
}

impl OrbFinder {
    pub fn new(cfg: FeatureConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }

    fn extract(&self, raster: &ColorRaster) -> FeatureResult<(Vec<Keypoint>, Vec<Descriptor>)> {
        let (w, h) = raster.dimensions();
        let gray = to_gray(raster);
        OrbExtractor::new(&self.cfg, w, h)?.detect_and_describe(&gray)
    }
}

impl CorrespondenceFinder for OrbFinder {
    type Error = FeatureError;

    fn find_candidates(&self, from: &ColorRaster, to: &ColorRaster) -> FeatureResult<Vec<Correspondence>> {
        let (kps_from, desc_from) = self.extract(from)?;
        let (kps_to, desc_to) = self.extract(to)?;
        log::debug!("Detected {} and {} keypoints", kps_from.len(), kps_to.len());

        let matches = HammingMatcher::new()
            .with_cross_check(self.cfg.cross_check)
            .match_descriptors(&desc_from, &desc_to);

        Ok(matches
            .into_iter()
            .map(|m| {
                let a = kps_from[m.query_idx];
                let b = kps_to[m.train_idx];
                Correspondence::new(
                    Point2::new(a.x as f64, a.y as f64),
                    Point2::new(b.x as f64, b.y as f64),
                    m.distance as f64,
                )
            })
            .collect())
    }
}
