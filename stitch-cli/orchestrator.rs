use rayon::prelude::*;
use stitch_core::{
    AlphaRaster, CanvasConfig, ColorRaster, Correspondence, CorrespondenceFinder, ProjectionParameters, StitchConfig,
    Translation,
};
use stitch_warp::{AlphaCompositor, CompositeStats, ProjectedImage, prewarp, translate};

use crate::adapter::CorrespondenceAdapter;
use crate::estimator::{TranslationEstimator, TranslationFit};
use crate::{PanoramaError, PanoramaResult};

/// Diagnostics for image `index` stitched against image `index - 1`
#[derive(Debug, Clone)]
pub struct PairReport {
    pub index: usize,
    pub correspondences: Vec<Correspondence>,
    pub fit: TranslationFit,
    pub composite: CompositeStats,
}

#[derive(Debug, Clone, Default)]
pub struct StitchReport {
    /// Canvas placement of every image; entry 0 is the centering offset
    pub transforms: Vec<Translation>,
    pub pairs: Vec<PairReport>,
}

impl StitchReport {
    /// Indices of images placed without RANSAC support
    pub fn fallback_pairs(&self) -> Vec<usize> {
        self.pairs
            .iter()
            .filter(|p| !p.fit.consensus_found)
            .map(|p| p.index)
            .collect()
    }
}

/// Finished mosaic with its alpha coverage
#[derive(Debug, Clone)]
pub struct Panorama {
    pub canvas: ColorRaster,
    pub alpha: AlphaRaster,
    pub report: StitchReport,
}

/// Canvas size for `count` images led by a `width` x `height` image.
///
/// Fractional sizes are truncated.
pub fn canvas_dimensions(width: usize, height: usize, count: usize, cfg: &CanvasConfig) -> (usize, usize) {
    let w = width as f64 + count.saturating_sub(1) as f64 * cfg.overlap * width as f64;
    let h = cfg.height_scale * height as f64;
    (w.floor() as usize, h.floor() as usize)
}

/// Placement that centres an image of `height` rows vertically on the canvas
pub fn initial_offset(height: usize, canvas_height: usize) -> Translation {
    Translation::new(0.0, (canvas_height / 2) as f64 - (height / 2) as f64)
}

/// Chains pairwise translations left to right into one canvas.
///
/// Each image is matched against its left neighbour only, and its placement
/// is the neighbour's placement plus the estimated shift. Errors and drift
/// carry forward; nothing is revisited.
pub struct PanoramaOrchestrator<F> {
    adapter: CorrespondenceAdapter<F>,
    estimator: TranslationEstimator,
    projection: ProjectionParameters,
    canvas: CanvasConfig,
}

impl<F: CorrespondenceFinder> PanoramaOrchestrator<F> {
    pub fn new(finder: F, config: &StitchConfig) -> Self {
        Self {
            adapter: CorrespondenceAdapter::new(finder, config.matching.clone()),
            estimator: TranslationEstimator::new(config.ransac.clone()),
            projection: config.projection,
            canvas: config.canvas.clone(),
        }
    }

    /// Project every image and its feather mask
    pub fn prepare(&self, images: &[ColorRaster]) -> PanoramaResult<Vec<ProjectedImage>> {
        if images.is_empty() {
            return Err(PanoramaError::EmptySequence);
        }
        let projection = self.projection;
        images
            .par_iter()
            .enumerate()
            .map(|(index, image)| prewarp(image, projection).map_err(|source| PanoramaError::Prepare { index, source }))
            .collect()
    }

    pub fn stitch(&self, images: &[ColorRaster]) -> PanoramaResult<Panorama> {
        let projected = self.prepare(images)?;
        self.stitch_prepared(&projected)
    }

    pub fn stitch_prepared(&self, images: &[ProjectedImage]) -> PanoramaResult<Panorama> {
        let first = images.first().ok_or(PanoramaError::EmptySequence)?;
        let (width, height) = first.image.dimensions();
        let (canvas_w, canvas_h) = canvas_dimensions(width, height, images.len(), &self.canvas);
        let origin = initial_offset(height, canvas_h);
        log::info!("Canvas {}x{}, first image at {}", canvas_w, canvas_h, origin);

        let mut canvas = translate(&first.image, origin, canvas_w, canvas_h);
        let mut alpha = translate(&first.mask, origin, canvas_w, canvas_h);
        let mut report = StitchReport {
            transforms: vec![origin],
            pairs: Vec::with_capacity(images.len().saturating_sub(1)),
        };

        for (index, pair) in images.windows(2).enumerate().map(|(i, w)| (i + 1, w)) {
            let (left, current) = (&pair[0], &pair[1]);
            let pair_error = |source: Box<dyn std::error::Error + Send + Sync>| PanoramaError::Pair { index, source };

            let correspondences = self
                .adapter
                .match_pair(&current.image, &left.image)
                .map_err(|e| pair_error(Box::new(e)))?;
            log::info!("Pair {}-{}: {} feature point matches", index - 1, index, correspondences.len());

            let fit = self.estimator.fit(&correspondences).map_err(|e| pair_error(Box::new(e)))?;
            if fit.is_undersampled() {
                log::warn!(
                    "Pair {}-{}: fewer matches ({}) than trials ({})",
                    index - 1,
                    index,
                    fit.correspondences,
                    fit.trials
                );
            }
            if !fit.consensus_found {
                log::warn!(
                    "Pair {}-{}: no hypothesis gained consensus, using last hypothesis {}",
                    index - 1,
                    index,
                    fit.translation
                );
            }

            let previous = report.transforms[index - 1];
            let placement = previous + fit.translation;
            log::debug!("Image {} shift {} placed at {}", index, fit.translation, placement);

            let warped = translate(&current.image, placement, canvas_w, canvas_h);
            let warped_mask = translate(&current.mask, placement, canvas_w, canvas_h);
            let mut neighbour_mask = translate(&left.mask, previous, canvas_w, canvas_h);

            let composite = AlphaCompositor::composite(&warped, &warped_mask, &mut canvas, &mut neighbour_mask)
                .map_err(|e| pair_error(Box::new(e)))?;
            merge_alpha(&mut alpha, &neighbour_mask);

            report.transforms.push(placement);
            report.pairs.push(PairReport {
                index,
                correspondences,
                fit,
                composite,
            });
        }

        Ok(Panorama { canvas, alpha, report })
    }
}

/// Raise `alpha` to `other` wherever `other` is larger
fn merge_alpha(alpha: &mut AlphaRaster, other: &AlphaRaster) {
    alpha
        .data_mut()
        .par_iter_mut()
        .zip(other.data().par_iter())
        .for_each(|(a, &b)| *a = a.max(b));
}
