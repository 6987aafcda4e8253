use stitch_core::{ColorRaster, Correspondence, CorrespondenceFinder, MatchConfig};

/// Runs a [`CorrespondenceFinder`] and keeps only its good matches
pub struct CorrespondenceAdapter<F> {
    finder: F,
    cfg: MatchConfig,
}

impl<F: CorrespondenceFinder> CorrespondenceAdapter<F> {
    pub fn new(finder: F, cfg: MatchConfig) -> Self {
        Self { finder, cfg }
    }

    pub fn finder(&self) -> &F {
        &self.finder
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Filtered correspondences from points of `from` to points of `to`.
    ///
    /// An empty result is valid; estimation decides what to do with it.
    pub fn match_pair(&self, from: &ColorRaster, to: &ColorRaster) -> Result<Vec<Correspondence>, F::Error> {
        let candidates = self.finder.find_candidates(from, to)?;
        let total = candidates.len();
        let good = filter_good_matches(candidates, &self.cfg);
        log::debug!("Kept {} of {} candidate matches", good.len(), total);
        Ok(good)
    }
}

/// Keep candidates scoring below `ratio` times the best score.
///
/// The best score is capped at `max_reference_score`. A best score of zero
/// is replaced by `zero_score_reference` so a run of perfect matches does
/// not reject everything else.
pub fn filter_good_matches(candidates: Vec<Correspondence>, cfg: &MatchConfig) -> Vec<Correspondence> {
    let Some(min_score) = candidates.iter().map(|c| c.score).reduce(f64::min) else {
        return candidates;
    };
    let reference = if min_score > 0.0 {
        min_score.min(cfg.max_reference_score)
    } else {
        cfg.zero_score_reference
    };
    let cutoff = cfg.ratio * reference;

    candidates.into_iter().filter(|c| c.score < cutoff).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::{Point2, Raster};

    fn scored(score: f64) -> Correspondence {
        Correspondence::new(Point2::new(score, 0.0), Point2::new(score + 1.0, 0.0), score)
    }

    fn scores(kept: &[Correspondence]) -> Vec<f64> {
        kept.iter().map(|c| c.score).collect()
    }

    #[test]
    fn test_keeps_below_three_times_minimum() {
        let candidates = vec![scored(12.0), scored(4.0), scored(11.9), scored(30.0), scored(5.0)];
        let kept = filter_good_matches(candidates, &MatchConfig::default());
        assert_eq!(scores(&kept), vec![4.0, 11.9, 5.0]);
    }

    #[test]
    fn test_perfect_matches_use_score_floor() {
        // a zero minimum would otherwise reject every candidate, including itself
        let candidates = vec![scored(0.0), scored(0.0), scored(2.0), scored(3.0)];
        let kept = filter_good_matches(candidates, &MatchConfig::default());
        assert_eq!(scores(&kept), vec![0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_fractional_scores_keep_their_own_minimum() {
        let candidates = vec![scored(0.2), scored(0.5), scored(0.9), scored(2.5)];
        let kept = filter_good_matches(candidates, &MatchConfig::default());
        // cutoff is 3 * 0.2
        assert_eq!(scores(&kept), vec![0.2, 0.5]);
    }

    #[test]
    fn test_reference_capped_at_maximum() {
        let candidates = vec![scored(150.0), scored(299.0), scored(310.0)];
        let kept = filter_good_matches(candidates, &MatchConfig::default());
        // reference is min(150, 100) = 100
        assert_eq!(scores(&kept), vec![150.0, 299.0]);
    }

    #[test]
    fn test_empty_candidates() {
        assert!(filter_good_matches(Vec::new(), &MatchConfig::default()).is_empty());
    }

    struct FixedFinder(Vec<Correspondence>);

    impl CorrespondenceFinder for FixedFinder {
        type Error = std::convert::Infallible;

        fn find_candidates(&self, _: &ColorRaster, _: &ColorRaster) -> Result<Vec<Correspondence>, Self::Error> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_adapter_filters_finder_output() {
        let adapter = CorrespondenceAdapter::new(
            FixedFinder(vec![scored(10.0), scored(40.0), scored(25.0)]),
            MatchConfig::default(),
        );
        let image: ColorRaster = Raster::new(4, 4);
        let Ok(kept) = adapter.match_pair(&image, &image);
        assert_eq!(scores(&kept), vec![10.0, 25.0]);
    }
}
