use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stitch_core::{Correspondence, RansacConfig, StitchError, StitchResult, Translation};

/// Outcome of a translation fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationFit {
    pub translation: Translation,
    /// Correspondences agreeing with the winning hypothesis, the hypothesis itself excluded
    pub consensus: usize,
    /// False when no hypothesis gained any support and the last one was used
    pub consensus_found: bool,
    /// Correspondences the fit was drawn from
    pub correspondences: usize,
    pub trials: usize,
}

impl TranslationFit {
    /// More trials were run than there were correspondences to draw from
    pub fn is_undersampled(&self) -> bool {
        self.correspondences < self.trials
    }
}

/// Translation-only RANSAC.
///
/// Each trial picks one correspondence at random and takes its offset as the
/// hypothesis. Every other correspondence whose offset lies within
/// `tolerance` on both axes supports it. The first hypothesis with the
/// strictly largest support wins. Sampling is seeded, so the same input
/// always gives the same answer.
#[derive(Debug, Clone, Default)]
pub struct TranslationEstimator {
    cfg: RansacConfig,
}

impl TranslationEstimator {
    pub fn new(cfg: RansacConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &RansacConfig {
        &self.cfg
    }

    pub fn estimate(&self, correspondences: &[Correspondence]) -> StitchResult<Translation> {
        Ok(self.fit(correspondences)?.translation)
    }

    pub fn fit(&self, correspondences: &[Correspondence]) -> StitchResult<TranslationFit> {
        let n = correspondences.len();
        let required = self.cfg.min_correspondences.max(1);
        if n < required {
            return Err(StitchError::InsufficientCorrespondences { found: n, required });
        }

        let trials = self.cfg.trials.unwrap_or(n);

        let mut rng = StdRng::seed_from_u64(self.cfg.seed);
        let mut best: Option<(Translation, usize)> = None;
        let mut last = Translation::default();

        for _ in 0..trials {
            let pick = rng.random_range(0..n);
            let hypothesis = correspondences[pick].offset();
            let support = consensus(correspondences, pick, hypothesis, self.cfg.tolerance);

            if support > best.map_or(0, |(_, s)| s) {
                best = Some((hypothesis, support));
            }
            last = hypothesis;
        }

        match best {
            Some((translation, support)) => {
                log::debug!("Translation {} supported by {} of {} matches", translation, support, n);
                Ok(TranslationFit {
                    translation,
                    consensus: support,
                    consensus_found: true,
                    correspondences: n,
                    trials,
                })
            }
            None if self.cfg.require_consensus => Err(StitchError::NoConsensus { correspondences: n }),
            None => Ok(TranslationFit {
                translation: last,
                consensus: 0,
                consensus_found: false,
                correspondences: n,
                trials,
            }),
        }
    }
}

/// Number of correspondences other than `pick` whose offset agrees with `hypothesis`
fn consensus(correspondences: &[Correspondence], pick: usize, hypothesis: Translation, tolerance: f64) -> usize {
    correspondences
        .iter()
        .enumerate()
        .filter(|&(j, c)| {
            let offset = c.offset();
            j != pick
                && (hypothesis.dx - offset.dx).abs() < tolerance
                && (hypothesis.dy - offset.dy).abs() < tolerance
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::Point2;

    fn shifted(points: &[(f64, f64)], dx: f64, dy: f64) -> Vec<Correspondence> {
        points
            .iter()
            .map(|&(x, y)| Correspondence::new(Point2::new(x, y), Point2::new(x + dx, y + dy), 0.0))
            .collect()
    }

    fn grid(n: usize) -> Vec<(f64, f64)> {
        (0..n).map(|i| ((i * 17 % 200) as f64, (i * 29 % 150) as f64)).collect()
    }

    #[test]
    fn test_exact_translation_recovered() {
        let corr = shifted(&grid(12), 37.0, -4.5);
        let fit = TranslationEstimator::default().fit(&corr).unwrap();

        assert_eq!(fit.translation, Translation::new(37.0, -4.5));
        assert_eq!(fit.consensus, 11);
        assert!(fit.consensus_found);
        assert_eq!(fit.trials, 12);
        assert!(!fit.is_undersampled());
    }

    #[test]
    fn test_majority_cluster_wins() {
        let mut corr = shifted(&grid(8), 5.0, 5.0);
        corr.extend(shifted(&[(3.0, 4.0), (90.0, 12.0)], 50.0, -50.0));

        let fit = TranslationEstimator::default().fit(&corr).unwrap();
        assert_eq!(fit.translation, Translation::new(5.0, 5.0));
        assert_eq!(fit.consensus, 7);
    }

    #[test]
    fn test_noisy_inliers_within_tolerance() {
        let mut corr = shifted(&grid(10), 20.0, 1.0);
        for (i, c) in corr.iter_mut().enumerate() {
            c.to.x += (i % 3) as f64 * 0.5;
        }
        corr.extend(shifted(&grid(3), -80.0, 40.0));

        let t = TranslationEstimator::default().estimate(&corr).unwrap();
        assert!((t.dx - 20.5).abs() <= 1.0);
        assert_eq!(t.dy, 1.0);
    }

    #[test]
    fn test_same_seed_same_answer() {
        let mut corr = shifted(&grid(6), 10.0, 0.0);
        corr.extend(shifted(&grid(6), 10.0, 2.5));
        let cfg = RansacConfig { seed: 42, ..Default::default() };

        let a = TranslationEstimator::new(cfg.clone()).fit(&corr).unwrap();
        let b = TranslationEstimator::new(cfg).fit(&corr).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_correspondences_is_an_error() {
        assert_eq!(
            TranslationEstimator::default().fit(&[]),
            Err(StitchError::InsufficientCorrespondences { found: 0, required: 1 })
        );

        let cfg = RansacConfig { min_correspondences: 4, ..Default::default() };
        let corr = shifted(&grid(3), 1.0, 1.0);
        assert_eq!(
            TranslationEstimator::new(cfg).fit(&corr),
            Err(StitchError::InsufficientCorrespondences { found: 3, required: 4 })
        );
    }

    #[test]
    fn test_without_support_falls_back_to_last_hypothesis() {
        let corr: Vec<_> = (0..5)
            .map(|i| {
                let x = i as f64 * 10.0;
                Correspondence::new(Point2::new(x, 0.0), Point2::new(2.0 * x, 0.0), 0.0)
            })
            .collect();
        let cfg = RansacConfig { seed: 9, ..Default::default() };

        let mut rng = StdRng::seed_from_u64(9);
        let last_pick = (0..corr.len()).map(|_| rng.random_range(0..corr.len())).last().unwrap();

        let fit = TranslationEstimator::new(cfg).fit(&corr).unwrap();
        assert!(!fit.consensus_found);
        assert_eq!(fit.consensus, 0);
        assert_eq!(fit.translation, corr[last_pick].offset());
    }

    #[test]
    fn test_zero_translation_is_a_real_answer() {
        let corr = shifted(&grid(6), 0.0, 0.0);
        let fit = TranslationEstimator::default().fit(&corr).unwrap();
        assert!(fit.consensus_found);
        assert_eq!(fit.translation, Translation::new(0.0, 0.0));
    }

    #[test]
    fn test_single_correspondence() {
        let corr = shifted(&[(4.0, 4.0)], 3.0, -2.0);
        let fit = TranslationEstimator::default().fit(&corr).unwrap();
        assert!(!fit.consensus_found);
        assert_eq!(fit.translation, Translation::new(3.0, -2.0));

        let strict = RansacConfig { require_consensus: true, ..Default::default() };
        assert_eq!(
            TranslationEstimator::new(strict).fit(&corr),
            Err(StitchError::NoConsensus { correspondences: 1 })
        );
    }

    #[test]
    fn test_agreement_needs_both_axes() {
        let corr = vec![
            Correspondence::new(Point2::new(0.0, 0.0), Point2::new(0.0, 0.0), 0.0),
            Correspondence::new(Point2::new(0.0, 0.0), Point2::new(1.0, 100.0), 0.0),
            Correspondence::new(Point2::new(0.0, 0.0), Point2::new(100.0, 1.0), 0.0),
            Correspondence::new(Point2::new(5.0, 5.0), Point2::new(6.0, 7.0), 0.0),
        ];
        assert_eq!(consensus(&corr, 0, Translation::new(0.0, 0.0), 3.0), 1);
    }

    #[test]
    fn test_trial_override() {
        let corr = shifted(&grid(4), 2.0, 2.0);
        let cfg = RansacConfig { trials: Some(25), ..Default::default() };
        let fit = TranslationEstimator::new(cfg).fit(&corr).unwrap();
        assert_eq!(fit.trials, 25);
        assert_eq!(fit.correspondences, 4);
        assert!(fit.is_undersampled());
        assert_eq!(fit.translation, Translation::new(2.0, 2.0));

        let cfg = RansacConfig { trials: Some(3), ..Default::default() };
        assert!(!TranslationEstimator::new(cfg).fit(&corr).unwrap().is_undersampled());
    }

    #[test]
    fn test_tie_goes_to_first_sampled_hypothesis() {
        // two clusters of three, every hypothesis has support 2
        let mut corr = shifted(&[(0.0, 0.0), (10.0, 40.0), (70.0, 20.0)], 0.0, 0.0);
        corr.extend(shifted(&[(5.0, 5.0), (30.0, 60.0), (90.0, 15.0)], 50.0, 50.0));

        for seed in 0..6 {
            let first_pick = StdRng::seed_from_u64(seed).random_range(0..corr.len());
            let cfg = RansacConfig { seed, ..Default::default() };
            let fit = TranslationEstimator::new(cfg).fit(&corr).unwrap();

            assert_eq!(fit.translation, corr[first_pick].offset());
            assert_eq!(fit.consensus, 2);
        }
    }
}
