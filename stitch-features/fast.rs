use crate::arc::has_consecutive_bits;
use crate::error::{FeatureError, FeatureResult};
use crate::types::{Image, Keypoint, ScoredKeypoint};
use rayon::prelude::*;
use stitch_core::FeatureConfig;

/// Bresenham circle of radius 3, clockwise from the left
const CIRCLE: [(i32, i32); 16] = [
    (-3, 0), (-3, 1), (-2, 2), (-1, 3),
    (0, 3), (1, 3), (2, 2), (3, 1),
    (3, 0), (3, -1), (2, -2), (1, -3),
    (0, -3), (-1, -3), (-2, -2), (-3, -1),
];

/// FAST requires at least 7x7 image (3-pixel border on each side)
const MIN_SIZE: usize = 7;

#[derive(Debug, Clone)]
pub struct FastDetector {
    cfg: FeatureConfig,
    w: usize,
    h: usize,
}

impl FastDetector {
    /// Creates a new FAST detector with validation
    pub fn new(cfg: &FeatureConfig, width: usize, height: usize) -> FeatureResult<Self> {
        if width == 0 || height == 0 {
            return Err(FeatureError::InvalidImageSize { width, height });
        }

        if width < MIN_SIZE || height < MIN_SIZE {
            return Err(FeatureError::ImageTooSmall {
                width,
                height,
                min_size: MIN_SIZE,
            });
        }

        // 0 would detect everything, >127 overflows the saturating comparisons
        if cfg.threshold == 0 || cfg.threshold > 127 {
            return Err(FeatureError::InvalidThreshold(cfg.threshold));
        }

        if !(9..=16).contains(&cfg.arc_length) {
            return Err(FeatureError::InvalidArcLength(cfg.arc_length));
        }

        let min_dim = width.min(height);
        if cfg.patch_size % 2 == 0 || cfg.patch_size >= min_dim {
            return Err(FeatureError::InvalidPatchSize {
                patch_size: cfg.patch_size,
                min_image_dim: min_dim,
            });
        }

        Ok(Self {
            cfg: cfg.clone(),
            w: width,
            h: height,
        })
    }

    fn validate_image(&self, img: &Image) -> FeatureResult<()> {
        let expected_len = self.w * self.h;
        if img.len() != expected_len {
            return Err(FeatureError::InvalidImageData {
                expected_len,
                actual_len: img.len(),
            });
        }
        Ok(())
    }

    /// Corners after non-maximum suppression, strongest first, capped at `max_keypoints`
    pub fn detect_keypoints(&self, img: &Image) -> FeatureResult<Vec<Keypoint>> {
        let scored = self.detect_keypoints_with_response(img)?;
        let mut suppressed = non_maximum_suppression(&scored, self.cfg.nms_distance);
        suppressed.truncate(self.cfg.max_keypoints);
        Ok(suppressed.into_iter().map(|sk| sk.keypoint).collect())
    }

    /// Every pixel passing the segment test, in raster order
    pub fn detect_keypoints_with_response(&self, img: &Image) -> FeatureResult<Vec<ScoredKeypoint>> {
        self.validate_image(img)?;

        let arc = self.cfg.arc_length as usize;
        let threshold = self.cfg.threshold;

        let keypoints = (3..self.h - 3)
            .into_par_iter()
            .flat_map_iter(|y| {
                let mut v = Vec::new();
                for x in 3..self.w - 3 {
                    let p = img[y * self.w + x];
                    let mut bright = 0u16;
                    let mut dark = 0u16;
                    let mut bright_sum = 0i32;
                    let mut dark_sum = 0i32;

                    for (i, &(dx, dy)) in CIRCLE.iter().enumerate() {
                        let xx = (x as i32 + dx) as usize;
                        let yy = (y as i32 + dy) as usize;
                        let q = img[yy * self.w + xx];

                        if q >= p.saturating_add(threshold) {
                            bright |= 1 << i;
                            bright_sum += q as i32 - p as i32;
                        } else if q.saturating_add(threshold) <= p {
                            dark |= 1 << i;
                            dark_sum += p as i32 - q as i32;
                        }
                    }

                    let response = if has_consecutive_bits(bright, arc) {
                        bright_sum as f32 / bright.count_ones() as f32
                    } else if has_consecutive_bits(dark, arc) {
                        dark_sum as f32 / dark.count_ones() as f32
                    } else {
                        continue;
                    };

                    let angle = self.compute_orientation(img, x, y);
                    v.push(ScoredKeypoint {
                        keypoint: Keypoint {
                            x: x as f32,
                            y: y as f32,
                            angle,
                        },
                        response,
                    });
                }
                v
            })
            .collect();

        Ok(keypoints)
    }

    /// Intensity-centroid orientation over the configured patch
    fn compute_orientation(&self, img: &Image, x: usize, y: usize) -> f32 {
        let half = (self.cfg.patch_size / 2) as i32;
        let (cx, cy) = (x as i32, y as i32);

        if cx - half < 0 || cy - half < 0 || cx + half >= self.w as i32 || cy + half >= self.h as i32 {
            return 0.0;
        }

        let mut m10 = 0i64;
        let mut m01 = 0i64;
        for dy in -half..=half {
            let row = (cy + dy) as usize * self.w;
            for dx in -half..=half {
                let val = img[row + (cx + dx) as usize] as i64;
                m10 += dx as i64 * val;
                m01 += dy as i64 * val;
            }
        }

        (m01 as f32).atan2(m10 as f32)
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.w, self.h)
    }
}

/// Greedy suppression: strongest response first, drop anything closer than `min_distance`
pub fn non_maximum_suppression(keypoints: &[ScoredKeypoint], min_distance: f32) -> Vec<ScoredKeypoint> {
    let mut sorted = keypoints.to_vec();
    sorted.sort_by(|a, b| b.response.partial_cmp(&a.response).unwrap_or(std::cmp::Ordering::Equal));

    let min_distance_sq = min_distance * min_distance;
    let mut accepted: Vec<ScoredKeypoint> = Vec::new();

    for candidate in sorted {
        let isolated = accepted.iter().all(|a| {
            let dx = candidate.keypoint.x - a.keypoint.x;
            let dy = candidate.keypoint.y - a.keypoint.y;
            dx * dx + dy * dy >= min_distance_sq
        });
        if isolated {
            accepted.push(candidate);
        }
    }

    accepted
}
