use crate::types::{Descriptor, Image, Keypoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

const DESCRIPTOR_BITS: usize = 256;

/// Steered BRIEF: 256 intensity comparisons rotated by the keypoint angle
pub struct BriefGenerator {
    w: usize,
    h: usize,
    pattern: Vec<(f32, f32, f32, f32)>,
}

impl BriefGenerator {
    pub fn new(width: usize, height: usize, patch_size: usize, seed: u64) -> Self {
        Self {
            w: width,
            h: height,
            pattern: sampling_pattern(patch_size, seed),
        }
    }

    /// One descriptor per keypoint, in keypoint order
    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<Descriptor> {
        kps.par_iter()
            .map(|kp| {
                let (s, c) = kp.angle.sin_cos();
                let (cx, cy) = (kp.x, kp.y);
                let mut d = [0u8; 32];

                for (i, &(x1, y1, x2, y2)) in self.pattern.iter().enumerate() {
                    let (rx1, ry1) = (cx + c * x1 - s * y1, cy + s * x1 + c * y1);
                    let (rx2, ry2) = (cx + c * x2 - s * y2, cy + s * x2 + c * y2);

                    let bit = (self.sample(img, rx1, ry1) < self.sample(img, rx2, ry2)) as u8;
                    d[i / 8] |= bit << (i % 8);
                }
                d
            })
            .collect()
    }

    /// Nearest pixel, clamped to the image
    fn sample(&self, img: &Image, x: f32, y: f32) -> u8 {
        let xi = x.round().clamp(0.0, (self.w - 1) as f32) as usize;
        let yi = y.round().clamp(0.0, (self.h - 1) as f32) as usize;
        img[yi * self.w + xi]
    }
}

/// Integer point pairs drawn uniformly inside the patch, reproducible from `seed`
fn sampling_pattern(patch_size: usize, seed: u64) -> Vec<(f32, f32, f32, f32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = (patch_size / 2) as i32;
    let mut offset = || rng.random_range(-half..=half) as f32;

    (0..DESCRIPTOR_BITS)
        .map(|_| (offset(), offset(), offset(), offset()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hamming_distance;

    fn textured_image(width: usize, height: usize) -> Image {
        (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                ((x * 37 + y * 91 + (x * y) % 23) % 256) as u8
            })
            .collect()
    }

    #[test]
    fn test_pattern_is_seeded() {
        assert_eq!(sampling_pattern(31, 7), sampling_pattern(31, 7));
        assert_ne!(sampling_pattern(31, 7), sampling_pattern(31, 8));
        assert!(sampling_pattern(31, 7).iter().all(|&(a, b, c, d)| {
            [a, b, c, d].iter().all(|v| v.abs() <= 15.0)
        }));
    }

    #[test]
    fn test_one_descriptor_per_keypoint() {
        let img = textured_image(64, 64);
        let generator = BriefGenerator::new(64, 64, 31, 1);
        let kps = [
            Keypoint { x: 32.0, y: 32.0, angle: 0.0 },
            Keypoint { x: 1.0, y: 62.0, angle: 1.0 },
        ];
        assert_eq!(generator.generate_descriptors(&img, &kps).len(), 2);
    }

    #[test]
    fn test_translated_content_gives_identical_descriptor() {
        let (w, h) = (80, 60);
        let img = textured_image(w, h);
        // same content shifted 10 px to the left
        let shifted: Image = (0..w * h)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                img[y * w + (x + 10).min(w - 1)]
            })
            .collect();

        let generator = BriefGenerator::new(w, h, 15, 3);
        let a = generator.generate_descriptors(&img, &[Keypoint { x: 40.0, y: 30.0, angle: 0.0 }]);
        let b = generator.generate_descriptors(&shifted, &[Keypoint { x: 30.0, y: 30.0, angle: 0.0 }]);
        assert_eq!(hamming_distance(&a[0], &b[0]), 0);
    }
}
