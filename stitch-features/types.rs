/// Row-major 8-bit grayscale image
pub type Image = Vec<u8>;

/// Key-point ≙ FAST corner + orientation (radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Keypoint with corner response score for NMS
#[derive(Debug, Clone, Copy)]
pub struct ScoredKeypoint {
    pub keypoint: Keypoint,
    pub response: f32,
}

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; 32];

pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Nearest-neighbour match between a query and a train descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: u32,
}
