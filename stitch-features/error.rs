#[derive(Debug, Clone, PartialEq)]
pub enum FeatureError {
    InvalidImageSize { width: usize, height: usize },
    InvalidImageData { expected_len: usize, actual_len: usize },
    InvalidThreshold(u8),
    InvalidArcLength(u8),
    InvalidPatchSize { patch_size: usize, min_image_dim: usize },
    ImageTooSmall { width: usize, height: usize, min_size: usize },
}

impl std::fmt::Display for FeatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            FeatureError::InvalidImageData { expected_len, actual_len } => {
                write!(f, "Image data length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            FeatureError::InvalidThreshold(t) => {
                write!(f, "Invalid threshold: {} (must be 1-127)", t)
            }
            FeatureError::InvalidArcLength(n) => {
                write!(f, "Invalid FAST arc length: {} (must be 9-16)", n)
            }
            FeatureError::InvalidPatchSize { patch_size, min_image_dim } => {
                write!(f, "Patch size {} must be odd and smaller than minimum image dimension {}", patch_size, min_image_dim)
            }
            FeatureError::ImageTooSmall { width, height, min_size } => {
                write!(f, "Image {}x{} too small (minimum {}x{})", width, height, min_size, min_size)
            }
        }
    }
}

impl std::error::Error for FeatureError {}

pub type FeatureResult<T> = Result<T, FeatureError>;
