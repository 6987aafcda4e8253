#[derive(Debug, Clone, PartialEq)]
pub enum StitchError {
    DimensionMismatch { expected: (usize, usize), actual: (usize, usize) },
    DataLength { expected: usize, actual: usize },
    DegenerateDimensions { width: usize, height: usize },
    InsufficientCorrespondences { found: usize, required: usize },
    NoConsensus { correspondences: usize },
    InvalidConfig(String),
}

impl std::fmt::Display for StitchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StitchError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Dimension mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
            StitchError::DataLength { expected, actual } => {
                write!(f, "Raster data length mismatch: expected {}, got {}", expected, actual)
            }
            StitchError::DegenerateDimensions { width, height } => {
                write!(f, "Raster {}x{} is too small to feather (minimum 2x2)", width, height)
            }
            StitchError::InsufficientCorrespondences { found, required } => {
                write!(f, "Insufficient correspondences: found {}, need at least {}", found, required)
            }
            StitchError::NoConsensus { correspondences } => {
                write!(f, "No translation hypothesis gained consensus among {} correspondences", correspondences)
            }
            StitchError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for StitchError {}

pub type StitchResult<T> = Result<T, StitchError>;
