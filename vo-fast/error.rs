use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FastError {
    #[error("Input image is empty")]
    EmptyImage,
    #[error("Invalid pyramid level count: {0} (must be >= 1)")]
    InvalidLevelCount(usize),
    #[error("Requested {requested} detection levels but the pyramid has {available}")]
    TooManyDetectionLevels { requested: usize, available: usize },
    #[error("Invalid threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),
    #[error("Invalid FAST arc length: {0} (must be 9-12)")]
    InvalidArcLength(u8),
    #[error("Invalid cell size: {0} (must be > 0)")]
    InvalidCellSize(usize),
}

pub type FastResult<T> = Result<T, FastError>;
