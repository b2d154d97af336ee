use thiserror::Error;
use vo_core::CoreError;
use vo_fast::FastError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("Invalid frame configuration: {0}")]
    Config(#[from] CoreError),
    #[error("Corner detection failed: {0}")]
    Fast(#[from] FastError),
    #[error("Corners of frame {frame_id} were already filtered")]
    AlreadyFiltered { frame_id: u64 },
    #[error("Feature slot {index} is empty while locking grid cells")]
    EmptyFeatureSlot { index: usize },
    #[error("Unknown frame handle")]
    UnknownFrame,
}

pub type FrameResult<T> = Result<T, FrameError>;
