pub mod builder;
pub mod detector;
pub mod error;
pub mod grid;
pub mod pyramid;
pub mod types;
pub mod utils;

pub use builder::DetectorBuilder;
pub use detector::{FastDetector, FAST_OFFSETS};
pub use error::{FastError, FastResult};
pub use grid::CellGrid;
pub use pyramid::{build_pyramid, downsample_half};
pub use types::FastParams;
