//! Per-image frame of a monocular visual odometry front end.
//!
//! A [`Frame`] owns the image pyramid of one camera image, the FAST corners
//! detected on it, a ledger of feature observations bound to landmarks, and
//! its edges in the keyframe covisibility graph. Landmarks and neighbor frames
//! live in a [`Map`] and are referenced by key.

pub mod camera;
pub mod corners;
pub mod error;
pub mod feature;
pub mod frame;
pub mod id;
pub mod landmark;
pub mod map;

pub use camera::{Camera, PinholeCamera};
pub use corners::CornerIndex;
pub use error::{FrameError, FrameResult};
pub use feature::Feature;
pub use frame::{Frame, Se3};
pub use id::FrameIdAllocator;
pub use landmark::{Landmark, LandmarkKey, LandmarkStore};
pub use map::{FrameKey, Map};

pub use vo_brief::BriefExtractor;
pub use vo_core::{self, Corner, Descriptor, DescriptorExtractor, FrameConfig, Image};
