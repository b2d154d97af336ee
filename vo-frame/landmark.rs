use nalgebra::Vector3;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Non-owning handle to a landmark stored in a `Map`
    pub struct LandmarkKey;
}

/// 3D point tracked across frames
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    position: Vector3<f64>,
}

impl Landmark {
    pub fn new(position: Vector3<f64>) -> Self {
        Self { position }
    }

    /// World position
    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.position = position;
    }
}

/// Resolves landmark handles to world positions.
///
/// Returns `None` for handles whose landmark no longer exists.
pub trait LandmarkStore {
    fn landmark_position(&self, key: LandmarkKey) -> Option<Vector3<f64>>;
}

impl LandmarkStore for SlotMap<LandmarkKey, Landmark> {
    fn landmark_position(&self, key: LandmarkKey) -> Option<Vector3<f64>> {
        self.get(key).map(Landmark::position)
    }
}
