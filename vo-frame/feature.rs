use nalgebra::Vector2;

use crate::landmark::LandmarkKey;

/// Observation slot of a frame: an image position, optionally bound to a landmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature {
    /// Full-resolution pixel position
    pub position: Vector2<f64>,
    /// Pyramid level the observation was made at
    pub level: usize,
    landmark: Option<LandmarkKey>,
}

impl Feature {
    pub fn new(position: Vector2<f64>, level: usize) -> Self {
        Self { position, level, landmark: None }
    }

    pub fn with_landmark(mut self, landmark: LandmarkKey) -> Self {
        self.landmark = Some(landmark);
        self
    }

    pub fn landmark(&self) -> Option<LandmarkKey> {
        self.landmark
    }

    pub fn set_landmark(&mut self, landmark: LandmarkKey) {
        self.landmark = Some(landmark);
    }

    /// Drop the landmark binding; the landmark itself is untouched
    pub fn clear_landmark(&mut self) {
        self.landmark = None;
    }
}
