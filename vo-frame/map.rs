//! Owner of frames and landmarks.
//!
//! Frames refer to landmarks and to neighbor keyframes through slotmap keys,
//! never through owning pointers. A key whose target was removed simply stops
//! resolving.

use nalgebra::Vector3;
use slotmap::{new_key_type, SlotMap};

use crate::error::{FrameError, FrameResult};
use crate::frame::Frame;
use crate::landmark::{Landmark, LandmarkKey, LandmarkStore};

new_key_type! {
    /// Non-owning handle to a frame stored in a `Map`
    pub struct FrameKey;
}

#[derive(Debug, Default)]
pub struct Map {
    frames: SlotMap<FrameKey, Frame>,
    landmarks: SlotMap<LandmarkKey, Landmark>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_frame(&mut self, frame: Frame) -> FrameKey {
        self.frames.insert(frame)
    }

    pub fn frame(&self, key: FrameKey) -> Option<&Frame> {
        self.frames.get(key)
    }

    pub fn frame_mut(&mut self, key: FrameKey) -> Option<&mut Frame> {
        self.frames.get_mut(key)
    }

    /// Remove a frame; edges other frames hold to it stop resolving
    pub fn remove_frame(&mut self, key: FrameKey) -> Option<Frame> {
        self.frames.remove(key)
    }

    pub fn frames(&self) -> impl Iterator<Item = (FrameKey, &Frame)> {
        self.frames.iter()
    }

    pub fn keyframes(&self) -> impl Iterator<Item = (FrameKey, &Frame)> {
        self.frames.iter().filter(|(_, f)| f.is_keyframe())
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn insert_landmark(&mut self, landmark: Landmark) -> LandmarkKey {
        self.landmarks.insert(landmark)
    }

    pub fn landmark(&self, key: LandmarkKey) -> Option<&Landmark> {
        self.landmarks.get(key)
    }

    pub fn landmark_mut(&mut self, key: LandmarkKey) -> Option<&mut Landmark> {
        self.landmarks.get_mut(key)
    }

    /// Remove a landmark; features bound to it stop contributing to depth
    pub fn remove_landmark(&mut self, key: LandmarkKey) -> Option<Landmark> {
        self.landmarks.remove(key)
    }

    pub fn num_landmarks(&self) -> usize {
        self.landmarks.len()
    }

    /// Add a covisibility edge in both directions
    pub fn connect(&mut self, a: FrameKey, b: FrameKey, shared_points: usize) -> FrameResult<()> {
        if !self.frames.contains_key(a) || !self.frames.contains_key(b) {
            return Err(FrameError::UnknownFrame);
        }
        if let Some(frame) = self.frames.get_mut(a) {
            frame.add_connection(b, shared_points);
        }
        if let Some(frame) = self.frames.get_mut(b) {
            frame.add_connection(a, shared_points);
        }
        Ok(())
    }

    /// Scene depth of a frame resolved against this map's landmarks
    pub fn scene_depth(&self, key: FrameKey) -> Option<f64> {
        self.frames.get(key).map(|f| f.scene_depth(&self.landmarks))
    }

    /// Features of a frame bound to landmarks still in this map
    pub fn num_points(&self, key: FrameKey) -> Option<usize> {
        self.frames.get(key).map(|f| f.num_points(&self.landmarks))
    }
}

impl LandmarkStore for Map {
    fn landmark_position(&self, key: LandmarkKey) -> Option<Vector3<f64>> {
        self.landmarks.landmark_position(key)
    }
}
