use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use nalgebra::{Isometry3, Point3, Vector2, Vector3};
use vo_core::{Corner, Descriptor, DescriptorExtractor, FrameConfig, Image};
use vo_fast::{build_pyramid, CellGrid, DetectorBuilder};

use crate::camera::Camera;
use crate::corners::CornerIndex;
use crate::error::{FrameError, FrameResult};
use crate::feature::Feature;
use crate::id::FrameIdAllocator;
use crate::landmark::LandmarkStore;
use crate::map::FrameKey;

/// Rigid world-to-camera transform
pub type Se3 = Isometry3<f64>;

/// One camera image with its pyramid, corners, observations and graph edges
pub struct Frame {
    id: u64,
    camera: Arc<dyn Camera>,
    extractor: Arc<dyn DescriptorExtractor>,
    pose: Se3,
    width: usize,
    height: usize,
    pyramid_levels: usize,
    cell_size: usize,
    use_descriptors: bool,
    pyramid: Vec<Image>,
    corners: CornerIndex,
    filtered: bool,
    filtered_corners: Vec<Corner>,
    filtered_descriptors: Option<Vec<Descriptor>>,
    features: Vec<Option<Feature>>,
    connections: Vec<(FrameKey, usize)>,
    is_keyframe: bool,
    selected: bool,
    last_ba: i64,
}

impl Frame {
    /// Build the pyramid of `img` and detect corners on its first levels.
    ///
    /// The id is taken from `ids` only once construction has succeeded.
    pub fn new(
        ids: &FrameIdAllocator,
        camera: Arc<dyn Camera>,
        extractor: Arc<dyn DescriptorExtractor>,
        img: Image,
        cfg: &FrameConfig,
    ) -> FrameResult<Self> {
        cfg.validate()?;

        let (width, height) = (img.width(), img.height());
        let pyramid = build_pyramid(img, cfg.pyramid_levels)?;
        let detector = DetectorBuilder::from_config(cfg).build()?;
        let corners = CornerIndex::build(&detector, &pyramid, cfg.max_fast_levels, cfg.use_descriptors)?;

        let id = ids.next_id();
        debug!(
            "Frame {} ({}x{}): {} pyramid levels, corners per level {:?}",
            id,
            width,
            height,
            pyramid.len(),
            corners.corners().iter().map(Vec::len).collect::<Vec<_>>()
        );

        Ok(Self {
            id,
            camera,
            extractor,
            pose: Se3::identity(),
            width,
            height,
            pyramid_levels: cfg.pyramid_levels,
            cell_size: cfg.cell_size,
            use_descriptors: cfg.use_descriptors,
            pyramid,
            corners,
            filtered: false,
            filtered_corners: Vec::new(),
            filtered_descriptors: None,
            features: Vec::new(),
            connections: Vec::new(),
            is_keyframe: false,
            selected: false,
            last_ba: -1,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn camera(&self) -> &Arc<dyn Camera> {
        &self.camera
    }

    pub fn pose(&self) -> &Se3 {
        &self.pose
    }

    pub fn set_pose(&mut self, pose: Se3) {
        self.pose = pose;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pyramid_levels(&self) -> usize {
        self.pyramid_levels
    }

    pub fn pyramid(&self) -> &[Image] {
        &self.pyramid
    }

    pub fn image(&self, level: usize) -> &Image {
        &self.pyramid[level]
    }

    pub fn corners(&self) -> &CornerIndex {
        &self.corners
    }

    /// Mutable index, used to fill descriptor slots of unfiltered corners
    pub fn corners_mut(&mut self) -> &mut CornerIndex {
        &mut self.corners
    }

    // Keyframe state

    /// Promote to keyframe; there is no way back
    pub fn set_keyframe(&mut self) {
        self.is_keyframe = true;
    }

    pub fn is_keyframe(&self) -> bool {
        self.is_keyframe
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Last bundle adjustment iteration that touched this frame, -1 if none
    pub fn last_ba(&self) -> i64 {
        self.last_ba
    }

    pub fn set_last_ba(&mut self, iteration: i64) {
        self.last_ba = iteration;
    }

    // Filtered corners

    /// Filter corners with the cell size of the frame configuration
    pub fn filter_corners_default(&mut self) -> FrameResult<()> {
        self.filter_corners(self.cell_size)
    }

    /// Keep the best corner of every grid cell not covered by a feature.
    ///
    /// Runs once per frame: a second call fails with `AlreadyFiltered` and
    /// leaves the first result untouched. With descriptors enabled, corners
    /// whose descriptor cannot be extracted are dropped.
    pub fn filter_corners(&mut self, cell_size: usize) -> FrameResult<()> {
        if self.filtered {
            return Err(FrameError::AlreadyFiltered { frame_id: self.id });
        }

        let mut grid = CellGrid::new(self.width, self.height, cell_size)?;
        for (index, slot) in self.features.iter().enumerate() {
            let feature = slot.as_ref().ok_or(FrameError::EmptyFeatureSlot { index })?;
            grid.lock_cell(feature.position.x, feature.position.y);
        }

        let candidates = grid.filter_corners(self.corners.corners());
        let n_candidates = candidates.len();

        if self.use_descriptors {
            let extractor = &self.extractor;
            let pyramid = &self.pyramid;
            let (kept, descriptors): (Vec<Corner>, Vec<Descriptor>) = candidates
                .into_iter()
                .filter_map(|c| {
                    let desc = extractor.extract(&pyramid[c.level], c.x, c.y);
                    if desc.is_none() {
                        trace!("Frame {}: no descriptor at ({}, {}) level {}", self.id, c.x, c.y, c.level);
                    }
                    desc.map(|d| (c, d))
                })
                .unzip();
            self.filtered_corners = kept;
            self.filtered_descriptors = Some(descriptors);
        } else {
            self.filtered_corners = candidates;
            self.filtered_descriptors = None;
        }
        self.filtered = true;

        debug!(
            "Frame {}: {} locked cells, {} candidates, {} kept, {} dropped",
            self.id,
            grid.locked_count(),
            n_candidates,
            self.filtered_corners.len(),
            n_candidates - self.filtered_corners.len()
        );
        Ok(())
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn filtered_corners(&self) -> &[Corner] {
        &self.filtered_corners
    }

    /// Descriptors aligned with `filtered_corners`, `None` when disabled
    pub fn filtered_descriptors(&self) -> Option<&[Descriptor]> {
        self.filtered_descriptors.as_deref()
    }

    /// Forget the filtered corners so `filter_corners` may run again
    pub fn reset_filtered_corners(&mut self) {
        self.filtered = false;
        self.filtered_corners.clear();
        self.filtered_descriptors = None;
    }

    // Features

    /// Append a feature, returning its slot index
    pub fn add_feature(&mut self, feature: Feature) -> usize {
        self.features.push(Some(feature));
        self.features.len() - 1
    }

    pub fn features(&self) -> &[Option<Feature>] {
        &self.features
    }

    pub fn feature_mut(&mut self, index: usize) -> Option<&mut Feature> {
        self.features.get_mut(index).and_then(Option::as_mut)
    }

    /// Empty one slot without shifting the others
    pub fn clear_feature(&mut self, index: usize) -> Option<Feature> {
        self.features.get_mut(index).and_then(Option::take)
    }

    /// Release every feature slot; landmarks are not touched
    pub fn remove_features(&mut self) {
        self.features.clear();
    }

    /// Number of features bound to a landmark that still exists
    pub fn num_points<S: LandmarkStore + ?Sized>(&self, landmarks: &S) -> usize {
        self.features
            .iter()
            .flatten()
            .filter_map(|f| f.landmark())
            .filter(|&key| landmarks.landmark_position(key).is_some())
            .count()
    }

    /// Median depth of the landmarks seen by this frame, 0.0 when there are none
    pub fn scene_depth<S: LandmarkStore + ?Sized>(&self, landmarks: &S) -> f64 {
        let mut depths: Vec<f64> = self
            .features
            .iter()
            .flatten()
            .filter_map(|f| f.landmark())
            .filter_map(|key| landmarks.landmark_position(key))
            .map(|p| self.relative_position(&p).z)
            .collect();

        median(&mut depths).unwrap_or(0.0)
    }

    // Covisibility

    /// Append an edge; duplicates are the caller's concern
    pub fn add_connection(&mut self, neighbor: FrameKey, shared_points: usize) {
        self.connections.push((neighbor, shared_points));
    }

    pub fn connections(&self) -> &[(FrameKey, usize)] {
        &self.connections
    }

    /// The `n` neighbors sharing the most points, best first.
    ///
    /// `n == 0` or `n` not smaller than the connection count returns every
    /// neighbor in list order without sorting. Otherwise the list is sorted
    /// in place (stable, descending by shared points) and stays sorted.
    pub fn best_connections(&mut self, n: usize) -> Vec<FrameKey> {
        if n == 0 || n >= self.connections.len() {
            return self.connections.iter().map(|&(key, _)| key).collect();
        }

        self.connections.sort_by(|a, b| b.1.cmp(&a.1));
        self.connections.iter().take(n).map(|&(key, _)| key).collect()
    }

    // Projection

    /// World point expressed in the camera frame
    pub fn relative_position(&self, p_world: &Vector3<f64>) -> Vector3<f64> {
        self.pose.transform_point(&Point3::from(*p_world)).coords
    }

    /// Pixel of a world point, `None` when it lies behind the camera or on
    /// its center plane
    pub fn project(&self, p_world: &Vector3<f64>) -> Option<Vector2<f64>> {
        let rel = self.relative_position(p_world);
        if rel.z < 0.0 {
            return None;
        }
        let px = self.camera.project(&rel);
        (px.x.is_finite() && px.y.is_finite()).then_some(px)
    }

    pub fn is_visible(&self, p_world: &Vector3<f64>) -> bool {
        match self.project(p_world) {
            Some(px) => {
                let pixel = Vector2::new(px.x.round() as i32, px.y.round() as i32);
                self.camera.is_inside_image(&pixel)
            }
            None => false,
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pyramid_levels", &self.pyramid_levels)
            .field("is_keyframe", &self.is_keyframe)
            .field("features", &self.features.len())
            .field("connections", &self.connections.len())
            .field("filtered", &self.filtered)
            .finish()
    }
}

/// Median of sorted values; even counts average the two middle values
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) * 0.5)
    } else {
        Some(values[mid])
    }
}
