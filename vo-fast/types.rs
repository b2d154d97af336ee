/// Tunable parameters of the FAST detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastParams {
    /// Intensity difference a circle pixel needs to count as brighter/darker
    pub threshold: u8,
    /// Minimum contiguous arc of the 16-pixel circle
    pub arc_length: u8,
    /// Pixels skipped along every image edge, at least the circle radius
    pub border: usize,
    /// Keep only 3x3 local maxima of the score map
    pub nms: bool,
}

impl Default for FastParams {
    fn default() -> Self {
        Self {
            threshold: 20,
            arc_length: 9,
            border: 3,
            nms: true,
        }
    }
}

/// Corner type classification for a candidate pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CornerType {
    Bright,
    Dark,
    None,
}
