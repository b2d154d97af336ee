use vo_core::FrameConfig;
use crate::detector::FastDetector;
use crate::error::FastResult;
use crate::types::FastParams;

/// Builder for creating a `FastDetector`
#[derive(Debug, Clone, Default)]
pub struct DetectorBuilder {
    params: FastParams,
}

impl DetectorBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the FAST settings of a frame configuration
    pub fn from_config(cfg: &FrameConfig) -> Self {
        Self::new().threshold(cfg.fast_threshold).fast_n(cfg.fast_n)
    }

    /// Set the FAST threshold (1-127)
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.params.threshold = threshold;
        self
    }

    /// Set the minimum contiguous arc (FAST-9 to FAST-12)
    pub fn fast_n(mut self, n: u8) -> Self {
        self.params.arc_length = n;
        self
    }

    /// Set the number of border pixels excluded from detection
    pub fn border(mut self, border: usize) -> Self {
        self.params.border = border;
        self
    }

    /// Enable or disable 3x3 non-maximum suppression
    pub fn nms(mut self, enable: bool) -> Self {
        self.params.nms = enable;
        self
    }

    /// Build the detector, validating parameters
    pub fn build(self) -> FastResult<FastDetector> {
        FastDetector::new(self.params)
    }

    /// Generate summary of current configuration
    pub fn summary(&self) -> String {
        format!(
            "DetectorBuilder: FAST-{} threshold={}, border={}, NMS:{}",
            self.params.arc_length, self.params.threshold, self.params.border, self.params.nms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FastError;

    #[test]
    fn test_builder_sets_params() {
        let detector = DetectorBuilder::new()
            .threshold(35)
            .fast_n(12)
            .border(8)
            .nms(false)
            .build()
            .unwrap();
        assert_eq!(
            *detector.params(),
            FastParams { threshold: 35, arc_length: 12, border: 8, nms: false }
        );
    }

    #[test]
    fn test_from_config() {
        let cfg = FrameConfig { fast_threshold: 11, fast_n: 10, ..FrameConfig::default() };
        let detector = DetectorBuilder::from_config(&cfg).build().unwrap();
        assert_eq!(detector.params().threshold, 11);
        assert_eq!(detector.params().arc_length, 10);
    }

    #[test]
    fn test_build_validates() {
        assert!(matches!(
            DetectorBuilder::new().threshold(0).build(),
            Err(FastError::InvalidThreshold(0))
        ));
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            DetectorBuilder::new().summary(),
            "DetectorBuilder: FAST-9 threshold=20, border=3, NMS:true"
        );
    }
}
