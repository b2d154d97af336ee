use crate::{CoreError, CoreResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Frame construction settings, resolved once per frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameConfig {
    /// Number of pyramid levels, level 0 included
    pub pyramid_levels: usize,
    /// Number of pyramid levels FAST runs on
    pub max_fast_levels: usize,
    /// Side of a grid cell in pixels used when filtering corners
    pub cell_size: usize,
    /// Attach binary descriptors to corners
    pub use_descriptors: bool,
    /// FAST intensity threshold
    pub fast_threshold: u8,
    /// Minimum contiguous arc length of the FAST circle
    pub fast_n: u8,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            pyramid_levels: 5,
            max_fast_levels: 3,
            cell_size: 30,
            use_descriptors: true,
            fast_threshold: 20,
            fast_n: 9,
        }
    }
}

impl FrameConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> CoreResult<()> {
        if self.pyramid_levels == 0 {
            return Err(CoreError::InvalidPyramidLevels(self.pyramid_levels));
        }
        if self.max_fast_levels > self.pyramid_levels {
            return Err(CoreError::InvalidDetectionLevels {
                max_fast_levels: self.max_fast_levels,
                pyramid_levels: self.pyramid_levels,
            });
        }
        if self.cell_size == 0 {
            return Err(CoreError::InvalidCellSize(self.cell_size));
        }
        if self.fast_threshold == 0 || self.fast_threshold > 127 {
            return Err(CoreError::InvalidThreshold(self.fast_threshold));
        }
        if !(9..=12).contains(&self.fast_n) {
            return Err(CoreError::InvalidArcLength(self.fast_n));
        }
        Ok(())
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "FrameConfig: levels={}, fast_levels={}, cell={}, descriptors={}, FAST-{} threshold={}",
            self.pyramid_levels,
            self.max_fast_levels,
            self.cell_size,
            self.use_descriptors,
            self.fast_n,
            self.fast_threshold
        )
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Io(e.to_string()))?;
        Self::from_json(&content)
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| CoreError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| CoreError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FrameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_levels() {
        let cfg = FrameConfig { pyramid_levels: 0, ..FrameConfig::default() };
        assert_eq!(cfg.validate(), Err(CoreError::InvalidPyramidLevels(0)));

        let cfg = FrameConfig { pyramid_levels: 2, max_fast_levels: 3, ..FrameConfig::default() };
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidDetectionLevels { .. })));
    }

    #[test]
    fn test_invalid_fast_parameters() {
        let cfg = FrameConfig { fast_threshold: 0, ..FrameConfig::default() };
        assert_eq!(cfg.validate(), Err(CoreError::InvalidThreshold(0)));

        let cfg = FrameConfig { fast_n: 16, ..FrameConfig::default() };
        assert_eq!(cfg.validate(), Err(CoreError::InvalidArcLength(16)));

        let cfg = FrameConfig { cell_size: 0, ..FrameConfig::default() };
        assert_eq!(cfg.validate(), Err(CoreError::InvalidCellSize(0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_partial_document_uses_defaults() {
        let cfg = FrameConfig::from_toml("pyramid_levels = 4\nuse_descriptors = false\n").unwrap();
        assert_eq!(cfg.pyramid_levels, 4);
        assert!(!cfg.use_descriptors);
        assert_eq!(cfg.cell_size, FrameConfig::default().cell_size);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let cfg = FrameConfig { cell_size: 16, ..FrameConfig::default() };
        let json = cfg.to_json().unwrap();
        assert_eq!(FrameConfig::from_json(&json).unwrap(), cfg);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_invalid_document_rejected() {
        assert!(matches!(
            FrameConfig::from_toml("max_fast_levels = 9\n"),
            Err(CoreError::InvalidDetectionLevels { .. })
        ));
        assert!(matches!(FrameConfig::from_json("{ not json"), Err(CoreError::Parse(_))));
    }
}
