mod config;

pub use config::FrameConfig;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },
    #[error("Invalid pyramid level count: {0} (must be >= 1)")]
    InvalidPyramidLevels(usize),
    #[error("Detection levels {max_fast_levels} exceed pyramid levels {pyramid_levels}")]
    InvalidDetectionLevels { max_fast_levels: usize, pyramid_levels: usize },
    #[error("Invalid cell size: {0} (must be > 0)")]
    InvalidCellSize(usize),
    #[error("Invalid FAST threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),
    #[error("Invalid FAST arc length: {0} (must be 9-12)")]
    InvalidArcLength(u8),
    #[cfg(feature = "serde")]
    #[error("Failed to read configuration: {0}")]
    Io(String),
    #[cfg(feature = "serde")]
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Row-major 8-bit grayscale image with its dimensions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Image {
    /// Wraps row-major pixel data, checking that it covers `width * height`
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> CoreResult<Self> {
        let expected_len = width * height;
        if data.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Image with every pixel set to `value`
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the image has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// FAST corner at integer pixel position of a pyramid level.
///
/// `x` and `y` are expressed in the coordinates of `level`, not level 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub x: usize,
    pub y: usize,
    pub level: usize,
    pub score: f32,
}

impl Corner {
    pub fn new(x: usize, y: usize, level: usize, score: f32) -> Self {
        Self { x, y, level, score }
    }

    /// Position scaled back to full resolution
    pub fn level0_position(&self) -> (usize, usize) {
        (self.x << self.level, self.y << self.level)
    }
}

/// Length of a binary descriptor in bytes
pub const DESCRIPTOR_SIZE: usize = 32;

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; DESCRIPTOR_SIZE];

/// Computes a fixed-length binary descriptor around a pixel.
///
/// Returns `None` when no descriptor can be computed at that location,
/// typically because the sampling patch leaves the image.
pub trait DescriptorExtractor: Send + Sync {
    fn extract(&self, img: &Image, x: usize, y: usize) -> Option<Descriptor>;
}

/// Default worker count for the global Rayon pool
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_length_check() {
        let result = Image::new(4, 4, vec![0; 15]);
        assert_eq!(
            result,
            Err(CoreError::InvalidImageData { expected_len: 16, actual_len: 15 })
        );
        assert!(Image::new(4, 4, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_image_access() {
        let mut img = Image::filled(5, 3, 10);
        img.set(4, 2, 200);
        assert_eq!(img.get(4, 2), 200);
        assert_eq!(img.row(2), &[10, 10, 10, 10, 200]);
        assert!(!img.is_empty());
        assert!(Image::filled(0, 3, 0).is_empty());
    }

    #[test]
    fn test_corner_level0_position() {
        let c = Corner::new(10, 7, 2, 1.0);
        assert_eq!(c.level0_position(), (40, 28));
    }
}
