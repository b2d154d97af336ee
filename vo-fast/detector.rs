use vo_core::{Corner, Image};
use crate::error::{FastError, FastResult};
use crate::types::{CornerType, FastParams};
use crate::utils::has_consecutive_pixels;
use log::debug;
use rayon::prelude::*;

/// FAST circle offsets for corner detection (Bresenham circle of radius 3)
pub const FAST_OFFSETS: [(i32, i32); 16] = [
    (0, -3), (1, -3), (2, -2), (3, -1),
    (3, 0), (3, 1), (2, 2), (1, 3),
    (0, 3), (-1, 3), (-2, 2), (-3, 1),
    (-3, 0), (-3, -1), (-2, -2), (-1, -3),
];

/// Multi-level FAST corner detector
#[derive(Debug, Clone)]
pub struct FastDetector {
    params: FastParams,
}

impl FastDetector {
    /// Creates a new FAST detector with validation
    pub fn new(params: FastParams) -> FastResult<Self> {
        // 0 would detect everything, >127 breaks the saturating u8 comparisons
        if params.threshold == 0 || params.threshold > 127 {
            return Err(FastError::InvalidThreshold(params.threshold));
        }
        // The quick compass rejection below is only sound for arcs of 9 or more
        if !(9..=12).contains(&params.arc_length) {
            return Err(FastError::InvalidArcLength(params.arc_length));
        }
        Ok(Self {
            params: FastParams {
                border: params.border.max(3),
                ..params
            },
        })
    }

    /// Get detector parameters
    pub fn params(&self) -> &FastParams {
        &self.params
    }

    /// Detect corners on the first `max_levels` pyramid levels.
    ///
    /// Each returned list is sorted by ascending row, then ascending column.
    pub fn detect_pyramid(&self, pyramid: &[Image], max_levels: usize) -> FastResult<Vec<Vec<Corner>>> {
        if max_levels > pyramid.len() {
            return Err(FastError::TooManyDetectionLevels {
                requested: max_levels,
                available: pyramid.len(),
            });
        }

        let corners: Vec<Vec<Corner>> = pyramid[..max_levels]
            .iter()
            .enumerate()
            .map(|(level, img)| self.detect_level(img, level))
            .collect();

        debug!(
            "FAST detected {:?} corners on {} levels",
            corners.iter().map(Vec::len).collect::<Vec<_>>(),
            max_levels
        );
        Ok(corners)
    }

    /// Detect corners in a single image tagged with `level`, row-sorted
    pub fn detect_level(&self, img: &Image, level: usize) -> Vec<Corner> {
        let (w, h) = (img.width(), img.height());
        let border = self.params.border;
        if w <= 2 * border || h <= 2 * border {
            return Vec::new();
        }

        let scores = self.score_map(img);
        let nms = self.params.nms;

        let rows: Vec<Vec<Corner>> = (border..h - border)
            .into_par_iter()
            .map(|y| {
                let mut row = Vec::new();
                for x in border..w - border {
                    let s = scores[y * w + x];
                    if s <= 0.0 {
                        continue;
                    }
                    if nms && !is_local_maximum(&scores, w, x, y, s) {
                        continue;
                    }
                    row.push(Corner::new(x, y, level, s));
                }
                row
            })
            .collect();

        rows.into_iter().flatten().collect()
    }

    /// Dense FAST score map, zero where the pixel is not a corner
    fn score_map(&self, img: &Image) -> Vec<f32> {
        let (w, h) = (img.width(), img.height());
        let border = self.params.border;
        let mut scores = vec![0.0f32; w * h];

        scores
            .par_chunks_mut(w)
            .enumerate()
            .filter(|(y, _)| *y >= border && *y < h - border)
            .for_each(|(y, row)| {
                for x in border..w - border {
                    row[x] = self.corner_score(img, x, y);
                }
            });

        scores
    }

    /// FAST score of a pixel: mean absolute difference of the passing arc pixels
    pub fn corner_score(&self, img: &Image, x: usize, y: usize) -> f32 {
        let p = img.get(x, y);
        let t = self.params.threshold;

        let (corner_type, bright, dark) = self.classify(img, x, y, p, t);
        let (mask, sign) = match corner_type {
            CornerType::Bright => (bright, 1i32),
            CornerType::Dark => (dark, -1i32),
            CornerType::None => return 0.0,
        };

        let mut sum = 0i32;
        let mut count = 0i32;
        for (i, &(dx, dy)) in FAST_OFFSETS.iter().enumerate() {
            if mask & (1 << i) != 0 {
                let q = sample(img, x, y, dx, dy) as i32;
                sum += sign * (q - p as i32);
                count += 1;
            }
        }
        sum as f32 / count as f32
    }

    fn classify(&self, img: &Image, x: usize, y: usize, p: u8, t: u8) -> (CornerType, u16, u16) {
        let bright_limit = p.saturating_add(t);
        let dark_limit = p.saturating_sub(t);

        // Compass pixels 0, 4, 8, 12: an arc of 9+ covers at least two of them
        let mut compass_bright = 0;
        let mut compass_dark = 0;
        for i in [0usize, 4, 8, 12] {
            let (dx, dy) = FAST_OFFSETS[i];
            let q = sample(img, x, y, dx, dy);
            if q > bright_limit {
                compass_bright += 1;
            } else if q < dark_limit {
                compass_dark += 1;
            }
        }
        if compass_bright < 2 && compass_dark < 2 {
            return (CornerType::None, 0, 0);
        }

        let mut bright = 0u16;
        let mut dark = 0u16;
        for (i, &(dx, dy)) in FAST_OFFSETS.iter().enumerate() {
            let q = sample(img, x, y, dx, dy);
            if q > bright_limit {
                bright |= 1 << i;
            } else if q < dark_limit {
                dark |= 1 << i;
            }
        }

        let n = self.params.arc_length as usize;
        let corner_type = if has_consecutive_pixels(bright, n) {
            CornerType::Bright
        } else if has_consecutive_pixels(dark, n) {
            CornerType::Dark
        } else {
            CornerType::None
        };
        (corner_type, bright, dark)
    }
}

#[inline]
fn sample(img: &Image, x: usize, y: usize, dx: i32, dy: i32) -> u8 {
    img.get((x as i32 + dx) as usize, (y as i32 + dy) as usize)
}

/// 3x3 maximum test; ties go to the first pixel in raster order
fn is_local_maximum(scores: &[f32], w: usize, x: usize, y: usize, s: f32) -> bool {
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let n = scores[(y as i32 + dy) as usize * w + (x as i32 + dx) as usize];
            let before = dy < 0 || (dy == 0 && dx < 0);
            if n > s || (before && n == s) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyramid::build_pyramid;

    fn create_test_params() -> FastParams {
        FastParams::default()
    }

    /// Dark background with bright squares, whose corners trigger FAST
    fn create_squares_image(width: usize, height: usize, centers: &[(usize, usize)]) -> Image {
        let mut img = Image::filled(width, height, 50);
        for &(cx, cy) in centers {
            for y in cy - 4..=cy + 4 {
                for x in cx - 4..=cx + 4 {
                    img.set(x, y, 255);
                }
            }
        }
        img
    }

    #[test]
    fn test_invalid_threshold() {
        let params = FastParams { threshold: 0, ..create_test_params() };
        assert!(matches!(FastDetector::new(params), Err(FastError::InvalidThreshold(0))));

        let params = FastParams { threshold: 200, ..create_test_params() };
        assert!(matches!(FastDetector::new(params), Err(FastError::InvalidThreshold(200))));
    }

    #[test]
    fn test_invalid_arc_length() {
        let params = FastParams { arc_length: 7, ..create_test_params() };
        assert!(matches!(FastDetector::new(params), Err(FastError::InvalidArcLength(7))));
    }

    #[test]
    fn test_border_never_below_radius() {
        let params = FastParams { border: 0, ..create_test_params() };
        assert_eq!(FastDetector::new(params).unwrap().params().border, 3);
    }

    #[test]
    fn test_uniform_image_has_no_corners() {
        let detector = FastDetector::new(create_test_params()).unwrap();
        assert!(detector.detect_level(&Image::filled(40, 40, 128), 0).is_empty());
    }

    #[test]
    fn test_tiny_image_has_no_corners() {
        let detector = FastDetector::new(create_test_params()).unwrap();
        assert!(detector.detect_level(&Image::filled(6, 6, 128), 0).is_empty());
    }

    #[test]
    fn test_square_corners_detected() {
        let detector = FastDetector::new(create_test_params()).unwrap();
        let img = create_squares_image(40, 40, &[(20, 20)]);
        let corners = detector.detect_level(&img, 0);
        assert!(!corners.is_empty());
        // Every detection lies near one of the four square corners
        for c in &corners {
            let near_x = c.x.abs_diff(16) <= 2 || c.x.abs_diff(24) <= 2;
            let near_y = c.y.abs_diff(16) <= 2 || c.y.abs_diff(24) <= 2;
            assert!(near_x && near_y, "unexpected corner at ({}, {})", c.x, c.y);
            assert!(c.score > 0.0 && c.score.is_finite());
        }
    }

    #[test]
    fn test_output_is_row_sorted() {
        let detector = FastDetector::new(create_test_params()).unwrap();
        let img = create_squares_image(80, 80, &[(15, 60), (60, 15), (40, 40), (15, 15)]);
        let corners = detector.detect_level(&img, 0);
        assert!(corners.len() > 4);
        for pair in corners.windows(2) {
            assert!((pair[0].y, pair[0].x) < (pair[1].y, pair[1].x));
        }
    }

    #[test]
    fn test_nms_keeps_isolated_maxima() {
        let img = create_squares_image(40, 40, &[(20, 20)]);
        let with_nms = FastDetector::new(create_test_params()).unwrap().detect_level(&img, 0);
        let without_nms = FastDetector::new(FastParams { nms: false, ..create_test_params() })
            .unwrap()
            .detect_level(&img, 0);
        assert!(with_nms.len() <= without_nms.len());
        for (i, a) in with_nms.iter().enumerate() {
            for b in &with_nms[i + 1..] {
                assert!(a.x.abs_diff(b.x) > 1 || a.y.abs_diff(b.y) > 1);
            }
        }
    }

    #[test]
    fn test_detect_pyramid_levels() {
        let detector = FastDetector::new(create_test_params()).unwrap();
        let img = create_squares_image(128, 128, &[(40, 40), (88, 88)]);
        let pyramid = build_pyramid(img, 3).unwrap();

        let corners = detector.detect_pyramid(&pyramid, 2).unwrap();
        assert_eq!(corners.len(), 2);
        for (level, list) in corners.iter().enumerate() {
            assert!(list.iter().all(|c| c.level == level));
        }

        assert_eq!(
            detector.detect_pyramid(&pyramid, 4),
            Err(FastError::TooManyDetectionLevels { requested: 4, available: 3 })
        );
    }

    #[test]
    fn test_parallel_determinism() {
        let detector = FastDetector::new(create_test_params()).unwrap();
        let img = create_squares_image(100, 100, &[(20, 20), (50, 70), (80, 30)]);
        let first = detector.detect_level(&img, 0);
        for _ in 0..5 {
            assert_eq!(detector.detect_level(&img, 0), first);
        }
    }
}
