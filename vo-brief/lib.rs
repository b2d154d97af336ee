use vo_core::{Descriptor, DescriptorExtractor, Image, DESCRIPTOR_SIZE};
use rayon::prelude::*;

/// Number of intensity comparisons, one per descriptor bit
const N_PAIRS: usize = DESCRIPTOR_SIZE * 8;

/// Sampling offsets stay within this radius on each axis
const PAIR_RANGE: i32 = 13;

/// Radius of the intensity-centroid patch used for orientation
const ORIENTATION_RADIUS: i32 = 15;

/// Distance to the image edge a keypoint needs so every rotated sample and
/// the orientation patch stay inside the image
pub const BORDER: usize = 20;

/// Steered BRIEF extractor with a fixed, deterministic sampling pattern
#[derive(Debug, Clone)]
pub struct BriefExtractor {
    pairs: Vec<(i32, i32, i32, i32)>,
}

impl Default for BriefExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BriefExtractor {
    pub fn new() -> Self {
        Self::with_seed(0x2545_F491)
    }

    /// Build a sampling pattern from a seed; equal seeds give equal patterns
    pub fn with_seed(seed: u32) -> Self {
        let mut state = seed;
        let span = (2 * PAIR_RANGE + 1) as u32;
        let mut next = move || {
            // Numerical Recipes LCG
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((state >> 16) % span) as i32 - PAIR_RANGE
        };

        let pairs = (0..N_PAIRS)
            .map(|_| {
                let (x1, y1) = (next(), next());
                let mut p2 = (next(), next());
                while p2 == (x1, y1) {
                    p2 = (next(), next());
                }
                (x1, y1, p2.0, p2.1)
            })
            .collect();

        Self { pairs }
    }

    /// True when a descriptor can be computed at (x, y)
    pub fn fits(img: &Image, x: usize, y: usize) -> bool {
        x >= BORDER && y >= BORDER && x + BORDER < img.width() && y + BORDER < img.height()
    }

    /// Describe many positions in parallel; `None` where the patch does not fit
    pub fn describe_all(&self, img: &Image, points: &[(usize, usize)]) -> Vec<Option<Descriptor>> {
        points
            .par_iter()
            .map(|&(x, y)| self.describe(img, x, y))
            .collect()
    }

    pub fn describe(&self, img: &Image, x: usize, y: usize) -> Option<Descriptor> {
        if !Self::fits(img, x, y) {
            return None;
        }

        let angle = orientation(img, x, y);
        let (s, c) = angle.sin_cos();
        let (cx, cy) = (x as f32, y as f32);
        let mut d = [0u8; DESCRIPTOR_SIZE];

        for (i, &(dx1, dy1, dx2, dy2)) in self.pairs.iter().enumerate() {
            // Apply rotation and translation
            let (rx1, ry1) = (
                cx + c * dx1 as f32 - s * dy1 as f32,
                cy + s * dx1 as f32 + c * dy1 as f32,
            );
            let (rx2, ry2) = (
                cx + c * dx2 as f32 - s * dy2 as f32,
                cy + s * dx2 as f32 + c * dy2 as f32,
            );

            let val1 = bilinear_sample(img, rx1, ry1);
            let val2 = bilinear_sample(img, rx2, ry2);

            let bit = (val1 < val2) as u8;
            d[i / 8] |= bit << (i % 8);
        }
        Some(d)
    }
}

impl DescriptorExtractor for BriefExtractor {
    fn extract(&self, img: &Image, x: usize, y: usize) -> Option<Descriptor> {
        self.describe(img, x, y)
    }
}

/// Number of differing bits between two descriptors
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Intensity centroid orientation over a circular patch
fn orientation(img: &Image, x: usize, y: usize) -> f32 {
    let r = ORIENTATION_RADIUS;
    let mut m10 = 0i64;
    let mut m01 = 0i64;

    for dy in -r..=r {
        let yy = (y as i32 + dy) as usize;
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let xx = (x as i32 + dx) as usize;
            let val = img.get(xx, yy) as i64;
            m10 += dx as i64 * val;
            m01 += dy as i64 * val;
        }
    }

    if m10 == 0 && m01 == 0 {
        0.0
    } else {
        (m01 as f32).atan2(m10 as f32)
    }
}

/// Bilinear interpolation for subpixel sampling; callers keep (x, y) inside
fn bilinear_sample(img: &Image, x: f32, y: f32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let dx = x - x0;
    let dy = y - y0;

    let x0_idx = x0 as usize;
    let y0_idx = y0 as usize;
    let x1_idx = (x0_idx + 1).min(img.width() - 1);
    let y1_idx = (y0_idx + 1).min(img.height() - 1);

    let p00 = img.get(x0_idx, y0_idx) as f32;
    let p10 = img.get(x1_idx, y0_idx) as f32;
    let p01 = img.get(x0_idx, y1_idx) as f32;
    let p11 = img.get(x1_idx, y1_idx) as f32;

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;

    top * (1.0 - dy) + bottom * dy
}
