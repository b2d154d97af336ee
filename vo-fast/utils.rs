//! Utility functions for corner detection algorithms

/// Check if there are at least `min_count` consecutive set bits in the circular 16-bit mask
/// using a branch-free rotate-and-and reduction
pub fn has_consecutive_pixels(mask: u16, min_count: usize) -> bool {
    if min_count > 16 || min_count == 0 {
        return false;
    }

    // For a run of length n: mask & rotl(mask, 1) & ... & rotl(mask, n-1) != 0
    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= mask.rotate_left(i as u32);
        if test_mask == 0 {
            return false;
        }
    }

    test_mask != 0
}

/// Pack a boolean circle into a 16-bit mask, bit i = pixel i
pub fn circle_mask(pixels: &[bool; 16]) -> u16 {
    pixels
        .iter()
        .enumerate()
        .fold(0u16, |mask, (i, &set)| if set { mask | (1 << i) } else { mask })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_fallback(pixels: &[bool; 16], min_count: usize) -> bool {
        let mut current = 0;
        for i in 0..32 {
            if pixels[i % 16] {
                current += 1;
                if current >= min_count {
                    return true;
                }
            } else {
                current = 0;
            }
        }
        false
    }

    #[test]
    fn test_consecutive_pixels_simple() {
        let mut pixels = [false; 16];
        for p in pixels.iter_mut().take(9) {
            *p = true;
        }
        let mask = circle_mask(&pixels);
        assert!(has_consecutive_pixels(mask, 9));
        assert!(!has_consecutive_pixels(mask, 10));
    }

    #[test]
    fn test_consecutive_pixels_wrap_around() {
        let mut pixels = [false; 16];
        for p in pixels.iter_mut().skip(12) {
            *p = true;
        }
        for p in pixels.iter_mut().take(5) {
            *p = true;
        }
        assert!(has_consecutive_pixels(circle_mask(&pixels), 9));
    }

    #[test]
    fn test_non_consecutive_pixels() {
        let mut pixels = [false; 16];
        for i in (0..16).step_by(2) {
            pixels[i] = true;
        }
        assert!(!has_consecutive_pixels(circle_mask(&pixels), 2));
    }

    #[test]
    fn test_full_and_empty_masks() {
        assert!(has_consecutive_pixels(u16::MAX, 16));
        assert!(!has_consecutive_pixels(0, 1));
        assert!(!has_consecutive_pixels(u16::MAX, 0));
    }

    #[test]
    fn test_bitmask_matches_run_counting() {
        // Every mask of a sparse sample of the 16-bit space
        for mask in (0..=u16::MAX).step_by(37) {
            let mut pixels = [false; 16];
            for (i, p) in pixels.iter_mut().enumerate() {
                *p = mask & (1 << i) != 0;
            }
            for n in 9..=12 {
                assert_eq!(
                    has_consecutive_pixels(mask, n),
                    run_fallback(&pixels, n),
                    "Mismatch for mask={:#06x} n={}", mask, n
                );
            }
        }
    }
}
