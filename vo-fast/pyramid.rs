use vo_core::Image;
use crate::error::{FastError, FastResult};
use rayon::prelude::*;

/// Build a pyramid of `levels` images, each half the size of the previous one.
///
/// Level 0 is `base` itself (moved, not copied). Level k has dimensions
/// `(w_{k-1} / 2, h_{k-1} / 2)` with integer floor division, so levels of a
/// small base may be empty.
pub fn build_pyramid(base: Image, levels: usize) -> FastResult<Vec<Image>> {
    if levels < 1 {
        return Err(FastError::InvalidLevelCount(levels));
    }
    if base.is_empty() {
        return Err(FastError::EmptyImage);
    }

    let mut pyramid = Vec::with_capacity(levels);
    pyramid.push(base);

    // Small bases keep halving down to empty levels
    for _ in 1..levels {
        let next = downsample_half(&pyramid[pyramid.len() - 1]);
        pyramid.push(next);
    }

    Ok(pyramid)
}

/// 2x2 box filter followed by decimation, rounding to nearest
pub fn downsample_half(src: &Image) -> Image {
    let dst_w = src.width() / 2;
    let dst_h = src.height() / 2;
    let mut dst = Image::filled(dst_w, dst_h, 0);

    if dst_w > 0 {
        dst.as_raw_mut()
            .par_chunks_mut(dst_w)
            .enumerate()
            .for_each(|(y, row)| {
                let top = src.row(2 * y);
                let bottom = src.row(2 * y + 1);
                for (x, out) in row.iter_mut().enumerate() {
                    let sum = top[2 * x] as u16
                        + top[2 * x + 1] as u16
                        + bottom[2 * x] as u16
                        + bottom[2 * x + 1] as u16;
                    *out = ((sum + 2) / 4) as u8;
                }
            });
    }

    dst
}
