use std::ops::Range;

use vo_core::{Corner, Descriptor, Image, DESCRIPTOR_SIZE};
use vo_fast::{FastDetector, FastResult};

/// Per-level corners with a row lookup table and optional descriptor slots.
///
/// `row_tables[l][r]` is the index of the first corner of level `l` whose row
/// is `>= r`; the table has `rows + 1` entries so `row_tables[l][rows]` equals
/// the corner count. Corner lists must be sorted by row.
#[derive(Debug, Clone, Default)]
pub struct CornerIndex {
    corners: Vec<Vec<Corner>>,
    row_tables: Vec<Vec<usize>>,
    descriptors: Option<Vec<Vec<Descriptor>>>,
}

impl CornerIndex {
    /// Detect corners on the first `max_levels` pyramid levels and index them
    pub fn build(
        detector: &FastDetector,
        pyramid: &[Image],
        max_levels: usize,
        with_descriptors: bool,
    ) -> FastResult<Self> {
        let corners = detector.detect_pyramid(pyramid, max_levels)?;
        let rows: Vec<usize> = pyramid[..max_levels].iter().map(Image::height).collect();
        Ok(Self::from_corners(corners, &rows, with_descriptors))
    }

    /// Index already detected, row-sorted corner lists; `level_rows[l]` is the
    /// image height of level `l`
    pub fn from_corners(corners: Vec<Vec<Corner>>, level_rows: &[usize], with_descriptors: bool) -> Self {
        debug_assert_eq!(corners.len(), level_rows.len());
        debug_assert!(corners
            .iter()
            .all(|level| level.windows(2).all(|w| w[0].y <= w[1].y)));

        let row_tables = corners
            .iter()
            .zip(level_rows)
            .map(|(level, &rows)| build_row_table(level, rows))
            .collect();

        let descriptors = with_descriptors.then(|| {
            corners
                .iter()
                .map(|level| vec![[0u8; DESCRIPTOR_SIZE]; level.len()])
                .collect()
        });

        Self { corners, row_tables, descriptors }
    }

    /// Number of detection levels
    pub fn levels(&self) -> usize {
        self.corners.len()
    }

    pub fn corners(&self) -> &[Vec<Corner>] {
        &self.corners
    }

    pub fn level(&self, level: usize) -> &[Corner] {
        &self.corners[level]
    }

    pub fn row_table(&self, level: usize) -> &[usize] {
        &self.row_tables[level]
    }

    /// Corners of `level` whose row lies in `rows`
    pub fn corners_in_rows(&self, level: usize, rows: Range<usize>) -> &[Corner] {
        let table = &self.row_tables[level];
        let last = table.len() - 1;
        let start = rows.start.min(last);
        let end = rows.end.min(last);
        if start >= end {
            return &[];
        }
        &self.corners[level][table[start]..table[end]]
    }

    pub fn has_descriptors(&self) -> bool {
        self.descriptors.is_some()
    }

    /// Descriptor slots of `level`, aligned with `level(level)`
    pub fn descriptors(&self, level: usize) -> Option<&[Descriptor]> {
        self.descriptors.as_ref().map(|d| d[level].as_slice())
    }

    pub fn descriptors_mut(&mut self, level: usize) -> Option<&mut [Descriptor]> {
        self.descriptors.as_mut().map(|d| d[level].as_mut_slice())
    }
}

/// Single forward scan over a row-sorted corner list
fn build_row_table(corners: &[Corner], rows: usize) -> Vec<usize> {
    let mut table = Vec::with_capacity(rows + 1);
    let mut index = 0;
    for r in 0..=rows {
        while index < corners.len() && corners[index].y < r {
            index += 1;
        }
        table.push(index);
    }
    table
}
