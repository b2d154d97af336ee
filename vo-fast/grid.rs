use vo_core::Corner;
use crate::error::{FastError, FastResult};

/// Cell grid over a full-resolution image used to spread corners spatially.
///
/// Cells that already hold a tracked feature are locked; filtering keeps at
/// most one corner, the highest scored one, per unlocked cell.
#[derive(Debug, Clone)]
pub struct CellGrid {
    cell_size: usize,
    cols: usize,
    rows: usize,
    locked: Vec<bool>,
}

impl CellGrid {
    /// Create a grid covering a `width` x `height` image
    pub fn new(width: usize, height: usize, cell_size: usize) -> FastResult<Self> {
        if cell_size == 0 {
            return Err(FastError::InvalidCellSize(cell_size));
        }
        let cols = width.div_ceil(cell_size);
        let rows = height.div_ceil(cell_size);
        Ok(Self {
            cell_size,
            cols,
            rows,
            locked: vec![false; cols * rows],
        })
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    /// Grid dimensions as (columns, rows)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    fn cell_index(&self, x: f64, y: f64) -> Option<usize> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let cx = (x as usize) / self.cell_size;
        let cy = (y as usize) / self.cell_size;
        if cx >= self.cols || cy >= self.rows {
            return None;
        }
        Some(cy * self.cols + cx)
    }

    /// Lock the cell containing a level-0 pixel position.
    ///
    /// Returns false when the position lies outside the grid.
    pub fn lock_cell(&mut self, x: f64, y: f64) -> bool {
        match self.cell_index(x, y) {
            Some(idx) => {
                self.locked[idx] = true;
                true
            }
            None => false,
        }
    }

    pub fn is_locked(&self, x: f64, y: f64) -> bool {
        self.cell_index(x, y).map_or(false, |idx| self.locked[idx])
    }

    pub fn locked_count(&self) -> usize {
        self.locked.iter().filter(|&&l| l).count()
    }

    /// Select the best corner of every unlocked cell across all levels.
    ///
    /// Corner positions are scaled to level 0 for the cell lookup. The result
    /// is ordered by cell in raster order.
    pub fn filter_corners(&self, corners: &[Vec<Corner>]) -> Vec<Corner> {
        let mut best: Vec<Option<Corner>> = vec![None; self.locked.len()];

        for corner in corners.iter().flatten() {
            let (x0, y0) = corner.level0_position();
            let Some(idx) = self.cell_index(x0 as f64, y0 as f64) else {
                continue;
            };
            if self.locked[idx] {
                continue;
            }
            match &best[idx] {
                Some(current) if current.score >= corner.score => {}
                _ => best[idx] = Some(*corner),
            }
        }

        best.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cell_size() {
        assert!(matches!(CellGrid::new(100, 100, 0), Err(FastError::InvalidCellSize(0))));
    }

    #[test]
    fn test_partial_cells_are_covered() {
        let grid = CellGrid::new(100, 45, 30).unwrap();
        assert_eq!(grid.dimensions(), (4, 2));
    }

    #[test]
    fn test_lock_cell() {
        let mut grid = CellGrid::new(100, 100, 10).unwrap();
        assert!(grid.lock_cell(15.5, 27.2));
        assert!(grid.is_locked(10.0, 20.0));
        assert!(grid.is_locked(19.9, 29.9));
        assert!(!grid.is_locked(20.0, 20.0));
        assert_eq!(grid.locked_count(), 1);
    }

    #[test]
    fn test_lock_outside_is_ignored() {
        let mut grid = CellGrid::new(100, 100, 10).unwrap();
        assert!(!grid.lock_cell(-1.0, 5.0));
        assert!(!grid.lock_cell(100.0, 5.0));
        assert!(!grid.lock_cell(f64::NAN, 5.0));
        assert_eq!(grid.locked_count(), 0);
    }

    #[test]
    fn test_one_corner_per_cell() {
        let grid = CellGrid::new(40, 40, 20).unwrap();
        let corners = vec![vec![
            Corner::new(2, 2, 0, 10.0),
            Corner::new(5, 5, 0, 30.0),
            Corner::new(25, 5, 0, 5.0),
        ]];
        let filtered = grid.filter_corners(&corners);
        assert_eq!(filtered, vec![Corner::new(5, 5, 0, 30.0), Corner::new(25, 5, 0, 5.0)]);
    }

    #[test]
    fn test_locked_cells_are_skipped() {
        let mut grid = CellGrid::new(40, 40, 20).unwrap();
        grid.lock_cell(10.0, 10.0);
        let corners = vec![vec![Corner::new(5, 5, 0, 30.0), Corner::new(30, 30, 0, 1.0)]];
        assert_eq!(grid.filter_corners(&corners), vec![Corner::new(30, 30, 0, 1.0)]);
    }

    #[test]
    fn test_higher_levels_compete_in_level0_cells() {
        let grid = CellGrid::new(40, 40, 20).unwrap();
        // (12, 12) at level 1 lands on (24, 24): bottom-right cell
        let corners = vec![
            vec![Corner::new(30, 30, 0, 4.0)],
            vec![Corner::new(12, 12, 1, 9.0)],
        ];
        assert_eq!(grid.filter_corners(&corners), vec![Corner::new(12, 12, 1, 9.0)]);
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let grid = CellGrid::new(20, 20, 20).unwrap();
        let corners = vec![vec![Corner::new(3, 3, 0, 7.0), Corner::new(9, 9, 0, 7.0)]];
        assert_eq!(grid.filter_corners(&corners), vec![Corner::new(3, 3, 0, 7.0)]);
    }
}
