use std::collections::HashMap;

use geo::Rect;

/// Uniform grid index over region bounding boxes.
///
/// Each region is inserted into every cell its bbox overlaps, so a point
/// lookup only needs the one cell containing the point. Candidates are
/// conservative: callers still test the polygon itself.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from region bounding boxes, indexed by position
    pub fn build<'a>(bboxes: impl Iterator<Item = &'a Rect<f64>>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            let min_cell = grid.to_cell(bbox.min().x, bbox.min().y);
            let max_cell = grid.to_cell(bbox.max().x, bbox.max().y);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Regions whose bbox overlaps the grid cell containing the point
    #[inline]
    pub fn candidates(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map_or(&[], Vec::as_slice)
    }
}
