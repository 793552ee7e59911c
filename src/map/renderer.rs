use geo::{Contains, Point};
use rayon::prelude::*;

use crate::braille::BrailleCanvas;
use crate::data::Region;
use crate::map::geometry::draw_outline;
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;

/// A set of regions drawn together (the states, or one state's counties)
pub struct Layer {
    /// Changes whenever the layer is replaced; keys the render cache
    pub id: u64,
    pub regions: Vec<Region>,
    grid: FeatureGrid,
}

impl Layer {
    pub fn new(id: u64, regions: Vec<Region>, cell_size: f64) -> Self {
        let grid = FeatureGrid::build(regions.iter().map(|r| &r.bbox), cell_size);
        Self { id, regions, grid }
    }

    /// Index of the region containing (lon, lat)
    pub fn region_at(&self, lon: f64, lat: f64) -> Option<usize> {
        let point = Point::new(lon, lat);
        self.grid.candidates(lon, lat).iter().copied().find(|&idx| {
            let region = &self.regions[idx];
            region.bbox.contains(&point) && region.shape.contains(&point)
        })
    }

    /// Index of the region joined to `key`
    pub fn find(&self, key: &str) -> Option<usize> {
        self.regions
            .iter()
            .position(|r| r.key.as_deref() == Some(key))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Identifies the inputs a [`Rendered`] was computed from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderKey {
    layer: u64,
    center_lon: u64,
    center_lat: u64,
    zoom: u64,
    width: usize,
    height: usize,
}

impl RenderKey {
    pub fn new(layer: u64, viewport: &Viewport) -> Self {
        Self {
            layer,
            center_lon: viewport.center_lon.to_bits(),
            center_lat: viewport.center_lat.to_bits(),
            zoom: viewport.zoom.to_bits(),
            width: viewport.width,
            height: viewport.height,
        }
    }
}

/// A layer rasterized to terminal cells: which region fills each cell,
/// plus the braille outline of every region.
pub struct Rendered {
    pub key: RenderKey,
    pub cols: usize,
    pub rows: usize,
    /// Row-major region index per cell
    pub fill: Vec<Option<usize>>,
    pub borders: BrailleCanvas,
}

impl Rendered {
    pub fn region_at_cell(&self, col: usize, row: usize) -> Option<usize> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.fill[row * self.cols + col]
    }
}

/// Rasterize a layer for the viewport. Cells sample the region under their
/// center; rows are filled in parallel.
pub fn render_layer(layer: &Layer, viewport: &Viewport) -> Rendered {
    let cols = viewport.width / 2;
    let rows = viewport.height / 4;

    let fill: Vec<Option<usize>> = (0..cols * rows)
        .into_par_iter()
        .map(|i| {
            let (col, row) = (i % cols, i / cols);
            let (lon, lat) = viewport.unproject_f(col as f64 * 2.0 + 1.0, row as f64 * 4.0 + 2.0);
            layer.region_at(lon, lat)
        })
        .collect();

    let mut borders = BrailleCanvas::new(cols, rows);
    for region in &layer.regions {
        draw_outline(&mut borders, &region.shape, viewport, false);
    }

    Rendered {
        key: RenderKey::new(layer.id, viewport),
        cols,
        rows,
        fill,
        borders,
    }
}

/// Thick outline of a single region, used for the selected state
pub fn render_highlight(region: &Region, viewport: &Viewport) -> BrailleCanvas {
    let mut canvas = BrailleCanvas::new(viewport.width / 2, viewport.height / 4);
    draw_outline(&mut canvas, &region.shape, viewport, true);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon, MultiPolygon, Rect};

    fn square(key: &str, x: f64, y: f64, size: f64) -> Region {
        Region {
            key: Some(key.to_string()),
            name: key.to_string(),
            shape: MultiPolygon::new(vec![polygon![
                (x: x, y: y),
                (x: x + size, y: y),
                (x: x + size, y: y + size),
                (x: x, y: y + size),
                (x: x, y: y),
            ]]),
            bbox: Rect::new(coord! { x: x, y: y }, coord! { x: x + size, y: y + size }),
        }
    }

    fn two_states() -> Layer {
        Layer::new(
            1,
            vec![square("CO", -109.0, 37.0, 4.0), square("KS", -102.0, 37.0, 4.0)],
            2.0,
        )
    }

    #[test]
    fn test_region_at_hits_polygon() {
        let layer = two_states();
        assert_eq!(layer.region_at(-107.0, 39.0), Some(0));
        assert_eq!(layer.region_at(-100.0, 39.0), Some(1));
        // Gap between the squares
        assert_eq!(layer.region_at(-104.0, 39.0), None);
        assert_eq!(layer.find("KS"), Some(1));
        assert_eq!(layer.find("TX"), None);
    }

    #[test]
    fn test_render_fills_cells_under_regions() {
        let layer = two_states();
        let viewport = Viewport::new(-103.0, 39.0, 20.0, 160, 80);
        let rendered = render_layer(&layer, &viewport);
        assert_eq!((rendered.cols, rendered.rows), (80, 20));

        let (px, py) = viewport.project(-107.0, 39.0);
        let cell = rendered.region_at_cell(px as usize / 2, py as usize / 4);
        assert_eq!(cell, Some(0));

        let (px, py) = viewport.project(-104.0, 39.0);
        assert_eq!(rendered.region_at_cell(px as usize / 2, py as usize / 4), None);
        assert_eq!(rendered.region_at_cell(500, 500), None);
    }

    #[test]
    fn test_render_key_tracks_viewport() {
        let layer = two_states();
        let mut viewport = Viewport::new(-103.0, 39.0, 20.0, 160, 80);
        let a = RenderKey::new(layer.id, &viewport);
        viewport.pan(4, 0);
        assert_ne!(a, RenderKey::new(layer.id, &viewport));
    }
}
