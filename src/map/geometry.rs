use geo::MultiPolygon;

use crate::braille::BrailleCanvas;
use crate::map::projection::Viewport;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Stroke every ring of a multipolygon, culling offscreen segments.
/// `thick` adds a one-pixel offset copy for the highlighted outline.
pub fn draw_outline(
    canvas: &mut BrailleCanvas,
    shape: &MultiPolygon<f64>,
    viewport: &Viewport,
    thick: bool,
) {
    let rings = shape
        .iter()
        .flat_map(|poly| std::iter::once(poly.exterior()).chain(poly.interiors()));

    for ring in rings {
        let mut prev: Option<(i32, i32)> = None;
        for coord in ring.coords() {
            let p = viewport.project(coord.x, coord.y);
            if let Some(q) = prev {
                if viewport.line_might_be_visible(q, p) {
                    draw_line(canvas, q.0, q.1, p.0, p.1);
                    if thick {
                        draw_line(canvas, q.0 + 1, q.1, p.0 + 1, p.1);
                        draw_line(canvas, q.0, q.1 + 1, p.0, p.1 + 1);
                    }
                }
            }
            prev = Some(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        for col in 0..5 {
            assert_eq!(canvas.glyph(col, 0), Some('⠉'));
        }
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.glyph(0, 0), Some('⡇'));
        assert_eq!(canvas.glyph(0, 1), Some('⡇'));
    }

    #[test]
    fn test_outline_touches_canvas_edges_only_on_ring() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 80, 80);
        let square = MultiPolygon::new(vec![polygon![
            (x: -45.0, y: -40.0),
            (x: 45.0, y: -40.0),
            (x: 45.0, y: 40.0),
            (x: -45.0, y: 40.0),
            (x: -45.0, y: -40.0),
        ]]);
        let mut canvas = BrailleCanvas::new(40, 20);
        draw_outline(&mut canvas, &square, &vp, false);

        let (cx, cy) = vp.project(0.0, 0.0);
        assert_eq!(canvas.glyph(cx as usize / 2, cy as usize / 4), None);
        let (ex, ey) = vp.project(-45.0, 0.0);
        assert!(canvas.glyph(ex as usize / 2, ey as usize / 4).is_some());
    }
}
