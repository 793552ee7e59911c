use std::f64::consts::PI;
use std::time::{Duration, Instant};

const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 200.0;

/// Web Mercator y in [0, 1] for a latitude in degrees
#[inline]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

/// Inverse of [`mercator_y`]
#[inline]
fn mercator_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// Viewport representing the visible map area and zoom level.
///
/// Coordinates are braille pixels: each terminal cell is 2 wide, 4 tall.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level; 1.0 fits the whole world across the canvas width
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Resize to a canvas of `cols` x `rows` terminal cells
    pub fn set_cells(&mut self, cols: u16, rows: u16) {
        self.width = cols as usize * 2;
        self.height = rows as usize * 4;
    }

    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.scale().max(1.0);
        let cx = (self.center_lon + 180.0) / 360.0 + dx as f64 / scale;
        let cy = mercator_y(self.center_lat) + dy as f64 / scale;

        self.center_lon = cx * 360.0 - 180.0;
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
        self.center_lat = mercator_lat(cy).clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom by factor keeping the point under (px, py) fixed
    pub fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Pixel coordinates back to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        self.unproject_f(px as f64, py as f64)
    }

    /// Sub-pixel variant of [`Viewport::unproject`]
    pub fn unproject_f(&self, px: f64, py: f64) -> (f64, f64) {
        let scale = self.scale();
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let x = (px - self.width as f64 / 2.0) / scale + center_x;
        let y = (py - self.height as f64 / 2.0) / scale + center_y;

        (x * 360.0 - 180.0, mercator_lat(y))
    }

    /// (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);
        let scale = self.scale();

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;
        (px, py)
    }

    /// Rough bbox check for a projected segment
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

/// An animated camera move from one view to another
#[derive(Clone, Debug)]
struct Flight {
    from: (f64, f64, f64),
    to: (f64, f64, f64),
    started: Instant,
    duration: Duration,
}

impl Flight {
    /// Position at `now`; ease-out cubic, zoom interpolated geometrically
    fn at(&self, now: Instant) -> ((f64, f64, f64), bool) {
        let elapsed = now.saturating_duration_since(self.started);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        if t >= 1.0 {
            return (self.to, true);
        }
        let e = 1.0 - (1.0 - t).powi(3);
        let lerp = |a: f64, b: f64| a + (b - a) * e;
        let zoom = (self.from.2.ln() + (self.to.2.ln() - self.from.2.ln()) * e).exp();
        ((lerp(self.from.0, self.to.0), lerp(self.from.1, self.to.1), zoom), false)
    }
}

/// Viewport plus an optional in-progress flight
#[derive(Clone, Debug)]
pub struct Camera {
    pub viewport: Viewport,
    flight: Option<Flight>,
}

impl Camera {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            flight: None,
        }
    }

    /// Start flying to a center and zoom over `duration`
    pub fn fly_to(&mut self, lon: f64, lat: f64, zoom: f64, duration: Duration, now: Instant) {
        let vp = &self.viewport;
        self.flight = Some(Flight {
            from: (vp.center_lon, vp.center_lat, vp.zoom),
            to: (lon, lat, zoom),
            started: now,
            duration,
        });
    }

    /// Where the camera is headed: the flight target, or the current view
    pub fn target(&self) -> (f64, f64, f64) {
        match &self.flight {
            Some(f) => f.to,
            None => (self.viewport.center_lon, self.viewport.center_lat, self.viewport.zoom),
        }
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Advance any flight; returns true while still moving
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(flight) = &self.flight else {
            return false;
        };
        let ((lon, lat, zoom), done) = flight.at(now);
        self.viewport.center_lon = lon;
        self.viewport.center_lat = lat;
        self.viewport.zoom = zoom;
        if done {
            self.flight = None;
        }
        !done
    }

    /// Manual pan/zoom cancels a flight where it stands
    pub fn interrupt(&mut self) {
        self.flight = None;
    }
}
