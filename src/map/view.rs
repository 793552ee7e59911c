use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::braille::BrailleCanvas;
use crate::data::{CountyData, Job, MapBase, Outcome, StateData};
use crate::lookup::state_fips_prefix;
use crate::map::projection::{Camera, Viewport};
use crate::map::renderer::{render_highlight, render_layer, Layer, RenderKey, Rendered};
use crate::metric::{color_for, format_value, MetricType, Swatch, NEUTRAL_GRAY};

/// National view center (lon, lat)
pub const NATIONAL_CENTER: (f64, f64) = (-98.5, 39.8);
/// National view zoom; frames the lower 48 on a roughly 2:1 terminal
pub const NATIONAL_ZOOM: f64 = 5.0;
/// Zoom after drilling into a state (two web-map zoom steps past national)
pub const STATE_ZOOM: f64 = 20.0;
/// Camera flight time for drill-in and reset
pub const FLY_DURATION: Duration = Duration::from_millis(800);

const STATE_GRID_DEGREES: f64 = 2.0;
const COUNTY_GRID_DEGREES: f64 = 0.25;

/// Which geography the map is showing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Focus {
    National,
    DrilledIn { state: String },
}

/// A request the view wants the loader to run, tagged with its sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub seq: u64,
    pub job: Job,
}

/// What a cell of the map currently resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    State(usize),
    County(usize),
}

/// Cached rasterization for the active layer
struct Frame {
    layer: Rendered,
    /// Whether `layer` holds counties rather than states
    counties: bool,
    highlight: Option<BrailleCanvas>,
}

/// State/county choropleth with drill-down.
///
/// Owns its loaded data and camera; the selected metric is owned by the
/// shell and passed into every styling call.
pub struct MapView {
    loading: bool,
    states: HashMap<String, StateData>,
    /// County rows keyed by state abbreviation, then padded FIPS
    counties_by_state: HashMap<String, HashMap<String, CountyData>>,
    state_layer: Option<Layer>,
    county_layer: Option<Layer>,
    focus: Focus,
    camera: Camera,
    next_seq: u64,
    /// Sequence of the county request the current selection is waiting on
    pending_county: Option<u64>,
    next_layer_id: u64,
    frame: Option<Frame>,
}

impl MapView {
    /// Create the view in its loading state along with the initial request
    pub fn mount() -> (Self, Request) {
        let mut view = Self {
            loading: true,
            states: HashMap::new(),
            counties_by_state: HashMap::new(),
            state_layer: None,
            county_layer: None,
            focus: Focus::National,
            camera: Camera::new(Viewport::new(
                NATIONAL_CENTER.0,
                NATIONAL_CENTER.1,
                NATIONAL_ZOOM,
                0,
                0,
            )),
            next_seq: 0,
            pending_county: None,
            next_layer_id: 0,
            frame: None,
        };
        let request = view.request(Job::MapBase);
        (view, request)
    }

    fn request(&mut self, job: Job) -> Request {
        let seq = self.next_seq;
        self.next_seq += 1;
        Request { seq, job }
    }

    fn layer_id(&mut self) -> u64 {
        self.next_layer_id += 1;
        self.next_layer_id
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn selected_state(&self) -> Option<&str> {
        match &self.focus {
            Focus::National => None,
            Focus::DrilledIn { state } => Some(state),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.camera.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn state_layer(&self) -> Option<&Layer> {
        self.state_layer.as_ref()
    }

    pub fn county_layer(&self) -> Option<&Layer> {
        self.county_layer.as_ref()
    }

    /// Apply a finished load addressed to this view
    pub fn apply(&mut self, seq: u64, outcome: Outcome) {
        match outcome {
            Outcome::MapBase(result) => {
                match result {
                    Ok(base) => self.apply_base(base),
                    Err(e) => log::error!("Failed to load map data: {e}"),
                }
                self.loading = false;
            }
            Outcome::CountyShapes { state, result } => {
                let current = self.pending_county == Some(seq)
                    && self.selected_state() == Some(state.as_str());
                if !current {
                    log::debug!("discarding stale county geometry for {state} (seq {seq})");
                    return;
                }
                self.pending_county = None;
                match result {
                    Ok(regions) => {
                        let id = self.layer_id();
                        self.county_layer = Some(Layer::new(id, regions, COUNTY_GRID_DEGREES));
                    }
                    Err(e) => log::error!("Failed to load county geometry for {state}: {e}"),
                }
            }
            Outcome::Scatter(_) => log::warn!("map view ignoring scatter data"),
        }
    }

    fn apply_base(&mut self, base: MapBase) {
        self.states = base
            .states
            .into_iter()
            .map(|s| (s.abbrev.clone(), s))
            .collect();
        self.counties_by_state = base
            .counties_by_state
            .into_iter()
            .map(|(state, rows)| {
                let by_fips = rows.into_iter().map(|c| (c.fips.clone(), c)).collect();
                (state, by_fips)
            })
            .collect();
        let id = self.layer_id();
        self.state_layer = Some(Layer::new(id, base.state_regions, STATE_GRID_DEGREES));
    }

    /// Drill into the state region at `idx` of the national layer.
    ///
    /// Unmatched features are ignored. Returns the county geometry request
    /// when the state has a FIPS prefix.
    pub fn select_state(&mut self, idx: usize, now: Instant) -> Option<Request> {
        let region = self.state_layer.as_ref()?.regions.get(idx)?;
        let abbrev = region.key.clone()?;
        let (lon, lat) = region.center();

        log::info!("Selected state {abbrev}");
        self.focus = Focus::DrilledIn {
            state: abbrev.clone(),
        };
        self.county_layer = None;
        self.pending_county = None;
        self.frame = None;
        self.camera.fly_to(lon, lat, STATE_ZOOM, FLY_DURATION, now);

        let Some(prefix) = state_fips_prefix(&abbrev) else {
            log::warn!("No FIPS prefix for {abbrev}; county layer unavailable");
            return None;
        };
        let request = self.request(Job::CountyShapes {
            state: abbrev,
            prefix: prefix.to_string(),
        });
        self.pending_county = Some(request.seq);
        Some(request)
    }

    /// Return to the national view
    pub fn reset(&mut self, now: Instant) {
        if self.focus != Focus::National {
            log::info!("Reset to national view");
        }
        self.focus = Focus::National;
        self.county_layer = None;
        self.pending_county = None;
        self.frame = None;
        self.camera.fly_to(
            NATIONAL_CENTER.0,
            NATIONAL_CENTER.1,
            NATIONAL_ZOOM,
            FLY_DURATION,
            now,
        );
    }

    /// Advance camera animation; true while moving
    pub fn tick(&mut self, now: Instant) -> bool {
        self.camera.tick(now)
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.camera.interrupt();
        self.camera.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.camera.interrupt();
        self.camera.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.camera.interrupt();
        self.camera.viewport.zoom_out();
    }

    /// Zoom around a canvas cell
    pub fn zoom_at_cell(&mut self, col: u16, row: u16, factor: f64) {
        self.camera.interrupt();
        let (px, py) = (col as i32 * 2, row as i32 * 4);
        self.camera.viewport.zoom_at(px, py, factor);
    }

    /// Layer to draw; the states stay up until the county layer arrives
    fn active_layer(&self) -> Option<(&Layer, bool)> {
        match (&self.focus, &self.county_layer) {
            (Focus::DrilledIn { .. }, Some(counties)) => Some((counties, true)),
            _ => self.state_layer.as_ref().map(|states| (states, false)),
        }
    }

    /// Rasterize the active layer for a canvas of `cols` x `rows` cells,
    /// reusing the previous result when nothing moved.
    pub fn prepare(&mut self, cols: u16, rows: u16) {
        self.camera.viewport.set_cells(cols, rows);
        let viewport = &self.camera.viewport;
        let Some((layer, counties)) = self.active_layer() else {
            self.frame = None;
            return;
        };
        let key = RenderKey::new(layer.id, viewport);
        if self.frame.as_ref().is_some_and(|f| f.layer.key == key) {
            return;
        }

        let rendered = render_layer(layer, viewport);
        let highlight = self.selected_state().and_then(|abbrev| {
            let states = self.state_layer.as_ref()?;
            let region = &states.regions[states.find(abbrev)?];
            Some(render_highlight(region, viewport))
        });
        self.frame = Some(Frame {
            layer: rendered,
            counties,
            highlight,
        });
    }

    /// Region under a canvas cell in the last prepared frame
    pub fn hit(&self, col: u16, row: u16) -> Option<Hit> {
        let frame = self.frame.as_ref()?;
        let idx = frame.layer.region_at_cell(col as usize, row as usize)?;
        Some(if frame.counties {
            Hit::County(idx)
        } else {
            Hit::State(idx)
        })
    }

    /// Handle a click on a canvas cell. Only states are clickable, and only
    /// from the national view.
    pub fn click(&mut self, col: u16, row: u16, now: Instant) -> Option<Request> {
        match self.hit(col, row)? {
            Hit::State(idx) if self.focus == Focus::National => self.select_state(idx, now),
            _ => None,
        }
    }

    fn state_row(&self, idx: usize) -> Option<&StateData> {
        let key = self.state_layer.as_ref()?.regions.get(idx)?.key.as_deref()?;
        self.states.get(key)
    }

    fn county_row(&self, idx: usize) -> Option<&CountyData> {
        let state = self.selected_state()?;
        let fips = self.county_layer.as_ref()?.regions.get(idx)?.key.as_deref()?;
        self.counties_by_state.get(state)?.get(fips)
    }

    /// Fill color for a hit under the given metric
    pub fn fill(&self, hit: Hit, metric: MetricType) -> Swatch {
        let value = match hit {
            Hit::State(idx) => self.state_row(idx).map(|s| s.metric_value(metric)),
            Hit::County(idx) => self.county_row(idx).map(|c| c.metric_value(metric)),
        };
        value.map_or(NEUTRAL_GRAY, |v| color_for(v, metric))
    }

    /// Tooltip lines for a hit; `None` for features with no joined data
    pub fn tooltip(&self, hit: Hit, metric: MetricType) -> Option<Vec<String>> {
        match hit {
            Hit::State(idx) => {
                let region = self.state_layer.as_ref()?.regions.get(idx)?;
                let row = self.state_row(idx)?;
                Some(vec![
                    format!("{} ({})", region.name, row.abbrev),
                    format!(
                        "{}: {}",
                        metric.label(),
                        format_value(row.metric_value(metric), metric)
                    ),
                ])
            }
            Hit::County(idx) => {
                let row = self.county_row(idx)?;
                Some(vec![
                    format!("County: {}", row.fips),
                    format!(
                        "{}: {}",
                        metric.label(),
                        format_value(row.metric_value(metric), metric)
                    ),
                    format!(
                        "Population: {}",
                        format_value(row.population, MetricType::Population)
                    ),
                ])
            }
        }
    }

    /// Border glyph for a cell of the last prepared frame
    pub fn border_glyph(&self, col: usize, row: usize) -> Option<char> {
        self.frame.as_ref()?.layer.borders.glyph(col, row)
    }

    /// Selected-state outline glyph for a cell of the last prepared frame
    pub fn highlight_glyph(&self, col: usize, row: usize) -> Option<char> {
        self.frame.as_ref()?.highlight.as_ref()?.glyph(col, row)
    }

    /// Whether a county geometry request for the selection is in flight
    pub fn is_fetching_counties(&self) -> bool {
        self.pending_county.is_some()
    }

    /// Number of counties with boundaries loaded for the selected state
    pub fn county_count(&self) -> usize {
        self.county_layer.as_ref().map_or(0, Layer::len)
    }
}
