use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::data::{Fetch, Loaded, Loader, Ticket};
use crate::map::{MapView, Request};
use crate::metric::MetricType;
use crate::scatter::{ScatterView, X_BOUNDS, Y_BOUNDS};

/// Dashboard tabs, in header order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Tab {
    #[default]
    Scatter,
    Map,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Scatter, Tab::Map];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Scatter => "Scatter Plot",
            Tab::Map => "Choropleth Map",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Scatter => 0,
            Tab::Map => 1,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Scatter => Tab::Map,
            Tab::Map => Tab::Scatter,
        }
    }
}

/// The view currently mounted under the header
pub enum Screen {
    Scatter(ScatterView),
    Map(MapView),
}

/// Application state: tab shell, selected metric and the mounted view
pub struct App {
    pub tab: Tab,
    /// Map metric; lives in the shell so it survives drill-down and reset
    pub metric: MetricType,
    pub screen: Screen,
    /// Incremented on every view switch; results for older mounts are dropped
    mount: u64,
    loader: Loader,
    pub should_quit: bool,
    /// Current mouse position for cursor marker and hover
    pub mouse_pos: Option<(u16, u16)>,
    /// Last mouse position for drag tracking
    last_mouse: Option<(u16, u16)>,
    dragged: bool,
    /// Map canvas area from the last draw
    pub map_area: Rect,
    /// Scatter plotting area from the last draw
    pub plot_area: Rect,
}

impl App {
    pub fn new(source: Arc<dyn Fetch>, tab: Tab) -> Self {
        let (screen, request) = build_screen(tab);
        let app = Self {
            tab,
            metric: MetricType::default(),
            screen,
            mount: 0,
            loader: Loader::new(source),
            should_quit: false,
            mouse_pos: None,
            last_mouse: None,
            dragged: false,
            map_area: Rect::default(),
            plot_area: Rect::default(),
        };
        app.submit_request(Some(request));
        app
    }

    fn submit_request(&self, request: Option<Request>) {
        if let Some(Request { seq, job }) = request {
            self.loader.submit(
                Ticket {
                    mount: self.mount,
                    seq,
                },
                job,
            );
        }
    }

    fn mount_view(&mut self, tab: Tab) {
        self.mount += 1;
        self.tab = tab;
        log::info!("Showing {}", tab.title());
        let (screen, request) = build_screen(tab);
        self.screen = screen;
        self.submit_request(Some(request));
    }

    /// Switch tabs; re-selecting the current tab is a no-op
    pub fn show(&mut self, tab: Tab) {
        if tab != self.tab {
            self.mount_view(tab);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn map(&self) -> Option<&MapView> {
        match &self.screen {
            Screen::Map(view) => Some(view),
            Screen::Scatter(_) => None,
        }
    }

    pub fn scatter(&self) -> Option<&ScatterView> {
        match &self.screen {
            Screen::Scatter(view) => Some(view),
            Screen::Map(_) => None,
        }
    }

    /// Drain finished loads and advance animations
    pub fn tick(&mut self, now: Instant) {
        while let Some(loaded) = self.loader.try_recv() {
            self.deliver(loaded);
        }
        if let Screen::Map(view) = &mut self.screen {
            view.tick(now);
        }
    }

    fn deliver(&mut self, Loaded { ticket, outcome }: Loaded) {
        if ticket.mount != self.mount {
            log::debug!("dropping result for unmounted view {ticket:?}");
            return;
        }
        match &mut self.screen {
            Screen::Scatter(view) => view.apply(outcome),
            Screen::Map(view) => view.apply(ticket.seq, outcome),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        // Only handle key press events (not release)
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Tab | KeyCode::BackTab => self.show(self.tab.next()),
            KeyCode::Char('1') | KeyCode::F(1) => self.show(Tab::Scatter),
            KeyCode::Char('2') | KeyCode::F(2) => self.show(Tab::Map),
            code => {
                if let Screen::Scatter(view) = &mut self.screen {
                    match code {
                        KeyCode::Char('n') | KeyCode::Right | KeyCode::Char('l') => view.hover_next(),
                        KeyCode::Char('p') | KeyCode::Left | KeyCode::Char('h') => view.hover_prev(),
                        _ => {}
                    }
                    return;
                }
                let request = self.handle_map_key(code, now);
                self.submit_request(request);
            }
        }
    }

    fn handle_map_key(&mut self, code: KeyCode, now: Instant) -> Option<Request> {
        let cursor = self.map_cursor();
        let Screen::Map(view) = &mut self.screen else {
            return None;
        };
        match code {
            KeyCode::Char('m') => {
                self.metric = self.metric.next();
                log::info!("Metric: {}", self.metric.option_label());
            }
            KeyCode::Char('M') => {
                self.metric = self.metric.prev();
                log::info!("Metric: {}", self.metric.option_label());
            }
            KeyCode::Enter => return view.click(cursor.0, cursor.1, now),
            KeyCode::Char('r') | KeyCode::Char('0') => view.reset(now),
            // Pan with hjkl or arrow keys
            KeyCode::Left | KeyCode::Char('h') => view.pan(-10, 0),
            KeyCode::Right | KeyCode::Char('l') => view.pan(10, 0),
            KeyCode::Up | KeyCode::Char('k') => view.pan(0, -6),
            KeyCode::Down | KeyCode::Char('j') => view.pan(0, 6),
            KeyCode::Char('+') | KeyCode::Char('=') => view.zoom_in(),
            KeyCode::Char('-') | KeyCode::Char('_') => view.zoom_out(),
            _ => {}
        }
        None
    }

    /// Map cell under the mouse, or the canvas center without one
    fn map_cursor(&self) -> (u16, u16) {
        self.mouse_pos
            .and_then(|(col, row)| cell_in(self.map_area, col, row))
            .unwrap_or((self.map_area.width / 2, self.map_area.height / 2))
    }

    /// Mouse cursor as a map cell, if it is over the map canvas
    pub fn map_hover_cell(&self) -> Option<(u16, u16)> {
        let (col, row) = self.mouse_pos?;
        cell_in(self.map_area, col, row)
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        // Always track mouse position for cursor marker
        self.mouse_pos = Some((mouse.column, mouse.row));

        let request = match &mut self.screen {
            Screen::Scatter(view) => {
                if let Some((x, y)) = plot_coords(self.plot_area, mouse.column, mouse.row) {
                    let (tol_x, tol_y) = cell_tolerance(self.plot_area);
                    view.hover_near(x, y, tol_x, tol_y);
                } else {
                    view.clear_hover();
                }
                None
            }
            Screen::Map(view) => match mouse.kind {
                // Scroll wheel zooms towards the mouse position
                MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                    if let Some((col, row)) = cell_in(self.map_area, mouse.column, mouse.row) {
                        let factor = if mouse.kind == MouseEventKind::ScrollUp {
                            1.5
                        } else {
                            1.0 / 1.5
                        };
                        view.zoom_at_cell(col, row, factor);
                    }
                    None
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    self.last_mouse = Some((mouse.column, mouse.row));
                    self.dragged = false;
                    None
                }
                // Click and drag to pan
                MouseEventKind::Drag(MouseButton::Left) => {
                    if let Some((last_x, last_y)) = self.last_mouse {
                        let dx = last_x as i32 - mouse.column as i32;
                        let dy = last_y as i32 - mouse.row as i32;
                        view.pan(dx * 2, dy * 4);
                        self.dragged = true;
                    }
                    self.last_mouse = Some((mouse.column, mouse.row));
                    None
                }
                // A release without movement is a click
                MouseEventKind::Up(MouseButton::Left) => {
                    let clicked = self.last_mouse.take().is_some() && !self.dragged;
                    match cell_in(self.map_area, mouse.column, mouse.row) {
                        Some((col, row)) if clicked => view.click(col, row, now),
                        _ => None,
                    }
                }
                _ => None,
            },
        };
        self.submit_request(request);
    }
}

/// Fresh view for a tab along with its initial load
fn build_screen(tab: Tab) -> (Screen, Request) {
    match tab {
        Tab::Scatter => {
            let (view, job) = ScatterView::mount();
            (Screen::Scatter(view), Request { seq: 0, job })
        }
        Tab::Map => {
            let (view, request) = MapView::mount();
            (Screen::Map(view), request)
        }
    }
}

/// Terminal position relative to `area`, if inside it
fn cell_in(area: Rect, col: u16, row: u16) -> Option<(u16, u16)> {
    let inside = col >= area.x
        && row >= area.y
        && col < area.x + area.width
        && row < area.y + area.height;
    inside.then(|| (col - area.x, row - area.y))
}

/// Data coordinates at the center of a terminal cell of the plot
fn plot_coords(area: Rect, col: u16, row: u16) -> Option<(f64, f64)> {
    let (c, r) = cell_in(area, col, row)?;
    let fx = (c as f64 + 0.5) / area.width as f64;
    let fy = (r as f64 + 0.5) / area.height as f64;
    let x = X_BOUNDS[0] + fx * (X_BOUNDS[1] - X_BOUNDS[0]);
    let y = Y_BOUNDS[1] - fy * (Y_BOUNDS[1] - Y_BOUNDS[0]);
    Some((x, y))
}

/// Hover tolerance: about one terminal cell in each direction
fn cell_tolerance(area: Rect) -> (f64, f64) {
    let w = area.width.max(1) as f64;
    let h = area.height.max(1) as f64;
    (
        (X_BOUNDS[1] - X_BOUNDS[0]) / w,
        (Y_BOUNDS[1] - Y_BOUNDS[0]) / h,
    )
}
