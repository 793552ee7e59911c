use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use crate::app::{App, Screen};
use crate::map::MapView;
use crate::metric::{legend, palette, MetricType, Swatch};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Controls + legend
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " US Traffic Fatalities ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(chunks[1]);
    app.map_area = inner;

    let Screen::Map(view) = &mut app.screen else {
        return;
    };
    if view.is_loading() {
        frame.render_widget(block, chunks[1]);
        super::render_loading(frame, inner, "Loading map data...");
        return;
    }
    view.prepare(inner.width, inner.height);

    let Some(view) = app.map() else {
        return;
    };
    let cursor = app.map_hover_cell();
    render_controls(frame, view, app.metric, chunks[0]);

    frame.render_widget(block, chunks[1]);
    frame.render_widget(
        Choropleth {
            view,
            metric: app.metric,
            cursor,
        },
        inner,
    );

    if let Some((col, row)) = cursor {
        let lines = view
            .hit(col, row)
            .and_then(|hit| view.tooltip(hit, app.metric));
        if let Some(lines) = lines {
            super::render_tooltip(frame, inner, (inner.x + col, inner.y + row), lines);
        }
    }

    render_status_bar(frame, view, chunks[2]);
}

fn render_controls(frame: &mut Frame, view: &MapView, metric: MetricType, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut controls = vec![
        Span::styled(" Metric: ", dim),
        Span::styled(
            format!("[{}]", metric.option_label()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" (m) ", dim),
    ];
    if let Some(state) = view.selected_state() {
        controls.push(Span::styled("| ← Reset Map (r) ", Style::default().fg(Color::White)));
        controls.push(Span::styled("| Viewing: ", dim));
        controls.push(Span::styled(
            state.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        controls.push(Span::styled(
            format!(" counties ({})", view.county_count()),
            dim,
        ));
    }

    let mut entries = vec![Span::styled(format!(" {}: ", metric.label()), dim)];
    for (label, swatch) in legend(metric) {
        entries.push(Span::styled("  ", Style::default().bg(swatch.into())));
        entries.push(Span::styled(format!(" {label}  "), Style::default().fg(Color::Gray)));
    }

    frame.render_widget(
        Paragraph::new(vec![Line::from(controls), Line::from(entries)]),
        area,
    );
}

/// Filled regions with braille outlines and the selected state on top
struct Choropleth<'a> {
    view: &'a MapView,
    metric: MetricType,
    cursor: Option<(u16, u16)>,
}

impl Widget for Choropleth<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border: Color = palette::BORDER.into();
        let highlight: Color = palette::PRIMARY.into();

        for row in 0..area.height {
            for col in 0..area.width {
                let cell = &mut buf[(area.x + col, area.y + row)];
                if let Some(hit) = self.view.hit(col, row) {
                    let fill: Swatch = self.view.fill(hit, self.metric);
                    cell.set_bg(fill.into());
                }
                if let Some(ch) = self.view.border_glyph(col as usize, row as usize) {
                    cell.set_char(ch).set_fg(border);
                }
                if let Some(ch) = self.view.highlight_glyph(col as usize, row as usize) {
                    cell.set_char(ch).set_fg(highlight);
                }
            }
        }

        // Render cursor marker
        if let Some((cx, cy)) = self.cursor {
            if cx < area.width && cy < area.height {
                buf[(area.x + cx, area.y + cy)]
                    .set_char('╋')
                    .set_fg(Color::Red);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, view: &MapView, area: Rect) {
    let vp = view.viewport();
    let dim = Style::default().fg(Color::DarkGray);
    let (count, layer) = match (view.selected_state(), view.county_layer()) {
        (None, _) => (view.state_layer().map_or(0, |l| l.len()), "states"),
        (Some(_), Some(counties)) => (counties.len(), "counties"),
        (Some(_), None) if view.is_fetching_counties() => (0, "counties, loading"),
        (Some(_), None) => (0, "counties"),
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(format!("{:.1}x", vp.zoom), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        Span::styled(
            format!(
                "{:.1}°{}, {:.1}°{}",
                vp.center_lat.abs(),
                if vp.center_lat >= 0.0 { "N" } else { "S" },
                vp.center_lon.abs(),
                if vp.center_lon >= 0.0 { "E" } else { "W" }
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(" | ", dim),
        Span::styled(format!("{count} {layer}"), Style::default().fg(Color::Magenta)),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}
