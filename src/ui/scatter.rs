use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::app::App;
use crate::metric::palette;
use crate::scatter::{TITLE, X_BOUNDS, X_TITLE, Y_BOUNDS, Y_TITLE};

/// Width of the y-axis label column ("150") plus the axis line
const Y_LABEL_COLS: u16 = 4;
/// Rows taken by the x-axis line and its labels
const X_LABEL_ROWS: u16 = 2;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(view) = app.scatter() else {
        return;
    };
    if view.is_loading() {
        super::render_loading(frame, area, "Loading scatter plot data...");
        return;
    }

    let hovered: Vec<(f64, f64)> = view.hovered().map(|p| (p.x, p.y)).into_iter().collect();
    let datasets = vec![
        Dataset::default()
            .name("Rural")
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(palette::DANGER.into()))
            .data(view.rural()),
        Dataset::default()
            .name("Urban")
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(palette::SAFETY.into()))
            .data(view.urban()),
        Dataset::default()
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(palette::ACCENT.into()))
            .data(&hovered),
    ];

    let axis_style = Style::default().fg(palette::GRID.into());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {TITLE} "),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(X_TITLE)
                .style(axis_style)
                .bounds(X_BOUNDS)
                .labels(["0", "10", "20", "30", "40", "50"].map(Line::from)),
        )
        .y_axis(
            Axis::default()
                .title(Y_TITLE)
                .style(axis_style)
                .bounds(Y_BOUNDS)
                .labels(["0", "50", "100", "150"].map(Line::from)),
        );
    frame.render_widget(chart, area);

    let tooltip = view.tooltip();
    let anchor = view.hovered().map(|p| data_to_cell(inner, p.x, p.y));
    app.plot_area = plot_area(inner);
    if let (Some(lines), Some(anchor)) = (tooltip, anchor) {
        super::render_tooltip(frame, inner, anchor, lines);
    }
}

/// Approximate graph area of the chart inside its block
fn plot_area(inner: Rect) -> Rect {
    Rect::new(
        inner.x + Y_LABEL_COLS,
        inner.y,
        inner.width.saturating_sub(Y_LABEL_COLS + 1),
        inner.height.saturating_sub(X_LABEL_ROWS),
    )
}

/// Terminal cell for a data point, used to anchor the tooltip
fn data_to_cell(inner: Rect, x: f64, y: f64) -> (u16, u16) {
    let plot = plot_area(inner);
    let fx = (x - X_BOUNDS[0]) / (X_BOUNDS[1] - X_BOUNDS[0]);
    let fy = (Y_BOUNDS[1] - y) / (Y_BOUNDS[1] - Y_BOUNDS[0]);
    let col = plot.x + (fx * plot.width.saturating_sub(1) as f64).round() as u16;
    let row = plot.y + (fy * plot.height.saturating_sub(1) as f64).round() as u16;
    (col, row)
}
