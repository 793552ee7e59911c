mod map;
mod scatter;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Tab};
use crate::metric::palette;

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + tabs
            Constraint::Min(5),    // Active view
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    match app.tab {
        Tab::Scatter => scatter::render(frame, app, chunks[1]),
        Tab::Map => map::render(frame, app, chunks[1]),
    }
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!(" {} {} ", i + 1, tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    " Traffic Safety Dashboard ",
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ))
                .title(
                    Line::from(Span::styled(
                        " Education & Fatality Analysis (2010-2023) ",
                        Style::default().fg(Color::Gray),
                    ))
                    .right_aligned(),
                ),
        )
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(palette::EDUCATION.into())
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.tab {
        Tab::Scatter => " | n/p:step hover  tab:switch  q:quit",
        Tab::Map => " | m:metric r:reset hjkl:pan +/-:zoom enter:select  tab:switch  q:quit",
    };
    let footer = Line::from(vec![
        Span::styled(" Data: FARS & US Census (2010-2023)", Style::default().fg(Color::Gray)),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}

/// Centered single-line message for a view that is still loading
fn render_loading(frame: &mut Frame, area: Rect, text: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1), Constraint::Fill(1)])
        .split(area);
    let message = Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray)))
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(message, rows[1]);
}

/// Boxed tooltip placed next to `anchor`, flipped to stay inside `bounds`
fn render_tooltip(frame: &mut Frame, bounds: Rect, anchor: (u16, u16), lines: Vec<String>) {
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 2;
    let height = lines.len() as u16 + 2;
    if width > bounds.width || height > bounds.height {
        return;
    }

    let (ax, ay) = anchor;
    let x = if ax + 2 + width <= bounds.right() {
        ax + 2
    } else {
        ax.saturating_sub(width + 1).max(bounds.x)
    };
    let y = if ay + 1 + height <= bounds.bottom() {
        ay + 1
    } else {
        ay.saturating_sub(height).max(bounds.y)
    };
    let area = Rect::new(x, y, width, height);

    let text: Vec<Line> = lines
        .into_iter()
        .enumerate()
        .map(|(i, l)| {
            let style = if i == 0 {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(l, style))
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        ),
        area,
    );
}
