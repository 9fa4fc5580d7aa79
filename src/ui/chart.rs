//! Line charts for the pending transaction history.

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use super::common::format_count;
use crate::app::App;
use crate::data::history::{labels, SlidingWindow, WINDOW_CAPACITY};

/// Render both mempool charts side by side.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let history = &app.telemetry.history;
    render_window(
        frame,
        app,
        chunks[0],
        "Unconfirmed Transactions",
        &history.tx_count,
        app.theme.tx_count,
    );
    render_window(
        frame,
        app,
        chunks[1],
        "Unconfirmed Transactions Bytes",
        &history.tx_bytes,
        app.theme.tx_bytes,
    );
}

fn render_window(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    window: &SlidingWindow,
    color: Color,
) {
    let points = window.points();
    let y_max = (window.max() as f64).max(1.0);

    // Oldest on the left, "now" on the right
    let labels = labels();
    let x_labels = vec![
        Span::from(labels[WINDOW_CAPACITY - 1].clone()),
        Span::from(labels[WINDOW_CAPACITY / 2].clone()),
        Span::from(labels[0].clone()),
    ];
    let y_labels = vec![
        Span::from("0"),
        Span::from(format_count((y_max / 2.0) as u64)),
        Span::from(format_count(y_max as u64)),
    ];

    let chart = Chart::new(vec![Dataset::default()
        .name(format_count(window.latest()))
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)])
    .block(
        Block::default()
            .title(format!(" {} ", title))
            .title_bottom(sample_caption(app.sample_interval))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .x_axis(
        Axis::default()
            .bounds([0.0, (WINDOW_CAPACITY - 1) as f64])
            .labels(x_labels)
            .style(app.theme.placeholder),
    )
    .y_axis(
        Axis::default()
            .bounds([0.0, y_max])
            .labels(y_labels)
            .style(app.theme.placeholder),
    );

    frame.render_widget(chart, area);
}

/// Caption stating how far apart the plotted samples are.
///
/// The x axis labels count samples, not wall-clock seconds.
pub fn sample_caption(interval: Duration) -> String {
    let secs = interval.as_secs_f64();
    if secs.fract() == 0.0 {
        format!(" one sample every {}s ", secs as u64)
    } else {
        format!(" one sample every {:.1}s ", secs)
    }
}
