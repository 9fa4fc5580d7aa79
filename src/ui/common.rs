//! Common UI components: header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the header bar.
///
/// Displays the title (highlighted while a new-block pulse is active), the
/// current height, and the number of blocks seen this session.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.telemetry.snapshot;
    let marker = if app.pulse_active() { "◆" } else { "◇" };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} BLOCKWATCH ", marker),
            app.theme.title_style(app.pulse_active()),
        ),
        Span::raw(" │ height "),
        Span::styled(
            snapshot.height.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", app.blocks_seen),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" new blocks seen"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render the status bar at the bottom.
///
/// Shows the data source, time since the last applied cycle, and controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let telemetry = &app.telemetry;
    let status = match telemetry.last_updated {
        Some(updated) => format!(
            " {} | cycle #{} | Updated {:.1}s ago | r:refresh ?:help q:quit",
            app.source_description(),
            telemetry.last_applied_seq.unwrap_or_default(),
            updated.elapsed().as_secs_f64(),
        ),
        None => format!(" {} | Loading... | q:quit", app.source_description()),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.label)]),
        Line::from(""),
        Line::from("  r         Poll now"),
        Line::from("  ?         Toggle this help"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " The title flashes when a new block arrives",
            Style::default().add_modifier(Modifier::ITALIC),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 48u16.min(area.width.saturating_sub(4));
    let help_height = 11u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
