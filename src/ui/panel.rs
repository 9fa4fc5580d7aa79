//! The value panel: one line per telemetry field.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Field;

/// Render the current values, in the order the panel has always shown them.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.telemetry.snapshot;
    let theme = &app.theme;

    let binary = match (&snapshot.binary_name, &snapshot.binary_version) {
        (Field::Loaded(name), Field::Loaded(version)) => {
            Field::Loaded(format!("{} v{}", name, version))
        }
        _ => Field::Unloaded,
    };

    let mut lines = vec![
        row(app, "current height", &snapshot.height, ""),
        row(app, "current time", &snapshot.block_time, ""),
        Line::from(vec![
            Span::styled(format!("{:<32}", "last block time"), theme.label),
            Span::raw(app.telemetry.transition.previous_block_time_label()),
        ]),
        row(app, "max bytes per block", &snapshot.max_bytes, " bytes"),
        row(app, "binary", &binary, ""),
    ];

    if app.validators_enabled {
        lines.push(row(app, "total validators", &snapshot.total_validators, ""));
    }

    lines.push(row(app, "unconfirmed transactions", &snapshot.unconfirmed_count, ""));
    lines.push(row(
        app,
        "unconfirmed transactions bytes",
        &snapshot.unconfirmed_bytes,
        " bytes",
    ));

    let block = Block::default()
        .title(" Node ")
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn row<T: std::fmt::Display>(
    app: &App,
    label: &str,
    field: &Field<T>,
    unit: &str,
) -> Line<'static> {
    let value = match field {
        Field::Loaded(v) => Span::raw(format!("{}{}", v, unit)),
        Field::Unloaded => Span::styled(field.to_string(), app.theme.placeholder),
    };

    Line::from(vec![
        Span::styled(format!("{:<32}", label), app.theme.label),
        value,
    ])
}

/// Number of rows the panel needs, including borders.
pub fn height(app: &App) -> u16 {
    if app.validators_enabled {
        10
    } else {
        9
    }
}
