//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color of the title while a new-block pulse is active.
    pub pulse: Color,
    /// Line color for the pending transaction count chart.
    pub tx_count: Color,
    /// Line color for the pending transaction bytes chart.
    pub tx_bytes: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for field labels in the value panel.
    pub label: Style,
    /// Style for values that have not loaded yet.
    pub placeholder: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            pulse: Color::Magenta,
            tx_count: Color::Green,
            tx_bytes: Color::Yellow,
            border: Color::Gray,
            label: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            placeholder: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            pulse: Color::Magenta,
            tx_count: Color::Green,
            tx_bytes: Color::Red,
            border: Color::DarkGray,
            label: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            placeholder: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the title bar, highlighted while a pulse is active.
    pub fn title_style(&self, pulsing: bool) -> Style {
        if pulsing {
            Style::default()
                .fg(Color::Black)
                .bg(self.pulse)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.highlight).add_modifier(Modifier::BOLD)
        }
    }
}
