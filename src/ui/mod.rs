//! Terminal rendering with ratatui.

pub mod chart;
pub mod common;
pub mod panel;
pub mod theme;

pub use theme::Theme;
