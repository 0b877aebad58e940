//! Centralized theme and styling for the TUI
//!
//! Single source of truth for colors and pre-built styles so the rendering
//! code stays free of hardcoded values.

#![allow(dead_code)]

use crate::device::DeviceState;
use ratatui::style::{Color, Modifier, Style};

/// Core color palette for the application
pub struct Colors;

impl Colors {
    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Secondary/muted text color
    pub const FG_SECONDARY: Color = Color::Gray;

    /// Disabled/inactive text color
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Primary accent color - borders, titles
    pub const PRIMARY: Color = Color::Cyan;

    /// Secondary accent color - selected items, emphasis
    pub const SECONDARY: Color = Color::Yellow;

    /// Success/positive feedback
    pub const SUCCESS: Color = Color::Green;

    /// Warning/caution feedback
    pub const WARNING: Color = Color::Yellow;

    /// Error/danger feedback
    pub const ERROR: Color = Color::Red;

    /// Selected item highlight
    pub const SELECTED_BG: Color = Color::Yellow;

    /// Selected item text (for contrast on yellow bg)
    pub const SELECTED_FG: Color = Color::Black;
}

/// Pre-built styles for common UI elements
pub struct Styles;

impl Styles {
    /// Title bar style
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Highlighted list entry
    pub fn selected() -> Style {
        Style::default()
            .bg(Colors::SELECTED_BG)
            .fg(Colors::SELECTED_FG)
    }

    /// Device label in the list
    pub fn device_name() -> Style {
        Style::default()
            .fg(Colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hints in the navigation bar
    pub fn hint() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    /// Style for a device's status line, keyed on its state.
    pub fn device_state(state: DeviceState<'_>) -> Style {
        match state {
            DeviceState::Locked => Style::default().fg(Colors::WARNING),
            DeviceState::Unlocked => Style::default().fg(Colors::PRIMARY),
            DeviceState::Mounted(_) => Style::default().fg(Colors::SUCCESS),
        }
    }
}
