//! UI rendering module
//!
//! Draws the device list, the yes/no confirmation dialog, and the masked
//! passphrase prompt. Rendering is a pure function of [`AppState`]; no
//! widget here holds state of its own.

use crate::app::{AppMode, AppState, NotificationLevel};
use crate::device::Transport;
use crate::theme::Styles;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Terminal glyphs standing in for per-transport device icons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    pub mmc: &'static str,
    pub ssd: &'static str,
    pub usb: &'static str,
    pub disk: &'static str,
}

impl Default for IconSet {
    fn default() -> Self {
        Self {
            mmc: "[MMC]",
            ssd: "[SSD]",
            usb: "[USB]",
            disk: "[DSK]",
        }
    }
}

impl IconSet {
    /// Map a transport to its icon. Total: unknown transports get the
    /// generic disk glyph.
    pub fn icon_for(&self, transport: &Transport) -> &'static str {
        match transport {
            Transport::Mmc => self.mmc,
            Transport::Nvme | Transport::Sata => self.ssd,
            Transport::Usb => self.usb,
            Transport::Other(_) => self.disk,
        }
    }
}

/// Render the whole frame for the current application state.
pub fn render(f: &mut Frame, state: &AppState, icons: &IconSet) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // device list
            Constraint::Length(1), // notification
            Constraint::Length(1), // key hints
        ])
        .split(f.area());

    render_title(f, chunks[0]);
    render_device_list(f, chunks[1], state, icons);
    render_notification(f, chunks[2], state);
    render_hints(f, chunks[3], state);

    match &state.mode {
        AppMode::DeviceList => {}
        AppMode::Confirm(action) => render_confirm_dialog(f, state, *action),
        AppMode::PassphraseEntry => render_passphrase_dialog(f, state),
    }
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new("Encrypted Devices")
        .style(Styles::title())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_device_list(f: &mut Frame, area: Rect, state: &AppState, icons: &IconSet) {
    let block = Block::default().borders(Borders::ALL);

    if state.devices.is_empty() {
        let empty = Paragraph::new("No encrypted devices found (press r to rescan)")
            .style(Styles::hint())
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .devices
        .iter()
        .map(|device| {
            let header = Line::from(vec![
                Span::raw(icons.icon_for(&device.transport)),
                Span::raw(" "),
                Span::styled(device.label(), Styles::device_name()),
            ]);
            let status = Line::from(Span::styled(
                format!("      {}", device.status_line()),
                Styles::device_state(device.state()),
            ));
            ListItem::new(vec![header, status])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Styles::selected());

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_notification(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(notification) = &state.notification else {
        return;
    };
    let style = match notification.level {
        NotificationLevel::Info => Style::default().fg(Color::Green),
        NotificationLevel::Error => Style::default().fg(Color::Red),
    };
    let line = Paragraph::new(notification.text.as_str()).style(style);
    f.render_widget(line, area);
}

fn render_hints(f: &mut Frame, area: Rect, state: &AppState) {
    let hints = match state.mode {
        AppMode::DeviceList => "↑/↓ select | Enter action | r rescan | q quit",
        AppMode::Confirm(_) => "y confirm | n cancel",
        AppMode::PassphraseEntry => "Enter submit | Esc cancel",
    };
    let line = Paragraph::new(hints).style(Styles::hint());
    f.render_widget(line, area);
}

fn render_confirm_dialog(f: &mut Frame, state: &AppState, action: crate::app::ConfirmAction) {
    let label = state
        .selected_device()
        .map(|d| d.label())
        .unwrap_or_default();
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(action.question(&label)),
        Line::from(""),
        Line::from(Span::styled("[Y]es / [N]o", Styles::hint())),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm")
                .title_style(Styles::title()),
        );
    f.render_widget(dialog, area);
}

fn render_passphrase_dialog(f: &mut Frame, state: &AppState) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    // Never echo the typed characters, only a mask of the same length.
    let mask = "*".repeat(state.passphrase.chars().count());
    let text = vec![
        Line::from(mask),
        Line::from(""),
        Line::from(Span::styled("Enter submit | Esc cancel", Styles::hint())),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Enter pass phrase")
                .title_style(Styles::title()),
        );
    f.render_widget(dialog, area);
}

/// Centered sub-rectangle taking `percent_x` / `percent_y` of `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
