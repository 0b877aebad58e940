//! Application state definitions
//!
//! Contains all state-related types for the application: AppState, AppMode,
//! confirmation actions and notifications.

use crate::device::EncryptedDevice;

/// The pending action a confirmation dialog is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Unmount the mapped volume, then lock the container.
    UnmountAndLock,
    /// Lock the container.
    Lock,
}

impl ConfirmAction {
    /// Question text for the confirmation dialog.
    pub fn question(&self, label: &str) -> String {
        match self {
            ConfirmAction::UnmountAndLock => format!("Unmount & lock {label}?"),
            ConfirmAction::Lock => format!("Lock {label}?"),
        }
    }
}

/// Application operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Device list - entry point, one selectable entry per encrypted device
    DeviceList,
    /// Yes/no confirmation before unmounting/locking
    Confirm(ConfirmAction),
    /// Masked passphrase prompt before unlocking
    PassphraseEntry,
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient user-facing message shown in the status area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub level: NotificationLevel,
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current application mode
    pub mode: AppMode,
    /// Devices from the most recent scan, menu order
    pub devices: Vec<EncryptedDevice>,
    /// Index of the selected device
    pub selected: usize,
    /// Passphrase being typed (cleared when the dialog closes)
    pub passphrase: String,
    /// Current notification, if any
    pub notification: Option<Notification>,
    /// Set when the user asks to exit
    pub should_quit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::DeviceList,
            devices: Vec::new(),
            selected: 0,
            passphrase: String::new(),
            notification: None,
            should_quit: false,
        }
    }
}

impl AppState {
    /// The currently selected device, if the list is non-empty.
    pub fn selected_device(&self) -> Option<&EncryptedDevice> {
        self.devices.get(self.selected)
    }

    /// Move the selection up one entry, stopping at the top.
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move the selection down one entry, stopping at the bottom.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.devices.len() {
            self.selected += 1;
        }
    }

    /// Replace the device list, keeping the selection in bounds.
    pub fn set_devices(&mut self, devices: Vec<EncryptedDevice>) {
        self.devices = devices;
        if self.selected >= self.devices.len() {
            self.selected = self.devices.len().saturating_sub(1);
        }
    }

    /// Show an informational notification.
    pub fn notify_info(&mut self, text: impl Into<String>) {
        self.notification = Some(Notification {
            text: text.into(),
            level: NotificationLevel::Info,
        });
    }

    /// Show an error notification.
    pub fn notify_error(&mut self, text: impl Into<String>) {
        self.notification = Some(Notification {
            text: text.into(),
            level: NotificationLevel::Error,
        });
    }
}
