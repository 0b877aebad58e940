//! Application module
//!
//! Contains the main application logic, state management, and event handling.
//!
//! # Module Structure
//! - `state` - Application state types (AppState, AppMode, ConfirmAction, ...)
//! - Main module - App struct and event loop
//!
//! The event loop is single-threaded and blocking: a dispatched action runs
//! its command chain to completion before the next frame is drawn. Every
//! state-changing action ends with a fresh device scan; nothing is cached
//! across invocations.

mod state;

pub use state::{AppMode, AppState, ConfirmAction, Notification, NotificationLevel};

use crate::actions::{self, UnlockOutcome};
use crate::command::{CommandRunner, SystemRunner};
use crate::device::{self, DeviceState};
use crate::error::Result;
use crate::ui::{self, IconSet};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::Duration;
use tracing::{debug, warn};

/// Main application struct
pub struct App<R = SystemRunner> {
    pub state: AppState,
    runner: R,
    icons: IconSet,
}

impl App<SystemRunner> {
    /// Create an application backed by real system utilities.
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for App<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> App<R> {
    /// Create an application with a custom command runner (used by tests).
    pub fn with_runner(runner: R) -> Self {
        Self {
            state: AppState::default(),
            runner,
            icons: IconSet::default(),
        }
    }

    /// Run the event loop until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.rescan();
        while !self.state.should_quit {
            terminal.draw(|f| ui::render(f, &self.state, &self.icons))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Re-enumerate the encrypted devices, surfacing scan failures as an
    /// error notification with an unchanged (possibly empty) list.
    pub fn rescan(&mut self) {
        match device::scan(&self.runner) {
            Ok(devices) => {
                debug!(count = devices.len(), "scan complete");
                self.state.set_devices(devices);
            }
            Err(e) => {
                warn!(error = %e, "device scan failed");
                self.state.notify_error(e.to_string());
            }
        }
    }

    /// Handle one key press according to the current mode.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // A key press dismisses whatever notification is showing; the
        // handlers below may raise a new one.
        self.state.notification = None;

        match self.state.mode {
            AppMode::DeviceList => self.handle_list_key(key),
            AppMode::Confirm(action) => self.handle_confirm_key(key, action),
            AppMode::PassphraseEntry => self.handle_passphrase_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.state.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.state.select_next(),
            KeyCode::Enter => self.dispatch_selected(),
            KeyCode::Char('r') => self.rescan(),
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, action: ConfirmAction) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.state.mode = AppMode::DeviceList;
                self.run_confirmed(action);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state.mode = AppMode::DeviceList;
            }
            _ => {}
        }
    }

    fn handle_passphrase_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.state.mode = AppMode::DeviceList;
                self.submit_passphrase();
            }
            KeyCode::Esc => {
                // Cancelled entry is a no-op success: nothing runs.
                self.state.passphrase.clear();
                self.state.mode = AppMode::DeviceList;
            }
            KeyCode::Backspace => {
                self.state.passphrase.pop();
            }
            KeyCode::Char(c) => self.state.passphrase.push(c),
            _ => {}
        }
    }

    /// Open the dialog matching the selected device's state: a passphrase
    /// prompt when locked, a yes/no confirmation otherwise.
    fn dispatch_selected(&mut self) {
        let Some(device) = self.state.selected_device() else {
            return;
        };
        match device.state() {
            DeviceState::Mounted(_) => {
                self.state.mode = AppMode::Confirm(ConfirmAction::UnmountAndLock);
            }
            DeviceState::Unlocked => {
                self.state.mode = AppMode::Confirm(ConfirmAction::Lock);
            }
            DeviceState::Locked => {
                self.state.passphrase.clear();
                self.state.mode = AppMode::PassphraseEntry;
            }
        }
    }

    /// Execute a confirmed unmount/lock chain on the selected device.
    fn run_confirmed(&mut self, action: ConfirmAction) {
        let Some(device) = self.state.selected_device() else {
            return;
        };
        let drive_path = device.drive_path.clone();
        let crypt_path = device.crypt_path().map(str::to_string);

        let result = match action {
            ConfirmAction::UnmountAndLock => match crypt_path {
                Some(crypt_path) => {
                    actions::unmount_and_lock(&self.runner, &crypt_path, &drive_path)
                }
                None => return,
            },
            ConfirmAction::Lock => actions::lock(&self.runner, &drive_path),
        };

        match result {
            Ok(status) => {
                self.state.notify_info(status);
                self.rescan();
            }
            Err(e) => self.state.notify_error(e.to_string()),
        }
    }

    /// Run the unlock-and-mount flow with the typed passphrase.
    fn submit_passphrase(&mut self) {
        let Some(device) = self.state.selected_device() else {
            return;
        };
        let drive_path = device.drive_path.clone();
        let passphrase = std::mem::take(&mut self.state.passphrase);

        match actions::unlock_and_mount(&self.runner, &drive_path, passphrase) {
            Ok(UnlockOutcome::Cancelled) => {}
            Ok(UnlockOutcome::Mounted { status }) => {
                self.state.notify_info(status);
                self.rescan();
            }
            Err(e) => self.state.notify_error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{EncryptedDevice, MappedVolume, Transport};
    use crate::error::CryptTuiError;
    use crossterm::event::KeyModifiers;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct MockRunner {
        responses: RefCell<VecDeque<Result<String>>>,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl MockRunner {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for MockRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<String> {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().map(|a| a.to_string()));
            self.calls.borrow_mut().push(call);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected command invocation")
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn locked_device() -> EncryptedDevice {
        EncryptedDevice {
            drive_path: "/dev/sdb".to_string(),
            partlabel: None,
            transport: Transport::Usb,
            mapped: None,
        }
    }

    fn unlocked_device() -> EncryptedDevice {
        EncryptedDevice {
            mapped: Some(MappedVolume {
                path: "/dev/mapper/luks-sdb".to_string(),
                mount_point: None,
            }),
            ..locked_device()
        }
    }

    fn mounted_device() -> EncryptedDevice {
        EncryptedDevice {
            mapped: Some(MappedVolume {
                path: "/dev/mapper/luks-sdb".to_string(),
                mount_point: Some("/media/x".to_string()),
            }),
            ..locked_device()
        }
    }

    const EMPTY_SCAN: &str = r#"{"blockdevices": []}"#;

    #[test]
    fn test_enter_on_locked_device_opens_passphrase_prompt() {
        let mut app = App::with_runner(MockRunner::new(vec![]));
        app.state.set_devices(vec![locked_device()]);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state.mode, AppMode::PassphraseEntry);
        assert!(app.state.passphrase.is_empty());
    }

    #[test]
    fn test_enter_on_unlocked_device_asks_to_lock() {
        let mut app = App::with_runner(MockRunner::new(vec![]));
        app.state.set_devices(vec![unlocked_device()]);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state.mode, AppMode::Confirm(ConfirmAction::Lock));
    }

    #[test]
    fn test_enter_on_mounted_device_asks_to_unmount_and_lock() {
        let mut app = App::with_runner(MockRunner::new(vec![]));
        app.state.set_devices(vec![mounted_device()]);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.state.mode,
            AppMode::Confirm(ConfirmAction::UnmountAndLock)
        );
    }

    #[test]
    fn test_declining_a_confirmation_runs_nothing() {
        let mut app = App::with_runner(MockRunner::new(vec![]));
        app.state.set_devices(vec![unlocked_device()]);

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.state.mode, AppMode::DeviceList);
        assert!(app.runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_confirmed_lock_runs_only_the_lock_command() {
        let mut app = App::with_runner(MockRunner::new(vec![
            Ok("Locked /dev/sdb.".to_string()),
            Ok(EMPTY_SCAN.to_string()),
        ]));
        app.state.set_devices(vec![unlocked_device()]);

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('y')));

        {
            let calls = app.runner.calls.borrow();
            assert_eq!(calls[0], ["udisksctl", "lock", "--block-device", "/dev/sdb"]);
            // the follow-up call is the rescan, not another action
            assert_eq!(calls[1][0], "lsblk");
            assert_eq!(calls.len(), 2);
        }
        assert_eq!(
            app.state.notification,
            Some(Notification {
                text: "Locked /dev/sdb.".to_string(),
                level: NotificationLevel::Info,
            })
        );
    }

    #[test]
    fn test_confirmed_unmount_failure_halts_and_notifies() {
        let mut app = App::with_runner(MockRunner::new(vec![Err(CryptTuiError::command(
            "udisksctl",
            "target is busy",
        ))]));
        app.state.set_devices(vec![mounted_device()]);

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('y')));

        {
            let calls = app.runner.calls.borrow();
            // unmount failed, so neither lock nor rescan ran
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0][1], "unmount");
        }
        let notification = app.state.notification.clone().unwrap();
        assert_eq!(notification.level, NotificationLevel::Error);
        assert!(notification.text.contains("target is busy"));
    }

    #[test]
    fn test_cancelled_passphrase_runs_nothing() {
        let mut app = App::with_runner(MockRunner::new(vec![]));
        app.state.set_devices(vec![locked_device()]);

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Esc));

        assert_eq!(app.state.mode, AppMode::DeviceList);
        assert!(app.state.passphrase.is_empty());
        assert!(app.runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_passphrase_submit_runs_nothing() {
        let mut app = App::with_runner(MockRunner::new(vec![]));
        app.state.set_devices(vec![locked_device()]);

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state.mode, AppMode::DeviceList);
        assert!(app.runner.calls.borrow().is_empty());
        assert!(app.state.notification.is_none());
    }

    #[test]
    fn test_typed_passphrase_is_consumed_on_submit() {
        let lsblk_json = r#"{"blockdevices": [
            {"name": "sdb", "path": "/dev/sdb", "children": [
                {"name": "luks-sdb", "path": "/dev/mapper/luks-sdb"}
            ]}
        ]}"#;
        let mut app = App::with_runner(MockRunner::new(vec![
            Ok("Unlocked /dev/sdb.".to_string()),
            Ok(lsblk_json.to_string()),
            Ok("Mounted at /media/x".to_string()),
            Ok(EMPTY_SCAN.to_string()),
        ]));
        app.state.set_devices(vec![locked_device()]);

        app.handle_key(key(KeyCode::Enter));
        for c in "pw".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert!(app.state.passphrase.is_empty());
        assert_eq!(
            app.state.notification,
            Some(Notification {
                text: "Mounted at /media/x".to_string(),
                level: NotificationLevel::Info,
            })
        );
    }

    #[test]
    fn test_failed_scan_keeps_list_and_notifies() {
        let mut app = App::with_runner(MockRunner::new(vec![Err(CryptTuiError::command(
            "lsblk",
            "command not found",
        ))]));
        app.state.set_devices(vec![locked_device()]);

        app.handle_key(key(KeyCode::Char('r')));

        assert_eq!(app.state.devices.len(), 1);
        let notification = app.state.notification.clone().unwrap();
        assert_eq!(notification.level, NotificationLevel::Error);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::with_runner(MockRunner::new(vec![]));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.state.should_quit);
    }
}
