//! crypttui - browse and unlock LUKS-encrypted block devices
//!
//! A terminal UI over `lsblk` and `udisksctl`: enumerate the encrypted
//! containers attached to the machine, show whether each is locked,
//! unlocked, or mounted, and drive the unlock/mount and unmount/lock
//! chains from a selectable list. Passphrases are passed to `udisksctl`
//! through a short-lived owner-only key file that is shredded on drop.

pub mod actions;
pub mod app;
pub mod cli;
pub mod command;
pub mod device;
pub mod error;
pub mod secret;
pub mod theme;
pub mod ui;

pub use app::App;
pub use command::{CommandRunner, SystemRunner};
pub use device::{DeviceState, EncryptedDevice, Transport};
pub use error::{CryptTuiError, Result};
