//! Secure temporary keyfile handling for the unlock flow.
//!
//! The passphrase is never passed on a command line (visible in `ps aux`).
//! It is written to a temporary keyfile with owner-only permissions and the
//! file path is handed to `udisksctl unlock --key-file`. The RAII wrapper
//! guarantees the file is overwritten and removed on every exit path.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Disambiguates keyfiles created within one clock tick.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// RAII wrapper for a temporary keyfile holding one secret.
///
/// Security guarantees:
/// 1. The file is created with mode 0600 before any secret bytes are written.
/// 2. Contents are overwritten with filler bytes before unlinking.
/// 3. Cleanup runs on drop, so it holds on success, failure and panic alike.
#[derive(Debug)]
pub struct SecretFile {
    path: PathBuf,
    /// Size of the secret, for the overwrite pass.
    size: usize,
}

impl SecretFile {
    /// Create a keyfile containing `secret` in the system temp directory
    /// (`TMPDIR` is honoured).
    pub fn new(secret: &str) -> std::io::Result<Self> {
        Self::new_in(&std::env::temp_dir(), secret)
    }

    /// Create a keyfile containing `secret` inside `dir`.
    ///
    /// The filename is unique per process and instant; `create_new` makes
    /// creation fail rather than reuse an existing path.
    pub fn new_in(dir: &Path, secret: &str) -> std::io::Result<Self> {
        let suffix: u64 = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ u64::from(std::process::id());
        let serial = COUNTER.fetch_add(1, Ordering::Relaxed);

        let path = dir.join(format!(".crypttui_keyfile_{suffix:016x}_{serial}"));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&path)?;

        file.write_all(secret.as_bytes())?;
        file.sync_all()?;

        debug!(?path, bytes = secret.len(), "keyfile created");

        Ok(Self {
            path,
            size: secret.len(),
        })
    }

    /// Path to hand to `udisksctl unlock --key-file`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file contents with filler bytes.
    fn overwrite_contents(&self) {
        if let Ok(mut file) = OpenOptions::new().write(true).open(&self.path) {
            let filler = vec![b'X'; self.size];
            let _ = file.write_all(&filler);
            let _ = file.sync_all();
        }
    }
}

impl Drop for SecretFile {
    fn drop(&mut self) {
        self.overwrite_contents();
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = ?self.path, error = %e, "failed to remove keyfile");
        } else {
            debug!(path = ?self.path, "keyfile wiped and removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    #[test]
    fn test_keyfile_holds_the_secret() {
        let dir = tempdir().unwrap();
        let secret = SecretFile::new_in(dir.path(), "hunter2").unwrap();
        let content = fs::read_to_string(secret.path()).unwrap();
        assert_eq!(content, "hunter2");
    }

    #[test]
    fn test_keyfile_lands_in_the_system_temp_dir() {
        let secret = SecretFile::new("hunter2").unwrap();
        assert_eq!(secret.path().parent(), Some(std::env::temp_dir().as_path()));
    }

    #[test]
    fn test_keyfile_has_owner_only_permissions() {
        let dir = tempdir().unwrap();
        let secret = SecretFile::new_in(dir.path(), "hunter2").unwrap();
        let mode = fs::metadata(secret.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_overwrite_replaces_every_secret_byte() {
        let dir = tempdir().unwrap();
        let secret = SecretFile::new_in(dir.path(), "correct horse battery staple").unwrap();
        secret.overwrite_contents();
        let content = fs::read(secret.path()).unwrap();
        assert_eq!(content.len(), "correct horse battery staple".len());
        assert!(content.iter().all(|&b| b == b'X'));
    }

    #[test]
    fn test_drop_removes_the_file() {
        let dir = tempdir().unwrap();
        let path = {
            let secret = SecretFile::new_in(dir.path(), "hunter2").unwrap();
            secret.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_two_keyfiles_do_not_collide() {
        let dir = tempdir().unwrap();
        let a = SecretFile::new_in(dir.path(), "one").unwrap();
        let b = SecretFile::new_in(dir.path(), "two").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
