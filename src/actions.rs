//! State-transition actions driven through `udisksctl`.
//!
//! The reachable states per device form a line: Locked -> Unlocked ->
//! Mounted, reversible in the same order. Each transition is one or two
//! command invocations; the first failure in a chain is terminal for that
//! action and its error text is surfaced to the user. Nothing is retried.

use crate::command::CommandRunner;
use crate::device;
use crate::error::Result;
use crate::secret::SecretFile;
use tracing::info;

/// Result of the unlock-and-mount flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The passphrase prompt was cancelled or left empty; nothing ran.
    Cancelled,
    /// The device was unlocked and its mapped volume mounted.
    Mounted { status: String },
}

/// Unmount a mapped device. Returns udisksctl's status text.
pub fn unmount(runner: &dyn CommandRunner, crypt_path: &str) -> Result<String> {
    let status = runner.run("udisksctl", &["unmount", "--block-device", crypt_path])?;
    info!(crypt_path, "unmounted");
    Ok(status)
}

/// Lock an encrypted container. Returns udisksctl's status text.
pub fn lock(runner: &dyn CommandRunner, drive_path: &str) -> Result<String> {
    let status = runner.run("udisksctl", &["lock", "--block-device", drive_path])?;
    info!(drive_path, "locked");
    Ok(status)
}

/// Unmount the mapped volume, then lock the container.
///
/// The lock only runs if the unmount succeeded; an unmount failure leaves
/// the device mounted and propagates the error.
pub fn unmount_and_lock(
    runner: &dyn CommandRunner,
    crypt_path: &str,
    drive_path: &str,
) -> Result<String> {
    unmount(runner, crypt_path)?;
    lock(runner, drive_path)
}

/// Unlock a container with `passphrase`, then mount its mapped volume.
///
/// An empty passphrase is a no-op success: the user cancelled and no
/// command runs. Otherwise the passphrase goes into a [`SecretFile`] used
/// as `--key-file`; both the file and the in-memory copy are overwritten
/// with filler characters once the unlock attempt finishes, success or not.
///
/// After a successful unlock the drive's tree is re-listed to find the
/// freshly created mapped device, which is then mounted.
pub fn unlock_and_mount(
    runner: &dyn CommandRunner,
    drive_path: &str,
    mut passphrase: String,
) -> Result<UnlockOutcome> {
    if passphrase.is_empty() {
        return Ok(UnlockOutcome::Cancelled);
    }

    let unlock_result = {
        let keyfile = SecretFile::new(&passphrase)?;
        let key_arg = keyfile.path().display().to_string();
        runner.run(
            "udisksctl",
            &["unlock", "--key-file", &key_arg, "--block-device", drive_path],
        )
        // keyfile drops here: contents overwritten, file removed
    };

    // Overwrite the in-memory copy before acting on the result. clear()
    // keeps the allocation, so the filler lands on the original bytes.
    let len = passphrase.len();
    passphrase.clear();
    passphrase.extend(std::iter::repeat('X').take(len));
    drop(passphrase);

    unlock_result?;
    info!(drive_path, "unlocked");

    let crypt_path = device::mapped_path_of(runner, drive_path)?;
    let status = runner.run("udisksctl", &["mount", "--block-device", &crypt_path])?;
    info!(crypt_path, "mounted");

    Ok(UnlockOutcome::Mounted { status })
}
