//! Device enumeration and classification using `lsblk`.
//!
//! This module queries `lsblk --json` for the block device tree and selects
//! the LUKS-encrypted containers, classifying each as locked, unlocked, or
//! mounted. The state is derived solely from the presence of a mapped child
//! node and that child's mount point; nothing is cached between scans.

use crate::command::CommandRunner;
use crate::error::{CryptTuiError, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::EnumString;

/// Filesystem type marker lsblk reports for an encrypted LUKS container.
pub const LUKS_FSTYPE: &str = "crypto_LUKS";

/// Output columns requested from lsblk for a full scan.
const SCAN_COLUMNS: &str = "NAME,PATH,FSTYPE,PARTLABEL,TRAN,MOUNTPOINT";

// ============================================================================
// lsblk JSON shape
// ============================================================================

/// Top-level shape of `lsblk --json` output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LsblkReport {
    #[serde(default)]
    pub blockdevices: Vec<LsblkNode>,
}

/// One node of the lsblk device tree.
///
/// Every field may be null or absent depending on the device and the lsblk
/// version, so everything is optional. A `children` entry under an encrypted
/// container is its unlocked mapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LsblkNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub fstype: Option<String>,
    #[serde(default)]
    pub partlabel: Option<String>,
    #[serde(default)]
    pub tran: Option<String>,
    #[serde(default)]
    pub mountpoint: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<LsblkNode>>,
}

impl LsblkNode {
    /// The node's own transport, with null and empty both treated as absent.
    fn transport_str(&self) -> Option<&str> {
        self.tran.as_deref().filter(|t| !t.is_empty())
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Physical interconnect type of a storage device, as reported by lsblk's
/// TRAN column. Anything outside the known set falls through to `Other`,
/// which draws the generic disk icon.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Transport {
    #[strum(serialize = "mmc")]
    Mmc,
    #[strum(serialize = "nvme")]
    Nvme,
    #[strum(serialize = "sata")]
    Sata,
    #[strum(serialize = "usb")]
    Usb,
    #[strum(default)]
    Other(String),
}

impl Transport {
    /// Parse an optional transport string. Null or empty input maps to
    /// `Other("")`, never an error.
    pub fn from_optional(tran: Option<&str>) -> Self {
        match tran {
            Some(t) if !t.is_empty() => {
                // The default variant makes from_str infallible.
                Transport::from_str(t).unwrap_or_else(|_| Transport::Other(t.to_string()))
            }
            _ => Transport::Other(String::new()),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Mmc => write!(f, "mmc"),
            Transport::Nvme => write!(f, "nvme"),
            Transport::Sata => write!(f, "sata"),
            Transport::Usb => write!(f, "usb"),
            Transport::Other(t) => write!(f, "{t}"),
        }
    }
}

impl Serialize for Transport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Classified devices
// ============================================================================

/// The unlocked mapping of an encrypted container, if one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedVolume {
    /// Path of the decrypted virtual block device (e.g. /dev/dm-0).
    pub path: String,
    /// Where the mapped device is mounted, if it is.
    pub mount_point: Option<String>,
}

/// A LUKS container selected from the device tree, reduced to what the
/// menu and the action dispatcher need. Produced fresh on every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedDevice {
    /// Path of the encrypted container itself (e.g. /dev/sdb1).
    pub drive_path: String,
    /// Partition label, when the device carries one.
    pub partlabel: Option<String>,
    /// Transport of the device, inherited from the parent disk when the
    /// partition's own column is empty.
    pub transport: Transport,
    /// Present iff the container is currently unlocked.
    pub mapped: Option<MappedVolume>,
}

/// Current state of an encrypted device. Exactly one of these holds for
/// any `EncryptedDevice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState<'a> {
    /// No mapped child exists.
    Locked,
    /// A mapped child exists but is not mounted.
    Unlocked,
    /// The mapped child is mounted at the given path.
    Mounted(&'a str),
}

impl EncryptedDevice {
    /// Derive the device state from the mapped child.
    pub fn state(&self) -> DeviceState<'_> {
        match &self.mapped {
            Some(MappedVolume {
                mount_point: Some(mount),
                ..
            }) => DeviceState::Mounted(mount),
            Some(_) => DeviceState::Unlocked,
            None => DeviceState::Locked,
        }
    }

    /// Path of the mapped device, when unlocked.
    pub fn crypt_path(&self) -> Option<&str> {
        self.mapped.as_ref().map(|m| m.path.as_str())
    }

    /// Primary display label: drive path plus the partition label in
    /// parentheses when present.
    pub fn label(&self) -> String {
        match &self.partlabel {
            Some(partlabel) => format!("{} ({partlabel})", self.drive_path),
            None => self.drive_path.clone(),
        }
    }

    /// Secondary display label describing the current state.
    pub fn status_line(&self) -> String {
        match self.state() {
            DeviceState::Locked => "Locked".to_string(),
            DeviceState::Unlocked => "Unlocked".to_string(),
            DeviceState::Mounted(mount) => format!("Unlocked, mounted on {mount}"),
        }
    }
}

// ============================================================================
// Scan & classify
// ============================================================================

/// Classify one lsblk node if it is an encrypted container.
///
/// `parent_tran` is the enclosing disk's transport, used when the node's
/// own TRAN column is empty (partitions usually inherit it).
fn classify(node: &LsblkNode, parent_tran: Option<&str>) -> Option<EncryptedDevice> {
    if node.fstype.as_deref() != Some(LUKS_FSTYPE) {
        return None;
    }
    let drive_path = node.path.clone()?;

    let mapped = node
        .children
        .as_ref()
        .and_then(|children| children.first())
        .and_then(|child| {
            child.path.clone().map(|path| MappedVolume {
                path,
                mount_point: child.mountpoint.clone().filter(|m| !m.is_empty()),
            })
        });

    let tran = node.transport_str().or(parent_tran);

    Some(EncryptedDevice {
        drive_path,
        partlabel: node.partlabel.clone().filter(|l| !l.is_empty()),
        transport: Transport::from_optional(tran),
        mapped,
    })
}

/// Walk a parsed lsblk report and collect every LUKS container.
///
/// Whole encrypted disks are classified directly; otherwise each child
/// partition is inspected. Nodes whose fstype is not the LUKS marker never
/// appear in the result.
pub fn classify_report(report: &LsblkReport) -> Vec<EncryptedDevice> {
    let mut items = Vec::new();
    for drive in &report.blockdevices {
        if let Some(device) = classify(drive, None) {
            items.push(device);
        } else if let Some(children) = &drive.children {
            for part in children {
                if let Some(device) = classify(part, drive.transport_str()) {
                    items.push(device);
                }
            }
        }
    }
    items
}

/// Enumerate and classify all encrypted block devices on the host.
///
/// Runs `lsblk --json` and parses its output. A failing command or
/// unparsable output aborts the scan; no partial results are returned.
pub fn scan(runner: &dyn CommandRunner) -> Result<Vec<EncryptedDevice>> {
    let stdout = runner.run("lsblk", &["--json", "--output", SCAN_COLUMNS])?;
    let report: LsblkReport = serde_json::from_str(&stdout)?;
    Ok(classify_report(&report))
}

/// Re-query a single drive's tree after an unlock to discover the path of
/// the freshly created mapped device.
pub fn mapped_path_of(runner: &dyn CommandRunner, drive_path: &str) -> Result<String> {
    let stdout = runner.run("lsblk", &["--json", "--output", "NAME,PATH", drive_path])?;
    let report: LsblkReport = serde_json::from_str(&stdout)?;
    report
        .blockdevices
        .first()
        .and_then(|drive| drive.children.as_ref())
        .and_then(|children| children.first())
        .and_then(|child| child.path.clone())
        .ok_or_else(|| {
            CryptTuiError::listing(format!("no mapped device found under {drive_path}"))
        })
}

// ============================================================================
// Tests
// ============================================================================
