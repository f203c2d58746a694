//! Volume discovery: enumerate candidate removable storage targets.
//!
//! Discovery is pure observation: it never mutates anything and is safe to
//! call repeatedly. Probing (sysinfo + sysfs) is separated from the pure
//! candidate filter so the inclusion/exclusion rules are unit-testable
//! without hardware.
//!
//! Inclusion rules:
//! - the disk is classified removable, or
//! - the disk hangs off a USB transport (Linux: sysfs device path)
//!
//! Exclusion rules:
//! - no assigned mount point (unmountable/raw partitions)
//! - virtual filesystems (devfs, proc, tmpfs, ...)
//!
//! A volume matching both inclusion rules appears once, keyed by its mount
//! identifier. The result is sorted by identifier so repeated enumerations
//! are stable.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use log::debug;
use sysinfo::Disks;

/// A host-visible, mountable storage unit considered as a deployment target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    /// Stable identifier: the mount path (or drive letter root).
    pub id: String,
    /// Human label, when the platform exposes one.
    pub label: Option<String>,
    /// Where the volume is mounted.
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub available_bytes: u64,
    /// True when the device classification is removable media.
    pub removable: bool,
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {} free of {}",
            self.id,
            self.label.as_deref().unwrap_or("(no label)"),
            format_gib(self.available_bytes),
            format_gib(self.total_bytes),
        )
    }
}

/// Raw observation of one disk before the candidate rules are applied.
#[derive(Debug, Clone)]
pub struct ProbedDisk {
    /// Device name as reported by the OS (e.g. `/dev/sdb1`).
    pub device: String,
    /// Mount point, absent for unmounted/raw partitions.
    pub mount_point: Option<PathBuf>,
    pub file_system: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub removable: bool,
    /// Device reachable over a USB transport.
    pub usb_attached: bool,
}

/// Enumerate candidate volumes, sorted by identifier.
///
/// An empty result is a valid observation, not an error; the caller decides
/// whether "none found" is fatal for its workflow.
pub fn list_candidate_volumes() -> Vec<Volume> {
    let probed = probe_disks();
    debug!("probed {} disk(s)", probed.len());
    filter_candidates(probed)
}

/// Apply the inclusion/exclusion rules to raw observations.
///
/// Pure function: no probing, no mutation, deterministic output order.
pub fn filter_candidates(probed: Vec<ProbedDisk>) -> Vec<Volume> {
    let mut by_id: BTreeMap<String, Volume> = BTreeMap::new();

    for disk in probed {
        if is_virtual_filesystem(&disk.file_system) {
            continue;
        }
        let Some(mount_point) = disk.mount_point else {
            continue;
        };
        if !(disk.removable || disk.usb_attached) {
            continue;
        }

        let id = mount_point.to_string_lossy().to_string();
        let label = mount_point
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty());

        // Removable-media and USB-bus matches de-duplicate here: first
        // observation of an identifier wins, later ones are identical.
        by_id.entry(id.clone()).or_insert(Volume {
            id,
            label,
            mount_point,
            total_bytes: disk.total_bytes,
            available_bytes: disk.available_bytes,
            removable: disk.removable,
        });
    }

    by_id.into_values().collect()
}

/// Normalize a free-form operator selector: trim whitespace, strip trailing
/// path separators, case-fold.
pub fn normalize_selector(input: &str) -> String {
    let mut s = input.trim();
    loop {
        let stripped = s.trim_end_matches(['/', '\\']).trim_end();
        // "/" normalizes to itself rather than the empty string
        if stripped.is_empty() && !s.is_empty() {
            return s.to_lowercase();
        }
        if stripped == s {
            return s.to_lowercase();
        }
        s = stripped;
    }
}

/// Match a selector against the discovered set.
///
/// The selector matches a volume when its normalized form equals the
/// volume's normalized identifier, mount path, or label.
pub fn find_volume<'a>(volumes: &'a [Volume], selector: &str) -> Option<&'a Volume> {
    let wanted = normalize_selector(selector);
    if wanted.is_empty() {
        return None;
    }
    volumes.iter().find(|v| {
        normalize_selector(&v.id) == wanted
            || normalize_selector(&v.mount_point.to_string_lossy()) == wanted
            || v.label
                .as_deref()
                .is_some_and(|l| normalize_selector(l) == wanted)
    })
}

/// Observe every disk the host exposes.
fn probe_disks() -> Vec<ProbedDisk> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .map(|disk| {
            let device = disk.name().to_string_lossy().to_string();
            let mount_point = Some(disk.mount_point().to_path_buf())
                .filter(|p| !p.as_os_str().is_empty() && p.exists());
            ProbedDisk {
                usb_attached: is_usb_attached(&device),
                device,
                mount_point,
                file_system: disk.file_system().to_string_lossy().to_string(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
                removable: disk.is_removable(),
            }
        })
        .collect()
}

/// Filesystems that can never back a deployment target.
fn is_virtual_filesystem(fs: &str) -> bool {
    matches!(
        fs.to_lowercase().as_str(),
        "devfs" | "sysfs" | "proc" | "tmpfs" | "ramfs" | "devtmpfs" | "overlay" | "squashfs"
    )
}

/// Check whether a block device sits on a USB transport.
///
/// Linux resolves `/sys/class/block/<dev>` to the full device path, which
/// contains a `usb` segment for USB-attached storage. Elsewhere the
/// removable classification alone decides.
#[cfg(target_os = "linux")]
fn is_usb_attached(device: &str) -> bool {
    let Some(base) = device.rsplit('/').next().filter(|b| !b.is_empty()) else {
        return false;
    };
    match std::fs::canonicalize(format!("/sys/class/block/{base}")) {
        Ok(resolved) => resolved.to_string_lossy().contains("/usb"),
        Err(_) => false,
    }
}

#[cfg(not(target_os = "linux"))]
fn is_usb_attached(_device: &str) -> bool {
    false
}

fn format_gib(bytes: u64) -> String {
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
    format!("{:.1} GiB", bytes as f64 / GIB)
}
