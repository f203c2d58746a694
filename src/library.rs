//! Library descriptor management.
//!
//! The descriptor is a cache, not a source of truth: it is fully regenerable
//! from the content directory's current file listing. Rebuild resets it to
//! the empty skeleton, then replays one registration per recognized archive
//! through the external management tool, continuing past individual
//! failures.
//!
//! The management tool owns the descriptor's internal structure; this module
//! only resets it and invokes registrations. The empty skeleton below is the
//! same document the tool itself produces for a library with no entries,
//! which keeps the zero-archive case a valid descriptor instead of an error.

use crate::config;
use crate::error::{Result, ShelfError};
use crate::layout::DeploymentLayout;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{info, warn};

/// A library with zero registered archives.
const EMPTY_LIBRARY_XML: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<library version=\"20110515\"/>\n";

/// Per-file outcome of a rebuild run.
#[derive(Debug, Default)]
pub struct RebuildReport {
    /// Archive file names registered successfully, in registration order.
    pub succeeded: Vec<String>,
    /// Archive file names that failed, with the tool's complaint.
    pub failed: Vec<(String, String)>,
}

impl RebuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl fmt::Display for RebuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed",
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

/// Fully regenerate the library descriptor from the content directory.
///
/// Absence of any archive files is not an error; it produces a valid,
/// empty descriptor and a server with no content.
pub fn rebuild(layout: &DeploymentLayout) -> Result<RebuildReport> {
    let manage = layout.manage_bin();
    if !manage.is_file() {
        return Err(ShelfError::tool_missing(
            config::MANAGE_BIN_NAME,
            "Re-run provisioning to refresh the tools directory.",
        ));
    }

    reset_descriptor(layout)?;

    let archives = list_archives(&layout.content_dir())?;
    info!(
        "rebuilding library from {} archive(s) in {}",
        archives.len(),
        layout.content_dir().display()
    );

    let mut report = RebuildReport::default();
    for archive in archives {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| archive.display().to_string());

        match register(&manage, &layout.library_file(), &archive) {
            Ok(()) => {
                info!("registered {}", name);
                report.succeeded.push(name);
            }
            Err(reason) => {
                warn!("failed to register {}: {}", name, reason);
                report.failed.push((name, reason));
            }
        }
    }

    Ok(report)
}

/// Recognized archive files in the content directory, sorted by file name.
pub fn list_archives(content_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archives: Vec<PathBuf> = fs::read_dir(content_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_archive_extension(path))
        .collect();
    archives.sort();
    Ok(archives)
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(config::ARCHIVE_EXTENSION))
}

/// Reset the descriptor to the empty skeleton, dropping all registrations.
fn reset_descriptor(layout: &DeploymentLayout) -> Result<()> {
    let library = layout.library_file();
    if library.exists() {
        fs::remove_file(&library).map_err(|e| ShelfError::fs_write(&library, e))?;
    }
    fs::write(&library, EMPTY_LIBRARY_XML).map_err(|e| ShelfError::fs_write(&library, e))
}

/// Register one archive into the descriptor via the management tool.
///
/// Output is discarded except for the success/failure status; on failure
/// the tool's stderr (or exit code) becomes the reported reason.
fn register(manage: &Path, library: &Path, archive: &Path) -> std::result::Result<(), String> {
    let output = Command::new(manage)
        .arg(library)
        .arg("add")
        .arg(archive)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| e.to_string())?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(format!(
                "exit code {}",
                output.status.code().unwrap_or(-1)
            ))
        } else {
            Err(stderr.to_string())
        }
    }
}
