//! Deployment staging: create or refresh a deployment on a chosen volume.
//!
//! Every step is independently idempotent, so a staging run interrupted by
//! a write failure is recovered by simply running it again. The ordering
//! protects the target volume: nothing downloads onto it, and the tools
//! directory is only touched after the archive has been fetched and
//! unpacked successfully in a process-local staging area.
//!
//! What staging never does: delete content archives, touch anything outside
//! the deployment root, or leave the temporary staging area behind (the
//! `TempDir` guard removes it on success, failure, and panic alike).

use crate::archive;
use crate::config::{self, Settings};
use crate::docsgen;
use crate::error::{Result, ShelfError};
use crate::fetch;
use crate::layout::DeploymentLayout;
use std::fs;

use log::info;

/// Stage (or re-stage) a deployment.
///
/// `confirmed` must be true: staging refuses to run without the answer the
/// caller collected at its own confirmation prompt.
pub fn stage(
    layout: &DeploymentLayout,
    settings: &Settings,
    confirmed: bool,
    client: &reqwest::blocking::Client,
) -> Result<()> {
    if !confirmed {
        return Err(ShelfError::UserCancelled);
    }

    ensure_layout(layout)?;

    let staging = tempfile::tempdir()?;
    let archive_path = staging.path().join("kiwix-tools.tar.gz");
    info!("fetching tool archive from {}", config::TOOLS_ARCHIVE_URL);
    fetch::fetch_to_file(client, config::TOOLS_ARCHIVE_URL, &archive_path)?;

    install_tools(layout, &archive_path)?;
    docsgen::write_all(layout, settings)?;

    info!("deployment staged at {}", layout.root().display());
    Ok(())
}

/// Create the deployment root and its subdirectories if absent.
///
/// Existing directories, and anything inside them, are left untouched.
pub fn ensure_layout(layout: &DeploymentLayout) -> Result<()> {
    for dir in [
        layout.root().to_path_buf(),
        layout.tools_dir(),
        layout.content_dir(),
    ] {
        fs::create_dir_all(&dir).map_err(|e| ShelfError::fs_write(&dir, e))?;
    }
    Ok(())
}

/// Unpack a fetched tool archive and install its payload into `tools/`.
///
/// Unpacking happens next to the archive, never on the target volume; only
/// the verified payload is copied over, overwriting prior tool files.
pub fn install_tools(layout: &DeploymentLayout, archive_path: &std::path::Path) -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let unpacked = scratch.path().join("unpacked");
    fs::create_dir_all(&unpacked)?;

    archive::unpack_tarball(archive_path, &unpacked)?;
    archive::flatten_into(&unpacked, &layout.tools_dir())?;

    info!("tools refreshed in {}", layout.tools_dir().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_requires_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = DeploymentLayout::on_volume(dir.path());
        let client = fetch::client().expect("client");

        let err = stage(&layout, &Settings::default(), false, &client)
            .expect_err("unconfirmed staging must refuse");
        assert!(matches!(err, ShelfError::UserCancelled));
        // Refusal happens before any mutation.
        assert!(!layout.root().exists());
    }

    #[test]
    fn test_ensure_layout_is_idempotent_and_preserving() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = DeploymentLayout::on_volume(dir.path());

        ensure_layout(&layout).expect("first run");
        let keeper = layout.content_dir().join("keep.zim");
        fs::write(&keeper, b"payload").expect("seed content");

        ensure_layout(&layout).expect("second run");
        assert_eq!(fs::read(&keeper).expect("read"), b"payload");
    }
}
