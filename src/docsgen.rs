//! Generated on-target artifacts: operator instructions and the launcher.
//!
//! Both files are outputs of staging, never inputs: they are rewritten
//! unconditionally on every run and operators are told not to edit them.

use crate::config::{self, Settings};
use crate::error::{Result, ShelfError};
use crate::layout::DeploymentLayout;
use std::fs;

use log::debug;

/// Write (or overwrite) both generated artifacts.
pub fn write_all(layout: &DeploymentLayout, settings: &Settings) -> Result<()> {
    let readme = layout.readme_file();
    fs::write(&readme, readme_text(settings)).map_err(|e| ShelfError::fs_write(&readme, e))?;

    let launcher = layout.launcher_file();
    fs::write(&launcher, launcher_text()).map_err(|e| ShelfError::fs_write(&launcher, e))?;
    make_executable(&launcher)?;

    debug!("wrote generated artifacts under {}", layout.root().display());
    Ok(())
}

/// Operator instructions document.
pub fn readme_text(settings: &Settings) -> String {
    format!(
        "\
OFFLINE CONTENT SHELF
=====================

This drive carries a self-contained content shelf. Nothing on it needs
an internet connection once content archives are in place.

STARTING
  Run start-shelf.sh (or `shelfport menu --root <this folder>`) and pick
  \"Start server\". Browse to http://127.0.0.1:{port}/ on this machine, or
  to http://<this machine's address>:{port}/ from other devices on the
  same network.

ADDING CONTENT
  Drop .{ext} archive files into the content/ folder, then pick
  \"Rebuild library\" from the menu. The library index is rebuilt from
  whatever the folder holds; it is safe to rebuild at any time.

DOWNLOADS
  \"Fetch content packs\" downloads a curated set of archives. These are
  tens of gigabytes; the menu asks you to type {token} before starting.
  If a download fails partway, delete the partial file from content/
  before retrying; downloads restart from scratch.

STOPPING
  Pick \"Stop server\" from the menu. Closing the menu does NOT stop a
  running server.

Do not edit this file or start-shelf.sh by hand; both are rewritten
whenever the drive is re-provisioned.
",
        port = settings.port,
        ext = config::ARCHIVE_EXTENSION,
        token = config::AFFIRMATIVE_TOKEN,
    )
}

/// Control-loop entry point script.
pub fn launcher_text() -> String {
    "\
#!/bin/sh
# Generated by shelfport; rewritten on every provisioning run.
cd \"$(dirname \"$0\")\" || exit 1
exec shelfport menu --root .
"
    .to_string()
}

#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| ShelfError::fs_write(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &std::path::Path) -> Result<()> {
    Ok(())
}
