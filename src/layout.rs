//! Deployment layout: every on-target path derived from one root.
//!
//! The staged directory tree is fixed; nothing outside it is ever touched.
//! Keeping the path derivation in one typed value (instead of string
//! concatenation at call sites) is what lets staging promise that.

use crate::config;
use std::path::{Path, PathBuf};

/// The fixed directory tree of a deployment on a target volume.
///
/// ```text
/// <volume mount>/shelf/
///   tools/          third-party binaries, refreshed on every staging run
///   content/        content archives, never deleted by this system
///   library.xml     rebuildable library descriptor
///   README.txt      generated operator instructions
///   start-shelf.sh  generated control-loop entry point
///   server.log      server stdout/stderr
///   server.pid      handle of the last started server session
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentLayout {
    root: PathBuf,
}

impl DeploymentLayout {
    /// Wrap an explicit deployment root (the `shelf/` directory itself).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Derive the deployment root for a volume mount point.
    pub fn on_volume(mount_point: &Path) -> Self {
        Self {
            root: mount_point.join(config::SHELF_DIR_NAME),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.root.join(config::TOOLS_DIR_NAME)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(config::CONTENT_DIR_NAME)
    }

    pub fn library_file(&self) -> PathBuf {
        self.root.join(config::LIBRARY_FILE_NAME)
    }

    pub fn readme_file(&self) -> PathBuf {
        self.root.join(config::README_FILE_NAME)
    }

    pub fn launcher_file(&self) -> PathBuf {
        self.root.join(config::LAUNCHER_FILE_NAME)
    }

    pub fn server_log_file(&self) -> PathBuf {
        self.root.join(config::SERVER_LOG_FILE_NAME)
    }

    pub fn server_pid_file(&self) -> PathBuf {
        self.root.join(config::SERVER_PID_FILE_NAME)
    }

    /// Path of the content-serving binary inside `tools/`.
    pub fn server_bin(&self) -> PathBuf {
        self.tools_dir().join(config::SERVER_BIN_NAME)
    }

    /// Path of the library-management binary inside `tools/`.
    pub fn manage_bin(&self) -> PathBuf {
        self.tools_dir().join(config::MANAGE_BIN_NAME)
    }

    /// True once staging has created the directory skeleton.
    pub fn is_staged(&self) -> bool {
        self.tools_dir().is_dir() && self.content_dir().is_dir()
    }
}

/// Find an already-staged deployment on any of the given volumes.
///
/// Returns the first staged layout in volume order (volumes arrive sorted
/// by identifier, so this is deterministic).
pub fn locate_deployment(volumes: &[crate::volume::Volume]) -> Option<DeploymentLayout> {
    volumes
        .iter()
        .map(|v| DeploymentLayout::on_volume(&v.mount_point))
        .find(|layout| layout.is_staged())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_root() {
        let layout = DeploymentLayout::on_volume(Path::new("/mnt/usb"));
        assert_eq!(layout.root(), Path::new("/mnt/usb/shelf"));
        assert_eq!(layout.tools_dir(), Path::new("/mnt/usb/shelf/tools"));
        assert_eq!(layout.content_dir(), Path::new("/mnt/usb/shelf/content"));
        assert_eq!(layout.library_file(), Path::new("/mnt/usb/shelf/library.xml"));
        assert_eq!(layout.launcher_file(), Path::new("/mnt/usb/shelf/start-shelf.sh"));
        assert_eq!(
            layout.server_bin(),
            Path::new("/mnt/usb/shelf/tools/kiwix-serve")
        );
    }

    #[test]
    fn test_explicit_root_is_used_verbatim() {
        let layout = DeploymentLayout::new("/data/shelf");
        assert_eq!(layout.root(), Path::new("/data/shelf"));
    }

    #[test]
    fn test_is_staged_requires_both_subdirectories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = DeploymentLayout::on_volume(dir.path());
        assert!(!layout.is_staged());

        std::fs::create_dir_all(layout.tools_dir()).expect("mkdir tools");
        assert!(!layout.is_staged());

        std::fs::create_dir_all(layout.content_dir()).expect("mkdir content");
        assert!(layout.is_staged());
    }
}
