//! Deployment constants and runtime settings.
//!
//! Everything that used to be an ambient assumption in ad-hoc deployment
//! scripts (directory names, the server port, the tool archive location)
//! lives here as an explicit value and is threaded through every command.

/// TCP port the content server binds for loopback and LAN access.
pub const DEFAULT_PORT: u16 = 8080;

/// Name of the deployment root directory created on the target volume.
pub const SHELF_DIR_NAME: &str = "shelf";

/// Subdirectory holding the third-party server/manager binaries.
pub const TOOLS_DIR_NAME: &str = "tools";

/// Subdirectory holding the content archives.
pub const CONTENT_DIR_NAME: &str = "content";

/// Library descriptor consumed by the server at startup.
pub const LIBRARY_FILE_NAME: &str = "library.xml";

/// Generated operator instructions document.
pub const README_FILE_NAME: &str = "README.txt";

/// Generated control-loop entry point script.
pub const LAUNCHER_FILE_NAME: &str = "start-shelf.sh";

/// Server stdout/stderr are appended here instead of the terminal.
pub const SERVER_LOG_FILE_NAME: &str = "server.log";

/// Persisted handle of the last server session started from this deployment.
pub const SERVER_PID_FILE_NAME: &str = "server.pid";

/// Content-serving binary inside the tools directory.
pub const SERVER_BIN_NAME: &str = "kiwix-serve";

/// Library-management companion binary inside the tools directory.
pub const MANAGE_BIN_NAME: &str = "kiwix-manage";

/// File extension of recognized content archives (case-insensitive).
pub const ARCHIVE_EXTENSION: &str = "zim";

/// Remote location of the kiwix-tools release tarball installed into `tools/`.
pub const TOOLS_ARCHIVE_URL: &str =
    "https://download.kiwix.org/release/kiwix-tools/kiwix-tools_linux-x86_64.tar.gz";

/// Exact token required by every destructive/expensive confirmation prompt.
/// Case-sensitive; surrounding whitespace is trimmed before comparison.
pub const AFFIRMATIVE_TOKEN: &str = "YES";

/// Runtime settings threaded through every command.
///
/// Deliberately tiny: the deployment path travels separately as a
/// `DeploymentLayout`, so the only tunable left is the port.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Port the server binds and the connection info displays.
    pub port: u16,
}

impl Settings {
    pub fn with_port(port: u16) -> Self {
        Self { port }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_use_default_port() {
        assert_eq!(Settings::default().port, DEFAULT_PORT);
    }

    #[test]
    fn test_with_port_overrides() {
        assert_eq!(Settings::with_port(9000).port, 9000);
    }

    #[test]
    fn test_affirmative_token_is_uppercase() {
        // Prompt copy promises an exact uppercase token; keep them in sync.
        assert_eq!(AFFIRMATIVE_TOKEN, AFFIRMATIVE_TOKEN.to_uppercase());
    }
}
