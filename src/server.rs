//! Server session lifecycle: detached start, pid-scoped stop.
//!
//! The server process is expected to outlive the menu: the control loop
//! fire-and-forgets a detached child and never waits on it. The only state
//! kept between start and stop is a small JSON handle on the deployment
//! itself, so stop terminates exactly the session this deployment started
//! and nothing else on the host.
//!
//! Start does not verify the server actually bound its port; a port-in-use
//! condition surfaces only in server.log.

use crate::config::{self, Settings};
use crate::error::{Result, ShelfError};
use crate::layout::DeploymentLayout;
use crate::library;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::process::{Command, Stdio};

use log::{info, warn};

/// Persisted handle of a started server session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerHandle {
    pub pid: u32,
    pub port: u16,
}

/// What stop found when it looked for a session to terminate.
#[derive(Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// A live session matched the persisted handle and was signalled.
    Stopped(u32),
    /// No handle, or the handle pointed at an already-gone process.
    NotRunning,
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped(pid) => write!(f, "server stopped (pid {pid})"),
            Self::NotRunning => write!(f, "server was not running"),
        }
    }
}

/// Start the content server detached, bound to the configured port.
///
/// When no library descriptor exists yet, one is synthesized by running the
/// rebuild operation first, the same code path as the explicit menu
/// command, so library synthesis has a single source of truth.
pub fn start(layout: &DeploymentLayout, settings: &Settings) -> Result<ServerHandle> {
    let server = layout.server_bin();
    if !server.is_file() {
        return Err(ShelfError::tool_missing(
            config::SERVER_BIN_NAME,
            "Re-run provisioning to refresh the tools directory.",
        ));
    }

    if !layout.library_file().exists() {
        let report = library::rebuild(layout)?;
        info!("synthesized missing library descriptor: {report}");
    }

    let log_path = layout.server_log_file();
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| ShelfError::fs_write(&log_path, e))?;
    let log_for_stderr = log_file
        .try_clone()
        .map_err(|e| ShelfError::fs_write(&log_path, e))?;

    let mut cmd = Command::new(&server);
    cmd.arg("--library")
        .arg("--port")
        .arg(settings.port.to_string())
        .arg("--address")
        .arg("0.0.0.0")
        .arg(layout.library_file())
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_for_stderr));
    detach(&mut cmd);

    let child = cmd.spawn()?;
    let handle = ServerHandle {
        pid: child.id(),
        port: settings.port,
    };
    // The child is never waited on; dropping the handle here is
    // what makes the session outlive the menu.
    drop(child);

    write_handle(layout, &handle)?;
    info!("server started: pid {} on port {}", handle.pid, handle.port);
    Ok(handle)
}

/// Terminate the session recorded in the pidfile, if it is still alive.
///
/// Idempotent: absent or stale handles report `NotRunning` rather than an
/// error, and the pidfile is cleared on every path.
pub fn stop(layout: &DeploymentLayout) -> Result<StopOutcome> {
    let pid_path = layout.server_pid_file();
    if !pid_path.exists() {
        return Ok(StopOutcome::NotRunning);
    }

    let handle: ServerHandle = match fs::read_to_string(&pid_path)
        .map_err(ShelfError::from)
        .and_then(|text| serde_json::from_str(&text).map_err(ShelfError::from))
    {
        Ok(handle) => handle,
        Err(e) => {
            warn!("discarding unreadable pidfile {}: {e}", pid_path.display());
            let _ = fs::remove_file(&pid_path);
            return Ok(StopOutcome::NotRunning);
        }
    };

    let outcome = if is_process_alive(handle.pid) {
        terminate(handle.pid)?;
        info!("sent termination to server pid {}", handle.pid);
        StopOutcome::Stopped(handle.pid)
    } else {
        StopOutcome::NotRunning
    };

    let _ = fs::remove_file(&pid_path);
    Ok(outcome)
}

fn write_handle(layout: &DeploymentLayout, handle: &ServerHandle) -> Result<()> {
    let pid_path = layout.server_pid_file();
    let text = serde_json::to_string_pretty(handle)?;
    fs::write(&pid_path, text).map_err(|e| ShelfError::fs_write(&pid_path, e))
}

/// Place the child in its own process group so terminal signals aimed at
/// the menu never reach the server.
#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn detach(_cmd: &mut Command) {}

#[cfg(unix)]
fn terminate(pid: u32) -> Result<()> {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .map_err(|e| ShelfError::general(format!("failed to signal pid {pid}: {e}")))
}

#[cfg(not(unix))]
fn terminate(pid: u32) -> Result<()> {
    let status = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T", "/F"])
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(ShelfError::general(format!("taskkill failed for pid {pid}")))
    }
}

/// Check if a process is still alive (not dead or zombie).
#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    use nix::sys::signal;
    use nix::unistd::Pid;

    if signal::kill(Pid::from_raw(pid as i32), None).is_err() {
        return false;
    }

    // A zombie can still receive signals but is not running; field 3 of
    // /proc/pid/stat is the state letter.
    if let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) {
        let fields: Vec<&str> = stat.split_whitespace().collect();
        if fields.len() > 2 {
            return !matches!(fields[2], "Z" | "X");
        }
    }

    true
}

#[cfg(not(unix))]
fn is_process_alive(pid: u32) -> bool {
    Command::new("tasklist")
        .args(["/FI", &format!("PID eq {pid}")])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains(&pid.to_string()))
        .unwrap_or(false)
}
