//! The operator control loop.
//!
//! A single-threaded, synchronous, numbered menu. The loop holds no state
//! beyond the deployment path it was started with: every command re-derives
//! its effect from the deployment's current on-disk contents, which makes
//! the loop safe to kill and restart at any point.
//!
//! Command failures are caught at the dispatch boundary and rendered as
//! text; only the Exit command (or EOF) ends the loop, and exiting does not
//! stop a running server.

use crate::config::Settings;
use crate::error::{Result, ShelfError};
use crate::layout::DeploymentLayout;
use crate::{library, netinfo, packs, prompt, server};
use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use log::info;
use strum::{Display, EnumIter, IntoEnumIterator};

/// One numbered menu command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum MenuItem {
    #[strum(serialize = "Start server")]
    StartServer,
    #[strum(serialize = "Stop server")]
    StopServer,
    #[strum(serialize = "Rebuild library")]
    RebuildLibrary,
    #[strum(serialize = "Open content folder")]
    OpenContentFolder,
    #[strum(serialize = "Show connection info")]
    ConnectionInfo,
    #[strum(serialize = "Fetch content packs")]
    FetchPacks,
    #[strum(serialize = "Exit")]
    Exit,
}

impl MenuItem {
    /// Map a typed menu number ("1".."7") to its command.
    pub fn from_choice(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        Self::iter().nth(n.checked_sub(1)?)
    }

    /// The number shown next to this command.
    pub fn number(self) -> usize {
        Self::iter().position(|item| item == self).unwrap_or(0) + 1
    }
}

/// Run the control loop until Exit or EOF.
pub fn run_menu<R: BufRead, W: Write>(
    layout: &DeploymentLayout,
    settings: &Settings,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    info!("control loop started for {}", layout.root().display());

    loop {
        render(layout, output)?;
        write!(output, "> ")?;
        output.flush()?;

        let Some(choice) = prompt::read_trimmed_line(input)? else {
            writeln!(output, "Input closed; leaving the menu.")?;
            break;
        };
        if choice.is_empty() {
            continue;
        }
        let Some(item) = MenuItem::from_choice(&choice) else {
            writeln!(output, "'{choice}' is not a menu option; enter a number from the list.")?;
            continue;
        };

        if item == MenuItem::Exit {
            writeln!(output, "Leaving the menu. A running server keeps running.")?;
            break;
        }

        // Command boundary: failures become text, never loop exits.
        if let Err(e) = dispatch(item, layout, settings, input, output) {
            writeln!(output, "Error: {e}")?;
        }
    }

    Ok(())
}

fn render<W: Write>(layout: &DeploymentLayout, output: &mut W) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "=== Offline content shelf ===")?;
    writeln!(output, "Deployment: {}", layout.root().display())?;
    for item in MenuItem::iter() {
        writeln!(output, "  {}. {}", item.number(), item)?;
    }
    Ok(())
}

fn dispatch<R: BufRead, W: Write>(
    item: MenuItem,
    layout: &DeploymentLayout,
    settings: &Settings,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    match item {
        MenuItem::StartServer => {
            let handle = server::start(layout, settings)?;
            writeln!(
                output,
                "Server started (pid {}), logging to {}.",
                handle.pid,
                layout.server_log_file().display()
            )?;
            writeln!(output, "{}", netinfo::connection_summary(settings.port))?;
        }
        MenuItem::StopServer => {
            let outcome = server::stop(layout)?;
            writeln!(output, "{outcome}.")?;
        }
        MenuItem::RebuildLibrary => {
            let report = library::rebuild(layout)?;
            for name in &report.succeeded {
                writeln!(output, "  registered {name}")?;
            }
            for (name, reason) in &report.failed {
                writeln!(output, "  failed {name}: {reason}")?;
            }
            writeln!(output, "Rebuild finished: {report}.")?;
        }
        MenuItem::OpenContentFolder => {
            open_content_folder(layout)?;
            writeln!(output, "Opened {}.", layout.content_dir().display())?;
        }
        MenuItem::ConnectionInfo => {
            writeln!(output, "{}", netinfo::connection_summary(settings.port))?;
        }
        MenuItem::FetchPacks => {
            let confirmed = prompt::confirm(
                input,
                output,
                "This downloads the curated content packs: tens of gigabytes \
                 over a possibly slow link.",
            )?;
            if !confirmed {
                writeln!(output, "Cancelled; nothing was downloaded.")?;
                return Ok(());
            }
            let report = packs::fetch_all(layout, output)?;
            writeln!(output, "Fetch {report}.")?;
        }
        MenuItem::Exit => unreachable!("Exit is handled by the loop"),
    }
    Ok(())
}

/// Reveal the content directory in the platform file manager, detached.
fn open_content_folder(layout: &DeploymentLayout) -> Result<()> {
    let dir = layout.content_dir();
    if !dir.is_dir() {
        return Err(ShelfError::general(format!(
            "content directory {} does not exist; re-run provisioning",
            dir.display()
        )));
    }

    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    };

    Command::new(opener)
        .arg(&dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ShelfError::general(format!("could not open {}: {e}", dir.display())))?;
    Ok(())
}
