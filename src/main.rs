//! shelfport - Main entry point
//!
//! Thin binary over the library: logger setup, CLI dispatch, and the
//! interactive wiring of the provisioning and menu flows to stdin/stdout.

use anyhow::bail;
use crossterm::cursor::MoveTo;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use log::{debug, info};
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use shelfport::cli::{Cli, Commands};
use shelfport::config::Settings;
use shelfport::error::ShelfError;
use shelfport::layout::{self, DeploymentLayout};
use shelfport::{fetch, menu, prompt, staging, volume};

/// Initialize the logger with appropriate settings
fn init_logger() {
    use env_logger::Builder;

    Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env() // Allows RUST_LOG env var to override
        .init();
}

/// Main application entry point
fn main() -> anyhow::Result<()> {
    init_logger();
    info!("shelfport starting up");

    let cli = Cli::parse_args();
    let settings = Settings::with_port(cli.port);
    debug!("CLI arguments parsed, port {}", settings.port);

    match cli.command {
        Some(Commands::Volumes) => run_volumes(),
        Some(Commands::Provision { volume }) => run_provision(&settings, volume),
        Some(Commands::Menu { root }) => run_menu_command(&settings, root),
        // Provisioning is the natural first contact with the tool.
        None => run_provision(&settings, None),
    }
}

/// List candidate volumes and exit.
fn run_volumes() -> anyhow::Result<()> {
    let volumes = volume::list_candidate_volumes();
    if volumes.is_empty() {
        println!("No eligible removable volumes found.");
        return Ok(());
    }
    println!("Candidate volumes:");
    for v in &volumes {
        println!("  {v}");
    }
    Ok(())
}

/// Discovery -> selection -> confirmation -> staging.
fn run_provision(settings: &Settings, preselected: Option<String>) -> anyhow::Result<()> {
    let volumes = volume::list_candidate_volumes();
    if volumes.is_empty() {
        eprintln!(
            "✗ {}. Plug in the target drive (or re-plug it) and run \
             shelfport again.",
            ShelfError::NoEligibleVolume
        );
        std::process::exit(1);
    }

    let stdin = stdin();
    let mut input = stdin.lock();
    let mut output = stdout();

    let chosen = match preselected {
        Some(selector) => match volume::find_volume(&volumes, &selector) {
            Some(v) => v,
            None => {
                eprintln!("✗ {}", ShelfError::selection_invalid(&selector));
                eprintln!("  Run `shelfport volumes` to see the candidates.");
                std::process::exit(1);
            }
        },
        None => prompt::select_volume(&volumes, &mut input, &mut output)?,
    };

    println!("Selected: {chosen}");
    let layout = DeploymentLayout::on_volume(&chosen.mount_point);

    let confirmed = prompt::confirm(
        &mut input,
        &mut output,
        &format!(
            "About to provision '{}'. Files outside {} are not touched; \
             existing content archives are preserved; tools and generated \
             documents are refreshed.",
            chosen.id,
            layout.root().display()
        ),
    )?;
    if !confirmed {
        println!("Cancelled. Nothing was written.");
        return Ok(());
    }

    let client = fetch::client()?;
    staging::stage(&layout, settings, true, &client)?;

    println!("✓ Deployment staged at {}", layout.root().display());
    println!(
        "  Put content archives into {} and run `shelfport menu --root {}` \
         (or start-shelf.sh on the drive) to operate the shelf.",
        layout.content_dir().display(),
        layout.root().display()
    );
    Ok(())
}

/// Resolve the deployment root and hand control to the menu loop.
fn run_menu_command(settings: &Settings, root: Option<PathBuf>) -> anyhow::Result<()> {
    let layout = match root {
        Some(root) => DeploymentLayout::new(root),
        None => {
            let volumes = volume::list_candidate_volumes();
            match layout::locate_deployment(&volumes) {
                Some(layout) => layout,
                None => bail!(
                    "no staged deployment found on any candidate volume; \
                     run `shelfport provision` first, or pass --root <path>"
                ),
            }
        }
    };

    if !layout.is_staged() {
        bail!(
            "{} does not look like a staged deployment (tools/ and content/ \
             are missing); run `shelfport provision` first",
            layout.root().display()
        );
    }

    let mut output = stdout();
    // Start from a clean screen; everything after this is plain lines.
    let _ = crossterm::execute!(output, Clear(ClearType::All), MoveTo(0, 0));
    println!("{}", "shelfport: offline content shelf".bold());

    let stdin = stdin();
    let mut input = stdin.lock();
    menu::run_menu(&layout, settings, &mut input, &mut output)?;
    Ok(())
}
