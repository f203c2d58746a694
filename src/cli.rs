use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;

/// shelfport - provision and drive a portable offline content shelf
#[derive(Parser)]
#[command(name = "shelfport")]
#[command(about = "Provision a removable drive as an offline content shelf and drive it from a menu")]
#[command(version)]
pub struct Cli {
    /// TCP port the content server binds (also used for connection info).
    #[arg(long, global = true, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision (or refresh) a deployment on a removable volume
    Provision {
        /// Skip the interactive picker and select this volume by mount path
        /// or label. The confirmation prompt is still shown.
        #[arg(long)]
        volume: Option<String>,
    },
    /// Run the operator menu against a staged deployment
    Menu {
        /// Deployment root. Defaults to auto-detecting a staged shelf on a
        /// candidate removable volume.
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// List candidate removable volumes and exit
    Volumes,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
