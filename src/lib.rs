//! shelfport library
//!
//! Provisions a removable drive as a portable, offline content shelf and
//! supplies the menu-driven control surface that operates it.

pub mod archive;
pub mod cli;
pub mod config;
pub mod docsgen;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod library;
pub mod menu;
pub mod netinfo;
pub mod packs;
pub mod prompt;
pub mod server;
pub mod staging;
pub mod volume;

// Re-export main types for convenience
pub use config::Settings;
pub use error::{Result, ShelfError};
pub use layout::{locate_deployment, DeploymentLayout};
pub use library::RebuildReport;
pub use menu::MenuItem;
pub use packs::{ContentPack, FetchReport, CURATED_PACKS};
pub use server::{ServerHandle, StopOutcome};
pub use volume::{filter_candidates, find_volume, list_candidate_volumes, Volume};
