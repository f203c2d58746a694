//! Curated content packs and the bulk fetch command.
//!
//! The list is a compiled-in literal: the fetch flow is aimed at
//! non-technical operators and offers no way to feed it
//! arbitrary URLs. Transfers are sequential and best-effort: one failed
//! item never prevents the next, and partial files stay on disk for
//! inspection or manual retry.

use crate::error::Result;
use crate::fetch;
use crate::layout::DeploymentLayout;
use std::fmt;
use std::io::Write;

use log::{info, warn};

/// One curated (remote location, destination filename) pair.
#[derive(Debug, Clone, Copy)]
pub struct ContentPack {
    pub url: &'static str,
    pub file_name: &'static str,
    pub summary: &'static str,
}

/// The curated offline shelf: a general reference set in English.
pub const CURATED_PACKS: &[ContentPack] = &[
    ContentPack {
        url: "https://download.kiwix.org/zim/wikipedia/wikipedia_en_simple_all_maxi.zim",
        file_name: "wikipedia_en_simple_all_maxi.zim",
        summary: "Simple English Wikipedia, full text with images",
    },
    ContentPack {
        url: "https://download.kiwix.org/zim/wiktionary/wiktionary_en_simple_all_maxi.zim",
        file_name: "wiktionary_en_simple_all_maxi.zim",
        summary: "Simple English Wiktionary",
    },
    ContentPack {
        url: "https://download.kiwix.org/zim/wikivoyage/wikivoyage_en_all_maxi.zim",
        file_name: "wikivoyage_en_all_maxi.zim",
        summary: "Wikivoyage travel guides",
    },
    ContentPack {
        url: "https://download.kiwix.org/zim/gutenberg/gutenberg_en_all.zim",
        file_name: "gutenberg_en_all.zim",
        summary: "Project Gutenberg books in English",
    },
];

/// Outcome of one bulk fetch run.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub fetched: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl FetchReport {
    pub fn completed_with_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.completed_with_failures() {
            write!(
                f,
                "completed with failures: {} fetched, {} failed",
                self.fetched.len(),
                self.failed.len()
            )
        } else {
            write!(f, "completed: {} fetched", self.fetched.len())
        }
    }
}

/// Fetch every curated pack into the content directory, sequentially.
///
/// Progress and per-item outcomes are written to `out` as they happen;
/// these transfers run for hours and silence would read as a hang.
pub fn fetch_all<W: Write>(layout: &DeploymentLayout, out: &mut W) -> Result<FetchReport> {
    let client = fetch::client()?;
    let mut report = FetchReport::default();

    for pack in CURATED_PACKS {
        let dest = layout.content_dir().join(pack.file_name);
        writeln!(out, "Fetching {}: {}", pack.file_name, pack.summary)?;

        match fetch::fetch_to_file(&client, pack.url, &dest) {
            Ok(bytes) => {
                info!("fetched {} ({} bytes)", pack.file_name, bytes);
                writeln!(out, "  done ({} MiB)", bytes / (1024 * 1024))?;
                report.fetched.push(pack.file_name.to_string());
            }
            Err(e) => {
                warn!("fetch failed for {}: {e}", pack.file_name);
                writeln!(
                    out,
                    "  failed: {e}\n  any partial file was left at {}; delete it before retrying",
                    dest.display()
                )?;
                report.failed.push((pack.file_name.to_string(), e.to_string()));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_curated_list_is_consistent() {
        assert!(!CURATED_PACKS.is_empty());
        let mut names = HashSet::new();
        for pack in CURATED_PACKS {
            assert!(pack.url.starts_with("https://"), "{} not https", pack.url);
            assert!(
                pack.file_name.ends_with(".zim"),
                "{} is not a recognized archive name",
                pack.file_name
            );
            assert!(pack.url.ends_with(pack.file_name), "{} mismatch", pack.url);
            assert!(names.insert(pack.file_name), "{} duplicated", pack.file_name);
        }
    }

    #[test]
    fn test_report_display() {
        let clean = FetchReport {
            fetched: vec!["a.zim".into()],
            failed: vec![],
        };
        assert_eq!(clean.to_string(), "completed: 1 fetched");

        let mixed = FetchReport {
            fetched: vec!["a.zim".into()],
            failed: vec![("b.zim".into(), "HTTP 503".into())],
        };
        assert!(mixed.completed_with_failures());
        assert_eq!(mixed.to_string(), "completed with failures: 1 fetched, 1 failed");
    }
}
