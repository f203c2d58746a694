//! Blocking HTTP downloads.
//!
//! One narrow contract: fetch a URL into a destination file, report success
//! or failure. On failure any partial file stays in place so
//! the operator can inspect it; retries re-fetch from scratch.

use crate::error::{Result, ShelfError};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};

/// Build the shared blocking client.
///
/// No overall request timeout: content packs run to tens of gigabytes and a
/// wall-clock cap would abort healthy transfers. The connect phase keeps a
/// short timeout so dead networks fail fast.
pub fn client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("shelfport/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(30))
        .timeout(None::<Duration>)
        .build()
        .map_err(|e| ShelfError::network_fetch(format!("failed to build HTTP client: {e}")))
}

/// Fetch `url` into `dest`, writing the response body verbatim.
///
/// Returns the number of bytes written. A non-success status is a failure
/// before anything is written; a transfer error mid-body leaves the partial
/// file at `dest`.
pub fn fetch_to_file(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> Result<u64> {
    debug!("GET {} -> {}", url, dest.display());

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| ShelfError::network_fetch(format!("{url}: {e}")))?;

    if !response.status().is_success() {
        return Err(ShelfError::network_fetch(format!(
            "{url}: HTTP {}",
            response.status()
        )));
    }

    let file = File::create(dest).map_err(|e| ShelfError::fs_write(dest, e))?;
    let mut writer = BufWriter::new(file);

    let bytes = response
        .copy_to(&mut writer)
        .map_err(|e| ShelfError::network_fetch(format!("{url}: transfer failed: {e}")))?;

    info!("fetched {} ({} bytes)", url, bytes);
    Ok(bytes)
}
