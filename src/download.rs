use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::ui;

/// Installer downloads are a few megabytes; brew's network calls handle
/// their own timeouts, this only covers our two direct fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Fetch seam for the two installer scripts, mirrored by a planning
/// implementation so dry runs stay off the network.
pub trait Downloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTPS fetch to a file on disk. No checksum verification; the
/// invoked installer is trusted the same way the upstream instructions
/// trust `curl | bash`.
#[derive(Debug, Default)]
pub struct HttpDownloader;

impl HttpDownloader {
    pub fn new() -> Self {
        Self
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!(url, dest = %dest.display(), "fetching installer");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create download directory {:?}", parent))?;
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let response = client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("Server rejected request for {url}"))?;

        let body = response
            .bytes()
            .with_context(|| format!("Failed to read response body from {url}"))?;

        fs::write(dest, &body)
            .with_context(|| format!("Failed to write installer to {:?}", dest))?;

        Ok(())
    }
}

/// Dry-run stand-in: announces the fetch and leaves the filesystem alone.
#[derive(Debug, Default)]
pub struct PlannedDownloader;

impl PlannedDownloader {
    pub fn new() -> Self {
        Self
    }
}

impl Downloader for PlannedDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        ui::info(format!("would fetch: {url} -> {}", dest.display()));
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Records fetch requests without touching the network.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingDownloader {
        fetched: RefCell<Vec<(String, PathBuf)>>,
    }

    impl RecordingDownloader {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn fetched(&self) -> Vec<(String, PathBuf)> {
            self.fetched.borrow().clone()
        }
    }

    impl Downloader for RecordingDownloader {
        fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
            self.fetched
                .borrow_mut()
                .push((url.to_string(), dest.to_path_buf()));
            Ok(())
        }
    }
}
