use anyhow::Result;
use tracing::debug;

use crate::download::{HttpDownloader, PlannedDownloader};
use crate::host::SystemHost;
use crate::manifest::{validate_manifest, Manifest};
use crate::orchestrator::Bootstrap;
use crate::runner::{DryRunner, ProcessRunner};
use crate::ui;
use crate::util::xdg;

pub fn execute(dry_run: bool) -> Result<()> {
    let manifest_path = xdg::config_dir()?.join("manifest.toml");
    let manifest = Manifest::load(&manifest_path)?;
    debug!(manifest = ?manifest_path, "loaded manifest");

    let issues = validate_manifest(&manifest);
    if !issues.is_empty() {
        for issue in &issues {
            ui::error(format!("[{}] {}", issue.section, issue.message));
        }
        anyhow::bail!("Manifest validation failed ({} issue(s)).", issues.len());
    }

    let host = SystemHost::new();
    let cache_dir = xdg::cache_dir()?;

    if dry_run {
        ui::info("Dry run: printing planned commands without executing them.");
        let runner = DryRunner::new();
        let downloader = PlannedDownloader::new();
        Bootstrap::new(&manifest, &host, &runner, &downloader, cache_dir).run()?;
    } else {
        let runner = ProcessRunner::new();
        let downloader = HttpDownloader::new();
        let receipt_path = xdg::state_dir()?.join("receipt.toml");
        Bootstrap::new(&manifest, &host, &runner, &downloader, cache_dir)
            .with_receipt(receipt_path)
            .run()?;
    }

    Ok(())
}
