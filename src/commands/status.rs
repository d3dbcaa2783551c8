use anyhow::Result;

use crate::host::{HostProbe, SystemHost};
use crate::manifest::Manifest;
use crate::receipt::Receipt;
use crate::steps::{build_plan, Action, Guard};
use crate::ui;
use crate::util::xdg;

/// Probe the host and report each step's guard disposition. Read-only.
pub fn execute() -> Result<()> {
    let manifest_path = xdg::config_dir()?.join("manifest.toml");
    let manifest = Manifest::load(&manifest_path)?;
    let host = SystemHost::new();

    for tool in ["brew", "conda"] {
        match host.resolve(tool) {
            Some(path) => {
                let version = host
                    .probe_version(&path)
                    .unwrap_or_else(|| "unknown version".to_string());
                ui::info(format!("{tool} {version} ({})", path.display()));
            }
            None => ui::info(format!("{tool} not on PATH")),
        }
    }

    for action in build_plan(&manifest) {
        let title = action.title();
        match action.guard(&host) {
            Guard::Skip(reason) => ui::success("satisfied", format!("{title}: {reason}")),
            Guard::Warn(reason) => ui::warn(format!("{title}: {reason}")),
            Guard::Run => ui::info(format!("pending: {title}")),
        }
    }

    let receipt_path = xdg::state_dir()?.join("receipt.toml");
    if receipt_path.exists() {
        let receipt = Receipt::load(&receipt_path)?;
        ui::info(format!(
            "Last run started {} ({} step(s) recorded)",
            receipt.metadata.started_at,
            receipt.steps.len()
        ));
        for step in &receipt.steps {
            ui::info(format!("  {} {}", step.outcome, step.id));
        }
    } else {
        ui::info("No previous run recorded.");
    }

    Ok(())
}
