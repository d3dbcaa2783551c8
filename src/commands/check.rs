use anyhow::Result;

use crate::manifest::{validate_manifest, Manifest};
use crate::ui;
use crate::util::xdg;

pub fn execute() -> Result<()> {
    let manifest_path = xdg::config_dir()?.join("manifest.toml");
    let manifest = Manifest::load(&manifest_path)?;
    let issues = validate_manifest(&manifest);

    if issues.is_empty() {
        if manifest_path.exists() {
            ui::success(
                "Check",
                format!("Manifest override {:?} is valid.", manifest_path),
            );
        } else {
            ui::success("Check", "No manifest override; built-in manifest is valid.");
        }
        return Ok(());
    }

    for issue in &issues {
        ui::error(format!("[{}] {}", issue.section, issue.message));
    }
    anyhow::bail!("Manifest validation failed ({} issue(s)).", issues.len());
}
