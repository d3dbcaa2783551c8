use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// What happened to a step during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Applied,
    Skipped,
    Failed,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Applied => write!(f, "applied"),
            StepOutcome::Skipped => write!(f, "skipped"),
            StepOutcome::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step identifier (stable across releases)
    pub id: String,
    /// Human-readable step title
    pub title: String,
    /// Outcome of this step
    pub outcome: StepOutcome,
    /// When the step finished
    pub at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// When this run started
    pub started_at: String,
}

/// Record of the most recent bootstrap run.
///
/// Receipts are informational output for `status` only. Guards never read
/// them; whether a step runs is decided by probing the live host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    version: u32,
    pub metadata: Metadata,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

impl Default for Receipt {
    fn default() -> Self {
        Self::new()
    }
}

impl Receipt {
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: 1,
            metadata: Metadata { started_at: now },
            steps: Vec::new(),
        }
    }

    /// Load a receipt from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read receipt from {:?}", path))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse receipt from {:?}", path))
    }

    /// Save the receipt to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create receipt directory {:?}", parent))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize receipt")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write receipt to {:?}", path))?;

        Ok(())
    }

    /// Record a step outcome, timestamping it now.
    pub fn record(&mut self, id: &str, title: &str, outcome: StepOutcome) {
        self.steps.push(StepRecord {
            id: id.to_string(),
            title: title.to_string(),
            outcome,
            at: chrono::Utc::now().to_rfc3339(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn roundtrip_preserves_steps() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("receipt.toml");

        let mut receipt = Receipt::new();
        receipt.record("ensure-homebrew", "Ensure Homebrew", StepOutcome::Skipped);
        receipt.record("update-index", "Update Homebrew index", StepOutcome::Applied);
        receipt.save(&path).unwrap();

        let loaded = Receipt::load(&path).unwrap();
        assert_eq!(loaded.steps.len(), 2);
        assert_eq!(loaded.steps[0].id, "ensure-homebrew");
        assert_eq!(loaded.steps[0].outcome, StepOutcome::Skipped);
        assert_eq!(loaded.steps[1].outcome, StepOutcome::Applied);
    }

    #[test]
    fn load_missing_receipt_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Receipt::load(&temp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state/geolab/receipt.toml");
        Receipt::new().save(&path).unwrap();
        assert!(path.exists());
    }
}
