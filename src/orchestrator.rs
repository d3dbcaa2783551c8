use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::download::Downloader;
use crate::host::HostProbe;
use crate::manifest::Manifest;
use crate::receipt::{Receipt, StepOutcome};
use crate::runner::CommandRunner;
use crate::steps::{build_plan, Action, Guard, StepContext};
use crate::ui;

/// Drives the fixed bootstrap plan against a host.
///
/// Strictly sequential: each step blocks until its external processes
/// exit. The first failing step halts the run; there is no rollback.
pub struct Bootstrap<'a> {
    manifest: &'a Manifest,
    host: &'a dyn HostProbe,
    runner: &'a dyn CommandRunner,
    downloader: &'a dyn Downloader,
    cache_dir: PathBuf,
    receipt_path: Option<PathBuf>,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        manifest: &'a Manifest,
        host: &'a dyn HostProbe,
        runner: &'a dyn CommandRunner,
        downloader: &'a dyn Downloader,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            manifest,
            host,
            runner,
            downloader,
            cache_dir,
            receipt_path: None,
        }
    }

    /// Persist a run receipt at `path` when the run finishes (or fails).
    pub fn with_receipt(mut self, path: PathBuf) -> Self {
        self.receipt_path = Some(path);
        self
    }

    /// Run every step in order. Returns the receipt of what happened.
    pub fn run(&self) -> Result<Receipt> {
        let plan = build_plan(self.manifest);
        let mut receipt = Receipt::new();

        let mut ctx = StepContext {
            manifest: self.manifest,
            host: self.host,
            runner: self.runner,
            downloader: self.downloader,
            cache_dir: self.cache_dir.clone(),
            conda: None,
        };

        for action in &plan {
            let id = action.id();
            let title = action.title();
            ui::step(&title);

            match action.guard(self.host) {
                Guard::Skip(reason) => {
                    ui::skip(reason);
                    receipt.record(id.as_str(), &title, StepOutcome::Skipped);
                }
                Guard::Warn(reason) => {
                    ui::warn(reason);
                    receipt.record(id.as_str(), &title, StepOutcome::Skipped);
                }
                Guard::Run => match action.apply(&mut ctx) {
                    Ok(()) => {
                        ui::done(&title);
                        receipt.record(id.as_str(), &title, StepOutcome::Applied);
                    }
                    Err(err) => {
                        receipt.record(id.as_str(), &title, StepOutcome::Failed);
                        self.save_receipt(&receipt);
                        return Err(err.context(format!("Bootstrap step '{id}' failed")));
                    }
                },
            }
        }

        self.save_receipt(&receipt);

        ui::success("Complete", "Workstation bootstrap finished.");
        ui::info(format!(
            "Open a new shell and run 'conda activate {}' to start working.",
            self.manifest.conda.env_name
        ));

        Ok(receipt)
    }

    fn save_receipt(&self, receipt: &Receipt) {
        let Some(path) = &self.receipt_path else {
            return;
        };

        if let Err(err) = receipt
            .save(path)
            .with_context(|| format!("Failed to save receipt to {:?}", path))
        {
            // The receipt is informational; losing it is not fatal.
            ui::warn(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::testing::RecordingDownloader;
    use crate::runner::{CommandError, Invocation, RecordingRunner};
    use crate::steps::testing::FakeHost;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn provisioned_host(manifest: &Manifest) -> FakeHost {
        let prefix = manifest.conda_prefix().unwrap();
        FakeHost::new()
            .with_binary("brew")
            .with_binary("conda")
            .with_dir(prefix.clone())
            .with_file(prefix.join("bin/conda"))
    }

    #[test]
    fn fresh_host_runs_the_full_sequence_in_order() {
        let manifest = Manifest::default();
        let host = FakeHost::new();
        let runner = RecordingRunner::new();
        let downloader = RecordingDownloader::new();

        let bootstrap = Bootstrap::new(
            &manifest,
            &host,
            &runner,
            &downloader,
            PathBuf::from("/fake/cache"),
        );
        let receipt = bootstrap.run().unwrap();

        // Both installers fetched exactly once.
        let fetched = downloader.fetched();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].0, manifest.homebrew.installer_url);
        assert_eq!(fetched[1].0, manifest.conda.installer_url);

        let recorded = runner.recorded();
        let programs: Vec<&str> = recorded.iter().map(|i| i.program.as_str()).collect();

        // Homebrew installer first, then brew update before any install.
        assert_eq!(programs[0], "/bin/bash");
        assert_eq!(recorded[1].args, vec!["update"]);

        // 5 formulae + 4 casks through brew.
        let installs = recorded
            .iter()
            .filter(|i| i.args.first().map(String::as_str) == Some("install"))
            .count();
        assert_eq!(installs, 9);

        // Miniconda installer, conda init, env create, 6 pip groups.
        let miniconda_at = programs.iter().position(|p| *p == "bash").unwrap();
        assert!(miniconda_at > 1);
        assert_eq!(recorded[miniconda_at + 1].args, vec!["init", "zsh"]);

        let create_at = recorded
            .iter()
            .position(|i| i.args.first().map(String::as_str) == Some("create"))
            .unwrap();
        assert!(create_at > miniconda_at);
        assert!(recorded[create_at]
            .args
            .contains(&"python=3.11".to_string()));

        let pip_runs: Vec<&Invocation> = recorded
            .iter()
            .filter(|i| i.args.first().map(String::as_str) == Some("run"))
            .collect();
        assert_eq!(pip_runs.len(), manifest.python_groups.len());
        assert!(recorded
            .iter()
            .position(|i| i.args.first().map(String::as_str) == Some("run"))
            .unwrap()
            > create_at);

        // Every step applied, none skipped.
        assert_eq!(receipt.steps.len(), 8);
        assert!(receipt
            .steps
            .iter()
            .all(|s| s.outcome == StepOutcome::Applied));
    }

    #[test]
    fn provisioned_host_skips_both_installers() {
        let manifest = Manifest::default();
        let host = provisioned_host(&manifest);
        let runner = RecordingRunner::new();
        let downloader = RecordingDownloader::new();

        let bootstrap = Bootstrap::new(
            &manifest,
            &host,
            &runner,
            &downloader,
            PathBuf::from("/fake/cache"),
        );
        let receipt = bootstrap.run().unwrap();

        // No installer downloads, no installer executions.
        assert!(downloader.fetched().is_empty());
        assert!(runner
            .recorded()
            .iter()
            .all(|i| i.program != "/bin/bash" && i.program != "bash"));

        let skipped: Vec<&str> = receipt
            .steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Skipped)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(skipped, vec!["ensure-homebrew", "ensure-miniconda"]);
    }

    #[test]
    fn second_run_matches_the_first_on_a_provisioned_host() {
        let manifest = Manifest::default();
        let host = provisioned_host(&manifest);
        let downloader = RecordingDownloader::new();

        let first = RecordingRunner::new();
        Bootstrap::new(&manifest, &host, &first, &downloader, PathBuf::from("/c"))
            .run()
            .unwrap();

        let second = RecordingRunner::new();
        Bootstrap::new(&manifest, &host, &second, &downloader, PathBuf::from("/c"))
            .run()
            .unwrap();

        assert_eq!(first.recorded(), second.recorded());
        assert!(downloader.fetched().is_empty());
    }

    #[test]
    fn corrupt_miniconda_prefix_is_reported_not_reinstalled() {
        let manifest = Manifest::default();
        let prefix = manifest.conda_prefix().unwrap();
        // Prefix directory present, bin/conda missing.
        let host = FakeHost::new().with_binary("brew").with_dir(prefix);
        let runner = RecordingRunner::new();
        let downloader = RecordingDownloader::new();

        let bootstrap = Bootstrap::new(
            &manifest,
            &host,
            &runner,
            &downloader,
            PathBuf::from("/fake/cache"),
        );
        let receipt = bootstrap.run().unwrap();

        // Miniconda installer neither fetched nor run.
        assert!(downloader.fetched().is_empty());
        assert!(runner.recorded().iter().all(|i| i.program != "bash"));

        let miniconda = receipt
            .steps
            .iter()
            .find(|s| s.id == "ensure-miniconda")
            .unwrap();
        assert_eq!(miniconda.outcome, StepOutcome::Skipped);
    }

    /// Fails any invocation whose first arg matches, records the rest.
    struct FailingRunner {
        fail_on: &'static str,
        recorded: RefCell<Vec<Invocation>>,
    }

    impl CommandRunner for FailingRunner {
        fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
            if invocation.args.first().map(String::as_str) == Some(self.fail_on) {
                return Err(CommandError::Failed {
                    program: invocation.program.clone(),
                    code: 1,
                });
            }
            self.recorded.borrow_mut().push(invocation.clone());
            Ok(())
        }
    }

    #[test]
    fn failing_step_halts_the_run_and_saves_the_receipt() {
        let manifest = Manifest::default();
        let host = provisioned_host(&manifest);
        let runner = FailingRunner {
            fail_on: "update",
            recorded: RefCell::new(Vec::new()),
        };
        let downloader = RecordingDownloader::new();

        let temp = TempDir::new().unwrap();
        let receipt_path = temp.path().join("receipt.toml");

        let bootstrap = Bootstrap::new(
            &manifest,
            &host,
            &runner,
            &downloader,
            PathBuf::from("/fake/cache"),
        )
        .with_receipt(receipt_path.clone());

        let err = bootstrap.run().unwrap_err();
        assert!(err.to_string().contains("update-index"));

        // Nothing after the failing step ran.
        assert!(runner.recorded.borrow().is_empty());

        let receipt = Receipt::load(&receipt_path).unwrap();
        let last = receipt.steps.last().unwrap();
        assert_eq!(last.id, "update-index");
        assert_eq!(last.outcome, StepOutcome::Failed);
    }
}
