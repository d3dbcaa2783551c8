use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

use crate::download::Downloader;
use crate::host::HostProbe;
use crate::manifest::Manifest;
use crate::runner::CommandRunner;

mod conda;
mod homebrew;

pub use conda::{ActivateConda, CreateEnvironment, EnsureMiniconda, InstallPythonPackages};
pub use homebrew::{EnsureHomebrew, InstallCasks, InstallFormulae, UpdateIndex};

/// Stable identifier for each bootstrap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    EnsureHomebrew,
    UpdateIndex,
    InstallFormulae,
    InstallCasks,
    EnsureMiniconda,
    ActivateConda,
    CreateEnvironment,
    InstallPythonPackages,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            StepId::EnsureHomebrew => "ensure-homebrew",
            StepId::UpdateIndex => "update-index",
            StepId::InstallFormulae => "install-formulae",
            StepId::InstallCasks => "install-casks",
            StepId::EnsureMiniconda => "ensure-miniconda",
            StepId::ActivateConda => "activate-conda",
            StepId::CreateEnvironment => "create-environment",
            StepId::InstallPythonPackages => "install-python-packages",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guard verdict for a step. Guards probe live host state only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Precondition not met, the step should apply.
    Run,
    /// Already satisfied; skip with the given reason.
    Skip(String),
    /// Skip, but the host is in a state the operator should look at.
    Warn(String),
}

/// Mutable state threaded through the plan in step order.
pub struct StepContext<'a> {
    pub manifest: &'a Manifest,
    pub host: &'a dyn HostProbe,
    pub runner: &'a dyn CommandRunner,
    pub downloader: &'a dyn Downloader,
    /// Download destination for installer scripts.
    pub cache_dir: PathBuf,
    /// Conda binary resolved by `ActivateConda`; steps that target the
    /// environment refuse to run while this is unset.
    pub conda: Option<PathBuf>,
}

/// A named bootstrap action: a precondition predicate plus a
/// fire-and-forget apply. No compensating rollback.
pub trait Action {
    fn id(&self) -> StepId;

    fn title(&self) -> String;

    /// Precondition check against the live host. Defaults to
    /// unconditional execution.
    fn guard(&self, _host: &dyn HostProbe) -> Guard {
        Guard::Run
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()>;
}

/// Build the fixed, ordered bootstrap plan from a manifest.
///
/// Order is load-bearing: Homebrew before any brew install, Miniconda
/// before environment creation, conda resolution before anything that
/// targets the environment.
pub fn build_plan(manifest: &Manifest) -> Vec<Box<dyn Action>> {
    vec![
        Box::new(EnsureHomebrew::new(manifest)),
        Box::new(UpdateIndex::new()),
        Box::new(InstallFormulae::new(manifest)),
        Box::new(InstallCasks::new(manifest)),
        Box::new(EnsureMiniconda::new(manifest)),
        Box::new(ActivateConda::new(manifest)),
        Box::new(CreateEnvironment::new(manifest)),
        Box::new(InstallPythonPackages::new(manifest)),
    ]
}
