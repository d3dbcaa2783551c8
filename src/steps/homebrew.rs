use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{Action, Guard, StepContext, StepId};
use crate::host::HostProbe;
use crate::manifest::Manifest;
use crate::runner::Invocation;
use crate::ui;

/// Install location used when `brew` is not yet on PATH in the running
/// process (the installer appends shell profile lines that only take
/// effect in new shells).
const BREW_FALLBACK: &str = "/opt/homebrew/bin/brew";

const INSTALLER_FILENAME: &str = "homebrew-install.sh";

fn brew_program(host: &dyn HostProbe) -> PathBuf {
    host.resolve("brew")
        .unwrap_or_else(|| PathBuf::from(BREW_FALLBACK))
}

/// Step 1: make sure Homebrew itself is present.
///
/// Guarded by `brew` being resolvable on PATH; otherwise the official
/// install script is fetched and run through `/bin/bash`.
pub struct EnsureHomebrew {
    installer_url: String,
}

impl EnsureHomebrew {
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            installer_url: manifest.homebrew.installer_url.clone(),
        }
    }
}

impl Action for EnsureHomebrew {
    fn id(&self) -> StepId {
        StepId::EnsureHomebrew
    }

    fn title(&self) -> String {
        "Ensure Homebrew".to_string()
    }

    fn guard(&self, host: &dyn HostProbe) -> Guard {
        match host.resolve("brew") {
            Some(path) => Guard::Skip(format!("Homebrew already installed at {}", path.display())),
            None => Guard::Run,
        }
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let dest = ctx.cache_dir.join(INSTALLER_FILENAME);
        ctx.downloader
            .fetch(&self.installer_url, &dest)
            .context("Failed to download the Homebrew install script")?;

        let invocation =
            Invocation::with_args("/bin/bash", [dest.to_string_lossy().into_owned()]);
        ctx.runner
            .run(&invocation)
            .context("Homebrew install script failed")?;
        Ok(())
    }
}

/// Step 2: `brew update`. Unconditional.
pub struct UpdateIndex;

impl UpdateIndex {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UpdateIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for UpdateIndex {
    fn id(&self) -> StepId {
        StepId::UpdateIndex
    }

    fn title(&self) -> String {
        "Update Homebrew index".to_string()
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let brew = brew_program(ctx.host);
        let invocation = Invocation::with_args(brew.to_string_lossy().into_owned(), ["update"]);
        ctx.runner.run(&invocation).context("brew update failed")?;
        Ok(())
    }
}

/// Step 3: install the command-line formulae, one invocation each.
pub struct InstallFormulae {
    formulae: Vec<String>,
}

impl InstallFormulae {
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            formulae: manifest.homebrew.formulae.clone(),
        }
    }
}

impl Action for InstallFormulae {
    fn id(&self) -> StepId {
        StepId::InstallFormulae
    }

    fn title(&self) -> String {
        format!("Install command-line tools ({})", self.formulae.len())
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let brew = brew_program(ctx.host);
        for formula in &self.formulae {
            ui::info(format!("brew install {formula}"));
            let invocation = Invocation::with_args(
                brew.to_string_lossy().into_owned(),
                ["install", formula.as_str()],
            );
            ctx.runner
                .run(&invocation)
                .with_context(|| format!("Failed to install formula '{formula}'"))?;
        }
        Ok(())
    }
}

/// Step 4: install GUI applications through the cask channel.
pub struct InstallCasks {
    casks: Vec<String>,
}

impl InstallCasks {
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            casks: manifest.homebrew.casks.clone(),
        }
    }
}

impl Action for InstallCasks {
    fn id(&self) -> StepId {
        StepId::InstallCasks
    }

    fn title(&self) -> String {
        format!("Install applications ({})", self.casks.len())
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let brew = brew_program(ctx.host);
        for cask in &self.casks {
            ui::info(format!("brew install --cask {cask}"));
            let invocation = Invocation::with_args(
                brew.to_string_lossy().into_owned(),
                ["install", "--cask", cask.as_str()],
            );
            ctx.runner
                .run(&invocation)
                .with_context(|| format!("Failed to install cask '{cask}'"))?;
        }
        Ok(())
    }
}
