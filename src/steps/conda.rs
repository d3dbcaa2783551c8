use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{Action, Guard, StepContext, StepId};
use crate::host::HostProbe;
use crate::manifest::{Manifest, PackageGroup};
use crate::runner::Invocation;
use crate::ui;

const INSTALLER_FILENAME: &str = "miniconda.sh";

/// Step 5: make sure Miniconda is installed at the manifest prefix.
///
/// Guarded by a prefix-directory existence check. A prefix that exists
/// without `bin/conda` inside it is reported instead of silently treated
/// as healthy; the operator has to remove it before a re-run reinstalls.
pub struct EnsureMiniconda {
    installer_url: String,
    prefix: PathBuf,
}

impl EnsureMiniconda {
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            installer_url: manifest.conda.installer_url.clone(),
            prefix: manifest
                .conda_prefix()
                .unwrap_or_else(|_| PathBuf::from(&manifest.conda.prefix)),
        }
    }

    fn conda_binary(&self) -> PathBuf {
        self.prefix.join("bin/conda")
    }
}

impl Action for EnsureMiniconda {
    fn id(&self) -> StepId {
        StepId::EnsureMiniconda
    }

    fn title(&self) -> String {
        "Ensure Miniconda".to_string()
    }

    fn guard(&self, host: &dyn HostProbe) -> Guard {
        if !host.dir_exists(&self.prefix) {
            return Guard::Run;
        }

        if host.file_exists(&self.conda_binary()) {
            Guard::Skip(format!(
                "Miniconda already present at {}",
                self.prefix.display()
            ))
        } else {
            Guard::Warn(format!(
                "{} exists but {} is missing; remove the directory and re-run to reinstall",
                self.prefix.display(),
                self.conda_binary().display()
            ))
        }
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let dest = ctx.cache_dir.join(INSTALLER_FILENAME);
        ctx.downloader
            .fetch(&self.installer_url, &dest)
            .context("Failed to download the Miniconda installer")?;

        // -b: batch (non-interactive, accepts the license), -p: prefix
        let install = Invocation::with_args(
            "bash",
            [
                dest.to_string_lossy().into_owned(),
                "-b".to_string(),
                "-p".to_string(),
                self.prefix.to_string_lossy().into_owned(),
            ],
        );
        ctx.runner
            .run(&install)
            .context("Miniconda installer failed")?;

        let init = Invocation::with_args(
            self.conda_binary().to_string_lossy().into_owned(),
            ["init", "zsh"],
        );
        ctx.runner
            .run(&init)
            .context("conda init failed")?;
        Ok(())
    }
}

/// Step 6: resolve the conda binary for the rest of the run.
///
/// PATH wins when conda is already integrated into the shell; otherwise
/// the binary inside the manifest prefix (where step 5 installs) is used.
pub struct ActivateConda {
    prefix: PathBuf,
}

impl ActivateConda {
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            prefix: manifest
                .conda_prefix()
                .unwrap_or_else(|_| PathBuf::from(&manifest.conda.prefix)),
        }
    }
}

impl Action for ActivateConda {
    fn id(&self) -> StepId {
        StepId::ActivateConda
    }

    fn title(&self) -> String {
        "Activate conda".to_string()
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let conda = ctx
            .host
            .resolve("conda")
            .unwrap_or_else(|| self.prefix.join("bin/conda"));
        tracing::debug!(conda = %conda.display(), "resolved conda binary");
        ctx.conda = Some(conda);
        Ok(())
    }
}

/// Step 7: create the named environment with the pinned Python.
///
/// Not guarded: conda's own conflict handling decides what happens when
/// the environment already exists.
pub struct CreateEnvironment {
    env_name: String,
    python_pin: String,
}

impl CreateEnvironment {
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            env_name: manifest.conda.env_name.clone(),
            python_pin: manifest.python_pin(),
        }
    }
}

impl Action for CreateEnvironment {
    fn id(&self) -> StepId {
        StepId::CreateEnvironment
    }

    fn title(&self) -> String {
        format!("Create environment '{}'", self.env_name)
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let conda = ctx
            .conda
            .as_ref()
            .context("conda was not resolved before environment creation")?;

        let invocation = Invocation::with_args(
            conda.to_string_lossy().into_owned(),
            [
                "create",
                "-y",
                "-n",
                self.env_name.as_str(),
                self.python_pin.as_str(),
            ],
        );
        ctx.runner
            .run(&invocation)
            .with_context(|| format!("Failed to create environment '{}'", self.env_name))?;
        Ok(())
    }
}

/// Step 8: install the Python stack into the environment, one pip
/// invocation per manifest group.
pub struct InstallPythonPackages {
    env_name: String,
    groups: Vec<PackageGroup>,
}

impl InstallPythonPackages {
    pub fn new(manifest: &Manifest) -> Self {
        Self {
            env_name: manifest.conda.env_name.clone(),
            groups: manifest.python_groups.clone(),
        }
    }
}

impl Action for InstallPythonPackages {
    fn id(&self) -> StepId {
        StepId::InstallPythonPackages
    }

    fn title(&self) -> String {
        format!("Install Python packages ({} groups)", self.groups.len())
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let conda = ctx
            .conda
            .as_ref()
            .context("conda was not resolved before package installation")?;

        for group in &self.groups {
            ui::info(format!(
                "pip install [{}]: {}",
                group.name,
                group.packages.join(" ")
            ));

            let mut args: Vec<String> = vec![
                "run".to_string(),
                "-n".to_string(),
                self.env_name.clone(),
                "python".to_string(),
                "-m".to_string(),
                "pip".to_string(),
                "install".to_string(),
            ];
            args.extend(group.packages.iter().cloned());

            let invocation = Invocation::with_args(conda.to_string_lossy().into_owned(), args);
            ctx.runner
                .run(&invocation)
                .with_context(|| format!("pip install failed for group '{}'", group.name))?;
        }
        Ok(())
    }
}
