use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Homebrew install script, run through /bin/bash when `brew` is absent.
const HOMEBREW_INSTALLER_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Non-interactive Miniconda installer for Apple Silicon.
const MINICONDA_INSTALLER_URL: &str =
    "https://repo.anaconda.com/miniconda/Miniconda3-latest-MacOSX-arm64.sh";

const CONDA_PREFIX: &str = "~/miniconda3";
const ENV_NAME: &str = "geolab";
const PYTHON_VERSION: &str = "3.11";

/// Command-line tools installed as Homebrew formulae.
const FORMULAE: &[&str] = &["git", "gdal", "cdo", "nco", "awscli"];

/// GUI applications installed through the cask channel.
const CASKS: &[&str] = &["visual-studio-code", "iterm2", "qgis", "panoply"];

/// Python packages installed into the lab environment, grouped so each
/// group is one pip invocation.
const PYTHON_GROUPS: &[(&str, &[&str])] = &[
    ("numeric", &["numpy", "pandas", "scipy", "statsmodels"]),
    ("io", &["xarray", "netcdf4", "h5netcdf"]),
    ("geo", &["pyproj", "cartopy"]),
    ("earthengine", &["earthengine-api", "geemap"]),
    ("plotting", &["matplotlib", "seaborn"]),
    ("ml", &["scikit-learn"]),
];

/// Homebrew section of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomebrewManifest {
    pub installer_url: String,
    pub formulae: Vec<String>,
    pub casks: Vec<String>,
}

/// Conda section of the manifest.
///
/// `prefix` may contain a leading `~`, expanded at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CondaManifest {
    pub installer_url: String,
    pub prefix: String,
    pub env_name: String,
    pub python_version: String,
}

/// A named group of Python packages installed in one pip invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageGroup {
    pub name: String,
    pub packages: Vec<String>,
}

/// The full tool manifest driving the bootstrap sequence.
///
/// Defaults are fixed at authoring time. An optional override file
/// (`$XDG_CONFIG_HOME/geolab/manifest.toml`) may replace whole sections;
/// a missing file yields the defaults unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub homebrew: HomebrewManifest,
    pub conda: CondaManifest,
    pub python_groups: Vec<PackageGroup>,
}

/// Partial representation of a manifest override file. Absent sections
/// keep their authoring-time defaults.
#[derive(Debug, Clone, Default, Deserialize)]
struct ManifestToml {
    #[serde(default)]
    homebrew: Option<HomebrewManifest>,
    #[serde(default)]
    conda: Option<CondaManifest>,
    #[serde(default)]
    python_groups: Option<Vec<PackageGroup>>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            homebrew: HomebrewManifest {
                installer_url: HOMEBREW_INSTALLER_URL.to_string(),
                formulae: FORMULAE.iter().map(|s| s.to_string()).collect(),
                casks: CASKS.iter().map(|s| s.to_string()).collect(),
            },
            conda: CondaManifest {
                installer_url: MINICONDA_INSTALLER_URL.to_string(),
                prefix: CONDA_PREFIX.to_string(),
                env_name: ENV_NAME.to_string(),
                python_version: PYTHON_VERSION.to_string(),
            },
            python_groups: PYTHON_GROUPS
                .iter()
                .map(|(name, packages)| PackageGroup {
                    name: name.to_string(),
                    packages: packages.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl Manifest {
    /// Load the manifest, applying the override file at `path` if present.
    pub fn load(path: &Path) -> Result<Self> {
        let mut manifest = Self::default();

        if !path.exists() {
            return Ok(manifest);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest override {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(manifest);
        }

        let overrides: ManifestToml = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse manifest override {:?}", path))?;

        if let Some(homebrew) = overrides.homebrew {
            manifest.homebrew = homebrew;
        }
        if let Some(conda) = overrides.conda {
            manifest.conda = conda;
        }
        if let Some(groups) = overrides.python_groups {
            manifest.python_groups = groups;
        }

        Ok(manifest)
    }

    /// Conda prefix with `~` expanded to the user's home directory.
    pub fn conda_prefix(&self) -> Result<PathBuf> {
        let expanded = shellexpand::tilde(&self.conda.prefix);
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// The `python=X.Y` pin passed to `conda create`. The same string on
    /// every run; never derived from host state.
    pub fn python_pin(&self) -> String {
        format!("python={}", self.conda.python_version)
    }
}

/// A single problem found while validating a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIssue {
    pub section: String,
    pub message: String,
}

impl ManifestIssue {
    fn new(section: &str, message: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a manifest, returning every issue found.
pub fn validate_manifest(manifest: &Manifest) -> Vec<ManifestIssue> {
    let mut issues = Vec::new();

    check_https_url(&mut issues, "homebrew", &manifest.homebrew.installer_url);
    check_https_url(&mut issues, "conda", &manifest.conda.installer_url);

    check_names(&mut issues, "homebrew", "formula", &manifest.homebrew.formulae);
    check_names(&mut issues, "homebrew", "cask", &manifest.homebrew.casks);

    if manifest.conda.env_name.trim().is_empty() {
        issues.push(ManifestIssue::new("conda", "environment name is empty"));
    }
    if manifest.conda.prefix.trim().is_empty() {
        issues.push(ManifestIssue::new("conda", "prefix is empty"));
    }

    if !is_version_pin(&manifest.conda.python_version) {
        issues.push(ManifestIssue::new(
            "conda",
            format!(
                "python_version '{}' is not a dotted numeric pin",
                manifest.conda.python_version
            ),
        ));
    }

    for group in &manifest.python_groups {
        if group.name.trim().is_empty() {
            issues.push(ManifestIssue::new("python_groups", "group with empty name"));
        }
        if group.packages.is_empty() {
            issues.push(ManifestIssue::new(
                "python_groups",
                format!("group '{}' has no packages", group.name),
            ));
        }
        for package in &group.packages {
            if package.trim().is_empty() {
                issues.push(ManifestIssue::new(
                    "python_groups",
                    format!("group '{}' contains an empty package name", group.name),
                ));
            }
        }
    }

    issues
}

fn check_https_url(issues: &mut Vec<ManifestIssue>, section: &str, raw: &str) {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "https" => {}
        Ok(url) => issues.push(ManifestIssue::new(
            section,
            format!("installer_url must use https, got '{}'", url.scheme()),
        )),
        Err(err) => issues.push(ManifestIssue::new(
            section,
            format!("installer_url '{raw}' is not a valid URL: {err}"),
        )),
    }
}

fn check_names(issues: &mut Vec<ManifestIssue>, section: &str, kind: &str, names: &[String]) {
    for name in names {
        if name.trim().is_empty() {
            issues.push(ManifestIssue::new(section, format!("empty {kind} name")));
        }
    }
}

fn is_version_pin(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}
