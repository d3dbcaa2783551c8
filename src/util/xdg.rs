use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Get the XDG config directory for geolab
///
/// Returns `$XDG_CONFIG_HOME/geolab` or `~/.config/geolab` if not set
pub fn config_dir() -> Result<PathBuf> {
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            directories::BaseDirs::new()
                .expect("Failed to get home directory")
                .home_dir()
                .join(".config")
        });

    Ok(base.join("geolab"))
}

/// Get the XDG state directory for geolab
///
/// Returns `$XDG_STATE_HOME/geolab` or `~/.local/state/geolab` if not set
pub fn state_dir() -> Result<PathBuf> {
    let base = env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            directories::BaseDirs::new()
                .expect("Failed to get home directory")
                .home_dir()
                .join(".local/state")
        });

    Ok(base.join("geolab"))
}

/// Get the XDG cache directory for geolab
///
/// Returns `$XDG_CACHE_HOME/geolab` or `~/.cache/geolab` if not set
pub fn cache_dir() -> Result<PathBuf> {
    let base = env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            directories::BaseDirs::new()
                .expect("Failed to get home directory")
                .home_dir()
                .join(".cache")
        });

    Ok(base.join("geolab"))
}
