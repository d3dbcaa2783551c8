use anyhow::Result;

use crate::manifest::Manifest;
use crate::util::xdg;

/// Print the activation command for the lab environment.
///
/// Output is plain so it can be pasted or eval'd in the target shell.
pub fn execute(shell: &str) -> Result<()> {
    match shell {
        "zsh" | "bash" => {}
        other => anyhow::bail!("Unsupported shell '{other}' (expected zsh or bash)"),
    }

    let manifest_path = xdg::config_dir()?.join("manifest.toml");
    let manifest = Manifest::load(&manifest_path)?;

    println!("conda activate {}", manifest.conda.env_name);
    Ok(())
}
