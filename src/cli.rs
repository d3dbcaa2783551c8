use clap::{Parser, Subcommand};

/// geolab - Research workstation bootstrapper
///
/// geolab provisions a macOS machine for the lab's geospatial workflow:
/// Homebrew and its command-line tools, the GUI applications, Miniconda,
/// and a pinned Python environment with the analysis stack. Every step is
/// guarded by a host check so re-running on a provisioned machine is a
/// no-op.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bootstrap sequence against this machine
    ///
    /// Applies every step in order. Steps whose guard is already satisfied
    /// (Homebrew on PATH, Miniconda prefix present) are skipped.
    Run {
        /// Print the commands each step would run without executing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which bootstrap steps are already satisfied on this host
    Status,

    /// Validate the manifest override file
    Check,

    /// Print the environment activation hint
    Env {
        /// Shell type (zsh, bash)
        #[arg(short, long, value_name = "SHELL", default_value = "zsh")]
        shell: String,
    },
}
