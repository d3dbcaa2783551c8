// Public API
pub mod cli;
pub mod commands;

// Core domain types
mod download;
mod host;
mod manifest;
mod orchestrator;
mod receipt;
mod runner;
mod steps;
mod ui;
mod util;

// Re-export main types
pub use download::{Downloader, HttpDownloader, PlannedDownloader};
pub use host::{HostProbe, SystemHost};
pub use manifest::{Manifest, ManifestIssue, PackageGroup};
pub use orchestrator::Bootstrap;
pub use receipt::{Receipt, StepOutcome};
pub use runner::{CommandRunner, DryRunner, Invocation, ProcessRunner};
pub use steps::{build_plan, Action, Guard, StepContext, StepId};
