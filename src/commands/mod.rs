use crate::cli::{Cli, Commands};
use anyhow::Result;

mod check;
mod env;
mod run;
mod status;

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { dry_run } => run::execute(dry_run),

        Commands::Status => status::execute(),

        Commands::Check => check::execute(),

        Commands::Env { shell } => env::execute(&shell),
    }
}
