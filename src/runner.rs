use std::cell::RefCell;
use std::fmt;
use std::process::Command;
use thiserror::Error;

use crate::ui;

/// A single external command an action wants to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_args<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Failure running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with status {code}")]
    Failed { program: String, code: i32 },

    #[error("'{program}' terminated by signal")]
    Terminated { program: String },
}

/// Execution seam for the bootstrap steps. Every mutating external call
/// goes through this trait so the plan can be exercised without touching
/// the host.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError>;
}

/// Runs commands for real: stdio inherited so the operator sees the
/// invoked tool's own output, blocking until exit.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        tracing::debug!(command = %invocation, "running");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|source| CommandError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if status.success() {
            return Ok(());
        }

        match status.code() {
            Some(code) => Err(CommandError::Failed {
                program: invocation.program.clone(),
                code,
            }),
            None => Err(CommandError::Terminated {
                program: invocation.program.clone(),
            }),
        }
    }
}

/// Prints each planned command instead of executing it, recording the
/// sequence for inspection.
#[derive(Debug, Default)]
pub struct DryRunner {
    planned: RefCell<Vec<Invocation>>,
}

impl DryRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planned(&self) -> Vec<Invocation> {
        self.planned.borrow().clone()
    }
}

impl CommandRunner for DryRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        ui::info(format!("would run: {invocation}"));
        self.planned.borrow_mut().push(invocation.clone());
        Ok(())
    }
}

/// Records invocations silently. Test double for guard/ordering tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRunner {
    recorded: RefCell<Vec<Invocation>>,
}

#[cfg(test)]
impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn recorded(&self) -> Vec<Invocation> {
        self.recorded.borrow().clone()
    }
}

#[cfg(test)]
impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        self.recorded.borrow_mut().push(invocation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_display_is_shell_like() {
        let invocation = Invocation::new("brew", &["install", "gdal", "cdo"]);
        assert_eq!(invocation.to_string(), "brew install gdal cdo");
    }

    #[test]
    fn process_runner_reports_missing_program() {
        let runner = ProcessRunner::new();
        let invocation = Invocation::new("geolab-definitely-not-a-program", &[]);
        let err = runner.run(&invocation).unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn process_runner_reports_nonzero_exit() {
        let runner = ProcessRunner::new();
        let invocation = Invocation::new("false", &[]);
        let err = runner.run(&invocation).unwrap_err();
        match err {
            CommandError::Failed { program, code } => {
                assert_eq!(program, "false");
                assert_eq!(code, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn process_runner_succeeds_on_zero_exit() {
        let runner = ProcessRunner::new();
        let invocation = Invocation::new("true", &[]);
        assert!(runner.run(&invocation).is_ok());
    }

    #[test]
    fn dry_runner_records_without_executing() {
        let runner = DryRunner::new();
        let invocation = Invocation::new("brew", &["update"]);
        runner.run(&invocation).unwrap();
        assert_eq!(runner.planned(), vec![invocation]);
    }
}
