//! Types for command execution.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;

use crate::env::EnvMap;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The request had no program to run.
  #[error("empty command")]
  EmptyCommand,

  /// The program could not be started at all.
  #[error("failed to spawn {program}: {source}")]
  Spawn { program: String, source: io::Error },

  /// The program ran and exited unsuccessfully.
  #[error("{label} failed ({status}): {cmd}")]
  CmdFailed {
    label: String,
    cmd: String,
    status: String,
    /// Exit code, `None` when the process was killed by a signal.
    code: Option<i32>,
  },

  /// I/O error while preparing the command.
  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// Where a child's output stream goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Redirect {
  /// Share the driver's stream.
  #[default]
  Inherit,
  /// Discard.
  Null,
  /// Append to a file, creating it if needed.
  Append(PathBuf),
}

impl Redirect {
  pub(crate) fn to_stdio(&self) -> io::Result<Stdio> {
    match self {
      Redirect::Inherit => Ok(Stdio::inherit()),
      Redirect::Null => Ok(Stdio::null()),
      Redirect::Append(path) => {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Stdio::from(file))
      }
    }
  }
}

/// A single command to run to completion.
///
/// When `env` is set it replaces the child's environment entirely; otherwise
/// the child inherits the driver's environment.
#[derive(Debug, Clone, Default)]
pub struct ExecutionRequest {
  pub command: Vec<OsString>,
  pub cwd: Option<PathBuf>,
  pub env: Option<EnvMap>,
  pub stdout: Redirect,
  pub stderr: Redirect,
}

impl ExecutionRequest {
  pub fn new<I, S>(command: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    Self {
      command: command.into_iter().map(Into::into).collect(),
      ..Default::default()
    }
  }

  pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn env(mut self, env: EnvMap) -> Self {
    self.env = Some(env);
    self
  }

  pub fn stdout(mut self, redirect: Redirect) -> Self {
    self.stdout = redirect;
    self
  }

  pub fn stderr(mut self, redirect: Redirect) -> Self {
    self.stderr = redirect;
    self
  }
}
