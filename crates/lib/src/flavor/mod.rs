//! The build flavor extension point.
//!
//! A flavor knows how to drive one build system (CMake, Make, a plain
//! command, ...). It declares which capability groups it needs, and once the
//! configuration is validated and the sources are staged, it runs the build
//! and reports where the finished image is.

mod command;

pub use command::CommandFlavor;

use std::path::PathBuf;

use crate::config::{BuildConfiguration, Capabilities};
use crate::env::EnvMap;
use crate::execute::{ExecuteError, ExecutionRequest};

/// Everything a flavor gets to run its build with.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
  pub config: &'a BuildConfiguration,
  /// The bitcode environment; pass it to every compiling subprocess.
  pub env: &'a EnvMap,
}

impl<'a> BuildContext<'a> {
  pub fn new(config: &'a BuildConfiguration, env: &'a EnvMap) -> Self {
    Self { config, env }
  }

  /// A request for `command` running in the build directory under the
  /// bitcode environment.
  pub fn request<I, S>(&self, command: I) -> ExecutionRequest
  where
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString>,
  {
    ExecutionRequest::new(command)
      .cwd(self.config.build_dir())
      .env(self.env.clone())
  }
}

/// One build-system strategy.
#[allow(async_fn_in_trait)]
pub trait BuildFlavor {
  /// Short name used in logs and errors.
  fn name(&self) -> &str;

  /// The capability groups this flavor's configuration must carry.
  fn capabilities(&self) -> Capabilities;

  /// Run the build and return the path of the built image, which must lie
  /// inside the build directory.
  async fn build(&self, ctx: &BuildContext<'_>) -> Result<PathBuf, ExecuteError>;
}
