//! The build pipeline.
//!
//! ```text
//! validate ──► stage (in-source only) ──► bitcode env ──► flavor build ──► get-bc
//! ```
//!
//! Each step finishes before the next one starts and the first failure ends
//! the run. Nothing is retried.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::config::{BuildConfiguration, ConfigError, RawConfig};
use crate::env::{EnvMap, bitcode_environment, process_environment};
use crate::execute::ExecuteError;
use crate::extract::extract;
use crate::flavor::{BuildContext, BuildFlavor};
use crate::stage::{StageError, stage};

/// Errors that end a driver run.
#[derive(Debug, Error)]
pub enum DriverError {
  #[error("invalid configuration: {0}")]
  Config(#[from] ConfigError),

  #[error("staging failed: {0}")]
  Stage(#[from] StageError),

  #[error("failed to prepare bitcode environment: {0}")]
  Environment(#[source] io::Error),

  #[error("{flavor} build failed: {source}")]
  Build { flavor: String, source: ExecuteError },

  #[error("build finished but image {} does not exist", .0.display())]
  MissingImage(PathBuf),

  #[error("bitcode extraction failed: {0}")]
  Extract(#[source] ExecuteError),
}

/// Owns one validated configuration and the flavor that builds it.
#[derive(Debug)]
pub struct Driver<F> {
  config: BuildConfiguration,
  flavor: F,
}

impl<F: BuildFlavor> Driver<F> {
  /// Validate `raw` against the capabilities `flavor` declares.
  pub fn new(flavor: F, raw: RawConfig) -> Result<Self, DriverError> {
    let config = BuildConfiguration::from_raw(flavor.capabilities(), raw)?;
    Ok(Self { config, flavor })
  }

  pub fn config(&self) -> &BuildConfiguration {
    &self.config
  }

  pub fn flavor(&self) -> &F {
    &self.flavor
  }

  /// Run the whole pipeline under the inherited process environment.
  pub async fn run(&self) -> Result<PathBuf, DriverError> {
    self.run_with_env(process_environment()).await
  }

  /// Run the whole pipeline with an explicit base environment.
  ///
  /// Returns the absolute path of the bitcode file.
  pub async fn run_with_env(&self, base: EnvMap) -> Result<PathBuf, DriverError> {
    if stage(&self.config)? {
      info!(build_dir = %self.config.build_dir().display(), "sources staged");
    }

    let env = bitcode_environment(&self.config, base).map_err(DriverError::Environment)?;
    let ctx = BuildContext::new(&self.config, &env);

    info!(flavor = self.flavor.name(), "building");
    let image = self.flavor.build(&ctx).await.map_err(|source| DriverError::Build {
      flavor: self.flavor.name().to_string(),
      source,
    })?;

    if !image.exists() {
      return Err(DriverError::MissingImage(image));
    }

    extract(&self.config, &image, &env).await.map_err(DriverError::Extract)
  }
}
