use std::ffi::OsString;
use std::path::PathBuf;

use tracing::info;

use crate::config::Capabilities;
use crate::execute::{ExecuteError, run};
use crate::flavor::{BuildContext, BuildFlavor};

/// Runs an operator-supplied command in the build directory.
///
/// Useful for projects whose build is a script, or for wrapping a build
/// system that has no dedicated flavor. The command inherits the bitcode
/// environment, so pointing `CC` at the compiler wrapper is all it takes.
#[derive(Debug, Clone)]
pub struct CommandFlavor {
  capabilities: Capabilities,
  command: Vec<OsString>,
  image: PathBuf,
}

impl CommandFlavor {
  /// `image` is relative to the build directory.
  pub fn new<I, S>(capabilities: Capabilities, command: I, image: impl Into<PathBuf>) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    Self {
      capabilities,
      command: command.into_iter().map(Into::into).collect(),
      image: image.into(),
    }
  }
}

impl BuildFlavor for CommandFlavor {
  fn name(&self) -> &str {
    "command"
  }

  fn capabilities(&self) -> Capabilities {
    self.capabilities
  }

  async fn build(&self, ctx: &BuildContext<'_>) -> Result<PathBuf, ExecuteError> {
    run("Building", &ctx.request(self.command.iter().cloned())).await?;

    let image = ctx.config.build_dir().join(&self.image);
    info!(image = %image.display(), "build finished");
    Ok(image)
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::config::{BuildConfiguration, RawConfig};
  use crate::env::{EnvMap, bitcode_environment};
  use crate::util::testutil::{shell_cmd, write_executable};
  use std::fs;
  use std::path::Path;
  use tempfile::TempDir;

  fn config(root: &Path) -> BuildConfiguration {
    for dir in ["src", "build", "llvm"] {
      fs::create_dir_all(root.join(dir)).unwrap();
    }
    for tool in ["get-bc", "llvm-objcopy", "ld.lld"] {
      write_executable(&root.join(tool), "#!/bin/sh\n");
    }
    let raw = RawConfig {
      build_dir: Some(root.join("build")),
      src_dir: Some(root.join("src")),
      get_bc_program: Some(root.join("get-bc")),
      llvm_objcopy_program: Some(root.join("llvm-objcopy")),
      llvm_ld_program: Some(root.join("ld.lld")),
      output: Some(root.join("out.bc")),
      llvm_bindir: Some(root.join("llvm")),
      ..Default::default()
    };
    BuildConfiguration::from_raw(Capabilities::default(), raw).unwrap()
  }

  #[tokio::test]
  async fn command_runs_in_build_dir_and_reports_image() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    let env = bitcode_environment(&config, EnvMap::new()).unwrap();
    let ctx = BuildContext::new(&config, &env);
    let flavor = CommandFlavor::new(
      Capabilities::default(),
      shell_cmd("printf '%s' \"$LLVM_COMPILER_PATH\" > app"),
      "app",
    );

    let image = flavor.build(&ctx).await.unwrap();

    assert_eq!(image, temp.path().join("build/app"));
    assert_eq!(
      fs::read_to_string(&image).unwrap(),
      temp.path().join("llvm").display().to_string()
    );
  }

  #[tokio::test]
  async fn failing_command_is_an_error() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    let env = EnvMap::new();
    let ctx = BuildContext::new(&config, &env);
    let flavor = CommandFlavor::new(Capabilities::default(), shell_cmd("exit 2"), "app");

    let err = flavor.build(&ctx).await.unwrap_err();
    assert!(matches!(err, ExecuteError::CmdFailed { code: Some(2), .. }));
  }
}
