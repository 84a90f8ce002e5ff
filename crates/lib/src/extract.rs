//! Bitcode extraction from a built image.
//!
//! The extractor (`get-bc`) reads the bitcode paths the compiler wrapper
//! embedded into every object of a binary or library and links them into one
//! bitcode file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::BuildConfiguration;
use crate::env::EnvMap;
use crate::execute::{ExecuteError, ExecutionRequest, run};

pub const EXTRACT_LABEL: &str = "Executing get-bc";

/// The extractor invocation for `image`: `get-bc -o <output> <image>`, both
/// paths absolute, run from the build directory.
pub fn extraction_request(
  config: &BuildConfiguration,
  image: &Path,
  env: &EnvMap,
) -> Result<ExecutionRequest, ExecuteError> {
  let output = std::path::absolute(config.output())?;
  let image = std::path::absolute(image)?;

  Ok(
    ExecutionRequest::new([
      config.get_bc_program().as_os_str(),
      OsStr::new("-o"),
      output.as_os_str(),
      image.as_os_str(),
    ])
    .cwd(config.build_dir())
    .env(env.clone()),
  )
}

/// Extract the bitcode of `image` into the configured output file.
///
/// The output is overwritten by the extractor; it is not removed beforehand.
/// Returns the absolute output path.
pub async fn extract(config: &BuildConfiguration, image: &Path, env: &EnvMap) -> Result<PathBuf, ExecuteError> {
  let request = extraction_request(config, image, env)?;
  run(EXTRACT_LABEL, &request).await?;

  let output = std::path::absolute(config.output())?;
  info!(output = %output.display(), "bitcode extracted");
  Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::config::{Capabilities, RawConfig};
  use crate::env::bitcode_environment;
  use crate::util::testutil::{recording_stub, write_executable};
  use std::ffi::OsString;
  use std::fs;
  use tempfile::TempDir;

  fn config_with_extractor(root: &Path, get_bc: &Path) -> BuildConfiguration {
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("build")).unwrap();
    fs::create_dir_all(root.join("llvm")).unwrap();
    for tool in ["llvm-objcopy", "ld.lld"] {
      write_executable(&root.join(tool), "#!/bin/sh\n");
    }
    let raw = RawConfig {
      build_dir: Some(root.join("build")),
      src_dir: Some(root.join("src")),
      get_bc_program: Some(get_bc.to_path_buf()),
      llvm_objcopy_program: Some(root.join("llvm-objcopy")),
      llvm_ld_program: Some(root.join("ld.lld")),
      output: Some(root.join("app.bc")),
      llvm_bindir: Some(root.join("llvm")),
      ..Default::default()
    };
    BuildConfiguration::from_raw(Capabilities::default(), raw).unwrap()
  }

  #[tokio::test]
  async fn extractor_gets_output_and_image() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("get-bc.log");
    let get_bc = temp.path().join("get-bc");
    recording_stub(&get_bc, &log, 0);
    let config = config_with_extractor(temp.path(), &get_bc);
    let image = temp.path().join("build/app");

    let output = extract(&config, &image, &EnvMap::new()).await.unwrap();

    assert_eq!(output, temp.path().join("app.bc"));
    let args = fs::read_to_string(&log).unwrap();
    assert_eq!(
      args,
      format!("-o\n{}\n{}\n", temp.path().join("app.bc").display(), image.display())
    );
  }

  #[tokio::test]
  async fn extractor_runs_in_build_dir_with_bitcode_env() {
    let temp = TempDir::new().unwrap();
    let get_bc = temp.path().join("get-bc");
    write_executable(&get_bc, "#!/bin/sh\npwd > seen_cwd\nprintf '%s' \"$GLLVM_LD\" > seen_ld\n");
    let config = config_with_extractor(temp.path(), &get_bc);
    let env = bitcode_environment(&config, [(OsString::from("PATH"), OsString::from("/usr/bin:/bin"))]).unwrap();

    extract(&config, &temp.path().join("build/app"), &env).await.unwrap();

    let build = temp.path().join("build");
    let seen_cwd = fs::read_to_string(build.join("seen_cwd")).unwrap();
    assert_eq!(
      fs::canonicalize(seen_cwd.trim()).unwrap(),
      fs::canonicalize(&build).unwrap()
    );
    assert_eq!(
      fs::read_to_string(build.join("seen_ld")).unwrap(),
      temp.path().join("ld.lld").display().to_string()
    );
  }

  #[tokio::test]
  async fn failing_extractor_is_an_error() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("get-bc.log");
    let get_bc = temp.path().join("get-bc");
    recording_stub(&get_bc, &log, 1);
    let config = config_with_extractor(temp.path(), &get_bc);

    let err = extract(&config, &temp.path().join("build/app"), &EnvMap::new())
      .await
      .unwrap_err();

    assert!(matches!(err, ExecuteError::CmdFailed { code: Some(1), .. }));
  }

  #[test]
  fn request_shape() {
    let temp = TempDir::new().unwrap();
    let get_bc = temp.path().join("get-bc");
    write_executable(&get_bc, "#!/bin/sh\n");
    let config = config_with_extractor(temp.path(), &get_bc);

    let request = extraction_request(&config, &temp.path().join("build/lib.so"), &EnvMap::new()).unwrap();

    assert_eq!(request.command.len(), 4);
    assert_eq!(request.command[0], get_bc.into_os_string());
    assert_eq!(request.command[1], OsString::from("-o"));
    assert_eq!(request.cwd.as_deref(), Some(temp.path().join("build").as_path()));
    assert!(request.env.is_some());
  }
}
