use std::path::{Path, PathBuf};

use tracing::debug;

use super::BuildConfiguration;
use super::types::{
  CMakeTools, Capabilities, ConfigError, InSourceBuild, MakeTools, Param, PathKind, RawConfig,
};

/// Number of processor units the current process may be scheduled on.
///
/// On Linux this is the size of the affinity mask. CPU quotas from cgroups
/// are not applied.
#[cfg(target_os = "linux")]
pub fn schedulable_cpus() -> usize {
  match rustix::thread::sched_getaffinity(None) {
    Ok(set) => set.count().max(1) as usize,
    Err(err) => {
      debug!(%err, "sched_getaffinity failed, falling back to available_parallelism");
      available_parallelism()
    }
  }
}

/// Number of processor units the current process may be scheduled on.
#[cfg(not(target_os = "linux"))]
pub fn schedulable_cpus() -> usize {
  available_parallelism()
}

fn available_parallelism() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(1)
}

pub(super) fn validate(capabilities: Capabilities, raw: RawConfig) -> Result<BuildConfiguration, ConfigError> {
  reject_unexpected(&capabilities, &raw)?;

  let build_dir = required(raw.build_dir, Param::BuildDir)?;
  let src_dir = required(raw.src_dir, Param::SrcDir)?;
  let get_bc_program = required(raw.get_bc_program, Param::GetBcProgram)?;
  let llvm_objcopy_program = required(raw.llvm_objcopy_program, Param::LlvmObjcopyProgram)?;
  let llvm_ld_program = required(raw.llvm_ld_program, Param::LlvmLdProgram)?;
  let output = required(raw.output, Param::Output)?;
  let llvm_bindir = required(raw.llvm_bindir, Param::LlvmBindir)?;

  let gclang_program = when(capabilities.gclang, || required(raw.gclang_program, Param::GclangProgram))?;
  let target = when(capabilities.target, || required(raw.target, Param::Target))?;
  let install_dir = when(capabilities.install_dir, || required(raw.install_dir, Param::InstallDir))?;
  let in_source = when(capabilities.in_source_build, || {
    Ok(InSourceBuild {
      meson_build_dir: required(raw.meson_build_dir, Param::MesonBuildDir)?,
    })
  })?;

  let cmake = when(capabilities.cmake, || {
    let args = required(raw.cmake_args, Param::CMakeArgs)?;
    if args.is_empty() {
      return Err(ConfigError::Missing(Param::CMakeArgs));
    }
    if let Some(bad) = args.iter().find(|arg| !is_key_value(arg)) {
      return Err(ConfigError::InvalidCMakeArg { arg: bad.clone() });
    }
    Ok(CMakeTools {
      args,
      program: required(raw.cmake_program, Param::CMakeProgram)?,
      ninja_program: required(raw.ninja_program, Param::NinjaProgram)?,
    })
  })?;

  let make = when(capabilities.make, || {
    let program = required(raw.make_program, Param::MakeProgram)?;
    let jobs = match raw.jobs {
      Some(0) => return Err(ConfigError::ZeroJobs),
      Some(jobs) => jobs,
      None => schedulable_cpus(),
    };
    Ok(MakeTools {
      program,
      args: raw.make_args.unwrap_or_default(),
      jobs,
    })
  })?;

  // Existence checks, in the order operators expect to see them fail.
  check_path(Param::SrcDir, &src_dir, PathKind::Directory)?;
  check_path(Param::GetBcProgram, &get_bc_program, PathKind::File)?;
  check_path(Param::LlvmObjcopyProgram, &llvm_objcopy_program, PathKind::File)?;
  check_path(Param::LlvmLdProgram, &llvm_ld_program, PathKind::File)?;
  check_path(Param::LlvmBindir, &llvm_bindir, PathKind::Directory)?;

  if let Some(cmake) = &cmake {
    check_path(Param::CMakeProgram, &cmake.program, PathKind::File)?;
    check_path(Param::NinjaProgram, &cmake.ninja_program, PathKind::File)?;
  }
  if let Some(gclang) = &gclang_program {
    check_path(Param::GclangProgram, gclang, PathKind::File)?;
  }
  if let Some(make) = &make {
    check_path(Param::MakeProgram, &make.program, PathKind::File)?;
  }
  if let Some(in_source) = &in_source {
    check_path(Param::MesonBuildDir, &in_source.meson_build_dir, PathKind::Directory)?;
  }

  Ok(BuildConfiguration {
    capabilities,
    build_dir,
    src_dir,
    get_bc_program,
    llvm_objcopy_program,
    llvm_ld_program,
    output,
    llvm_bindir,
    gclang_program,
    target,
    install_dir,
    in_source,
    cmake,
    make,
  })
}

fn reject_unexpected(capabilities: &Capabilities, raw: &RawConfig) -> Result<(), ConfigError> {
  let supplied = [
    (Param::GclangProgram, raw.gclang_program.is_some()),
    (Param::Target, raw.target.is_some()),
    (Param::InstallDir, raw.install_dir.is_some()),
    (Param::MesonBuildDir, raw.meson_build_dir.is_some()),
    (Param::CMakeArgs, raw.cmake_args.is_some()),
    (Param::CMakeProgram, raw.cmake_program.is_some()),
    (Param::NinjaProgram, raw.ninja_program.is_some()),
    (Param::MakeProgram, raw.make_program.is_some()),
    (Param::MakeArgs, raw.make_args.is_some()),
    (Param::Jobs, raw.jobs.is_some()),
  ];

  for (param, present) in supplied {
    let Some(capability) = param.capability() else {
      continue;
    };
    if present && !capabilities.contains(capability) {
      return Err(ConfigError::Unexpected { param, capability });
    }
  }
  Ok(())
}

fn required<T>(value: Option<T>, param: Param) -> Result<T, ConfigError> {
  value.ok_or(ConfigError::Missing(param))
}

fn when<T>(enabled: bool, f: impl FnOnce() -> Result<T, ConfigError>) -> Result<Option<T>, ConfigError> {
  if enabled { f().map(Some) } else { Ok(None) }
}

fn is_key_value(arg: &str) -> bool {
  matches!(arg.split_once('='), Some((key, _)) if !key.is_empty())
}

fn check_path(param: Param, path: &Path, kind: PathKind) -> Result<(), ConfigError> {
  if kind.matches(path) {
    debug!(param = %param, path = %path.display(), "path ok");
    Ok(())
  } else {
    Err(ConfigError::InvalidPath {
      param,
      path: PathBuf::from(path),
      kind,
    })
  }
}
