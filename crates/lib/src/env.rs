//! Environment for the bitcode-capturing compiler wrapper.
//!
//! The wrapper (gclang and friends) compiles normally and records the bitcode
//! of every translation unit on the side. It finds clang through
//! `LLVM_COMPILER_PATH` and uses `GLLVM_OBJCOPY` / `GLLVM_LD` in place of the
//! host binutils. Every subprocess that compiles must see these three keys.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use crate::config::BuildConfiguration;
use crate::consts::{ENV_LD, ENV_LLVM_COMPILER_PATH, ENV_OBJCOPY};

/// An environment, ordered by key so that equal maps render identically.
pub type EnvMap = BTreeMap<OsString, OsString>;

/// The three keys the wrapper reads, with absolute paths from `config`.
pub fn bitcode_overrides(config: &BuildConfiguration) -> io::Result<Vec<(&'static str, PathBuf)>> {
  Ok(vec![
    (ENV_LLVM_COMPILER_PATH, std::path::absolute(config.llvm_bindir())?),
    (ENV_OBJCOPY, std::path::absolute(config.llvm_objcopy_program())?),
    (ENV_LD, std::path::absolute(config.llvm_ld_program())?),
  ])
}

/// `base` with the wrapper keys set or replaced. No other key changes.
pub fn bitcode_environment<I, K, V>(config: &BuildConfiguration, base: I) -> io::Result<EnvMap>
where
  I: IntoIterator<Item = (K, V)>,
  K: Into<OsString>,
  V: Into<OsString>,
{
  let mut env: EnvMap = base.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
  for (key, path) in bitcode_overrides(config)? {
    env.insert(OsString::from(key), path.into_os_string());
  }
  Ok(env)
}

/// The environment inherited by this process.
pub fn process_environment() -> EnvMap {
  std::env::vars_os().collect()
}
