//! Implementation of the `bcdriver env` command.
//!
//! Prints the variables the compiler wrapper needs as `KEY=value` lines, for
//! operators who drive the build by hand.

use anyhow::{Context, Result};

use bcdriver_lib::config::BuildConfiguration;
use bcdriver_lib::env::bitcode_overrides;

use crate::args::BuildArgs;

pub fn cmd_env(args: &BuildArgs) -> Result<()> {
  let config = BuildConfiguration::from_raw(args.capabilities(), args.to_raw())?;
  let overrides = bitcode_overrides(&config).context("Failed to resolve tool paths")?;

  for (key, path) in overrides {
    println!("{}={}", key, path.display());
  }

  Ok(())
}
