//! Implementation of the `bcdriver build` command.
//!
//! Runs the full pipeline with an operator-supplied build command: validate,
//! stage when building in source, build under the bitcode environment, then
//! extract the bitcode of the produced image.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use bcdriver_lib::driver::Driver;
use bcdriver_lib::flavor::CommandFlavor;

use crate::args::BuildArgs;
use crate::output::print_success;

pub fn cmd_build(args: &BuildArgs, image: PathBuf, command: Vec<OsString>) -> Result<()> {
  let flavor = CommandFlavor::new(args.capabilities(), command, image);
  let driver = Driver::new(flavor, args.to_raw())?;
  debug!(config = ?driver.config(), "configuration validated");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let output = rt.block_on(driver.run())?;

  print_success(&format!("Bitcode written to {}", output.display()));
  Ok(())
}
