//! External command execution.
//!
//! Commands run one at a time and are awaited to completion; there is no
//! timeout and no retry. A failing command is always an error for the caller.

pub mod cmd;
pub mod types;

pub use cmd::{format_env_diff, quote_command, run};
pub use types::{ExecuteError, ExecutionRequest, Redirect};
