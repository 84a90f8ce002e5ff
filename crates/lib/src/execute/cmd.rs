//! Running one external command.
//!
//! Every command is announced on the diagnostic stream before it starts:
//! the caller's label, the environment keys it changes and the quoted
//! command line. The line is for operators to copy and rerun by hand; nothing
//! parses it. It is emitted under [`COMMAND_LOG_TARGET`] so a subscriber can
//! keep it enabled whatever the general log level.

use std::borrow::Cow;
use std::ffi::OsString;

use tokio::process::Command;
use tracing::{debug, info};

use crate::consts::COMMAND_LOG_TARGET;
use crate::env::{EnvMap, process_environment};
use crate::execute::types::{ExecuteError, ExecutionRequest};

/// Execute a request and wait for it to finish.
///
/// Output streams go wherever the request's redirects say, the terminal by
/// default. A nonzero exit is an error carrying the exit status.
pub async fn run(label: &str, request: &ExecutionRequest) -> Result<(), ExecuteError> {
  let (program, args) = request.command.split_first().ok_or(ExecuteError::EmptyCommand)?;

  let cmdline = quote_command(&request.command);
  let env_diff = request
    .env
    .as_ref()
    .map(|env| format_env_diff(env, &process_environment()))
    .unwrap_or_default();
  info!(target: COMMAND_LOG_TARGET, "{}", announce(label, &env_diff, &cmdline));

  let mut command = Command::new(program);
  command.args(args);
  if let Some(cwd) = &request.cwd {
    command.current_dir(cwd);
  }
  if let Some(env) = &request.env {
    command.env_clear().envs(env);
  }
  command.stdout(request.stdout.to_stdio()?);
  command.stderr(request.stderr.to_stdio()?);

  debug!(cwd = ?request.cwd, "spawning process");

  let status = command.status().await.map_err(|source| ExecuteError::Spawn {
    program: program.to_string_lossy().into_owned(),
    source,
  })?;

  if !status.success() {
    return Err(ExecuteError::CmdFailed {
      label: label.to_string(),
      cmd: cmdline,
      status: status.to_string(),
      code: status.code(),
    });
  }

  Ok(())
}

/// The `KEY='value'` pairs of `env` that are absent from or differ in `ambient`.
pub fn format_env_diff(env: &EnvMap, ambient: &EnvMap) -> String {
  env
    .iter()
    .filter(|(key, value)| ambient.get(*key) != Some(*value))
    .map(|(key, value)| format!("{}='{}'", key.to_string_lossy(), value.to_string_lossy()))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Quote every word of `command` for a POSIX shell.
pub fn quote_command(command: &[OsString]) -> String {
  command
    .iter()
    .map(|word| shell_escape::unix::escape(Cow::Owned(word.to_string_lossy().into_owned())).into_owned())
    .collect::<Vec<_>>()
    .join(" ")
}

fn announce(label: &str, env_diff: &str, cmdline: &str) -> String {
  if env_diff.is_empty() {
    format!("{}: {}", label, cmdline)
  } else {
    format!("{}: {} {}", label, env_diff, cmdline)
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::execute::types::Redirect;
  use crate::util::testutil::shell_cmd;
  use std::fs;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn env_of(pairs: &[(&str, &str)]) -> EnvMap {
    pairs
      .iter()
      .map(|(k, v)| (OsString::from(*k), OsString::from(*v)))
      .collect()
  }

  #[tokio::test]
  async fn run_simple_command() {
    let request = ExecutionRequest::new(shell_cmd("exit 0"));
    run("noop", &request).await.unwrap();
  }

  #[tokio::test]
  async fn run_reports_exit_code() {
    let request = ExecutionRequest::new(shell_cmd("exit 3"));

    let err = run("failing", &request).await.unwrap_err();

    match err {
      ExecuteError::CmdFailed { label, code, .. } => {
        assert_eq!(label, "failing");
        assert_eq!(code, Some(3));
      }
      other => panic!("unexpected error: {}", other),
    }
  }

  #[tokio::test]
  async fn run_empty_command_fails() {
    let request = ExecutionRequest::default();
    assert!(matches!(run("empty", &request).await, Err(ExecuteError::EmptyCommand)));
  }

  #[tokio::test]
  async fn run_missing_program_fails_to_spawn() {
    let request = ExecutionRequest::new(["/definitely/not/a/program"]);
    let err = run("missing", &request).await.unwrap_err();
    assert!(matches!(err, ExecuteError::Spawn { .. }));
  }

  #[tokio::test]
  async fn run_in_working_directory() {
    let temp = TempDir::new().unwrap();

    let request = ExecutionRequest::new(shell_cmd("echo here > cwd_marker")).cwd(temp.path());
    run("marker", &request).await.unwrap();

    assert!(temp.path().join("cwd_marker").exists());
  }

  #[tokio::test]
  async fn env_override_replaces_environment() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("env.txt");
    let script = format!("printf '%s|%s' \"$MY_VAR\" \"$HOME\" > '{}'", out.display());

    let request = ExecutionRequest::new(shell_cmd(&script)).env(env_of(&[("MY_VAR", "my_value")]));
    run("env", &request).await.unwrap();

    assert_eq!(fs::read_to_string(&out).unwrap(), "my_value|");
  }

  #[tokio::test]
  async fn stdout_can_be_appended_to_file() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("build.log");

    for word in ["one", "two"] {
      let request = ExecutionRequest::new(shell_cmd(&format!("echo {}", word))).stdout(Redirect::Append(log.clone()));
      run("echo", &request).await.unwrap();
    }

    assert_eq!(fs::read_to_string(&log).unwrap(), "one\ntwo\n");
  }

  #[tokio::test]
  #[traced_test]
  async fn run_announces_label_env_and_command() {
    let env = env_of(&[("BCDRIVER_ONLY_IN_CHILD", "yes")]);
    let request = ExecutionRequest::new(shell_cmd("exit 0")).env(env);

    run("Executing stub", &request).await.unwrap();

    assert!(logs_contain("Executing stub:"));
    assert!(logs_contain("BCDRIVER_ONLY_IN_CHILD='yes'"));
    assert!(logs_contain("/bin/sh -c 'exit 0'"));
  }

  #[test]
  fn env_diff_lists_only_changed_keys() {
    let ambient = env_of(&[("HOME", "/root"), ("PATH", "/bin"), ("LANG", "C")]);
    let env = env_of(&[("HOME", "/root"), ("PATH", "/opt/bin"), ("GLLVM_LD", "/opt/ld.lld")]);

    assert_eq!(format_env_diff(&env, &ambient), "GLLVM_LD='/opt/ld.lld' PATH='/opt/bin'");
  }

  #[test]
  fn env_diff_is_empty_for_identical_environment() {
    let ambient = env_of(&[("HOME", "/root")]);
    assert_eq!(format_env_diff(&ambient.clone(), &ambient), "");
  }

  #[test]
  fn command_line_is_shell_quoted() {
    let command: Vec<OsString> = ["get-bc", "-o", "/tmp/out dir/app.bc", "it's"]
      .into_iter()
      .map(OsString::from)
      .collect();

    assert_eq!(
      quote_command(&command),
      r#"get-bc -o '/tmp/out dir/app.bc' 'it'\''s'"#
    );
  }

  #[test]
  fn announce_without_env() {
    assert_eq!(announce("Configuring", "", "cmake ."), "Configuring: cmake .");
    assert_eq!(announce("Configuring", "A='1'", "cmake ."), "Configuring: A='1' cmake .");
  }
}
