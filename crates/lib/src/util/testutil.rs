//! Test utilities for bcdriver-lib.
//!
//! Helpers for building scratch trees and stub tools. The stubs are shell
//! scripts, so tests that execute them are Unix-only.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

/// Every entry below `root` as `(relative path, file content)`, sorted by path.
///
/// Directories have no content. The root itself is not listed.
pub fn list_tree(root: &Path) -> Vec<(String, Option<Vec<u8>>)> {
  let mut entries: Vec<(String, Option<Vec<u8>>)> = WalkDir::new(root)
    .min_depth(1)
    .into_iter()
    .map(|entry| {
      let entry = entry.unwrap();
      let rel = entry.path().strip_prefix(root).unwrap().to_string_lossy().to_string();
      let content = entry.file_type().is_file().then(|| fs::read(entry.path()).unwrap());
      (rel, content)
    })
    .collect();
  entries.sort_by(|a, b| a.0.cmp(&b.0));
  entries
}

/// Write `body` to `path` and mark it executable.
pub fn write_executable(path: &Path, body: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, body).unwrap();

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
  }
}

/// A stub tool that appends its arguments, one per line, to `log`, then exits
/// with `code`.
pub fn recording_stub(path: &Path, log: &Path, code: i32) {
  let body = format!(
    "#!/bin/sh\nfor arg in \"$@\"; do echo \"$arg\" >> '{}'; done\nexit {}\n",
    log.display(),
    code
  );
  write_executable(path, &body);
}

/// Returns the shell command and args to execute a shell script.
pub fn shell_cmd(script: &str) -> Vec<String> {
  vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
}
