//! # Hook Runner (C9)
//!
//! Scans a hook directory for one event, runs each entry in sorted order,
//! and keeps going past individual failures — a broken hook shouldn't take
//! down the rest of the event (§4.9). Each hook gets the run context both
//! as environment variables and as JSON piped to its stdin.

use crate::hooks::context::HookContext;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Duration;

const HOOK_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const SKIPPED_EXTENSIONS: &[&str] = &["md", "txt", "sample"];

#[derive(Debug, Clone, Serialize)]
pub struct HookResult {
    pub path: String,
    pub success: bool,
    pub timed_out: bool,
    pub exit_code: Option<i32>,
    pub stderr_tail: String,
}

/// Run every eligible file in `hooks_dir/<event>/` (if the event
/// subdirectory doesn't exist, this is a no-op — most projects don't use
/// hooks at all).
pub fn run_event(hooks_dir: &Path, event: &str, context: &HookContext) -> std::io::Result<Vec<HookResult>> {
    let event_dir = hooks_dir.join(event);
    if !event_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(&event_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_eligible(p))
        .collect();
    entries.sort();

    let mut results = Vec::new();
    for hook in entries {
        results.push(run_one(&hook, context));
    }
    Ok(results)
}

/// List the hooks that `run_event` would execute for a directory of
/// events, without running them (`hooks list`).
pub fn list_hooks(hooks_dir: &Path) -> std::io::Result<Vec<(String, Vec<String>)>> {
    if !hooks_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut events = Vec::new();
    for entry in std::fs::read_dir(hooks_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let event_name = path.file_name().unwrap().to_string_lossy().to_string();
        let mut hooks: Vec<String> = std::fs::read_dir(&path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_eligible(p))
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        hooks.sort();
        events.push((event_name, hooks));
    }
    events.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(events)
}

fn is_eligible(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    if name.starts_with('.') {
        return false;
    }
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if SKIPPED_EXTENSIONS.contains(&ext) {
            return false;
        }
    }
    is_executable(path)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

/// Map a hook's extension to an interpreter argv prefix. `.sh` and
/// extensionless hooks run directly via their shebang/exec bit.
fn interpreter_for(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => Some("python3"),
        Some("rb") => Some("ruby"),
        Some("js") => Some("node"),
        Some("ts") => Some("ts-node"),
        _ => None,
    }
}

fn run_one(hook: &Path, context: &HookContext) -> HookResult {
    let path_str = hook.to_string_lossy().to_string();

    let mut command = match interpreter_for(hook) {
        Some(interpreter) => {
            let mut c = Command::new(interpreter);
            c.arg(hook);
            c
        }
        None => Command::new(hook),
    };

    for (key, value) in context.env_vars() {
        command.env(key, value);
    }
    command.stdin(Stdio::piped());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let context_json = serde_json::to_vec(context).unwrap_or_default();

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return HookResult {
                path: path_str,
                success: false,
                timed_out: false,
                exit_code: None,
                stderr_tail: format!("failed to start hook: {e}"),
            };
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(&context_json);
    }

    let (tx, rx) = mpsc::channel();
    let watchdog = std::thread::spawn(move || {
        let result = child.wait_with_output();
        let _ = tx.send(result);
    });

    match rx.recv_timeout(HOOK_TIMEOUT) {
        Ok(Ok(output)) => {
            let _ = watchdog.join();
            HookResult {
                path: path_str,
                success: output.status.success(),
                timed_out: false,
                exit_code: output.status.code(),
                stderr_tail: tail(&String::from_utf8_lossy(&output.stderr)),
            }
        }
        Ok(Err(e)) => HookResult {
            path: path_str,
            success: false,
            timed_out: false,
            exit_code: None,
            stderr_tail: format!("hook execution failed: {e}"),
        },
        Err(_) => HookResult {
            path: path_str,
            success: false,
            timed_out: true,
            exit_code: None,
            stderr_tail: "hook exceeded the 5 minute timeout".to_string(),
        },
    }
}

fn tail(text: &str) -> String {
    const MAX_LEN: usize = 2000;
    if text.len() <= MAX_LEN {
        text.to_string()
    } else {
        text[text.len() - MAX_LEN..].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    fn make_executable(path: &Path, contents: &str) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(path, contents).unwrap();
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn run_event_runs_executable_hooks_in_sorted_order() {
        let dir = tempdir().unwrap();
        let hooks_dir = dir.path().join("hooks");
        let event_dir = hooks_dir.join("up");
        std::fs::create_dir_all(&event_dir).unwrap();

        make_executable(&event_dir.join("10-first.sh"), "#!/bin/sh\nexit 0\n");
        make_executable(&event_dir.join("20-second.sh"), "#!/bin/sh\nexit 1\n");
        std::fs::write(event_dir.join("README.md"), "not a hook").unwrap();

        let context = HookContext::new("up", dir.path(), "myproj", "a1b2c3", "space.local", None);
        let results = run_event(&hooks_dir, "up", &context).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].path.ends_with("10-first.sh"));
        assert!(results[0].success);
        assert!(results[1].path.ends_with("20-second.sh"));
        assert!(!results[1].success);
    }

    #[test]
    fn run_event_is_a_no_op_when_event_dir_missing() {
        let dir = tempdir().unwrap();
        let context = HookContext::new("down", dir.path(), "myproj", "a1b2c3", "space.local", None);
        let results = run_event(dir.path(), "down", &context).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn list_hooks_reports_eligible_files_only() {
        let dir = tempdir().unwrap();
        let event_dir = dir.path().join("up");
        std::fs::create_dir_all(&event_dir).unwrap();
        make_executable(&event_dir.join("a.sh"), "#!/bin/sh\n");
        std::fs::write(event_dir.join("notes.txt"), "ignore me").unwrap();

        let listing = list_hooks(dir.path()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].0, "up");
        assert_eq!(listing[0].1, vec!["a.sh".to_string()]);
    }
}
