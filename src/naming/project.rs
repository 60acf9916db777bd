//! # Project-Name Derivation
//!
//! Turns a user's naming preference plus the current working directory into
//! a compose-project name that is guaranteed to satisfy the compose
//! runtime's project-name rules.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NamingStrategy {
    /// Always use the configured name verbatim.
    Static(String),
    /// `<prefix><basename(work-dir)>`
    Directory,
    /// `<prefix><sanitized-branch>`, falling back to `Directory` when no
    /// branch can be read (detached HEAD, not a git repo, etc).
    GitBranch,
}

impl Default for NamingStrategy {
    fn default() -> Self {
        NamingStrategy::Directory
    }
}

/// Derive and normalize the project name for `work_dir` under `strategy`
/// with the given prefix.
pub fn derive_project_name(strategy: &NamingStrategy, prefix: &str, work_dir: &Path) -> String {
    let raw = match strategy {
        NamingStrategy::Static(name) => name.clone(),
        NamingStrategy::Directory => format!("{prefix}{}", basename(work_dir)),
        NamingStrategy::GitBranch => match current_git_branch(work_dir) {
            Some(branch) => format!("{prefix}{}", sanitize_branch(&branch)),
            None => format!("{prefix}{}", basename(work_dir)),
        },
    };
    normalize(&raw)
}

fn basename(work_dir: &Path) -> String {
    work_dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("project")
        .to_string()
}

fn sanitize_branch(branch: &str) -> String {
    branch.replace('/', "-")
}

fn current_git_branch(work_dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(work_dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if branch.is_empty() || branch == "HEAD" {
        None
    } else {
        Some(branch)
    }
}

/// Normalize a candidate project name: lowercase; strip leading `-`/`_`;
/// prepend `p` if the first character is still not `[a-z0-9]`; replace any
/// other character outside `[a-z0-9-_]` with `-`.
pub fn normalize(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let trimmed = lower.trim_start_matches(['-', '_']);

    let mut out = String::with_capacity(trimmed.len() + 1);
    for (i, c) in trimmed.chars().enumerate() {
        if i == 0 && !c.is_ascii_alphanumeric() {
            out.push('p');
        }
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else {
            out.push('-');
        }
    }

    if out.is_empty() {
        out.push('p');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn directory_strategy_uses_basename() {
        let name = derive_project_name(
            &NamingStrategy::Directory,
            "space-",
            &PathBuf::from("/u/dev/My Cool App"),
        );
        assert_eq!(name, "space-my-cool-app");
    }

    #[test]
    fn static_strategy_is_verbatim_then_normalized() {
        let name = derive_project_name(&NamingStrategy::Static("MyNet".into()), "", Path::new("/x"));
        assert_eq!(name, "mynet");
    }

    #[test]
    fn git_branch_falls_back_to_directory_outside_a_repo() {
        let name = derive_project_name(
            &NamingStrategy::GitBranch,
            "",
            &PathBuf::from("/tmp/definitely-not-a-git-repo-xyz"),
        );
        assert_eq!(name, "definitely-not-a-git-repo-xyz");
    }

    #[test]
    fn normalize_handles_leading_non_alnum_and_invalid_chars() {
        assert_eq!(normalize("--Foo_Bar!!"), "foo_bar--");
        assert_eq!(normalize("123abc"), "123abc");
        assert_eq!(normalize("_abc"), "abc");
        assert_eq!(normalize(".hidden"), "p-hidden");
        assert_eq!(normalize(""), "p");
    }

    #[test]
    fn normalize_is_always_nonempty_and_alnum_start() {
        for raw in ["", "---", "___", "!@#", "Z"] {
            let out = normalize(raw);
            assert!(!out.is_empty());
            let first = out.chars().next().unwrap();
            assert!(first.is_ascii_alphanumeric());
            assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }
}
