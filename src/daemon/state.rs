//! # Daemon State Record (§3)
//!
//! `{listen-address, project-name, start-time, owner-pid}`, persisted as a
//! single small JSON document under the user's home directory. Its
//! presence is the source of truth for "is a daemon running" — `owner-pid`
//! is advisory only, since the daemon typically isn't a child of whatever
//! process observes the state file.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonState {
    pub listen_address: SocketAddr,
    pub project_name: String,
    pub start_time: String,
    pub owner_pid: u32,
}

impl DaemonState {
    pub fn new(listen_address: SocketAddr, project_name: &str) -> Self {
        DaemonState {
            listen_address,
            project_name: project_name.to_string(),
            start_time: chrono::Utc::now().to_rfc3339(),
            owner_pid: std::process::id(),
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
    }

    /// Load the state file. A missing or corrupt file is treated as "not
    /// running" (§7 State errors), not propagated as a hard error.
    pub fn load(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    pub fn remove(path: &Path) -> std::io::Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = DaemonState::new("127.0.0.1:5353".parse().unwrap(), "myproj");

        state.save(&path).unwrap();
        let loaded = DaemonState::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_returns_none_for_missing_file() {
        let dir = tempdir().unwrap();
        assert!(DaemonState::load(&dir.path().join("nope.json")).is_none());
    }

    #[test]
    fn load_returns_none_for_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(DaemonState::load(&path).is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        DaemonState::remove(&path).unwrap();
        DaemonState::remove(&path).unwrap();
    }
}
