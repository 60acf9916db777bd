//! # Daemon Supervisor (C6)
//!
//! Single-instance-per-user lifecycle for the DNS responder, built on a
//! state file plus process-image re-exec rather than in-process
//! daemonization — the supervisor must outlive the `up` command that
//! spawned it, and the child is discovered by any later invocation purely
//! through the state file (§9 Design Notes).

use crate::daemon::state::DaemonState;
use crate::paths;
use log::{info, warn};
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Internal flag passed to a re-exec'd copy of this binary to tell it to
/// run the DNS responder in the foreground instead of parsing normal CLI
/// args. Kept out of the public `clap` surface.
pub const FOREGROUND_DAEMON_FLAG: &str = "__space-dns-daemon-foreground";

pub struct DaemonSupervisor {
    state_path: PathBuf,
    log_path: PathBuf,
}

impl DaemonSupervisor {
    pub fn new() -> Self {
        DaemonSupervisor {
            state_path: paths::daemon_state_path(),
            log_path: paths::daemon_log_path(),
        }
    }

    pub fn with_paths(state_path: PathBuf, log_path: PathBuf) -> Self {
        DaemonSupervisor { state_path, log_path }
    }

    /// True iff the state file exists and names a non-empty listen address.
    pub fn is_running(&self) -> bool {
        self.load().is_some()
    }

    pub fn load(&self) -> Option<DaemonState> {
        DaemonState::load(&self.state_path)
    }

    pub fn save(&self, state: &DaemonState) -> io::Result<()> {
        state.save(&self.state_path)
    }

    pub fn remove(&self) -> io::Result<()> {
        DaemonState::remove(&self.state_path)
    }

    /// Re-exec this program, detached into its own process group, with
    /// stdout/stderr redirected to the daemon log file, then poll
    /// `is_running` with a short delay to confirm startup.
    pub fn spawn(
        &self,
        project_name: &str,
        base_domain: &str,
        upstream_dns: &str,
        port_candidates: &[u16],
    ) -> io::Result<()> {
        let exe = std::env::current_exe()?;
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        let log_file_err = log_file.try_clone()?;

        let mut command = Command::new(exe);
        command
            .arg(FOREGROUND_DAEMON_FLAG)
            .arg(project_name)
            .arg(base_domain)
            .arg(upstream_dns)
            .arg(
                port_candidates
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            )
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(log_file_err));

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        command.spawn()?;

        for _ in 0..10 {
            std::thread::sleep(Duration::from_millis(50));
            if self.is_running() {
                info!("DNS daemon started, state file at {}", self.state_path.display());
                return Ok(());
            }
        }
        warn!("DNS daemon did not report ready within the polling window");
        Err(io::Error::new(io::ErrorKind::TimedOut, "daemon did not become ready"))
    }

    /// Relinquish the "running" claim by removing the state file. Cannot
    /// itself terminate the owning process, since it is typically not a
    /// child of the caller (§4.6).
    pub fn stop(&self) -> io::Result<()> {
        self.remove()
    }
}

impl Default for DaemonSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn supervisor_in(dir: &std::path::Path) -> DaemonSupervisor {
        DaemonSupervisor::with_paths(dir.join("state.json"), dir.join("daemon.log"))
    }

    #[test]
    fn is_running_false_when_no_state_file() {
        let dir = tempdir().unwrap();
        assert!(!supervisor_in(dir.path()).is_running());
    }

    #[test]
    fn save_makes_is_running_true_until_stopped() {
        let dir = tempdir().unwrap();
        let supervisor = supervisor_in(dir.path());
        let state = DaemonState::new("127.0.0.1:5353".parse().unwrap(), "myproj");

        supervisor.save(&state).unwrap();
        assert!(supervisor.is_running());

        supervisor.stop().unwrap();
        assert!(!supervisor.is_running());
    }
}
