//! # Paths Module
//!
//! Well-known filesystem locations for this tool's cross-process state:
//! the daemon state file and log file live in fixed, home/tmp-rooted spots
//! so that any invocation of the CLI can find them without coordination.

use dirs::home_dir;
use std::path::PathBuf;

const DAEMON_STATE_FILE: &str = ".space-dns-daemon.json";
const DAEMON_LOG_FILE: &str = "space-dns-daemon.log";
const DERIVED_COMPOSE_FILE: &str = ".space-dns-compose.yml";

/// Path to the per-user daemon state record (§3 Daemon State Record).
pub fn daemon_state_path() -> PathBuf {
    let mut path = home_dir().expect("home directory not found");
    path.push(DAEMON_STATE_FILE);
    path
}

/// Path to the daemon's log file, in the OS temp directory.
pub fn daemon_log_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(DAEMON_LOG_FILE);
    path
}

/// Path to the per-domain resolver file the OS resolver stack reads
/// (conventionally `/etc/resolver/<base>` on macOS-style resolver
/// directories).
pub fn resolver_file_path(base_domain: &str) -> PathBuf {
    PathBuf::from("/etc/resolver").join(base_domain)
}

/// Path to the derived compose document, sibling to the project's own
/// compose file(s).
pub fn derived_compose_path(work_dir: &std::path::Path) -> PathBuf {
    work_dir.join(DERIVED_COMPOSE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daemon_state_path_is_rooted_at_home() {
        let path = daemon_state_path();
        assert!(path.to_string_lossy().ends_with(DAEMON_STATE_FILE));
    }

    #[test]
    fn derived_compose_path_is_a_sibling_of_work_dir() {
        let work_dir = PathBuf::from("/u/dev/proj");
        let derived = derived_compose_path(&work_dir);
        assert_eq!(derived, PathBuf::from("/u/dev/proj/.space-dns-compose.yml"));
    }

    #[test]
    fn resolver_file_path_uses_base_domain() {
        assert_eq!(
            resolver_file_path("space.local"),
            PathBuf::from("/etc/resolver/space.local")
        );
    }
}
