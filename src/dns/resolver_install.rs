//! # Resolver Installer (C5)
//!
//! Points the OS resolver stack at our daemon for `base_domain` queries.
//! On macOS-style systems this is a one-line file under `/etc/resolver/`;
//! elsewhere this is a best-effort operation whose failures are logged, not
//! propagated, since a missing resolver file degrades to "containers aren't
//! reachable by name" rather than a hard failure (§4.5).

use crate::paths::resolver_file_path;
use crate::utils::run_command;
use std::net::SocketAddr;

/// Write `/etc/resolver/<base_domain>` pointing at `listen_address`,
/// escalating via `sudo` since the directory is root-owned. Returns
/// idempotently, without sudo-elevating or flushing the cache, when the
/// file already names the chosen address (§4.5).
pub fn install(base_domain: &str, listen_address: SocketAddr) -> std::io::Result<()> {
    let contents = format!("nameserver {}\nport {}\n", listen_address.ip(), listen_address.port());
    let path = resolver_file_path(base_domain);

    if std::fs::read_to_string(&path).ok().as_deref() == Some(contents.as_str()) {
        return Ok(());
    }

    let tmp_path = std::env::temp_dir().join(format!("space-dns-resolver-{base_domain}"));
    std::fs::write(&tmp_path, contents)?;

    let output = run_command(
        "sudo",
        &["cp", tmp_path.to_str().unwrap(), path.to_str().unwrap()],
    )?;
    let _ = std::fs::remove_file(&tmp_path);

    if !output.status.success() {
        log::warn!(
            "failed to install resolver file at {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    flush_cache();
    Ok(())
}

/// Remove the resolver file for `base_domain`, if present.
pub fn uninstall(base_domain: &str) -> std::io::Result<()> {
    let path = resolver_file_path(base_domain);
    let output = run_command("sudo", &["rm", "-f", path.to_str().unwrap()])?;
    if !output.status.success() {
        log::warn!(
            "failed to remove resolver file at {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    flush_cache();
    Ok(())
}

pub fn is_configured(base_domain: &str) -> bool {
    resolver_file_path(base_domain).exists()
}

/// Best-effort DNS cache flush, OS-dependent. Errors are logged and
/// swallowed — a stale cache just means a slower transition, not breakage.
fn flush_cache() {
    let result = if cfg!(target_os = "macos") {
        run_command("dscacheutil", &["-flushcache"])
    } else {
        run_command("systemd-resolve", &["--flush-caches"])
    };

    if let Err(e) = result {
        log::debug!("DNS cache flush skipped: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_configured_false_for_unknown_domain() {
        assert!(!is_configured("definitely-not-installed.invalid"));
    }
}
