//! `down` control flow (§4.8 — symmetric with `up`).

use crate::daemon::DaemonSupervisor;
use crate::docker::manager::DockerManager;
use crate::error::{Result, SpaceError};
use crate::hooks::context::HookContext;
use crate::hooks::runner::run_event;
use crate::naming::hash;
use crate::orchestrator::Orchestrator;
use std::collections::BTreeMap;

impl Orchestrator {
    /// Stop the compose project; if a daemon is running and this invocation
    /// owns it (no other project depends on it), stop it and remove state.
    pub fn down(&self) -> Result<()> {
        let supervisor = DaemonSupervisor::new();
        let owned_daemon = supervisor
            .load()
            .map(|state| state.project_name == self.project_name)
            .unwrap_or(false);

        let dns_address = supervisor.load().map(|s| s.listen_address);
        self.run_hooks_for_down("pre-down", dns_address);

        let docker = DockerManager::new(self.config.compose_files.clone(), &self.project_name);
        let output = docker.compose_down().map_err(SpaceError::Compose)?;
        if !output.status.success() {
            return Err(SpaceError::Compose(std::io::Error::new(
                std::io::ErrorKind::Other,
                String::from_utf8_lossy(&output.stderr).to_string(),
            )));
        }

        if owned_daemon {
            supervisor.stop().map_err(SpaceError::Compose)?;
        }

        self.run_hooks_for_down("post-down", dns_address);
        Ok(())
    }

    fn run_hooks_for_down(&self, event: &str, dns_address: Option<std::net::SocketAddr>) {
        let hash = hash::hash(&self.work_dir);
        let context = HookContext::new(event, &self.work_dir, &self.project_name, &hash, &self.config.base_domain, dns_address)
            .with_services(BTreeMap::new());
        if let Err(e) = run_event(&self.work_dir.join(&self.config.hooks_dir), event, &context) {
            log::warn!("failed to scan hooks for event {event}: {e}");
        }
    }
}
