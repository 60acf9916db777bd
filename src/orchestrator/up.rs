//! `up` control flow (§4.8, steps 1-7).

use crate::compose::rewrite::rewrite_to_file;
use crate::daemon::DaemonSupervisor;
use crate::docker::manager::DockerManager;
use crate::error::{Result, SpaceError};
use crate::hooks::context::{HookContext, ServiceInfo};
use crate::hooks::runner::run_event;
use crate::naming::hash;
use crate::orchestrator::{Orchestrator, UpMode};
use crate::paths;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub container_name: String,
    pub state: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpOutcome {
    pub project_name: String,
    pub dns_enabled: bool,
    pub dns_address: Option<std::net::SocketAddr>,
    pub services: Vec<ServiceStatus>,
}

impl Orchestrator {
    /// Bring the project's services up, preferring DNS mode when the
    /// provider supports it, degrading to port-binding on any daemon-start
    /// failure (§4.8 steps 1-3).
    pub fn up(&self, services: &[String]) -> Result<UpOutcome> {
        let supervisor = DaemonSupervisor::new();
        let provider_supports_dns = DockerManager::compose_version().is_some();

        let mut spawned_here = false;
        let mode = if provider_supports_dns {
            match self.resolve_dns_mode(&supervisor, &mut spawned_here) {
                Some(address) => UpMode::Dns { address },
                None => UpMode::PortBinding,
            }
        } else {
            log::info!("compose provider does not support container DNS; using port-binding mode");
            UpMode::PortBinding
        };

        if matches!(mode, UpMode::Dns { .. }) {
            self.run_hooks("on-dns-ready", &mode, &BTreeMap::new());
        }

        let derived_compose = self.prepare_compose_files(&mode)?;
        let compose_files = derived_compose
            .clone()
            .map(|p| vec![p])
            .unwrap_or_else(|| self.config.compose_files.clone());

        let docker = DockerManager::new(compose_files, &self.project_name);

        self.run_hooks("pre-up", &mode, &BTreeMap::new());

        let result = docker.compose_up(services);
        match result {
            Ok(output) if output.status.success() => {
                if let Some(derived) = &derived_compose {
                    let _ = std::fs::remove_file(derived);
                }
                let (outcome, service_infos) = self.build_outcome(&docker, &mode)?;
                self.run_hooks("post-up", &mode, &service_infos);
                Ok(outcome)
            }
            Ok(output) => {
                self.cleanup_on_failure(&supervisor, spawned_here);
                Err(SpaceError::Compose(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    String::from_utf8_lossy(&output.stderr).to_string(),
                )))
            }
            Err(e) => {
                self.cleanup_on_failure(&supervisor, spawned_here);
                Err(SpaceError::Compose(e))
            }
        }
    }

    /// Adopt a running daemon, or spawn one and poll for readiness.
    /// Returns `None` (degrading the caller to port-binding) on any
    /// daemon-start failure (§4.8 step 3, §7 Daemon-start errors).
    fn resolve_dns_mode(&self, supervisor: &DaemonSupervisor, spawned_here: &mut bool) -> Option<std::net::SocketAddr> {
        if let Some(state) = supervisor.load() {
            return Some(state.listen_address);
        }

        match supervisor.spawn(
            &self.project_name,
            &self.config.base_domain,
            &self.config.upstream_dns.to_string(),
            &self.config.dns_port_candidates,
        ) {
            Ok(()) => {
                *spawned_here = true;
                supervisor.load().map(|s| s.listen_address)
            }
            Err(e) => {
                log::warn!("DNS daemon failed to start, degrading to port-binding mode: {e}");
                None
            }
        }
    }

    fn prepare_compose_files(&self, mode: &UpMode) -> Result<Option<std::path::PathBuf>> {
        match mode {
            UpMode::Dns { .. } => {
                let derived = paths::derived_compose_path(&self.work_dir);
                rewrite_to_file(&self.config.compose_files, &derived)
                    .map_err(SpaceError::Compose)?;
                Ok(Some(derived))
            }
            UpMode::PortBinding => Ok(None),
        }
    }

    fn cleanup_on_failure(&self, supervisor: &DaemonSupervisor, spawned_here: bool) {
        if spawned_here {
            let _ = supervisor.stop();
        }
    }

    fn run_hooks(&self, event: &str, mode: &UpMode, service_infos: &BTreeMap<String, ServiceInfo>) {
        let address = match mode {
            UpMode::Dns { address } => Some(*address),
            UpMode::PortBinding => None,
        };
        let hash = hash::hash(&self.work_dir);
        let context = HookContext::new(event, &self.work_dir, &self.project_name, &hash, &self.config.base_domain, address)
            .with_services(service_infos.clone());
        match run_event(&self.work_dir.join(&self.config.hooks_dir), event, &context) {
            Ok(results) => {
                for result in results.iter().filter(|r| !r.success) {
                    log::warn!("hook {} failed: {}", result.path, result.stderr_tail);
                }
            }
            Err(e) => log::warn!("failed to scan hooks for event {event}: {e}"),
        }
    }

    fn build_outcome(
        &self,
        docker: &DockerManager,
        mode: &UpMode,
    ) -> Result<(UpOutcome, BTreeMap<String, ServiceInfo>)> {
        let containers = docker.compose_ps(None).map_err(SpaceError::Compose)?;

        let mut services = Vec::new();
        let mut service_infos = BTreeMap::new();
        for container in &containers {
            let published_port = container.publishers.first().map(|p| p.published_port);
            let url = match mode {
                UpMode::Dns { .. } => {
                    let dns_name = hash::compose(&container.service, &self.work_dir, &self.config.base_domain);
                    format!("http://{dns_name}")
                }
                UpMode::PortBinding => match published_port {
                    Some(port) => format!("http://localhost:{port}"),
                    None => "http://localhost".to_string(),
                },
            };
            services.push(ServiceStatus {
                service: container.service.clone(),
                container_name: container.name.clone(),
                state: container.state.to_string(),
                url: url.clone(),
            });
            service_infos.insert(
                container.service.clone(),
                ServiceInfo {
                    dns_name: matches!(mode, UpMode::Dns { .. })
                        .then(|| hash::compose(&container.service, &self.work_dir, &self.config.base_domain)),
                    internal_port: container.publishers.first().map(|p| p.target_port),
                    external_port: published_port,
                    url,
                    status: container.state.to_string(),
                },
            );
        }

        let outcome = UpOutcome {
            project_name: self.project_name.clone(),
            dns_enabled: matches!(mode, UpMode::Dns { .. }),
            dns_address: match mode {
                UpMode::Dns { address } => Some(*address),
                UpMode::PortBinding => None,
            },
            services,
        };
        Ok((outcome, service_infos))
    }
}
