//! # Container Introspector (C3)
//!
//! Maps a hostname query back to a single running container, either by
//! legacy name matching or by service name + working-directory hash
//! equality (§4.3).

use crate::docker::manager::{self, candidate_container_names, ContainerInfo, ContainerState, DockerManager};
use crate::naming::hash;
use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;

/// A located container's primary address, synthesized from `docker compose
/// ps` output (§3 Container Descriptor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerAddress {
    pub container_id: String,
    pub container_name: String,
    pub address: IpAddr,
}

/// Resolve a container by legacy name hint: exact match, then
/// `project-service`, then the two `-1`/`_1` suffix variants.
pub fn find_by_name(
    docker: &DockerManager,
    project: &str,
    service_hint: &str,
) -> std::io::Result<Option<ContainerAddress>> {
    let containers = docker.compose_ps(Some(ContainerState::Running))?;
    for candidate in candidate_container_names(project, service_hint) {
        if let Some(container) = containers.iter().find(|c| c.name == candidate) {
            if let Some(address) = primary_address(docker, container)? {
                return Ok(Some(ContainerAddress {
                    container_id: container.id.clone(),
                    container_name: container.name.clone(),
                    address,
                }));
            }
        }
    }
    Ok(None)
}

/// A container as reported by plain `docker ps` (not `docker compose ps`),
/// used only for the handful of fields the system-wide hash lookup needs.
#[derive(Debug, Deserialize)]
struct PsContainer {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names")]
    names: String,
}

/// Resolve a container by `(service, hash)`, across every compose project on
/// the host rather than one pinned by `-p <project>`: a shared DNS daemon
/// serves whichever worktree's working-directory hash matches, not just the
/// project that happened to spawn it (§4.3, §1). Lists running containers
/// system-wide via plain `docker ps` filtered to the requested compose
/// service label, then compares each candidate's working-dir label hash.
pub fn find_by_service_hash(service: &str, wanted_hash: &str) -> std::io::Result<Option<ContainerAddress>> {
    let label_filter = format!("label=com.docker.compose.service={service}");
    let output = crate::utils::run_command(
        "docker",
        &[
            "ps",
            "--filter",
            &label_filter,
            "--filter",
            "status=running",
            "--format",
            "{{json .}}",
        ],
    )?;
    if !output.status.success() {
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let Ok(container) = serde_json::from_str::<PsContainer>(line) else {
            continue;
        };
        let Some(working_dir) = manager::inspect_working_dir(&container.id)? else {
            continue;
        };
        if hash::hash(Path::new(&working_dir)) == wanted_hash {
            if let Some(address) = primary_address_by_id(&container.id)? {
                return Ok(Some(ContainerAddress {
                    container_id: container.id,
                    container_name: container.names,
                    address,
                }));
            }
        }
    }
    Ok(None)
}

/// Take the first non-empty address across a container's attached
/// networks, via `docker inspect`.
fn primary_address(docker: &DockerManager, container: &ContainerInfo) -> std::io::Result<Option<IpAddr>> {
    let _ = docker;
    primary_address_by_id(&container.id)
}

fn primary_address_by_id(container_id: &str) -> std::io::Result<Option<IpAddr>> {
    let output = crate::utils::run_command(
        "docker",
        &[
            "inspect",
            "--format",
            "{{ range .NetworkSettings.Networks }}{{ .IPAddress }}\n{{ end }}",
            container_id,
        ],
    )?;
    if !output.status.success() {
        return Ok(None);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Ok(Some(ip));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_address_equality_is_field_wise() {
        let a = ContainerAddress {
            container_id: "abc".into(),
            container_name: "myproj-api-1".into(),
            address: "127.0.0.1".parse().unwrap(),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
