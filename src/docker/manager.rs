//! # Docker Manager Module
//!
//! A thin, typed wrapper around the `docker compose` CLI. All compose
//! invocations run through `run_docker_compose`, which assembles the
//! `-f <file> ... -p <project>` prefix once and appends whatever
//! subcommand the caller needs.

use crate::utils::run_command;
use serde::{Deserialize, Serialize};
use std::io::Result;
use std::path::PathBuf;
use std::process::Output;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContainerInfo {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "Command")]
    pub command: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: String,
    #[serde(rename = "State")]
    pub state: ContainerState,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Health", default)]
    pub health: String,
    #[serde(rename = "ExitCode")]
    pub exit_code: i32,
    #[serde(rename = "Labels", default)]
    pub labels: String,
    #[serde(rename = "Service")]
    pub service: String,
    #[serde(rename = "Publishers", default)]
    pub publishers: Vec<PortPublisher>,
}

/// One entry of `docker compose ps --format json`'s `Publishers` array: a
/// host-port mapping for a container's exposed port.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PortPublisher {
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(rename = "TargetPort", default)]
    pub target_port: u16,
    #[serde(rename = "PublishedPort", default)]
    pub published_port: u16,
    #[serde(rename = "Protocol", default)]
    pub protocol: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum ContainerState {
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "exited")]
    Exited,
    #[serde(rename = "running")]
    Running,
    #[serde(rename = "paused")]
    Paused,
    #[serde(rename = "restarting")]
    Restarting,
    #[serde(rename = "removing")]
    Removing,
    #[serde(rename = "dead")]
    Dead,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ToString for ContainerState {
    fn to_string(&self) -> String {
        match self {
            ContainerState::Created => "created".into(),
            ContainerState::Exited => "exited".into(),
            ContainerState::Running => "running".into(),
            ContainerState::Paused => "paused".into(),
            ContainerState::Restarting => "restarting".into(),
            ContainerState::Removing => "removing".into(),
            ContainerState::Dead => "dead".into(),
            ContainerState::Unknown => "unknown".into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComposeInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "ConfigFiles")]
    pub config_files: String,
}

#[derive(Clone)]
pub struct DockerManager {
    pub compose_files: Vec<PathBuf>,
    pub project_name: String,
}

impl DockerManager {
    pub fn new(compose_files: Vec<PathBuf>, project_name: &str) -> Self {
        DockerManager {
            compose_files,
            project_name: project_name.to_string(),
        }
    }

    /// `docker compose up -d`, optionally scoped to a subset of services.
    pub fn compose_up(&self, services: &[String]) -> Result<Output> {
        let mut args = vec!["up", "-d"];
        args.extend(services.iter().map(String::as_str));
        self.run_docker_compose(&args)
    }

    /// `docker compose down --remove-orphans`.
    pub fn compose_down(&self) -> Result<Output> {
        self.run_docker_compose(&["down", "--remove-orphans"])
    }

    pub fn exec(&self, service: &str, cmd: &[&str]) -> Result<Output> {
        let mut args = vec!["exec", "-i", service];
        args.extend_from_slice(cmd);
        self.run_docker_compose(&args)
    }

    pub fn compose_ls(&self) -> std::io::Result<Vec<ComposeInfo>> {
        let output = self.run_docker_compose(&["ls", "--format", "json"])?;
        let stdout_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout_str)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Get docker info of all services in the project.
    pub fn compose_ps(&self, filter: Option<ContainerState>) -> std::io::Result<Vec<ContainerInfo>> {
        let mut cmd: Vec<String> = vec![
            "ps".to_string(),
            "-a".to_string(),
            "--format".to_string(),
            "json".to_string(),
        ];

        if let Some(state) = filter {
            cmd.push("--filter".to_string());
            cmd.push(format!("status={}", state.to_string()));
        }

        let cmd_str_slices: Vec<&str> = cmd.iter().map(AsRef::as_ref).collect();

        let output = self.run_docker_compose(&cmd_str_slices)?;
        let stdout_str = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout_str.trim().split('\n').collect();

        let containers: Vec<ContainerInfo> = lines
            .iter()
            .filter(|line| !line.is_empty())
            .filter_map(|&line| serde_json::from_str::<ContainerInfo>(line).ok())
            .collect();

        Ok(containers)
    }

    /// Compose version, if the compose plugin is installed.
    pub fn compose_version() -> Option<String> {
        let output = run_command("docker", &["compose", "version", "--short"]).ok()?;
        if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            None
        }
    }

    /// Working directory a running container's compose project was started
    /// from, read from its `com.docker.compose.project.working_dir` label.
    pub fn inspect_working_dir(&self, container_id: &str) -> Result<Option<String>> {
        inspect_working_dir(container_id)
    }

    fn run_docker_compose(&self, subcommands: &[&str]) -> Result<Output> {
        let mut args: Vec<&str> = vec!["compose"];
        for file in &self.compose_files {
            args.push("-f");
            args.push(file.to_str().expect("compose file path is not valid UTF-8"));
        }
        args.push("-p");
        args.push(&self.project_name);
        args.extend_from_slice(subcommands);

        run_command("docker", &args)
    }

    pub fn run_docker_logs(&self, container_name: &str) -> Result<Output> {
        run_command("docker", &["logs", container_name])
    }
}

/// Working directory a running container's compose project was started
/// from, read from its `com.docker.compose.project.working_dir` label.
/// Free function (not scoped to any one project's `DockerManager`) so the
/// by-service+hash introspection path (§4.3) can inspect containers that
/// belong to a different compose project than the one the DNS daemon was
/// originally spawned for.
pub fn inspect_working_dir(container_id: &str) -> Result<Option<String>> {
    let output = run_command(
        "docker",
        &[
            "inspect",
            "--format",
            "{{ index .Config.Labels \"com.docker.compose.project.working_dir\" }}",
            container_id,
        ],
    )?;
    if !output.status.success() {
        return Ok(None);
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Candidate container-name suffix patterns for a given compose project and
/// service (§4.3: legacy by-name matching).
pub fn candidate_container_names(project: &str, service: &str) -> Vec<String> {
    vec![
        service.to_string(),
        format!("{project}-{service}"),
        format!("{project}-{service}-1"),
        format!("{project}_{service}_1"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_container_names_covers_known_suffix_patterns() {
        let names = candidate_container_names("myproj", "api");
        assert!(names.contains(&"api".to_string()));
        assert!(names.contains(&"myproj-api".to_string()));
        assert!(names.contains(&"myproj-api-1".to_string()));
        assert!(names.contains(&"myproj_api_1".to_string()));
    }

    #[test]
    fn container_state_to_string_round_trips_known_variants() {
        assert_eq!(ContainerState::Running.to_string(), "running");
        assert_eq!(ContainerState::Exited.to_string(), "exited");
    }
}
