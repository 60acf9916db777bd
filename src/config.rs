//! # Config Module
//!
//! Loads and merges a project's `space.toml` with CLI overrides into a
//! single `ProjectConfig` used throughout the orchestrator and DNS
//! subsystem.

use crate::error::{Result, SpaceError};
use crate::naming::project::NamingStrategy;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "space.toml";
pub const DEFAULT_BASE_DOMAIN: &str = "space.local";
pub const DEFAULT_UPSTREAM_DNS: &str = "1.1.1.1:53";
pub const DEFAULT_HOOKS_DIR: &str = ".space/hooks";
pub const DNS_PORT_CANDIDATES: &[u16] = &[5353, 5354, 5355, 5356, 5357];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: Option<String>,
    #[serde(default = "default_prefix")]
    pub name_prefix: String,
    #[serde(default)]
    pub naming_strategy: NamingStrategy,
    #[serde(default = "default_base_domain")]
    pub base_domain: String,
    #[serde(default = "default_upstream_dns")]
    pub upstream_dns: SocketAddr,
    #[serde(default = "default_port_candidates")]
    pub dns_port_candidates: Vec<u16>,
    #[serde(default = "default_hooks_dir")]
    pub hooks_dir: PathBuf,
    #[serde(default)]
    pub compose_files: Vec<PathBuf>,
}

fn default_prefix() -> String {
    String::new()
}
fn default_base_domain() -> String {
    DEFAULT_BASE_DOMAIN.to_string()
}
fn default_upstream_dns() -> SocketAddr {
    DEFAULT_UPSTREAM_DNS.parse().unwrap()
}
fn default_port_candidates() -> Vec<u16> {
    DNS_PORT_CANDIDATES.to_vec()
}
fn default_hooks_dir() -> PathBuf {
    PathBuf::from(DEFAULT_HOOKS_DIR)
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            name: None,
            name_prefix: default_prefix(),
            naming_strategy: NamingStrategy::default(),
            base_domain: default_base_domain(),
            upstream_dns: default_upstream_dns(),
            dns_port_candidates: default_port_candidates(),
            hooks_dir: default_hooks_dir(),
            compose_files: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Load `space.toml` from `work_dir` if present, else fall back to
    /// defaults. A malformed config file is a hard failure (§7:
    /// Configuration/validation errors abort the command).
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            let mut config = ProjectConfig::default();
            if config.compose_files.is_empty() {
                config.compose_files = default_compose_files(work_dir);
            }
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            SpaceError::Config(format!("failed to read {}: {e}", config_path.display()))
        })?;
        let mut config: ProjectConfig = toml::from_str(&contents)
            .map_err(|e| SpaceError::Config(format!("invalid {}: {e}", config_path.display())))?;

        if config.compose_files.is_empty() {
            config.compose_files = default_compose_files(work_dir);
        }
        Ok(config)
    }
}

fn default_compose_files(work_dir: &Path) -> Vec<PathBuf> {
    for candidate in ["docker-compose.yml", "docker-compose.yaml", "compose.yml", "compose.yaml"] {
        let path = work_dir.join(candidate);
        if path.exists() {
            return vec![path];
        }
    }
    vec![work_dir.join("docker-compose.yml")]
}
