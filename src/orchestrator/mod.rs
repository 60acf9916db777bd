//! # Orchestrator (C8)
//!
//! Ties the rest of the crate together around one `ProjectConfig`: project
//! naming, compose rewriting, the DNS daemon, and hook dispatch. `up`/`down`
//! implement the state machine in spec.md §4.8.

pub mod down;
pub mod up;

use crate::config::ProjectConfig;
use crate::naming::project::derive_project_name;
use std::path::{Path, PathBuf};

/// The DNS/port-binding mode resolved for one invocation (§3 `UpMode`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpMode {
    Dns { address: std::net::SocketAddr },
    PortBinding,
}

pub struct Orchestrator {
    pub config: ProjectConfig,
    pub work_dir: PathBuf,
    pub project_name: String,
}

impl Orchestrator {
    pub fn new(config: ProjectConfig, work_dir: &Path) -> Self {
        let project_name = config
            .name
            .clone()
            .unwrap_or_else(|| derive_project_name(&config.naming_strategy, &config.name_prefix, work_dir));
        Orchestrator {
            config,
            work_dir: work_dir.to_path_buf(),
            project_name,
        }
    }
}
