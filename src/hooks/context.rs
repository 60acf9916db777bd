//! # Hook Context (§3 Hook Context)
//!
//! The JSON document piped to each hook's stdin, describing the project and
//! the event that triggered it, plus the fixed set of environment variables
//! every hook process also receives (§4.9).

use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub dns_name: Option<String>,
    pub internal_port: Option<u16>,
    pub external_port: Option<u16>,
    pub url: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HookContext {
    pub event: String,
    pub work_dir: String,
    pub project_name: String,
    pub hash: String,
    pub base_domain: String,
    pub dns_enabled: bool,
    pub dns_address: Option<SocketAddr>,
    pub services: BTreeMap<String, ServiceInfo>,
    pub metadata: BTreeMap<String, String>,
}

impl HookContext {
    pub fn new(
        event: &str,
        work_dir: &Path,
        project_name: &str,
        hash: &str,
        base_domain: &str,
        dns_address: Option<SocketAddr>,
    ) -> Self {
        HookContext {
            event: event.to_string(),
            work_dir: work_dir.to_string_lossy().to_string(),
            project_name: project_name.to_string(),
            hash: hash.to_string(),
            base_domain: base_domain.to_string(),
            dns_enabled: dns_address.is_some(),
            dns_address,
            services: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_services(mut self, services: BTreeMap<String, ServiceInfo>) -> Self {
        self.services = services;
        self
    }

    /// The fixed environment-variable set described in spec §4.9: a common
    /// prefix plus one `SPACE_SERVICE_<UPPER_NAME>_{DNS_NAME,PORT,URL}`
    /// triple per service.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("SPACE_WORKDIR".to_string(), self.work_dir.clone()),
            ("SPACE_PROJECT_NAME".to_string(), self.project_name.clone()),
            ("SPACE_HASH".to_string(), self.hash.clone()),
            ("SPACE_BASE_DOMAIN".to_string(), self.base_domain.clone()),
            ("SPACE_DNS_ENABLED".to_string(), self.dns_enabled.to_string()),
        ];
        if let Some(addr) = self.dns_address {
            vars.push(("SPACE_DNS_ADDRESS".to_string(), addr.to_string()));
        }
        for (name, info) in &self.services {
            let upper = name.to_uppercase().replace('-', "_");
            if let Some(dns_name) = &info.dns_name {
                vars.push((format!("SPACE_SERVICE_{upper}_DNS_NAME"), dns_name.clone()));
            }
            if let Some(port) = info.external_port.or(info.internal_port) {
                vars.push((format!("SPACE_SERVICE_{upper}_PORT"), port.to_string()));
            }
            vars.push((format!("SPACE_SERVICE_{upper}_URL"), info.url.clone()));
        }
        vars
    }
}
