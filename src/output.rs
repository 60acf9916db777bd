//! # Output Module
//!
//! Serializes command results into JSON-renderable structs, one submodule
//! per subcommand group: `config` (merged config), `ps` (service status),
//! `dns` (daemon status), `hooks` (hook listing/run results), plus a
//! top-level `Error` shape.

pub mod config {
    use crate::config::ProjectConfig;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    pub struct Show {
        pub project_name: String,
        pub config: ProjectConfig,
    }
}

pub mod ps {
    use crate::orchestrator::up::ServiceStatus;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    pub struct List {
        pub project_name: String,
        pub services: Vec<ServiceStatus>,
    }
}

pub mod dns {
    use serde::Serialize;
    use std::net::SocketAddr;

    #[derive(Debug, Serialize)]
    pub struct Status {
        pub running: bool,
        pub listen_address: Option<SocketAddr>,
        pub project_name: Option<String>,
        pub base_domain: String,
        pub resolver_configured: bool,
        pub records: Vec<Record>,
    }

    #[derive(Debug, Serialize)]
    pub struct Record {
        pub service: String,
        pub hostname: String,
    }

    #[derive(Debug, Serialize)]
    pub struct Start {
        pub listen_address: SocketAddr,
    }

    #[derive(Debug, Serialize)]
    pub struct Stop {
        pub stopped: bool,
    }
}

pub mod hooks {
    use crate::hooks::runner::HookResult;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    pub struct List {
        pub events: Vec<(String, Vec<String>)>,
    }

    #[derive(Debug, Serialize)]
    pub struct Run {
        pub event: String,
        pub results: Vec<HookResult>,
    }
}

#[derive(Debug, serde::Serialize)]
pub struct Error {
    pub error_message: String,
}

macro_rules! impl_display {
    ($name:path) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", serde_json::to_string_pretty(self).unwrap())?;
                Ok(())
            }
        }
    };
}

impl_display!(config::Show);
impl_display!(ps::List);
impl_display!(dns::Status);
impl_display!(dns::Start);
impl_display!(dns::Stop);
impl_display!(hooks::List);
impl_display!(hooks::Run);
impl_display!(Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_status_renders_as_pretty_json() {
        let status = dns::Status {
            running: true,
            listen_address: Some("127.0.0.1:5353".parse().unwrap()),
            project_name: Some("myproj".to_string()),
            base_domain: "space.local".to_string(),
            resolver_configured: true,
            records: vec![dns::Record {
                service: "api".to_string(),
                hostname: "api-a1b2c3.space.local".to_string(),
            }],
        };
        let rendered = status.to_string();
        assert!(rendered.contains("\"running\": true"));
        assert!(rendered.contains("api-a1b2c3.space.local"));
    }
}
