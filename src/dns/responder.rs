//! # DNS Responder Lifecycle (C4)
//!
//! Binds a UDP socket from a list of port candidates, registers it on a
//! `hickory_server::ServerFuture`, and runs the serve loop on a background
//! task. Meant to be driven from inside the detached daemon process spawned
//! by the Daemon Supervisor (C6) — the Orchestrator/CLI process never holds
//! a tokio runtime itself (§5).

use crate::dns::cache::{DnsCache, DEFAULT_TTL};
use crate::dns::handler::SpaceDnsHandler;
use crate::docker::manager::DockerManager;
use hickory_server::ServerFuture;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

const BIND_GRACE: Duration = Duration::from_millis(100);

pub struct DnsResponder {
    stopped: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    pub listen_address: SocketAddr,
}

impl DnsResponder {
    /// Try each port in `port_candidates` in order, binding to the first
    /// one that succeeds, then spawn the serve loop.
    pub async fn start(
        base_domain: &str,
        project: &str,
        docker: DockerManager,
        upstream_dns: SocketAddr,
        port_candidates: &[u16],
    ) -> std::io::Result<Self> {
        let mut last_err = None;
        let mut bound = None;
        for &port in port_candidates {
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            match UdpSocket::bind(addr).await {
                Ok(socket) => {
                    bound = Some((socket, addr));
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }

        let (socket, listen_address) = bound.ok_or_else(|| {
            last_err.unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::AddrInUse, "no port candidates left"))
        })?;

        let handler = SpaceDnsHandler::new(base_domain, project, docker, DnsCache::new(DEFAULT_TTL), upstream_dns);
        let mut server = ServerFuture::new(handler);
        server.register_socket(socket);

        let stopped = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(async move {
            if let Err(e) = server.block_until_done().await {
                log::error!("DNS server loop exited with error: {e}");
            }
        });

        tokio::time::sleep(BIND_GRACE).await;
        log::info!("DNS responder bound to {listen_address} for zone {base_domain}");

        Ok(DnsResponder {
            stopped,
            task: Some(task),
            listen_address,
        })
    }

    /// Idempotent shutdown: abort the serve task if it hasn't already been
    /// stopped.
    pub fn stop(&mut self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for DnsResponder {
    fn drop(&mut self) {
        self.stop();
    }
}
