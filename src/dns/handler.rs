//! # Authoritative Request Handler (C4)
//!
//! Answers queries under `base_domain` from the container introspector (via
//! the record cache), and forwards everything else to `upstream_dns`.
//! Unmatched names under our own zone get NOERROR/no-answer rather than
//! NXDOMAIN — a container that hasn't started yet should look transient,
//! not like a typo (§4.4 edge cases).

use crate::dns::cache::{DnsCache, DEFAULT_TTL};
use crate::docker::introspect;
use crate::docker::manager::DockerManager;
use crate::naming::hash;
use async_trait::async_trait;
use hickory_proto::op::{Header, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{LowerName, Name, RData, Record};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(2);
/// Matches the record cache's own TTL (§4.4): an answer shouldn't outlive
/// the cache entry it was synthesized from.
const ANSWER_TTL: u32 = DEFAULT_TTL.as_secs() as u32;

pub struct SpaceDnsHandler {
    root_zone: LowerName,
    base_domain: String,
    project: String,
    docker: DockerManager,
    cache: DnsCache,
    upstream_dns: SocketAddr,
}

impl SpaceDnsHandler {
    pub fn new(
        base_domain: &str,
        project: &str,
        docker: DockerManager,
        cache: DnsCache,
        upstream_dns: SocketAddr,
    ) -> Self {
        SpaceDnsHandler {
            root_zone: LowerName::from(Name::from_str(base_domain).expect("invalid base domain")),
            base_domain: base_domain.to_string(),
            project: project.to_string(),
            docker,
            cache,
            upstream_dns,
        }
    }

    /// Resolve a query name under our own zone to an address, consulting
    /// the cache before falling back to container introspection: hashed
    /// names go through the by-service+hash path (C3), anything else falls
    /// back to the legacy by-name path (§4.1, §4.4).
    fn resolve_authoritative(&self, query_name: &str) -> Option<IpAddr> {
        if let Some(address) = self.cache.get(query_name) {
            return Some(address);
        }

        let found = match hash::parse(query_name, &self.base_domain) {
            Some((service, wanted_hash)) => introspect::find_by_service_hash(service, wanted_hash).ok()?,
            None => {
                let hint = self.strip_zone_suffix(query_name);
                introspect::find_by_name(&self.docker, &self.project, hint).ok()?
            }
        }?;

        self.cache.set(query_name, found.address);
        Some(found.address)
    }

    /// Strip `.<base_domain>` (and an optional trailing dot) from a query
    /// name, leaving the bare service-name hint the legacy by-name path
    /// expects.
    fn strip_zone_suffix<'a>(&self, query_name: &'a str) -> &'a str {
        let query_name = query_name.strip_suffix('.').unwrap_or(query_name);
        query_name
            .strip_suffix(&format!(".{}", self.base_domain))
            .unwrap_or(query_name)
    }

    async fn handle_query(&self, request: &Request) -> Result<Vec<Record>, ResponseCode> {
        let mut records = Vec::new();
        for query in request.queries() {
            let name = query.name();
            if self.root_zone.zone_of(name.into()) {
                let query_name = name.to_string();
                match self.resolve_authoritative(&query_name) {
                    Some(IpAddr::V4(addr)) => {
                        records.push(Record::from_rdata(name.clone().into(), ANSWER_TTL, RData::A(A(addr))));
                    }
                    Some(IpAddr::V6(_)) | None => {
                        // No address found: NOERROR with no answer, not NXDOMAIN (§4.4).
                    }
                }
            } else {
                match self.forward_upstream(request).await {
                    Ok(forwarded) => records.extend(forwarded),
                    Err(_) => return Err(ResponseCode::ServFail),
                }
            }
        }
        Ok(records)
    }

    /// Relay a request that falls outside our zone to `upstream_dns`,
    /// timing out after 2s (§4.4).
    async fn forward_upstream(&self, request: &Request) -> std::io::Result<Vec<Record>> {
        let resolver = hickory_resolver::TokioAsyncResolver::tokio(
            hickory_resolver::config::ResolverConfig::from_parts(
                None,
                vec![],
                hickory_resolver::config::NameServerConfigGroup::from_ips_clear(
                    &[self.upstream_dns.ip()],
                    self.upstream_dns.port(),
                    true,
                ),
            ),
            hickory_resolver::config::ResolverOpts::default(),
        );

        let mut records = Vec::new();
        for query in request.queries() {
            let lookup = tokio::time::timeout(
                UPSTREAM_TIMEOUT,
                resolver.lookup(query.name().to_string(), query.query_type()),
            )
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream DNS timed out"))?
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

            for record in lookup.record_iter() {
                records.push(record.clone());
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl RequestHandler for SpaceDnsHandler {
    async fn handle_request<R: ResponseHandler>(&self, request: &Request, mut response_handler: R) -> ResponseInfo {
        if request.op_code() != OpCode::Query || request.message_type() != MessageType::Query {
            let mut header = Header::response_from_request(request.header());
            header.set_response_code(ResponseCode::ServFail);
            return header.into();
        }

        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);

        match self.handle_query(request).await {
            Ok(records) => {
                let response = builder.build(header, records.iter(), &[], &[], &[]);
                match response_handler.send_response(response).await {
                    Ok(info) => info,
                    Err(e) => {
                        log::error!("failed to send DNS response: {e}");
                        header.set_response_code(ResponseCode::ServFail);
                        header.into()
                    }
                }
            }
            Err(code) => {
                header.set_response_code(code);
                header.into()
            }
        }
    }
}
