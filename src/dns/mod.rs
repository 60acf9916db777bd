//! DNS subsystem: record cache (C2), authoritative/forwarding request
//! handler and responder lifecycle (C4), and resolver installation (C5).

pub mod cache;
pub mod handler;
pub mod resolver_install;
pub mod responder;

pub use cache::DnsCache;
pub use responder::DnsResponder;
