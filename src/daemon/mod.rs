//! Daemon lifecycle: the persisted state record (§3) and the supervisor
//! that spawns, detects, and stops the DNS responder process (C6).

pub mod state;
pub mod supervisor;

pub use state::DaemonState;
pub use supervisor::DaemonSupervisor;
