//! Per-pod migration core: the rendezvous handshake, the session object,
//! and the coordinator that owns the session registry.

pub mod coordinator;
pub mod handshake;
pub mod session;

pub use coordinator::{Coordinator, MigrationPreparer};
pub use handshake::{Handshake, MigrationPhase, OnceSignal};
pub use session::{CheckpointOptions, MigrationSession};
