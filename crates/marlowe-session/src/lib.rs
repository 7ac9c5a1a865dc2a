//! Marlowe Investigation Sessions
//!
//! Multi-turn investigation state and the orchestrator that drives it. A
//! session accumulates evidence across turns; each "deepen" turn feeds prior
//! evidence back into the reasoning loop as don't-repeat context. The store
//! is a seam (create/get/append/touch) with injected eviction policies, so
//! session lifecycle is explicit rather than leaking.

#![warn(missing_docs)]

pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod store;

pub use error::SessionError;
pub use orchestrator::InvestigationOrchestrator;
pub use store::{
    CapacityPolicy, EvictionPolicy, IdleTtlPolicy, InMemorySessionStore, Session, SessionStore,
};
