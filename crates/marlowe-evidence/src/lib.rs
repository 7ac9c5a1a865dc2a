//! Marlowe Evidence Producers
//!
//! The independent checks an investigation can invoke: domain age,
//! certificate, threat list, content heuristics, community reputation,
//! brand impersonation, seller verification, and price comparison.
//!
//! Two contracts hold everywhere:
//! - a producer never raises - failures classify into low-confidence records
//!   at the producer boundary
//! - a round fans out concurrently and waits for all producers, so one slow
//!   dependency cannot suppress the rest of the evidence

#![warn(missing_docs)]

pub mod kind;
pub mod producers;
pub mod runner;
pub mod target;

pub use kind::ProducerKind;
pub use runner::{ProducerRunner, DEFAULT_PRODUCER_TIMEOUT_SECS};
pub use target::{failure_record, ProducerDeps, Target};
