//! Marlowe Domain Layer
//!
//! Core data model and pure decision logic for the fraud-investigation
//! engine. Infrastructure (HTTP lookups, TLS handshakes, the reasoning
//! model, the event gateway) lives in other crates; this one defines the
//! concepts they all share.
//!
//! ## Key Concepts
//!
//! - **EvidenceRecord**: one atomic, source-attributed observation with
//!   severity and confidence
//! - **Error classification**: failed I/O mapped to {severity, suspicious}
//!   so infrastructure noise never reads as a fraud signal
//! - **AllowList**: well-known domains trusted without further checks
//! - **Scoring**: a live incremental estimate plus the authoritative tiered
//!   veto score
//! - **CheckOutcome / Verdict**: the fixed per-product judgment set
//! - **StreamEvent**: the typed wire protocol consumers subscribe to

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authority;
pub mod check;
pub mod classify;
pub mod event;
pub mod evidence;
pub mod investigation;
pub mod product;
pub mod scoring;
pub mod verdict;

// Re-exports for convenience
pub use authority::{registrable_root, AllowList};
pub use check::{CheckName, CheckOutcome, CheckStatus};
pub use classify::{classify, Classification, FailureKind};
pub use event::{EventSink, MemorySink, StreamEvent};
pub use evidence::{EvidenceCategory, EvidenceId, EvidenceRecord, Severity};
pub use investigation::{Focus, InvestigationStatus};
pub use product::ProductResult;
pub use scoring::{additive_score, veto_score, IncrementalScore, VetoOutcome};
pub use verdict::Verdict;
