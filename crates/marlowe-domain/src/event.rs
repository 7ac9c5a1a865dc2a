//! Typed event stream model
//!
//! Everything the engine tells a consumer travels as an ordered sequence of
//! {event-name, JSON payload} pairs over a long-lived one-directional stream.
//! Consumers correlate across entities by id and must tolerate event names
//! they do not know.

use crate::check::CheckOutcome;
use crate::evidence::{EvidenceId, EvidenceRecord};
use crate::product::ProductResult;
use crate::verdict::Verdict;
use serde_json::{json, Value};

/// One event on the stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Free-text status; any number, any time
    Narration { text: String },
    /// One new piece of evidence
    Card { record: EvidenceRecord },
    /// Advisory edge between two evidence records
    Connection {
        from: EvidenceId,
        to: EvidenceId,
        label: Option<String>,
    },
    /// Current best threat score; repeats (incremental, then corrected veto)
    ThreatScore { score: u8 },
    /// One normalized product listing
    Product { product: ProductResult },
    /// One check outcome for a product
    FraudCheck {
        product_id: String,
        check: CheckOutcome,
    },
    /// Final verdict for a product
    ProductVerdict {
        product_id: String,
        verdict: Verdict,
        trust_score: u8,
    },
    /// The recommended product of a cohort
    BestPick {
        product_id: String,
        savings: Option<f64>,
    },
    /// Total products surfaced by the search round
    AllProducts { count: usize },
    /// Terminal: the pass finished
    Done { summary: String },
    /// Terminal: the pass failed
    Error { message: String },
}

impl StreamEvent {
    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Narration { .. } => "narration",
            StreamEvent::Card { .. } => "card",
            StreamEvent::Connection { .. } => "connection",
            StreamEvent::ThreatScore { .. } => "threat_score",
            StreamEvent::Product { .. } => "product",
            StreamEvent::FraudCheck { .. } => "fraud_check",
            StreamEvent::ProductVerdict { .. } => "verdict",
            StreamEvent::BestPick { .. } => "best_pick",
            StreamEvent::AllProducts { .. } => "all_products",
            StreamEvent::Done { .. } => "done",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// JSON payload of this event
    pub fn payload(&self) -> Value {
        match self {
            StreamEvent::Narration { text } => json!({ "text": text }),
            StreamEvent::Card { record } => {
                serde_json::to_value(record).unwrap_or_else(|_| json!({}))
            }
            StreamEvent::Connection { from, to, label } => {
                let mut payload = json!({ "from": from, "to": to });
                if let Some(label) = label {
                    payload["label"] = json!(label);
                }
                payload
            }
            StreamEvent::ThreatScore { score } => json!({ "score": score }),
            StreamEvent::Product { product } => {
                serde_json::to_value(product).unwrap_or_else(|_| json!({}))
            }
            StreamEvent::FraudCheck { product_id, check } => {
                json!({ "productId": product_id, "check": check })
            }
            StreamEvent::ProductVerdict {
                product_id,
                verdict,
                trust_score,
            } => json!({
                "productId": product_id,
                "verdict": verdict,
                "trustScore": trust_score,
            }),
            StreamEvent::BestPick { product_id, savings } => {
                let mut payload = json!({ "productId": product_id });
                if let Some(savings) = savings {
                    payload["savings"] = json!(savings);
                }
                payload
            }
            StreamEvent::AllProducts { count } => json!({ "count": count }),
            StreamEvent::Done { summary } => json!({ "summary": summary }),
            StreamEvent::Error { message } => json!({ "message": message }),
        }
    }

    /// Whether no further events may follow this one
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }
}

/// Where orchestrators emit events
///
/// Implementations must be non-blocking. `emit` returns false once the
/// consumer has detached; orchestrators treat that as a best-effort stop
/// signal for further work.
pub trait EventSink: Send + Sync {
    /// Emit one event; false means the consumer is gone
    fn emit(&self, event: StreamEvent) -> bool;
}

/// In-memory sink that collects events, for tests and offline runs
#[derive(Debug, Default)]
pub struct MemorySink {
    events: std::sync::Mutex<Vec<StreamEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<StreamEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Names of everything emitted so far, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: StreamEvent) -> bool {
        self.events.lock().unwrap().push(event);
        true
    }
}
