//! Concurrent producer fan-out
//!
//! Runs every selected producer for a round concurrently and waits for all
//! of them - a slow or failing producer never blocks or suppresses the rest.
//! Completion order is the emission order; nothing is fixed a priori.

use crate::kind::ProducerKind;
use crate::producers::run_one;
use crate::target::{failure_record, ProducerDeps, Target};
use marlowe_domain::EvidenceRecord;
use marlowe_intel::ProbeError;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default per-producer timeout
pub const DEFAULT_PRODUCER_TIMEOUT_SECS: u64 = 20;

/// Fans a round of producers out over tokio tasks
#[derive(Debug, Clone)]
pub struct ProducerRunner {
    producer_timeout: Duration,
}

impl Default for ProducerRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_PRODUCER_TIMEOUT_SECS))
    }
}

impl ProducerRunner {
    /// Create a runner with an explicit per-producer timeout
    pub fn new(producer_timeout: Duration) -> Self {
        Self { producer_timeout }
    }

    /// Run the selected producers concurrently, waiting for all of them
    ///
    /// `on_complete` fires once per producer, in completion order, with that
    /// producer's records; the full collected set is returned afterward. A
    /// producer that exceeds the timeout contributes a classified timeout
    /// record instead of its findings.
    pub async fn run_selected<F>(
        &self,
        kinds: &[ProducerKind],
        target: &Target,
        deps: &ProducerDeps,
        mut on_complete: F,
    ) -> Vec<EvidenceRecord>
    where
        F: FnMut(ProducerKind, &[EvidenceRecord]),
    {
        let mut unique: Vec<ProducerKind> = Vec::new();
        for &kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }

        let mut set = JoinSet::new();
        for kind in unique {
            let target = target.clone();
            let deps = deps.clone();
            let budget = self.producer_timeout;
            set.spawn(async move {
                let records = match timeout(budget, run_one(kind, &target, &deps)).await {
                    Ok(records) => records,
                    Err(_) => {
                        debug!(producer = kind.as_str(), "Producer exceeded its timeout");
                        vec![failure_record(kind, kind.as_str(), &ProbeError::Timeout)]
                    }
                };
                (kind, records)
            });
        }

        let mut collected = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((kind, records)) => {
                    on_complete(kind, &records);
                    collected.extend(records);
                }
                Err(e) => {
                    // A panicked producer is a bug; the round carries on
                    warn!(error = %e, "Producer task failed to join");
                }
            }
        }
        collected
    }
}
