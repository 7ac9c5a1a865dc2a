//! Multi-turn investigation orchestration
//!
//! One pass: plan (the reasoning model picks producers) -> fan the selected
//! producers out, streaming each record and an incremental score as they
//! complete -> veto score once the round is done -> narrative synthesis ->
//! completion. A top-level failure surfaces as one terminal error event and
//! leaves the session in its last-good state.

use crate::prompts::{default_plan, plan_prompt, synthesis_prompt};
use crate::store::SessionStore;
use crate::SessionError;
use marlowe_domain::{
    veto_score, AllowList, EventSink, EvidenceRecord, Focus, IncrementalScore,
    InvestigationStatus, Severity, StreamEvent,
};
use marlowe_evidence::{ProducerDeps, ProducerKind, ProducerRunner, Target};
use marlowe_llm::parse::parse_json_array;
use marlowe_llm::ReasoningProvider;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Drives investigation passes over a session store
pub struct InvestigationOrchestrator<S: SessionStore> {
    store: Arc<S>,
    deps: ProducerDeps,
    runner: ProducerRunner,
    allowlist: AllowList,
}

impl<S: SessionStore> InvestigationOrchestrator<S> {
    /// Create an orchestrator
    pub fn new(
        store: Arc<S>,
        deps: ProducerDeps,
        runner: ProducerRunner,
        allowlist: AllowList,
    ) -> Self {
        Self {
            store,
            deps,
            runner,
            allowlist,
        }
    }

    /// Shared session store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a session without running anything yet
    ///
    /// Callers that need the session id before the stream starts (to hand it
    /// to the consumer for later deepen turns) create first, then run.
    pub fn create(&self, url: &str) -> crate::store::Session {
        self.store.create(url)
    }

    /// Turn 1: create a session and run one pass; returns the session id
    pub async fn investigate(&self, url: &str, sink: &dyn EventSink) -> String {
        let session = self.store.create(url);
        let _ = self.run_turn(&session.id, None, sink).await;
        session.id
    }

    /// Run one turn against an existing session
    ///
    /// Rejects unknown session ids before any work starts.
    pub async fn run_turn(
        &self,
        session_id: &str,
        focus: Option<Focus>,
        sink: &dyn EventSink,
    ) -> Result<(), SessionError> {
        let session = self
            .store
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        let turn = self.store.increment_turn(&session.id)?;
        if let Some(focus) = focus {
            info!(session = %session.id, turn, focus = focus.as_str(), "Deepening investigation");
        }
        self.run_pass(session_id, focus, sink).await;
        Ok(())
    }

    /// Turn N>1: deepen an existing session with a focus
    pub async fn deepen(
        &self,
        session_id: &str,
        focus: Focus,
        sink: &dyn EventSink,
    ) -> Result<(), SessionError> {
        self.run_turn(session_id, Some(focus), sink).await
    }

    /// Run one pass; all failures are caught here and reported terminally
    async fn run_pass(&self, session_id: &str, focus: Option<Focus>, sink: &dyn EventSink) {
        let _ = self
            .store
            .set_status(session_id, InvestigationStatus::Investigating);

        match self.pass_inner(session_id, focus, sink).await {
            Ok(summary) => {
                let _ = self.store.set_status(session_id, InvestigationStatus::Complete);
                sink.emit(StreamEvent::Done { summary });
            }
            Err(message) => {
                warn!(session = %session_id, error = %message, "Investigation pass failed");
                // Last-good evidence and score stay untouched
                let _ = self.store.set_status(session_id, InvestigationStatus::Error);
                sink.emit(StreamEvent::Error { message });
            }
        }
    }

    async fn pass_inner(
        &self,
        session_id: &str,
        focus: Option<Focus>,
        sink: &dyn EventSink,
    ) -> Result<String, String> {
        let session = self
            .store
            .get(session_id)
            .ok_or_else(|| format!("Unknown session: {}", session_id))?;
        let target = Target::from_url(session.url.clone());

        sink.emit(StreamEvent::Narration {
            text: format!("Investigating {}...", session.url),
        });

        // Plan: the model picks producers; a transport failure fails the
        // pass, an unparseable plan merely falls back to the default set.
        let prompt = plan_prompt(&session.url, focus, &session.evidence);
        let response = self
            .deps
            .reasoner
            .generate(&prompt)
            .await
            .map_err(|e| format!("Planning call failed: {}", e))?;
        let plan = parse_plan(&response).unwrap_or_else(|| {
            warn!(session = %session_id, "Unparseable plan; using default producer set");
            default_plan(focus)
        });
        info!(
            session = %session_id,
            producers = ?plan.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
            "Running producer round"
        );

        // Records from earlier turns must not re-emit
        let mut seen: HashSet<(String, String)> =
            session.evidence.iter().map(|r| r.dedup_key()).collect();

        // The live score replays accumulated evidence, then streams deltas
        let mut incremental = IncrementalScore::new();
        for record in &session.evidence {
            incremental.add(record.severity);
        }

        let mut fresh: Vec<EvidenceRecord> = Vec::new();
        let mut consumer_attached = true;
        let _ = self
            .runner
            .run_selected(&plan, &target, &self.deps, |_, records| {
                for record in records {
                    if !seen.insert(record.dedup_key()) {
                        continue;
                    }
                    fresh.push(record.clone());
                    if consumer_attached {
                        consumer_attached = sink.emit(StreamEvent::Card {
                            record: record.clone(),
                        });
                        let score = incremental.add(record.severity);
                        consumer_attached &=
                            sink.emit(StreamEvent::ThreatScore { score });
                    } else {
                        incremental.add(record.severity);
                    }
                }
            })
            .await;

        emit_connections(&fresh, sink);

        self.store
            .append_evidence(session_id, &fresh)
            .map_err(|e| e.to_string())?;
        let session = self
            .store
            .get(session_id)
            .ok_or_else(|| format!("Unknown session: {}", session_id))?;

        // The veto score is authoritative; the incremental one was an estimate
        let veto = veto_score(&target.host, &session.evidence, &self.allowlist);
        self.store
            .set_score(session_id, veto.score)
            .map_err(|e| e.to_string())?;
        sink.emit(StreamEvent::ThreatScore { score: veto.score });
        info!(session = %session_id, score = veto.score, tier = veto.tier, "Veto score computed");

        if !consumer_attached {
            // Consumer is gone; finish bookkeeping but skip the model call
            return Ok(String::from("Consumer disconnected"));
        }

        let synthesis = synthesis_prompt(&session.url, &fresh, veto.score);
        let summary = self
            .deps
            .reasoner
            .generate(&synthesis)
            .await
            .map_err(|e| format!("Synthesis call failed: {}", e))?;
        sink.emit(StreamEvent::Narration {
            text: summary.clone(),
        });

        Ok(summary)
    }
}

/// Parse the model's plan into producer kinds, dropping unknown names
fn parse_plan(response: &str) -> Option<Vec<ProducerKind>> {
    let values = parse_json_array(response).ok()?;
    let kinds: Vec<ProducerKind> = values
        .iter()
        .filter_map(|v| v.as_str())
        .filter_map(ProducerKind::parse)
        .collect();
    if kinds.is_empty() {
        None
    } else {
        Some(kinds)
    }
}

/// Advisory edges between this round's corroborating red flags
fn emit_connections(fresh: &[EvidenceRecord], sink: &dyn EventSink) {
    let flagged: Vec<&EvidenceRecord> = fresh
        .iter()
        .filter(|r| r.severity >= Severity::Warning)
        .collect();
    for pair in flagged.windows(2) {
        if pair[0].category != pair[1].category {
            sink.emit(StreamEvent::Connection {
                from: pair[0].id,
                to: pair[1].id,
                label: Some("corroborates".to_string()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_accepts_tool_names() {
        let plan = parse_plan(r#"["domain_age", "certificate"]"#).unwrap();
        assert_eq!(
            plan,
            vec![ProducerKind::DomainAge, ProducerKind::Certificate]
        );
    }

    #[test]
    fn test_parse_plan_drops_unknown_names() {
        let plan = parse_plan(r#"["domain_age", "port_scan"]"#).unwrap();
        assert_eq!(plan, vec![ProducerKind::DomainAge]);
    }

    #[test]
    fn test_parse_plan_all_unknown_is_none() {
        assert!(parse_plan(r#"["port_scan"]"#).is_none());
        assert!(parse_plan("no json here").is_none());
    }

    #[test]
    fn test_parse_plan_handles_fenced_output() {
        let plan = parse_plan("```json\n[\"threat_list\"]\n```").unwrap();
        assert_eq!(plan, vec![ProducerKind::ThreatList]);
    }
}
