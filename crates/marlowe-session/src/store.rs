//! Session storage and eviction
//!
//! Sessions accumulate evidence across turns and have no explicit
//! destruction; lifecycle is the owner's job, expressed as an injected
//! eviction policy swept at moments the owner chooses. The evidence list is
//! the one resource needing single-owner append discipline - the store's
//! lock is that owner.

use crate::error::SessionError;
use marlowe_domain::{EvidenceRecord, InvestigationStatus};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Accumulated multi-turn state for one investigated url
#[derive(Debug, Clone)]
pub struct Session {
    /// UUIDv7 session identifier
    pub id: String,
    /// Target url
    pub url: String,
    /// Ordered evidence accumulated across turns
    pub evidence: Vec<EvidenceRecord>,
    /// Current threat score; only a veto recomputation overwrites it
    pub threat_score: u8,
    /// Completed and in-flight turn count
    pub turns: u32,
    /// Lifecycle status
    pub status: InvestigationStatus,
    /// When the session was last created/read/written
    pub last_touched: Instant,
}

impl Session {
    fn new(url: &str) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            url: url.to_string(),
            evidence: Vec::new(),
            threat_score: 0,
            turns: 0,
            status: InvestigationStatus::Investigating,
            last_touched: Instant::now(),
        }
    }

    /// Time since the session was last touched
    pub fn idle_for(&self) -> Duration {
        self.last_touched.elapsed()
    }
}

/// Storage seam for investigation sessions
///
/// Implementations hand out snapshots rather than references, so callers
/// never hold the store's lock across an await.
pub trait SessionStore: Send + Sync {
    /// Create a session for a url and return its snapshot
    fn create(&self, url: &str) -> Session;

    /// Snapshot a session by id
    fn get(&self, id: &str) -> Option<Session>;

    /// Append evidence records to a session
    fn append_evidence(&self, id: &str, records: &[EvidenceRecord]) -> Result<(), SessionError>;

    /// Overwrite the session's score (veto recomputation only)
    fn set_score(&self, id: &str, score: u8) -> Result<(), SessionError>;

    /// Update the session's lifecycle status
    fn set_status(&self, id: &str, status: InvestigationStatus) -> Result<(), SessionError>;

    /// Increment and return the turn counter
    fn increment_turn(&self, id: &str) -> Result<u32, SessionError>;

    /// Refresh the session's idle clock
    fn touch(&self, id: &str) -> Result<(), SessionError>;

    /// Evict sessions the policy selects; returns how many were removed
    fn sweep(&self, policy: &dyn EvictionPolicy) -> usize;
}

/// Decides which sessions a sweep removes
pub trait EvictionPolicy: Send + Sync {
    /// Ids of sessions to evict, given a snapshot of everything stored
    fn select(&self, sessions: &[Session]) -> Vec<String>;
}

/// Evicts sessions idle beyond a TTL
///
/// Never selects a session that is mid-pass.
#[derive(Debug, Clone)]
pub struct IdleTtlPolicy {
    max_idle: Duration,
}

impl IdleTtlPolicy {
    /// Evict sessions idle longer than `max_idle`
    pub fn new(max_idle: Duration) -> Self {
        Self { max_idle }
    }
}

impl EvictionPolicy for IdleTtlPolicy {
    fn select(&self, sessions: &[Session]) -> Vec<String> {
        sessions
            .iter()
            .filter(|s| {
                s.status != InvestigationStatus::Investigating && s.idle_for() > self.max_idle
            })
            .map(|s| s.id.clone())
            .collect()
    }
}

/// Caps the store at a fixed session count
///
/// Beyond capacity, the longest-idle finished sessions go first.
#[derive(Debug, Clone)]
pub struct CapacityPolicy {
    max_sessions: usize,
}

impl CapacityPolicy {
    /// Keep at most `max_sessions` sessions
    pub fn new(max_sessions: usize) -> Self {
        Self { max_sessions }
    }
}

impl EvictionPolicy for CapacityPolicy {
    fn select(&self, sessions: &[Session]) -> Vec<String> {
        if sessions.len() <= self.max_sessions {
            return Vec::new();
        }
        let mut finished: Vec<&Session> = sessions
            .iter()
            .filter(|s| s.status != InvestigationStatus::Investigating)
            .collect();
        finished.sort_by_key(|s| std::cmp::Reverse(s.idle_for()));
        finished
            .iter()
            .take(sessions.len() - self.max_sessions)
            .map(|s| s.id.clone())
            .collect()
    }
}

/// In-memory session store
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        session.last_touched = Instant::now();
        Ok(f(session))
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, url: &str) -> Session {
        let session = Session::new(url);
        self.sessions
            .write()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        session
    }

    fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    fn append_evidence(&self, id: &str, records: &[EvidenceRecord]) -> Result<(), SessionError> {
        self.with_session(id, |s| s.evidence.extend_from_slice(records))
    }

    fn set_score(&self, id: &str, score: u8) -> Result<(), SessionError> {
        self.with_session(id, |s| s.threat_score = score)
    }

    fn set_status(&self, id: &str, status: InvestigationStatus) -> Result<(), SessionError> {
        self.with_session(id, |s| s.status = status)
    }

    fn increment_turn(&self, id: &str) -> Result<u32, SessionError> {
        self.with_session(id, |s| {
            s.turns += 1;
            s.turns
        })
    }

    fn touch(&self, id: &str) -> Result<(), SessionError> {
        self.with_session(id, |_| ())
    }

    fn sweep(&self, policy: &dyn EvictionPolicy) -> usize {
        let snapshot: Vec<Session> = self.sessions.read().unwrap().values().cloned().collect();
        let doomed = policy.select(&snapshot);
        if doomed.is_empty() {
            return 0;
        }
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        for id in &doomed {
            sessions.remove(id);
        }
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, "Swept idle sessions");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlowe_domain::{EvidenceCategory, Severity};

    fn record() -> EvidenceRecord {
        EvidenceRecord::new(
            EvidenceCategory::DomainAge,
            Severity::Safe,
            "t",
            "d",
            "whois",
            0.8,
        )
    }

    #[test]
    fn test_create_and_get() {
        let store = InMemorySessionStore::new();
        let session = store.create("https://shop.example");

        let fetched = store.get(&session.id).unwrap();
        assert_eq!(fetched.url, "https://shop.example");
        assert_eq!(fetched.turns, 0);
        assert_eq!(fetched.status, InvestigationStatus::Investigating);
    }

    #[test]
    fn test_unknown_id_is_none() {
        let store = InMemorySessionStore::new();
        assert!(store.get("nope").is_none());
        assert!(matches!(
            store.touch("nope"),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_append_and_score() {
        let store = InMemorySessionStore::new();
        let session = store.create("https://shop.example");

        store.append_evidence(&session.id, &[record(), record()]).unwrap();
        store.set_score(&session.id, 45).unwrap();

        let fetched = store.get(&session.id).unwrap();
        assert_eq!(fetched.evidence.len(), 2);
        assert_eq!(fetched.threat_score, 45);
    }

    #[test]
    fn test_turn_counter() {
        let store = InMemorySessionStore::new();
        let session = store.create("https://shop.example");
        assert_eq!(store.increment_turn(&session.id).unwrap(), 1);
        assert_eq!(store.increment_turn(&session.id).unwrap(), 2);
    }

    #[test]
    fn test_idle_ttl_sweep_skips_in_flight() {
        let store = InMemorySessionStore::new();
        let running = store.create("https://a.example");
        let done = store.create("https://b.example");
        store
            .set_status(&done.id, InvestigationStatus::Complete)
            .unwrap();

        // Zero TTL: everything idle is eligible immediately
        let policy = IdleTtlPolicy::new(Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(5));
        let evicted = store.sweep(&policy);

        assert_eq!(evicted, 1);
        assert!(store.get(&running.id).is_some(), "in-flight session kept");
        assert!(store.get(&done.id).is_none());
    }

    #[test]
    fn test_capacity_sweep_evicts_longest_idle() {
        let store = InMemorySessionStore::new();
        let old = store.create("https://old.example");
        store
            .set_status(&old.id, InvestigationStatus::Complete)
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let new = store.create("https://new.example");
        store
            .set_status(&new.id, InvestigationStatus::Complete)
            .unwrap();

        let policy = CapacityPolicy::new(1);
        let evicted = store.sweep(&policy);
        assert_eq!(evicted, 1);
        assert!(store.get(&new.id).is_some());
        assert!(store.get(&old.id).is_none());
    }

    #[test]
    fn test_capacity_sweep_noop_under_cap() {
        let store = InMemorySessionStore::new();
        store.create("https://a.example");
        assert_eq!(store.sweep(&CapacityPolicy::new(10)), 0);
        assert_eq!(store.len(), 1);
    }
}
