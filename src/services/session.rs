use crate::models::ScoredShelter;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Immutable outcome of one matching run
///
/// Created once per seeker session and cached; navigation through the
/// shortlist only moves an index into this object and never rescores.
#[derive(Debug, Clone)]
pub struct MatchSession {
    pub id: Uuid,
    pub shortlist: Vec<ScoredShelter>,
    pub total_candidates: usize,
    pub eligible_candidates: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// In-memory session store with TTL eviction
pub struct SessionStore {
    sessions: Cache<Uuid, Arc<MatchSession>>,
}

impl SessionStore {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let sessions = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { sessions }
    }

    /// Cache a freshly scored session and hand back the shared handle
    pub async fn insert(&self, session: MatchSession) -> Arc<MatchSession> {
        let session = Arc::new(session);
        self.sessions.insert(session.id, Arc::clone(&session)).await;
        session
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<MatchSession>> {
        self.sessions.get(id).await
    }

    pub fn entry_count(&self) -> u64 {
        self.sessions.entry_count()
    }
}
