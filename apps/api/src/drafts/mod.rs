//! Draft autosave. The form is saved per session and offered back for restore
//! while it is fresh.
//!
//! `AppState` holds an `Arc<dyn DraftStore>`: Redis when `REDIS_URL` is set,
//! the in-process store otherwise.

pub mod handlers;
pub mod redis_store;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::ResumeForm;

pub use redis_store::RedisDraftStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub form: ResumeForm,
    pub saved_at: DateTime<Utc>,
}

impl Draft {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.saved_at < ttl
    }
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save(&self, session_id: Uuid, draft: &Draft) -> Result<(), AppError>;
    async fn load(&self, session_id: Uuid) -> Result<Option<Draft>, AppError>;
    async fn clear(&self, session_id: Uuid) -> Result<(), AppError>;
}

/// Loads a draft, discarding it if it is older than `ttl`.
pub async fn load_fresh(
    store: &dyn DraftStore,
    session_id: Uuid,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<Option<Draft>, AppError> {
    match store.load(session_id).await? {
        Some(draft) if draft.is_fresh(now, ttl) => Ok(Some(draft)),
        Some(_) => {
            debug!("Discarding stale draft for session {session_id}");
            store.clear(session_id).await?;
            Ok(None)
        }
        None => Ok(None),
    }
}

/// In-process draft store for local runs without Redis.
///
/// Stale drafts are pruned on every save so the map stays bounded by the
/// sessions active within `ttl`.
pub struct MemoryDraftStore {
    drafts: RwLock<HashMap<Uuid, Draft>>,
    ttl: Duration,
}

impl MemoryDraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            drafts: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

#[cfg(test)]
impl MemoryDraftStore {
    async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn save(&self, session_id: Uuid, draft: &Draft) -> Result<(), AppError> {
        let now = Utc::now();
        let mut drafts = self.drafts.write().await;
        let before = drafts.len();
        drafts.retain(|_, d| d.is_fresh(now, self.ttl));
        let pruned = before - drafts.len();
        if pruned > 0 {
            debug!("Pruned {pruned} stale draft(s)");
        }
        drafts.insert(session_id, draft.clone());
        Ok(())
    }

    async fn load(&self, session_id: Uuid) -> Result<Option<Draft>, AppError> {
        Ok(self.drafts.read().await.get(&session_id).cloned())
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), AppError> {
        self.drafts.write().await.remove(&session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_at(saved_at: DateTime<Utc>) -> Draft {
        Draft {
            form: ResumeForm {
                name: "Jane".to_string(),
                ..ResumeForm::default()
            },
            saved_at,
        }
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let ttl = Duration::hours(24);
        assert!(draft_at(now - Duration::hours(23)).is_fresh(now, ttl));
        assert!(!draft_at(now - Duration::hours(24)).is_fresh(now, ttl));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryDraftStore::new(Duration::hours(24));
        let id = Uuid::new_v4();
        let draft = draft_at(Utc::now());

        store.save(id, &draft).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), Some(draft));
        store.clear(id).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_fresh_discards_stale_draft() {
        let store = MemoryDraftStore::new(Duration::hours(24));
        let id = Uuid::new_v4();
        let now = Utc::now();
        store
            .save(id, &draft_at(now - Duration::hours(30)))
            .await
            .unwrap();

        let loaded = load_fresh(&store, id, Duration::hours(24), now).await.unwrap();
        assert!(loaded.is_none());
        assert!(store.load(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_prunes_stale_drafts() {
        let store = MemoryDraftStore::new(Duration::hours(24));
        let now = Utc::now();
        for _ in 0..1000 {
            store
                .drafts
                .write()
                .await
                .insert(Uuid::new_v4(), draft_at(now - Duration::days(30)));
        }
        assert_eq!(store.len().await, 1000);

        let fresh_id = Uuid::new_v4();
        store.save(fresh_id, &draft_at(now)).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(store.load(fresh_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_keeps_other_fresh_drafts() {
        let store = MemoryDraftStore::new(Duration::hours(24));
        let now = Utc::now();
        let older = Uuid::new_v4();
        store
            .save(older, &draft_at(now - Duration::hours(2)))
            .await
            .unwrap();
        store.save(Uuid::new_v4(), &draft_at(now)).await.unwrap();
        assert_eq!(store.len().await, 2);
        assert!(store.load(older).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_load_fresh_returns_recent_draft() {
        let store = MemoryDraftStore::new(Duration::hours(24));
        let id = Uuid::new_v4();
        let now = Utc::now();
        store.save(id, &draft_at(now)).await.unwrap();
        assert!(load_fresh(&store, id, Duration::hours(24), now)
            .await
            .unwrap()
            .is_some());
    }
}
