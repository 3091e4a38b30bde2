use async_trait::async_trait;
use chrono::Duration;
use redis::AsyncCommands;
use tracing::info;
use uuid::Uuid;

use crate::drafts::{Draft, DraftStore};
use crate::errors::AppError;

const KEY_PREFIX: &str = "resume:draft";

/// Drafts stored as JSON under `resume:draft:{session_id}` with a Redis expiry
/// matching the freshness window.
pub struct RedisDraftStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisDraftStore {
    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self {
            client,
            ttl_secs: ttl.num_seconds().max(1) as u64,
        }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::DraftStore(format!("Redis connection failed: {e}")))
    }
}

pub fn draft_key(session_id: Uuid) -> String {
    format!("{KEY_PREFIX}:{session_id}")
}

#[async_trait]
impl DraftStore for RedisDraftStore {
    async fn save(&self, session_id: Uuid, draft: &Draft) -> Result<(), AppError> {
        let payload = serde_json::to_string(draft).map_err(anyhow::Error::from)?;
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(draft_key(session_id), payload, self.ttl_secs)
            .await
            .map_err(|e| AppError::DraftStore(format!("SET failed: {e}")))?;
        info!("Saved draft for session {session_id}");
        Ok(())
    }

    async fn load(&self, session_id: Uuid) -> Result<Option<Draft>, AppError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn
            .get(draft_key(session_id))
            .await
            .map_err(|e| AppError::DraftStore(format!("GET failed: {e}")))?;

        match payload {
            Some(json) => {
                let draft = serde_json::from_str(&json).map_err(|e| {
                    AppError::DraftStore(format!("Corrupt draft for session {session_id}: {e}"))
                })?;
                Ok(Some(draft))
            }
            None => Ok(None),
        }
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(draft_key(session_id))
            .await
            .map_err(|e| AppError::DraftStore(format!("DEL failed: {e}")))?;
        Ok(())
    }
}
