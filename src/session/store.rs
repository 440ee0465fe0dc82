use redis::AsyncCommands;
use tracing::info;
use uuid::Uuid;

use crate::redis_client::RedisClient;
use crate::session::Session;

/// Redis-backed persistence for [`Session`], keyed by an opaque bearer token.
///
/// The web layer owns the token lifecycle; the session state machine never
/// sees the store.
#[derive(Clone)]
pub struct SessionStore {
    redis: RedisClient,
    ttl_seconds: u64,
}

impl SessionStore {
    pub fn new(redis: RedisClient, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }

    /// Persist a fresh session and return its token.
    pub async fn create(&self, session: &Session) -> Result<String, redis::RedisError> {
        let token = Uuid::new_v4().to_string();
        self.save(&token, session).await?;
        Ok(token)
    }

    pub async fn load(&self, token: &str) -> Result<Option<Session>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(Self::key(token)).await?;
        Ok(data.and_then(|d| serde_json::from_str(&d).ok()))
    }

    /// Write back a session, refreshing its TTL.
    pub async fn save(&self, token: &str, session: &Session) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(session).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex(Self::key(token), data, self.ttl_seconds).await
    }

    pub async fn delete(&self, token: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let _: () = conn.del(Self::key(token)).await?;
        info!("Session {} destroyed", token);
        Ok(())
    }
}
