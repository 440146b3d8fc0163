//! In-memory refresh sessions.
//!
//! Tokens are random and opaque. Only their SHA-256 digest is kept, so a
//! dump of the table cannot be replayed.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use domains::errors::{DomainError, Result};
use domains::ports::SessionStore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

struct Session {
    user_id: String,
    expires_at: DateTime<Utc>,
}

pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    fn digest(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Drops sessions that expired before `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        before.saturating_sub(self.sessions.len())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn issue(&self, user_id: &str) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            Self::digest(&token),
            Session {
                user_id: user_id.to_owned(),
                expires_at: Utc::now() + self.ttl,
            },
        );
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<String> {
        let key = Self::digest(token);
        let now = Utc::now();
        let user_id = match self.sessions.get(&key) {
            Some(session) if session.expires_at > now => Some(session.user_id.clone()),
            Some(_) => None,
            None => return Err(DomainError::Unauthorized("unknown refresh token".into())),
        };
        match user_id {
            Some(user_id) => Ok(user_id),
            None => {
                self.sessions.remove(&key);
                Err(DomainError::Unauthorized("refresh token expired".into()))
            }
        }
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        self.sessions.remove(&Self::digest(token));
        Ok(())
    }
}
