use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

/// Admin sessions keyed by token hash. Raw tokens only ever live in the
/// client's cookie. Sessions do not survive a restart.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, token: &str, expires_at: DateTime<Utc>) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            token_hash: hash_token(token),
            expires_at,
            created_at: now,
            last_used_at: now,
        };

        self.sessions
            .write()
            .await
            .insert(session.token_hash.clone(), session.clone());

        session
    }

    pub async fn find_by_token(&self, token: &str) -> Option<Session> {
        let token_hash = hash_token(token);
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&token_hash) {
            Some(session) if session.expires_at > now => {
                session.last_used_at = now;
                Some(session.clone())
            }
            Some(_) => {
                sessions.remove(&token_hash);
                None
            }
            None => None,
        }
    }

    pub async fn delete_by_token(&self, token: &str) {
        self.sessions.write().await.remove(&hash_token(token));
    }

    pub async fn cleanup_expired(&self) -> u64 {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        (before - sessions.len()) as u64
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn hash_token(token: &str) -> String {
    use sha2::{Sha256, Digest};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_find_by_token() {
        let store = SessionStore::new();
        let session = store.create("abc", Utc::now() + Duration::hours(1)).await;
        assert_ne!(session.token_hash, "abc");

        let found = store.find_by_token("abc").await.unwrap();
        assert_eq!(found.id, session.id);
        assert!(store.find_by_token("abd").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let store = SessionStore::new();
        store.create("old", Utc::now() - Duration::minutes(1)).await;
        store.create("new", Utc::now() + Duration::hours(1)).await;

        assert!(store.find_by_token("old").await.is_none());
        assert_eq!(store.len().await, 1);
        assert_eq!(store.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_delete_by_token() {
        let store = SessionStore::new();
        store.create("abc", Utc::now() + Duration::hours(1)).await;
        store.delete_by_token("abc").await;
        assert!(store.find_by_token("abc").await.is_none());
    }
}
