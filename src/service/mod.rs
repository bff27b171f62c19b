use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::{
    auth::AuthService,
    config::Settings,
    domain::{Announcement, Event, Message},
    error::Result,
    repository::*,
};

/// Everything the handlers reach through `AppState`.
pub struct ServiceContext {
    pub message_store: Arc<RecordStore<Message>>,
    pub event_store: Arc<RecordStore<Event>>,
    pub announcement_store: Arc<RecordStore<Announcement>>,
    pub auth_service: Arc<AuthService>,
}

impl ServiceContext {
    pub fn new(
        message_store: Arc<RecordStore<Message>>,
        event_store: Arc<RecordStore<Event>>,
        announcement_store: Arc<RecordStore<Announcement>>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            message_store,
            event_store,
            announcement_store,
            auth_service,
        }
    }

    /// Wires the three stores to the pool, or to fallback lists only when no
    /// pool is given.
    pub fn from_settings(pool: Option<SqlitePool>, settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_millis(settings.database.timeout_ms);
        let legacy_root = settings.uploads.legacy_dir.clone();

        let (messages, events, announcements) = match pool {
            Some(pool) => (
                RecordStore::with_durable(SqliteMessageRepository::new(pool.clone()), timeout),
                RecordStore::with_durable(SqliteEventRepository::new(pool.clone()), timeout),
                RecordStore::with_durable(SqliteAnnouncementRepository::new(pool), timeout),
            ),
            None => (
                RecordStore::new(None, timeout),
                RecordStore::new(None, timeout),
                RecordStore::new(None, timeout),
            ),
        };

        Ok(Self::new(
            Arc::new(messages.with_legacy_root(&legacy_root)),
            Arc::new(events.with_legacy_root(&legacy_root)),
            Arc::new(announcements.with_legacy_root(&legacy_root)),
            Arc::new(AuthService::new(&settings.auth)?),
        ))
    }

    /// Whether the durable database is serving requests right now.
    pub async fn using_durable_store(&self) -> bool {
        self.message_store.using_durable().await
    }
}
