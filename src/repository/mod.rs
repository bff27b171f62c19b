use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Attachment, Sort};
use crate::error::Result;

pub mod message_repository;
pub mod event_repository;
pub mod announcement_repository;
pub mod fallback;
pub mod locks;
pub mod store;

pub use message_repository::SqliteMessageRepository;
pub use event_repository::SqliteEventRepository;
pub use announcement_repository::SqliteAnnouncementRepository;
pub use fallback::FallbackList;
pub use store::{AttachmentData, Availability, RecordStore};

/// A record type the store can hold: messages, events, announcements.
pub trait Record: Clone + Send + Sync + 'static {
    /// Input for `create`, validated by `from_draft`.
    type Draft: Send;
    /// Input for `update`, merged by `apply`.
    type Patch: Send;

    /// Lowercase noun used in logs and error messages.
    const KIND: &'static str;

    /// True for types implementing `ExclusiveFeature`. Updates of such
    /// records write the featured flag back, so they share the featured lock.
    const EXCLUSIVE_FEATURE: bool = false;

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
    fn created_at(&self) -> DateTime<Utc>;

    /// Builds and validates a new record. The store supplies the identity.
    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: Self::Draft) -> Result<Self>;

    /// Merges a patch, then re-validates the whole record. On error the
    /// record may be partially modified, so callers apply patches to a copy.
    fn apply(&mut self, patch: Self::Patch) -> Result<()>;

    fn attachment(&self) -> Option<&Attachment>;
    fn legacy_path(&self) -> Option<&str>;

    fn featured(&self) -> bool;
    fn set_featured(&mut self, featured: bool);

    fn order(records: &mut [Self], sort: Sort);
}

/// Record types where at most one record may be featured at a time.
pub trait ExclusiveFeature: Record {}

/// The durable side of a `RecordStore`.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Cheap round trip proving the backend answers.
    async fn ping(&self) -> Result<()>;
    async fn insert(&self, record: &R) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>>;
    async fn list(&self) -> Result<Vec<R>>;
    /// Overwrites the stored record with the same id. `false` if absent.
    async fn replace(&self, record: &R) -> Result<bool>;
    /// `false` if absent.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Clears the flag everywhere and sets it on `id`. `false` (with nothing
    /// changed) if `id` is absent. Backends that can should do this in one
    /// transaction.
    async fn set_featured_exclusive(&self, id: Uuid) -> Result<bool> {
        let Some(mut target) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        for mut record in self.list().await? {
            if record.featured() && record.id() != id {
                record.set_featured(false);
                self.replace(&record).await?;
            }
        }
        target.set_featured(true);
        self.replace(&target).await
    }
}

/// Rebuilds an attachment from its columns. A missing column means there is
/// no attachment.
pub(crate) fn attachment_from_columns(
    content_type: Option<String>,
    filename: Option<String>,
    size: Option<i64>,
    data: Option<Vec<u8>>,
) -> Option<Attachment> {
    match (content_type, filename, size, data) {
        (Some(content_type), Some(filename), Some(size), Some(data)) => Some(Attachment {
            content_type,
            filename,
            size,
            data,
        }),
        _ => None,
    }
}

pub(crate) fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| crate::error::AppError::Database(e.to_string()))
}
