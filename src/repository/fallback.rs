use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repository::Record;

/// In-process stand-in for the database, used while it is unreachable.
///
/// Records are kept newest first. The list lives as long as the owning store
/// and is lost on restart.
pub struct FallbackList<R: Record> {
    records: RwLock<Vec<R>>,
}

impl<R: Record> Default for FallbackList<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> FallbackList<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Time-ordered id, so ids issued here sort by creation.
    pub fn next_id() -> Uuid {
        Uuid::now_v7()
    }

    pub async fn push_front(&self, record: R) {
        self.records.write().await.insert(0, record);
    }

    pub async fn find(&self, id: Uuid) -> Option<R> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    pub async fn all(&self) -> Vec<R> {
        self.records.read().await.clone()
    }

    pub async fn replace(&self, record: R) -> bool {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Replaces the record with the same id, or adds it at the front.
    pub async fn upsert(&self, record: R) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => records.insert(0, record),
        }
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        records.len() != before
    }

    /// Clears the flag everywhere and sets it on `id` under a single write
    /// lock. `false` with nothing changed if `id` is absent.
    pub async fn set_featured_exclusive(&self, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        if !records.iter().any(|r| r.id() == id) {
            return false;
        }
        for record in records.iter_mut() {
            let featured = record.id() == id;
            record.set_featured(featured);
        }
        true
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
