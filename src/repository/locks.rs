use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per record id, created on demand.
///
/// Entries are dropped once no guard or waiter holds them, so the table only
/// grows with the number of ids being written concurrently.
#[derive(Default)]
pub struct KeyedLocks {
    table: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

pub struct KeyGuard<'a> {
    owner: &'a KeyedLocks,
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, id: Uuid) -> KeyGuard<'_> {
        let entry = {
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            table.entry(id).or_default().clone()
        };
        let guard = entry.lock_owned().await;
        KeyGuard {
            owner: self,
            id,
            guard: Some(guard),
        }
    }

    /// Ids currently tracked.
    pub fn tracked(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut table = self.owner.table.lock().unwrap_or_else(|e| e.into_inner());
        // Only the table holds it now: nobody is waiting.
        if table.get(&self.id).is_some_and(|m| Arc::strong_count(m) == 1) {
            table.remove(&self.id);
        }
    }
}
