use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    domain::{content_type_for_path, Sort},
    error::{AppError, Result},
    repository::{locks::KeyedLocks, ExclusiveFeature, FallbackList, Record, Repository},
};

/// Which side of the store is serving requests right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Durable,
    Fallback,
}

/// Attachment bytes plus the metadata needed to serve them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentData {
    pub data: Vec<u8>,
    pub content_type: String,
    pub filename: String,
    pub size: i64,
}

/// Record storage for one record type.
///
/// Every operation first asks whether the durable repository answers. If it
/// does, the operation runs there; a failure or timeout on the way is logged
/// and the operation is redone against the in-process fallback list. The
/// caller only ever sees validation and not-found errors.
pub struct RecordStore<R: Record> {
    durable: Option<Arc<dyn Repository<R>>>,
    fallback: FallbackList<R>,
    timeout: Duration,
    legacy_root: Option<PathBuf>,
    featured_lock: Mutex<()>,
    record_locks: KeyedLocks,
}

impl<R: Record> RecordStore<R> {
    pub fn new(durable: Option<Arc<dyn Repository<R>>>, timeout: Duration) -> Self {
        Self {
            durable,
            fallback: FallbackList::new(),
            timeout,
            legacy_root: None,
            featured_lock: Mutex::new(()),
            record_locks: KeyedLocks::new(),
        }
    }

    /// A store backed by `repo`.
    pub fn with_durable<D>(repo: D, timeout: Duration) -> Self
    where
        D: Repository<R> + 'static,
    {
        let durable: Arc<dyn Repository<R>> = Arc::new(repo);
        Self::new(Some(durable), timeout)
    }

    /// A store with no durable side at all.
    pub fn in_memory() -> Self {
        Self::new(None, Duration::from_secs(3))
    }

    /// Directory that legacy path references are resolved against.
    pub fn with_legacy_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.legacy_root = Some(root.into());
        self
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Database(format!(
                "timed out after {} ms",
                self.timeout.as_millis()
            ))),
        }
    }

    fn fall_back(&self, op: &str, err: &AppError) {
        tracing::warn!(
            "{} {} failed on durable store, using fallback list: {}",
            R::KIND,
            op,
            err
        );
    }

    /// Returns the durable repository if it answers a ping in time.
    async fn active(&self) -> Option<&Arc<dyn Repository<R>>> {
        let durable = self.durable.as_ref()?;
        match self.bounded(durable.ping()).await {
            Ok(()) => Some(durable),
            Err(e) => {
                tracing::debug!("{} store unavailable: {}", R::KIND, e);
                None
            }
        }
    }

    pub async fn availability(&self) -> Availability {
        match self.active().await {
            Some(_) => Availability::Durable,
            None => Availability::Fallback,
        }
    }

    pub async fn using_durable(&self) -> bool {
        self.availability().await == Availability::Durable
    }

    pub async fn create(&self, draft: R::Draft) -> Result<R> {
        if let Some(durable) = self.active().await {
            let record = R::from_draft(Uuid::new_v4(), Utc::now(), draft)?;
            match self.bounded(durable.insert(&record)).await {
                Ok(()) => {
                    tracing::info!("Created {} {}", R::KIND, record.id());
                    return Ok(record);
                }
                Err(e) => {
                    self.fall_back("create", &e);
                    // A timed-out insert may still have committed.
                    if let Ok(Some(stored)) = self.bounded(durable.find_by_id(record.id())).await {
                        tracing::info!("Created {} {} (insert committed late)", R::KIND, stored.id());
                        return Ok(stored);
                    }
                    // The fallback copy carries a fallback id.
                    let mut record = record;
                    record.set_id(FallbackList::<R>::next_id());
                    return Ok(self.push_fallback(record).await);
                }
            }
        }

        let record = R::from_draft(FallbackList::<R>::next_id(), Utc::now(), draft)?;
        Ok(self.push_fallback(record).await)
    }

    async fn push_fallback(&self, record: R) -> R {
        self.fallback.push_front(record.clone()).await;
        tracing::info!("Created {} {} in fallback list", R::KIND, record.id());
        record
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<R> {
        if let Some(durable) = self.active().await {
            match self.bounded(durable.find_by_id(id)).await {
                Ok(found) => return found.ok_or_else(|| not_found::<R>()),
                Err(e) => self.fall_back("find_by_id", &e),
            }
        }

        self.fallback.find(id).await.ok_or_else(|| not_found::<R>())
    }

    pub async fn find_all(&self, sort: Sort) -> Result<Vec<R>> {
        let mut records = match self.active().await {
            Some(durable) => match self.bounded(durable.list()).await {
                Ok(records) => records,
                Err(e) => {
                    self.fall_back("find_all", &e);
                    self.fallback.all().await
                }
            },
            None => self.fallback.all().await,
        };

        R::order(&mut records, sort);
        Ok(records)
    }

    /// Merges `patch` into the stored record. The existing record, with its
    /// attachment, is re-read before merging so an update that carries no
    /// new file keeps the old one.
    pub async fn update(&self, id: Uuid, patch: R::Patch) -> Result<R> {
        // Same order as `unfeature`: featured lock first, then the record.
        let _featured = match R::EXCLUSIVE_FEATURE {
            true => Some(self.featured_lock.lock().await),
            false => None,
        };
        let _guard = self.record_locks.lock(id).await;

        if let Some(durable) = self.active().await {
            match self.bounded(durable.find_by_id(id)).await {
                Ok(None) => return Err(not_found::<R>()),
                Ok(Some(mut record)) => {
                    record.apply(patch)?;
                    match self.bounded(durable.replace(&record)).await {
                        Ok(true) => {
                            tracing::info!("Updated {} {}", R::KIND, id);
                            return Ok(record);
                        }
                        Ok(false) => return Err(not_found::<R>()),
                        Err(e) => {
                            self.fall_back("update", &e);
                            return Ok(self.keep_in_fallback(record).await);
                        }
                    }
                }
                Err(e) => self.fall_back("update", &e),
            }
        }

        let mut record = self.fallback.find(id).await.ok_or_else(|| not_found::<R>())?;
        record.apply(patch)?;
        self.replace_in_fallback(record).await
    }

    async fn replace_in_fallback(&self, record: R) -> Result<R> {
        if self.fallback.replace(record.clone()).await {
            tracing::info!("Updated {} {} in fallback list", R::KIND, record.id());
            Ok(record)
        } else {
            Err(not_found::<R>())
        }
    }

    /// A record read from the durable side whose write failed. The fallback
    /// list takes the merged copy so the change is not lost.
    async fn keep_in_fallback(&self, record: R) -> R {
        self.fallback.upsert(record.clone()).await;
        tracing::info!("Kept {} {} in fallback list", R::KIND, record.id());
        record
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let _guard = self.record_locks.lock(id).await;

        if let Some(durable) = self.active().await {
            match self.bounded(durable.delete(id)).await {
                Ok(true) => {
                    tracing::info!("Deleted {} {}", R::KIND, id);
                    return Ok(());
                }
                Ok(false) => return Err(not_found::<R>()),
                Err(e) => self.fall_back("delete", &e),
            }
        }

        if self.fallback.remove(id).await {
            tracing::info!("Deleted {} {} from fallback list", R::KIND, id);
            Ok(())
        } else {
            Err(not_found::<R>())
        }
    }

    /// The record's attachment, or the file its legacy path points at.
    pub async fn get_attachment(&self, id: Uuid) -> Result<AttachmentData> {
        let record = self.find_by_id(id).await?;

        if let Some(attachment) = record.attachment() {
            return Ok(AttachmentData {
                data: attachment.data.clone(),
                content_type: attachment.content_type.clone(),
                filename: attachment.filename.clone(),
                size: attachment.size,
            });
        }

        match record.legacy_path() {
            Some(path) => self.read_legacy(path).await,
            None => Err(AppError::NoAttachment),
        }
    }

    async fn read_legacy(&self, path: &str) -> Result<AttachmentData> {
        let root = self.legacy_root.as_deref().ok_or(AppError::NoAttachment)?;
        let full = resolve_legacy_path(root, path).ok_or(AppError::NoAttachment)?;

        let data = match tokio::fs::read(&full).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Legacy {} file {} unreadable: {}", R::KIND, full.display(), e);
                return Err(AppError::NoAttachment);
            }
        };

        let filename = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        Ok(AttachmentData {
            size: data.len() as i64,
            content_type: content_type_for_path(path).to_string(),
            filename,
            data,
        })
    }

    /// Records currently held in the fallback list.
    pub async fn fallback_len(&self) -> usize {
        self.fallback.len().await
    }
}

impl<R: ExclusiveFeature> RecordStore<R> {
    /// Makes `id` the only featured record. Calls are serialized per store so
    /// concurrent requests cannot leave zero or two records featured.
    pub async fn set_featured(&self, id: Uuid) -> Result<R> {
        let _featured = self.featured_lock.lock().await;

        if let Some(durable) = self.active().await {
            match self.bounded(durable.set_featured_exclusive(id)).await {
                Ok(true) => {
                    tracing::info!("Featured {} {}", R::KIND, id);
                    return self.find_by_id(id).await;
                }
                Ok(false) => return Err(not_found::<R>()),
                Err(e) => self.fall_back("set_featured", &e),
            }
        }

        if !self.fallback.set_featured_exclusive(id).await {
            return Err(not_found::<R>());
        }
        tracing::info!("Featured {} {} in fallback list", R::KIND, id);
        self.fallback.find(id).await.ok_or_else(|| not_found::<R>())
    }

    pub async fn unfeature(&self, id: Uuid) -> Result<R> {
        let _featured = self.featured_lock.lock().await;
        let _guard = self.record_locks.lock(id).await;

        if let Some(durable) = self.active().await {
            match self.bounded(durable.find_by_id(id)).await {
                Ok(None) => return Err(not_found::<R>()),
                Ok(Some(mut record)) => {
                    record.set_featured(false);
                    match self.bounded(durable.replace(&record)).await {
                        Ok(true) => return Ok(record),
                        Ok(false) => return Err(not_found::<R>()),
                        Err(e) => {
                            self.fall_back("unfeature", &e);
                            return Ok(self.keep_in_fallback(record).await);
                        }
                    }
                }
                Err(e) => self.fall_back("unfeature", &e),
            }
        }

        let mut record = self.fallback.find(id).await.ok_or_else(|| not_found::<R>())?;
        record.set_featured(false);
        self.replace_in_fallback(record).await
    }
}

fn not_found<R: Record>() -> AppError {
    AppError::NotFound(format!("{} not found", capitalize(R::KIND)))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Joins a stored relative path onto `root`, refusing anything that would
/// climb out of it.
fn resolve_legacy_path(root: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    Some(root.join(relative))
}
