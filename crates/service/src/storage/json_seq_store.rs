use std::{marker::PhantomData, path::PathBuf, sync::Arc};
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered sequence store.
///
/// Persists a `Vec<T>` to a JSON file as a pretty-printed array and provides
/// load-mutate-save helpers. The file is the source of truth: every call
/// re-reads it in full, and every mutation rewrites it in full. A single lock
/// per store serializes the read-modify-write cycles, so overlapping writers
/// in the same process cannot lose each other's updates. The write itself is
/// not atomic; a crash mid-write can leave a truncated file.
pub struct JsonSeqStore<T> {
    file_path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSeqStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty array if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let store = Self { file_path, lock: Mutex::new(()), _marker: PhantomData };
        if fs::metadata(&store.file_path).await.is_err() {
            store.save(&[]).await?;
        }
        Ok(Arc::new(store))
    }

    /// Read and decode the full sequence. A missing file is first run, not an
    /// error; anything unparseable is fatal.
    async fn load(&self) -> Result<Vec<T>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| ServiceError::Corrupt(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ServiceError::Io(e.to_string())),
        }
    }

    /// Serialize the full sequence back, overwriting prior contents.
    async fn save(&self, items: &[T]) -> Result<(), ServiceError> {
        let data =
            serde_json::to_vec_pretty(items).map_err(|e| ServiceError::Io(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Io(e.to_string()))?;
        debug!(path = %self.file_path.display(), count = items.len(), "persisted collection");
        Ok(())
    }

    /// Decode the current on-disk sequence under the lock.
    pub async fn snapshot(&self) -> Result<Vec<T>, ServiceError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Run one load-mutate-save cycle as a critical section.
    ///
    /// `f` mutates the decoded sequence; the full file is rewritten after it
    /// returns. If `f` fails, nothing is written back.
    pub async fn mutate<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        let out = f(&mut items)?;
        self.save(&items).await?;
        Ok(out)
    }
}
