use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use super::error::Result;
use super::loader::load_file;
use super::model::CleanedDataset;

/// Process-wide memo of cleaned datasets, keyed by the path they came from.
static DATASETS: LazyLock<DatasetCache> = LazyLock::new(DatasetCache::new);

/// Load a listings file at most once per process.
///
/// Later calls with the same path return the shared table without touching
/// the filesystem.
pub fn load_listings(path: &Path) -> Result<Arc<CleanedDataset>> {
    DATASETS.get_or_load(path)
}

/// Compute-once cells for cleaned datasets. Entries are never evicted and
/// are read-only once inserted; failed loads are not remembered.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, Arc<CleanedDataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, path: &Path) -> Result<Arc<CleanedDataset>> {
        self.get_or_load_with(path, load_file)
    }

    /// Return the cached dataset for `path`, running `load` on a miss.
    ///
    /// The lock is held while loading so concurrent callers for the same
    /// path never parse the file twice.
    pub fn get_or_load_with<F>(&self, path: &Path, load: F) -> Result<Arc<CleanedDataset>>
    where
        F: FnOnce(&Path) -> Result<CleanedDataset>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = entries.get(path) {
            log::debug!("Dataset cache hit for {}", path.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load(path)?);
        entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }
}

#[cfg(test)]
impl DatasetCache {
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
