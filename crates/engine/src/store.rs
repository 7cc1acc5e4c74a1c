//! Durable storage for the ledger document.
//!
//! The whole ledger is one JSON document (`{"transactions": [...]}`),
//! rewritten on every change. [`LedgerStore`] is the single serialization
//! point: every load-mutate-save runs while holding its lock, so two
//! concurrent commands can never overwrite each other's transaction.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex as StdMutex},
};

use tokio::sync::Mutex;

use crate::{Ledger, LoadError, StoreError};

/// A medium able to hold one ledger document.
pub trait Storage: Send + Sync {
    fn load(&self) -> Result<Ledger, StoreError>;

    /// Persists the full ledger. Either everything is written or the previous
    /// document stays in place.
    fn save(&self, ledger: &Ledger) -> Result<(), StoreError>;
}

/// Ledger kept in a pretty-printed JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Ledger, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            // First run: nothing recorded yet.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Ledger::default()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(StoreError::Decode)
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(ledger).map_err(StoreError::Encode)?;
        write_atomically(&self.path, json.as_bytes()).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}

/// Ledger kept in process memory. Lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    ledger: StdMutex<Ledger>,
}

impl MemoryStorage {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: StdMutex::new(ledger),
        }
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Ledger, StoreError> {
        Ok(self
            .ledger
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let mut guard = self
            .ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = ledger.clone();
        Ok(())
    }
}

/// Shared handle over a [`Storage`] backend.
///
/// Cloning is cheap; clones share the backend and the lock.
#[derive(Clone)]
pub struct LedgerStore {
    storage: Arc<dyn Storage>,
    lock: Arc<Mutex<()>>,
}

impl LedgerStore {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileStorage::new(path))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// Reads the current ledger. On failure the error carries an empty
    /// fallback ledger for callers that render something anyway.
    pub async fn snapshot(&self) -> Result<Ledger, LoadError> {
        let _guard = self.lock.lock().await;
        self.storage.load().map_err(LoadError::new)
    }

    /// Loads, applies `f` and saves, all under the store lock.
    ///
    /// Nothing is saved when `f` fails. Otherwise its value is returned only
    /// after the save succeeded.
    pub async fn update<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Ledger) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut ledger = self.storage.load()?;
        let out = f(&mut ledger)?;
        self.storage.save(&ledger)?;
        Ok(out)
    }

    /// Overwrites the stored ledger without reading it first.
    pub async fn replace(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.storage.save(ledger)
    }
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Money, TransactionKind};

    #[tokio::test]
    async fn update_persists_and_returns_closure_value() {
        let store = LedgerStore::in_memory();
        let count = store
            .update(|ledger| {
                ledger.push(TransactionKind::Inflow, Money::major(5), Utc::now());
                Ok::<_, StoreError>(ledger.len())
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.snapshot().await.unwrap().total().unwrap(), Money::major(5));
    }

    #[tokio::test]
    async fn failed_update_saves_nothing() {
        let store = LedgerStore::in_memory();
        let result: Result<(), crate::DispatchError> = store
            .update(|ledger| {
                ledger.push(TransactionKind::Inflow, Money::major(5), Utc::now());
                Err(crate::ValidationError::NotPositive(Money::ZERO).into())
            })
            .await;
        assert!(result.is_err());
        assert!(store.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_overwrites_everything() {
        let store = LedgerStore::new(MemoryStorage::new(
            Ledger::new().append(TransactionKind::Outflow, Money::major(3), Utc::now()),
        ));
        store.replace(&Ledger::new()).await.unwrap();
        assert!(store.snapshot().await.unwrap().is_empty());
    }
}
