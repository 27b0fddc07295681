//! Session-scoped translation cache
//!
//! Entries live for one browsing session: they are written once after a
//! successful fetch and never expire while the session lasts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use md5::compute;
use redb::{Database, TableDefinition};
use uuid::Uuid;

use crate::shared::error::{AppError, AppResult};

const CACHE_TABLE: TableDefinition<[u8; 16], &str> = TableDefinition::new("translator_session_cache");
const DERIVED_KEY_PREFIX: &str = "translate_";
const DERIVED_KEY_CHARS: usize = 50;

/// Key/value store for translations fetched during the current session.
pub trait TranslationCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Explicit key if one was given, otherwise `translate_` plus the first 50
/// characters of the source text.
pub fn derive_cache_key(explicit: Option<&str>, source_text: &str) -> String {
    match explicit.filter(|k| !k.is_empty()) {
        Some(key) => key.to_string(),
        None => {
            let prefix: String = source_text.chars().take(DERIVED_KEY_CHARS).collect();
            format!("{}{}", DERIVED_KEY_PREFIX, prefix)
        }
    }
}

/// In-memory cache; dropping it (or calling `clear`) ends the session.
#[derive(Default)]
pub struct SessionCache {
    entries: RwLock<HashMap<String, String>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl TranslationCache for SessionCache {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.read() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => {
                tracing::warn!(key, "session cache poisoned, treating as miss");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
            }
            Err(_) => tracing::warn!(key, "session cache poisoned, dropping write"),
        }
    }
}

/// Cache backed by a redb file that only exists for the lifetime of the
/// session. The file is removed when the cache is dropped.
pub struct RedbSessionCache {
    // Taken in `drop` so the file is closed before it is removed.
    db: Option<Database>,
    path: PathBuf,
    session_id: Uuid,
}

impl RedbSessionCache {
    /// Opens a fresh session file in the system temp dir.
    pub fn new() -> AppResult<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    pub fn create_in(dir: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(dir)?;
        let session_id = Uuid::new_v4();
        let path = dir.join(format!("menu_translator_{}.redb", session_id.simple()));
        let db = Database::create(&path)?;

        {
            let write_txn = db.begin_write()?;
            {
                let _table = write_txn.open_table(CACHE_TABLE)?;
            }
            write_txn.commit()?;
        }

        tracing::debug!(session = %session_id, path = %path.display(), "opened session cache");
        Ok(Self {
            db: Some(db),
            path,
            session_id,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn db(&self) -> AppResult<&Database> {
        self.db
            .as_ref()
            .ok_or_else(|| AppError::System("session cache already closed".to_string()))
    }

    fn hash_key(key: &str) -> [u8; 16] {
        compute(key.as_bytes()).0
    }

    fn load(&self, key: &str) -> AppResult<Option<String>> {
        let read_txn = self.db()?.begin_read()?;
        let table = read_txn.open_table(CACHE_TABLE)?;
        let value = table.get(Self::hash_key(key))?;
        Ok(value.map(|v| v.value().to_string()))
    }

    fn store(&self, key: &str, value: &str) -> AppResult<()> {
        let write_txn = self.db()?.begin_write()?;
        {
            let mut table = write_txn.open_table(CACHE_TABLE)?;
            table
                .insert(Self::hash_key(key), value)
                .map_err(|e| AppError::System(e.to_string()))?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl TranslationCache for RedbSessionCache {
    fn get(&self, key: &str) -> Option<String> {
        match self.load(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "session cache read failed, treating as miss");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.store(key, value) {
            tracing::warn!(key, error = %e, "session cache write failed");
        }
    }
}

impl Drop for RedbSessionCache {
    fn drop(&mut self) {
        drop(self.db.take());
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not remove session cache file");
        }
    }
}
