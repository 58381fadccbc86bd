//! Wheel persistence
//!
//! Partitions, players and the last session are stored as JSON documents
//! under fixed keys. Loading never fails: a missing entry yields the default
//! and a corrupt one is logged and replaced by the default.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rf_core::{Partition, Player, RfResult, default_partitions};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::session::SpinSession;

pub const PARTITIONS_KEY: &str = "wheel_partitions_v1";
pub const PLAYERS_KEY: &str = "wheel_players_v1";
pub const SESSION_KEY: &str = "wheel_session_v1";

/// String key/value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> RfResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RfResult<()>;
    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> RfResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════════
// BACKENDS
// ═══════════════════════════════════════════════════════════════════════════

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> RfResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RfResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RfResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created on first write
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> RfResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid store key '{key}'"),
            )
            .into());
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> RfResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> RfResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RfResult<()> {
        match fs::remove_file(self.path_for(key)?) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TYPED WHEEL STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Typed access to the wheel's persisted documents
pub struct WheelStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> WheelStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn load_or<T, F>(&self, key: &str, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback(),
            Err(e) => {
                log::error!("[WheelStore] Failed to read '{}': {}", key, e);
                return fallback();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::error!("[WheelStore] Corrupt '{}', using defaults: {}", key, e);
                fallback()
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> RfResult<()> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)
    }

    /// Stored partitions, or the default set
    pub fn load_partitions(&self) -> Vec<Partition> {
        self.load_or(PARTITIONS_KEY, default_partitions)
    }

    pub fn save_partitions(&self, partitions: &[Partition]) -> RfResult<()> {
        self.save(PARTITIONS_KEY, partitions)
    }

    /// Stored players, or none
    pub fn load_players(&self) -> Vec<Player> {
        self.load_or(PLAYERS_KEY, Vec::new)
    }

    pub fn save_players(&self, players: &[Player]) -> RfResult<()> {
        self.save(PLAYERS_KEY, players)
    }

    /// Last session, always at rest. An invalid stored rotation yields a
    /// fresh session.
    pub fn load_session(&self) -> SpinSession {
        let stored: SpinSession = self.load_or(SESSION_KEY, SpinSession::new);
        SpinSession::restore(stored.rotation_degrees, stored.winner).unwrap_or_else(|e| {
            log::error!("[WheelStore] Discarding stored session: {}", e);
            SpinSession::new()
        })
    }

    /// Persist the session. A spin in flight is saved as its landing state
    /// at rest.
    pub fn save_session(&self, session: &SpinSession) -> RfResult<()> {
        let at_rest = SpinSession {
            is_spinning: false,
            ..session.clone()
        };
        self.save(SESSION_KEY, &at_rest)
    }

    /// Forget everything stored
    pub fn clear(&self) -> RfResult<()> {
        for key in [PARTITIONS_KEY, PLAYERS_KEY, SESSION_KEY] {
            self.backend.remove(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::ColorToken;

    #[test]
    fn test_defaults_when_empty() {
        let store = WheelStore::new(MemoryStore::new());
        assert_eq!(store.load_partitions(), default_partitions());
        assert!(store.load_players().is_empty());
        assert_eq!(store.load_session(), SpinSession::new());
    }

    #[test]
    fn test_save_and_load() {
        let store = WheelStore::new(MemoryStore::new());
        let partitions = vec![Partition::new("a", "Alpha", ColorToken::cycled(0))];
        let mut player = Player::new("p1", "Ana");
        player.score = 4;

        store.save_partitions(&partitions).unwrap();
        store.save_players(std::slice::from_ref(&player)).unwrap();
        store
            .save_session(&SpinSession {
                rotation_degrees: 1830.0,
                is_spinning: true,
                winner: Some(partitions[0].clone()),
            })
            .unwrap();

        assert_eq!(store.load_partitions(), partitions);
        assert_eq!(store.load_players(), vec![player]);
        let session = store.load_session();
        assert_eq!(session.rotation_degrees, 1830.0);
        assert!(!session.is_spinning);
        assert_eq!(session.winner.unwrap().id, "a");
    }

    #[test]
    fn test_corrupt_entries_fall_back() {
        let backend = MemoryStore::new();
        backend.set(PARTITIONS_KEY, "{not json").unwrap();
        backend.set(PLAYERS_KEY, "42").unwrap();
        backend
            .set(SESSION_KEY, r#"{"rotation_degrees":-5.0,"is_spinning":false,"winner":null}"#)
            .unwrap();

        let store = WheelStore::new(backend);
        assert_eq!(store.load_partitions(), default_partitions());
        assert!(store.load_players().is_empty());
        assert_eq!(store.load_session(), SpinSession::new());
    }

    #[test]
    fn test_legacy_text_field() {
        let backend = MemoryStore::new();
        backend
            .set(
                PARTITIONS_KEY,
                r##"[{"id":"1","text":"+2","icon":"✌️","color":"#FF5555"}]"##,
            )
            .unwrap();
        let partitions = WheelStore::new(backend).load_partitions();
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].label, "+2");
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileStore::new(dir.path().join("wheel"));

        assert_eq!(backend.get(PLAYERS_KEY).unwrap(), None);
        backend.remove(PLAYERS_KEY).unwrap();

        backend.set(PLAYERS_KEY, "[]").unwrap();
        assert!(dir.path().join("wheel").join("wheel_players_v1.json").exists());
        assert_eq!(backend.get(PLAYERS_KEY).unwrap().as_deref(), Some("[]"));

        backend.remove(PLAYERS_KEY).unwrap();
        assert_eq!(backend.get(PLAYERS_KEY).unwrap(), None);

        assert!(backend.set("../escape", "x").is_err());
        assert!(backend.get("").is_err());
    }

    #[test]
    fn test_file_backed_wheel_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = WheelStore::new(FileStore::new(dir.path()));
        let mut partitions = default_partitions();
        partitions.truncate(5);
        store.save_partitions(&partitions).unwrap();

        let reopened = WheelStore::new(FileStore::new(dir.path()));
        assert_eq!(reopened.load_partitions(), partitions);

        reopened.clear().unwrap();
        assert_eq!(reopened.load_partitions(), default_partitions());
    }
}
