//! Configuration for opening a cache

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use runecache_crypto::XteaKeyStore;
use tracing::info;

use crate::backend::CacheStorage;
use crate::{Dat2Storage, FlatStorage, Result, StorageError};

/// Storage layout of a cache directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `<root>/<index>/<file>` tree
    Flat,
    /// `main_file_cache.dat2` with `.idxN` files
    #[default]
    Dat2,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Dat2 => f.write_str("dat2"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "dat2" => Ok(Self::Dat2),
            other => Err(StorageError::Config(format!("unknown backend '{other}'"))),
        }
    }
}

/// Configuration for opening a cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Cache directory
    pub path: PathBuf,

    /// Storage layout
    pub backend: BackendKind,

    /// XTEA key file (`.json` key list or plain text)
    pub key_file: Option<PathBuf>,

    /// Keep decoded reference tables in memory
    pub memoize_tables: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./cache"),
            backend: BackendKind::default(),
            key_file: None,
            memoize_tables: true,
        }
    }
}

impl StorageConfig {
    /// Create a new configuration for the cache at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            StorageError::Config(format!("{}: {e}", path.as_ref().display()))
        })
    }

    /// Set the cache directory
    #[must_use]
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Set the storage layout
    #[must_use]
    pub const fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the key file
    #[must_use]
    pub fn with_key_file<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        self.key_file = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Enable or disable reference table memoisation
    #[must_use]
    pub const fn with_memoize_tables(mut self, enable: bool) -> Self {
        self.memoize_tables = enable;
        self
    }

    /// Open the configured backend
    pub fn open_storage(&self) -> Result<Box<dyn CacheStorage>> {
        info!("Opening {} cache at {}", self.backend, self.path.display());
        Ok(match self.backend {
            BackendKind::Flat => Box::new(FlatStorage::open(&self.path)?),
            BackendKind::Dat2 => Box::new(Dat2Storage::open(&self.path)?),
        })
    }

    /// Load the configured key file, or an empty store without one
    pub fn load_keys(&self) -> Result<XteaKeyStore> {
        let mut store = XteaKeyStore::new();
        let Some(path) = &self.key_file else {
            return Ok(store);
        };

        let content = std::fs::read_to_string(path)?;
        let loaded = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            store.load_from_json(&content)?
        } else {
            store.load_from_txt(&content)
        };

        info!("Loaded {} XTEA keys from {}", loaded, path.display());
        Ok(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder() {
        let config = StorageConfig::new("/tmp/cache")
            .with_backend(BackendKind::Flat)
            .with_key_file(Some("keys.json"))
            .with_memoize_tables(false);

        assert_eq!(config.path, PathBuf::from("/tmp/cache"));
        assert_eq!(config.backend, BackendKind::Flat);
        assert_eq!(config.key_file, Some(PathBuf::from("keys.json")));
        assert!(!config.memoize_tables);
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("DAT2".parse::<BackendKind>().unwrap(), BackendKind::Dat2);
        assert_eq!("flat".parse::<BackendKind>().unwrap(), BackendKind::Flat);
        assert!("zip".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Flat.to_string(), "flat");
    }

    #[test]
    fn test_json_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("runecache.json");
        std::fs::write(&path, r#"{ "path": "/srv/cache", "backend": "flat" }"#).unwrap();

        let config = StorageConfig::load(&path).unwrap();
        assert_eq!(config.path, PathBuf::from("/srv/cache"));
        assert_eq!(config.backend, BackendKind::Flat);
        assert!(config.memoize_tables);

        let json = serde_json::to_string(&config).unwrap();
        let parsed: StorageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let json = temp_dir.path().join("keys.json");
        std::fs::write(&json, r#"[{"archive": 5, "group": 1, "key": [1, 2, 3, 4]}]"#).unwrap();
        let txt = temp_dir.path().join("keys.txt");
        std::fs::write(&txt, "5 2 1 2 3 4\n5 3 5 6 7 8\n").unwrap();

        let store = StorageConfig::default().with_key_file(Some(&json)).load_keys().unwrap();
        assert_eq!(store.len(), 1);

        let store = StorageConfig::default().with_key_file(Some(&txt)).load_keys().unwrap();
        assert_eq!(store.len(), 2);

        assert!(StorageConfig::default().load_keys().unwrap().is_empty());
    }
}
