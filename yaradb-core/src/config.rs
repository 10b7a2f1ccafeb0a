// yaradb-core/src/config.rs
// Data directory resolution and on-disk file names

use std::env;
use std::path::{Path, PathBuf};

/// Default snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "yaradb_storage.json";

/// Default WAL file name inside the data directory
pub const WAL_FILE: &str = "yaradb_wal";

const DATA_DIR_ENV: &str = "DATA_DIR";

/// Where the snapshot and WAL files live.
///
/// Both files sit directly inside `data_dir`. `from_env` honors the
/// `DATA_DIR` environment variable and falls back to the current
/// directory.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub data_dir: PathBuf,
}

impl DbConfig {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        DbConfig {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn from_env() -> Self {
        let dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| ".".to_string());
        DbConfig::new(dir)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join(WAL_FILE)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::from_env()
    }
}
