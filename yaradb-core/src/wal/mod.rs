// wal/mod.rs
// Append-only operation log, snapshot checkpoint, wipe

mod op;
pub mod recovery;

pub use op::WalOp;
pub use recovery::{apply_op, load_snapshot, replay_wal};

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::config::DbConfig;
use crate::document::StoredDocument;
use crate::error::{Result, YaraDbError};
use crate::table::Table;

/// On-disk snapshot document: the complete persisted state.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub tables: Vec<Table>,
    pub documents: Vec<StoredDocument>,
}

/// The durable side of the store: WAL file plus snapshot file.
///
/// Single writer. The internal mutex guards the file descriptors and the
/// snapshot swap; callers that also hold the state mutex must acquire it
/// first (lock order: state, then WAL).
pub struct Wal {
    snapshot_path: PathBuf,
    wal_path: PathBuf,
    lock: Mutex<()>,
}

impl Wal {
    pub fn new(config: &DbConfig) -> Self {
        Wal {
            snapshot_path: config.snapshot_path(),
            wal_path: config.wal_path(),
            lock: Mutex::new(()),
        }
    }

    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Append one operation record: write the line, flush, fsync.
    ///
    /// A mutation counts as committed only once this returns Ok; on error
    /// the caller must not touch in-memory state. The blocking file I/O
    /// runs on a worker thread so the task loop is never stalled.
    pub async fn append(&self, op: &WalOp) -> Result<()> {
        let mut line = serde_json::to_string(op).map_err(|err| {
            YaraDbError::Durability(format!("failed to encode WAL record: {err}"))
        })?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        let path = self.wal_path.clone();
        tokio::task::spawn_blocking(move || write_wal_line(&path, line.as_bytes()))
            .await
            .map_err(|err| YaraDbError::Durability(format!("WAL writer task failed: {err}")))?
            .map_err(|err| YaraDbError::Durability(format!("WAL write failed: {err}")))
    }

    /// Write a fresh snapshot and truncate the WAL.
    ///
    /// The caller holds the state mutex, so the snapshot is a consistent
    /// point in time and no mutation can slip between the rename and the
    /// truncate. The temp file lands next to the snapshot and is renamed
    /// over it atomically.
    pub async fn checkpoint(&self, snapshot: Snapshot) -> Result<()> {
        let _guard = self.lock.lock().await;
        let snapshot_path = self.snapshot_path.clone();
        let wal_path = self.wal_path.clone();

        tokio::task::spawn_blocking(move || write_checkpoint(&snapshot_path, &wal_path, &snapshot))
            .await
            .map_err(|err| YaraDbError::Durability(format!("checkpoint task failed: {err}")))??;

        info!("checkpoint complete");
        Ok(())
    }

    /// Truncate the WAL and overwrite the snapshot with an empty state.
    /// Part of `wipe_all_data`; runs under the caller-held state mutex.
    pub async fn wipe(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        let snapshot_path = self.snapshot_path.clone();
        let wal_path = self.wal_path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            truncate_file(&wal_path)?;
            let file = File::create(&snapshot_path)?;
            serde_json::to_writer(&file, &Snapshot::default())?;
            file.sync_all()?;
            Ok(())
        })
        .await
        .map_err(|err| YaraDbError::Durability(format!("wipe task failed: {err}")))?
    }
}

fn write_wal_line(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

fn write_checkpoint(snapshot_path: &Path, wal_path: &Path, snapshot: &Snapshot) -> Result<()> {
    let mut tmp_path = snapshot_path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let file = File::create(&tmp_path)?;
    serde_json::to_writer(&file, snapshot)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&tmp_path, snapshot_path)?;
    truncate_file(wal_path)?;
    Ok(())
}

fn truncate_file(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.sync_all()
}
