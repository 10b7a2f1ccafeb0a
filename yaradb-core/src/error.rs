// yaradb-core/src/error.rs
// Error sum type for the storage core

use thiserror::Error;

/// Errors surfaced by the storage core.
///
/// The first five variants are the contract the network adapter maps onto
/// status codes (404 / 409 / 400 / 400 / 500); `Io` and `Serialization`
/// only appear on startup and checkpoint paths.
#[derive(Debug, Error)]
pub enum YaraDbError {
    /// Target id/name does not exist, or the target is archived
    #[error("not found: {0}")]
    NotFound(String),

    /// Version mismatch, duplicate unique field, duplicate table or index
    #[error("conflict: {0}")]
    Conflict(String),

    /// Schema check failed or operation constraints violated
    #[error("validation failed: {0}")]
    Validation(String),

    /// Mutation attempted on a read-only table
    #[error("table '{0}' is read-only")]
    ReadOnly(String),

    /// WAL write failed; the in-flight mutation was not applied
    #[error("durability failure: {0}")]
    Durability(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, YaraDbError>;

impl YaraDbError {
    /// True for errors raised before any WAL write (safe to retry as-is).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            YaraDbError::Validation(_) | YaraDbError::ReadOnly(_) | YaraDbError::Conflict(_)
        )
    }
}
