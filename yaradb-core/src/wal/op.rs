// wal/op.rs
// The closed set of operations a WAL line can carry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::document::{CombinedDocument, Document};
use crate::table::{IndexKind, Table};

/// One durable operation record.
///
/// Encoded as a tagged JSON object (`{"op": "...", ...}`), one per WAL
/// line. The variants are the only mutations the store can replay, so the
/// WAL format is closed by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WalOp {
    Create {
        doc: Document,
    },
    CreateCombined {
        doc: CombinedDocument,
    },
    Update {
        doc_id: Uuid,
        /// The version the document holds after this update
        version: u64,
        body: Map<String, Value>,
        updated_at: DateTime<Utc>,
    },
    Archive {
        doc_id: Uuid,
        version: u64,
        updated_at: DateTime<Utc>,
    },
    CreateTable {
        table: Table,
    },
    DropTable {
        name: String,
    },
    CreateIndex {
        table_name: String,
        field: String,
        index_type: IndexKind,
    },
    DropIndex {
        table_name: String,
        field: String,
    },
}
