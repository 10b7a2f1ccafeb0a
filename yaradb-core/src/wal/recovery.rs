// wal/recovery.rs
// Startup path: snapshot load and idempotent WAL replay

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use super::WalOp;
use crate::document::{Document, StoredDocument};
use crate::error::Result;
use crate::state::DbState;
use crate::table::Table;

/// Load the snapshot file into a fresh state.
///
/// Accepts the current object shape (`{"tables": [...], "documents":
/// [...]}`) and the legacy bare-array-of-documents shape. Individually
/// malformed entries are logged and skipped. After loading, per-table
/// document counts are recomputed and declared indexes are materialized
/// and rebuilt from the live documents.
pub fn load_snapshot(path: &Path) -> Result<DbState> {
    let mut state = DbState::new();

    if !path.exists() {
        info!(path = %path.display(), "no snapshot file, starting with an empty database");
        return Ok(state);
    }

    let raw: Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    match raw {
        Value::Array(items) => {
            info!("legacy snapshot shape detected, loading documents only");
            for item in items {
                match serde_json::from_value::<Document>(item) {
                    Ok(doc) => state.insert_document(StoredDocument::Standard(doc)),
                    Err(err) => warn!(%err, "skipping invalid legacy document"),
                }
            }
        }
        Value::Object(mut top) => {
            if let Some(Value::Array(tables)) = top.remove("tables") {
                for item in tables {
                    match serde_json::from_value::<Table>(item) {
                        Ok(table) => {
                            state.tables.insert(table.name.clone(), table);
                        }
                        Err(err) => warn!(%err, "skipping invalid table entry"),
                    }
                }
            }
            if let Some(Value::Array(documents)) = top.remove("documents") {
                for item in documents {
                    match serde_json::from_value::<StoredDocument>(item) {
                        Ok(doc) => state.insert_document(doc),
                        Err(err) => warn!(%err, "skipping invalid document entry"),
                    }
                }
            }
        }
        _ => warn!("snapshot top level is neither object nor array, ignoring"),
    }

    state.recount_documents();
    state.install_declared_indexes();
    state.rebuild_all_indexes();

    info!(
        tables = state.tables.len(),
        documents = state.document_count(),
        "snapshot loaded"
    );
    Ok(state)
}

/// Replay the WAL line by line against the given state.
///
/// Records that fail to parse or whose effect is already present are
/// logged and skipped; replay never aborts and never writes to the WAL.
/// All live indexes are rebuilt afterwards, which also covers indexes
/// declared by replayed `create_index` records.
pub fn replay_wal(path: &Path, state: &mut DbState) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let reader = BufReader::new(File::open(path)?);
    let mut applied = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(line = line_no + 1, %err, "unreadable WAL line, stopping replay");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<WalOp>(&line) {
            Ok(op) => {
                if apply_op(state, op) {
                    applied += 1;
                }
            }
            Err(err) => warn!(line = line_no + 1, %err, "skipping malformed WAL record"),
        }
    }

    state.rebuild_all_indexes();
    info!(operations = applied, "WAL replay complete");
    Ok(applied)
}

/// Apply one WAL record to in-memory state.
///
/// Idempotent with respect to effects already present: a `create` for a
/// known id, an `update` that does not advance the version, an `archive`
/// of an archived document, a `create_index` that already exists and a
/// `drop_*` of a missing target are all skipped. Returns whether the
/// record changed state.
pub fn apply_op(state: &mut DbState, op: WalOp) -> bool {
    match op {
        WalOp::Create { doc } => {
            if state.contains_document(&doc.id) {
                return false;
            }
            let table_name = doc.table_data.name.clone();
            state.insert_document(StoredDocument::Standard(doc));
            if let Some(table) = state.tables.get_mut(&table_name) {
                table.documents_count += 1;
            }
            true
        }
        WalOp::CreateCombined { doc } => {
            if state.contains_document(&doc.id) {
                return false;
            }
            state.insert_document(StoredDocument::Combined(doc));
            true
        }
        WalOp::Update {
            doc_id,
            version,
            body,
            updated_at,
        } => match state.document_mut(&doc_id) {
            Some(StoredDocument::Standard(doc)) if doc.version < version => {
                doc.apply_update(body, version, updated_at);
                true
            }
            _ => false,
        },
        WalOp::Archive {
            doc_id,
            version,
            updated_at,
        } => {
            let Some(doc) = state.document_mut(&doc_id) else {
                return false;
            };
            if doc.is_archived() {
                return false;
            }
            let table_name = doc.table_name().map(str::to_string);
            doc.apply_archive(version, updated_at);
            if let Some(name) = table_name {
                if let Some(table) = state.tables.get_mut(&name) {
                    table.documents_count = table.documents_count.saturating_sub(1);
                }
            }
            true
        }
        WalOp::CreateTable { table } => {
            if state.tables.contains_key(&table.name) {
                return false;
            }
            state.tables.insert(table.name.clone(), table);
            true
        }
        WalOp::DropTable { name } => {
            state.table_indexes.remove(&name);
            state.tables.remove(&name).is_some()
        }
        WalOp::CreateIndex {
            table_name,
            field,
            index_type,
        } => {
            let Some(table) = state.tables.get_mut(&table_name) else {
                return false;
            };
            if table.indexes.contains_key(&field) {
                return false;
            }
            table.indexes.insert(field.clone(), index_type);
            let manager = state.ensure_index_manager(&table_name);
            if !manager.has_index(&field) {
                let _ = manager.create_index(&field, index_type);
            }
            true
        }
        WalOp::DropIndex { table_name, field } => {
            let declared = state
                .tables
                .get_mut(&table_name)
                .map(|table| table.indexes.remove(&field).is_some())
                .unwrap_or(false);
            let dropped = state
                .table_indexes
                .get_mut(&table_name)
                .map(|manager| manager.drop_index(&field))
                .unwrap_or(false);
            declared || dropped
        }
    }
}
