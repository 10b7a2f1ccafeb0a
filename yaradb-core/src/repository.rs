// yaradb-core/src/repository.rs
// The operation kernel: validation, WAL commit, in-memory apply, reads
//
// Every mutation follows the same shape: acquire the state mutex,
// validate against shared state, append the WAL record, apply the effect
// in memory, release. The WAL append and the apply run on a spawned task
// that owns the mutex guard, so a caller cancelled at a suspension point
// can never leave the log ahead of memory.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DbConfig;
use crate::document::{CombinedDocument, Document, StoredDocument};
use crate::error::{Result, YaraDbError};
use crate::index::IndexStats;
use crate::schema::validate_body;
use crate::state::DbState;
use crate::table::{CreateTableSpec, IndexKind, Table, TableMode, TableSettings, TableSummary};
use crate::value_utils::compare_for_sort;
use crate::wal::{self, Snapshot, Wal, WalOp};

/// How `combine_documents` folds source bodies together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Last write wins per top-level key
    Overwrite,
    /// Lists under the same key concatenate, everything else overwrites
    Append,
    /// Each source body lands under its own `doc_{i}_{name}` key
    Namespace,
}

impl FromStr for MergeStrategy {
    type Err = YaraDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "overwrite" => Ok(MergeStrategy::Overwrite),
            "append" => Ok(MergeStrategy::Append),
            "namespace" => Ok(MergeStrategy::Namespace),
            other => Err(YaraDbError::Validation(format!(
                "unknown merge strategy: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Options for `find_documents`.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub table_name: Option<String>,
    pub include_archived: bool,
    pub sort_by: Option<String>,
    pub order: SortOrder,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl FindQuery {
    pub fn new() -> Self {
        FindQuery::default()
    }

    pub fn in_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn with_archived(mut self, include_archived: bool) -> Self {
        self.include_archived = include_archived;
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.order = order;
        self
    }

    pub fn paginate(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

/// The storage core. One value owns the whole database; adapters share it
/// by cloning (the interior is reference-counted).
#[derive(Clone)]
pub struct Database {
    state: Arc<Mutex<DbState>>,
    wal: Arc<Wal>,
}

impl Database {
    /// Startup sequence: load the snapshot, replay the WAL, rebuild the
    /// live indexes. Blocking I/O; call before the serving loop starts.
    pub fn open(config: &DbConfig) -> Result<Self> {
        info!(data_dir = %config.data_dir.display(), "opening database");
        let wal = Wal::new(config);
        let mut state = wal::load_snapshot(wal.snapshot_path())?;
        wal::replay_wal(wal.wal_path(), &mut state)?;

        Ok(Database {
            state: Arc::new(Mutex::new(state)),
            wal: Arc::new(wal),
        })
    }

    /// Serialize the full current state and truncate the WAL. Held state
    /// mutex makes the snapshot a consistent point in time.
    pub async fn checkpoint(&self) -> Result<()> {
        let state = self.state.lock().await;
        let snapshot = Snapshot {
            tables: state.tables.values().cloned().collect(),
            documents: state.documents().to_vec(),
        };
        self.wal.checkpoint(snapshot).await
    }

    /// Shutdown: run a closing checkpoint.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutting down, running checkpoint");
        self.checkpoint().await
    }

    /// Committed half of every mutation: WAL append, then the in-memory
    /// apply. Runs on its own task holding the state guard, so it
    /// completes even if the calling future is dropped; a WAL failure
    /// aborts before any memory change.
    async fn commit<T, F>(
        &self,
        guard: OwnedMutexGuard<DbState>,
        op: WalOp,
        apply: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut DbState) -> T + Send + 'static,
        T: Send + 'static,
    {
        let wal = Arc::clone(&self.wal);
        let task = tokio::spawn(async move {
            let mut guard = guard;
            wal.append(&op).await?;
            Ok(apply(&mut guard))
        });
        task.await
            .map_err(|err| YaraDbError::Durability(format!("commit task failed: {err}")))?
    }

    // ========== DOCUMENT OPERATIONS ==========

    pub async fn create_document(
        &self,
        name: String,
        body: Map<String, Value>,
        table_name: String,
    ) -> Result<Document> {
        let mut guard = self.state.clone().lock_owned().await;

        if !guard.tables.contains_key(&table_name) {
            // Lazy creation is deliberately not WAL-logged; the table
            // becomes durable at the next checkpoint.
            guard
                .tables
                .insert(table_name.clone(), Table::new(table_name.clone()));
        }

        let table = &guard.tables[&table_name];
        if table.settings.read_only {
            return Err(YaraDbError::ReadOnly(table_name));
        }
        check_unique_fields(&guard, &table_name, &body, None)?;
        if let Some(schema) = &table.settings.schema {
            validate_body(schema, &body)?;
        }
        let doc = Document::new(name, body, table.table_ref());

        let created = doc.clone();
        let op = WalOp::Create { doc: doc.clone() };
        self.commit(guard, op, move |state| {
            if let Some(manager) = state.table_indexes.get_mut(&doc.table_data.name) {
                manager.add_document(doc.id, &doc.body);
            }
            if let Some(table) = state.tables.get_mut(&doc.table_data.name) {
                table.documents_count += 1;
            }
            state.insert_document(StoredDocument::Standard(doc));
        })
        .await?;

        Ok(created)
    }

    /// Fetch a live document of either variant; archived documents are
    /// invisible.
    pub async fn get_document(&self, doc_id: Uuid) -> Option<StoredDocument> {
        let state = self.state.lock().await;
        state
            .document(&doc_id)
            .filter(|doc| !doc.is_archived())
            .cloned()
    }

    /// Equality filter over the store, with an index fast-path for a
    /// single-clause filter on an indexed field of a named table.
    ///
    /// The candidate set from the index is still run through the full
    /// filter, so results never depend on whether an index exists.
    pub async fn find_documents(
        &self,
        filter: Map<String, Value>,
        query: FindQuery,
    ) -> Vec<StoredDocument> {
        let working: Vec<StoredDocument> = {
            let state = self.state.lock().await;
            match index_candidates(&state, &filter, &query) {
                Some(ids) => ids
                    .iter()
                    .filter_map(|id| state.document(id))
                    .cloned()
                    .collect(),
                None => state.documents().to_vec(),
            }
        };

        let mut results: Vec<StoredDocument> = working
            .into_iter()
            .filter(|doc| query.include_archived || !doc.is_archived())
            .filter(|doc| match &query.table_name {
                Some(table) => doc.table_name() == Some(table.as_str()),
                None => true,
            })
            .filter(|doc| {
                filter
                    .iter()
                    .all(|(key, value)| doc.get(key) == Some(value))
            })
            .collect();

        if let Some(sort_field) = &query.sort_by {
            results.sort_by(|a, b| {
                let ordering = compare_for_sort(a.get(sort_field), b.get(sort_field));
                match query.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        results
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect()
    }

    pub async fn update_document(
        &self,
        doc_id: Uuid,
        version: u64,
        body: Map<String, Value>,
    ) -> Result<Document> {
        let guard = self.state.clone().lock_owned().await;

        let doc = match guard.document(&doc_id) {
            Some(doc) if !doc.is_archived() => doc,
            _ => return Err(YaraDbError::NotFound(format!("document {doc_id} not found"))),
        };
        let Some(doc) = doc.as_standard() else {
            return Err(YaraDbError::Validation(
                "combined documents cannot be updated".to_string(),
            ));
        };
        if doc.version != version {
            return Err(YaraDbError::Conflict(format!(
                "document version mismatch: stored version is {}, got {version}",
                doc.version
            )));
        }

        let table_name = doc.table_data.name.clone();
        let old_body = doc.body.clone();
        if let Some(table) = guard.tables.get(&table_name) {
            if table.settings.read_only {
                return Err(YaraDbError::ReadOnly(table_name));
            }
            check_unique_fields(&guard, &table_name, &body, Some(doc_id))?;
            if let Some(schema) = &table.settings.schema {
                validate_body(schema, &body)?;
            }
        }

        let now = Utc::now();
        let new_version = version + 1;
        let op = WalOp::Update {
            doc_id,
            version: new_version,
            body: body.clone(),
            updated_at: now,
        };

        let updated = self
            .commit(guard, op, move |state| {
                if let Some(manager) = state.table_indexes.get_mut(&table_name) {
                    manager.update_document(doc_id, &old_body, &body);
                }
                match state.document_mut(&doc_id) {
                    Some(StoredDocument::Standard(doc)) => {
                        doc.apply_update(body, new_version, now);
                        Some(doc.clone())
                    }
                    _ => None,
                }
            })
            .await?;

        updated.ok_or_else(|| {
            warn!(%doc_id, "document vanished during update apply");
            YaraDbError::NotFound(format!("document {doc_id} not found"))
        })
    }

    /// Soft delete: the document stays in the store (replay by id remains
    /// well-defined) but becomes invisible to reads and leaves all
    /// indexes of its table.
    pub async fn archive_document(&self, doc_id: Uuid) -> Result<StoredDocument> {
        let guard = self.state.clone().lock_owned().await;

        let doc = match guard.document(&doc_id) {
            Some(doc) if !doc.is_archived() => doc,
            _ => return Err(YaraDbError::NotFound(format!("document {doc_id} not found"))),
        };
        let new_version = doc.version() + 1;
        let body = doc.body().clone();
        let table_name = doc.table_name().map(str::to_string);
        let now = Utc::now();

        let op = WalOp::Archive {
            doc_id,
            version: new_version,
            updated_at: now,
        };

        let archived = self
            .commit(guard, op, move |state| {
                if let Some(name) = &table_name {
                    if let Some(manager) = state.table_indexes.get_mut(name) {
                        manager.remove_document(doc_id, &body);
                    }
                    if let Some(table) = state.tables.get_mut(name) {
                        table.documents_count = table.documents_count.saturating_sub(1);
                    }
                }
                state.document_mut(&doc_id).map(|doc| {
                    doc.apply_archive(new_version, now);
                    doc.clone()
                })
            })
            .await?;

        archived.ok_or_else(|| {
            warn!(%doc_id, "document vanished during archive apply");
            YaraDbError::NotFound(format!("document {doc_id} not found"))
        })
    }

    /// Merge up to 100 live documents into a new `CombinedDocument`,
    /// logged as a single record; a validation failure writes nothing.
    pub async fn combine_documents(
        &self,
        name: String,
        document_ids: Vec<Uuid>,
        strategy: MergeStrategy,
    ) -> Result<CombinedDocument> {
        if document_ids.is_empty() {
            return Err(YaraDbError::Validation(
                "no documents to combine".to_string(),
            ));
        }
        if document_ids.len() > 100 {
            return Err(YaraDbError::Validation(
                "cannot combine more than 100 documents at once".to_string(),
            ));
        }

        let guard = self.state.clone().lock_owned().await;

        let mut sources = Vec::with_capacity(document_ids.len());
        for id in &document_ids {
            match guard.document(id) {
                Some(doc) if !doc.is_archived() => sources.push(doc),
                Some(_) => {
                    return Err(YaraDbError::Validation(format!(
                        "cannot combine archived document {id}"
                    )))
                }
                None => {
                    return Err(YaraDbError::Validation(format!("document not found: {id}")))
                }
            }
        }

        let mut combined_body = merge_bodies(&sources, strategy);
        combined_body.insert(
            "_metadata".to_string(),
            json!({
                "source_documents": sources
                    .iter()
                    .map(|doc| json!({
                        "id": doc.id(),
                        "name": doc.name(),
                        "version": doc.version(),
                    }))
                    .collect::<Vec<Value>>(),
                "merge_strategy": strategy,
                "combined_at": Utc::now(),
            }),
        );

        let combined = CombinedDocument::new(name, combined_body, document_ids);
        let created = combined.clone();
        let op = WalOp::CreateCombined {
            doc: combined.clone(),
        };
        self.commit(guard, op, move |state| {
            state.insert_document(StoredDocument::Combined(combined));
        })
        .await?;

        Ok(created)
    }

    /// Resolve a combined document's sources to the standard documents
    /// still present; missing or non-standard ids are skipped.
    pub async fn get_source_documents(&self, combined_id: Uuid) -> Result<Vec<Document>> {
        let state = self.state.lock().await;
        let combined = state
            .document(&combined_id)
            .filter(|doc| !doc.is_archived())
            .and_then(StoredDocument::as_combined)
            .ok_or_else(|| {
                YaraDbError::NotFound(format!("combined document {combined_id} not found"))
            })?;

        Ok(combined
            .document_ids
            .iter()
            .filter_map(|id| state.document(id))
            .filter_map(StoredDocument::as_standard)
            .cloned()
            .collect())
    }

    // ========== TABLE OPERATIONS ==========

    pub async fn create_new_table(&self, spec: CreateTableSpec) -> Result<Table> {
        let guard = self.state.clone().lock_owned().await;

        if guard.tables.contains_key(&spec.name) {
            return Err(YaraDbError::Conflict(format!(
                "table '{}' already exists",
                spec.name
            )));
        }

        let mut settings = TableSettings {
            schema: None,
            read_only: spec.read_only,
            unique_fields: spec.unique_fields,
        };
        settings.schema = match (spec.mode, spec.schema_definition) {
            (TableMode::Strict, None) => {
                return Err(YaraDbError::Validation(
                    "strict mode requires a schema definition".to_string(),
                ))
            }
            (TableMode::Strict, Some(mut schema)) => {
                let Some(map) = schema.as_object_mut() else {
                    return Err(YaraDbError::Validation(
                        "schema definition must be a JSON object".to_string(),
                    ));
                };
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                Some(schema)
            }
            (TableMode::Free, schema) => schema,
        };

        let table = Table::with_settings(spec.name, settings);
        let created = table.clone();
        let op = WalOp::CreateTable {
            table: table.clone(),
        };
        self.commit(guard, op, move |state| {
            state.tables.insert(table.name.clone(), table);
        })
        .await?;

        Ok(created)
    }

    pub async fn list_tables(&self) -> Vec<TableSummary> {
        let state = self.state.lock().await;
        let mut rows: Vec<TableSummary> = state.tables.values().map(Table::summary).collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub async fn get_table_details(&self, name: &str) -> Option<Table> {
        let state = self.state.lock().await;
        state.tables.get(name).cloned()
    }

    /// Drop a table and its live indexes. Documents of the table stay in
    /// the store, unreachable through table listings.
    pub async fn delete_table(&self, name: &str) -> Result<()> {
        let guard = self.state.clone().lock_owned().await;

        if !guard.tables.contains_key(name) {
            return Err(YaraDbError::NotFound(format!("table '{name}' not found")));
        }

        let name = name.to_string();
        let op = WalOp::DropTable { name: name.clone() };
        self.commit(guard, op, move |state| {
            state.tables.remove(&name);
            state.table_indexes.remove(&name);
        })
        .await
    }

    pub async fn get_documents_in_table(&self, table_name: &str) -> Result<Vec<Document>> {
        let state = self.state.lock().await;
        if !state.tables.contains_key(table_name) {
            return Err(YaraDbError::NotFound(format!(
                "table '{table_name}' not found"
            )));
        }
        Ok(state.live_table_documents(table_name).cloned().collect())
    }

    // ========== INDEX OPERATIONS ==========

    pub async fn create_index(
        &self,
        table_name: &str,
        field: &str,
        kind: IndexKind,
    ) -> Result<IndexStats> {
        let guard = self.state.clone().lock_owned().await;

        if !guard.tables.contains_key(table_name) {
            return Err(YaraDbError::NotFound(format!(
                "table '{table_name}' not found"
            )));
        }
        let exists = guard
            .table_indexes
            .get(table_name)
            .map(|manager| manager.has_index(field))
            .unwrap_or(false);
        if exists {
            return Err(YaraDbError::Conflict(format!(
                "index for field '{field}' already exists"
            )));
        }

        let table_name = table_name.to_string();
        let field = field.to_string();
        let op = WalOp::CreateIndex {
            table_name: table_name.clone(),
            field: field.clone(),
            index_type: kind,
        };

        let stats = self
            .commit(guard, op, move |state| {
                state.create_table_index(&table_name, &field, kind);
                info!(table = %table_name, field = %field, kind = %kind, "index created");
                state
                    .table_indexes
                    .get(&table_name)
                    .and_then(|manager| manager.get_index(&field))
                    .map(|index| index.stats())
            })
            .await?;

        stats.ok_or_else(|| YaraDbError::NotFound("index disappeared during build".to_string()))
    }

    pub async fn list_indexes(&self, table_name: &str) -> Result<Vec<IndexStats>> {
        let state = self.state.lock().await;
        if !state.tables.contains_key(table_name) {
            return Err(YaraDbError::NotFound(format!(
                "table '{table_name}' not found"
            )));
        }
        Ok(state
            .table_indexes
            .get(table_name)
            .map(|manager| manager.list_stats())
            .unwrap_or_default())
    }

    pub async fn drop_index(&self, table_name: &str, field: &str) -> Result<()> {
        let guard = self.state.clone().lock_owned().await;

        if !guard.tables.contains_key(table_name) {
            return Err(YaraDbError::NotFound(format!(
                "table '{table_name}' not found"
            )));
        }
        let exists = guard
            .table_indexes
            .get(table_name)
            .map(|manager| manager.has_index(field))
            .unwrap_or(false);
        if !exists {
            return Err(YaraDbError::NotFound(format!(
                "no index for field '{field}'"
            )));
        }

        let table_name = table_name.to_string();
        let field = field.to_string();
        let op = WalOp::DropIndex {
            table_name: table_name.clone(),
            field: field.clone(),
        };
        self.commit(guard, op, move |state| {
            if let Some(table) = state.tables.get_mut(&table_name) {
                table.indexes.remove(&field);
            }
            if let Some(manager) = state.table_indexes.get_mut(&table_name) {
                manager.drop_index(&field);
            }
            info!(table = %table_name, field = %field, "index dropped");
        })
        .await
    }

    // ========== WIPE ==========

    /// Clear everything: in-memory collections, the WAL, and the snapshot
    /// (overwritten with an empty state). Not WAL-logged; the empty
    /// snapshot is the record.
    pub async fn wipe_all_data(&self) -> Result<()> {
        let guard = self.state.clone().lock_owned().await;
        let wal = Arc::clone(&self.wal);

        let task = tokio::spawn(async move {
            let mut guard = guard;
            wal.wipe().await?;
            guard.wipe();
            warn!("all data wiped");
            Ok(())
        });
        task.await
            .map_err(|err| YaraDbError::Durability(format!("wipe task failed: {err}")))?
    }
}

/// Candidate ids from an index when the filter is a single equality
/// clause on an indexed field of the named table.
fn index_candidates(
    state: &DbState,
    filter: &Map<String, Value>,
    query: &FindQuery,
) -> Option<HashSet<Uuid>> {
    let table_name = query.table_name.as_deref()?;
    // Indexes only hold live documents, so archived-inclusive queries
    // must scan.
    if query.include_archived || filter.len() != 1 {
        return None;
    }
    let (field, value) = filter.iter().next()?;
    let manager = state.table_indexes.get(table_name)?;
    let index = manager.get_index(field)?;
    Some(index.lookup(value))
}

fn check_unique_fields(
    state: &DbState,
    table_name: &str,
    body: &Map<String, Value>,
    exclude: Option<Uuid>,
) -> Result<()> {
    let Some(table) = state.tables.get(table_name) else {
        return Ok(());
    };
    for field in &table.settings.unique_fields {
        let Some(value) = body.get(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let taken = state
            .live_table_documents(table_name)
            .filter(|doc| Some(doc.id) != exclude)
            .any(|doc| doc.body.get(field) == Some(value));
        if taken {
            return Err(YaraDbError::Conflict(format!(
                "value for unique field '{field}' already exists in table '{table_name}'"
            )));
        }
    }
    Ok(())
}

fn merge_bodies(sources: &[&StoredDocument], strategy: MergeStrategy) -> Map<String, Value> {
    let mut result = Map::new();
    match strategy {
        MergeStrategy::Overwrite => {
            for doc in sources {
                for (key, value) in doc.body() {
                    result.insert(key.clone(), value.clone());
                }
            }
        }
        MergeStrategy::Append => {
            for doc in sources {
                for (key, value) in doc.body() {
                    let appended = match (result.get_mut(key), value) {
                        (Some(Value::Array(existing)), Value::Array(incoming)) => {
                            existing.extend(incoming.iter().cloned());
                            true
                        }
                        _ => false,
                    };
                    if !appended {
                        result.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        MergeStrategy::Namespace => {
            for (i, doc) in sources.iter().enumerate() {
                result.insert(
                    format!("doc_{i}_{}", doc.name()),
                    Value::Object(doc.body().clone()),
                );
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TableRef;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn stored(name: &str, body: Value) -> StoredDocument {
        StoredDocument::Standard(Document::new(
            name.to_string(),
            map(body),
            TableRef {
                id: Uuid::new_v4(),
                name: "t".to_string(),
            },
        ))
    }

    #[test]
    fn test_merge_overwrite_last_wins() {
        let a = stored("a", json!({"x": 1, "y": 1}));
        let b = stored("b", json!({"x": 2}));
        let merged = merge_bodies(&[&a, &b], MergeStrategy::Overwrite);
        assert_eq!(merged["x"], json!(2));
        assert_eq!(merged["y"], json!(1));
    }

    #[test]
    fn test_merge_append_concats_lists() {
        let a = stored("a", json!({"tags": ["x"], "n": 1}));
        let b = stored("b", json!({"tags": ["y"], "n": 2}));
        let merged = merge_bodies(&[&a, &b], MergeStrategy::Append);
        assert_eq!(merged["tags"], json!(["x", "y"]));
        assert_eq!(merged["n"], json!(2));
    }

    #[test]
    fn test_merge_append_mixed_shapes_overwrite() {
        let a = stored("a", json!({"v": ["x"]}));
        let b = stored("b", json!({"v": 3}));
        let merged = merge_bodies(&[&a, &b], MergeStrategy::Append);
        assert_eq!(merged["v"], json!(3));
    }

    #[test]
    fn test_merge_namespace_keys() {
        let a = stored("first", json!({"x": 1}));
        let b = stored("second", json!({"y": 2}));
        let merged = merge_bodies(&[&a, &b], MergeStrategy::Namespace);
        assert_eq!(merged["doc_0_first"], json!({"x": 1}));
        assert_eq!(merged["doc_1_second"], json!({"y": 2}));
    }

    #[test]
    fn test_merge_strategy_parsing() {
        assert_eq!(
            MergeStrategy::from_str("overwrite").unwrap(),
            MergeStrategy::Overwrite
        );
        assert_eq!(
            MergeStrategy::from_str("namespace").unwrap(),
            MergeStrategy::Namespace
        );
        assert!(matches!(
            MergeStrategy::from_str("zip"),
            Err(YaraDbError::Validation(_))
        ));
    }

    #[test]
    fn test_find_query_builder() {
        let query = FindQuery::new()
            .in_table("users")
            .with_archived(true)
            .sort_by("age", SortOrder::Desc)
            .paginate(5, Some(10));
        assert_eq!(query.table_name.as_deref(), Some("users"));
        assert!(query.include_archived);
        assert_eq!(query.sort_by.as_deref(), Some("age"));
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.offset, 5);
        assert_eq!(query.limit, Some(10));
    }
}
