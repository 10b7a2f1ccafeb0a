// yaradb-core/src/state.rs
// The process-wide authoritative in-memory database

use std::collections::HashMap;

use uuid::Uuid;

use crate::document::{Document, StoredDocument};
use crate::index::IndexManager;
use crate::table::{IndexKind, Table};
use crate::value_utils::get_nested_value;

/// In-memory state: document storage, id lookup, tables and their live
/// indexes. Guarded as a whole by the repository's state mutex.
///
/// The storage list is the sole owner of documents; the id map holds list
/// positions, which stay valid because documents are only ever removed by
/// a full wipe.
#[derive(Debug, Default)]
pub struct DbState {
    documents: Vec<StoredDocument>,
    by_id: HashMap<Uuid, usize>,
    pub tables: HashMap<String, Table>,
    /// Live index structures, present only for tables with indexes.
    pub table_indexes: HashMap<String, IndexManager>,
}

impl DbState {
    pub fn new() -> Self {
        DbState::default()
    }

    pub fn insert_document(&mut self, doc: StoredDocument) {
        let id = doc.id();
        self.by_id.insert(id, self.documents.len());
        self.documents.push(doc);
    }

    pub fn contains_document(&self, id: &Uuid) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn document(&self, id: &Uuid) -> Option<&StoredDocument> {
        self.by_id.get(id).map(|&pos| &self.documents[pos])
    }

    pub fn document_mut(&mut self, id: &Uuid) -> Option<&mut StoredDocument> {
        let pos = *self.by_id.get(id)?;
        self.documents.get_mut(pos)
    }

    pub fn documents(&self) -> &[StoredDocument] {
        &self.documents
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live (non-archived) standard documents belonging to a table.
    pub fn live_table_documents<'a>(
        &'a self,
        table_name: &'a str,
    ) -> impl Iterator<Item = &'a Document> {
        self.documents.iter().filter_map(move |doc| match doc {
            StoredDocument::Standard(d) if !d.is_archived() && d.table_data.name == table_name => {
                Some(d)
            }
            _ => None,
        })
    }

    /// Index manager for a table, created on first use.
    pub fn ensure_index_manager(&mut self, table_name: &str) -> &mut IndexManager {
        self.table_indexes
            .entry(table_name.to_string())
            .or_default()
    }

    /// Declare an index on a table and build it against the table's
    /// current live documents. Existing indexes are left untouched.
    pub fn create_table_index(&mut self, table_name: &str, field: &str, kind: IndexKind) {
        if let Some(table) = self.tables.get_mut(table_name) {
            table.indexes.insert(field.to_string(), kind);
        }

        let documents = &self.documents;
        let manager = self
            .table_indexes
            .entry(table_name.to_string())
            .or_default();
        if manager.has_index(field) {
            return;
        }
        // Cannot conflict: guarded by has_index
        let _ = manager.create_index(field, kind);
        if let Some(index) = manager.get_index_mut(field) {
            for doc in documents {
                if let StoredDocument::Standard(d) = doc {
                    if d.is_archived() || d.table_data.name != table_name {
                        continue;
                    }
                    if let Some(value) = get_nested_value(&d.body, field) {
                        index.add(d.id, value);
                    }
                }
            }
        }
    }

    /// Recompute every table's `documents_count` from the live documents.
    /// Run after snapshot load, before replay.
    pub fn recount_documents(&mut self) {
        for table in self.tables.values_mut() {
            table.documents_count = 0;
        }
        for doc in &self.documents {
            if doc.is_archived() {
                continue;
            }
            if let Some(name) = doc.table_name() {
                if let Some(table) = self.tables.get_mut(name) {
                    table.documents_count += 1;
                }
            }
        }
    }

    /// Materialize an `IndexManager` entry for every declared index that
    /// does not have a live structure yet.
    pub fn install_declared_indexes(&mut self) {
        let managers = &mut self.table_indexes;
        for table in self.tables.values() {
            if table.indexes.is_empty() {
                continue;
            }
            let manager = managers.entry(table.name.clone()).or_default();
            for (field, kind) in &table.indexes {
                if !manager.has_index(field) {
                    // Cannot conflict: guarded by has_index
                    let _ = manager.create_index(field, *kind);
                }
            }
        }
    }

    /// Rebuild every table's live indexes from its live documents.
    pub fn rebuild_all_indexes(&mut self) {
        let documents = &self.documents;
        for (table_name, manager) in self.table_indexes.iter_mut() {
            let live = documents.iter().filter_map(|doc| match doc {
                StoredDocument::Standard(d)
                    if !d.is_archived() && d.table_data.name == *table_name =>
                {
                    Some((d.id, &d.body))
                }
                _ => None,
            });
            manager.rebuild_all(live);
        }
    }

    pub fn wipe(&mut self) {
        self.documents.clear();
        self.by_id.clear();
        self.tables.clear();
        self.table_indexes.clear();
    }
}
