// yaradb-core/src/table.rs
// Table metadata: settings, index declarations, creation requests

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::document::TableRef;

/// Declared index variant. The declaration lives on the table and is
/// snapshot-persisted; the live structure lives in the per-table
/// `IndexManager` and is rebuilt from documents on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Hash,
    Btree,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Hash => write!(f, "hash"),
            IndexKind::Btree => write!(f, "btree"),
        }
    }
}

/// Table policy knobs. Every field is optional on the wire; an absent
/// settings object means the permissive defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSettings {
    /// JSON-Schema applied to every create and update in this table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    /// Top-level body fields that must be unique among live documents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_fields: Vec<String>,
}

impl TableSettings {
    /// Strict tables pin `additionalProperties: false` in their schema.
    pub fn is_strict(&self) -> bool {
        self.schema
            .as_ref()
            .and_then(|schema| schema.get("additionalProperties"))
            .map(|v| v == &Value::Bool(false))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub settings: TableSettings,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indexes: BTreeMap<String, IndexKind>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub documents_count: u64,
}

impl Table {
    /// Table with default (permissive) settings, as minted by lazy creation.
    pub fn new(name: String) -> Self {
        Table::with_settings(name, TableSettings::default())
    }

    pub fn with_settings(name: String, settings: TableSettings) -> Self {
        Table {
            id: Uuid::new_v4(),
            name,
            settings,
            indexes: BTreeMap::new(),
            created_at: Utc::now(),
            documents_count: 0,
        }
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn mode(&self) -> TableMode {
        if self.settings.is_strict() {
            TableMode::Strict
        } else {
            TableMode::Free
        }
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.id,
            name: self.name.clone(),
            mode: self.mode(),
            documents_count: self.documents_count,
            is_read_only: self.settings.read_only,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    Free,
    Strict,
}

impl Default for TableMode {
    fn default() -> Self {
        TableMode::Free
    }
}

/// Request payload for explicit table creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTableSpec {
    pub name: String,
    #[serde(default)]
    pub mode: TableMode,
    #[serde(default)]
    pub schema_definition: Option<Value>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub unique_fields: Vec<String>,
}

impl CreateTableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        CreateTableSpec {
            name: name.into(),
            ..CreateTableSpec::default()
        }
    }

    pub fn with_mode(mut self, mode: TableMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema_definition = Some(schema);
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_unique_fields(mut self, fields: Vec<String>) -> Self {
        self.unique_fields = fields;
        self
    }
}

/// Row returned by `list_tables`.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub id: Uuid,
    pub name: String,
    pub mode: TableMode,
    pub documents_count: u64,
    pub is_read_only: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_settings_serialize_empty() {
        let table = Table::new("t".to_string());
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["settings"], json!({}));
        assert!(value.get("indexes").is_none());
        assert!(value.get("_id").is_some());
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = TableSettings {
            schema: Some(json!({"type": "object", "additionalProperties": false})),
            read_only: true,
            unique_fields: vec!["email".to_string()],
        };
        let table = Table::with_settings("t".to_string(), settings);

        let json_str = serde_json::to_string(&table).unwrap();
        let back: Table = serde_json::from_str(&json_str).unwrap();

        assert!(back.settings.read_only);
        assert_eq!(back.settings.unique_fields, vec!["email"]);
        assert_eq!(back.mode(), TableMode::Strict);
    }

    #[test]
    fn test_mode_requires_pinned_additional_properties() {
        let mut table = Table::new("t".to_string());
        assert_eq!(table.mode(), TableMode::Free);

        table.settings.schema = Some(json!({"type": "object"}));
        assert_eq!(table.mode(), TableMode::Free);

        table.settings.schema = Some(json!({"type": "object", "additionalProperties": false}));
        assert_eq!(table.mode(), TableMode::Strict);
    }

    #[test]
    fn test_index_kind_wire_names() {
        assert_eq!(serde_json::to_string(&IndexKind::Hash).unwrap(), "\"hash\"");
        assert_eq!(
            serde_json::to_string(&IndexKind::Btree).unwrap(),
            "\"btree\""
        );
        let kind: IndexKind = serde_json::from_str("\"btree\"").unwrap();
        assert_eq!(kind, IndexKind::Btree);
    }

    #[test]
    fn test_missing_settings_deserialize_to_defaults() {
        let raw = json!({
            "_id": Uuid::new_v4(),
            "name": "legacy",
            "created_at": Utc::now(),
        });
        let table: Table = serde_json::from_value(raw).unwrap();
        assert!(!table.settings.read_only);
        assert!(table.settings.unique_fields.is_empty());
        assert!(table.indexes.is_empty());
        assert_eq!(table.documents_count, 0);
    }
}
