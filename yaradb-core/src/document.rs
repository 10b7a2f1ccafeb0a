// yaradb-core/src/document.rs
// Document variants and the body integrity digest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// The owning table's identity, stamped on a document at creation and
/// never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub id: Uuid,
    pub name: String,
}

/// Lowercase hex SHA-256 of the canonical JSON encoding of a body.
///
/// Canonical means sorted object keys and no insignificant whitespace;
/// `serde_json::Map` is BTreeMap-backed, so plain serialization already
/// yields that form at every nesting level.
pub fn hash_body(body: &Map<String, Value>) -> String {
    let bytes = serde_json::to_vec(body).expect("JSON body serialization is infallible");
    hex::encode(Sha256::digest(&bytes))
}

/// Standard document: a named JSON body owned by a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub table_data: TableRef,
    pub body: Map<String, Value>,
    pub body_hash: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u64,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(name: String, body: Map<String, Value>, table_data: TableRef) -> Self {
        let body_hash = hash_body(&body);
        Document {
            id: Uuid::new_v4(),
            name,
            table_data,
            body,
            body_hash,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
            archived_at: None,
        }
    }

    /// Top-level body field access (filter and sort operate on top-level keys)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Replace the body, bumping version and recomputing the digest.
    /// All fields change in one step so no reader can observe a body
    /// without its matching hash.
    pub fn apply_update(&mut self, body: Map<String, Value>, version: u64, at: DateTime<Utc>) {
        self.body = body;
        self.body_hash = hash_body(&self.body);
        self.version = version;
        self.updated_at = Some(at);
    }

    pub fn apply_archive(&mut self, version: u64, at: DateTime<Utc>) {
        if self.archived_at.is_none() {
            self.archived_at = Some(at);
            self.updated_at = Some(at);
            self.version = version;
        }
    }
}

/// Document produced by combining several standard documents.
///
/// Same shape as [`Document`] except it records its source ids and belongs
/// to no table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedDocument {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub document_ids: Vec<Uuid>,
    pub body: Map<String, Value>,
    pub body_hash: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u64,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

impl CombinedDocument {
    pub fn new(name: String, body: Map<String, Value>, document_ids: Vec<Uuid>) -> Self {
        let body_hash = hash_body(&body);
        CombinedDocument {
            id: Uuid::new_v4(),
            name,
            document_ids,
            body,
            body_hash,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
            archived_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn apply_archive(&mut self, version: u64, at: DateTime<Utc>) {
        if self.archived_at.is_none() {
            self.archived_at = Some(at);
            self.updated_at = Some(at);
            self.version = version;
        }
    }
}

/// A document as held in storage and in the snapshot file.
///
/// Untagged: a combined document is recognized by its `document_ids`
/// field, a standard one by `table_data`. Combined must be tried first
/// because deserialization is field-driven.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredDocument {
    Combined(CombinedDocument),
    Standard(Document),
}

impl StoredDocument {
    pub fn id(&self) -> Uuid {
        match self {
            StoredDocument::Standard(doc) => doc.id,
            StoredDocument::Combined(doc) => doc.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StoredDocument::Standard(doc) => &doc.name,
            StoredDocument::Combined(doc) => &doc.name,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            StoredDocument::Standard(doc) => doc.version,
            StoredDocument::Combined(doc) => doc.version,
        }
    }

    pub fn body(&self) -> &Map<String, Value> {
        match self {
            StoredDocument::Standard(doc) => &doc.body,
            StoredDocument::Combined(doc) => &doc.body,
        }
    }

    pub fn body_hash(&self) -> &str {
        match self {
            StoredDocument::Standard(doc) => &doc.body_hash,
            StoredDocument::Combined(doc) => &doc.body_hash,
        }
    }

    pub fn is_archived(&self) -> bool {
        match self {
            StoredDocument::Standard(doc) => doc.is_archived(),
            StoredDocument::Combined(doc) => doc.is_archived(),
        }
    }

    /// Owning table name; combined documents belong to no table.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            StoredDocument::Standard(doc) => Some(&doc.table_data.name),
            StoredDocument::Combined(_) => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body().get(key)
    }

    pub fn as_standard(&self) -> Option<&Document> {
        match self {
            StoredDocument::Standard(doc) => Some(doc),
            StoredDocument::Combined(_) => None,
        }
    }

    pub fn as_combined(&self) -> Option<&CombinedDocument> {
        match self {
            StoredDocument::Combined(doc) => Some(doc),
            StoredDocument::Standard(_) => None,
        }
    }

    pub fn apply_archive(&mut self, version: u64, at: DateTime<Utc>) {
        match self {
            StoredDocument::Standard(doc) => doc.apply_archive(version, at),
            StoredDocument::Combined(doc) => doc.apply_archive(version, at),
        }
    }
}
