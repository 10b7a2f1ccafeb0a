// yaradb-core/src/index.rs
// Secondary indexes: exact-match (hash) and ordered (btree) variants,
// plus the per-table IndexManager that keeps them synchronized with
// document mutations.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;

use ahash::AHashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Result, YaraDbError};
use crate::table::IndexKind;
use crate::value_utils::get_nested_value;

/// Key an index entry is stored under.
///
/// Ordering is total within the enum (Bool < Int < Float < String) so the
/// ordered index has a deterministic layout, but callers are expected not
/// to mix value types for a given field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Bool(bool),
    Int(i64),
    Float(OrderedFloat),
    String(String),
}

/// f64 wrapper with bit-equality and NaN-last total ordering, so floats
/// can serve as map keys.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => self
                .0
                .partial_cmp(&other.0)
                .unwrap_or(std::cmp::Ordering::Equal),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use IndexKey::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Bool(_), _) => std::cmp::Ordering::Less,
            (_, Bool(_)) => std::cmp::Ordering::Greater,

            (Int(a), Int(b)) => a.cmp(b),
            (Int(_), _) => std::cmp::Ordering::Less,
            (_, Int(_)) => std::cmp::Ordering::Greater,

            (Float(a), Float(b)) => a.cmp(b),
            (Float(_), _) => std::cmp::Ordering::Less,
            (_, Float(_)) => std::cmp::Ordering::Greater,

            (String(a), String(b)) => a.cmp(b),
        }
    }
}

impl IndexKey {
    /// Scalar values index directly; null, arrays (expanded by callers)
    /// and objects produce no key.
    pub fn from_value(value: &Value) -> Option<IndexKey> {
        match value {
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(IndexKey::Int(i))
                } else {
                    n.as_f64().map(|f| IndexKey::Float(OrderedFloat(f)))
                }
            }
            Value::String(s) => Some(IndexKey::String(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            IndexKey::Bool(b) => Value::Bool(*b),
            IndexKey::Int(i) => Value::from(*i),
            IndexKey::Float(f) => {
                serde_json::Number::from_f64(f.0).map(Value::Number).unwrap_or(Value::Null)
            }
            IndexKey::String(s) => Value::String(s.clone()),
        }
    }
}

/// Keys a document contributes for an indexed value. A list-valued leaf
/// expands: the document is indexed under each scalar element.
fn expand_keys(value: &Value) -> Vec<IndexKey> {
    match value {
        Value::Array(items) => items.iter().filter_map(IndexKey::from_value).collect(),
        other => IndexKey::from_value(other).into_iter().collect(),
    }
}

/// Exact-match index: value -> set of document ids, O(1) amortized.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    data: AHashMap<IndexKey, HashSet<Uuid>>,
}

impl HashIndex {
    fn add(&mut self, doc_id: Uuid, value: &Value) {
        for key in expand_keys(value) {
            self.data.entry(key).or_default().insert(doc_id);
        }
    }

    fn remove(&mut self, doc_id: Uuid, value: &Value) {
        for key in expand_keys(value) {
            if let Some(ids) = self.data.get_mut(&key) {
                ids.remove(&doc_id);
                if ids.is_empty() {
                    self.data.remove(&key);
                }
            }
        }
    }

    fn lookup(&self, value: &Value) -> HashSet<Uuid> {
        IndexKey::from_value(value)
            .and_then(|key| self.data.get(&key))
            .cloned()
            .unwrap_or_default()
    }

    fn clear(&mut self) {
        self.data.clear();
    }
}

/// Ordered index: same mapping kept in key order, O(log n) in distinct
/// keys, with range lookup.
#[derive(Debug, Clone, Default)]
pub struct BTreeIndex {
    data: BTreeMap<IndexKey, HashSet<Uuid>>,
}

impl BTreeIndex {
    fn add(&mut self, doc_id: Uuid, value: &Value) {
        for key in expand_keys(value) {
            self.data.entry(key).or_default().insert(doc_id);
        }
    }

    fn remove(&mut self, doc_id: Uuid, value: &Value) {
        for key in expand_keys(value) {
            if let Some(ids) = self.data.get_mut(&key) {
                ids.remove(&doc_id);
                if ids.is_empty() {
                    self.data.remove(&key);
                }
            }
        }
    }

    fn lookup(&self, value: &Value) -> HashSet<Uuid> {
        IndexKey::from_value(value)
            .and_then(|key| self.data.get(&key))
            .cloned()
            .unwrap_or_default()
    }

    /// Union of id-sets for keys in `[min, max]`; `None` leaves the
    /// corresponding side open.
    fn range_lookup(&self, min: Option<&Value>, max: Option<&Value>) -> Result<HashSet<Uuid>> {
        let lower = match min {
            Some(value) => Bound::Included(scalar_bound(value)?),
            None => Bound::Unbounded,
        };
        let upper = match max {
            Some(value) => Bound::Included(scalar_bound(value)?),
            None => Bound::Unbounded,
        };

        let mut result = HashSet::new();
        for (_key, ids) in self.data.range((lower, upper)) {
            result.extend(ids.iter().copied());
        }
        Ok(result)
    }

    fn clear(&mut self) {
        self.data.clear();
    }
}

fn scalar_bound(value: &Value) -> Result<IndexKey> {
    IndexKey::from_value(value).ok_or_else(|| {
        YaraDbError::Validation("range bounds must be scalar values".to_string())
    })
}

/// A live index over one dotted field path.
#[derive(Debug, Clone)]
pub struct Index {
    field: String,
    variant: IndexVariant,
}

#[derive(Debug, Clone)]
enum IndexVariant {
    Hash(HashIndex),
    Btree(BTreeIndex),
}

impl Index {
    pub fn new(field: String, kind: IndexKind) -> Self {
        let variant = match kind {
            IndexKind::Hash => IndexVariant::Hash(HashIndex::default()),
            IndexKind::Btree => IndexVariant::Btree(BTreeIndex::default()),
        };
        Index { field, variant }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> IndexKind {
        match &self.variant {
            IndexVariant::Hash(_) => IndexKind::Hash,
            IndexVariant::Btree(_) => IndexKind::Btree,
        }
    }

    pub fn add(&mut self, doc_id: Uuid, value: &Value) {
        match &mut self.variant {
            IndexVariant::Hash(index) => index.add(doc_id, value),
            IndexVariant::Btree(index) => index.add(doc_id, value),
        }
    }

    pub fn remove(&mut self, doc_id: Uuid, value: &Value) {
        match &mut self.variant {
            IndexVariant::Hash(index) => index.remove(doc_id, value),
            IndexVariant::Btree(index) => index.remove(doc_id, value),
        }
    }

    pub fn lookup(&self, value: &Value) -> HashSet<Uuid> {
        match &self.variant {
            IndexVariant::Hash(index) => index.lookup(value),
            IndexVariant::Btree(index) => index.lookup(value),
        }
    }

    /// Range lookup; only the ordered variant supports it.
    pub fn range_lookup(
        &self,
        min: Option<&Value>,
        max: Option<&Value>,
    ) -> Result<HashSet<Uuid>> {
        match &self.variant {
            IndexVariant::Btree(index) => index.range_lookup(min, max),
            IndexVariant::Hash(_) => Err(YaraDbError::Validation(format!(
                "hash index on '{}' does not support range queries",
                self.field
            ))),
        }
    }

    pub fn clear(&mut self) {
        match &mut self.variant {
            IndexVariant::Hash(index) => index.clear(),
            IndexVariant::Btree(index) => index.clear(),
        }
    }

    pub fn stats(&self) -> IndexStats {
        match &self.variant {
            IndexVariant::Hash(index) => {
                let total: usize = index.data.values().map(HashSet::len).sum();
                let distinct = index.data.len();
                IndexStats {
                    index_type: IndexKind::Hash,
                    field: self.field.clone(),
                    unique_values: distinct,
                    total_entries: total,
                    avg_docs_per_value: if distinct == 0 {
                        None
                    } else {
                        Some(total as f64 / distinct as f64)
                    },
                    min_value: None,
                    max_value: None,
                }
            }
            IndexVariant::Btree(index) => {
                let total: usize = index.data.values().map(HashSet::len).sum();
                IndexStats {
                    index_type: IndexKind::Btree,
                    field: self.field.clone(),
                    unique_values: index.data.len(),
                    total_entries: total,
                    avg_docs_per_value: None,
                    min_value: index.data.keys().next().map(IndexKey::to_value),
                    max_value: index.data.keys().next_back().map(IndexKey::to_value),
                }
            }
        }
    }
}

/// Statistics row for `list_indexes`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub index_type: IndexKind,
    pub field: String,
    pub unique_values: usize,
    pub total_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_docs_per_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Value>,
}

/// The live indexes of one table, keyed by field path.
///
/// Observes document create/update/remove and keeps every index in step;
/// rebuilt wholesale from live documents after snapshot load and WAL
/// replay.
#[derive(Debug, Clone, Default)]
pub struct IndexManager {
    indexes: HashMap<String, Index>,
}

impl IndexManager {
    pub fn new() -> Self {
        IndexManager::default()
    }

    pub fn create_index(&mut self, field: &str, kind: IndexKind) -> Result<()> {
        if self.indexes.contains_key(field) {
            return Err(YaraDbError::Conflict(format!(
                "index for field '{field}' already exists"
            )));
        }
        self.indexes
            .insert(field.to_string(), Index::new(field.to_string(), kind));
        Ok(())
    }

    /// Returns whether an index was actually removed.
    pub fn drop_index(&mut self, field: &str) -> bool {
        self.indexes.remove(field).is_some()
    }

    pub fn has_index(&self, field: &str) -> bool {
        self.indexes.contains_key(field)
    }

    pub fn get_index(&self, field: &str) -> Option<&Index> {
        self.indexes.get(field)
    }

    pub fn get_index_mut(&mut self, field: &str) -> Option<&mut Index> {
        self.indexes.get_mut(field)
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn add_document(&mut self, doc_id: Uuid, body: &Map<String, Value>) {
        for (field, index) in self.indexes.iter_mut() {
            if let Some(value) = get_nested_value(body, field) {
                index.add(doc_id, value);
            }
        }
    }

    pub fn remove_document(&mut self, doc_id: Uuid, body: &Map<String, Value>) {
        for (field, index) in self.indexes.iter_mut() {
            if let Some(value) = get_nested_value(body, field) {
                index.remove(doc_id, value);
            }
        }
    }

    /// Touch only the indexes whose indexed value actually changed.
    pub fn update_document(
        &mut self,
        doc_id: Uuid,
        old_body: &Map<String, Value>,
        new_body: &Map<String, Value>,
    ) {
        for (field, index) in self.indexes.iter_mut() {
            let old_value = get_nested_value(old_body, field);
            let new_value = get_nested_value(new_body, field);

            if old_value != new_value {
                if let Some(value) = old_value {
                    index.remove(doc_id, value);
                }
                if let Some(value) = new_value {
                    index.add(doc_id, value);
                }
            }
        }
    }

    /// Exact lookup through a named index.
    pub fn lookup(&self, field: &str, value: &Value) -> Result<HashSet<Uuid>> {
        let index = self.indexes.get(field).ok_or_else(|| {
            YaraDbError::NotFound(format!("no index for field '{field}'"))
        })?;
        Ok(index.lookup(value))
    }

    /// Range lookup through a named index (ordered variant only).
    pub fn range_lookup(
        &self,
        field: &str,
        min: Option<&Value>,
        max: Option<&Value>,
    ) -> Result<HashSet<Uuid>> {
        let index = self.indexes.get(field).ok_or_else(|| {
            YaraDbError::NotFound(format!("no index for field '{field}'"))
        })?;
        index.range_lookup(min, max)
    }

    /// Clear every index, then re-add every given live document.
    pub fn rebuild_all<'a, I>(&mut self, documents: I)
    where
        I: IntoIterator<Item = (Uuid, &'a Map<String, Value>)>,
    {
        for index in self.indexes.values_mut() {
            index.clear();
        }
        for (doc_id, body) in documents {
            self.add_document(doc_id, body);
        }
    }

    pub fn list_stats(&self) -> Vec<IndexStats> {
        let mut stats: Vec<IndexStats> = self.indexes.values().map(Index::stats).collect();
        stats.sort_by(|a, b| a.field.cmp(&b.field));
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_hash_index_add_lookup_remove() {
        let mut index = Index::new("email".to_string(), IndexKind::Hash);
        let id = Uuid::new_v4();

        index.add(id, &json!("a@x"));
        assert_eq!(index.lookup(&json!("a@x")).len(), 1);
        assert!(index.lookup(&json!("b@x")).is_empty());

        index.remove(id, &json!("a@x"));
        assert!(index.lookup(&json!("a@x")).is_empty());
    }

    #[test]
    fn test_value_entry_pruned_when_set_empties() {
        let mut index = Index::new("tag".to_string(), IndexKind::Hash);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        index.add(a, &json!("x"));
        index.add(b, &json!("x"));
        index.remove(a, &json!("x"));
        assert_eq!(index.lookup(&json!("x")).len(), 1);

        index.remove(b, &json!("x"));
        assert_eq!(index.stats().unique_values, 0);
    }

    #[test]
    fn test_list_values_expand_per_element() {
        let mut index = Index::new("tags".to_string(), IndexKind::Hash);
        let id = Uuid::new_v4();

        index.add(id, &json!(["red", "blue"]));
        assert!(index.lookup(&json!("red")).contains(&id));
        assert!(index.lookup(&json!("blue")).contains(&id));

        index.remove(id, &json!(["red", "blue"]));
        assert!(index.lookup(&json!("red")).is_empty());
        assert!(index.lookup(&json!("blue")).is_empty());
    }

    #[test]
    fn test_btree_range_lookup() {
        let mut index = Index::new("age".to_string(), IndexKind::Btree);
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            index.add(*id, &json!(10 * (i as i64)));
        }

        let mid = index.range_lookup(Some(&json!(10)), Some(&json!(30))).unwrap();
        assert_eq!(mid.len(), 3);
        assert!(mid.contains(&ids[1]) && mid.contains(&ids[2]) && mid.contains(&ids[3]));

        let from = index.range_lookup(Some(&json!(30)), None).unwrap();
        assert_eq!(from.len(), 2);

        let until = index.range_lookup(None, Some(&json!(0))).unwrap();
        assert_eq!(until.len(), 1);

        let all = index.range_lookup(None, None).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_hash_index_rejects_range() {
        let index = Index::new("x".to_string(), IndexKind::Hash);
        assert!(matches!(
            index.range_lookup(Some(&json!(1)), None),
            Err(YaraDbError::Validation(_))
        ));
    }

    #[test]
    fn test_manager_create_duplicate_conflicts() {
        let mut manager = IndexManager::new();
        manager.create_index("email", IndexKind::Hash).unwrap();
        assert!(matches!(
            manager.create_index("email", IndexKind::Btree),
            Err(YaraDbError::Conflict(_))
        ));
    }

    #[test]
    fn test_manager_drop_is_idempotent_bool() {
        let mut manager = IndexManager::new();
        manager.create_index("email", IndexKind::Hash).unwrap();
        assert!(manager.drop_index("email"));
        assert!(!manager.drop_index("email"));
    }

    #[test]
    fn test_manager_indexes_nested_paths() {
        let mut manager = IndexManager::new();
        manager.create_index("address.city", IndexKind::Hash).unwrap();
        let id = Uuid::new_v4();

        manager.add_document(id, &map(json!({"address": {"city": "NYC"}})));
        assert!(manager.lookup("address.city", &json!("NYC")).unwrap().contains(&id));
    }

    #[test]
    fn test_manager_update_touches_only_changed() {
        let mut manager = IndexManager::new();
        manager.create_index("email", IndexKind::Hash).unwrap();
        manager.create_index("age", IndexKind::Btree).unwrap();
        let id = Uuid::new_v4();

        let old_body = map(json!({"email": "old@x", "age": 30}));
        manager.add_document(id, &old_body);

        let new_body = map(json!({"email": "new@x", "age": 30}));
        manager.update_document(id, &old_body, &new_body);

        assert!(manager.lookup("email", &json!("old@x")).unwrap().is_empty());
        assert!(manager.lookup("email", &json!("new@x")).unwrap().contains(&id));
        assert!(manager.lookup("age", &json!(30)).unwrap().contains(&id));
    }

    #[test]
    fn test_manager_update_handles_field_removal() {
        let mut manager = IndexManager::new();
        manager.create_index("email", IndexKind::Hash).unwrap();
        let id = Uuid::new_v4();

        let old_body = map(json!({"email": "a@x"}));
        manager.add_document(id, &old_body);
        manager.update_document(id, &old_body, &map(json!({"other": 1})));

        assert!(manager.lookup("email", &json!("a@x")).unwrap().is_empty());
    }

    #[test]
    fn test_null_values_never_indexed() {
        let mut manager = IndexManager::new();
        manager.create_index("email", IndexKind::Hash).unwrap();
        let id = Uuid::new_v4();

        manager.add_document(id, &map(json!({"email": null})));
        let stats = &manager.list_stats()[0];
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_rebuild_all_replaces_content() {
        let mut manager = IndexManager::new();
        manager.create_index("n", IndexKind::Btree).unwrap();

        let stale = Uuid::new_v4();
        manager.add_document(stale, &map(json!({"n": 1})));

        let live = Uuid::new_v4();
        let body = map(json!({"n": 2}));
        manager.rebuild_all(vec![(live, &body)]);

        assert!(manager.lookup("n", &json!(1)).unwrap().is_empty());
        assert!(manager.lookup("n", &json!(2)).unwrap().contains(&live));
    }

    #[test]
    fn test_stats_shapes() {
        let mut manager = IndexManager::new();
        manager.create_index("a", IndexKind::Hash).unwrap();
        manager.create_index("b", IndexKind::Btree).unwrap();
        let id = Uuid::new_v4();
        manager.add_document(id, &map(json!({"a": "x", "b": 7})));

        let stats = manager.list_stats();
        assert_eq!(stats.len(), 2);
        let hash = stats.iter().find(|s| s.field == "a").unwrap();
        assert_eq!(hash.index_type, IndexKind::Hash);
        assert_eq!(hash.avg_docs_per_value, Some(1.0));
        assert!(hash.min_value.is_none());

        let btree = stats.iter().find(|s| s.field == "b").unwrap();
        assert_eq!(btree.min_value, Some(json!(7)));
        assert_eq!(btree.max_value, Some(json!(7)));
    }

    #[test]
    fn test_index_key_ordering() {
        let mut keys = vec![
            IndexKey::String("a".to_string()),
            IndexKey::Int(3),
            IndexKey::Bool(true),
            IndexKey::Int(-1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                IndexKey::Bool(true),
                IndexKey::Int(-1),
                IndexKey::Int(3),
                IndexKey::String("a".to_string()),
            ]
        );
    }
}
