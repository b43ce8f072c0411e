//! The embedded key/value base.
//!
//! Records live in an ordered in-memory map of JSON documents. A
//! disk-backed base mirrors the whole map to one JSON file synchronously
//! after every mutating call. There is no partial-write protection: a
//! crash mid-write can corrupt the file. For a low-throughput save store
//! that trade is acceptable and documented here rather than papered over.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::query::OrQuery;

/// Options for opening disk-backed bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Directory the mirror files live in.
    pub data_dir: PathBuf,
    /// Pretty-print the mirror files for manual inspection.
    pub pretty: bool,
}

impl StoreOptions {
    /// Creates options for the given data directory.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            pretty: false,
        }
    }

    /// Enables pretty-printed mirror files.
    #[must_use]
    pub const fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

/// A single field update operator.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Overwrite the field.
    Set(Value),
    /// Remove the field.
    Delete,
    /// Add to a numeric field.
    Increment(i64),
    /// Extend a list field at the end.
    Append(Vec<Value>),
    /// Extend a list field at the front.
    Prepend(Vec<Value>),
}

/// One page of fetch results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResponse {
    /// Matched `(key, record)` pairs in key order.
    pub items: Vec<(String, Value)>,
    /// Cursor to resume after, present when the page was cut by the limit
    /// and more matches may exist.
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
struct DiskMirror {
    path: PathBuf,
    pretty: bool,
}

/// An embedded key/value base holding JSON documents.
#[derive(Debug, Clone, Default)]
pub struct Base {
    records: BTreeMap<String, Value>,
    mirror: Option<DiskMirror>,
}

impl Base {
    /// Creates an empty in-memory base.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a disk-backed base named `name` under the options' directory.
    ///
    /// An existing mirror file is loaded if it parses; anything else starts
    /// empty, matching the forgiving behavior save files have always had.
    pub fn on_disk(name: &str, options: &StoreOptions) -> StoreResult<Self> {
        fs::create_dir_all(&options.data_dir).map_err(|source| StoreError::Persist {
            path: options.data_dir.clone(),
            source,
        })?;
        let path = options.data_dir.join(format!("{name}.json"));
        let records = load_mirror(&path);
        Ok(Self {
            records,
            mirror: Some(DiskMirror {
                path,
                pretty: options.pretty,
            }),
        })
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Retrieves a record by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.records.get(key).cloned()
    }

    /// Inserts a record; the key must not exist yet.
    pub fn insert(&mut self, key: &str, value: Value) -> StoreResult<()> {
        if self.records.contains_key(key) {
            return Err(StoreError::KeyExists {
                key: key.to_owned(),
            });
        }
        self.records.insert(key.to_owned(), value);
        self.sync()
    }

    /// Inserts or overwrites a record.
    pub fn put(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.records.insert(key.to_owned(), value);
        self.sync()
    }

    /// [`put`](Self::put) with a time-to-live.
    ///
    /// The embedded base has no expiry support; the TTL is accepted for
    /// interface parity and ignored.
    pub fn put_with_ttl(
        &mut self,
        key: &str,
        value: Value,
        _ttl: Option<Duration>,
    ) -> StoreResult<()> {
        self.put(key, value)
    }

    /// Applies field update operators to an existing record.
    pub fn update(
        &mut self,
        key: &str,
        updates: impl IntoIterator<Item = (String, UpdateOp)>,
    ) -> StoreResult<()> {
        let Some(record) = self.records.get_mut(key) else {
            return Err(StoreError::KeyNotFound {
                key: key.to_owned(),
            });
        };
        let Some(object) = record.as_object_mut() else {
            return Err(StoreError::InvalidUpdate {
                key: key.to_owned(),
                field: String::new(),
            });
        };
        for (field, op) in updates {
            apply_op(object, key, &field, op)?;
        }
        self.sync()
    }

    /// Deletes a record by key.
    pub fn delete(&mut self, key: &str) -> StoreResult<()> {
        if self.records.remove(key).is_none() {
            return Err(StoreError::KeyNotFound {
                key: key.to_owned(),
            });
        }
        self.sync()
    }

    /// Inserts or overwrites a batch of records with a single mirror write.
    ///
    /// Batching limits are the caller's concern; the typed wrapper chunks
    /// to the backend's 25-record batches.
    pub fn put_many(&mut self, items: Vec<(String, Value)>) -> StoreResult<()> {
        for (key, value) in items {
            self.records.insert(key, value);
        }
        self.sync()
    }

    /// Fetches records matching a query, in key order.
    ///
    /// With no query everything matches. `limit` bounds the page size
    /// (zero means unbounded); `last` resumes strictly after that key. The
    /// response carries a new cursor when the page was cut short.
    #[must_use]
    pub fn fetch(
        &self,
        query: Option<&OrQuery>,
        limit: usize,
        last: Option<&str>,
    ) -> FetchResponse {
        let mut items = Vec::new();
        let mut truncated = false;
        for (key, value) in &self.records {
            if let Some(resume) = last {
                if key.as_str() <= resume {
                    continue;
                }
            }
            if !matches(query, key, value) {
                continue;
            }
            if limit > 0 && items.len() == limit {
                truncated = true;
                break;
            }
            items.push((key.clone(), value.clone()));
        }
        let last = if truncated {
            items.last().map(|(key, _)| key.clone())
        } else {
            None
        };
        FetchResponse { items, last }
    }

    /// Mirrors the map to disk when this base is disk-backed.
    ///
    /// Called from every mutating method; plain method composition, no
    /// interception.
    fn sync(&mut self) -> StoreResult<()> {
        let Some(mirror) = &self.mirror else {
            return Ok(());
        };
        let rendered = if mirror.pretty {
            serde_json::to_string_pretty(&self.records)
        } else {
            serde_json::to_string(&self.records)
        }
        .map_err(StoreError::InvalidRecord)?;
        fs::write(&mirror.path, rendered).map_err(|source| StoreError::Persist {
            path: mirror.path.clone(),
            source,
        })
    }
}

fn load_mirror(path: &Path) -> BTreeMap<String, Value> {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

/// Evaluates a query against a record with its key injected, so key
/// conditions like prefix scans work.
fn matches(query: Option<&OrQuery>, key: &str, value: &Value) -> bool {
    let Some(query) = query else {
        return true;
    };
    let mut with_key: Map<String, Value> = value.as_object().cloned().unwrap_or_default();
    with_key.insert("key".to_owned(), Value::String(key.to_owned()));
    query.matches(&with_key)
}

fn apply_op(
    object: &mut Map<String, Value>,
    key: &str,
    field: &str,
    op: UpdateOp,
) -> StoreResult<()> {
    let invalid = || StoreError::InvalidUpdate {
        key: key.to_owned(),
        field: field.to_owned(),
    };
    match op {
        UpdateOp::Set(value) => {
            object.insert(field.to_owned(), value);
        }
        UpdateOp::Delete => {
            object.remove(field).ok_or_else(invalid)?;
        }
        UpdateOp::Increment(delta) => {
            let current = object
                .get(field)
                .and_then(Value::as_i64)
                .ok_or_else(invalid)?;
            object.insert(field.to_owned(), Value::from(current + delta));
        }
        UpdateOp::Append(mut values) => {
            let list = object
                .get_mut(field)
                .and_then(Value::as_array_mut)
                .ok_or_else(invalid)?;
            list.append(&mut values);
        }
        UpdateOp::Prepend(mut values) => {
            let list = object
                .get_mut(field)
                .and_then(Value::as_array_mut)
                .ok_or_else(invalid)?;
            values.append(list);
            *list = values;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Field, Query};
    use serde_json::json;

    #[test]
    fn insert_then_get() {
        let mut base = Base::in_memory();
        base.insert("a", json!({"x": 1})).unwrap();
        assert_eq!(base.get("a"), Some(json!({"x": 1})));
        assert_eq!(base.get("b"), None);
    }

    #[test]
    fn insert_duplicate_fails() {
        let mut base = Base::in_memory();
        base.insert("a", json!({})).unwrap();
        let err = base.insert("a", json!({})).unwrap_err();
        assert!(matches!(err, StoreError::KeyExists { .. }));
    }

    #[test]
    fn put_overwrites() {
        let mut base = Base::in_memory();
        base.put("a", json!({"x": 1})).unwrap();
        base.put("a", json!({"x": 2})).unwrap();
        assert_eq!(base.get("a"), Some(json!({"x": 2})));
    }

    #[test]
    fn put_with_ttl_ignores_the_ttl() {
        let mut base = Base::in_memory();
        base.put_with_ttl("a", json!({"x": 1}), Some(Duration::from_secs(1)))
            .unwrap();
        assert!(base.get("a").is_some());
    }

    #[test]
    fn delete_missing_key_is_not_found() {
        let mut base = Base::in_memory();
        let err = base.delete("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_missing_key_is_not_found() {
        let mut base = Base::in_memory();
        let err = base
            .update("ghost", [("x".to_owned(), UpdateOp::Set(json!(1)))])
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_operators() {
        let mut base = Base::in_memory();
        base.put("a", json!({"n": 5, "tags": ["x"], "gone": true}))
            .unwrap();
        base.update(
            "a",
            [
                ("n".to_owned(), UpdateOp::Increment(3)),
                ("tags".to_owned(), UpdateOp::Append(vec![json!("y")])),
                ("tags".to_owned(), UpdateOp::Prepend(vec![json!("w")])),
                ("gone".to_owned(), UpdateOp::Delete),
                ("fresh".to_owned(), UpdateOp::Set(json!("new"))),
            ],
        )
        .unwrap();
        assert_eq!(
            base.get("a"),
            Some(json!({"n": 8, "tags": ["w", "x", "y"], "fresh": "new"}))
        );
    }

    #[test]
    fn increment_on_non_number_fails() {
        let mut base = Base::in_memory();
        base.put("a", json!({"n": "five"})).unwrap();
        let err = base
            .update("a", [("n".to_owned(), UpdateOp::Increment(1))])
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate { .. }));
    }

    #[test]
    fn fetch_without_query_returns_everything() {
        let mut base = Base::in_memory();
        base.put("b", json!({"n": 2})).unwrap();
        base.put("a", json!({"n": 1})).unwrap();
        let response = base.fetch(None, 0, None);
        let keys: Vec<_> = response.items.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"], "key order");
        assert!(response.last.is_none());
    }

    #[test]
    fn fetch_prefix_query_on_keys() {
        let mut base = Base::in_memory();
        base.put("bob$1", json!({})).unwrap();
        base.put("bob$2", json!({})).unwrap();
        base.put("alice$1", json!({})).unwrap();

        let query: OrQuery = Query::new([Field::new("key").starts_with("bob$")])
            .unwrap()
            .into();
        let response = base.fetch(Some(&query), 0, None);
        let keys: Vec<_> = response.items.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["bob$1", "bob$2"]);
    }

    #[test]
    fn fetch_pagination_resumes_after_cursor() {
        let mut base = Base::in_memory();
        base.put("bob$1", json!({})).unwrap();
        base.put("bob$2", json!({})).unwrap();
        base.put("alice$1", json!({})).unwrap();

        let query: OrQuery = Query::new([Field::new("key").starts_with("bob$")])
            .unwrap()
            .into();
        let first = base.fetch(Some(&query), 1, None);
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.items[0].0, "bob$1");
        assert_eq!(first.last.as_deref(), Some("bob$1"));

        let second = base.fetch(Some(&query), 1, first.last.as_deref());
        assert_eq!(second.items[0].0, "bob$2");
        assert!(second.last.is_none(), "no more matches after the page");
    }

    #[test]
    fn fetch_full_page_without_more_matches_has_no_cursor() {
        let mut base = Base::in_memory();
        base.put("a", json!({})).unwrap();
        let response = base.fetch(None, 1, None);
        assert_eq!(response.items.len(), 1);
        assert!(response.last.is_none());
    }
}
