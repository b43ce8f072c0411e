//! Typed database wrapper over the embedded base.

use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::base::{Base, StoreOptions, UpdateOp};
use crate::document::{
    decode_document, doc_to_value, encode_document, value_to_doc, DocumentRegistry,
};
use crate::error::{StoreError, StoreResult};
use crate::query::OrQuery;

/// Largest batch the backing store accepts in one `put_many` call.
pub const PUT_MANY_BATCH: usize = 25;

/// A typed view over a [`Base`], gluing record serde to the document codec.
///
/// Every record passes through the type-preserving document transform on
/// its way in and out, so empty containers and sentinel-colliding strings
/// survive storage.
#[derive(Debug)]
pub struct Database<R> {
    name: String,
    base: Base,
    registry: DocumentRegistry,
    _record: PhantomData<R>,
}

impl<R: Serialize + DeserializeOwned> Database<R> {
    /// Opens a database.
    ///
    /// With options the base mirrors to `<data_dir>/<name>.json`; without,
    /// it lives purely in memory.
    pub fn open(
        name: &str,
        options: Option<&StoreOptions>,
        registry: DocumentRegistry,
    ) -> StoreResult<Self> {
        let base = match options {
            Some(options) => Base::on_disk(name, options)?,
            None => Base::in_memory(),
        };
        Ok(Self {
            name: name.to_owned(),
            base,
            registry,
            _record: PhantomData,
        })
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.base.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Retrieves a record by key, or `None` when absent.
    pub fn get(&self, key: &str) -> StoreResult<Option<R>> {
        let Some(stored) = self.base.get(key) else {
            return Ok(None);
        };
        self.load(&stored).map(Some)
    }

    /// Inserts a record; fails with the already-exists condition when the
    /// key is taken.
    pub fn insert(&mut self, key: &str, record: &R) -> StoreResult<()> {
        let value = self.dump(record)?;
        self.base.insert(key, value)
    }

    /// Inserts or overwrites a record.
    pub fn put(&mut self, key: &str, record: &R) -> StoreResult<()> {
        let value = self.dump(record)?;
        self.base.put(key, value)
    }

    /// [`put`](Self::put) with an accepted-but-ignored time-to-live.
    pub fn put_with_ttl(&mut self, key: &str, record: &R, ttl: Option<Duration>) -> StoreResult<()> {
        let value = self.dump(record)?;
        self.base.put_with_ttl(key, value, ttl)
    }

    /// Applies field update operators to a stored record.
    ///
    /// Fails with the distinguishable not-found condition when the key is
    /// absent. Values pass through the document transform.
    pub fn update(
        &mut self,
        key: &str,
        updates: impl IntoIterator<Item = (String, UpdateOp)>,
    ) -> StoreResult<()> {
        let updates = updates
            .into_iter()
            .map(|(field, op)| {
                let op = match op {
                    UpdateOp::Set(value) => UpdateOp::Set(self.transform_value(value)?),
                    other => other,
                };
                Ok((field, op))
            })
            .collect::<StoreResult<Vec<_>>>()?;
        self.base.update(key, updates)
    }

    /// Deletes a record by key; absent keys are a not-found error.
    pub fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.base.delete(key)
    }

    /// Inserts or overwrites many records.
    ///
    /// With `chunked` the records go down in batches of
    /// [`PUT_MANY_BATCH`]; batches are independent, so a failure after the
    /// first batch leaves earlier batches applied.
    pub fn put_many(
        &mut self,
        records: impl IntoIterator<Item = (String, R)>,
        chunked: bool,
    ) -> StoreResult<()> {
        let mut encoded = Vec::new();
        for (key, record) in records {
            encoded.push((key, self.dump(&record)?));
        }
        if !chunked {
            return self.base.put_many(encoded);
        }
        let mut rest = encoded;
        while !rest.is_empty() {
            let tail = rest.split_off(rest.len().min(PUT_MANY_BATCH));
            self.base.put_many(rest)?;
            rest = tail;
        }
        Ok(())
    }

    /// Fetches records matching a query.
    ///
    /// `limit` bounds the result count (zero means unbounded), `last`
    /// resumes after a previous page, and `follow_last` keeps fetching
    /// pages until the limit is satisfied or the cursor runs dry.
    pub fn fetch(
        &self,
        query: Option<&OrQuery>,
        limit: usize,
        last: Option<&str>,
        follow_last: bool,
    ) -> StoreResult<Vec<R>> {
        let mut records = Vec::new();
        let mut cursor = last.map(ToOwned::to_owned);
        loop {
            let remaining = if limit == 0 { 0 } else { limit - records.len() };
            let response = self.base.fetch(query, remaining, cursor.as_deref());
            for (_, value) in &response.items {
                records.push(self.load(value)?);
            }
            cursor = response.last;
            let done = cursor.is_none()
                || !follow_last
                || (limit > 0 && records.len() >= limit);
            if done {
                return Ok(records);
            }
        }
    }

    fn dump(&self, record: &R) -> StoreResult<Value> {
        let plain = serde_json::to_value(record)?;
        let doc = value_to_doc(&plain);
        encode_document(&doc, &self.registry).map_err(StoreError::from)
    }

    fn load(&self, stored: &Value) -> StoreResult<R> {
        let doc = decode_document(stored, &self.registry)?;
        let plain = doc_to_value(&doc)?;
        serde_json::from_value(plain).map_err(StoreError::from)
    }

    fn transform_value(&self, value: Value) -> StoreResult<Value> {
        // Scalars pass as-is; maps get the full field transform so update
        // payloads match what put would have stored.
        if value.is_object() {
            let doc = value_to_doc(&value);
            encode_document(&doc, &self.registry).map_err(StoreError::from)
        } else {
            Ok(value)
        }
    }
}
