//! Embedded document store for the ptdsave service.
//!
//! Three layers, bottom up:
//!
//! - [`Base`]: an ordered in-memory map of JSON documents, optionally
//!   mirrored to a single file after every mutation.
//! - The document codec ([`Doc`], [`encode_document`], [`decode_document`]):
//!   a reversible transform that lets the store hold values its physical
//!   format would otherwise corrupt (empty containers, timestamps,
//!   `$`-prefixed strings, registered references).
//! - [`Database`]: the typed wrapper gluing record serde to both.
//!
//! Queries are conjunctions of field conditions built through [`Field`],
//! optionally disjoined into an [`OrQuery`].
//!
//! # Durability
//!
//! The disk mirror rewrites the whole file synchronously with no
//! partial-write protection. A crash mid-write can corrupt it. This is a
//! deliberate trade for a low-throughput save store.

mod base;
mod database;
mod document;
mod error;
mod query;

pub use base::{Base, FetchResponse, StoreOptions, UpdateOp};
pub use database::{Database, PUT_MANY_BATCH};
pub use document::{
    decode_document, doc_to_value, encode_document, value_to_doc, Doc, DocumentRegistry,
    DATETIME_PREFIX, EMPTY_DICT, EMPTY_LIST, ESCAPE_PREFIX,
};
pub use error::{DocumentError, QueryError, StoreError, StoreResult};
pub use query::{Condition, Field, OrQuery, Query};
