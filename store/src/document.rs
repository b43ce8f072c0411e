//! Type-preserving document codec.
//!
//! The physical store holds JSON trees and cannot tell `null`, an empty map
//! and an empty list apart once they round-trip, and has no timestamp or
//! reference type at all. The codec rewrites map fields into sentinel
//! strings on the way in and reverses them on the way out, so the logical
//! [`Doc`] tree survives storage intact.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::DocumentError;

/// Sentinel stored for an empty list field.
pub const EMPTY_LIST: &str = "$EMPTY_LIST";
/// Sentinel stored for an empty map field.
pub const EMPTY_DICT: &str = "$EMPTY_DICT";
/// Prefix for timestamp fields, followed by the ISO-8601 form.
pub const DATETIME_PREFIX: &str = "$ENCODED_DATETIME";
/// Escape prefix for user strings that happen to start with `$`.
pub const ESCAPE_PREFIX: &str = "$NOOP";

const LOAD_METHOD_KEY: &str = "__database_load_method";
const FUNCTION_NAME_KEY: &str = "__name";
const MODEL_NAME_KEY: &str = "__class_name";
const LOAD_METHOD_FUNCTION: &str = "function";
const LOAD_METHOD_MODEL: &str = "model";

/// A logical document value.
///
/// Non-negative integers canonicalize to `UInt`, negative ones to `Int`,
/// so equality over round-tripped trees is well defined.
#[derive(Debug, Clone, PartialEq)]
pub enum Doc {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<Doc>),
    Map(BTreeMap<String, Doc>),
    Timestamp(DateTime<Utc>),
    /// A reference to a function registered by name.
    FuncRef(String),
    /// A named record type reconstructed through the registry on load.
    Model {
        name: String,
        fields: BTreeMap<String, Doc>,
    },
}

impl Doc {
    /// Short name of the variant, for error reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Timestamp(_) => "timestamp",
            Self::FuncRef(_) => "function reference",
            Self::Model { .. } => "model",
        }
    }
}

/// The set of model tags and function names the codec may reference.
///
/// Built once at startup and handed to every database; there is no global
/// registry.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    models: BTreeSet<String>,
    functions: BTreeSet<String>,
}

impl DocumentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model tag.
    pub fn register_model(&mut self, name: impl Into<String>) -> Result<(), DocumentError> {
        let name = name.into();
        if self.models.contains(&name) || self.functions.contains(&name) {
            return Err(DocumentError::DuplicateRegistration { name });
        }
        self.models.insert(name);
        Ok(())
    }

    /// Registers a function name.
    pub fn register_function(&mut self, name: impl Into<String>) -> Result<(), DocumentError> {
        let name = name.into();
        if self.models.contains(&name) || self.functions.contains(&name) {
            return Err(DocumentError::DuplicateRegistration { name });
        }
        self.functions.insert(name);
        Ok(())
    }

    /// Returns `true` if the model tag is registered.
    #[must_use]
    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains(name)
    }

    /// Returns `true` if the function name is registered.
    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }
}

/// Encodes a document for storage.
///
/// The transform is per map field and non-destructive; the input is not
/// consumed or modified.
pub fn encode_document(doc: &Doc, registry: &DocumentRegistry) -> Result<Value, DocumentError> {
    match doc {
        Doc::Map(fields) => encode_fields(fields, registry).map(Value::Object),
        Doc::Model { name, fields } => encode_model(name, fields, registry),
        other => Err(DocumentError::TopLevelNotMap { kind: other.kind() }),
    }
}

fn encode_model(
    name: &str,
    fields: &BTreeMap<String, Doc>,
    registry: &DocumentRegistry,
) -> Result<Value, DocumentError> {
    if !registry.has_model(name) {
        return Err(DocumentError::UnregisteredModel {
            name: name.to_owned(),
        });
    }
    let mut object = encode_fields(fields, registry)?;
    object.insert(
        LOAD_METHOD_KEY.to_owned(),
        Value::String(LOAD_METHOD_MODEL.to_owned()),
    );
    object.insert(MODEL_NAME_KEY.to_owned(), Value::String(name.to_owned()));
    Ok(Value::Object(object))
}

fn encode_fields(
    fields: &BTreeMap<String, Doc>,
    registry: &DocumentRegistry,
) -> Result<Map<String, Value>, DocumentError> {
    let mut object = Map::new();
    for (key, value) in fields {
        object.insert(key.clone(), encode_field(value, registry)?);
    }
    Ok(object)
}

fn encode_field(value: &Doc, registry: &DocumentRegistry) -> Result<Value, DocumentError> {
    match value {
        Doc::Map(fields) if fields.is_empty() => Ok(Value::String(EMPTY_DICT.to_owned())),
        Doc::Map(fields) => encode_fields(fields, registry).map(Value::Object),
        Doc::Model { name, fields } => encode_model(name, fields, registry),
        Doc::List(elements) if elements.is_empty() => {
            Ok(Value::String(EMPTY_LIST.to_owned()))
        }
        Doc::List(elements) => {
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                out.push(encode_list_element(element, registry)?);
            }
            Ok(Value::Array(out))
        }
        Doc::Timestamp(when) => Ok(Value::String(format!(
            "{DATETIME_PREFIX}{}",
            when.to_rfc3339()
        ))),
        Doc::FuncRef(name) => {
            if !registry.has_function(name) {
                return Err(DocumentError::UnregisteredFunction { name: name.clone() });
            }
            let mut object = Map::new();
            object.insert(
                LOAD_METHOD_KEY.to_owned(),
                Value::String(LOAD_METHOD_FUNCTION.to_owned()),
            );
            object.insert(FUNCTION_NAME_KEY.to_owned(), Value::String(name.clone()));
            Ok(Value::Object(object))
        }
        Doc::Str(s) if s.starts_with('$') => Ok(Value::String(format!("{ESCAPE_PREFIX}{s}"))),
        Doc::Str(s) => Ok(Value::String(s.clone())),
        Doc::Null => Ok(Value::Null),
        Doc::Bool(b) => Ok(Value::Bool(*b)),
        Doc::Int(i) => Ok(Value::from(*i)),
        Doc::UInt(u) => Ok(Value::from(*u)),
        Doc::Float(x) => Ok(Value::from(*x)),
    }
}

/// Only maps and models are rewritten inside lists; scalar elements pass
/// through raw, and one level of list nesting is the ceiling.
fn encode_list_element(
    element: &Doc,
    registry: &DocumentRegistry,
) -> Result<Value, DocumentError> {
    match element {
        Doc::Map(fields) => encode_fields(fields, registry).map(Value::Object),
        Doc::Model { name, fields } => encode_model(name, fields, registry),
        Doc::Null => Ok(Value::Null),
        Doc::Bool(b) => Ok(Value::Bool(*b)),
        Doc::Int(i) => Ok(Value::from(*i)),
        Doc::UInt(u) => Ok(Value::from(*u)),
        Doc::Float(x) => Ok(Value::from(*x)),
        Doc::Str(s) => Ok(Value::String(s.clone())),
        Doc::List(_) | Doc::Timestamp(_) | Doc::FuncRef(_) => {
            Err(DocumentError::UnsupportedListElement {
                kind: element.kind(),
            })
        }
    }
}

/// Decodes a stored document back into its logical form.
pub fn decode_document(value: &Value, registry: &DocumentRegistry) -> Result<Doc, DocumentError> {
    match value {
        Value::Object(object) => decode_map(object, registry),
        other => Err(DocumentError::TopLevelNotMap {
            kind: json_kind(other),
        }),
    }
}

fn decode_map(
    object: &Map<String, Value>,
    registry: &DocumentRegistry,
) -> Result<Doc, DocumentError> {
    let mut fields = BTreeMap::new();
    for (key, value) in object {
        fields.insert(key.clone(), decode_field(value, registry)?);
    }

    let Some(Doc::Str(method)) = fields.get(LOAD_METHOD_KEY).cloned() else {
        return Ok(Doc::Map(fields));
    };
    fields.remove(LOAD_METHOD_KEY);
    match method.as_str() {
        LOAD_METHOD_FUNCTION => {
            let Some(Doc::Str(name)) = fields.remove(FUNCTION_NAME_KEY) else {
                return Err(DocumentError::UnknownLoadMethod { method });
            };
            if !registry.has_function(&name) {
                return Err(DocumentError::UnregisteredFunction { name });
            }
            Ok(Doc::FuncRef(name))
        }
        LOAD_METHOD_MODEL => {
            let Some(Doc::Str(name)) = fields.remove(MODEL_NAME_KEY) else {
                return Err(DocumentError::UnknownLoadMethod { method });
            };
            if !registry.has_model(&name) {
                return Err(DocumentError::UnregisteredModel { name });
            }
            Ok(Doc::Model { name, fields })
        }
        _ => Err(DocumentError::UnknownLoadMethod { method }),
    }
}

fn decode_field(value: &Value, registry: &DocumentRegistry) -> Result<Doc, DocumentError> {
    match value {
        Value::Object(object) => decode_map(object, registry),
        Value::Array(elements) => {
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                // Map elements are decoded in full; scalars pass through raw,
                // mirroring the encode side.
                out.push(match element {
                    Value::Object(object) => decode_map(object, registry)?,
                    other => plain_value_to_doc(other),
                });
            }
            Ok(Doc::List(out))
        }
        Value::String(s) => decode_string(s),
        other => Ok(plain_value_to_doc(other)),
    }
}

fn decode_string(s: &str) -> Result<Doc, DocumentError> {
    if s == EMPTY_DICT {
        return Ok(Doc::Map(BTreeMap::new()));
    }
    if s == EMPTY_LIST {
        return Ok(Doc::List(Vec::new()));
    }
    if let Some(raw) = s.strip_prefix(DATETIME_PREFIX) {
        let when = DateTime::parse_from_rfc3339(raw).map_err(|_| DocumentError::BadTimestamp {
            value: raw.to_owned(),
        })?;
        return Ok(Doc::Timestamp(when.with_timezone(&Utc)));
    }
    if let Some(raw) = s.strip_prefix(ESCAPE_PREFIX) {
        return Ok(Doc::Str(raw.to_owned()));
    }
    Ok(Doc::Str(s.to_owned()))
}

fn plain_value_to_doc(value: &Value) -> Doc {
    match value {
        Value::Null => Doc::Null,
        Value::Bool(b) => Doc::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Doc::UInt(u)
            } else if let Some(i) = n.as_i64() {
                Doc::Int(i)
            } else {
                Doc::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Doc::Str(s.clone()),
        Value::Array(elements) => Doc::List(elements.iter().map(plain_value_to_doc).collect()),
        Value::Object(object) => Doc::Map(
            object
                .iter()
                .map(|(k, v)| (k.clone(), plain_value_to_doc(v)))
                .collect(),
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Converts a plain JSON tree into a logical document, structurally.
///
/// No sentinel handling happens here; this is the bridge for serde-derived
/// records on their way into [`encode_document`].
#[must_use]
pub fn value_to_doc(value: &Value) -> Doc {
    plain_value_to_doc(value)
}

/// Converts a logical document back into a plain JSON tree.
///
/// Timestamps flatten to their ISO-8601 strings; references and models
/// have no plain form and fail.
pub fn doc_to_value(doc: &Doc) -> Result<Value, DocumentError> {
    match doc {
        Doc::Null => Ok(Value::Null),
        Doc::Bool(b) => Ok(Value::Bool(*b)),
        Doc::Int(i) => Ok(Value::from(*i)),
        Doc::UInt(u) => Ok(Value::from(*u)),
        Doc::Float(x) => Ok(Value::from(*x)),
        Doc::Str(s) => Ok(Value::String(s.clone())),
        Doc::Timestamp(when) => Ok(Value::String(when.to_rfc3339())),
        Doc::List(elements) => {
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                out.push(doc_to_value(element)?);
            }
            Ok(Value::Array(out))
        }
        Doc::Map(fields) => {
            let mut object = Map::new();
            for (key, value) in fields {
                object.insert(key.clone(), doc_to_value(value)?);
            }
            Ok(Value::Object(object))
        }
        Doc::FuncRef(_) | Doc::Model { .. } => Err(DocumentError::UnsupportedConversion {
            kind: doc.kind(),
        }),
    }
}
