//! Inspection and debugging tools for ptdsave payloads and stores.
//!
//! This crate provides utilities for looking inside captured payloads and
//! store mirror files:
//!
//! - Decode party/item/counter payloads into JSON
//! - Recompute the story checksum
//! - Summarize a store mirror file
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

/// The payload kinds the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// A party diff (`extra3`), decoded against an empty stored party.
    Party,
    /// An inventory list (`extra4`).
    Items,
    /// A counter list (`extra2`).
    Extras,
}

/// Decodes a captured payload into structured JSON.
///
/// Party payloads are decoded as a first save: every entry must be fresh,
/// since there is no stored party to diff against. Nicknames are taken
/// from `nicknames`, keyed by 1-based payload position.
pub fn decode_payload_json(
    kind: PayloadKind,
    payload: &str,
    nicknames: &BTreeMap<u64, String>,
) -> Result<Value> {
    let value = match kind {
        PayloadKind::Party => {
            let diff = codec::decode_party(payload, Vec::new(), nicknames)
                .context("decode party payload")?;
            json!({
                "to_insert": diff.to_insert,
                "to_update": diff.to_update,
                "to_delete": diff.to_delete,
            })
        }
        PayloadKind::Items => {
            let items = codec::decode_items(payload).context("decode item payload")?;
            serde_json::to_value(items)?
        }
        PayloadKind::Extras => {
            let infos = codec::decode_extras(payload).context("decode extra-info payload")?;
            serde_json::to_value(infos)?
        }
    };
    Ok(value)
}

/// A summary of one store mirror file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    /// Number of records in the mirror.
    pub records: usize,
    /// The record keys, in store order.
    pub keys: Vec<String>,
}

/// Summarizes a store mirror file.
pub fn inspect_mirror(path: &Path) -> Result<MirrorReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read mirror {}", path.display()))?;
    let records: BTreeMap<String, Value> =
        serde_json::from_str(&content).context("parse mirror JSON")?;
    Ok(MirrorReport {
        records: records.len(),
        keys: records.keys().cloned().collect(),
    })
}
