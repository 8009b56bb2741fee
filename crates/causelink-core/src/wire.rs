//! The wire protocol — turn a chain into records and back.
//!
//! Encode walks the chain outermost-to-root producing one [`WireRecord`] per
//! node. Decode consumes the records in reverse so each step has its
//! already-reconstructed cause available. A record whose type key has no
//! local codec decodes to an [`OpaqueError`] placeholder: message and detail
//! strings survive verbatim, the typed payload is dropped, and the node stops
//! matching its original type in predicate search. Degradation is explicit,
//! never a crash and never a silently shortened chain.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{ChainError, LEAF_TYPE_KEY, MAX_CHAIN_DEPTH};
use crate::format::simple;
use crate::registry::CodecRegistry;

/// One encoded chain node. A chain of N nodes becomes N records,
/// outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecord {
    /// Registry key of the node's concrete type.
    pub type_key: String,
    /// Short message fragment (possibly the encoder's override).
    pub message: String,
    /// Opaque display strings for best-effort rendering on peers that
    /// cannot reconstruct the payload.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    /// Type-owned blob, uninterpreted by the core. Hex-encoded in JSON.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "hex_bytes")]
    pub payload: Vec<u8>,
}

/// Serialize payload bytes as a lowercase hex string.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Why a whole-chain decode failed.
///
/// An unknown type key is *not* a failure (it degrades to [`OpaqueError`]);
/// these are the cases where continuing would yield a chain with missing or
/// wrong links, which is worse than an explicit error.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The record sequence was empty — there is no chain to reconstruct.
    #[error("cannot decode an empty wire sequence")]
    EmptyChain,

    /// A registered decoder rejected its own payload (version skew or
    /// corruption). Frame positions are 1-based, outermost = 1.
    #[error("malformed payload for type key `{type_key}` at frame {frame}: {reason}")]
    MalformedPayload {
        type_key: String,
        frame: usize,
        reason: String,
    },
}

// ─── Opaque fallback ──────────────────────────────────────────────────────────

/// Prefix tagging the synthetic identity of an opaque placeholder.
pub const OPAQUE_KEY_PREFIX: &str = "opaque:";

/// Stand-in for a node whose type key had no local codec at decode time.
///
/// Message and details are preserved verbatim; the typed payload is gone, so
/// the node reports a synthetic `opaque:<original-key>` identity and no longer
/// matches the original type in predicate search.
#[derive(Debug)]
pub struct OpaqueError {
    original_key: String,
    tagged_key: String,
    message: String,
    details: Vec<String>,
    cause: Option<Box<dyn ChainError>>,
}

impl OpaqueError {
    fn new(record: &WireRecord, cause: Option<Box<dyn ChainError>>) -> Self {
        Self {
            tagged_key: format!("{OPAQUE_KEY_PREFIX}{}", record.type_key),
            original_key: record.type_key.clone(),
            message: record.message.clone(),
            details: record.details.clone(),
            cause,
        }
    }

    /// The type key the producing process transmitted.
    pub fn original_type_key(&self) -> &str {
        &self.original_key
    }
}

impl ChainError for OpaqueError {
    fn message(&self) -> &str {
        &self.message
    }

    fn cause(&self) -> Option<&dyn ChainError> {
        self.cause.as_deref()
    }

    fn type_key(&self) -> &str {
        &self.tagged_key
    }

    fn detail_lines(&self) -> Vec<String> {
        self.details.clone()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

// ─── Encode ───────────────────────────────────────────────────────────────────

/// Encode a chain to wire records, outermost first.
///
/// A node with no registered encoder is captured by the default encoder —
/// its message text becomes both the record message and the sole detail —
/// so a value is never silently untransmittable. An opaque placeholder
/// re-encodes under its original key, passing its preserved text through
/// unchanged.
///
/// A chain deeper than [`MAX_CHAIN_DEPTH`] still encodes to a decodable
/// sequence: the frames beyond the cap are flattened into a terminal leaf
/// record carrying their joined message text, rather than being dropped.
pub fn encode(reg: &CodecRegistry, err: &dyn ChainError) -> Vec<WireRecord> {
    let mut records = Vec::new();
    let mut next = Some(err);
    while let Some(node) = next {
        if records.len() + 1 == MAX_CHAIN_DEPTH && node.cause().is_some() {
            records.push(elision_record(node));
            break;
        }
        records.push(encode_node(reg, node));
        next = node.cause();
    }
    records
}

/// Terminal record standing in for the sub-chain from `node` down: its
/// simple-format text becomes one leaf, so the record sequence ends in a
/// root-position record and no message text is silently lost.
fn elision_record(node: &dyn ChainError) -> WireRecord {
    WireRecord {
        type_key: LEAF_TYPE_KEY.to_string(),
        message: simple(node),
        details: vec!["deeper causes flattened".to_string()],
        payload: Vec::new(),
    }
}

fn encode_node(reg: &CodecRegistry, node: &dyn ChainError) -> WireRecord {
    if let Some(opaque) = node.as_any().downcast_ref::<OpaqueError>() {
        return WireRecord {
            type_key: opaque.original_key.clone(),
            message: opaque.message.clone(),
            details: opaque.details.clone(),
            payload: Vec::new(),
        };
    }

    let key = node.type_key();
    match reg.lookup(key) {
        Some(entry) => {
            let enc = (entry.encoder)(node);
            WireRecord {
                type_key: key.to_string(),
                message: enc.message.unwrap_or_else(|| node.message().to_string()),
                details: enc.details,
                payload: enc.payload,
            }
        }
        None => WireRecord {
            type_key: key.to_string(),
            message: node.message().to_string(),
            details: vec![node.message().to_string()],
            payload: Vec::new(),
        },
    }
}

// ─── Decode ───────────────────────────────────────────────────────────────────

/// Reconstruct a chain from wire records.
///
/// Records are consumed innermost-first: the last record becomes the new root
/// (decoded with no cause) and each earlier record wraps the result. The
/// reconstructed chain has the same length and nesting order as the original.
pub fn decode(
    reg: &CodecRegistry,
    records: &[WireRecord],
) -> Result<Box<dyn ChainError>, DecodeError> {
    if records.is_empty() {
        return Err(DecodeError::EmptyChain);
    }

    let mut cause: Option<Box<dyn ChainError>> = None;
    for (i, record) in records.iter().enumerate().rev() {
        let node = match reg.lookup(&record.type_key) {
            Some(entry) => (entry.decoder)(
                cause.take(),
                &record.message,
                &record.details,
                &record.payload,
            )
            .map_err(|e| DecodeError::MalformedPayload {
                type_key: record.type_key.clone(),
                frame: i + 1,
                reason: e.to_string(),
            })?,
            None => {
                tracing::debug!(
                    type_key = %record.type_key,
                    "no codec registered, substituting opaque placeholder"
                );
                Box::new(OpaqueError::new(record, cause.take()))
            }
        };
        cause = Some(node);
    }

    // Non-empty input always leaves the outermost node here.
    match cause {
        Some(outer) => Ok(outer),
        None => Err(DecodeError::EmptyChain),
    }
}
