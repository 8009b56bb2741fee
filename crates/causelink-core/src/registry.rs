//! The codec registry — maps stable type keys to encoder/decoder pairs.
//!
//! Registration is process-wide and write-once per key: registrant crates
//! call their `register()` hook from startup code, before concurrent use
//! begins, and the registry is read-only afterwards. Registering the same
//! key twice with the same codec pair is a no-op; registering it with a
//! *different* pair is a configuration error and panics immediately, so
//! behavior can never drift silently mid-run.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use thiserror::Error;

use crate::chain::{ChainError, LeafError, WrappedError, LEAF_TYPE_KEY, WRAP_TYPE_KEY};

/// What a type-specific encoder contributes for one chain node.
pub struct EncodedNode {
    /// Overrides the node's own `message()` on the wire when `Some`.
    pub message: Option<String>,
    /// Opaque display strings, preserved verbatim for peers that cannot
    /// reconstruct the typed payload.
    pub details: Vec<String>,
    /// Type-owned payload blob; the core never interprets it.
    pub payload: Vec<u8>,
}

impl EncodedNode {
    /// An encoding with no override, no details, and no payload.
    pub fn empty() -> Self {
        Self { message: None, details: Vec::new(), payload: Vec::new() }
    }
}

/// A registered decoder failed to parse its own payload — version skew or
/// corruption, reported to the caller via [`crate::wire::DecodeError`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PayloadError(pub String);

impl From<serde_json::Error> for PayloadError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

/// Produces the wire fields for a node of the registrant's own type.
/// Must be total for validly-constructed nodes.
pub type EncoderFn = fn(&dyn ChainError) -> EncodedNode;

/// Rebuilds a live node from `(cause, message, details, payload)`.
/// Fails only on a payload it cannot parse.
pub type DecoderFn = fn(
    cause: Option<Box<dyn ChainError>>,
    message: &str,
    details: &[String],
    payload: &[u8],
) -> Result<Box<dyn ChainError>, PayloadError>;

#[derive(Clone, Copy)]
pub(crate) struct Entry {
    pub(crate) encoder: EncoderFn,
    pub(crate) decoder: DecoderFn,
}

/// A type-key → codec table.
///
/// The process-wide instance lives behind [`global()`]; independent instances
/// exist so tests can model a peer with a different registration set.
pub struct CodecRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl CodecRegistry {
    /// An empty registry — no codecs, not even the built-in ones.
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    /// A registry with the built-in leaf and wrap codecs pre-registered.
    pub fn with_builtins() -> Self {
        let reg = Self::new();
        reg.register(LEAF_TYPE_KEY, encode_leaf, decode_leaf);
        reg.register(WRAP_TYPE_KEY, encode_wrap, decode_wrap);
        reg
    }

    /// Associate a codec pair with a type key.
    ///
    /// Registering the identical pair again is a no-op, so every startup
    /// path may call a registrant's `register()` hook. Sameness is judged
    /// by function-pointer comparison, which is best-effort: codegen may
    /// merge or duplicate function bodies, so keep each registrant's
    /// registration in a single startup routine rather than relying on
    /// the comparison across compilation units.
    ///
    /// # Panics
    ///
    /// Panics if the key is already registered with a different pair.
    #[allow(unknown_lints, unpredictable_function_pointer_comparisons)]
    pub fn register(&self, type_key: &str, encoder: EncoderFn, decoder: DecoderFn) {
        let mut entries = match self.entries.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = entries.get(type_key) {
            if existing.encoder == encoder && existing.decoder == decoder {
                return;
            }
            panic!("conflicting codec registration for type key `{type_key}`");
        }
        tracing::trace!(type_key, "registered error codec");
        entries.insert(type_key.to_string(), Entry { encoder, decoder });
    }

    /// Whether a codec is registered for the key.
    pub fn is_registered(&self, type_key: &str) -> bool {
        self.lookup(type_key).is_some()
    }

    /// Number of registered type keys.
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(g) => g.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Returns `true` if no codec is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn lookup(&self, type_key: &str) -> Option<Entry> {
        match self.entries.read() {
            Ok(g) => g.get(type_key).copied(),
            Err(poisoned) => poisoned.into_inner().get(type_key).copied(),
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry, created on first use with the built-in codecs.
pub fn global() -> &'static CodecRegistry {
    static GLOBAL: OnceLock<CodecRegistry> = OnceLock::new();
    GLOBAL.get_or_init(CodecRegistry::with_builtins)
}

// ─── Built-in codecs ──────────────────────────────────────────────────────────

fn encode_leaf(_node: &dyn ChainError) -> EncodedNode {
    EncodedNode::empty()
}

fn decode_leaf(
    cause: Option<Box<dyn ChainError>>,
    message: &str,
    _details: &[String],
    _payload: &[u8],
) -> Result<Box<dyn ChainError>, PayloadError> {
    // A leaf record anywhere but root position would drop the chain below it.
    if cause.is_some() {
        return Err(PayloadError("leaf record has a cause".into()));
    }
    Ok(Box::new(LeafError::new(message)))
}

fn encode_wrap(_node: &dyn ChainError) -> EncodedNode {
    EncodedNode::empty()
}

fn decode_wrap(
    cause: Option<Box<dyn ChainError>>,
    message: &str,
    _details: &[String],
    _payload: &[u8],
) -> Result<Box<dyn ChainError>, PayloadError> {
    let cause = cause.ok_or_else(|| PayloadError("wrapper record has no cause".into()))?;
    Ok(Box::new(WrappedError::new(cause, message)))
}
