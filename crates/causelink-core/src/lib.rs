//! causelink-core — foundation of the Causelink error-chain library.
//!
//! This crate defines:
//! - [`ChainError`] — the chain node trait: message, optional cause, type key
//! - [`wrap`] / [`leaf`] — chain construction (wrapping the absent sentinel
//!   yields the absent sentinel)
//! - [`find_first`] — generic outer-to-inner predicate search
//! - [`simple`] / [`verbose`] / [`quoted`] — the two-and-a-half render modes
//! - [`CodecRegistry`] — the type-key → encoder/decoder table
//! - [`encode`] / [`decode`] — the wire protocol, with [`OpaqueError`]
//!   substitution for type keys the local process does not know

pub mod chain;
pub mod format;
pub mod registry;
pub mod search;
pub mod wire;

pub use chain::{
    depth, frames, leaf, root_cause, wrap, ChainError, LeafError, WrappedError,
    LEAF_TYPE_KEY, MAX_CHAIN_DEPTH, WRAP_TYPE_KEY,
};
pub use format::{quoted, simple, verbose};
pub use registry::{global, CodecRegistry, DecoderFn, EncodedNode, EncoderFn, PayloadError};
pub use search::{find_first, find_typed, has_typed};
pub use wire::{decode, encode, DecodeError, OpaqueError, WireRecord, OPAQUE_KEY_PREFIX};
