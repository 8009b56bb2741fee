//! Generic predicate search over a chain.
//!
//! Traversal order is outermost-to-innermost, so when two wrappers of the
//! same domain type are stacked, the outer (most recently applied) one wins.
//! Search behaves identically on locally-built and decoded chains; a node
//! decoded as an opaque placeholder never matches a concrete type.

use crate::chain::{frames, ChainError};

/// Apply `pred` to each node, outermost first, returning the first match.
pub fn find_first<T, F>(err: &dyn ChainError, mut pred: F) -> Option<T>
where
    F: FnMut(&dyn ChainError) -> Option<T>,
{
    frames(err).find_map(|node| pred(node))
}

/// First node of concrete type `T` in the chain, outermost first.
///
/// Walks the frames directly rather than through [`find_first`], so the
/// returned borrow stays tied to `err` instead of to the predicate's
/// per-call argument.
pub fn find_typed<T: 'static>(err: &dyn ChainError) -> Option<&T> {
    frames(err).find_map(|node| node.as_any().downcast_ref::<T>())
}

/// Whether any node in the chain has concrete type `T`.
pub fn has_typed<T: 'static>(err: &dyn ChainError) -> bool {
    find_typed::<T>(err).is_some()
}
