//! The chain model — causally-linked error values.
//!
//! A chain is the sequence reachable by following [`ChainError::cause`] links
//! from an outermost wrapper down to the root cause (the node with no cause).
//! Chains are built once by wrapping and never mutated; ownership flows
//! wrapper → cause through a `Box`, so a chain is acyclic by construction.
//!
//! The "no error" sentinel is `Option::<Box<dyn ChainError>>::None`. Wrapping
//! the sentinel yields the sentinel — call sites may wrap unconditionally
//! without checking for absence first.

use std::any::Any;

/// Hard cap on chain traversal depth.
///
/// Cycles are impossible given `Box` ownership, but traversal still refuses
/// to walk further than this rather than loop forever on a broken chain.
pub const MAX_CHAIN_DEPTH: usize = 1024;

/// A node in an error chain: a message, an optional cause, and a stable
/// type identity used for both formatting and wire encoding.
pub trait ChainError: std::fmt::Debug + Send + Sync + 'static {
    /// This node's own message contribution, not concatenated with ancestors.
    /// May be empty if the node contributes no prefix.
    fn message(&self) -> &str;

    /// The immediate predecessor in the chain, if any.
    fn cause(&self) -> Option<&dyn ChainError> {
        None
    }

    /// Stable type key, shared between in-process dispatch and the wire.
    fn type_key(&self) -> &str;

    /// Optional capability: extra lines for verbose formatting.
    /// The default contributes nothing.
    fn detail_lines(&self) -> Vec<String> {
        Vec::new()
    }

    /// Downcast hook for typed predicate lookups.
    fn as_any(&self) -> &dyn Any;
}

// ─── Built-in node types ──────────────────────────────────────────────────────

/// Type key for [`LeafError`].
pub const LEAF_TYPE_KEY: &str = "causelink/leaf";

/// Type key for [`WrappedError`].
pub const WRAP_TYPE_KEY: &str = "causelink/wrap";

/// A root cause carrying only a message.
#[derive(Debug)]
pub struct LeafError {
    message: String,
}

impl LeafError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl ChainError for LeafError {
    fn message(&self) -> &str {
        &self.message
    }

    fn type_key(&self) -> &str {
        LEAF_TYPE_KEY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A plain message wrapper around an existing error.
#[derive(Debug)]
pub struct WrappedError {
    message: String,
    cause: Box<dyn ChainError>,
}

impl WrappedError {
    pub fn new(cause: Box<dyn ChainError>, message: impl Into<String>) -> Self {
        Self { message: message.into(), cause }
    }
}

impl ChainError for WrappedError {
    fn message(&self) -> &str {
        &self.message
    }

    fn cause(&self) -> Option<&dyn ChainError> {
        Some(self.cause.as_ref())
    }

    fn type_key(&self) -> &str {
        WRAP_TYPE_KEY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ─── Constructors ─────────────────────────────────────────────────────────────

/// Create a new root cause.
pub fn leaf(message: impl Into<String>) -> Box<dyn ChainError> {
    Box::new(LeafError::new(message))
}

/// Wrap an error with a message prefix.
///
/// Identity law: wrapping the absent sentinel yields the sentinel unchanged,
/// for any message.
pub fn wrap(
    cause: Option<Box<dyn ChainError>>,
    message: impl Into<String>,
) -> Option<Box<dyn ChainError>> {
    cause.map(|c| Box::new(WrappedError::new(c, message)) as Box<dyn ChainError>)
}

// ─── Traversal ────────────────────────────────────────────────────────────────

/// Iterator over a chain's nodes, outermost to innermost.
pub struct Frames<'a> {
    next: Option<&'a dyn ChainError>,
    depth: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a dyn ChainError;

    fn next(&mut self) -> Option<Self::Item> {
        if self.depth >= MAX_CHAIN_DEPTH {
            return None;
        }
        let node = self.next.take()?;
        self.depth += 1;
        self.next = node.cause();
        Some(node)
    }
}

/// Walk a chain from the given node to its root cause.
pub fn frames(err: &dyn ChainError) -> Frames<'_> {
    Frames { next: Some(err), depth: 0 }
}

/// Number of nodes in the chain, the given node included.
pub fn depth(err: &dyn ChainError) -> usize {
    frames(err).count()
}

/// The innermost node of the chain.
pub fn root_cause(err: &dyn ChainError) -> &dyn ChainError {
    let mut last = err;
    for node in frames(err) {
        last = node;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_absent_is_identity() {
        assert!(wrap(None, "anything").is_none());
        assert!(wrap(wrap(None, "inner"), "outer").is_none());
    }

    #[test]
    fn wrap_preserves_cause() {
        let err = wrap(Some(leaf("file missing")), "loading config").unwrap();
        assert_eq!(err.message(), "loading config");
        let cause = err.cause().expect("wrapper must have a cause");
        assert_eq!(cause.message(), "file missing");
        assert!(cause.cause().is_none());
    }

    #[test]
    fn message_is_own_contribution_only() {
        let err = wrap(Some(leaf("root")), "outer").unwrap();
        assert_eq!(err.message(), "outer");
    }

    #[test]
    fn frames_outermost_first() {
        let err = wrap(wrap(Some(leaf("a")), "b"), "c").unwrap();
        let messages: Vec<&str> = frames(err.as_ref()).map(|n| n.message()).collect();
        assert_eq!(messages, ["c", "b", "a"]);
    }

    #[test]
    fn depth_and_root_cause() {
        let err = wrap(wrap(Some(leaf("a")), "b"), "c").unwrap();
        assert_eq!(depth(err.as_ref()), 3);
        assert_eq!(root_cause(err.as_ref()).message(), "a");
    }

    #[test]
    fn traversal_is_depth_capped() {
        let mut err = leaf("root");
        for i in 0..(MAX_CHAIN_DEPTH * 2) {
            err = wrap(Some(err), format!("layer {i}")).unwrap();
        }
        assert_eq!(frames(err.as_ref()).count(), MAX_CHAIN_DEPTH);
    }

    #[test]
    fn builtin_type_keys() {
        let err = wrap(Some(leaf("x")), "y").unwrap();
        assert_eq!(err.type_key(), WRAP_TYPE_KEY);
        assert_eq!(root_cause(err.as_ref()).type_key(), LEAF_TYPE_KEY);
    }
}
