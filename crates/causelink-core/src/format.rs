//! Chain rendering — simple, verbose, and quoted modes.
//!
//! Simple mode is the single-line summary a naive caller expects: each node's
//! own message, outermost first, joined with `": "` (empty contributions are
//! skipped entirely).
//!
//! Verbose mode is the multi-frame listing:
//!
//! ```text
//! loading config: file missing
//! (1) loading config
//! Wraps: (2) file missing
//!   | entity does not exist
//! Error types: (1) causelink/wrap (2) causelink/not-found
//! ```
//!
//! One frame per node, 1-based, outermost = 1; detail lines are whatever the
//! node's [`ChainError::detail_lines`] capability contributes, each physical
//! line prefixed `  | `; the trailer indexes every frame's dynamic type key.
//! Formatting any well-formed chain always succeeds.

use std::fmt::{self, Write as _};

use crate::chain::{frames, ChainError};

/// Single-line rendering of the whole chain.
pub fn simple(err: &dyn ChainError) -> String {
    let mut out = String::new();
    for node in frames(err) {
        let msg = node.message();
        if msg.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str(": ");
        }
        out.push_str(msg);
    }
    out
}

/// Simple-mode output passed through the generic string-quoting transform.
pub fn quoted(err: &dyn ChainError) -> String {
    format!("{:?}", simple(err))
}

/// Multi-frame rendering with per-node detail lines and a type-key index.
pub fn verbose(err: &dyn ChainError) -> String {
    let mut out = simple(err);

    for (i, node) in frames(err).enumerate() {
        out.push('\n');
        let n = i + 1;
        if i == 0 {
            let _ = write!(out, "({n})");
        } else {
            let _ = write!(out, "Wraps: ({n})");
        }
        let msg = node.message();
        if !msg.is_empty() {
            out.push(' ');
            out.push_str(msg);
        }
        for detail in node.detail_lines() {
            for line in detail.lines() {
                out.push('\n');
                out.push_str("  | ");
                out.push_str(line);
            }
        }
    }

    out.push_str("\nError types:");
    for (i, node) in frames(err).enumerate() {
        let _ = write!(out, " ({}) {}", i + 1, node.type_key());
    }
    out
}

/// `{}` renders simple mode, `{:#}` verbose.
impl fmt::Display for dyn ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(&verbose(self))
        } else {
            f.write_str(&simple(self))
        }
    }
}
