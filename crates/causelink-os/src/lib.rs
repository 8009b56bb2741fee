//! causelink-os — capture `std::io::Error` values as chain nodes and
//! classify them through an arbitrary depth of wrappers.
//!
//! Classification rides on the `io::ErrorKind` name (plus the raw OS code
//! when present), both of which travel in the wire payload, so the
//! predicates answer identically on a decoded chain.

use std::any::Any;
use std::io;

use serde::{Deserialize, Serialize};

use causelink_core::{find_first, global, ChainError, CodecRegistry, EncodedNode, PayloadError};

/// Registry key for [`OsError`].
pub const OS_TYPE_KEY: &str = "causelink/os";

/// Root cause capturing an operating-system error.
#[derive(Debug)]
pub struct OsError {
    message: String,
    kind_name: String,
    raw_code: Option<i32>,
}

impl OsError {
    /// Name of the originating `io::ErrorKind` (e.g. `"NotFound"`).
    pub fn kind_name(&self) -> &str {
        &self.kind_name
    }

    /// The raw OS error code, when the source carried one.
    pub fn raw_code(&self) -> Option<i32> {
        self.raw_code
    }
}

impl ChainError for OsError {
    fn message(&self) -> &str {
        &self.message
    }

    fn type_key(&self) -> &str {
        OS_TYPE_KEY
    }

    fn detail_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("os error kind: {}", self.kind_name)];
        if let Some(code) = self.raw_code {
            lines.push(format!("os error code: {code}"));
        }
        lines
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Capture an `io::Error` as a root cause.
pub fn os_error(err: &io::Error) -> Box<dyn ChainError> {
    Box::new(OsError {
        message: err.to_string(),
        kind_name: format!("{:?}", err.kind()),
        raw_code: err.raw_os_error(),
    })
}

// ─── Predicates ───────────────────────────────────────────────────────────────

fn matches_kind(err: &dyn ChainError, kinds: &[&str]) -> bool {
    find_first(err, |node| {
        node.as_any()
            .downcast_ref::<OsError>()
            .and_then(|os| kinds.contains(&os.kind_name.as_str()).then_some(()))
    })
    .is_some()
}

/// The chain contains a permission-denied OS error.
pub fn is_permission(err: &dyn ChainError) -> bool {
    matches_kind(err, &["PermissionDenied"])
}

/// The chain contains a does-not-exist OS error.
pub fn is_not_exist(err: &dyn ChainError) -> bool {
    matches_kind(err, &["NotFound"])
}

/// The chain contains an already-exists OS error (including the
/// non-empty-directory case).
pub fn is_exist(err: &dyn ChainError) -> bool {
    matches_kind(err, &["AlreadyExists", "DirectoryNotEmpty"])
}

/// The chain contains a timeout-flavored OS error.
pub fn is_timeout(err: &dyn ChainError) -> bool {
    matches_kind(err, &["TimedOut", "WouldBlock"])
}

// ─── Wire codec ───────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct OsPayload {
    kind_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_code: Option<i32>,
}

fn encode_os(node: &dyn ChainError) -> EncodedNode {
    let os = match node.as_any().downcast_ref::<OsError>() {
        Some(os) => os,
        None => return EncodedNode::empty(),
    };
    EncodedNode {
        message: None,
        details: os.detail_lines(),
        payload: serde_json::to_vec(&OsPayload {
            kind_name: os.kind_name.clone(),
            raw_code: os.raw_code,
        })
        .unwrap_or_default(),
    }
}

fn decode_os(
    cause: Option<Box<dyn ChainError>>,
    message: &str,
    _details: &[String],
    payload: &[u8],
) -> Result<Box<dyn ChainError>, PayloadError> {
    if cause.is_some() {
        return Err(PayloadError("os-error record has a cause".into()));
    }
    let p: OsPayload = serde_json::from_slice(payload)?;
    Ok(Box::new(OsError {
        message: message.to_string(),
        kind_name: p.kind_name,
        raw_code: p.raw_code,
    }))
}

/// Register the codec in the process-wide registry. Call once at startup.
pub fn register() {
    register_with(global());
}

/// Register the codec in a specific registry (for testing or embedding).
pub fn register_with(reg: &CodecRegistry) {
    reg.register(OS_TYPE_KEY, encode_os, decode_os);
}
