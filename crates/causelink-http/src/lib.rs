//! causelink-http — annotate an error chain with an HTTP status code.
//!
//! # Quick start
//!
//! ```rust
//! use causelink_core::leaf;
//! use causelink_http::{http_code, wrap_with_http_code};
//!
//! let err = wrap_with_http_code(Some(leaf("no such user")), 404).unwrap();
//! assert_eq!(http_code(err.as_ref(), 500), 404);
//! ```
//!
//! Call [`register`] once at startup so the annotation survives the wire.

use std::any::Any;

use serde::{Deserialize, Serialize};

use causelink_core::{
    find_first, global, ChainError, CodecRegistry, EncodedNode, PayloadError,
};

/// Registry key for [`WithHttpCode`].
pub const HTTP_CODE_TYPE_KEY: &str = "causelink/http-code";

/// Wrapper carrying an HTTP status code. Contributes no message of its own;
/// the code shows up in verbose detail lines and typed lookups.
#[derive(Debug)]
pub struct WithHttpCode {
    cause: Box<dyn ChainError>,
    code: u16,
}

impl WithHttpCode {
    /// The attached status code.
    pub fn code(&self) -> u16 {
        self.code
    }
}

impl ChainError for WithHttpCode {
    fn message(&self) -> &str {
        ""
    }

    fn cause(&self) -> Option<&dyn ChainError> {
        Some(self.cause.as_ref())
    }

    fn type_key(&self) -> &str {
        HTTP_CODE_TYPE_KEY
    }

    fn detail_lines(&self) -> Vec<String> {
        vec![format!("http code: {}", self.code)]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Add an HTTP code to an existing error. Wrapping the absent sentinel
/// yields the absent sentinel.
pub fn wrap_with_http_code(
    err: Option<Box<dyn ChainError>>,
    code: u16,
) -> Option<Box<dyn ChainError>> {
    err.map(|cause| Box::new(WithHttpCode { cause, code }) as Box<dyn ChainError>)
}

/// Retrieve the HTTP code from a chain, outermost annotation first.
/// Returns `default` when no annotation is present.
pub fn http_code(err: &dyn ChainError, default: u16) -> u16 {
    find_first(err, |node| {
        node.as_any().downcast_ref::<WithHttpCode>().map(|w| w.code)
    })
    .unwrap_or(default)
}

// ─── Wire codec ───────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct HttpCodePayload {
    code: u16,
}

fn encode_http_code(node: &dyn ChainError) -> EncodedNode {
    let code = match node.as_any().downcast_ref::<WithHttpCode>() {
        Some(w) => w.code,
        None => return EncodedNode::empty(),
    };
    EncodedNode {
        message: None,
        details: vec![format!("HTTP {code}")],
        payload: serde_json::to_vec(&HttpCodePayload { code }).unwrap_or_default(),
    }
}

fn decode_http_code(
    cause: Option<Box<dyn ChainError>>,
    _message: &str,
    _details: &[String],
    payload: &[u8],
) -> Result<Box<dyn ChainError>, PayloadError> {
    let cause = cause.ok_or_else(|| PayloadError("http-code wrapper has no cause".into()))?;
    let p: HttpCodePayload = serde_json::from_slice(payload)?;
    Ok(Box::new(WithHttpCode { cause, code: p.code }))
}

/// Register the codec in the process-wide registry. Call once at startup.
pub fn register() {
    register_with(global());
}

/// Register the codec in a specific registry (for testing or embedding).
pub fn register_with(reg: &CodecRegistry) {
    reg.register(HTTP_CODE_TYPE_KEY, encode_http_code, decode_http_code);
}
