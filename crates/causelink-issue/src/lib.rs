//! causelink-issue — tie errors to tracker issues.
//!
//! Two node types:
//! - [`UnimplementedError`] — a root cause marking a feature that does not
//!   exist yet, pointing at the issue tracking it;
//! - [`WithIssueLink`] — a wrapper annotating any existing error with a
//!   relevant issue.
//!
//! Call [`register`] once at startup so the annotations survive the wire.

use std::any::Any;

use serde::{Deserialize, Serialize};

use causelink_core::{
    find_first, frames, global, ChainError, CodecRegistry, EncodedNode, PayloadError,
};

/// Registry key for [`UnimplementedError`].
pub const UNIMPLEMENTED_TYPE_KEY: &str = "causelink/unimplemented";

/// Registry key for [`WithIssueLink`].
pub const ISSUE_LINK_TYPE_KEY: &str = "causelink/issue-link";

/// A reference to a tracker issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    /// Issue URL or identifier.
    pub url: String,
    /// Extra context, e.g. which sub-case of the issue applies. May be empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl IssueLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), detail: String::new() }
    }

    pub fn with_detail(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { url: url.into(), detail: detail.into() }
    }

    fn detail_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("issue: {}", self.url)];
        if !self.detail.is_empty() {
            lines.push(format!("detail: {}", self.detail));
        }
        lines
    }
}

// ─── Unimplemented ────────────────────────────────────────────────────────────

/// Root cause for a feature that is not implemented yet.
#[derive(Debug)]
pub struct UnimplementedError {
    message: String,
    link: IssueLink,
}

impl UnimplementedError {
    /// The issue tracking the missing feature.
    pub fn link(&self) -> &IssueLink {
        &self.link
    }
}

impl ChainError for UnimplementedError {
    fn message(&self) -> &str {
        &self.message
    }

    fn type_key(&self) -> &str {
        UNIMPLEMENTED_TYPE_KEY
    }

    fn detail_lines(&self) -> Vec<String> {
        let mut lines = vec!["unimplemented".to_string()];
        lines.extend(self.link.detail_lines());
        lines
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Create an unimplemented-feature error pointing at its tracking issue.
pub fn unimplemented(link: IssueLink, message: impl Into<String>) -> Box<dyn ChainError> {
    Box::new(UnimplementedError { message: message.into(), link })
}

/// Whether this specific node is an unimplemented-feature marker.
pub fn is_unimplemented(err: &dyn ChainError) -> bool {
    err.as_any().is::<UnimplementedError>()
}

/// Whether any node in the chain is an unimplemented-feature marker.
pub fn has_unimplemented(err: &dyn ChainError) -> bool {
    find_first(err, |node| is_unimplemented(node).then_some(())).is_some()
}

// ─── Issue-link wrapper ───────────────────────────────────────────────────────

/// Wrapper annotating an existing error with a tracker issue.
/// Contributes no message of its own.
#[derive(Debug)]
pub struct WithIssueLink {
    cause: Box<dyn ChainError>,
    link: IssueLink,
}

impl WithIssueLink {
    /// The attached issue.
    pub fn link(&self) -> &IssueLink {
        &self.link
    }
}

impl ChainError for WithIssueLink {
    fn message(&self) -> &str {
        ""
    }

    fn cause(&self) -> Option<&dyn ChainError> {
        Some(self.cause.as_ref())
    }

    fn type_key(&self) -> &str {
        ISSUE_LINK_TYPE_KEY
    }

    fn detail_lines(&self) -> Vec<String> {
        self.link.detail_lines()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Annotate an error with an issue link. Wrapping the absent sentinel
/// yields the absent sentinel.
pub fn wrap_with_issue_link(
    err: Option<Box<dyn ChainError>>,
    link: IssueLink,
) -> Option<Box<dyn ChainError>> {
    err.map(|cause| Box::new(WithIssueLink { cause, link }) as Box<dyn ChainError>)
}

/// Every issue link in the chain, outermost first.
pub fn issue_links(err: &dyn ChainError) -> Vec<IssueLink> {
    frames(err)
        .filter_map(|node| {
            let any = node.as_any();
            if let Some(u) = any.downcast_ref::<UnimplementedError>() {
                Some(u.link.clone())
            } else {
                any.downcast_ref::<WithIssueLink>().map(|w| w.link.clone())
            }
        })
        .collect()
}

// ─── Wire codecs ──────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct LinkPayload {
    link: IssueLink,
}

fn encode_unimplemented(node: &dyn ChainError) -> EncodedNode {
    let u = match node.as_any().downcast_ref::<UnimplementedError>() {
        Some(u) => u,
        None => return EncodedNode::empty(),
    };
    EncodedNode {
        message: None,
        details: u.detail_lines(),
        payload: serde_json::to_vec(&LinkPayload { link: u.link.clone() })
            .unwrap_or_default(),
    }
}

fn decode_unimplemented(
    cause: Option<Box<dyn ChainError>>,
    message: &str,
    _details: &[String],
    payload: &[u8],
) -> Result<Box<dyn ChainError>, PayloadError> {
    if cause.is_some() {
        return Err(PayloadError("unimplemented record has a cause".into()));
    }
    let p: LinkPayload = serde_json::from_slice(payload)?;
    Ok(Box::new(UnimplementedError { message: message.to_string(), link: p.link }))
}

fn encode_issue_link(node: &dyn ChainError) -> EncodedNode {
    let w = match node.as_any().downcast_ref::<WithIssueLink>() {
        Some(w) => w,
        None => return EncodedNode::empty(),
    };
    EncodedNode {
        message: None,
        details: w.link.detail_lines(),
        payload: serde_json::to_vec(&LinkPayload { link: w.link.clone() })
            .unwrap_or_default(),
    }
}

fn decode_issue_link(
    cause: Option<Box<dyn ChainError>>,
    _message: &str,
    _details: &[String],
    payload: &[u8],
) -> Result<Box<dyn ChainError>, PayloadError> {
    let cause = cause.ok_or_else(|| PayloadError("issue-link wrapper has no cause".into()))?;
    let p: LinkPayload = serde_json::from_slice(payload)?;
    Ok(Box::new(WithIssueLink { cause, link: p.link }))
}

/// Register both codecs in the process-wide registry. Call once at startup.
pub fn register() {
    register_with(global());
}

/// Register both codecs in a specific registry (for testing or embedding).
pub fn register_with(reg: &CodecRegistry) {
    reg.register(UNIMPLEMENTED_TYPE_KEY, encode_unimplemented, decode_unimplemented);
    reg.register(ISSUE_LINK_TYPE_KEY, encode_issue_link, decode_issue_link);
}

#[cfg(test)]
mod tests {
    use super::*;
    use causelink_core::{decode, encode, root_cause, simple, verbose, wrap};

    fn registry() -> CodecRegistry {
        let reg = CodecRegistry::with_builtins();
        register_with(&reg);
        reg
    }

    #[test]
    fn unimplemented_predicates() {
        let err = wrap(
            Some(unimplemented(IssueLink::with_detail("123", "foo"), "world")),
            "hello",
        )
        .unwrap();

        assert!(has_unimplemented(err.as_ref()));
        assert!(!is_unimplemented(err.as_ref()));
        assert!(is_unimplemented(root_cause(err.as_ref())));
        assert_eq!(
            issue_links(err.as_ref()),
            vec![IssueLink::with_detail("123", "foo")]
        );
    }

    #[test]
    fn verbose_lists_issue_and_detail() {
        let err = unimplemented(IssueLink::with_detail("http://mysite", "see more"), "woo");
        assert_eq!(
            verbose(err.as_ref()),
            "woo\n\
             (1) woo\n\
             \x20 | unimplemented\n\
             \x20 | issue: http://mysite\n\
             \x20 | detail: see more\n\
             Error types: (1) causelink/unimplemented"
        );
    }

    #[test]
    fn verbose_omits_empty_detail() {
        let err = unimplemented(IssueLink::new("http://mysite"), "woo");
        let v = verbose(err.as_ref());
        assert!(v.contains("  | issue: http://mysite"));
        assert!(!v.contains("detail:"));
    }

    #[test]
    fn wrapped_unimplemented_simple_format() {
        let err = wrap(
            Some(unimplemented(IssueLink::new("http://mysite"), "woo")),
            "waa",
        )
        .unwrap();
        assert_eq!(simple(err.as_ref()), "waa: woo");
    }

    #[test]
    fn predicates_survive_roundtrip() {
        let reg = registry();
        let err = wrap(
            Some(unimplemented(IssueLink::with_detail("123", "foo"), "world")),
            "hello",
        )
        .unwrap();

        let back = decode(&reg, &encode(&reg, err.as_ref())).unwrap();
        assert!(has_unimplemented(back.as_ref()));
        assert_eq!(
            issue_links(back.as_ref()),
            vec![IssueLink::with_detail("123", "foo")]
        );
        assert_eq!(verbose(back.as_ref()), verbose(err.as_ref()));
    }

    #[test]
    fn issue_link_wrapper_collects_outer_first() {
        let err = wrap_with_issue_link(
            Some(unimplemented(IssueLink::new("inner"), "woo")),
            IssueLink::new("outer"),
        )
        .unwrap();
        let links = issue_links(err.as_ref());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "outer");
        assert_eq!(links[1].url, "inner");
    }

    #[test]
    fn wrap_absent_is_identity() {
        assert!(wrap_with_issue_link(None, IssueLink::new("x")).is_none());
    }

    #[test]
    fn degrades_without_registration() {
        let reg = registry();
        let err = unimplemented(IssueLink::new("http://mysite"), "woo");
        let records = encode(&reg, err.as_ref());

        let peer = CodecRegistry::with_builtins();
        let back = decode(&peer, &records).unwrap();
        assert_eq!(simple(back.as_ref()), "woo");
        assert!(!has_unimplemented(back.as_ref()));
        assert!(verbose(back.as_ref()).contains("  | issue: http://mysite"));
    }
}
