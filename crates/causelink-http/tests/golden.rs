//! Golden fixture tests for the wire protocol.
//!
//! Each test loads a fixture JSON from `fixtures/wire/`, decodes its
//! `records` array against a registry carrying the bundled registrants,
//! and asserts the rendered output matches the expected values in the
//! fixture.

use causelink_core::{decode, depth, simple, verbose, ChainError, CodecRegistry, WireRecord};
use causelink_http::http_code;
use causelink_issue::issue_links;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn fixture_path(name: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/wire");
    p.push(name);
    p
}

fn load_fixture(name: &str) -> serde_json::Value {
    let content = std::fs::read_to_string(fixture_path(name)).expect("fixture not found");
    serde_json::from_str(&content).expect("invalid fixture JSON")
}

fn fixture_records(fixture: &serde_json::Value) -> Vec<WireRecord> {
    serde_json::from_value(fixture["records"].clone()).expect("invalid records array")
}

fn registry() -> CodecRegistry {
    let reg = CodecRegistry::with_builtins();
    causelink_http::register_with(&reg);
    causelink_issue::register_with(&reg);
    reg
}

fn decode_fixture(fixture: &serde_json::Value) -> Box<dyn ChainError> {
    decode(&registry(), &fixture_records(fixture)).expect("decode failed")
}

// ─── Fully-registered chains ──────────────────────────────────────────────────

#[test]
fn golden_http_roundtrip() {
    let f = load_fixture("http-roundtrip.json");
    let err = decode_fixture(&f);

    assert_eq!(simple(err.as_ref()), f["expectedSimple"].as_str().unwrap());
    assert_eq!(depth(err.as_ref()), f["expectedDepth"].as_u64().unwrap() as usize);

    let expected_code = f["expectedHttpCode"].as_u64().unwrap() as u16;
    assert_eq!(http_code(err.as_ref(), 500), expected_code);
}

#[test]
fn golden_unimplemented_verbose() {
    let f = load_fixture("unimplemented.json");
    let err = decode_fixture(&f);

    assert_eq!(simple(err.as_ref()), f["expectedSimple"].as_str().unwrap());
    assert_eq!(verbose(err.as_ref()), f["expectedVerbose"].as_str().unwrap());

    let links = issue_links(err.as_ref());
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url, f["expectedIssueUrl"].as_str().unwrap());
}

// ─── Degradation ──────────────────────────────────────────────────────────────

#[test]
fn golden_unknown_type_degrades() {
    let f = load_fixture("unknown-type.json");
    let err = decode_fixture(&f);

    assert_eq!(simple(err.as_ref()), f["expectedSimple"].as_str().unwrap());
    assert_eq!(depth(err.as_ref()), f["expectedDepth"].as_u64().unwrap() as usize);

    let v = verbose(err.as_ref());
    assert!(v.ends_with(f["expectedTypesLine"].as_str().unwrap()), "got: {v}");
    assert!(v.contains(f["expectedDetail"].as_str().unwrap()), "got: {v}");

    // The unknown annotation is invisible to the typed lookup.
    assert_eq!(http_code(err.as_ref(), 500), 500);
}

// ─── Failure ──────────────────────────────────────────────────────────────────

#[test]
fn golden_malformed_payload_fails() {
    let f = load_fixture("malformed-payload.json");
    let err = decode(&registry(), &fixture_records(&f)).expect_err("decode must fail");

    let rendered = err.to_string();
    for needle in f["expectedErrorContains"].as_array().unwrap() {
        let needle = needle.as_str().unwrap();
        assert!(rendered.contains(needle), "`{rendered}` missing `{needle}`");
    }
}
