//! Tests for error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("x"), ErrorCode::Forbidden)]
#[case(Error::not_found("x"), ErrorCode::NotFound)]
#[case(Error::conflict("x"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[test]
fn serialises_camel_case_and_skips_empty_fields() {
    let value = serde_json::to_value(Error::not_found("missing")).expect("serialise");
    assert_eq!(value, json!({ "code": "not_found", "message": "missing" }));
}

#[test]
fn serialises_trace_id_and_details() {
    let error = Error::service_unavailable("Model overloaded")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "generationId": "abc" }));
    let value = serde_json::to_value(error).expect("serialise");
    assert_eq!(
        value,
        json!({
            "code": "service_unavailable",
            "message": "Model overloaded",
            "traceId": TRACE_ID,
            "details": { "generationId": "abc" },
        })
    );
}

#[tokio::test]
async fn captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::internal("boom") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[test]
fn no_trace_id_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[test]
fn display_uses_message() {
    assert_eq!(Error::forbidden("Invalid or expired token").to_string(), "Invalid or expired token");
}
