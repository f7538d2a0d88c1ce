//! Status mapping and redaction for studio errors.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "3b0d6c1e-8f55-4a7e-9a51-2f1c7d9e4b10";

struct Rendered {
    status: StatusCode,
    trace_header: Option<String>,
    body: Error,
}

async fn render(error: &Error) -> Rendered {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let trace_header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let body = serde_json::from_slice(&bytes).expect("error envelope");
    Rendered {
        status,
        trace_header,
        body,
    }
}

#[fixture]
fn storage_failure() -> Error {
    Error::internal("failed to write uploads/4f2a.png: permission denied")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "path": "uploads/4f2a.png" }))
}

#[rstest]
#[case(Error::invalid_request("Prompt is required"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("Access token required"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("Invalid or expired token"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("Generation not found"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("User with this email already exists"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("Model overloaded"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("bcrypt worker panicked"), StatusCode::INTERNAL_SERVER_ERROR)]
fn studio_errors_map_to_statuses(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[rstest]
#[actix_web::test]
async fn storage_failures_hide_their_cause(storage_failure: Error) {
    let rendered = render(&storage_failure).await;

    assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(rendered.trace_header.as_deref(), Some(TRACE_ID));
    assert_eq!(rendered.body.message(), "Internal server error");
    assert_eq!(rendered.body.trace_id(), Some(TRACE_ID));
    assert!(rendered.body.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn overload_keeps_the_failed_generation_id() {
    let overloaded = Error::service_unavailable("Model overloaded")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "generationId": "9d7c2a40-5b1e-4c3f-8e6a-1a2b3c4d5e6f" }));

    let rendered = render(&overloaded).await;

    assert_eq!(rendered.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(rendered.trace_header.as_deref(), Some(TRACE_ID));
    assert_eq!(rendered.body, overloaded);
}

#[rstest]
#[actix_web::test]
async fn untraced_conflicts_send_no_trace_header() {
    let rendered = render(&Error::conflict("User with this email already exists")).await;

    assert_eq!(rendered.status, StatusCode::CONFLICT);
    assert!(rendered.trace_header.is_none());
    assert!(rendered.body.trace_id().is_none());
}

#[rstest]
fn framework_errors_become_internal() {
    let err = actix_web::error::ErrorBadRequest("multipart stream ended early");
    let converted = Error::from(err);
    assert_eq!(converted.code(), ErrorCode::InternalError);
    assert_eq!(converted.message(), "Internal server error");
}
