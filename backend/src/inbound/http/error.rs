//! Studio error envelope over HTTP.
//!
//! Account and generation handlers return [`Error`] directly. This module
//! picks the status for each [`ErrorCode`], stamps the `trace-id` header and
//! hides the message of anything that reached the client as an internal
//! failure. An overloaded model surfaces as 503 with the failed generation's
//! id still present in `details`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::TRACE_ID_HEADER;

/// Result alias for studio handlers.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body actually sent to the client.
///
/// Storage, hashing and database failures all arrive as `InternalError`; the
/// original text stays in the log and only the trace id goes out.
fn client_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    error!(
        message = error.message(),
        trace_id = error.trace_id(),
        "studio request failed"
    );
    match error.trace_id() {
        Some(id) => Error::internal(INTERNAL_MESSAGE).with_trace_id(id.to_owned()),
        None => Error::internal(INTERNAL_MESSAGE),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    /// Multipart and extractor failures that escape a handler.
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error reached a studio handler");
        Self::internal(INTERNAL_MESSAGE)
    }
}

#[cfg(test)]
mod tests;
