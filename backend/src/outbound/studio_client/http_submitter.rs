//! Reqwest-backed generation submitter.
//!
//! Owns transport details only: multipart encoding, bearer auth, status
//! classification and payload decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::ErrorBodyDto;
use crate::domain::MODEL_OVERLOADED;
use crate::domain::ports::{
    GenerationPayload, GenerationRequest, GenerationSubmitError, GenerationSubmitter,
};

const DEFAULT_USER_AGENT: &str = "studio-generate/0.1";

/// Submits generation requests to `POST {base}/generations`.
pub struct HttpGenerationSubmitter {
    client: Client,
    endpoint: Url,
    token: Zeroizing<String>,
}

impl HttpGenerationSubmitter {
    /// Build a submitter for the API rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error when `base` cannot be joined or the reqwest client
    /// cannot be constructed.
    pub fn new(
        base: &Url,
        token: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let endpoint = generations_endpoint(base)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }
}

/// Failure while constructing the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// The base URL cannot carry a path.
    #[error("invalid API base URL: {0}")]
    Url(#[from] url::ParseError),
    /// reqwest rejected the client configuration.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

fn generations_endpoint(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("generations")
}

fn build_form(request: &GenerationRequest) -> Result<Form, GenerationSubmitError> {
    let image = &request.image;
    let part = Part::bytes(image.bytes().to_vec())
        .file_name(image.file_name().to_owned())
        .mime_str(image.content_type())
        .map_err(|error| GenerationSubmitError::rejected(error.to_string()))?;
    Ok(Form::new()
        .text("prompt", request.prompt.as_ref().to_owned())
        .text("style", request.style.as_ref().to_owned())
        .part("imageUpload", part))
}

#[async_trait]
impl GenerationSubmitter for HttpGenerationSubmitter {
    async fn submit(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationPayload, GenerationSubmitError> {
        let form = build_form(request)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.token.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(status = status.as_u16(), bytes = body.len(), "generation response");
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_payload(body.as_ref())
    }
}

fn parse_payload(body: &[u8]) -> Result<GenerationPayload, GenerationSubmitError> {
    serde_json::from_slice(body).map_err(|error| {
        GenerationSubmitError::decode(format!("invalid generation payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> GenerationSubmitError {
    GenerationSubmitError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GenerationSubmitError {
    let envelope = ErrorBodyDto::parse(body);
    if let Some(dto) = &envelope {
        debug!(
            status = status.as_u16(),
            code = dto.code.as_deref(),
            trace_id = dto.trace_id.as_deref(),
            "generation request refused"
        );
    }
    if status == StatusCode::SERVICE_UNAVAILABLE {
        let message = envelope.map_or_else(|| MODEL_OVERLOADED.to_owned(), |dto| dto.message);
        return GenerationSubmitError::overloaded(message);
    }
    let message = match envelope {
        Some(dto) => dto.message,
        None => {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                format!("status {}: {preview}", status.as_u16())
            }
        }
    };
    GenerationSubmitError::rejected(message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use crate::domain::GenerationStatus;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:3000", "http://localhost:3000/generations")]
    #[case("http://localhost:3000/", "http://localhost:3000/generations")]
    #[case("https://studio.test/api", "https://studio.test/api/generations")]
    fn joins_generations_path(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("base url");
        assert_eq!(
            generations_endpoint(&base).expect("join").as_str(),
            expected
        );
    }

    #[rstest]
    #[case::envelope(
        br#"{"code":"service_unavailable","message":"Model overloaded"}"#.as_slice(),
        "Model overloaded"
    )]
    #[case::bare(b"".as_slice(), "Model overloaded")]
    fn service_unavailable_is_overloaded(#[case] body: &[u8], #[case] message: &str) {
        let error = map_status_error(StatusCode::SERVICE_UNAVAILABLE, body);
        assert_eq!(error, GenerationSubmitError::overloaded(message));
        assert!(error.is_retryable());
    }

    #[rstest]
    #[case::validation(
        StatusCode::BAD_REQUEST,
        br#"{"code":"invalid_request","message":"Prompt is required"}"#.as_slice(),
        "Prompt is required"
    )]
    #[case::auth(
        StatusCode::UNAUTHORIZED,
        br#"{"code":"unauthorized","message":"Access token required"}"#.as_slice(),
        "Access token required"
    )]
    #[case::html(StatusCode::BAD_GATEWAY, b"<html>  bad\n gateway </html>".as_slice(), "status 502: <html> bad gateway </html>")]
    #[case::empty(StatusCode::INTERNAL_SERVER_ERROR, b"".as_slice(), "status 500")]
    fn other_statuses_are_rejected(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] message: &str,
    ) {
        let error = map_status_error(status, body);
        assert_eq!(error, GenerationSubmitError::rejected(message));
        assert!(!error.is_retryable());
    }

    #[test]
    fn long_bodies_are_truncated_in_previews() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn decodes_success_payload() {
        let payload = parse_payload(
            br#"{"id":"3fa85f64-5717-4562-b3fc-2c963f66afa6","imageUrl":"/uploads/generated_0011223344556677.jpg","prompt":"fox","style":"Editorial","createdAt":"2024-01-01T00:00:00Z","status":"completed"}"#,
        )
        .expect("payload");
        assert_eq!(payload.status, GenerationStatus::Completed);
    }

    #[test]
    fn undecodable_success_is_a_decode_error() {
        assert!(matches!(
            parse_payload(b"{}"),
            Err(GenerationSubmitError::Decode { .. })
        ));
    }

    #[test]
    fn form_rejects_nothing_for_valid_requests() {
        let request = crate::test_support::generation_controller::sample_request();
        assert!(build_form(&request).is_ok());
    }
}
