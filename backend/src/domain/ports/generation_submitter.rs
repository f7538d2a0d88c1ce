//! Driven port used by the generation request controller to submit one
//! attempt.
//!
//! Failures are classified so the controller can tell the retryable overload
//! case from cancellation and from everything else.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Generation, GenerationId, GenerationStatus, Prompt, StyleName, UploadedImage};

use super::define_port_error;

/// Inputs for one generation request; reused unchanged for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Prompt text.
    pub prompt: Prompt,
    /// Style name.
    pub style: StyleName,
    /// Source image.
    pub image: UploadedImage,
}

/// Successful generation as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPayload {
    /// Generation identifier.
    pub id: GenerationId,
    /// Rendered image, or the source image when none was produced.
    #[schema(example = "/uploads/generated_9f86d081884c7d65.jpg")]
    pub image_url: String,
    /// Prompt text.
    pub prompt: String,
    /// Style name.
    pub style: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Lifecycle state.
    pub status: GenerationStatus,
}

impl From<&Generation> for GenerationPayload {
    fn from(value: &Generation) -> Self {
        Self {
            id: value.id,
            image_url: value.display_image_url().to_owned(),
            prompt: value.prompt.clone(),
            style: value.style.clone(),
            created_at: value.created_at,
            status: value.status,
        }
    }
}

/// Coarse classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitErrorKind {
    /// The model is overloaded; the only retryable failure.
    Overloaded,
    /// The caller aborted the submission.
    Cancelled,
    /// Anything else.
    Other,
}

define_port_error! {
    /// Errors surfaced by a submission attempt.
    pub enum GenerationSubmitError {
        /// The backend reported the model as overloaded.
        Overloaded { message: String } => "{message}",
        /// The submission was aborted before completing.
        Cancelled => "generation request cancelled",
        /// The backend rejected the request.
        Rejected { message: String } => "{message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } => "generation transport failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "generation response decode failed: {message}",
    }
}

impl GenerationSubmitError {
    /// Classification used by the retry loop.
    pub fn kind(&self) -> SubmitErrorKind {
        match self {
            Self::Overloaded { .. } => SubmitErrorKind::Overloaded,
            Self::Cancelled => SubmitErrorKind::Cancelled,
            Self::Rejected { .. } | Self::Transport { .. } | Self::Decode { .. } => {
                SubmitErrorKind::Other
            }
        }
    }

    /// Return whether retrying this error is expected to help.
    pub fn is_retryable(&self) -> bool {
        self.kind() == SubmitErrorKind::Overloaded
    }
}

/// Port performing a single generation submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationSubmitter: Send + Sync {
    /// Submit `request` once.
    async fn submit(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationPayload, GenerationSubmitError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GenerationSubmitError::overloaded("Model overloaded"), SubmitErrorKind::Overloaded, true)]
    #[case(GenerationSubmitError::cancelled(), SubmitErrorKind::Cancelled, false)]
    #[case(GenerationSubmitError::rejected("bad prompt"), SubmitErrorKind::Other, false)]
    #[case(GenerationSubmitError::transport("reset"), SubmitErrorKind::Other, false)]
    #[case(GenerationSubmitError::decode("eof"), SubmitErrorKind::Other, false)]
    fn classifies_errors(
        #[case] error: GenerationSubmitError,
        #[case] kind: SubmitErrorKind,
        #[case] retryable: bool,
    ) {
        assert_eq!(error.kind(), kind);
        assert_eq!(error.is_retryable(), retryable);
    }

    #[test]
    fn payload_deserialises_wire_shape() {
        let payload: GenerationPayload = serde_json::from_value(serde_json::json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "imageUrl": "/uploads/generated_00.jpg",
            "prompt": "fox",
            "style": "Editorial",
            "createdAt": "2024-01-01T00:00:00Z",
            "status": "completed",
        }))
        .expect("decode");
        assert_eq!(payload.status, GenerationStatus::Completed);
        assert_eq!(payload.image_url, "/uploads/generated_00.jpg");
    }
}
