//! Driving port for creating generations.

use async_trait::async_trait;

use crate::domain::{Error, Generation, Prompt, StyleName, UploadedImage, UserId};

/// Validated inputs of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGenerationRequest {
    /// Owner.
    pub user_id: UserId,
    /// Prompt text.
    pub prompt: Prompt,
    /// Style name.
    pub style: StyleName,
    /// Source image.
    pub image: UploadedImage,
}

/// Generation creation use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationCommand: Send + Sync {
    /// Store the image, record and simulate the generation.
    ///
    /// An overloaded model yields [`crate::domain::ErrorCode::ServiceUnavailable`]
    /// with the failed record's id in `details.generationId`.
    async fn create(&self, request: CreateGenerationRequest) -> Result<Generation, Error>;
}
