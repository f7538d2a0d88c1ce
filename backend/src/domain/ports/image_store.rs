//! Driven port for uploaded image storage.

use async_trait::async_trait;

use crate::domain::UploadedImage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image storage adapters.
    pub enum ImageStoreError {
        /// Writing the file failed.
        Io { message: String } => "image store write failed: {message}",
    }
}

/// Stores source images and returns their public URL path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `image` under a fresh random name, returning e.g.
    /// `/uploads/<32 hex><ext>`.
    async fn store(&self, image: &UploadedImage) -> Result<String, ImageStoreError>;
}
