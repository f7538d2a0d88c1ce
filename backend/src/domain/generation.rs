//! Generation records and the inputs that create them.
//!
//! A generation pairs a prompt and style with an uploaded source image. The
//! record starts `pending`, then moves once to `completed` (with a rendered
//! image URL) or `failed`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Maximum prompt length in characters.
pub const PROMPT_MAX: usize = 1000;
/// Default number of generations returned by the recent listing.
pub const DEFAULT_RECENT_LIMIT: u32 = 5;
/// Upper bound for the recent listing.
pub const MAX_RECENT_LIMIT: u32 = 100;
/// Content types accepted for uploaded source images.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Validation failures for generation inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationValidationError {
    /// Prompt missing or blank.
    EmptyPrompt,
    /// Prompt longer than [`PROMPT_MAX`] characters.
    PromptTooLong {
        /// Characters supplied.
        length: usize,
    },
    /// Style missing or blank.
    EmptyStyle,
    /// No image part was supplied.
    MissingImage,
    /// Content type outside [`ALLOWED_IMAGE_TYPES`].
    UnsupportedImageType {
        /// Content type as sent by the client.
        content_type: String,
    },
    /// Image exceeded the configured size limit.
    ImageTooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
}

impl GenerationValidationError {
    /// Payload field the failure relates to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyPrompt | Self::PromptTooLong { .. } => "prompt",
            Self::EmptyStyle => "style",
            Self::MissingImage | Self::UnsupportedImageType { .. } | Self::ImageTooLarge { .. } => {
                "imageUpload"
            }
        }
    }
}

impl fmt::Display for GenerationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPrompt => write!(f, "Prompt is required"),
            Self::PromptTooLong { .. } => write!(f, "Prompt is too long"),
            Self::EmptyStyle => write!(f, "Style is required"),
            Self::MissingImage => write!(f, "Image file is required"),
            Self::UnsupportedImageType { .. } => {
                write!(f, "Invalid file type. Only JPEG and PNG images are allowed.")
            }
            Self::ImageTooLarge { limit } => {
                write!(f, "Image exceeds the maximum size of {limit} bytes")
            }
        }
    }
}

impl std::error::Error for GenerationValidationError {}

/// Stable generation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = "uuid")]
pub struct GenerationId(Uuid);

impl GenerationId {
    /// Allocate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for GenerationId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Text prompt, 1..=[`PROMPT_MAX`] characters and not blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct Prompt(String);

impl Prompt {
    /// Validate a prompt; caller whitespace is preserved.
    ///
    /// # Examples
    /// ```
    /// use studio::domain::Prompt;
    ///
    /// assert!(Prompt::new("a red fox").is_ok());
    /// assert!(Prompt::new("   ").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, GenerationValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(GenerationValidationError::EmptyPrompt);
        }
        let length = raw.chars().count();
        if length > PROMPT_MAX {
            return Err(GenerationValidationError::PromptTooLong { length });
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Named rendering style such as `Editorial` or `Streetwear`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct StyleName(String);

impl StyleName {
    /// Validate a style name.
    pub fn new(raw: impl Into<String>) -> Result<Self, GenerationValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(GenerationValidationError::EmptyStyle);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for StyleName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Lifecycle of a generation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Record created, rendering in progress.
    Pending,
    /// Rendering produced an image.
    Completed,
    /// Rendering did not produce an image.
    Failed,
}

impl GenerationStatus {
    /// Persisted string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GenerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown generation status: {other}")),
        }
    }
}

/// Source image received with a generation request.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl UploadedImage {
    /// Validate content type and size against `max_bytes`.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, GenerationValidationError> {
        let content_type = content_type.into();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(GenerationValidationError::UnsupportedImageType { content_type });
        }
        if bytes.len() > max_bytes {
            return Err(GenerationValidationError::ImageTooLarge { limit: max_bytes });
        }
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    /// File name as supplied by the client.
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Declared content type.
    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lower-cased extension of the client file name including the leading
    /// dot, or an empty string when there is none.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Listing size for recent generations.
///
/// Missing or unparsable input falls back to [`DEFAULT_RECENT_LIMIT`];
/// everything else is clamped to `1..=MAX_RECENT_LIMIT`.
///
/// # Examples
/// ```
/// use studio::domain::RecentLimit;
///
/// assert_eq!(RecentLimit::from_query(None).get(), 5);
/// assert_eq!(RecentLimit::from_query(Some("abc")).get(), 5);
/// assert_eq!(RecentLimit::from_query(Some("-4")).get(), 1);
/// assert_eq!(RecentLimit::from_query(Some("500")).get(), 100);
/// assert_eq!(RecentLimit::from_query(Some("3.7")).get(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentLimit(u32);

impl RecentLimit {
    /// Clamp an explicit value.
    pub fn new(value: i64) -> Self {
        let clamped = value.clamp(1, i64::from(MAX_RECENT_LIMIT));
        Self(u32::try_from(clamped).unwrap_or(DEFAULT_RECENT_LIMIT))
    }

    /// Interpret a raw query parameter.
    ///
    /// Only the leading integer is read, so `"3.7"` means 3 and `"10abc"`
    /// means 10.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.and_then(leading_integer) {
            // A literal zero counts as "not provided".
            None | Some(0) => Self::default(),
            Some(value) => Self::new(value),
        }
    }

    /// Limit value.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Optional sign followed by at least one ASCII digit, after leading
/// whitespace. Out-of-range magnitudes saturate.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

impl Default for RecentLimit {
    fn default() -> Self {
        Self(DEFAULT_RECENT_LIMIT)
    }
}

/// Data required to insert a new pending generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGeneration {
    /// Identifier allocated by the service.
    pub id: GenerationId,
    /// Owner.
    pub user_id: UserId,
    /// Prompt text.
    pub prompt: Prompt,
    /// Style name.
    pub style: StyleName,
    /// Public URL of the stored source image.
    pub original_image_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Persisted generation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Identifier.
    pub id: GenerationId,
    /// Owner.
    pub user_id: UserId,
    /// Prompt text.
    pub prompt: String,
    /// Style name.
    pub style: String,
    /// Public URL of the stored source image.
    pub original_image_url: String,
    /// Public URL of the rendered image once completed.
    pub generated_image_url: Option<String>,
    /// Lifecycle state.
    pub status: GenerationStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Generation {
    /// Build the pending record for `new`.
    pub fn pending(new: NewGeneration) -> Self {
        Self {
            id: new.id,
            user_id: new.user_id,
            prompt: new.prompt.as_ref().to_owned(),
            style: new.style.as_ref().to_owned(),
            original_image_url: new.original_image_url,
            generated_image_url: None,
            status: GenerationStatus::Pending,
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }

    /// Image to show for this record: the rendered one, else the source.
    pub fn display_image_url(&self) -> &str {
        self.generated_image_url
            .as_deref()
            .unwrap_or(self.original_image_url.as_str())
    }
}
