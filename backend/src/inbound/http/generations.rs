//! Generation API handlers.
//!
//! ```text
//! POST /generations          multipart: prompt, style, imageUpload
//! GET  /generations?limit=5
//! ```

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, get, post, web};
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateGenerationRequest, GenerationPayload};
use crate::domain::{
    Error, GenerationValidationError, Prompt, RecentLimit, StyleName, UploadedImage,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;

const IMAGE_FIELD: &str = "imageUpload";
const TEXT_FIELD_LIMIT: usize = 64 * 1024;

/// Multipart body accepted by `POST /generations`; documents the form for
/// OpenAPI.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationUpload {
    /// Prompt text, 1..=1000 characters.
    #[schema(example = "a fox in a trench coat")]
    pub prompt: String,
    /// Style name.
    #[schema(example = "Editorial")]
    pub style: String,
    /// JPEG or PNG source image.
    #[schema(value_type = String, format = Binary)]
    pub image_upload: Vec<u8>,
}

/// Query string for `GET /generations`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentQuery {
    /// Number of records, clamped to 1..=100; defaults to 5.
    pub limit: Option<String>,
}

#[derive(Default)]
struct UploadedFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct GenerationForm {
    prompt: Option<String>,
    style: Option<String>,
    image: Option<UploadedFile>,
}

fn validation_error(err: &GenerationValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

fn malformed(error: &actix_multipart::MultipartError) -> Error {
    debug!(%error, "rejecting malformed multipart payload");
    Error::invalid_request("Malformed multipart payload")
}

/// Drain `field`, failing with `on_overflow` once more than `limit` bytes
/// arrive.
async fn read_field(
    field: &mut Field,
    limit: usize,
    on_overflow: impl Fn() -> Error,
) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|err| malformed(&err))? {
        if buffer.len() + chunk.len() > limit {
            return Err(on_overflow());
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

async fn read_text(field: &mut Field) -> Result<String, Error> {
    let bytes = read_field(field, TEXT_FIELD_LIMIT, || {
        Error::invalid_request("Form field is too large")
    })
    .await?;
    String::from_utf8(bytes).map_err(|_| Error::invalid_request("Form fields must be UTF-8"))
}

async fn read_form(mut payload: Multipart, max_upload_bytes: usize) -> Result<GenerationForm, Error> {
    let mut form = GenerationForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(|err| malformed(&err))? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "prompt" => form.prompt = Some(read_text(&mut field).await?),
            "style" => form.style = Some(read_text(&mut field).await?),
            IMAGE_FIELD => {
                let content_type = field
                    .content_type()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let file_name = field
                    .content_disposition()
                    .and_then(|disposition| disposition.get_filename())
                    .unwrap_or_default()
                    .to_owned();
                let bytes = read_field(&mut field, max_upload_bytes, || {
                    validation_error(&GenerationValidationError::ImageTooLarge {
                        limit: max_upload_bytes,
                    })
                })
                .await?;
                form.image = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            other => {
                debug!(field = other, "ignoring unknown multipart field");
                read_field(&mut field, TEXT_FIELD_LIMIT, || {
                    Error::invalid_request("Form field is too large")
                })
                .await?;
            }
        }
    }
    Ok(form)
}

fn validate_form(
    form: GenerationForm,
    user: &AuthenticatedUser,
    max_upload_bytes: usize,
) -> Result<CreateGenerationRequest, GenerationValidationError> {
    let prompt = Prompt::new(form.prompt.unwrap_or_default())?;
    let style = StyleName::new(form.style.unwrap_or_default())?;
    let file = form.image.ok_or(GenerationValidationError::MissingImage)?;
    let image = UploadedImage::new(
        file.file_name,
        file.content_type,
        file.bytes,
        max_upload_bytes,
    )?;
    Ok(CreateGenerationRequest {
        user_id: user.user_id(),
        prompt,
        style,
        image,
    })
}

/// Upload a source image and run a generation.
///
/// The simulated model fails with `503` roughly one time in five; the
/// failed record's id is returned in `details.generationId`.
#[utoipa::path(
    post,
    path = "/generations",
    request_body(content = GenerationUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Generation completed", body = GenerationPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Access token required", body = Error),
        (status = 403, description = "Invalid or expired token", body = Error),
        (status = 503, description = "Model overloaded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["generations"],
    operation_id = "createGeneration",
    security(("bearer" = []))
)]
#[post("/generations")]
pub async fn create_generation(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let form = read_form(payload, state.max_upload_bytes).await?;
    let request =
        validate_form(form, &user, state.max_upload_bytes).map_err(|err| validation_error(&err))?;
    let generation = state.generations.create(request).await?;
    Ok(HttpResponse::Created().json(GenerationPayload::from(&generation)))
}

/// List the caller's most recent generations, newest first.
#[utoipa::path(
    get,
    path = "/generations",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent generations", body = [GenerationPayload]),
        (status = 401, description = "Access token required", body = Error),
        (status = 403, description = "Invalid or expired token", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["generations"],
    operation_id = "listGenerations",
    security(("bearer" = []))
)]
#[get("/generations")]
pub async fn list_generations(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<RecentQuery>,
) -> ApiResult<web::Json<Vec<GenerationPayload>>> {
    let limit = RecentLimit::from_query(query.limit.as_deref());
    let generations = state
        .generations_query
        .recent(&user.user_id(), limit)
        .await?;
    Ok(web::Json(
        generations.iter().map(GenerationPayload::from).collect(),
    ))
}

#[cfg(test)]
#[path = "generations_tests.rs"]
mod tests;
