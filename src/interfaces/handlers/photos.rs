use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use futures_util::TryStreamExt;
use tracing::instrument;

use crate::{
    AppState,
    entities::photo::{DeletePhotoRequest, UploadedFile},
    errors::ApiError,
    use_cases::extractors::AdminAuth,
    use_cases::photos::validate_upload,
    utils::get_client_ip::get_client_ip,
};

#[instrument(skip(state))]
pub async fn list_event_photos(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let event_id = path.into_inner();
    if event_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing eventId".to_string()));
    }

    let photos = state.photos()?.list_photos(&event_id).await?;
    Ok(HttpResponse::Ok().json(photos))
}

#[instrument(skip(req, state, payload))]
pub async fn upload_event_photo(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> Result<impl Responder, ApiError> {
    let ip = get_client_ip(&req);

    // The limiter sits ahead of all validation, so every attempt that
    // reaches this route consumes quota, including ones rejected below.
    let decision = state.upload_limiter.check(&ip);
    if !decision.allowed {
        return Err(ApiError::RateLimited(decision));
    }

    let event_id = path.into_inner();
    if event_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing eventId".to_string()));
    }

    let max_bytes = state.config.photo_max_bytes;
    let mut file: Option<UploadedFile> = None;
    let mut caption: Option<String> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("photo") => file = Some(read_photo_field(field, max_bytes).await?),
            Some("caption") => caption = Some(read_text_field(field, CAPTION_MAX_BYTES).await?),
            _ => {
                // Unknown fields are drained and ignored.
                while field
                    .try_next()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?
                    .is_some()
                {}
            }
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("Missing photo file".to_string()))?;
    validate_upload(&file, max_bytes)?;

    let record = state
        .photos()?
        .ingest_photo(&event_id, file, caption, &ip)
        .await?;

    // Admitted requests carry the same quota metadata the 429 does.
    Ok(HttpResponse::Created()
        .insert_header(("ratelimit-limit", decision.limit.to_string()))
        .insert_header(("ratelimit-remaining", decision.remaining.to_string()))
        .insert_header(("ratelimit-reset", decision.reset_secs.to_string()))
        .json(record))
}

#[instrument(skip(_admin, state))]
pub async fn admin_list_event_photos(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let event_id = path.into_inner();
    if event_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing eventId".to_string()));
    }

    let photos = state.photos()?.list_photos(&event_id).await?;
    Ok(HttpResponse::Ok().json(photos))
}

#[instrument(skip(_admin, state, body))]
pub async fn delete_event_photo(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<DeletePhotoRequest>,
) -> Result<impl Responder, ApiError> {
    let event_id = path.into_inner();
    if event_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing eventId".to_string()));
    }

    state
        .photos()?
        .delete_photo(&event_id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Reads the image field into memory. The declared content type is checked
/// before any byte is consumed, and the size cap is enforced while
/// streaming so an oversized body never gets fully buffered.
async fn read_photo_field(mut field: Field, max_bytes: usize) -> Result<UploadedFile, ApiError> {
    let content_type = field
        .content_type()
        .map(|m| m.to_string())
        .unwrap_or_default();

    if !content_type.starts_with("image/") {
        return Err(ApiError::UnsupportedMediaType);
    }

    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string);

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes,
    })
}

/// Byte ceiling for text fields, well above the stored caption cap but
/// small enough that a hostile field cannot balloon in memory.
const CAPTION_MAX_BYTES: usize = 4 * 1024;

async fn read_text_field(mut field: Field, max_bytes: usize) -> Result<String, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(ApiError::BadRequest("Caption too long".to_string()));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
