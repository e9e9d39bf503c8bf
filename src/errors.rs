use actix_web::{
    HttpResponse,
    error::ResponseError,
    http::{StatusCode, header::ContentType},
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

use crate::constants::is_production;
use crate::limiter::rate_limiter::RateLimitDecision;

/// Error reported by the object or relation store clients. Carries the
/// vendor code and HTTP status so callers can classify the failure.
#[derive(Debug, Clone, Display)]
#[display("store error: {message}")]
pub struct StoreError {
    pub message: String,
    pub code: Option<String>,
    pub status: Option<u16>,
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError {
            message: message.into(),
            code: None,
            status: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Classifies a relation-store error as "the table does not exist".
///
/// PostgREST surfaces missing relations as 42P01 or PGRST205 depending on
/// which code path rejected the query, and some proxies only forward the
/// message text. Every flow that tolerates an unprovisioned schema must go
/// through this predicate so fallback behavior stays consistent.
pub fn is_missing_table_error(err: &StoreError, table: &str) -> bool {
    let code = err.code.as_deref().unwrap_or("").to_lowercase();
    if code == "42p01" || code == "pgrst205" {
        return true;
    }
    let msg = err.message.to_lowercase();
    msg.contains(table) && (msg.contains("does not exist") || msg.contains("could not find the"))
}

/// Classifies an object-store upload error as "the bucket does not exist",
/// which triggers the one-shot create-and-retry path during ingestion.
pub fn is_missing_bucket_error(err: &StoreError) -> bool {
    let msg = err.message.to_lowercase();
    let code = err
        .code
        .clone()
        .or_else(|| err.status.map(|s| s.to_string()))
        .unwrap_or_default();
    msg.contains("bucket")
        && (msg.contains("not found") || msg.contains("does not exist") || code == "404")
}

pub fn is_bucket_exists_error(err: &StoreError) -> bool {
    err.message.to_lowercase().contains("already exists")
}

#[derive(Debug, Display)]
pub enum ApiError {
    #[display("{_0}")]
    BadRequest(String),

    #[display("Unauthorized")]
    Unauthorized,

    #[display("Access denied")]
    AccessDenied,

    #[display("Only image uploads are allowed")]
    UnsupportedMediaType,

    #[display("File too large")]
    PayloadTooLarge,

    #[display("Too many uploads from this IP. Please try again later.")]
    RateLimited(RateLimitDecision),

    #[display("{_0}")]
    ServerNotConfigured(&'static str),

    #[display(
        "Failed to upload photo (check the storage bucket exists and your server key has access)."
    )]
    UploadFailed(StoreError),

    #[display("Photo uploaded but URL could not be created (is the bucket public?)")]
    UrlMissing,

    #[display("Failed to save photo record")]
    MetadataPersistFailed(StoreError),

    #[display("Failed to fetch photos")]
    ListFailed(StoreError),

    #[display("Failed to look up photo record")]
    LookupFailed(StoreError),

    #[display("Failed to delete photo")]
    DeleteFailed(StoreError),

    #[display("Photo deleted but its record could not be removed")]
    MetadataDeleteFailed(StoreError),

    #[display("Failed to {_0}")]
    StoreFailed(&'static str, StoreError),

    #[display("Failed to send inquiry. Please try again.")]
    EmailFailed(String),
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ApiError {
    fn store_details(&self) -> Option<ErrorDetails> {
        let source = match self {
            ApiError::UploadFailed(e)
            | ApiError::MetadataPersistFailed(e)
            | ApiError::ListFailed(e)
            | ApiError::LookupFailed(e)
            | ApiError::DeleteFailed(e)
            | ApiError::MetadataDeleteFailed(e)
            | ApiError::StoreFailed(_, e) => Some(e),
            _ => None,
        }?;

        Some(ErrorDetails {
            message: source.message.clone(),
            code: source
                .code
                .clone()
                .or_else(|| source.status.map(|s| s.to_string())),
        })
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let mut body = serde_json::json!({ "error": self.to_string() });

        // Diagnostic details are only exposed outside production.
        if !is_production() {
            if let Some(details) = self.store_details() {
                body["details"] = serde_json::to_value(&details).unwrap_or_default();
            }
        }

        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());

        if let ApiError::RateLimited(decision) = self {
            builder.insert_header(("ratelimit-limit", decision.limit.to_string()));
            builder.insert_header(("ratelimit-remaining", decision.remaining.to_string()));
            builder.insert_header(("ratelimit-reset", decision.reset_secs.to_string()));
            builder.insert_header(("retry-after", decision.reset_secs.to_string()));
        }

        builder.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::AccessDenied => StatusCode::FORBIDDEN,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServerNotConfigured(_)
            | ApiError::UploadFailed(_)
            | ApiError::UrlMissing
            | ApiError::MetadataPersistFailed(_)
            | ApiError::ListFailed(_)
            | ApiError::LookupFailed(_)
            | ApiError::DeleteFailed(_)
            | ApiError::MetadataDeleteFailed(_)
            | ApiError::StoreFailed(_, _)
            | ApiError::EmailFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let messages = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string());
                    format!("{}: {}", field, message)
                })
            })
            .collect::<Vec<_>>()
            .join(", ");

        ApiError::BadRequest(messages)
    }
}
