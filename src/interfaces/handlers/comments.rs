use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, web};
use tracing::instrument;

use crate::{
    AppState, entities::comment::NewCommentRequest, errors::ApiError,
    use_cases::extractors::AdminAuth,
};

/// `GET /api/comments/counts?eventIds=a,b,c` — comment counts keyed by
/// event id.
pub async fn comment_counts(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<impl Responder, ApiError> {
    let Some(event_ids) = query.get("eventIds").filter(|v| !v.is_empty()) else {
        return Err(ApiError::BadRequest(
            "eventIds query parameter is required".to_string(),
        ));
    };

    let ids: Vec<&str> = event_ids.split(',').collect();
    let counts = state.comments()?.counts(&ids).await?;
    Ok(HttpResponse::Ok().json(counts))
}

pub async fn list_event_comments(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let comments = state.comments()?.list_for_event(&path).await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[instrument(skip(state, data))]
pub async fn create_comment(
    state: web::Data<AppState>,
    data: web::Json<NewCommentRequest>,
) -> Result<impl Responder, ApiError> {
    let comment = state.comments()?.create_comment(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(comment))
}

#[instrument(skip(_admin, state))]
pub async fn delete_comment(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    state.comments()?.delete_comment(&id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
