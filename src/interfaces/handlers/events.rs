use actix_web::{HttpResponse, Responder, web};
use tracing::instrument;

use crate::{
    AppState, entities::event::EventPayload, errors::ApiError, use_cases::extractors::AdminAuth,
};

pub async fn list_events(state: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let events = state.events()?.list_events().await?;
    Ok(HttpResponse::Ok().json(events))
}

pub async fn admin_list_events(
    _admin: AdminAuth,
    state: web::Data<AppState>,
) -> Result<impl Responder, ApiError> {
    let events = state.events()?.list_events().await?;
    Ok(HttpResponse::Ok().json(events))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_event(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    data: web::Json<EventPayload>,
) -> Result<impl Responder, ApiError> {
    let event = state.events()?.create_event(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(event))
}

#[instrument(skip(_admin, state, data))]
pub async fn update_event(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    data: web::Json<EventPayload>,
) -> Result<impl Responder, ApiError> {
    let event = state.events()?.update_event(&id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[instrument(skip(_admin, state))]
pub async fn delete_event(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    state.events()?.delete_event(&id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
