use actix_web::{HttpResponse, Responder, web};
use tracing::instrument;

use crate::{AppState, entities::booking::BookingInquiry, errors::ApiError};

#[instrument(skip(state, data))]
pub async fn submit_booking(
    state: web::Data<AppState>,
    data: web::Json<BookingInquiry>,
) -> Result<impl Responder, ApiError> {
    state.bookings()?.submit_inquiry(data.into_inner()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Inquiry sent successfully"
    })))
}
