use actix_web::{HttpResponse, Responder, get};
use chrono::Utc;
use humantime::format_duration;
use std::time::Duration;

use crate::constants::START_TIME;

#[get("/health")]
pub async fn health_check() -> impl Responder {
    let uptime = Utc::now().signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "bandsite-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime": human_uptime.to_string(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
