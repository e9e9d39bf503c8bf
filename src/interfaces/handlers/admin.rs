use actix_web::{HttpResponse, Responder};

use crate::use_cases::extractors::AdminAuth;

/// Reaching this handler means the admin password extractor passed.
pub async fn admin_login(_admin: AdminAuth) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Welcome, admin!"
    }))
}
