use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};

use crate::{AppState, errors::ApiError};

/// Extractor gating the admin routes on the shared `x-admin-password`
/// header. Returns 403 on any mismatch, including a missing header or an
/// unconfigured secret.
/// Usage: Add `_admin: AdminAuth` as a parameter to your handler function.
#[derive(Debug)]
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState missing in AdminAuth extractor");
            return ready(Err(ApiError::AccessDenied.into()));
        };

        let expected = state.config.admin_password.as_str();
        let given = req
            .headers()
            .get("x-admin-password")
            .and_then(|h| h.to_str().ok());

        match given {
            Some(given) if !expected.is_empty() && given == expected => ready(Ok(AdminAuth)),
            _ => {
                tracing::warn!(path = %req.path(), "admin access denied");
                ready(Err(ApiError::AccessDenied.into()))
            }
        }
    }
}
