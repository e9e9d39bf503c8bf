use actix_web::{
    Error, HttpResponse, web,
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};
use futures_util::future::{LocalBoxFuture, Ready, ok};
use std::{
    rc::Rc,
    task::{Context, Poll},
};

use crate::AppState;

/// Requires the `x-api-key` header to match the configured shared secret
/// on every route except the health check. This is defense in depth for a
/// public promotional site, not an identity layer.
pub struct ApiKeyMiddleware;

impl<S> Transform<S, ServiceRequest> for ApiKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiKeyMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_open_route(req.path(), req.method().as_str()) {
                return service.call(req).await;
            }

            let valid_key = req
                .app_data::<web::Data<AppState>>()
                .map(|state| state.config.api_key.clone())
                .unwrap_or_default();

            let given_key = req
                .headers()
                .get("x-api-key")
                .and_then(|h| h.to_str().ok())
                .unwrap_or_default();

            if valid_key.is_empty() || given_key != valid_key {
                tracing::warn!(path = %req.path(), "request rejected: missing or invalid API key");
                let response = HttpResponse::Unauthorized()
                    .json(serde_json::json!({ "error": "Unauthorized" }));
                return Ok(req.into_response(response));
            }

            service.call(req).await
        })
    }
}

fn is_open_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    matches!((path, method), ("/health", "GET"))
}
