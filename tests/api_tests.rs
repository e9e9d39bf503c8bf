mod test_stores;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, http::StatusCode, middleware::NormalizePath, test, web};
use serde_json::{Value, json};

use bandsite_backend::{
    AppState, middlewares::api_key::ApiKeyMiddleware, routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
};

use test_stores::{MockObjects, MockRelations, test_config};

const API_KEY: &str = "test-api-key";
const ADMIN_PASSWORD: &str = "test-admin-password";

fn state_with(objects: MockObjects, relations: MockRelations, config: AppConfig) -> AppState {
    AppState::with_stores(config, Arc::new(objects), Arc::new(relations))
}

// Same middleware composition as the server binary: the API key gate
// wraps the bare route stack, cors sits outermost.
macro_rules! build_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(ApiKeyMiddleware)
                .wrap(NormalizePath::trim())
                .wrap(Cors::permissive())
                .configure(configure_routes),
        )
        .await
    };
}

fn multipart_body(boundary: &str, content_type: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

fn multipart_body_with_caption(boundary: &str, photo: &[u8], caption: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"photo\"; filename=\"a.jpg\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(photo);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"caption\"\r\n\r\n");
    body.extend_from_slice(caption);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[actix_web::test]
async fn health_check_is_open() {
    let app = build_app!(state_with(
        MockObjects::new(),
        MockRelations::new(),
        test_config()
    ));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn api_routes_require_the_shared_key() {
    let app = build_app!(state_with(
        MockObjects::new(),
        MockRelations::new(),
        test_config()
    ));

    let req = test::TestRequest::get()
        .uri("/api/events/ev-1/photos")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unauthorized");

    let req = test::TestRequest::get()
        .uri("/api/events/ev-1/photos")
        .insert_header(("x-api-key", "wrong-key"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_routes_reject_a_wrong_password() {
    let app = build_app!(state_with(
        MockObjects::new(),
        MockRelations::new(),
        test_config()
    ));

    let req = test::TestRequest::get()
        .uri("/api/admin/events/ev-1/photos")
        .insert_header(("x-api-key", API_KEY))
        .insert_header(("x-admin-password", "guess"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Missing header entirely is the same refusal.
    let req = test::TestRequest::get()
        .uri("/api/admin/events/ev-1/photos")
        .insert_header(("x-api-key", API_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_login_accepts_the_configured_password() {
    let app = build_app!(state_with(
        MockObjects::new(),
        MockRelations::new(),
        test_config()
    ));

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .insert_header(("x-api-key", API_KEY))
        .insert_header(("x-admin-password", ADMIN_PASSWORD))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
}

// `use actix_web::test` shadows the built-in `#[test]` attribute, so the
// sync tests name it explicitly.
#[::core::prelude::v1::test]
fn development_cors_admits_localhost_on_any_port() {
    let mut config = test_config();
    config.cors_allowed_origins = vec![];

    assert!(config.origin_allowed("http://localhost:5173"));
    assert!(config.origin_allowed("http://localhost"));
    assert!(config.origin_allowed(&config.frontend_url));
    assert!(!config.origin_allowed("https://evil.example"));
}

#[::core::prelude::v1::test]
fn production_cors_admits_only_configured_origins() {
    let mut config = test_config();
    config.env = AppEnvironment::Production;
    config.frontend_url = "https://troniousmusic.com".to_string();
    config.cors_allowed_origins = vec!["https://staging.troniousmusic.com".to_string()];

    assert!(config.origin_allowed("https://troniousmusic.com"));
    assert!(config.origin_allowed("https://staging.troniousmusic.com"));
    assert!(!config.origin_allowed("http://localhost:5173"));
    assert!(!config.origin_allowed("https://evil.example"));
}

#[actix_web::test]
async fn preflight_requests_skip_the_api_key_gate() {
    let app = build_app!(state_with(
        MockObjects::new(),
        MockRelations::new(),
        test_config()
    ));

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/events/ev-1/photos")
        .insert_header(("origin", "http://localhost:5173"))
        .insert_header(("access-control-request-method", "POST"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}

#[actix_web::test]
async fn unconfigured_store_answers_500_with_a_reason() {
    // No hosted-store credentials at all.
    let state = AppState::new(&test_config());
    let app = build_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/events/ev-1/photos")
        .insert_header(("x-api-key", API_KEY))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("not configured")
    );
}

#[actix_web::test]
async fn upload_round_trips_through_the_api() {
    let mut objects = MockObjects::new();
    let mut relations = MockRelations::new();

    objects.expect_upload().times(1).returning(|_, _, _, _| Ok(()));
    objects
        .expect_public_url()
        .returning(|_, path| format!("https://cdn.test/{path}"));
    relations.expect_insert().times(1).returning(|_, row| {
        Ok(json!({
            "id": 1,
            "event_id": row["event_id"],
            "storage_path": row["storage_path"],
            "url": row["url"],
            "caption": row["caption"],
        }))
    });

    let app = build_app!(state_with(objects, relations, test_config()));

    let boundary = "test-boundary";
    let req = test::TestRequest::post()
        .uri("/api/events/ev-1/photos")
        .insert_header(("x-api-key", API_KEY))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart_body(boundary, "image/jpeg", "stage.jpg", &[0u8; 32]))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    // Admitted uploads report their remaining quota too.
    assert_eq!(resp.headers().get("ratelimit-limit").unwrap(), "10");
    assert_eq!(resp.headers().get("ratelimit-remaining").unwrap(), "9");
    assert!(resp.headers().contains_key("ratelimit-reset"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], "1");
    assert_eq!(body["event_id"], "ev-1");
    assert!(
        body["url"]
            .as_str()
            .unwrap_or_default()
            .starts_with("https://cdn.test/ev-1/")
    );
}

#[actix_web::test]
async fn oversized_captions_are_rejected_while_streaming() {
    let mut objects = MockObjects::new();
    let relations = MockRelations::new();
    objects.expect_upload().times(0);

    let app = build_app!(state_with(objects, relations, test_config()));

    // Far beyond the caption byte ceiling; must be refused without
    // buffering the whole field or touching a store.
    let caption = vec![b'x'; 64 * 1024];
    let boundary = "test-boundary";
    let req = test::TestRequest::post()
        .uri("/api/events/ev-1/photos")
        .insert_header(("x-api-key", API_KEY))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart_body_with_caption(boundary, &[0u8; 16], &caption))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Caption too long");
}

#[actix_web::test]
async fn non_image_uploads_are_rejected_before_any_store_call() {
    let mut objects = MockObjects::new();
    let relations = MockRelations::new();
    objects.expect_upload().times(0);

    let app = build_app!(state_with(objects, relations, test_config()));

    let boundary = "test-boundary";
    let req = test::TestRequest::post()
        .uri("/api/events/ev-1/photos")
        .insert_header(("x-api-key", API_KEY))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart_body(boundary, "text/plain", "notes.txt", b"hello"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Only image uploads are allowed");
}

#[actix_web::test]
async fn rejected_uploads_still_consume_rate_limit_quota() {
    let objects = MockObjects::new();
    let relations = MockRelations::new();

    let mut config = test_config();
    config.upload_rate_limit = 2;
    let app = build_app!(state_with(objects, relations, config));

    let boundary = "test-boundary";
    let make_request = || {
        test::TestRequest::post()
            .uri("/api/events/ev-1/photos")
            .insert_header(("x-api-key", API_KEY))
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(multipart_body(boundary, "text/plain", "notes.txt", b"x"))
            .to_request()
    };

    for _ in 0..2 {
        let resp = test::call_service(&app, make_request()).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    let resp = test::call_service(&app, make_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get("ratelimit-limit").unwrap(), "2");
    assert_eq!(resp.headers().get("ratelimit-remaining").unwrap(), "0");
    assert!(resp.headers().contains_key("retry-after"));
}

#[actix_web::test]
async fn admin_photo_deletion_reports_success() {
    let mut objects = MockObjects::new();
    let mut relations = MockRelations::new();

    objects.expect_remove().times(1).returning(|_, _| Ok(()));
    relations.expect_delete().times(1).returning(|_, _| Ok(()));

    let app = build_app!(state_with(objects, relations, test_config()));

    let req = test::TestRequest::delete()
        .uri("/api/admin/events/ev-1/photos")
        .insert_header(("x-api-key", API_KEY))
        .insert_header(("x-admin-password", ADMIN_PASSWORD))
        .set_json(json!({ "storage_path": "ev-1/a.jpg" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
}
