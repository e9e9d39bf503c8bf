use std::{sync::Arc, time::Duration};

mod domain;
mod infrastructure;
mod interfaces;
pub mod constants;
pub mod errors;
pub mod graceful_shutdown;
pub mod settings;

pub use domain::{entities, use_cases};
pub use infrastructure::{email, limiter, supabase, utils};
pub use interfaces::{handlers, middlewares, repositories, routes};

use email::smtp::Mailer;
use errors::ApiError;
use limiter::rate_limiter::RateLimiterStore;
use repositories::{object_store::ObjectStore, relation_store::RelationStore};
use settings::AppConfig;
use supabase::client::{SupabaseClient, SupabasePostgrest, SupabaseStorage};
use use_cases::{
    bookings::BookingHandler, comments::CommentHandler, events::EventHandler, photos::PhotoHandler,
};

const PHOTOS_NOT_CONFIGURED: &str =
    "Server not configured for photo uploads (missing APP_SUPABASE_URL / APP_SUPABASE_SERVICE_KEY).";
const STORE_NOT_CONFIGURED: &str =
    "Server not configured for database access (missing APP_SUPABASE_URL / APP_SUPABASE_SERVICE_KEY).";
const EMAIL_NOT_CONFIGURED: &str =
    "Server not configured for booking inquiries (missing SMTP settings).";

pub struct AppState {
    pub config: AppConfig,
    pub upload_limiter: RateLimiterStore,
    photo_handler: Option<PhotoHandler>,
    event_handler: Option<EventHandler>,
    comment_handler: Option<CommentHandler>,
    booking_handler: Option<BookingHandler>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let stores = build_supabase_stores(config);

        let (photo_handler, event_handler, comment_handler) = match stores {
            Some((objects, relations)) => (
                Some(PhotoHandler::new(
                    objects,
                    relations.clone(),
                    config.photos_bucket.clone(),
                )),
                Some(EventHandler::new(relations.clone())),
                Some(CommentHandler::new(relations)),
            ),
            None => (None, None, None),
        };

        let booking_handler = build_booking_handler(config);

        let upload_limiter = RateLimiterStore::new(
            config.upload_rate_limit,
            Duration::from_secs(config.upload_rate_window_secs),
        );

        AppState {
            config: config.clone(),
            upload_limiter,
            photo_handler,
            event_handler,
            comment_handler,
            booking_handler,
        }
    }

    /// Constructor for tests: wires the given stores in place of the
    /// hosted service clients. No booking mailer is set up.
    pub fn with_stores(
        config: AppConfig,
        objects: Arc<dyn ObjectStore>,
        relations: Arc<dyn RelationStore>,
    ) -> Self {
        let upload_limiter = RateLimiterStore::new(
            config.upload_rate_limit,
            Duration::from_secs(config.upload_rate_window_secs),
        );

        AppState {
            photo_handler: Some(PhotoHandler::new(
                objects,
                relations.clone(),
                config.photos_bucket.clone(),
            )),
            event_handler: Some(EventHandler::new(relations.clone())),
            comment_handler: Some(CommentHandler::new(relations)),
            booking_handler: None,
            upload_limiter,
            config,
        }
    }

    pub fn photos(&self) -> Result<&PhotoHandler, ApiError> {
        self.photo_handler
            .as_ref()
            .ok_or(ApiError::ServerNotConfigured(PHOTOS_NOT_CONFIGURED))
    }

    pub fn events(&self) -> Result<&EventHandler, ApiError> {
        self.event_handler
            .as_ref()
            .ok_or(ApiError::ServerNotConfigured(STORE_NOT_CONFIGURED))
    }

    pub fn comments(&self) -> Result<&CommentHandler, ApiError> {
        self.comment_handler
            .as_ref()
            .ok_or(ApiError::ServerNotConfigured(STORE_NOT_CONFIGURED))
    }

    pub fn bookings(&self) -> Result<&BookingHandler, ApiError> {
        self.booking_handler
            .as_ref()
            .ok_or(ApiError::ServerNotConfigured(EMAIL_NOT_CONFIGURED))
    }
}

type Stores = (Arc<dyn ObjectStore>, Arc<dyn RelationStore>);

fn build_supabase_stores(config: &AppConfig) -> Option<Stores> {
    let (Some(url), Some(key)) = (
        config.supabase_url.as_deref(),
        config.supabase_service_key.as_deref(),
    ) else {
        tracing::warn!("Supabase credentials not configured; store-backed routes will return 500");
        return None;
    };

    match SupabaseClient::new(url, key) {
        Ok(client) => {
            let client = Arc::new(client);
            let objects: Arc<dyn ObjectStore> = Arc::new(SupabaseStorage::new(client.clone()));
            let relations: Arc<dyn RelationStore> = Arc::new(SupabasePostgrest::new(client));
            Some((objects, relations))
        }
        Err(e) => {
            tracing::error!("Invalid Supabase URL: {}", e);
            None
        }
    }
}

fn build_booking_handler(config: &AppConfig) -> Option<BookingHandler> {
    if !config.smtp_configured() {
        tracing::warn!("SMTP not configured; booking inquiries will return 500");
        return None;
    }

    let mailer = Mailer::new(
        config.smtp_host.as_deref().unwrap_or_default(),
        config.smtp_username.as_deref().unwrap_or_default(),
        config.smtp_password.as_deref().unwrap_or_default(),
        config.booking_recipient.as_deref().unwrap_or_default(),
    );

    match mailer {
        Ok(mailer) => Some(BookingHandler::new(mailer)),
        Err(e) => {
            tracing::error!("SMTP transport setup failed: {}", e);
            None
        }
    }
}
