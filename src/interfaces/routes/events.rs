use actix_web::web;

use crate::handlers::{events, photos};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("", web::get().to(events::list_events))
            .route(
                "/{event_id}/photos",
                web::get().to(photos::list_event_photos),
            )
            .route(
                "/{event_id}/photos",
                web::post().to(photos::upload_event_photo),
            ),
    );
}
