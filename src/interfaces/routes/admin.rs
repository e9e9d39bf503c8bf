use actix_web::web;

use crate::handlers::{admin, comments, events, photos};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/login", web::post().to(admin::admin_login))
            .route("/events", web::get().to(events::admin_list_events))
            .route("/events", web::post().to(events::create_event))
            .route("/events/{id}", web::put().to(events::update_event))
            .route("/events/{id}", web::delete().to(events::delete_event))
            .route(
                "/events/{event_id}/photos",
                web::get().to(photos::admin_list_event_photos),
            )
            .route(
                "/events/{event_id}/photos",
                web::delete().to(photos::delete_event_photo),
            )
            .route("/comments/{id}", web::delete().to(comments::delete_comment)),
    );
}
