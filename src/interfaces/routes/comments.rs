use actix_web::web;

use crate::handlers::comments;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .route("/counts", web::get().to(comments::comment_counts))
            .route("/{event_id}", web::get().to(comments::list_event_comments))
            .route("", web::post().to(comments::create_comment)),
    );
}
