use actix_web::web;

use crate::handlers::system::health_check;

mod admin;
mod bookings;
mod comments;
mod events;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    cfg.service(
        web::scope("/api")
            .configure(events::config_routes)
            .configure(comments::config_routes)
            .configure(bookings::config_routes)
            .configure(admin::config_routes),
    );
}
