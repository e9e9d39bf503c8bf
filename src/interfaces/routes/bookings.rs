use actix_web::web;

use crate::handlers::bookings;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/bookings").route("", web::post().to(bookings::submit_booking)));
}
