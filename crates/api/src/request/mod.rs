mod confirm_request;
mod decline_request;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/requests/confirm",
        web::get().to(confirm_request::confirm_request_controller),
    );
    cfg.route(
        "/requests/decline",
        web::get().to(decline_request::decline_request_controller),
    );
}
