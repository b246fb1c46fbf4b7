mod cancel_appointment;
mod create_appointment_links;
mod edit_appointment;
mod get_appointment;

use actix_web::web;
use plena_booking_domain::AppointmentRecord;
use plena_booking_infra::PlenaContext;
use tracing::warn;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/appointments/{event_id}/links",
        web::post().to(create_appointment_links::create_appointment_links_controller),
    );
    cfg.route(
        "/appointments/{event_id}",
        web::get().to(get_appointment::get_appointment_controller),
    );
    cfg.route(
        "/appointments/{event_id}",
        web::put().to(edit_appointment::edit_appointment_controller),
    );
    cfg.route(
        "/appointments/{event_id}/cancel",
        web::post().to(cancel_appointment::cancel_appointment_controller),
    );
}

/// Best-effort write to the status mirror. The calendar write already
/// succeeded at this point, so a mirror failure is logged and swallowed.
pub(crate) async fn mirror_status(ctx: &PlenaContext, record: AppointmentRecord) {
    if let Err(e) = ctx.repos.appointment_statuses.upsert(&record).await {
        warn!("Failed to mirror appointment status: {:?}", e);
    }
}
