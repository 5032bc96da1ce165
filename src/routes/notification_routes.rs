use actix_web::web;
use std::sync::Arc;

use crate::{
    config::cors::configure_cors,
    handlers::notification_handler::{
        get_notification_handler, mark_delivered_handler, resend_notification_handler,
        schedule_notification_handler, send_notification_handler,
    },
    services::notification_service::NotificationService,
};

pub fn configure_notification_routes(
    cfg: &mut web::ServiceConfig,
    notification_service_data: web::Data<Arc<NotificationService>>,
) {
    cfg.service(
        web::scope("/notifications")
            .wrap(configure_cors())
            .app_data(notification_service_data)
            .route("", web::post().to(send_notification_handler))
            .route("/schedule", web::post().to(schedule_notification_handler))
            .route("/{notification_id}", web::get().to(get_notification_handler))
            .route(
                "/{notification_id}/resend",
                web::post().to(resend_notification_handler),
            )
            .route(
                "/{notification_id}/delivered",
                web::post().to(mark_delivered_handler),
            ),
    );
}
