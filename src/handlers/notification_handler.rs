use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::{
    services::notification_service::NotificationService,
    types::{
        requests::notification::send_notification_request::{
            ScheduleNotificationRequest, SendNotificationRequest,
        },
        responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Messages, Namespace, get_lang},
        validation_utils::{
            handle_validation_error, parse_object_id, validate_send_notification_data,
        },
    },
};

pub async fn send_notification_handler(
    req: HttpRequest,
    notification_service: web::Data<Arc<NotificationService>>,
    payload: web::Json<SendNotificationRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let data = payload.into_inner();

    if let Err(errs) = validate_send_notification_data(&data, &messages) {
        let msg = messages.get_validation_message("notification", "Invalid notification data");
        return handle_validation_error(errs, &msg);
    }

    match notification_service.send(data, &messages).await {
        // An outcome always comes back; delivery failure is carried in the
        // record, not as an HTTP error.
        Ok(outcome) => HttpResponse::Created().json(ApiResponse::success(
            messages.get_str(Namespace::Notification, "send.recorded", "Notification recorded"),
            outcome,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn schedule_notification_handler(
    req: HttpRequest,
    notification_service: web::Data<Arc<NotificationService>>,
    payload: web::Json<ScheduleNotificationRequest>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));
    let data = payload.into_inner();

    if let Err(errs) = validate_send_notification_data(&data.message, &messages) {
        let msg = messages.get_validation_message("notification", "Invalid notification data");
        return handle_validation_error(errs, &msg);
    }

    match notification_service.schedule(data).await {
        Ok(notification) => HttpResponse::Created().json(ApiResponse::success(
            messages.get_str(
                Namespace::Notification,
                "schedule.success",
                "Notification scheduled",
            ),
            notification,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn get_notification_handler(
    req: HttpRequest,
    notification_service: web::Data<Arc<NotificationService>>,
    notification_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let notification_id = match parse_object_id(&notification_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match notification_service
        .get_notification(&notification_id, &messages)
        .await
    {
        Ok(notification) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Notification, "fetch.success", "Notification found"),
            notification,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn resend_notification_handler(
    req: HttpRequest,
    notification_service: web::Data<Arc<NotificationService>>,
    notification_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let notification_id = match parse_object_id(&notification_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match notification_service
        .resend(&notification_id, &messages)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(Namespace::Notification, "resend.recorded", "Resend recorded"),
            outcome,
        )),
        Err(err) => err.to_response(),
    }
}

pub async fn mark_delivered_handler(
    req: HttpRequest,
    notification_service: web::Data<Arc<NotificationService>>,
    notification_id: web::Path<String>,
) -> HttpResponse {
    let messages = Messages::new(get_lang(&req));

    let notification_id = match parse_object_id(&notification_id, &messages) {
        Ok(id) => id,
        Err(err) => return err.to_response(),
    };

    match notification_service
        .mark_delivered(&notification_id, &messages)
        .await
    {
        Ok(notification) => HttpResponse::Ok().json(ApiResponse::success(
            messages.get_str(
                Namespace::Notification,
                "deliver.success",
                "Notification marked delivered",
            ),
            notification,
        )),
        Err(err) => err.to_response(),
    }
}
