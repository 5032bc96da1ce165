pub mod send_notification_request;
