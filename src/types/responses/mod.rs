pub mod api_response;
pub mod invite_view;
pub mod notification_outcome;
