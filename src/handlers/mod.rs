pub mod notification_handler;
pub mod project_handler;
pub mod workspace_handler;
