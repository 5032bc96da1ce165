pub mod notification_service;
pub mod project_service;
pub mod workspace_service;
