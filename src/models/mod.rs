pub mod notification_model;
pub mod project_model;
pub mod user_model;
pub mod workspace_model;
