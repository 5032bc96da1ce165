pub mod memory;
pub mod notification_repository;
pub mod project_repository;
pub mod user_repository;
pub mod workspace_repository;
