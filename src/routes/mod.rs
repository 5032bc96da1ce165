pub mod notification_routes;
pub mod project_routes;
pub mod workspace_routes;
