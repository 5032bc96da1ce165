pub mod notification;
pub mod project;
pub mod workspace;
