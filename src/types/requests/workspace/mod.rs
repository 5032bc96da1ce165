pub mod create_workspace_request;
pub mod invite_requests;
pub mod member_requests;
