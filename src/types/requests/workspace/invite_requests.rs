use bson::oid::ObjectId;
use serde::Deserialize;

use crate::types::models::role::Role;

#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub email: String,

    pub role: Role,

    pub invited_by: ObjectId,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub token: String,

    pub user_id: ObjectId,

    /// Email of the accepting account; must match the invite's email.
    pub email: String,
}
