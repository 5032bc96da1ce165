use bson::oid::ObjectId;
use serde::Deserialize;

use crate::types::models::role::Role;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: ObjectId,

    pub role: Role,

    #[serde(default)]
    pub invited_by: Option<ObjectId>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeMemberRoleRequest {
    pub role: Role,
}
