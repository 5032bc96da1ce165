use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::workspace_model::WorkspaceInvite;
use crate::types::models::role::Role;

/// Read-only projection of an invite, as returned by `validate_invite`.
/// The token itself is never echoed back.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InviteView {
    pub id: ObjectId,
    pub email: String,
    pub role: Role,
    pub invited_by: ObjectId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    pub expired: bool,
}

impl InviteView {
    pub fn from_invite(invite: &WorkspaceInvite, now: DateTime<Utc>) -> Self {
        Self {
            id: invite.id,
            email: invite.email.clone(),
            role: invite.role,
            invited_by: invite.invited_by,
            expires_at: invite.expires_at,
            created_at: invite.created_at,
            accepted: invite.accepted,
            accepted_at: invite.accepted_at,
            expired: invite.is_expired(now),
        }
    }
}
