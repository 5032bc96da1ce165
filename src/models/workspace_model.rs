use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::models::role::Role;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Workspace {
    #[serde(default)]
    pub _id: Option<ObjectId>,

    pub name: String,

    pub slug: String,

    pub owner_id: ObjectId,

    #[serde(default)]
    pub members: Vec<WorkspaceMember>,

    #[serde(default)]
    pub invites: Vec<WorkspaceInvite>,

    #[serde(default)]
    pub settings: WorkspaceSettings,

    /// Optimistic-concurrency marker, bumped on every versioned write.
    #[serde(default)]
    pub version: i64,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkspaceMember {
    pub user_id: ObjectId,

    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<ObjectId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_at: Option<DateTime<Utc>>,

    #[serde(default = "Utc::now")]
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkspaceInvite {
    pub id: ObjectId,

    pub email: String,

    pub role: Role,

    pub invited_by: ObjectId,

    pub token: String,

    pub expires_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub accepted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_by: Option<ObjectId>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WorkspaceSettings {
    #[serde(default)]
    pub default_project_public: bool,
}

impl Workspace {
    /// Role a user actually holds in this workspace. The owner is
    /// authoritative even when absent from `members`; every privilege
    /// decision in the crate goes through here instead of comparing ids
    /// at call sites.
    pub fn effective_role(&self, user_id: &ObjectId) -> Option<Role> {
        if *user_id == self.owner_id {
            return Some(Role::Owner);
        }
        self.members
            .iter()
            .find(|m| m.user_id == *user_id)
            .map(|m| m.role)
    }

    pub fn is_member(&self, user_id: &ObjectId) -> bool {
        self.effective_role(user_id).is_some()
    }

    pub fn invite_by_token(&self, token: &str) -> Option<&WorkspaceInvite> {
        self.invites.iter().find(|i| i.token == token)
    }

    /// A live invite blocks creating another one for the same email.
    pub fn live_invite_for_email(&self, email: &str) -> Option<&WorkspaceInvite> {
        let now = Utc::now();
        self.invites
            .iter()
            .find(|i| i.email.eq_ignore_ascii_case(email) && !i.accepted && i.expires_at > now)
    }
}

impl WorkspaceInvite {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
