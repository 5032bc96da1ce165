use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::types::models::role::Role;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Project {
    #[serde(default)]
    pub _id: Option<ObjectId>,

    pub workspace_id: ObjectId,

    pub name: String,

    pub slug: String,

    /// Visibility and, for private projects only, the authoritative roster.
    /// A public project structurally carries no roster; stored documents
    /// hold `visibility` plus, when private, a `members` array.
    #[serde(flatten)]
    pub access: ProjectAccess,

    #[serde(default)]
    pub version: i64,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "visibility", content = "members", rename_all = "UPPERCASE")]
pub enum ProjectAccess {
    Public,
    Private(Vec<ProjectMember>),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectMember {
    pub user_id: ObjectId,

    pub role: Role,

    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,

    pub added_by: ObjectId,
}

/// Untagged visibility value used by requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ProjectVisibility {
    Public,
    Private,
}

/// One resolved entry of a project's authorized member set.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EffectiveMember {
    pub user_id: ObjectId,

    pub role: Role,

    pub added_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<ObjectId>,
}

impl Project {
    pub fn visibility(&self) -> ProjectVisibility {
        match self.access {
            ProjectAccess::Public => ProjectVisibility::Public,
            ProjectAccess::Private(_) => ProjectVisibility::Private,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(access: ProjectAccess) -> Project {
        let now = Utc::now();
        Project {
            _id: Some(ObjectId::new()),
            workspace_id: ObjectId::new(),
            name: "Site Redesign".to_string(),
            slug: "site-redesign".to_string(),
            access,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_document_has_no_members_field() {
        let doc = bson::to_document(&project(ProjectAccess::Public)).unwrap();
        assert_eq!(doc.get_str("visibility").unwrap(), "PUBLIC");
        assert!(!doc.contains_key("members"));
    }

    #[test]
    fn private_document_carries_roster() {
        let member = ProjectMember {
            user_id: ObjectId::new(),
            role: Role::Editor,
            added_at: Utc::now(),
            added_by: ObjectId::new(),
        };
        let doc = bson::to_document(&project(ProjectAccess::Private(vec![member]))).unwrap();
        assert_eq!(doc.get_str("visibility").unwrap(), "PRIVATE");
        assert_eq!(doc.get_array("members").unwrap().len(), 1);
    }

    #[test]
    fn access_round_trips_through_bson() {
        let original = project(ProjectAccess::Public);
        let doc = bson::to_document(&original).unwrap();
        let restored: Project = bson::from_document(doc).unwrap();
        assert_eq!(restored.visibility(), ProjectVisibility::Public);
    }
}
