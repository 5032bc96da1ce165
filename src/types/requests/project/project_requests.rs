use bson::oid::ObjectId;
use serde::Deserialize;

use crate::models::project_model::ProjectVisibility;
use crate::types::models::role::Role;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,

    #[serde(default)]
    pub slug: Option<String>,

    pub visibility: ProjectVisibility,
}

#[derive(Debug, Deserialize)]
pub struct AddProjectMemberRequest {
    pub user_id: ObjectId,

    pub role: Role,

    pub added_by: ObjectId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectMemberRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetVisibilityRequest {
    pub visibility: ProjectVisibility,
}
