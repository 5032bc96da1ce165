use bson::oid::ObjectId;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,

    /// Explicit slug; derived from the name when omitted.
    #[serde(default)]
    pub slug: Option<String>,

    pub owner_id: ObjectId,
}
