use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record owned by the external identity layer. Everything in this core
/// references users by id only; the record is never embedded elsewhere.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(default)]
    pub _id: Option<ObjectId>,

    pub external_identity_id: String,

    pub email: String,

    pub name: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
