use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::constants::WORKSPACES_COL_NAME;
use crate::{
    config::database::get_collection,
    models::workspace_model::Workspace,
    types::errors::DomainResult,
};

/// Workspace persistence seam. Finders return `None` on miss;
/// `update_versioned` is the compare-and-swap primitive every membership
/// and invite mutation goes through.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn insert(&self, workspace: Workspace) -> DomainResult<Workspace>;

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Workspace>>;

    async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Workspace>>;

    async fn find_by_user(&self, user_id: &ObjectId) -> DomainResult<Vec<Workspace>>;

    /// Writes the workspace only if the stored `version` still equals
    /// `workspace.version`, bumping it by one. Returns `false` when the
    /// write lost the race.
    async fn update_versioned(&self, workspace: &Workspace) -> DomainResult<bool>;

    async fn delete(&self, id: &ObjectId) -> DomainResult<()>;
}

pub struct MongoWorkspaceRepository {
    collection: Collection<Workspace>,
}

impl MongoWorkspaceRepository {
    pub async fn new(client: &Client) -> DomainResult<Self> {
        let collection = get_collection(client, (*WORKSPACES_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl WorkspaceRepository for MongoWorkspaceRepository {
    async fn insert(&self, mut workspace: Workspace) -> DomainResult<Workspace> {
        if workspace._id.is_none() {
            workspace._id = Some(ObjectId::new());
        }
        self.collection.insert_one(&workspace).await?;
        Ok(workspace)
    }

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Workspace>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Workspace>> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> DomainResult<Vec<Workspace>> {
        let filter = doc! {
            "$or": [
                { "owner_id": user_id },
                { "members.user_id": user_id },
            ]
        };
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_versioned(&self, workspace: &Workspace) -> DomainResult<bool> {
        let mut updated = workspace.clone();
        updated.version = workspace.version + 1;
        updated.updated_at = Utc::now();

        let result = self
            .collection
            .replace_one(
                doc! { "_id": workspace._id, "version": workspace.version },
                &updated,
            )
            .await?;

        Ok(result.matched_count == 1)
    }

    async fn delete(&self, id: &ObjectId) -> DomainResult<()> {
        self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }
}
