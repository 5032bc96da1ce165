use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::constants::PROJECTS_COL_NAME;
use crate::{
    config::database::get_collection,
    models::project_model::Project,
    types::errors::DomainResult,
};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert(&self, project: Project) -> DomainResult<Project>;

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Project>>;

    async fn find_by_workspace(&self, workspace_id: &ObjectId) -> DomainResult<Vec<Project>>;

    async fn find_by_workspace_and_slug(
        &self,
        workspace_id: &ObjectId,
        slug: &str,
    ) -> DomainResult<Option<Project>>;

    /// Compare-and-swap on `version`; `false` means the write lost the race.
    async fn update_versioned(&self, project: &Project) -> DomainResult<bool>;

    async fn delete(&self, id: &ObjectId) -> DomainResult<()>;
}

pub struct MongoProjectRepository {
    collection: Collection<Project>,
}

impl MongoProjectRepository {
    pub async fn new(client: &Client) -> DomainResult<Self> {
        let collection = get_collection(client, (*PROJECTS_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl ProjectRepository for MongoProjectRepository {
    async fn insert(&self, mut project: Project) -> DomainResult<Project> {
        if project._id.is_none() {
            project._id = Some(ObjectId::new());
        }
        self.collection.insert_one(&project).await?;
        Ok(project)
    }

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Project>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_workspace(&self, workspace_id: &ObjectId) -> DomainResult<Vec<Project>> {
        let cursor = self
            .collection
            .find(doc! { "workspace_id": workspace_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_workspace_and_slug(
        &self,
        workspace_id: &ObjectId,
        slug: &str,
    ) -> DomainResult<Option<Project>> {
        Ok(self
            .collection
            .find_one(doc! { "workspace_id": workspace_id, "slug": slug })
            .await?)
    }

    async fn update_versioned(&self, project: &Project) -> DomainResult<bool> {
        let mut updated = project.clone();
        updated.version = project.version + 1;
        updated.updated_at = Utc::now();

        // Full replacement so a roster dropped by a visibility change does
        // not linger as a stale stored field.
        let result = self
            .collection
            .replace_one(
                doc! { "_id": project._id, "version": project.version },
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
