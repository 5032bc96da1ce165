use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::constants::USERS_COL_NAME;
use crate::{config::database::get_collection, models::user_model::User, types::errors::DomainResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> DomainResult<User>;

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_by_external_identity_id(
        &self,
        external_identity_id: &str,
    ) -> DomainResult<Option<User>>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub async fn new(client: &Client) -> DomainResult<Self> {
        let collection = get_collection(client, (*USERS_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, mut user: User) -> DomainResult<User> {
        if user._id.is_none() {
            user._id = Some(ObjectId::new());
        }
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_external_identity_id(
        &self,
        external_identity_id: &str,
    ) -> DomainResult<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "external_identity_id": external_identity_id })
            .await?)
    }
}
