use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use mongodb::{Client, Collection};

use crate::constants::NOTIFICATIONS_COL_NAME;
use crate::{
    config::database::get_collection,
    models::notification_model::{Notification, NotificationStatus, NotificationType},
    types::errors::DomainResult,
};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: Notification) -> DomainResult<Notification>;

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Notification>>;

    /// Compare-and-swap on `version`; `false` means another writer already
    /// transitioned this record.
    async fn update_versioned(&self, notification: &Notification) -> DomainResult<bool>;

    /// FAILED email records with attempts remaining, oldest `failed_at`
    /// first. Only email notifications are resendable, so other types are
    /// never selected; a failed in-app record would otherwise be re-picked
    /// by every sweep and rejected every time.
    async fn find_retryable(&self, limit: i64) -> DomainResult<Vec<Notification>>;

    /// PENDING records whose scheduled time (if any) has arrived, oldest
    /// `created_at` first.
    async fn find_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> DomainResult<Vec<Notification>>;
}

pub struct MongoNotificationRepository {
    collection: Collection<Notification>,
}

impl MongoNotificationRepository {
    pub async fn new(client: &Client) -> DomainResult<Self> {
        let collection = get_collection(client, (*NOTIFICATIONS_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl NotificationRepository for MongoNotificationRepository {
    async fn insert(&self, mut notification: Notification) -> DomainResult<Notification> {
        if notification._id.is_none() {
            notification._id = Some(ObjectId::new());
        }
        self.collection.insert_one(&notification).await?;
        Ok(notification)
    }

    async fn find_by_id(&self, id: &ObjectId) -> DomainResult<Option<Notification>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn update_versioned(&self, notification: &Notification) -> DomainResult<bool> {
        let mut updated = notification.clone();
        updated.version = notification.version + 1;

        let result = self
            .collection
            .replace_one(
                doc! { "_id": notification._id, "version": notification.version },
                &updated,
            )
            .await?;

        Ok(result.matched_count == 1)
    }

    async fn find_retryable(&self, limit: i64) -> DomainResult<Vec<Notification>> {
        let filter = doc! {
            "status": to_bson(&NotificationStatus::Failed)?,
            "notification_type": to_bson(&NotificationType::Email)?,
            "$expr": { "$lt": ["$retry_count", "$max_retries"] },
        };
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "failed_at": 1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> DomainResult<Vec<Notification>> {
        let filter = doc! {
            "status": to_bson(&NotificationStatus::Pending)?,
            "$or": [
                { "scheduled_at": { "$exists": false } },
                { "scheduled_at": { "$lte": to_bson(&now)? } },
            ],
        };
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
