use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::warn;
use mongodb::bson::oid::ObjectId;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::models::notification_model::{Notification, NotificationStatus, NotificationType};
use crate::providers::delivery_provider::{DeliveryProvider, RenderedMessage};
use crate::repositories::notification_repository::NotificationRepository;
use crate::types::errors::{DomainError, DomainResult};
use crate::types::requests::notification::send_notification_request::{
    ScheduleNotificationRequest, SendNotificationRequest,
};
use crate::types::responses::notification_outcome::{SendOutcome, SweepReport};
use crate::utils::locale_utils::{Messages, Namespace};

/// Turns logical messages into tracked notification records and walks them
/// through `PENDING -> {SENT, FAILED}`, `SENT -> DELIVERED`, with bounded
/// `FAILED -> PENDING`-style retries. All retry state lives on the record;
/// every transition is a per-record compare-and-swap.
pub struct NotificationService {
    notification_repository: Arc<dyn NotificationRepository>,
    provider: Arc<dyn DeliveryProvider>,
    provider_timeout: Duration,
}

impl NotificationService {
    pub fn new(
        notification_repository: Arc<dyn NotificationRepository>,
        provider: Arc<dyn DeliveryProvider>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            notification_repository,
            provider,
            provider_timeout,
        }
    }

    fn build_record(message: SendNotificationRequest) -> Notification {
        Notification {
            _id: Some(ObjectId::new()),
            notification_type: message.notification_type,
            status: NotificationStatus::Pending,
            recipient: message.recipient,
            subject: message.subject,
            content: message.content,
            template_id: message.template_id,
            template_data: message.template_data,
            scheduled_at: None,
            sent_at: None,
            delivered_at: None,
            failed_at: None,
            failure_reason: None,
            provider_message_id: None,
            retry_count: 0,
            max_retries: crate::constants::DEFAULT_MAX_RETRIES,
            version: 0,
            created_at: Utc::now(),
        }
    }

    fn render(notification: &Notification) -> RenderedMessage {
        RenderedMessage {
            notification_type: notification.notification_type,
            recipient: notification.recipient.clone(),
            subject: notification.subject.clone(),
            content: notification.content.clone(),
            template_id: notification.template_id.clone(),
            template_data: notification.template_data.clone(),
        }
    }

    /// Creates the record and dispatches it synchronously. Provider failure
    /// is reported through the outcome, never as an `Err`; only the
    /// service's own record-keeping can fail this call.
    pub async fn send(
        &self,
        message: SendNotificationRequest,
        messages: &Messages,
    ) -> DomainResult<SendOutcome> {
        let record = Self::build_record(message);
        let stored = self.notification_repository.insert(record).await?;
        self.dispatch(stored, true, messages).await
    }

    /// Persists a PENDING record carrying the full payload for later
    /// dispatch by `process_pending`; the provider is not contacted.
    pub async fn schedule(
        &self,
        request: ScheduleNotificationRequest,
    ) -> DomainResult<Notification> {
        let mut record = Self::build_record(request.message);
        record.scheduled_at = Some(request.scheduled_at);
        self.notification_repository.insert(record).await
    }

    /// Re-dispatches a previously created email notification. The retry
    /// counter is committed before the attempt so a concurrent sweep and a
    /// manual resend cannot race past the cap.
    pub async fn resend(
        &self,
        notification_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<SendOutcome> {
        let notification = self
            .notification_repository
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(messages.get_str(
                    Namespace::Notification,
                    "fetch.not_found",
                    "Notification not found",
                ))
            })?;

        self.resend_record(notification, messages).await
    }

    async fn resend_record(
        &self,
        mut notification: Notification,
        messages: &Messages,
    ) -> DomainResult<SendOutcome> {
        if notification.notification_type != NotificationType::Email {
            return Err(DomainError::Validation(messages.get_str(
                Namespace::Notification,
                "resend.not_email",
                "Only email notifications can be resent",
            )));
        }

        if notification.retries_exhausted() {
            return Err(DomainError::Conflict(messages.get_str(
                Namespace::Notification,
                "resend.retry_limit",
                "Retry limit reached",
            )));
        }

        notification.retry_count += 1;
        if !self
            .notification_repository
            .update_versioned(&notification)
            .await?
        {
            return Err(DomainError::Conflict(messages.get_str(
                Namespace::Notification,
                "resend.concurrent",
                "Notification was modified concurrently",
            )));
        }
        notification.version += 1;

        self.dispatch(notification, false, messages).await
    }

    /// One provider attempt plus the SENT/FAILED transition, committed with
    /// a version check so each record transitions at most once per caller.
    async fn dispatch(
        &self,
        mut notification: Notification,
        count_failure: bool,
        messages: &Messages,
    ) -> DomainResult<SendOutcome> {
        let rendered = Self::render(&notification);
        let attempt = timeout(self.provider_timeout, self.provider.deliver(&rendered)).await;

        let now = Utc::now();
        let success = match attempt {
            Ok(Ok(receipt)) => {
                notification.status = NotificationStatus::Sent;
                notification.sent_at = Some(now);
                notification.provider_message_id = Some(receipt.provider_message_id);
                notification.failure_reason = None;
                true
            }
            Ok(Err(failure)) => {
                notification.status = NotificationStatus::Failed;
                notification.failed_at = Some(now);
                notification.failure_reason = Some(failure.reason);
                if count_failure {
                    notification.retry_count += 1;
                }
                false
            }
            Err(_) => {
                notification.status = NotificationStatus::Failed;
                notification.failed_at = Some(now);
                notification.failure_reason = Some("delivery attempt timed out".to_string());
                if count_failure {
                    notification.retry_count += 1;
                }
                false
            }
        };

        if !self
            .notification_repository
            .update_versioned(&notification)
            .await?
        {
            return Err(DomainError::Conflict(messages.get_str(
                Namespace::Notification,
                "resend.concurrent",
                "Notification was modified concurrently",
            )));
        }
        notification.version += 1;

        Ok(SendOutcome {
            notification,
            success,
        })
    }

    /// Retry sweep over FAILED records with attempts remaining, oldest
    /// failure first. Records are independent: one bad record never aborts
    /// the sweep, and the cancellation token is honored between records.
    pub async fn process_retries(
        &self,
        batch_size: i64,
        cancel: &CancellationToken,
        messages: &Messages,
    ) -> DomainResult<SweepReport> {
        let batch = self.notification_repository.find_retryable(batch_size).await?;

        let mut report = SweepReport::default();
        for notification in batch {
            if cancel.is_cancelled() {
                break;
            }
            report.processed += 1;
            match self.resend_record(notification, messages).await {
                Ok(outcome) if outcome.success => report.successful += 1,
                Ok(_) => report.failed += 1,
                Err(err) => {
                    warn!("retry sweep skipped a record: {}", err);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Dispatches PENDING records whose scheduled time has arrived, oldest
    /// first, each at most once per invocation.
    pub async fn process_pending(
        &self,
        batch_size: i64,
        cancel: &CancellationToken,
        messages: &Messages,
    ) -> DomainResult<SweepReport> {
        let batch = self
            .notification_repository
            .find_due_pending(Utc::now(), batch_size)
            .await?;

        let mut report = SweepReport::default();
        for notification in batch {
            if cancel.is_cancelled() {
                break;
            }
            report.processed += 1;
            match self.dispatch(notification, true, messages).await {
                Ok(outcome) if outcome.success => report.successful += 1,
                Ok(_) => report.failed += 1,
                Err(err) => {
                    warn!("pending sweep skipped a record: {}", err);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Terminal upgrade reported by the provider's delivery callback.
    pub async fn mark_delivered(
        &self,
        notification_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Notification> {
        let mut notification = self
            .notification_repository
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(messages.get_str(
                    Namespace::Notification,
                    "fetch.not_found",
                    "Notification not found",
                ))
            })?;

        if notification.status != NotificationStatus::Sent {
            return Err(DomainError::Conflict(messages.get_str(
                Namespace::Notification,
                "deliver.not_sent",
                "Only sent notifications can be marked delivered",
            )));
        }

        notification.status = NotificationStatus::Delivered;
        notification.delivered_at = Some(Utc::now());

        if !self
            .notification_repository
            .update_versioned(&notification)
            .await?
        {
            return Err(DomainError::Conflict(messages.get_str(
                Namespace::Notification,
                "resend.concurrent",
                "Notification was modified concurrently",
            )));
        }
        notification.version += 1;

        Ok(notification)
    }

    pub async fn get_notification(
        &self,
        notification_id: &ObjectId,
        messages: &Messages,
    ) -> DomainResult<Notification> {
        self.notification_repository
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(messages.get_str(
                    Namespace::Notification,
                    "fetch.not_found",
                    "Notification not found",
                ))
            })
    }
}
