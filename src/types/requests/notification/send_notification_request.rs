use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::notification_model::NotificationType;

/// Logical outbound message, fully typed at the boundary. The engine owns
/// turning this into a tracked notification record.
#[derive(Debug, Deserialize, Clone)]
pub struct SendNotificationRequest {
    pub notification_type: NotificationType,

    pub recipient: String,

    pub subject: String,

    pub content: String,

    #[serde(default)]
    pub template_id: Option<String>,

    #[serde(default)]
    pub template_data: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleNotificationRequest {
    #[serde(flatten)]
    pub message: SendNotificationRequest,

    pub scheduled_at: DateTime<Utc>,
}
