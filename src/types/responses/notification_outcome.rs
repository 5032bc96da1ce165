use serde::{Deserialize, Serialize};

use crate::models::notification_model::Notification;

/// Result of a single dispatch attempt. Delivery failure is data, not an
/// error: `success` is false and the record carries the reason.
#[derive(Debug, Serialize, Clone)]
pub struct SendOutcome {
    pub notification: Notification,
    pub success: bool,
}

/// Counts from one retry or pending sweep.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub processed: u32,
    pub successful: u32,
    pub failed: u32,
}
