use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::constants::{EMAIL_API_KEY, EMAIL_API_URL};
use crate::models::notification_model::NotificationType;

/// Fully rendered outbound message handed to the provider.
#[derive(Debug, Clone)]
pub struct RenderedMessage {
    pub notification_type: NotificationType,
    pub recipient: String,
    pub subject: String,
    pub content: String,
    pub template_id: Option<String>,
    pub template_data: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub provider_message_id: String,
}

#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub reason: String,
}

/// Seam to the external delivery service. A failed delivery is a value,
/// not a panic or a transport error; callers fold it into the
/// notification record.
#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    async fn deliver(&self, message: &RenderedMessage) -> Result<DeliveryReceipt, DeliveryFailure>;
}

/// Production provider posting to the configured email API.
pub struct HttpEmailProvider {
    client: Client,
}

impl HttpEmailProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpEmailProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryProvider for HttpEmailProvider {
    async fn deliver(&self, message: &RenderedMessage) -> Result<DeliveryReceipt, DeliveryFailure> {
        let payload = json!({
            "to": message.recipient,
            "subject": message.subject,
            "content": message.content,
            "template_id": message.template_id,
            "template_data": message.template_data,
        });

        let response = self
            .client
            .post((*EMAIL_API_URL).as_str())
            .bearer_auth((*EMAIL_API_KEY).as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|err| DeliveryFailure {
                reason: format!("provider request failed: {}", err),
            })?;

        if !response.status().is_success() {
            return Err(DeliveryFailure {
                reason: format!("provider returned status {}", response.status()),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|err| DeliveryFailure {
            reason: format!("provider response unreadable: {}", err),
        })?;

        let provider_message_id = body
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(DeliveryReceipt {
            provider_message_id,
        })
    }
}

/// Scripted provider for tests: outcomes are queued up front, every call
/// is recorded, and an optional per-call delay simulates a slow provider.
#[cfg(test)]
pub struct MockDeliveryProvider {
    outcomes: std::sync::Mutex<std::collections::VecDeque<Result<DeliveryReceipt, DeliveryFailure>>>,
    calls: std::sync::Mutex<Vec<RenderedMessage>>,
    delay: Option<std::time::Duration>,
}

#[cfg(test)]
impl MockDeliveryProvider {
    pub fn new() -> Self {
        Self {
            outcomes: std::sync::Mutex::new(std::collections::VecDeque::new()),
            calls: std::sync::Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn queue_success(&self, provider_message_id: &str) {
        self.outcomes.lock().unwrap().push_back(Ok(DeliveryReceipt {
            provider_message_id: provider_message_id.to_string(),
        }));
    }

    pub fn queue_failure(&self, reason: &str) {
        self.outcomes.lock().unwrap().push_back(Err(DeliveryFailure {
            reason: reason.to_string(),
        }));
    }

    pub fn calls(&self) -> Vec<RenderedMessage> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl DeliveryProvider for MockDeliveryProvider {
    async fn deliver(&self, message: &RenderedMessage) -> Result<DeliveryReceipt, DeliveryFailure> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(message.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(DeliveryReceipt {
                    provider_message_id: "mock-message".to_string(),
                })
            })
    }
}
