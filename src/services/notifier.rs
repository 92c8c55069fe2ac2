//! Mint notifications
//!
//! Notifications are fire-and-forget: delivery runs on its own task, failures
//! are logged, and nothing flows back into the callback response or the
//! ledger.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::db::schemas::EmblemDoc;
use crate::emblem::{EmblemType, Rarity};
use crate::types::GatewayError;

/// What the customer is told about their new emblem
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintNotice {
    pub user_id: String,
    pub emblem_id: String,
    pub emblem_type: EmblemType,
    pub rarity: Rarity,
    pub amount_bani: i64,
    pub amount_display: String,
    pub order_id: String,
}

impl MintNotice {
    pub fn from_emblem(emblem: &EmblemDoc) -> Self {
        Self {
            user_id: emblem.owner_id.clone(),
            emblem_id: emblem.id.clone(),
            emblem_type: emblem.emblem_type,
            rarity: emblem.metadata.rarity,
            amount_bani: emblem.purchase_price.bani(),
            amount_display: emblem.purchase_price.to_string(),
            order_id: emblem.payment_id.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(String),

    #[error("notification endpoint answered {0}")]
    Status(u16),
}

/// Sends the "your emblem is ready" e-mail
#[async_trait::async_trait]
pub trait MintNotifier: Send + Sync {
    async fn send_mint_email(&self, notice: &MintNotice) -> Result<(), NotifyError>;
}

/// Notifier that only logs, used when no webhook is configured
pub struct LogNotifier;

#[async_trait::async_trait]
impl MintNotifier for LogNotifier {
    async fn send_mint_email(&self, notice: &MintNotice) -> Result<(), NotifyError> {
        info!(
            user_id = %notice.user_id,
            emblem_id = %notice.emblem_id,
            rarity = notice.rarity.as_str(),
            "Mint notification (no mail webhook configured)"
        );
        Ok(())
    }
}

/// Posts the notice as JSON to the mail service
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl MintNotifier for WebhookNotifier {
    async fn send_mint_email(&self, notice: &MintNotice) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notice)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Result of a best-effort delivery. Callers are expected to drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    Failed(String),
}

/// Attempt delivery once, logging instead of propagating failure
pub async fn deliver(notifier: &dyn MintNotifier, notice: &MintNotice) -> NotifyOutcome {
    match notifier.send_mint_email(notice).await {
        Ok(()) => NotifyOutcome::Delivered,
        Err(e) => {
            warn!(
                emblem_id = %notice.emblem_id,
                error = %e,
                "Mint notification failed, emblem is minted regardless"
            );
            NotifyOutcome::Failed(e.to_string())
        }
    }
}

/// Run [`deliver`] on a background task
pub fn spawn_delivery(
    notifier: Arc<dyn MintNotifier>,
    notice: MintNotice,
) -> JoinHandle<NotifyOutcome> {
    tokio::spawn(async move { deliver(notifier.as_ref(), &notice).await })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    #[async_trait::async_trait]
    impl MintNotifier for Refusing {
        async fn send_mint_email(&self, _notice: &MintNotice) -> Result<(), NotifyError> {
            Err(NotifyError::Status(503))
        }
    }

    fn notice() -> MintNotice {
        MintNotice {
            user_id: "u1".into(),
            emblem_id: "emblem_u1_1".into(),
            emblem_type: EmblemType::CorbulMistic,
            rarity: Rarity::Rare,
            amount_bani: 15000,
            amount_display: "150.00 RON".into(),
            order_id: "emblem_corbul_mistic_u1_1".into(),
        }
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let outcome = deliver(&Refusing, &notice()).await;
        assert_eq!(
            outcome,
            NotifyOutcome::Failed("notification endpoint answered 503".into())
        );
    }

    #[tokio::test]
    async fn test_spawned_delivery() {
        let handle = spawn_delivery(Arc::new(LogNotifier), notice());
        assert_eq!(handle.await.unwrap(), NotifyOutcome::Delivered);
    }

    #[test]
    fn test_notice_json_shape() {
        let json = serde_json::to_value(notice()).unwrap();
        assert_eq!(json["emblemType"], "corbul_mistic");
        assert_eq!(json["rarity"], "rare");
        assert_eq!(json["amountBani"], 15000);
    }
}
