//! Mint workflow for confirmed emblem payments
//!
//! ```text
//! callback body ─► parse ─► signature? ─► status ─► orderId ─► amount
//!                                            │
//!                                   not confirmed: stop
//!                                            ▼
//!                         metadata ─► ledger commit ─► notification (detached)
//! ```

use bson::DateTime as BsonDateTime;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::notifier::{spawn_delivery, MintNotice, MintNotifier};
use super::signature::CallbackVerifier;
use crate::emblem::{generate_metadata, EmblemType, Money, OrderRef};
use crate::ledger::{EmblemLedger, MintBatch, MintOutcome};
use crate::types::{GatewayError, Result};

/// Payment statuses that complete an order
pub const CONFIRMED_STATUSES: [&str; 2] = ["confirmed", "paid"];

/// Body of a payment processor callback
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallback {
    pub order_id: String,
    pub status: String,
    /// Amount in bani
    pub amount: serde_json::Number,
    #[serde(default)]
    pub signature: Option<String>,
}

impl PaymentCallback {
    pub fn is_confirmed(&self) -> bool {
        CONFIRMED_STATUSES.contains(&self.status.as_str())
    }
}

/// What a callback resulted in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Payment is not final yet; nothing was written
    NotConfirmed { status: String },
    Minted {
        emblem_id: String,
        emblem_type: EmblemType,
    },
    /// The order was already minted by an earlier delivery
    Duplicate {
        emblem_id: String,
        emblem_type: EmblemType,
    },
}

pub struct MintService {
    ledger: Arc<dyn EmblemLedger>,
    notifier: Arc<dyn MintNotifier>,
    verifier: Option<CallbackVerifier>,
}

impl MintService {
    pub fn new(ledger: Arc<dyn EmblemLedger>, notifier: Arc<dyn MintNotifier>) -> Self {
        Self {
            ledger,
            notifier,
            verifier: None,
        }
    }

    /// Require callbacks to be signed by the processor
    pub fn with_verifier(mut self, verifier: CallbackVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn ledger(&self) -> &Arc<dyn EmblemLedger> {
        &self.ledger
    }

    pub async fn handle_callback(&self, body: &[u8]) -> Result<CallbackOutcome> {
        self.handle_callback_at(body, Utc::now()).await
    }

    /// Process a callback body as if received at `now`
    pub async fn handle_callback_at(
        &self,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<CallbackOutcome> {
        let callback: PaymentCallback = serde_json::from_slice(body)
            .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;

        match self.verifier {
            Some(ref verifier) => verifier.verify(&callback)?,
            None if callback.signature.is_some() => {
                debug!(order_id = %callback.order_id, "Signature not checked, no processor key configured");
            }
            None => {}
        }

        if !callback.is_confirmed() {
            info!(
                order_id = %callback.order_id,
                status = %callback.status,
                "Payment not confirmed yet, ignoring callback"
            );
            return Ok(CallbackOutcome::NotConfirmed {
                status: callback.status,
            });
        }

        let order = OrderRef::parse(&callback.order_id)?;
        let amount = Money::from_json_amount(&callback.amount)?;

        self.mint(&order, amount, &callback.status, now).await
    }

    /// Generate metadata and commit the mint for a validated order
    pub async fn mint(
        &self,
        order: &OrderRef,
        amount: Money,
        payment_status: &str,
        now: DateTime<Utc>,
    ) -> Result<CallbackOutcome> {
        let metadata = generate_metadata(order.emblem_type, &order.user_id, now);
        let rarity = metadata.rarity;
        let batch = MintBatch::new(
            order,
            metadata,
            amount,
            payment_status,
            BsonDateTime::from_chrono(now),
        );
        let emblem_id = batch.emblem.id.clone();

        match self.ledger.commit_mint(&batch).await? {
            MintOutcome::Minted => {
                info!(
                    order_id = %order,
                    emblem_id = %emblem_id,
                    emblem_type = %order.emblem_type,
                    rarity = rarity.as_str(),
                    amount = %amount,
                    "Emblem minted"
                );
                let _detached = spawn_delivery(
                    Arc::clone(&self.notifier),
                    MintNotice::from_emblem(&batch.emblem),
                );
                Ok(CallbackOutcome::Minted {
                    emblem_id,
                    emblem_type: order.emblem_type,
                })
            }
            MintOutcome::AlreadyRecorded => {
                warn!(
                    order_id = %order,
                    emblem_id = %emblem_id,
                    "Duplicate callback for an order that is already minted"
                );
                Ok(CallbackOutcome::Duplicate {
                    emblem_id,
                    emblem_type: order.emblem_type,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::services::notifier::LogNotifier;

    fn service(ledger: Arc<MemoryLedger>) -> MintService {
        MintService::new(ledger, Arc::new(LogNotifier))
    }

    #[test]
    fn test_confirmed_statuses() {
        let cb = |status: &str| PaymentCallback {
            order_id: String::new(),
            status: status.to_string(),
            amount: serde_json::Number::from(0),
            signature: None,
        };
        assert!(cb("paid").is_confirmed());
        assert!(cb("confirmed").is_confirmed());
        assert!(!cb("pending").is_confirmed());
        assert!(!cb("PAID").is_confirmed());
    }

    #[tokio::test]
    async fn test_status_checked_before_order_id() {
        let ledger = Arc::new(MemoryLedger::with_stock(3));
        let svc = service(Arc::clone(&ledger));

        let body = br#"{"orderId":"garbage","status":"pending","amount":100}"#;
        let outcome = svc.handle_callback(body).await.unwrap();
        assert_eq!(
            outcome,
            CallbackOutcome::NotConfirmed {
                status: "pending".into()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let svc = service(Arc::new(MemoryLedger::with_stock(3)));
        let err = svc.handle_callback(b"{not json").await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidPayload(_)));

        let err = svc
            .handle_callback(br#"{"status":"paid","amount":1}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("orderId"));
    }

    #[tokio::test]
    async fn test_fractional_amount_rejected_without_writes() {
        let ledger = Arc::new(MemoryLedger::with_stock(3));
        let svc = service(Arc::clone(&ledger));

        let body = br#"{"orderId":"emblem_corbul_mistic_u1_1700000000000","status":"paid","amount":10.5}"#;
        let err = svc.handle_callback(body).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidAmount(_)));
        assert_eq!(ledger.counts().await.emblems, 0);
    }

    #[tokio::test]
    async fn test_unsigned_callback_rejected_when_key_configured() {
        use ed25519_dalek::SigningKey;

        let key = SigningKey::from_bytes(&[9u8; 32]);
        let ledger = Arc::new(MemoryLedger::with_stock(3));
        let svc = service(Arc::clone(&ledger))
            .with_verifier(CallbackVerifier::new(key.verifying_key()));

        let body = br#"{"orderId":"emblem_corbul_mistic_u1_1700000000000","status":"paid","amount":100}"#;
        let err = svc.handle_callback(body).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignature(_)));
        assert_eq!(ledger.counts().await.transactions, 0);
    }
}
