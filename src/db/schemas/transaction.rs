//! Emblem transaction records
//!
//! Keyed by the payment gateway's order id, which makes the order id the
//! idempotency boundary for callbacks.

use bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::emblem::{EmblemType, Money, OrderRef, CURRENCY};

/// Collection name for emblem transactions
pub const TRANSACTION_COLLECTION: &str = "emblemTransactions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Mint,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmblemTransactionDoc {
    /// Gateway order id
    #[serde(rename = "_id")]
    pub order_id: String,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    pub user_id: String,

    pub emblem_id: String,

    pub emblem_type: EmblemType,

    pub amount: Money,

    pub currency: String,

    pub payment_status: String,

    pub created_at: DateTime,
}

impl EmblemTransactionDoc {
    pub fn mint(order: &OrderRef, amount: Money, payment_status: &str, at: DateTime) -> Self {
        Self {
            order_id: order.as_str().to_string(),
            kind: TransactionKind::Mint,
            user_id: order.user_id.clone(),
            emblem_id: order.emblem_id(),
            emblem_type: order.emblem_type,
            amount,
            currency: CURRENCY.to_string(),
            payment_status: payment_status.to_string(),
            created_at: at,
        }
    }
}

impl IntoIndexes for EmblemTransactionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "userId": 1, "createdAt": -1 },
            Some(
                IndexOptions::builder()
                    .name("user_created_index".to_string())
                    .build(),
            ),
        )]
    }
}
