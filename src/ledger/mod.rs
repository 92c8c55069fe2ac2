//! Emblem ledger
//!
//! A mint touches four collections: the emblem itself, the user's status
//! document, the per-type stock counters and the transaction record. The
//! [`EmblemLedger`] trait commits those writes as one unit and lets the
//! gateway swap MongoDB for the in-memory store in dev mode and tests.
//!
//! ## Invariants
//!
//! - Nothing is written unless all four writes succeed.
//! - A transaction record with the same order id turns the commit into a
//!   no-op ([`MintOutcome::AlreadyRecorded`]).
//! - Stock counters move by atomic increments only and are never upserted;
//!   a missing stock document fails the commit.

mod memory;
mod mongo;

pub use memory::{LedgerCounts, MemoryLedger};
pub use mongo::MongoLedger;

use bson::DateTime;

use crate::db::schemas::{
    EmblemCollectionDoc, EmblemDoc, EmblemTransactionDoc, UserEmblemStatusDoc,
};
use crate::emblem::{EmblemMetadata, EmblemType, Money, OrderRef};
use crate::types::Result;

/// The documents written for one confirmed payment
#[derive(Debug, Clone)]
pub struct MintBatch {
    pub emblem: EmblemDoc,
    pub status: UserEmblemStatusDoc,
    pub transaction: EmblemTransactionDoc,
    pub emblem_type: EmblemType,
    pub amount: Money,
    pub at: DateTime,
}

impl MintBatch {
    pub fn new(
        order: &OrderRef,
        metadata: EmblemMetadata,
        amount: Money,
        payment_status: &str,
        at: DateTime,
    ) -> Self {
        let emblem = EmblemDoc::mint(order, metadata, amount, payment_status, at);
        let status = UserEmblemStatusDoc::new(
            order.user_id.clone(),
            emblem.id.clone(),
            order.emblem_type,
            amount,
            at,
        );
        let transaction = EmblemTransactionDoc::mint(order, amount, payment_status, at);

        Self {
            emblem,
            status,
            transaction,
            emblem_type: order.emblem_type,
            amount,
            at,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.transaction.order_id
    }
}

/// Result of committing a mint batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintOutcome {
    /// All four documents were written
    Minted,
    /// A transaction for this order id already exists; nothing was written
    AlreadyRecorded,
}

/// Storage backend for emblem mints
#[async_trait::async_trait]
pub trait EmblemLedger: Send + Sync {
    /// Short backend name for health output
    fn backend(&self) -> &'static str;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<()>;

    /// Apply all writes of a mint atomically
    async fn commit_mint(&self, batch: &MintBatch) -> Result<MintOutcome>;

    async fn emblem(&self, emblem_id: &str) -> Result<Option<EmblemDoc>>;

    async fn user_status(&self, user_id: &str) -> Result<Option<UserEmblemStatusDoc>>;

    async fn collection_stock(&self, emblem_type: EmblemType)
        -> Result<Option<EmblemCollectionDoc>>;

    async fn transaction(&self, order_id: &str) -> Result<Option<EmblemTransactionDoc>>;
}
