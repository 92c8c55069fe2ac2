//! In-memory ledger for dev mode and tests
//!
//! All four maps sit behind one lock, so a commit is checked completely before
//! anything is mutated.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{EmblemLedger, MintBatch, MintOutcome};
use crate::db::schemas::{
    EmblemCollectionDoc, EmblemDoc, EmblemTransactionDoc, UserEmblemStatusDoc,
};
use crate::emblem::EmblemType;
use crate::types::{GatewayError, Result};

#[derive(Default)]
struct MemoryState {
    emblems: HashMap<String, EmblemDoc>,
    statuses: HashMap<String, UserEmblemStatusDoc>,
    stock: HashMap<EmblemType, EmblemCollectionDoc>,
    transactions: HashMap<String, EmblemTransactionDoc>,
}

/// Document counts, used to assert that rejected callbacks wrote nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerCounts {
    pub emblems: usize,
    pub statuses: usize,
    pub transactions: usize,
}

#[derive(Default)]
pub struct MemoryLedger {
    state: RwLock<MemoryState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with `available` units stocked for every emblem type
    pub fn with_stock(available: i64) -> Self {
        let state = MemoryState {
            stock: EmblemType::ALL
                .into_iter()
                .map(|t| (t, EmblemCollectionDoc::new(t, available)))
                .collect(),
            ..MemoryState::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Create or replace a stock document
    pub async fn put_stock(&self, stock: EmblemCollectionDoc) {
        self.state.write().await.stock.insert(stock.emblem_type, stock);
    }

    pub async fn counts(&self) -> LedgerCounts {
        let state = self.state.read().await;
        LedgerCounts {
            emblems: state.emblems.len(),
            statuses: state.statuses.len(),
            transactions: state.transactions.len(),
        }
    }
}

#[async_trait::async_trait]
impl EmblemLedger for MemoryLedger {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn commit_mint(&self, batch: &MintBatch) -> Result<MintOutcome> {
        let mut state = self.state.write().await;

        if state.transactions.contains_key(batch.order_id()) {
            return Ok(MintOutcome::AlreadyRecorded);
        }
        if !state.stock.contains_key(&batch.emblem_type) {
            return Err(GatewayError::CollectionMissing(
                batch.emblem_type.slug().to_string(),
            ));
        }

        state
            .emblems
            .insert(batch.emblem.id.clone(), batch.emblem.clone());
        state
            .statuses
            .insert(batch.status.user_id.clone(), batch.status.clone());
        if let Some(stock) = state.stock.get_mut(&batch.emblem_type) {
            stock.record_sale(batch.amount, batch.at);
        }
        state
            .transactions
            .insert(batch.transaction.order_id.clone(), batch.transaction.clone());

        debug!(order_id = %batch.order_id(), "Mint recorded in memory ledger");
        Ok(MintOutcome::Minted)
    }

    async fn emblem(&self, emblem_id: &str) -> Result<Option<EmblemDoc>> {
        Ok(self.state.read().await.emblems.get(emblem_id).cloned())
    }

    async fn user_status(&self, user_id: &str) -> Result<Option<UserEmblemStatusDoc>> {
        Ok(self.state.read().await.statuses.get(user_id).cloned())
    }

    async fn collection_stock(
        &self,
        emblem_type: EmblemType,
    ) -> Result<Option<EmblemCollectionDoc>> {
        Ok(self.state.read().await.stock.get(&emblem_type).cloned())
    }

    async fn transaction(&self, order_id: &str) -> Result<Option<EmblemTransactionDoc>> {
        Ok(self.state.read().await.transactions.get(order_id).cloned())
    }
}
