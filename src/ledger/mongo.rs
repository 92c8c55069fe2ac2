//! MongoDB-backed ledger
//!
//! The four writes run inside one multi-document transaction, which needs a
//! replica set or sharded deployment.

use bson::doc;
use mongodb::ClientSession;
use tracing::{debug, warn};

use super::{EmblemLedger, MintBatch, MintOutcome};
use crate::db::schemas::{
    EmblemCollectionDoc, EmblemDoc, EmblemTransactionDoc, UserEmblemStatusDoc,
    COLLECTION_STOCK_COLLECTION, EMBLEM_COLLECTION, TRANSACTION_COLLECTION,
    USER_STATUS_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::emblem::EmblemType;
use crate::types::{GatewayError, Result};

pub struct MongoLedger {
    mongo: MongoClient,
    emblems: MongoCollection<EmblemDoc>,
    statuses: MongoCollection<UserEmblemStatusDoc>,
    stock: MongoCollection<EmblemCollectionDoc>,
    transactions: MongoCollection<EmblemTransactionDoc>,
}

impl MongoLedger {
    /// Open the emblem collections and apply their indexes
    pub async fn new(mongo: MongoClient) -> Result<Self> {
        let emblems = mongo.collection(EMBLEM_COLLECTION).await?;
        let statuses = mongo.collection(USER_STATUS_COLLECTION).await?;
        let stock = mongo.collection(COLLECTION_STOCK_COLLECTION).await?;
        let transactions = mongo.collection(TRANSACTION_COLLECTION).await?;

        Ok(Self {
            mongo,
            emblems,
            statuses,
            stock,
            transactions,
        })
    }

    /// Writes of one mint, all bound to `session`
    async fn apply(&self, session: &mut ClientSession, batch: &MintBatch) -> Result<MintOutcome> {
        let existing = self
            .transactions
            .inner()
            .find_one(doc! { "_id": batch.order_id() })
            .session(&mut *session)
            .await?;
        if existing.is_some() {
            return Ok(MintOutcome::AlreadyRecorded);
        }

        self.emblems
            .inner()
            .replace_one(doc! { "_id": batch.emblem.id.as_str() }, &batch.emblem)
            .upsert(true)
            .session(&mut *session)
            .await?;

        self.statuses
            .inner()
            .replace_one(doc! { "_id": batch.status.user_id.as_str() }, &batch.status)
            .upsert(true)
            .session(&mut *session)
            .await?;

        let stock = self
            .stock
            .inner()
            .update_one(
                doc! { "_id": batch.emblem_type.slug() },
                EmblemCollectionDoc::sale_update(batch.amount, batch.at),
            )
            .session(&mut *session)
            .await?;
        if stock.matched_count == 0 {
            return Err(GatewayError::CollectionMissing(
                batch.emblem_type.slug().to_string(),
            ));
        }

        self.transactions
            .inner()
            .insert_one(&batch.transaction)
            .session(&mut *session)
            .await?;

        Ok(MintOutcome::Minted)
    }
}

async fn abort_quietly(session: &mut ClientSession, order_id: &str) {
    if let Err(e) = session.abort_transaction().await {
        warn!(order_id = %order_id, error = %e, "Failed to abort mint transaction");
    }
}

#[async_trait::async_trait]
impl EmblemLedger for MongoLedger {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<()> {
        self.mongo.ping().await
    }

    async fn commit_mint(&self, batch: &MintBatch) -> Result<MintOutcome> {
        let mut session = self.mongo.start_session().await?;
        session
            .start_transaction()
            .await
            .map_err(|e| GatewayError::Database(format!("Failed to start transaction: {}", e)))?;

        match self.apply(&mut session, batch).await {
            Ok(MintOutcome::Minted) => {
                session.commit_transaction().await.map_err(|e| {
                    GatewayError::Database(format!("Failed to commit mint: {}", e))
                })?;
                debug!(order_id = %batch.order_id(), "Mint transaction committed");
                Ok(MintOutcome::Minted)
            }
            Ok(MintOutcome::AlreadyRecorded) => {
                abort_quietly(&mut session, batch.order_id()).await;
                Ok(MintOutcome::AlreadyRecorded)
            }
            Err(e) => {
                abort_quietly(&mut session, batch.order_id()).await;
                Err(e)
            }
        }
    }

    async fn emblem(&self, emblem_id: &str) -> Result<Option<EmblemDoc>> {
        self.emblems.find_by_id(emblem_id).await
    }

    async fn user_status(&self, user_id: &str) -> Result<Option<UserEmblemStatusDoc>> {
        self.statuses.find_by_id(user_id).await
    }

    async fn collection_stock(
        &self,
        emblem_type: EmblemType,
    ) -> Result<Option<EmblemCollectionDoc>> {
        self.stock.find_by_id(emblem_type.slug()).await
    }

    async fn transaction(&self, order_id: &str) -> Result<Option<EmblemTransactionDoc>> {
        self.transactions.find_by_id(order_id).await
    }
}
