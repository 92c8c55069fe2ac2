//! Emblem document schema
//!
//! One document per mint event, keyed `emblem_{userId}_{timestamp}`.

use bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::emblem::{
    catalog, EmblemMetadata, EmblemTier, EmblemType, Money, OrderRef, Representation,
};

/// Collection name for emblems
pub const EMBLEM_COLLECTION: &str = "emblems";

/// Emblem document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmblemDoc {
    /// `emblem_{userId}_{timestamp}`
    #[serde(rename = "_id")]
    pub id: String,

    pub emblem_type: EmblemType,

    pub owner_id: String,

    pub minted_at: DateTime,

    /// Membership tier, always bronze at mint
    pub tier: EmblemTier,

    pub engagement_count: i64,

    pub benefits: Vec<String>,

    pub metadata: EmblemMetadata,

    /// Emblems cannot be traded after minting
    pub transferable: bool,

    pub purchase_price: Money,

    pub current_value: Money,

    /// Gateway order id that paid for this emblem
    pub payment_id: String,

    pub payment_status: String,

    pub representation: Representation,

    pub chain_id: Option<String>,

    pub token_id: Option<String>,
}

impl EmblemDoc {
    /// Build the emblem minted for a confirmed order
    pub fn mint(
        order: &OrderRef,
        metadata: EmblemMetadata,
        amount: Money,
        payment_status: &str,
        minted_at: DateTime,
    ) -> Self {
        Self {
            id: order.emblem_id(),
            emblem_type: order.emblem_type,
            owner_id: order.user_id.clone(),
            minted_at,
            tier: EmblemTier::Bronze,
            engagement_count: 0,
            benefits: catalog::benefits(order.emblem_type),
            metadata,
            transferable: false,
            purchase_price: amount,
            current_value: amount,
            payment_id: order.as_str().to_string(),
            payment_status: payment_status.to_string(),
            representation: Representation::Digital,
            chain_id: None,
            token_id: None,
        }
    }
}

impl IntoIndexes for EmblemDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Listing a user's emblems
            (
                doc! { "ownerId": 1 },
                Some(
                    IndexOptions::builder()
                        .name("owner_id_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "paymentId": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("payment_id_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mint_defaults() {
        let order = OrderRef::parse("emblem_corbul_mistic_u42_1700000000000").unwrap();
        let now = chrono::Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();
        let meta = crate::emblem::generate_metadata(order.emblem_type, &order.user_id, now);
        let doc = EmblemDoc::mint(
            &order,
            meta,
            Money::from_bani(9900),
            "paid",
            DateTime::from_chrono(now),
        );

        assert_eq!(doc.id, "emblem_u42_1700000000000");
        assert_eq!(doc.tier, EmblemTier::Bronze);
        assert_eq!(doc.engagement_count, 0);
        assert!(!doc.transferable);
        assert_eq!(doc.purchase_price, doc.current_value);
        assert_eq!(doc.representation, Representation::Digital);
        assert!(doc.chain_id.is_none() && doc.token_id.is_none());
        assert!(!doc.benefits.is_empty());
    }

    #[test]
    fn test_bson_field_names() {
        let order = OrderRef::parse("emblem_corbul_mistic_u42_1700000000000").unwrap();
        let now = chrono::Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();
        let meta = crate::emblem::generate_metadata(order.emblem_type, &order.user_id, now);
        let doc = EmblemDoc::mint(&order, meta, Money::from_bani(15000), "paid", DateTime::now());

        let bson = bson::to_document(&doc).unwrap();
        assert_eq!(bson.get_str("_id").unwrap(), "emblem_u42_1700000000000");
        assert_eq!(bson.get_str("emblemType").unwrap(), "corbul_mistic");
        assert_eq!(bson.get_f64("purchasePrice").unwrap(), 150.0);
        assert_eq!(bson.get_f64("currentValue").unwrap(), 150.0);
        assert!(!bson.contains_key("purchasePriceBani"));
        assert_eq!(bson.get_str("tier").unwrap(), "bronze");
        assert_eq!(bson.get_str("representation").unwrap(), "digital");
        assert!(bson.contains_key("chainId"));
    }
}
