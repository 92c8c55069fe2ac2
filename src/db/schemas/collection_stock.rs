//! Emblem collection stock counters
//!
//! One document per emblem type. Created by the shop administrators before
//! sales open; the mint workflow only ever adjusts it.

use bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::emblem::{EmblemType, Money};

/// Collection name for stock documents
pub const COLLECTION_STOCK_COLLECTION: &str = "emblemCollections";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmblemCollectionDoc {
    #[serde(rename = "_id")]
    pub emblem_type: EmblemType,

    pub available: i64,

    pub sold: i64,

    pub last_sale: Option<DateTime>,

    pub total_revenue: Money,
}

impl EmblemCollectionDoc {
    pub fn new(emblem_type: EmblemType, available: i64) -> Self {
        Self {
            emblem_type,
            available,
            sold: 0,
            last_sale: None,
            total_revenue: Money::ZERO,
        }
    }

    /// Update document applied for one sale
    pub fn sale_update(amount: Money, at: DateTime) -> Document {
        doc! {
            "$inc": {
                "available": -1_i64,
                "sold": 1_i64,
                "totalRevenue": amount.as_ron_f64(),
            },
            "$set": { "lastSale": at },
        }
    }

    /// In-place equivalent of [`Self::sale_update`]
    pub fn record_sale(&mut self, amount: Money, at: DateTime) {
        self.available -= 1;
        self.sold += 1;
        self.last_sale = Some(at);
        self.total_revenue = Money::from_bani(self.total_revenue.bani() + amount.bani());
    }

    /// Units ever stocked; unchanged by sales
    pub fn total_units(&self) -> i64 {
        self.available + self.sold
    }
}

impl IntoIndexes for EmblemCollectionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![]
    }
}
