//! Per-user emblem status
//!
//! A single document per user pointing at their most recently minted emblem.
//! Each mint replaces it wholesale, so a user holding two emblem types only
//! sees the latest here; the emblem documents themselves are kept.

use bson::{DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::emblem::{EmblemType, Money};

/// Collection name for user emblem status
pub const USER_STATUS_COLLECTION: &str = "userEmblemStatus";

const INITIAL_COMMUNITY_RANK: &str = "novice";

/// Engagement counters tracked by the community features
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngagementCounters {
    pub sessions_attended: i64,
    pub products_purchased: i64,
    pub reviews_written: i64,
    pub streak_days: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserEmblemStatusDoc {
    #[serde(rename = "_id")]
    pub user_id: String,

    pub has_emblem: bool,

    pub emblem_id: String,

    pub emblem_type: EmblemType,

    pub purchase_date: DateTime,

    pub engagement: EngagementCounters,

    pub community_rank: String,

    pub emblem_value: Money,
}

impl UserEmblemStatusDoc {
    pub fn new(
        user_id: String,
        emblem_id: String,
        emblem_type: EmblemType,
        value: Money,
        purchase_date: DateTime,
    ) -> Self {
        Self {
            user_id,
            has_emblem: true,
            emblem_id,
            emblem_type,
            purchase_date,
            engagement: EngagementCounters::default(),
            community_rank: INITIAL_COMMUNITY_RANK.to_string(),
            emblem_value: value,
        }
    }
}

impl IntoIndexes for UserEmblemStatusDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![]
    }
}
