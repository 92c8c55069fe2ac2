//! Document schemas for the emblem collections
//!
//! Field names are camelCase because the same documents are read by the web
//! shop. Money fields hold lei (`purchasePrice: 150`), see [`crate::emblem::Money`].

mod collection_stock;
mod emblem;
mod transaction;
mod user_status;

pub use collection_stock::{EmblemCollectionDoc, COLLECTION_STOCK_COLLECTION};
pub use emblem::{EmblemDoc, EMBLEM_COLLECTION};
pub use transaction::{EmblemTransactionDoc, TransactionKind, TRANSACTION_COLLECTION};
pub use user_status::{EngagementCounters, UserEmblemStatusDoc, USER_STATUS_COLLECTION};
