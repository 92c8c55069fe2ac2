//! Emblem domain: order ids, money, catalog and metadata generation

pub mod catalog;
pub mod kind;
pub mod metadata;
pub mod money;
pub mod order;

pub use kind::{EmblemTier, EmblemType, Rarity, Representation};
pub use metadata::{generate as generate_metadata, Attributes, EmblemMetadata, MetadataSeed};
pub use money::{Money, CURRENCY};
pub use order::OrderRef;
