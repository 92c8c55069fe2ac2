//! Emblem metadata generation
//!
//! The seed combines the trailing hex digits of the user id with the mint
//! time in milliseconds. Rarity comes from `seed % 100`; each attribute reads
//! a different byte window of the seed.
//!
//! The clock is passed in by the caller. A retried callback therefore rolls
//! new metadata unless the caller reuses the original instant; duplicate
//! deliveries are stopped by the ledger before metadata is ever persisted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::catalog;
use super::kind::{EmblemType, Rarity};

/// Number of trailing user id characters folded into the seed
const USER_HEX_WINDOW: usize = 8;

/// Attribute scores, each in `[50, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: u8,
    pub wisdom: u8,
    pub mysticism: u8,
    pub wellness: u8,
}

impl Attributes {
    pub const MIN: u8 = 50;
    pub const MAX: u8 = 100;

    pub fn from_seed(seed: u64) -> Self {
        let score = |shift: u32| Self::MIN + ((seed >> shift) % 51) as u8;
        Self {
            strength: score(0),
            wisdom: score(8),
            mysticism: score(16),
            wellness: score(24),
        }
    }

    pub fn as_array(&self) -> [u8; 4] {
        [self.strength, self.wisdom, self.mysticism, self.wellness]
    }
}

/// Metadata embedded in every emblem document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmblemMetadata {
    pub rarity: Rarity,
    pub attributes: Attributes,
    pub traits: Vec<String>,
    pub image: String,
    pub description: String,
    pub generation: u32,
    /// ISO-8601 mint time
    pub created_at: String,
}

/// Seed derived from a user id and a mint instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataSeed(u64);

impl MetadataSeed {
    pub fn new(user_id: &str, now_millis: i64) -> Self {
        let user_part = user_hex_value(user_id);
        Self(user_part.wrapping_add(now_millis.max(0) as u64))
    }

    pub fn from_raw(seed: u64) -> Self {
        Self(seed)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn roll(&self) -> u8 {
        (self.0 % 100) as u8
    }

    pub fn rarity(&self) -> Rarity {
        Rarity::from_roll(self.roll())
    }

    pub fn attributes(&self) -> Attributes {
        Attributes::from_seed(self.0)
    }
}

/// Parse the trailing characters of a user id as hexadecimal.
///
/// Parsing is permissive: the longest valid hex prefix of the window is used,
/// and a window with no hex prefix contributes nothing to the seed.
pub fn user_hex_value(user_id: &str) -> u64 {
    let chars: Vec<char> = user_id.chars().collect();
    let start = chars.len().saturating_sub(USER_HEX_WINDOW);
    let window: String = chars[start..].iter().collect();

    let digits: String = window.chars().take_while(|c| c.is_ascii_hexdigit()).collect();
    if digits.len() < window.len() {
        warn!(
            user_id = %user_id,
            parsed = %digits,
            "User id tail is not fully hexadecimal, using parsed prefix for seed"
        );
    }
    if digits.is_empty() {
        return 0;
    }
    // At most 8 hex digits, always fits
    u64::from_str_radix(&digits, 16).unwrap_or(0)
}

/// Generate metadata for a new emblem minted at `now`
pub fn generate(emblem_type: EmblemType, user_id: &str, now: DateTime<Utc>) -> EmblemMetadata {
    let seed = MetadataSeed::new(user_id, now.timestamp_millis());
    generate_from_seed(emblem_type, seed, now)
}

pub fn generate_from_seed(
    emblem_type: EmblemType,
    seed: MetadataSeed,
    now: DateTime<Utc>,
) -> EmblemMetadata {
    let rarity = seed.rarity();
    let entry = catalog::entry_for(emblem_type);

    let traits = entry
        .base_traits
        .iter()
        .chain(catalog::tier_bonus_traits(rarity))
        .map(|t| t.to_string())
        .collect();

    EmblemMetadata {
        rarity,
        attributes: seed.attributes(),
        traits,
        image: catalog::image_path(emblem_type.slug()),
        description: entry.description.to_string(),
        generation: 1,
        created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
