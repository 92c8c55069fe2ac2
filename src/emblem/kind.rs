//! Emblem enumerations: types, rarity tiers, membership tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of emblem types sold in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmblemType {
    LupulIntelepta,
    CorbulMistic,
    GardianulWellness,
    CautatorulLumina,
}

impl EmblemType {
    pub const ALL: [EmblemType; 4] = [
        EmblemType::LupulIntelepta,
        EmblemType::CorbulMistic,
        EmblemType::GardianulWellness,
        EmblemType::CautatorulLumina,
    ];

    /// Slug used in order ids, document ids and asset paths
    pub fn slug(&self) -> &'static str {
        match self {
            EmblemType::LupulIntelepta => "lupul_intelepta",
            EmblemType::CorbulMistic => "corbul_mistic",
            EmblemType::GardianulWellness => "gardianul_wellness",
            EmblemType::CautatorulLumina => "cautatorul_lumina",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.slug() == slug)
    }
}

impl fmt::Display for EmblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Rarity tier assigned at mint time, ordered from most to least common
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Map a roll in `0..100` onto the 70/20/8/2 partition
    pub fn from_roll(roll: u8) -> Self {
        match roll {
            98.. => Rarity::Legendary,
            90..=97 => Rarity::Epic,
            70..=89 => Rarity::Rare,
            _ => Rarity::Common,
        }
    }

    /// Number of tier bonus traits granted (cumulative)
    pub fn bonus_trait_count(&self) -> usize {
        match self {
            Rarity::Common => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

/// Membership tier of an emblem; promotion happens outside the mint workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmblemTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// How the emblem is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Plain document, no chain involvement
    #[default]
    Digital,
    Blockchain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_boundaries() {
        assert_eq!(Rarity::from_roll(0), Rarity::Common);
        assert_eq!(Rarity::from_roll(69), Rarity::Common);
        assert_eq!(Rarity::from_roll(70), Rarity::Rare);
        assert_eq!(Rarity::from_roll(89), Rarity::Rare);
        assert_eq!(Rarity::from_roll(90), Rarity::Epic);
        assert_eq!(Rarity::from_roll(97), Rarity::Epic);
        assert_eq!(Rarity::from_roll(98), Rarity::Legendary);
        assert_eq!(Rarity::from_roll(99), Rarity::Legendary);
    }

    #[test]
    fn test_rarity_partition_sums_to_100() {
        let mut counts = [0usize; 4];
        for roll in 0..100u8 {
            let idx = match Rarity::from_roll(roll) {
                Rarity::Common => 0,
                Rarity::Rare => 1,
                Rarity::Epic => 2,
                Rarity::Legendary => 3,
            };
            counts[idx] += 1;
        }
        assert_eq!(counts, [70, 20, 8, 2]);
    }

    #[test]
    fn test_slug_roundtrip() {
        for t in EmblemType::ALL {
            assert_eq!(EmblemType::from_slug(t.slug()), Some(t));
        }
        assert_eq!(EmblemType::from_slug("lupul"), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&EmblemType::GardianulWellness).unwrap();
        assert_eq!(json, "\"gardianul_wellness\"");
        let json = serde_json::to_string(&Rarity::Legendary).unwrap();
        assert_eq!(json, "\"legendary\"");
    }
}
