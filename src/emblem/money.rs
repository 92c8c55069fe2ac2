//! Money in Romanian lei, held as integer bani
//!
//! Arithmetic happens on bani. Stored documents carry lei as a number with at
//! most two decimals (`150`, `19.99`), which is what the shop front-end reads.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::types::{GatewayError, Result};

pub const CURRENCY: &str = "RON";

const BANI_PER_RON: i64 = 100;

/// Largest bani count that survives a round trip through `f64` lei
const MAX_EXACT_BANI: f64 = 9_007_199_254_740_992.0;

/// An amount of money stored as a whole number of bani
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_bani(bani: i64) -> Self {
        Self(bani)
    }

    pub fn from_ron(ron: i64) -> Self {
        Self(ron * BANI_PER_RON)
    }

    /// Amount from a callback's JSON `amount` field (minor units).
    ///
    /// Accepts non-negative integral numbers only, including floats with no
    /// fractional part such as `15000.0`.
    pub fn from_json_amount(amount: &serde_json::Number) -> Result<Self> {
        if let Some(bani) = amount.as_i64() {
            if bani < 0 {
                return Err(GatewayError::InvalidAmount(format!("{} is negative", amount)));
            }
            if bani as f64 > MAX_EXACT_BANI {
                return Err(GatewayError::InvalidAmount(format!("{} is too large", amount)));
            }
            return Ok(Self(bani));
        }
        if amount.as_u64().is_some() {
            return Err(GatewayError::InvalidAmount(format!("{} is too large", amount)));
        }
        match amount.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= MAX_EXACT_BANI => {
                Ok(Self(f as i64))
            }
            _ => Err(GatewayError::InvalidAmount(format!(
                "{} is not a whole number of bani",
                amount
            ))),
        }
    }

    /// Amount from a stored lei value, rounded to the nearest ban
    pub fn from_ron_decimal(ron: f64) -> Option<Self> {
        let bani = (ron * BANI_PER_RON as f64).round();
        if !bani.is_finite() || bani.abs() > MAX_EXACT_BANI {
            return None;
        }
        Some(Self(bani as i64))
    }

    pub fn bani(&self) -> i64 {
        self.0
    }

    /// Whole lei part
    pub fn ron(&self) -> i64 {
        self.0 / BANI_PER_RON
    }

    /// Value in lei as written to documents and `$inc` updates
    pub fn as_ron_f64(&self) -> f64 {
        self.0 as f64 / BANI_PER_RON as f64
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_ron_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let ron = f64::deserialize(deserializer)?;
        Money::from_ron_decimal(ron)
            .ok_or_else(|| de::Error::custom(format!("{} is not a valid lei amount", ron)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            abs / BANI_PER_RON as u64,
            abs % BANI_PER_RON as u64,
            CURRENCY
        )
    }
}
