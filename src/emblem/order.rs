//! Payment order ids
//!
//! Orders for emblems are created by the shop as
//! `emblem_{emblemType}_{userId}_{timestamp}`. Emblem type slugs contain
//! underscores themselves, so the type is matched against the known slugs
//! and the timestamp is always the final segment; the user id is what lies
//! between them.

use std::fmt;

use super::kind::EmblemType;
use crate::types::{GatewayError, Result};

const ORDER_PREFIX: &str = "emblem";
const MIN_SEGMENTS: usize = 4;

/// A parsed emblem order id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRef {
    raw: String,
    pub emblem_type: EmblemType,
    pub user_id: String,
    /// Order creation time in milliseconds, as sent by the shop
    pub timestamp: String,
    pub timestamp_millis: i64,
}

impl OrderRef {
    pub fn parse(order_id: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            GatewayError::InvalidOrderId(format!(
                "expected emblem_{{type}}_{{userId}}_{{timestamp}}, got '{}' ({})",
                order_id, reason
            ))
        };

        let segments: Vec<&str> = order_id.split('_').collect();
        if segments.len() < MIN_SEGMENTS {
            return Err(invalid("too few segments"));
        }
        if segments[0] != ORDER_PREFIX {
            return Err(invalid("missing emblem prefix"));
        }

        let rest = &order_id[ORDER_PREFIX.len() + 1..];
        let emblem_type = EmblemType::ALL
            .into_iter()
            .find(|t| {
                rest.strip_prefix(t.slug())
                    .is_some_and(|tail| tail.starts_with('_'))
            })
            .ok_or_else(|| invalid("unknown emblem type"))?;

        let tail = &rest[emblem_type.slug().len() + 1..];
        let (user_id, timestamp) = tail
            .rsplit_once('_')
            .ok_or_else(|| invalid("missing user id or timestamp"))?;

        if user_id.is_empty() {
            return Err(invalid("empty user id"));
        }
        let timestamp_millis = timestamp
            .parse::<i64>()
            .ok()
            .filter(|ms| *ms >= 0)
            .ok_or_else(|| invalid("timestamp is not a millisecond count"))?;

        Ok(Self {
            raw: order_id.to_string(),
            emblem_type,
            user_id: user_id.to_string(),
            timestamp: timestamp.to_string(),
            timestamp_millis,
        })
    }

    /// The order id exactly as received
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Deterministic id of the emblem minted for this order
    pub fn emblem_id(&self) -> String {
        format!("emblem_{}_{}", self.user_id, self.timestamp)
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_order() {
        let order = OrderRef::parse("emblem_lupul_intelepta_user123_1700000000000").unwrap();
        assert_eq!(order.emblem_type, EmblemType::LupulIntelepta);
        assert_eq!(order.user_id, "user123");
        assert_eq!(order.timestamp, "1700000000000");
        assert_eq!(order.timestamp_millis, 1_700_000_000_000);
        assert_eq!(order.emblem_id(), "emblem_user123_1700000000000");
        assert_eq!(order.as_str(), "emblem_lupul_intelepta_user123_1700000000000");
    }

    #[test]
    fn test_user_id_may_contain_underscores() {
        let order = OrderRef::parse("emblem_corbul_mistic_ana_maria_42").unwrap();
        assert_eq!(order.emblem_type, EmblemType::CorbulMistic);
        assert_eq!(order.user_id, "ana_maria");
        assert_eq!(order.emblem_id(), "emblem_ana_maria_42");
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        let err = OrderRef::parse("notemblem_x_y_z").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidOrderId(_)));
        assert!(err.to_string().contains("Invalid orderId format"));
    }

    #[test]
    fn test_rejects_too_few_segments() {
        assert!(OrderRef::parse("emblem_x_y").is_err());
        assert!(OrderRef::parse("").is_err());
    }

    #[test]
    fn test_rejects_unknown_type() {
        let err = OrderRef::parse("emblem_dragonul_vechi_user1_1700000000000").unwrap_err();
        assert!(err.to_string().contains("unknown emblem type"));
    }

    #[test]
    fn test_rejects_bad_tail() {
        // type matched but nothing left for user id
        assert!(OrderRef::parse("emblem_gardianul_wellness__1700000000000").is_err());
        // non-numeric timestamp
        assert!(OrderRef::parse("emblem_gardianul_wellness_u1_soon").is_err());
        // type with no tail at all
        assert!(OrderRef::parse("emblem_cautatorul_lumina_x").is_err());
    }
}
