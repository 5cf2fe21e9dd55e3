//! Trade record as stored in the journal

use crate::{DbError, DbResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Direction of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    /// Lenient parse: accepts long/short and buy/sell in any case
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Some(Self::Long),
            "short" | "sell" => Some(Self::Short),
            _ => None,
        }
    }
}

/// A single position belonging to a user.
///
/// Every column except `user_id` is optional because journals are filled in
/// by hand and open positions have no exit yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Free-form strategy label ("breakout", "scalp", ...)
    #[serde(default)]
    pub trade_type: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub entry_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub exit_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub quantity: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub entry_date: Option<String>,
    #[serde(default)]
    pub exit_date: Option<String>,
}

impl TradeRecord {
    pub fn side(&self) -> Option<TradeDirection> {
        self.direction.as_deref().and_then(TradeDirection::parse)
    }

    /// Stored P&L, or the P&L implied by entry/exit/quantity.
    /// Open positions without a stored value count as zero.
    pub fn realized_pnl(&self) -> DbResult<Decimal> {
        if let Some(pnl) = self.pnl {
            return Ok(pnl);
        }

        let (entry, exit, qty) = match (self.entry_price, self.exit_price, self.quantity) {
            (Some(entry), Some(exit), Some(qty)) => (entry, exit, qty),
            _ => return Ok(Decimal::ZERO),
        };
        let move_per_unit = match self.side() {
            Some(TradeDirection::Short) => entry.checked_sub(exit),
            _ => exit.checked_sub(entry),
        };
        move_per_unit
            .and_then(|m| m.checked_mul(qty))
            .ok_or_else(|| {
                DbError::OutOfRange(format!(
                    "P&L of trade {} overflows",
                    self.id.as_deref().unwrap_or("<unsaved>")
                ))
            })
    }
}

/// Supabase tables may use integer or UUID primary keys
fn id_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
