//! Types shared by the analyzer and its callers

use crate::error::AnalyzerError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A validated user identifier.
///
/// Ids end up inside store query filters, so only a conservative character
/// set is accepted: ASCII alphanumerics plus `-`, `_`, `.` and `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    pub const MAX_LEN: usize = 128;

    pub fn parse(raw: &str) -> Result<Self, AnalyzerError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(AnalyzerError::InvalidInput(
                "user_id must not be empty".to_string(),
            ));
        }
        if id.len() > Self::MAX_LEN {
            return Err(AnalyzerError::InvalidInput(format!(
                "user_id is longer than {} characters",
                Self::MAX_LEN
            )));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
        {
            return Err(AnalyzerError::InvalidInput(format!(
                "user_id contains invalid characters: {}",
                id
            )));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregate performance over a user's trades.
///
/// Breakeven trades count toward `trade_count` but neither wins nor losses,
/// so `win_count + loss_count <= trade_count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeStats {
    pub trade_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    /// Fraction in [0, 1]; 0 when there are no trades
    pub win_rate: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_pnl: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_profit_loss: Decimal,
}

/// Statistics plus the rule-based observations derived from them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeAnalysis {
    #[serde(flatten)]
    pub stats: TradeStats,
    pub strategies: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Coach answer for one chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub analysis: TradeAnalysis,
}
