//! The read-only capability the analyzer needs from a trade store

use crate::{DbResult, TradeRecord};
use async_trait::async_trait;

#[async_trait]
pub trait TradeStore: Send + Sync {
    /// All trade records belonging to `user_id`, most recent first.
    /// A user without trades yields an empty vector, not an error.
    async fn fetch_trades(&self, user_id: &str) -> DbResult<Vec<TradeRecord>>;
}
