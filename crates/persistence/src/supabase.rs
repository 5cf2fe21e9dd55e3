//! Supabase trade store: PostgREST `trades` table over HTTPS
//!
//! Authenticates with the project's service key, which bypasses row-level
//! security; the `user_id` filter is the only scoping.

use crate::store::TradeStore;
use crate::{DbError, DbResult, TradeRecord};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const TRADES_TABLE: &str = "trades";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct SupabaseTradeStore {
    client: Client,
    rest_url: String,
    service_key: String,
    limit: Option<u32>,
}

impl SupabaseTradeStore {
    /// `project_url` is the bare project URL, e.g. `https://abc.supabase.co`
    pub fn new(project_url: &str, service_key: impl Into<String>, limit: Option<u32>) -> DbResult<Self> {
        Self::with_timeout(
            project_url,
            service_key,
            limit,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Same as [`new`](Self::new) with an explicit request timeout. A request
    /// that times out fails with [`DbError::Http`].
    pub fn with_timeout(
        project_url: &str,
        service_key: impl Into<String>,
        limit: Option<u32>,
        timeout: Duration,
    ) -> DbResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            service_key: service_key.into(),
            limit,
        })
    }

    pub fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url, TRADES_TABLE)
    }
}

/// PostgREST query for one user's trades, newest first
pub fn trade_query(user_id: &str, limit: Option<u32>) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{}", user_id)),
        ("order", "entry_date.desc.nullslast".to_string()),
    ];
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

#[async_trait]
impl TradeStore for SupabaseTradeStore {
    async fn fetch_trades(&self, user_id: &str) -> DbResult<Vec<TradeRecord>> {
        let url = self.table_url();
        debug!(user_id, url = %url, "Fetching trades from Supabase");

        let resp = self
            .client
            .get(&url)
            .query(&trade_query(user_id, self.limit))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DbError::Upstream(format!("Supabase {}: {}", status, body)));
        }

        let trades: Vec<TradeRecord> = resp.json().await?;
        debug!(user_id, count = trades.len(), "Trades fetched");
        Ok(trades)
    }
}
