//! Trade Analyzer service: load a user's journal, aggregate it, optionally ask the coach

use crate::analysis::analyze_trades;
use crate::api::{CompletionClient, CompletionError};
use crate::coach::{build_coach_prompt, clean_reply, template_reply};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::types::{ChatReply, TradeAnalysis, UserId};
use persistence::TradeStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Stateless per request; cheap to share behind an `Arc`.
pub struct TradeAnalyzer {
    store: Arc<dyn TradeStore>,
    completion: Option<Arc<dyn CompletionClient>>,
}

impl TradeAnalyzer {
    pub fn new(store: Arc<dyn TradeStore>) -> Self {
        Self {
            store,
            completion: None,
        }
    }

    pub fn with_completion(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.completion = Some(client);
        self
    }

    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Fetch and aggregate; a store fault aborts before any statistics exist
    async fn load(&self, user_id: &UserId) -> AnalyzerResult<TradeAnalysis> {
        let trades = self.store.fetch_trades(user_id.as_str()).await?;
        debug!(user_id = %user_id, count = trades.len(), "Trades loaded");
        analyze_trades(&trades)
    }

    /// Statistics and insights for one user
    pub async fn summary(&self, user_id: &UserId) -> AnalyzerResult<TradeAnalysis> {
        let analysis = self.load(user_id).await?;
        info!(
            user_id = %user_id,
            trades = analysis.stats.trade_count,
            win_rate = analysis.stats.win_rate,
            "Trade summary computed"
        );
        Ok(analysis)
    }

    /// Answer one coaching question. Single completion attempt, no retry.
    pub async fn chat(&self, user_id: &UserId, message: &str) -> AnalyzerResult<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AnalyzerError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        let analysis = self.load(user_id).await?;

        let response = match &self.completion {
            Some(client) => {
                let prompt = build_coach_prompt(&analysis, message);
                let raw = client.complete(&prompt).await?;
                clean_reply(&raw).ok_or(CompletionError::EmptyResponse)?
            }
            None => template_reply(message, &analysis),
        };

        info!(
            user_id = %user_id,
            trades = analysis.stats.trade_count,
            reply_chars = response.len(),
            "Coach reply generated"
        );

        Ok(ChatReply { response, analysis })
    }
}
