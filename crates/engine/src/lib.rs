//! Trade analysis engine
//!
//! Provides:
//! - Performance statistics over a user's trade journal (win rate, P&L)
//! - Rule-based strengths, weaknesses and suggestions
//! - Trading-coach prompt assembly and an offline template coach
//! - OpenAI-compatible completion client
//! - `TradeAnalyzer`, the service tying a trade store to the coach

pub mod analysis;
pub mod analyzer;
pub mod api;
pub mod coach;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use analysis::{analyze_trades, rank_strategies};
pub use analyzer::TradeAnalyzer;
pub use api::{CompletionClient, CompletionError, OpenAiClient, OpenAiConfig};
pub use error::{AnalyzerError, AnalyzerResult};
pub use types::*;
