//! Trade journal analysis: performance statistics and rule-based insights

use crate::error::AnalyzerResult;
use crate::types::{TradeAnalysis, TradeStats};
use persistence::{DbError, DbResult, TradeRecord};
use rust_decimal::Decimal;

const MAX_STRATEGIES: usize = 5;
const MAX_INSIGHTS: usize = 3;
/// Only the most recent trades' notes are scanned for keywords
const NOTES_SAMPLE: usize = 50;

const EMOTION_KEYWORDS: [&str; 3] = ["emotion", "fear", "greed"];

impl TradeStats {
    /// Fails when a trade's P&L, or their sum, leaves the decimal range
    pub fn from_trades(trades: &[TradeRecord]) -> AnalyzerResult<Self> {
        let trade_count = trades.len();

        let pnls = trades
            .iter()
            .map(TradeRecord::realized_pnl)
            .collect::<DbResult<Vec<Decimal>>>()?;
        let win_count = pnls.iter().filter(|p| **p > Decimal::ZERO).count();
        let loss_count = pnls.iter().filter(|p| **p < Decimal::ZERO).count();
        let total_pnl = pnls
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
            .ok_or_else(|| DbError::OutOfRange(format!("total P&L of {} trades overflows", trade_count)))?;

        let (win_rate, avg_profit_loss) = if trade_count > 0 {
            (
                win_count as f64 / trade_count as f64,
                total_pnl / Decimal::from(trade_count),
            )
        } else {
            (0.0, Decimal::ZERO)
        };

        Ok(Self {
            trade_count,
            win_count,
            loss_count,
            win_rate,
            total_pnl,
            avg_profit_loss,
        })
    }
}

/// Distinct strategy labels, most used first. Ties keep first-seen order.
pub fn rank_strategies(trades: &[TradeRecord]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in trades
        .iter()
        .filter_map(|t| t.trade_type.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        match counts.iter_mut().find(|(name, _)| name == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label.to_string(), 1)),
        }
    }

    // stable sort preserves first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(MAX_STRATEGIES)
        .map(|(name, _)| name)
        .collect()
}

/// Full analysis of a user's journal
pub fn analyze_trades(trades: &[TradeRecord]) -> AnalyzerResult<TradeAnalysis> {
    let stats = TradeStats::from_trades(trades)?;

    if trades.is_empty() {
        return Ok(TradeAnalysis {
            stats,
            strategies: Vec::new(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            suggestions: vec!["Start recording your trades to get personalized analysis.".to_string()],
        });
    }

    let strategies = rank_strategies(trades);
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut suggestions = Vec::new();

    if stats.win_rate > 0.5 {
        strengths.push("Above 50% win rate".to_string());
    } else {
        weaknesses.push("Below 50% win rate".to_string());
        suggestions.push("Focus on improving your win rate by reviewing losing trades".to_string());
    }

    if stats.avg_profit_loss > Decimal::ZERO {
        strengths.push("Positive average P&L".to_string());
    } else {
        weaknesses.push("Negative average P&L".to_string());
        suggestions.push("Work on improving your average profit per trade".to_string());
    }

    if strategies.len() > 2 {
        strengths.push(format!(
            "Diverse trading approaches ({} different strategies)",
            strategies.len()
        ));
    } else {
        suggestions
            .push("Consider exploring more trading strategies to diversify your approach".to_string());
    }

    let notes = trades
        .iter()
        .take(NOTES_SAMPLE)
        .filter_map(|t| t.notes.as_deref())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if !notes.is_empty() {
        if EMOTION_KEYWORDS.iter().any(|k| notes.contains(k)) {
            weaknesses.push("Emotional trading noted in multiple trades".to_string());
            suggestions.push("Work on emotional discipline during trading".to_string());
        }
        if notes.contains("plan") {
            strengths.push("Evidence of trade planning in notes".to_string());
        }
    }

    strengths.truncate(MAX_INSIGHTS);
    weaknesses.truncate(MAX_INSIGHTS);
    suggestions.truncate(MAX_INSIGHTS);

    Ok(TradeAnalysis {
        stats,
        strategies,
        strengths,
        weaknesses,
        suggestions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use rust_decimal_macros::dec;

    fn make_trade(pnl: Decimal, trade_type: Option<&str>, notes: Option<&str>) -> TradeRecord {
        TradeRecord {
            user_id: "trader".into(),
            symbol: Some("BTCUSD".into()),
            trade_type: trade_type.map(Into::into),
            pnl: Some(pnl),
            notes: notes.map(Into::into),
            ..Default::default()
        }
    }

    fn with_pnls(pnls: &[Decimal]) -> Vec<TradeRecord> {
        pnls.iter().map(|p| make_trade(*p, None, None)).collect()
    }

    #[test]
    fn test_stats_empty() {
        let stats = TradeStats::from_trades(&[]).unwrap();
        assert_eq!(stats.trade_count, 0);
        assert_eq!(stats.win_count, 0);
        assert_eq!(stats.loss_count, 0);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.total_pnl, Decimal::ZERO);
        assert_eq!(stats.avg_profit_loss, Decimal::ZERO);
    }

    #[test]
    fn test_stats_breakeven_excluded_from_wins_and_losses() {
        let stats = TradeStats::from_trades(&with_pnls(&[dec!(10), dec!(-5), dec!(0), dec!(20)])).unwrap();
        assert_eq!(stats.trade_count, 4);
        assert_eq!(stats.win_count, 2);
        assert_eq!(stats.loss_count, 1);
        assert_eq!(stats.win_rate, 0.5);
        assert_eq!(stats.total_pnl, dec!(25));
        assert_eq!(stats.avg_profit_loss, dec!(6.25));
    }

    #[test]
    fn test_stats_uses_derived_pnl() {
        let open = TradeRecord {
            user_id: "trader".into(),
            direction: Some("short".into()),
            entry_price: Some(dec!(20)),
            exit_price: Some(dec!(18)),
            quantity: Some(dec!(5)),
            ..Default::default()
        };
        let stats = TradeStats::from_trades(&[open]).unwrap();
        assert_eq!(stats.win_count, 1);
        assert_eq!(stats.total_pnl, dec!(10));
        assert_eq!(stats.win_rate, 1.0);
    }

    #[test]
    fn test_win_rate_bounds() {
        let all_losses = TradeStats::from_trades(&with_pnls(&[dec!(-1), dec!(-2)])).unwrap();
        assert_eq!(all_losses.win_rate, 0.0);
        assert!(all_losses.win_count + all_losses.loss_count <= all_losses.trade_count);

        let all_wins = TradeStats::from_trades(&with_pnls(&[dec!(1), dec!(2), dec!(3)])).unwrap();
        assert_eq!(all_wins.win_rate, 1.0);
    }

    #[test]
    fn test_empty_analysis_suggests_recording() {
        let analysis = analyze_trades(&[]).unwrap();
        assert!(analysis.strengths.is_empty());
        assert!(analysis.weaknesses.is_empty());
        assert!(analysis.strategies.is_empty());
        assert_eq!(analysis.suggestions.len(), 1);
        assert!(analysis.suggestions[0].starts_with("Start recording"));
    }

    #[test]
    fn test_rank_strategies_by_frequency() {
        let trades = vec![
            make_trade(dec!(1), Some("scalp"), None),
            make_trade(dec!(1), Some("breakout"), None),
            make_trade(dec!(1), Some(" breakout "), None),
            make_trade(dec!(1), Some(""), None),
            make_trade(dec!(1), Some("swing"), None),
            make_trade(dec!(1), Some("news"), None),
            make_trade(dec!(1), Some("gap"), None),
            make_trade(dec!(1), Some("range"), None),
        ];
        let ranked = rank_strategies(&trades);
        assert_eq!(ranked.len(), MAX_STRATEGIES);
        assert_eq!(ranked[0], "breakout");
        assert_eq!(ranked[1], "scalp");
        assert_eq!(ranked[2], "swing");
        assert!(!ranked.contains(&"range".to_string()));
    }

    #[test]
    fn test_winning_diverse_trader() {
        let trades = vec![
            make_trade(dec!(50), Some("scalp"), Some("Followed my plan")),
            make_trade(dec!(30), Some("swing"), None),
            make_trade(dec!(-10), Some("breakout"), None),
        ];
        let analysis = analyze_trades(&trades).unwrap();
        assert_eq!(
            analysis.strengths,
            vec![
                "Above 50% win rate".to_string(),
                "Positive average P&L".to_string(),
                "Diverse trading approaches (3 different strategies)".to_string(),
            ]
        );
        // planning strength is cut by the cap
        assert_eq!(analysis.strengths.len(), MAX_INSIGHTS);
        assert!(analysis.weaknesses.is_empty());
        assert!(analysis.suggestions.is_empty());
    }

    #[test]
    fn test_losing_emotional_trader() {
        let trades = vec![
            make_trade(dec!(-20), Some("scalp"), Some("Entered out of FEAR of missing out")),
            make_trade(dec!(5), Some("scalp"), None),
        ];
        let analysis = analyze_trades(&trades).unwrap();
        assert_eq!(
            analysis.weaknesses,
            vec![
                "Below 50% win rate".to_string(),
                "Negative average P&L".to_string(),
                "Emotional trading noted in multiple trades".to_string(),
            ]
        );
        assert_eq!(analysis.suggestions.len(), MAX_INSIGHTS);
        assert_eq!(
            analysis.suggestions[2],
            "Consider exploring more trading strategies to diversify your approach"
        );
    }

    #[test]
    fn test_notes_beyond_sample_ignored() {
        let mut trades: Vec<TradeRecord> = (0..NOTES_SAMPLE)
            .map(|_| make_trade(dec!(1), None, Some("calm")))
            .collect();
        trades.push(make_trade(dec!(1), None, Some("greed")));
        let analysis = analyze_trades(&trades).unwrap();
        assert!(!analysis
            .weaknesses
            .iter()
            .any(|w| w.starts_with("Emotional")));
    }

    #[test]
    fn test_total_overflow_is_error() {
        let huge = Decimal::MAX / dec!(2) + dec!(1);
        let err = analyze_trades(&with_pnls(&[huge, huge])).unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::Store(DbError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_derived_overflow_is_error() {
        let trade = TradeRecord {
            user_id: "trader".into(),
            entry_price: Some(dec!(0)),
            exit_price: Some(dec!(1_000_000_000_000_000)),
            quantity: Some(dec!(1_000_000_000_000_000)),
            ..Default::default()
        };
        assert!(TradeStats::from_trades(&[trade]).is_err());
    }
}
