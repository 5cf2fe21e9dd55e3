//! Trading coach: prompt assembly, reply cleanup, and the offline template coach

use crate::types::TradeAnalysis;

/// Marker the model is asked to answer after; echoed prompts are cut here
pub const ADVICE_MARKER: &str = "Your helpful advice:";
pub const MAX_REPLY_CHARS: usize = 1000;
const TRUNCATION_SUFFIX: &str = "... [response truncated]";

fn list_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// One prompt: coach persona, the trader's numbers, then their question
pub fn build_coach_prompt(analysis: &TradeAnalysis, message: &str) -> String {
    let stats = &analysis.stats;
    format!(
        r#"You are a professional trading coach giving advice to a trader.
The trader's performance:
- Trades recorded: {} ({} wins, {} losses)
- Win rate: {:.1}%
- Total P&L: ${:.2}
- Average P&L: ${:.2}
- Strategies used: {}
- Strengths: {}
- Weaknesses: {}

The trader asks: "{}"

{}"#,
        stats.trade_count,
        stats.win_count,
        stats.loss_count,
        stats.win_rate * 100.0,
        stats.total_pnl,
        stats.avg_profit_loss,
        list_or(&analysis.strategies, "None recorded"),
        list_or(&analysis.strengths, "None identified"),
        list_or(&analysis.weaknesses, "None identified"),
        message.trim(),
        ADVICE_MARKER,
    )
}

/// Strip an echoed prompt and cap the length. `None` when nothing is left.
pub fn clean_reply(raw: &str) -> Option<String> {
    let advice = match raw.rfind(ADVICE_MARKER) {
        Some(idx) => &raw[idx + ADVICE_MARKER.len()..],
        None => raw,
    }
    .trim();

    if advice.is_empty() {
        return None;
    }

    if advice.chars().count() > MAX_REPLY_CHARS {
        let cut: String = advice.chars().take(MAX_REPLY_CHARS).collect();
        return Some(format!("{}{}", cut, TRUNCATION_SUFFIX));
    }

    Some(advice.to_string())
}

/// Canned answer used when no completion API is configured
pub fn template_reply(message: &str, analysis: &TradeAnalysis) -> String {
    let win_rate_pct = analysis.stats.win_rate * 100.0;
    let avg_pnl = analysis.stats.avg_profit_loss;
    let question = message.to_lowercase();

    if question.contains("how am i doing") {
        let outlook = if avg_pnl > rust_decimal::Decimal::ZERO {
            "Your consistent positive results show good trading discipline."
        } else {
            "Focus on improving your risk management to achieve positive results."
        };
        return format!(
            "Based on your trading metrics, you have a {:.1}% win rate with an average P&L of ${:.2}. {}",
            win_rate_pct, avg_pnl, outlook
        );
    }

    if question.contains("what should i improve") {
        return format!(
            "Based on your trading data, I recommend: {}",
            list_or(
                &analysis.suggestions,
                "Keeping detailed notes on each trade to identify patterns."
            )
        );
    }

    if question.contains("what are my strengths") {
        return format!(
            "Your trading strengths include: {}",
            list_or(
                &analysis.strengths,
                "Not enough data to determine specific strengths yet."
            )
        );
    }

    if question.contains("what are my weaknesses") {
        return format!(
            "Areas for improvement include: {}",
            list_or(
                &analysis.weaknesses,
                "Not enough data to determine specific weaknesses yet."
            )
        );
    }

    format!(
        "Based on your trading history with a {:.1}% win rate and ${:.2} average P&L, \
         I recommend focusing on consistency and keeping detailed trade notes.",
        win_rate_pct, avg_pnl
    )
}
