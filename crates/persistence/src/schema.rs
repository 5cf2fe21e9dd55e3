//! Local SQLite schema for trade records

/// SQL to create all tables
/// NOTE: prices, quantities and P&L are stored as TEXT to keep Decimal precision
pub const CREATE_TABLES: &str = r#"
-- Trade journal, one row per position
CREATE TABLE IF NOT EXISTS trades (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    symbol TEXT,
    trade_type TEXT,
    direction TEXT,
    entry_price TEXT,
    exit_price TEXT,
    quantity TEXT,
    pnl TEXT,
    notes TEXT,
    entry_date TEXT,
    exit_date TEXT,
    created_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- ========== INDEXES ==========

CREATE INDEX IF NOT EXISTS idx_trades_user ON trades(user_id, entry_date DESC)
"#;
