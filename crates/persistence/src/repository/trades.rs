//! Trades repository: local SQLite journal

use crate::store::TradeStore;
use crate::{DbError, DbResult, TradeRecord};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::debug;

/// Raw row; decimals are TEXT columns
#[derive(Debug, FromRow)]
struct TradeRow {
    id: i64,
    user_id: String,
    symbol: Option<String>,
    trade_type: Option<String>,
    direction: Option<String>,
    entry_price: Option<String>,
    exit_price: Option<String>,
    quantity: Option<String>,
    pnl: Option<String>,
    notes: Option<String>,
    entry_date: Option<String>,
    exit_date: Option<String>,
}

fn parse_decimal(column: &str, value: Option<String>) -> DbResult<Option<Decimal>> {
    value
        .map(|s| {
            Decimal::from_str(s.trim())
                .map_err(|e| DbError::Query(format!("invalid {column} '{s}': {e}")))
        })
        .transpose()
}

impl TryFrom<TradeRow> for TradeRecord {
    type Error = DbError;

    fn try_from(row: TradeRow) -> DbResult<Self> {
        Ok(TradeRecord {
            id: Some(row.id.to_string()),
            user_id: row.user_id,
            symbol: row.symbol,
            trade_type: row.trade_type,
            direction: row.direction,
            entry_price: parse_decimal("entry_price", row.entry_price)?,
            exit_price: parse_decimal("exit_price", row.exit_price)?,
            quantity: parse_decimal("quantity", row.quantity)?,
            pnl: parse_decimal("pnl", row.pnl)?,
            notes: row.notes,
            entry_date: row.entry_date,
            exit_date: row.exit_date,
        })
    }
}

async fn insert_with<'e, E>(executor: E, trade: &TradeRecord) -> DbResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO trades (
            user_id, symbol, trade_type, direction,
            entry_price, exit_price, quantity, pnl,
            notes, entry_date, exit_date
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&trade.user_id)
    .bind(&trade.symbol)
    .bind(&trade.trade_type)
    .bind(&trade.direction)
    .bind(trade.entry_price.map(|d| d.to_string()))
    .bind(trade.exit_price.map(|d| d.to_string()))
    .bind(trade.quantity.map(|d| d.to_string()))
    .bind(trade.pnl.map(|d| d.to_string()))
    .bind(&trade.notes)
    .bind(&trade.entry_date)
    .bind(&trade.exit_date)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Repository for the `trades` table
pub struct TradeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TradeRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one trade, returning its row id. Any `id` on the record is ignored.
    pub async fn insert(&self, trade: &TradeRecord) -> DbResult<i64> {
        insert_with(self.pool, trade).await
    }

    /// Insert many trades in one transaction; returns how many were written
    pub async fn insert_many(&self, trades: &[TradeRecord]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for trade in trades {
            insert_with(&mut *tx, trade).await?;
        }
        tx.commit().await?;

        Ok(trades.len())
    }

    /// Trades for one user, newest entry first. `limit = None` returns all rows.
    pub async fn get_by_user(&self, user_id: &str, limit: Option<u32>) -> DbResult<Vec<TradeRecord>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query_as::<_, TradeRow>(
            r#"
            SELECT id, user_id, symbol, trade_type, direction,
                   entry_price, exit_price, quantity, pnl,
                   notes, entry_date, exit_date
            FROM trades
            WHERE user_id = ?
            ORDER BY entry_date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TradeRecord::try_from).collect()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trades")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// [`TradeStore`] backed by the local SQLite journal
#[derive(Clone)]
pub struct SqliteTradeStore {
    pool: SqlitePool,
    limit: Option<u32>,
}

impl SqliteTradeStore {
    pub fn new(pool: SqlitePool, limit: Option<u32>) -> Self {
        Self { pool, limit }
    }
}

#[async_trait]
impl TradeStore for SqliteTradeStore {
    async fn fetch_trades(&self, user_id: &str) -> DbResult<Vec<TradeRecord>> {
        let trades = TradeRepository::new(&self.pool)
            .get_by_user(user_id, self.limit)
            .await?;
        debug!(user_id, count = trades.len(), "Trades loaded from SQLite");
        Ok(trades)
    }
}
