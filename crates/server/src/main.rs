//! Trade Analysis: trade journal statistics and an AI trading coach over HTTP
//!
//! Usage:
//!   trade-analysis serve --port 8000                   Launch the HTTP functions
//!   trade-analysis analyze --user-id <id>              Print a user's analysis
//!   trade-analysis import --file trades.json           Load trades into the local store

mod config;
mod error;
mod routes;

use clap::{Parser, Subcommand};
use config::AppConfig;
use engine::{OpenAiClient, TradeAnalysis, TradeAnalyzer, UserId};
use persistence::{
    Database, SqliteTradeStore, SupabaseTradeStore, TradeRecord, TradeRepository, TradeStore,
};
use routes::{build_router, AppState};
use std::sync::Arc;
use tracing::{info, warn};

pub const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

#[derive(Parser)]
#[command(name = "trade-analysis")]
#[command(about = "Trade journal statistics and AI trading coach", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the health and trade-analysis functions over HTTP
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Print one user's trade analysis, optionally asking the coach a question
    Analyze {
        #[arg(long)]
        user_id: String,
        /// Question for the trading coach
        #[arg(long)]
        message: Option<String>,
    },
    /// Import a JSON array of trade records into the local SQLite store
    Import {
        #[arg(long)]
        file: String,
    },
}

const DEFAULT_LOG: &str = "info,engine=info,persistence=info,trade_analysis=info,tower_http=info";
const VERBOSE_LOG: &str = "debug,engine=debug,persistence=debug,trade_analysis=debug,tower_http=debug";

/// --verbose wins over RUST_LOG; an unset or blank RUST_LOG means the default
fn log_directives(verbose: bool, rust_log: Option<String>) -> String {
    if verbose {
        return VERBOSE_LOG.to_string();
    }
    rust_log
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG.to_string())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::new(log_directives(verbose, std::env::var("RUST_LOG").ok()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // .env may carry RUST_LOG, so load it before the subscriber
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(&config, &host, port).await?;
        }
        Commands::Analyze { user_id, message } => {
            cmd_analyze(&config, &user_id, message.as_deref()).await?;
        }
        Commands::Import { file } => {
            cmd_import(&config, &file).await?;
        }
    }

    Ok(())
}

/// Wire the configured store and completion client into an analyzer
async fn build_analyzer(config: &AppConfig) -> anyhow::Result<TradeAnalyzer> {
    let store: Arc<dyn TradeStore> = match &config.supabase {
        Some(supabase) => Arc::new(
            SupabaseTradeStore::new(&supabase.url, supabase.service_key.clone(), config.fetch_limit)
                .map_err(|e| anyhow::anyhow!("Supabase client initialization failed: {}", e))?,
        ),
        None => {
            let db = Database::new(&config.db_path)
                .await
                .map_err(|e| anyhow::anyhow!("Database initialization failed: {}", e))?;
            Arc::new(SqliteTradeStore::new(db.pool_clone(), config.fetch_limit))
        }
    };
    info!("Trade store: {}", config.store_label());

    let analyzer = TradeAnalyzer::new(store);
    match &config.completion {
        Some(completion) => {
            info!(model = %completion.model, base_url = %completion.base_url, "Completion API configured");
            let client = OpenAiClient::new(completion.clone())
                .map_err(|e| anyhow::anyhow!("Completion client initialization failed: {}", e))?;
            Ok(analyzer.with_completion(Arc::new(client)))
        }
        None => {
            warn!("OPENAI_API_KEY not set, chat answers come from the template coach");
            Ok(analyzer)
        }
    }
}

// ============================================================================
// Serve command: Axum web server
// ============================================================================

async fn cmd_serve(config: &AppConfig, host: &str, port: u16) -> anyhow::Result<()> {
    info!("Trade Analysis v{} starting...", APP_VERSION);

    let analyzer = build_analyzer(config).await?;
    let coach = if analyzer.has_completion() {
        "completion API"
    } else {
        "template replies (OPENAI_API_KEY not set)"
    };
    let state = AppState {
        analyzer: Arc::new(analyzer),
    };
    let app = build_router(state);

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Trade Analysis v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints (also under /.netlify/functions/):");
    println!("  ANY  /api/health                        - Liveness probe");
    println!("  GET  /api/trade-analysis?user_id=<id>   - Trade statistics");
    println!("  POST /api/trade-analysis?user_id=<id>   - Ask the trading coach");
    println!("\n  Store: {}", config.store_label());
    println!("  Coach: {}", coach);
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Ctrl+C received, shutting down");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Analyze command: CLI mode (no web server)
// ============================================================================

async fn cmd_analyze(config: &AppConfig, user_id: &str, message: Option<&str>) -> anyhow::Result<()> {
    let user_id = UserId::parse(user_id)?;
    let analyzer = build_analyzer(config).await?;

    println!("\n=== Trade Analysis v{} ===", APP_VERSION);
    let analysis = analyzer.summary(&user_id).await?;
    print_analysis(&user_id, &analysis);

    if let Some(message) = message {
        let reply = analyzer.chat(&user_id, message).await?;
        println!("\nCoach:\n  {}", reply.response);
    }

    Ok(())
}

fn print_analysis(user_id: &UserId, analysis: &TradeAnalysis) {
    let stats = &analysis.stats;
    println!("\nUser: {}", user_id);
    println!(
        "  Trades: {} | Wins: {} | Losses: {} | Win rate: {:.1}%",
        stats.trade_count,
        stats.win_count,
        stats.loss_count,
        stats.win_rate * 100.0
    );
    println!(
        "  Total P&L: {:.2} | Avg P&L: {:.2}",
        stats.total_pnl, stats.avg_profit_loss
    );

    let sections = [
        ("Strategies", &analysis.strategies),
        ("Strengths", &analysis.strengths),
        ("Weaknesses", &analysis.weaknesses),
        ("Suggestions", &analysis.suggestions),
    ];
    for (label, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("\n  {}:", label);
        for item in items {
            println!("    - {}", item);
        }
    }
}

// ============================================================================
// Import command: seed the local SQLite journal
// ============================================================================

async fn cmd_import(config: &AppConfig, file: &str) -> anyhow::Result<()> {
    if config.supabase.is_some() {
        warn!("Supabase is configured; importing into the local store at {} anyway", config.db_path);
    }

    let raw = std::fs::read_to_string(file)?;
    let trades: Vec<TradeRecord> = serde_json::from_str(&raw)?;

    let db = Database::new(&config.db_path)
        .await
        .map_err(|e| anyhow::anyhow!("Database initialization failed: {}", e))?;
    let (inserted, total) = import_trades(&db, &trades).await?;

    info!("Imported {} trades from {} ({} in store)", inserted, file, total);
    Ok(())
}

/// Validate every owner, insert in one transaction, report (inserted, stored)
async fn import_trades(db: &Database, trades: &[TradeRecord]) -> anyhow::Result<(usize, i64)> {
    for trade in trades {
        UserId::parse(&trade.user_id)?;
    }

    let repo = TradeRepository::new(db.pool());
    let inserted = repo
        .insert_many(trades)
        .await
        .map_err(|e| anyhow::anyhow!("Import failed: {}", e))?;
    let total = repo
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Counting stored trades failed: {}", e))?;

    Ok((inserted, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trade(user_id: &str) -> TradeRecord {
        TradeRecord {
            user_id: user_id.into(),
            pnl: Some(dec!(12.5)),
            ..Default::default()
        }
    }

    #[test]
    fn test_log_directives() {
        assert_eq!(log_directives(false, None), DEFAULT_LOG);
        assert_eq!(log_directives(false, Some("  ".into())), DEFAULT_LOG);
        assert_eq!(log_directives(false, Some("warn".into())), "warn");
        assert_eq!(log_directives(true, Some("warn".into())), VERBOSE_LOG);
    }

    #[tokio::test]
    async fn test_import_reports_inserted_and_total() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(import_trades(&db, &[trade("alice")]).await.unwrap(), (1, 1));
        assert_eq!(
            import_trades(&db, &[trade("alice"), trade("bob")]).await.unwrap(),
            (2, 3)
        );
    }

    #[tokio::test]
    async fn test_import_rejects_bad_owner_before_writing() {
        let db = Database::in_memory().await.unwrap();
        assert!(import_trades(&db, &[trade("alice"), trade("a;b")]).await.is_err());
        assert_eq!(TradeRepository::new(db.pool()).count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_import_store_failure_is_error() {
        let db = Database::in_memory().await.unwrap();
        db.pool().close().await;
        assert!(import_trades(&db, &[trade("alice")]).await.is_err());
        assert!(import_trades(&db, &[]).await.is_err());
    }
}
