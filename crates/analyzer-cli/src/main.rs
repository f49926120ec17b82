//! Stock Analyzer CLI
//!
//! An interactive dashboard for price charts, company overviews and
//! performance metrics.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session for the default user
//! cargo run --bin stock-analyzer
//!
//! # One-shot commands
//! cargo run --bin stock-analyzer -- --ticker MSFT --period "6 Months" --command /metrics
//! ```

use analyzer_stock::dashboard::{Dashboard, FormatterFactory, Response};
use analyzer_stock::models::normalize_ticker;
use analyzer_stock::{
    MarketDataProvider, Period, SessionContext, StockConfig, Store, YahooFinanceClient,
};
use chrono::NaiveDate;
use analyzer_utils::{Config, DEFAULT_DIRECTIVE, init_tracing};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

const PROMPT: &str = "stock> ";

#[derive(Parser, Debug)]
#[command(name = "stock-analyzer")]
#[command(about = "Stock analysis dashboard", long_about = None)]
struct Args {
    /// User whose watchlist and preferences are loaded
    #[arg(short, long)]
    user: Option<String>,

    /// Directory holding the database file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Initial ticker, overriding the saved default
    #[arg(short, long)]
    ticker: Option<String>,

    /// Initial period, e.g. "3 Months" or 1y
    #[arg(short, long)]
    period: Option<String>,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Run a command and exit; may be repeated
    #[arg(short, long = "command")]
    command: Vec<String>,
}

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                    Stock Analysis Dashboard                  ║
║                                                              ║
║  Type a ticker (e.g. MSFT) to select it, then:               ║
║    /chart    - Price chart and recent data                   ║
║    /profile  - Company overview                              ║
║    /metrics  - Performance metrics                           ║
║    /all      - Everything at once                            ║
║    /help     - All commands                                  ║
║    /exit     - Exit                                          ║
║                                                              ║
║  For informational purposes only, not investment advice.     ║
║  Data provided by Yahoo Finance.                             ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_DIRECTIVE);

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(user) = &args.user {
        config = config.user_id(user.clone());
    }
    if let Some(dir) = &args.data_dir {
        config = config.data_dir(dir);
    }

    let stock_config = config_or_default(StockConfig::default().with_env());
    let provider = YahooFinanceClient::new(&stock_config)?;
    let store = Store::open(config.database_path());

    info!(
        app = %config.app_name,
        user_id = %config.user_id,
        database = %config.database_path().display(),
        "Starting"
    );

    let dashboard = Dashboard::new(
        provider,
        store,
        stock_config,
        FormatterFactory::create(args.json),
    );

    let mut session = dashboard.start_session(&config.user_id);
    for problem in apply_overrides(&args, &mut session, dashboard.today()) {
        eprintln!("{}", dashboard.formatter().format_error(&problem));
    }

    if !args.command.is_empty() {
        for command in &args.command {
            match dashboard.handle(&mut session, command).await {
                Response::Text(text) => println!("{text}"),
                Response::Exit => break,
            }
        }
        return Ok(());
    }

    if !args.json {
        print_banner();
    }
    println!("{}\n", dashboard.formatter().format_session(&session));

    run_repl(&dashboard, &mut session).await
}

/// Fall back to the built-in settings when the environment is unusable
fn config_or_default(loaded: analyzer_stock::Result<StockConfig>) -> StockConfig {
    loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring environment overrides");
        StockConfig::default()
    })
}

/// Apply `--ticker` and `--period`; invalid values keep the saved defaults
/// and are reported back
fn apply_overrides(args: &Args, session: &mut SessionContext, today: NaiveDate) -> Vec<String> {
    let mut problems = Vec::new();

    if let Some(ticker) = &args.ticker {
        match normalize_ticker(ticker) {
            Ok(ticker) => {
                session.select(ticker);
            }
            Err(e) => problems.push(format!("{e}; keeping {}", session.selected_ticker)),
        }
    }

    if let Some(period) = &args.period {
        match period.parse::<Period>() {
            Ok(period) => session.set_period(period, today),
            Err(e) => problems.push(format!("{e}; keeping {}", session.period)),
        }
    }

    problems
}

async fn run_repl<P: MarketDataProvider>(
    dashboard: &Dashboard<P>,
    session: &mut SessionContext,
) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{PROMPT}");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match dashboard.handle(session, input).await {
            Response::Text(text) => println!("{text}\n"),
            Response::Exit => {
                println!("Goodbye!");
                break;
            }
        }
    }

    Ok(())
}
