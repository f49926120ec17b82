//! Command parsing for the dashboard REPL

use crate::error::{Result, StockError};
use crate::models::{Period, Theme, normalize_ticker};
use chrono::NaiveDate;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Select the ticker to analyse
    Ticker { symbol: String },
    /// Switch the look-back period
    Period { period: Period },
    /// Explicit date range
    Range { start: NaiveDate, end: NaiveDate },
    /// Toggle the short moving average
    ToggleMa50,
    /// Toggle the long moving average
    ToggleMa200,
    /// Price chart view
    Chart,
    /// Company overview
    Profile,
    /// Performance metrics view
    Metrics,
    /// Chart, profile and metrics
    All,
    /// Add a ticker to the watchlist
    Watch { symbol: String },
    /// Remove a ticker from the watchlist
    Unwatch { symbol: String },
    /// Show the watchlist
    Watchlist,
    /// Show recent searches
    Recent,
    /// Show the selectable tickers
    Tickers,
    /// Show preferences
    Prefs,
    /// Save preferences, optionally changing some of them
    Save {
        theme: Option<Theme>,
        ticker: Option<String>,
        period: Option<Period>,
    },
    /// Show help
    Help,
    /// Leave the dashboard
    Exit,
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(StockError::Command("Empty input".to_string()));
        }

        // A bare word selects a ticker
        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command::Ticker {
                symbol: normalize_ticker(input)?,
            });
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(StockError::Command("Empty command".to_string()));
        };
        let cmd = cmd.to_lowercase();

        match cmd.as_str() {
            "ticker" | "t" | "s" => Ok(Command::Ticker {
                symbol: symbol_arg(args, "ticker")?,
            }),
            "period" | "p" => {
                if args.is_empty() {
                    return Err(StockError::Command(
                        "Missing period for period command".to_string(),
                    ));
                }
                Ok(Command::Period {
                    period: args.join(" ").parse()?,
                })
            }
            "range" => {
                let [start, end] = args else {
                    return Err(StockError::Command(
                        "Range requires <start> <end> as YYYY-MM-DD".to_string(),
                    ));
                };
                let start = parse_date(start)?;
                let end = parse_date(end)?;
                if start > end {
                    return Err(StockError::InvalidDate(format!(
                        "start {start} is after end {end}"
                    )));
                }
                Ok(Command::Range { start, end })
            }
            "ma50" => Ok(Command::ToggleMa50),
            "ma200" => Ok(Command::ToggleMa200),
            "chart" | "c" => Ok(Command::Chart),
            "profile" | "info" => Ok(Command::Profile),
            "metrics" | "m" => Ok(Command::Metrics),
            "all" => Ok(Command::All),
            "watch" | "w" => Ok(Command::Watch {
                symbol: symbol_arg(args, "watch")?,
            }),
            "unwatch" => Ok(Command::Unwatch {
                symbol: symbol_arg(args, "unwatch")?,
            }),
            "watchlist" | "wl" => Ok(Command::Watchlist),
            "recent" | "r" => Ok(Command::Recent),
            "tickers" => Ok(Command::Tickers),
            "prefs" => Ok(Command::Prefs),
            "save" => parse_save(args),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(StockError::Command(format!("Unknown command: {cmd}"))),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r"
Stock Analyzer Commands
=======================

Selection:
  <ticker>                 Select a ticker (same as /ticker)
  /ticker <symbol>         Select a ticker
  /period <period>         1 Month, 3 Months, 6 Months, 1 Year, 2 Years, 5 Years
  /range <start> <end>     Custom range, dates as YYYY-MM-DD
  /ma50, /ma200            Toggle moving averages

Views:
  /chart                   Price chart with volume and recent bars
  /profile                 Company overview
  /metrics                 Performance metrics and returns distribution
  /all                     Chart, profile and metrics

Watchlist:
  /watch <symbol>          Add to watchlist
  /unwatch <symbol>        Remove from watchlist
  /watchlist               Show watchlist
  /recent                  Recent searches
  /tickers                 Popular and watched tickers

Preferences:
  /prefs                   Show preferences
  /save [theme=light|dark] [ticker=<symbol>] [period=<period>]

Other:
  /help                    Show help
  /exit                    Exit

Aliases:
  /t, /s = /ticker   /p = /period    /c = /chart     /info = /profile
  /m = /metrics      /w = /watch     /wl = /watchlist /r = /recent
  /h, /? = /help     /q, /quit = /exit
"
    }
}

fn symbol_arg(args: &[&str], command: &str) -> Result<String> {
    let symbol = args.first().ok_or_else(|| {
        StockError::Command(format!("Missing symbol for {command} command"))
    })?;
    normalize_ticker(symbol)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| StockError::InvalidDate(format!("{raw}: {e}")))
}

/// `key=value` pairs; a period label may span several words
fn parse_save(args: &[&str]) -> Result<Command> {
    let mut theme = None;
    let mut ticker = None;
    let mut period_words: Vec<&str> = Vec::new();
    let mut in_period = false;

    for &arg in args {
        match arg.split_once('=') {
            Some((key, value)) => {
                in_period = false;
                match key.to_lowercase().as_str() {
                    "theme" => theme = Some(value.parse()?),
                    "ticker" => ticker = Some(normalize_ticker(value)?),
                    "period" => {
                        period_words = vec![value];
                        in_period = true;
                    }
                    other => {
                        return Err(StockError::Command(format!(
                            "Unknown preference: {other}"
                        )));
                    }
                }
            }
            None if in_period => period_words.push(arg),
            None => {
                return Err(StockError::Command(format!(
                    "Expected key=value, got: {arg}"
                )));
            }
        }
    }

    let period = if period_words.is_empty() {
        None
    } else {
        Some(period_words.join(" ").parse()?)
    };

    Ok(Command::Save {
        theme,
        ticker,
        period,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker() {
        let cmd = Command::parse("/ticker msft").unwrap();
        assert_eq!(
            cmd,
            Command::Ticker {
                symbol: "MSFT".to_string()
            }
        );

        let cmd = Command::parse("/s tsla").unwrap();
        assert_eq!(
            cmd,
            Command::Ticker {
                symbol: "TSLA".to_string()
            }
        );
    }

    #[test]
    fn test_bare_word_selects_ticker() {
        let cmd = Command::parse("  nvda ").unwrap();
        assert_eq!(
            cmd,
            Command::Ticker {
                symbol: "NVDA".to_string()
            }
        );
        assert!(matches!(
            Command::parse("not a ticker"),
            Err(StockError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn test_parse_period() {
        let cmd = Command::parse("/period 3 Months").unwrap();
        assert_eq!(
            cmd,
            Command::Period {
                period: Period::ThreeMonths
            }
        );
        assert_eq!(
            Command::parse("/p 5y").unwrap(),
            Command::Period {
                period: Period::FiveYears
            }
        );
        assert!(Command::parse("/period").is_err());
        assert!(Command::parse("/period 7 weeks").is_err());
    }

    #[test]
    fn test_parse_range() {
        let cmd = Command::parse("/range 2024-01-01 2024-03-31").unwrap();
        assert_eq!(
            cmd,
            Command::Range {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            }
        );
        assert!(matches!(
            Command::parse("/range 2024-03-31 2024-01-01"),
            Err(StockError::InvalidDate(_))
        ));
        assert!(Command::parse("/range 2024-01-01").is_err());
        assert!(Command::parse("/range 01/01/2024 2024-03-31").is_err());
    }

    #[test]
    fn test_parse_save() {
        let cmd = Command::parse("/save theme=dark ticker=msft period=6 Months").unwrap();
        assert_eq!(
            cmd,
            Command::Save {
                theme: Some(Theme::Dark),
                ticker: Some("MSFT".to_string()),
                period: Some(Period::SixMonths),
            }
        );

        assert_eq!(
            Command::parse("/save").unwrap(),
            Command::Save {
                theme: None,
                ticker: None,
                period: None,
            }
        );
        assert!(Command::parse("/save colour=red").is_err());
        assert!(Command::parse("/save dark").is_err());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Command::parse("/c").unwrap(), Command::Chart);
        assert_eq!(Command::parse("/info").unwrap(), Command::Profile);
        assert_eq!(Command::parse("/M").unwrap(), Command::Metrics);
        assert_eq!(Command::parse("/wl").unwrap(), Command::Watchlist);
        assert_eq!(Command::parse("/?").unwrap(), Command::Help);
        assert_eq!(Command::parse("/quit").unwrap(), Command::Exit);
    }

    #[test]
    fn test_parse_missing_arg() {
        assert!(Command::parse("/watch").is_err());
        assert!(Command::parse("/unwatch").is_err());
        assert!(Command::parse("/ticker").is_err());
    }

    #[test]
    fn test_parse_unknown_and_empty() {
        assert!(matches!(
            Command::parse("/frobnicate"),
            Err(StockError::Command(_))
        ));
        assert!(Command::parse("   ").is_err());
        assert!(Command::parse("/").is_err());
    }
}
