//! Response formatting

use crate::chart::{ChartData, HistogramBin, sparkline};
use crate::metrics::PerformanceMetrics;
use crate::models::{CompanyProfile, UserPreferences};
use crate::session::SessionContext;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use serde_json::{Value, json};

const SPARK_WIDTH: usize = 60;
const HISTOGRAM_WIDTH: usize = 40;

pub trait Formatter: Send + Sync {
    fn format_session(&self, session: &SessionContext) -> String;
    fn format_chart(&self, chart: &ChartData, recent_bars: usize) -> String;
    fn format_profile(&self, ticker: &str, profile: Option<&CompanyProfile>) -> String;
    fn format_metrics(
        &self,
        ticker: &str,
        metrics: &PerformanceMetrics,
        histogram: &[HistogramBin],
    ) -> String;
    fn format_no_data(&self, ticker: &str) -> String;
    fn format_list(&self, title: &str, items: &[String]) -> String;
    fn format_preferences(&self, prefs: &UserPreferences) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
    fn format_help(&self) -> String;
}

pub fn no_data_message(ticker: &str) -> String {
    format!("No data found for {ticker}. Please check the ticker symbol.")
}

/// Plain-text output with tables and sparklines
pub struct CliFormatter;

impl CliFormatter {
    fn table(headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(headers.iter().map(|h| Cell::new(*h)).collect::<Vec<_>>());
        table
    }
}

impl Formatter for CliFormatter {
    fn format_session(&self, session: &SessionContext) -> String {
        let on_off = |on: bool| if on { "on" } else { "off" };
        let mut line = format!(
            "{} | {} | {} to {} | MA50 {} | MA200 {}",
            session.selected_ticker,
            session.period,
            session.start,
            session.end,
            on_off(session.show_ma50),
            on_off(session.show_ma200),
        );
        if !session.db_connected {
            line.push_str(" | storage unavailable");
        }
        line
    }

    fn format_chart(&self, chart: &ChartData, recent_bars: usize) -> String {
        let (Some(first), Some(last)) = (chart.candles.first(), chart.candles.last()) else {
            return no_data_message(&chart.ticker);
        };

        let mut out = format!(
            "{} Stock Price ({} to {})\n\n",
            chart.ticker, first.date, last.date
        );

        let closes = chart.closes();
        out.push_str(&format!(
            "Close   {}  {:.2}\n",
            sparkline(&closes, SPARK_WIDTH),
            last.close
        ));
        for overlay in &chart.overlays {
            match overlay.latest() {
                Some(value) => out.push_str(&format!("{}: {value:.2}\n", overlay.label)),
                None => out.push_str(&format!(
                    "{}: n/a (needs {} bars)\n",
                    overlay.label, overlay.window
                )),
            }
        }
        let volume: Vec<f64> = chart.volume.iter().map(|&v| v as f64).collect();
        out.push_str(&format!("Volume  {}\n", sparkline(&volume, SPARK_WIDTH)));
        if let (Some(low), Some(high)) = (chart.min_price, chart.max_price) {
            out.push_str(&format!("Range   {low:.2} - {high:.2}\n"));
        }

        out.push_str("\nRecent Price Data\n");
        let mut table = Self::table(&["Date", "Open", "High", "Low", "Close", "Volume"]);
        let skip = chart.candles.len().saturating_sub(recent_bars);
        for bar in &chart.candles[skip..] {
            table.add_row(vec![
                Cell::new(bar.date),
                Cell::new(format!("{:.2}", bar.open)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", bar.high)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", bar.low)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", bar.close)).set_alignment(CellAlignment::Right),
                Cell::new(group_thousands(&bar.volume.to_string()))
                    .set_alignment(CellAlignment::Right),
            ]);
        }
        out.push_str(&table.to_string());
        out
    }

    fn format_profile(&self, ticker: &str, profile: Option<&CompanyProfile>) -> String {
        let Some(p) = profile else {
            return format!("Unable to fetch company information for {ticker}");
        };

        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
        let money = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |v| format!("${v:.2}"));

        let mut table = Self::table(&["Field", "Value"]);
        table
            .add_row(vec!["Company Name".to_string(), text(&p.name)])
            .add_row(vec!["Sector".to_string(), text(&p.sector)])
            .add_row(vec!["Industry".to_string(), text(&p.industry)])
            .add_row(vec!["Country".to_string(), text(&p.country)])
            .add_row(vec!["Exchange".to_string(), text(&p.exchange)])
            .add_row(vec!["Currency".to_string(), text(&p.currency)])
            .add_row(vec![
                "Market Cap".to_string(),
                p.market_cap.map_or_else(
                    || "N/A".to_string(),
                    |v| format!("${}", group_thousands(&format!("{v:.2}"))),
                ),
            ])
            .add_row(vec![
                "P/E Ratio".to_string(),
                p.pe_ratio
                    .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}")),
            ])
            .add_row(vec![
                "Dividend Yield".to_string(),
                p.dividend_yield
                    .map_or_else(|| "N/A".to_string(), |v| format!("{:.2}%", v * 100.0)),
            ])
            .add_row(vec!["52-Week High".to_string(), money(p.fifty_two_week_high)])
            .add_row(vec!["52-Week Low".to_string(), money(p.fifty_two_week_low)]);

        format!(
            "{ticker} Company Overview\n{table}\n\nBusiness Summary\n{}",
            p.summary
                .as_deref()
                .unwrap_or("No business summary available.")
        )
    }

    fn format_metrics(
        &self,
        ticker: &str,
        metrics: &PerformanceMetrics,
        histogram: &[HistogramBin],
    ) -> String {
        let mut table = Self::table(&["Metric", "Value"]);
        for (label, value) in [
            ("Daily Returns", format!("{:.2}%", metrics.daily_return)),
            ("Monthly Returns", format!("{:.2}%", metrics.monthly_return)),
            ("YTD Returns", format!("{:.2}%", metrics.ytd_return)),
            ("Annual Returns", format!("{:.2}%", metrics.annual_return)),
            ("Volatility (Annual)", format!("{:.2}%", metrics.volatility)),
            ("Sharpe Ratio", format!("{:.2}", metrics.sharpe_ratio)),
        ] {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(value).set_alignment(CellAlignment::Right),
            ]);
        }

        let mut out = format!("{ticker} Performance Metrics\n{table}\n");

        let peak = histogram.iter().map(|b| b.count).max().unwrap_or(0);
        if peak > 0 {
            out.push_str("\nDaily Returns Distribution (%)\n");
            for bin in histogram {
                let width = bin.count * HISTOGRAM_WIDTH / peak;
                out.push_str(&format!(
                    "{:>8.2} .. {:>8.2} | {:<w$} {}\n",
                    bin.lower,
                    bin.upper,
                    "█".repeat(width),
                    bin.count,
                    w = HISTOGRAM_WIDTH,
                ));
            }
        }
        out
    }

    fn format_no_data(&self, ticker: &str) -> String {
        no_data_message(ticker)
    }

    fn format_list(&self, title: &str, items: &[String]) -> String {
        if items.is_empty() {
            return format!("{title}: (none)");
        }
        format!("{title}: {}", items.join(", "))
    }

    fn format_preferences(&self, prefs: &UserPreferences) -> String {
        let mut table = Self::table(&["Preference", "Value"]);
        table
            .add_row(vec!["User", prefs.user_id.as_str()])
            .add_row(vec!["Default Ticker", prefs.default_ticker.as_str()])
            .add_row(vec!["Default Period", prefs.default_period.label()])
            .add_row(vec!["Theme", prefs.theme.as_str()])
            .add_row(vec!["50-Day MA", if prefs.show_ma50 { "on" } else { "off" }])
            .add_row(vec!["200-Day MA", if prefs.show_ma200 { "on" } else { "off" }]);
        table.to_string()
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("❌ Error: {error}")
    }

    fn format_help(&self) -> String {
        super::Command::help_text().to_string()
    }
}

/// Pretty-printed JSON output, one document per response
pub struct JsonFormatter;

impl JsonFormatter {
    fn render(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            json!({ "error": e.to_string() }).to_string()
        })
    }
}

impl Formatter for JsonFormatter {
    fn format_session(&self, session: &SessionContext) -> String {
        Self::render(&json!({ "session": session }))
    }

    fn format_chart(&self, chart: &ChartData, recent_bars: usize) -> String {
        if chart.candles.is_empty() {
            return self.format_no_data(&chart.ticker);
        }
        let skip = chart.candles.len().saturating_sub(recent_bars);
        Self::render(&json!({
            "chart": chart,
            "recent": &chart.candles[skip..],
        }))
    }

    fn format_profile(&self, ticker: &str, profile: Option<&CompanyProfile>) -> String {
        Self::render(&json!({ "ticker": ticker, "profile": profile }))
    }

    fn format_metrics(
        &self,
        ticker: &str,
        metrics: &PerformanceMetrics,
        histogram: &[HistogramBin],
    ) -> String {
        Self::render(&json!({
            "ticker": ticker,
            "metrics": metrics,
            "histogram": histogram,
        }))
    }

    fn format_no_data(&self, ticker: &str) -> String {
        Self::render(&json!({ "ticker": ticker, "message": no_data_message(ticker) }))
    }

    fn format_list(&self, title: &str, items: &[String]) -> String {
        Self::render(&json!({ "title": title, "items": items }))
    }

    fn format_preferences(&self, prefs: &UserPreferences) -> String {
        Self::render(&json!({ "preferences": prefs }))
    }

    fn format_message(&self, message: &str) -> String {
        Self::render(&json!({ "message": message }))
    }

    fn format_error(&self, error: &str) -> String {
        Self::render(&json!({ "error": error }))
    }

    fn format_help(&self) -> String {
        Self::render(&json!({ "help": super::Command::help_text() }))
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(json: bool) -> Box<dyn Formatter> {
        if json {
            Box::new(JsonFormatter)
        } else {
            Box::new(CliFormatter)
        }
    }
}

/// Insert `,` separators into the integer part of a formatted number
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
