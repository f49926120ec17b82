//! Return and risk statistics over a price series
//!
//! All returns are percentages. Every ratio with a zero denominator yields 0
//! instead of infinity or NaN, so a degenerate series (empty, one bar, flat
//! prices) produces plain zeros.

use crate::models::PriceBar;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Trading days per year used for annualisation
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Bars looked back for the monthly return
pub const MONTHLY_LOOKBACK: usize = 30;

/// Performance statistics for one ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Last close vs the one before
    pub daily_return: f64,
    /// Last close vs 30 bars back (or the first bar)
    pub monthly_return: f64,
    /// Last close vs the first bar of the current year
    pub ytd_return: f64,
    /// Last close vs 252 bars back (or the first bar)
    pub annual_return: f64,
    /// Annualised standard deviation of daily returns
    pub volatility: f64,
    /// Annualised mean/std of daily returns, zero risk-free rate
    pub sharpe_ratio: f64,
    /// Daily returns, one per bar after the first
    pub returns: Vec<f64>,
}

impl PerformanceMetrics {
    /// Compute metrics with "current year" taken from the local clock
    pub fn calculate(bars: &[PriceBar]) -> Self {
        Self::calculate_as_of(bars, Local::now().date_naive())
    }

    /// Compute metrics with "current year" taken from `today`
    pub fn calculate_as_of(bars: &[PriceBar], today: NaiveDate) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let returns = daily_returns(&closes);

        let daily_return = returns.last().copied().unwrap_or(0.0);

        let monthly_return = if closes.len() >= MONTHLY_LOOKBACK {
            return_between(&closes, closes.len() - MONTHLY_LOOKBACK)
        } else {
            return_between(&closes, 0)
        };

        let annual_return = if closes.len() > TRADING_DAYS_PER_YEAR {
            return_between(&closes, closes.len() - TRADING_DAYS_PER_YEAR)
        } else {
            return_between(&closes, 0)
        };

        let ytd_return = NaiveDate::from_ymd_opt(today.year(), 1, 1)
            .map(|start_of_year| {
                let ytd: Vec<f64> = bars
                    .iter()
                    .filter(|b| b.date >= start_of_year)
                    .map(|b| b.close)
                    .collect();
                return_between(&ytd, 0)
            })
            .unwrap_or(0.0);

        let annualiser = (TRADING_DAYS_PER_YEAR as f64).sqrt();
        let std = sample_std(&returns);
        let volatility = std * annualiser;
        let sharpe_ratio = if std > 0.0 {
            mean(&returns) / std * annualiser
        } else {
            0.0
        };

        Self {
            daily_return,
            monthly_return,
            ytd_return,
            annual_return,
            volatility,
            sharpe_ratio,
            returns,
        }
    }
}

/// Percentage change between consecutive closes
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| pct_change(w[0], w[1]))
        .collect()
}

/// `(last / closes[from] - 1) * 100`, 0 when undefined
fn return_between(closes: &[f64], from: usize) -> f64 {
    match (closes.get(from), closes.last()) {
        (Some(&base), Some(&last)) => pct_change(base, last),
        _ => 0.0,
    }
}

fn pct_change(base: f64, value: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (value / base - 1.0) * 100.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Standard deviation with an n-1 denominator; 0 below two samples
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const EPS: f64 = 1e-9;

    fn bars_from(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
            })
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_example_series() {
        let bars = bars_from(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            &[100.0, 102.0, 101.0, 105.0, 103.0],
        );
        let m = PerformanceMetrics::calculate_as_of(&bars, today());

        assert!((m.daily_return - (103.0 / 105.0 - 1.0) * 100.0).abs() < EPS);
        assert!((m.daily_return + 1.904_761_904).abs() < 1e-6);
        assert_eq!(m.returns.len(), 4);
        // fewer than 30 bars: measured from the first close
        assert!((m.monthly_return - 3.0).abs() < EPS);
        assert!((m.annual_return - 3.0).abs() < EPS);
        assert!((m.ytd_return - 3.0).abs() < EPS);
        assert!(m.volatility > 0.0);
    }

    #[test]
    fn test_single_bar_is_all_zero() {
        let bars = bars_from(today(), &[42.0]);
        let m = PerformanceMetrics::calculate_as_of(&bars, today());

        assert_eq!(m.daily_return, 0.0);
        assert_eq!(m.monthly_return, 0.0);
        assert_eq!(m.ytd_return, 0.0);
        assert_eq!(m.annual_return, 0.0);
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert!(m.returns.is_empty());
    }

    #[test]
    fn test_empty_series() {
        let m = PerformanceMetrics::calculate_as_of(&[], today());
        assert_eq!(m, PerformanceMetrics::default());
    }

    #[test]
    fn test_flat_returns_have_zero_sharpe() {
        // constant growth of 10% per bar: every daily return is identical
        let closes: Vec<f64> = (0..10).map(|i| 100.0 * 1.1_f64.powi(i)).collect();
        let bars = bars_from(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), &closes);
        let m = PerformanceMetrics::calculate_as_of(&bars, today());

        assert!(m.volatility < 1e-6);
        let flat = bars_from(today(), &[50.0, 50.0, 50.0, 50.0]);
        let m = PerformanceMetrics::calculate_as_of(&flat, today());
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn test_two_bars_has_zero_volatility() {
        let bars = bars_from(today(), &[100.0, 110.0]);
        let m = PerformanceMetrics::calculate_as_of(&bars, today());
        assert!((m.daily_return - 10.0).abs() < EPS);
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn test_monthly_return_on_forty_bars() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + f64::from(i) * 1.5).collect();
        let bars = bars_from(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), &closes);
        let m = PerformanceMetrics::calculate_as_of(&bars, today());

        let expected = (closes[39] / closes[40 - 30] - 1.0) * 100.0;
        assert_eq!(m.monthly_return, expected);
    }

    #[test]
    fn test_annual_return_needs_more_than_252_bars() {
        let closes: Vec<f64> = (0..253).map(|i| 10.0 + f64::from(i)).collect();
        let bars = bars_from(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), &closes);
        let m = PerformanceMetrics::calculate_as_of(&bars, today());
        let expected = (closes[252] / closes[253 - 252] - 1.0) * 100.0;
        assert!((m.annual_return - expected).abs() < EPS);

        let m = PerformanceMetrics::calculate_as_of(&bars[..252], today());
        let expected = (closes[251] / closes[0] - 1.0) * 100.0;
        assert!((m.annual_return - expected).abs() < EPS);
    }

    #[test]
    fn test_ytd_before_current_year_is_zero() {
        let bars = bars_from(
            NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
            &[10.0, 11.0, 12.0, 13.0],
        );
        let m = PerformanceMetrics::calculate_as_of(&bars, today());
        assert_eq!(m.ytd_return, 0.0);
    }

    #[test]
    fn test_ytd_uses_only_current_year_bars() {
        let bars = bars_from(
            NaiveDate::from_ymd_opt(2023, 12, 30).unwrap(),
            &[10.0, 20.0, 40.0, 50.0],
        );
        // bars on Dec 30, Dec 31, Jan 1, Jan 2
        let m = PerformanceMetrics::calculate_as_of(&bars, today());
        assert!((m.ytd_return - 25.0).abs() < EPS);
    }

    #[test]
    fn test_zero_close_does_not_divide() {
        let bars = bars_from(today(), &[0.0, 5.0, 10.0]);
        let m = PerformanceMetrics::calculate_as_of(&bars, today());
        assert_eq!(m.returns[0], 0.0);
        assert!((m.returns[1] - 100.0).abs() < EPS);
        assert_eq!(m.monthly_return, 0.0);
        assert!(m.volatility.is_finite());
        assert!(m.sharpe_ratio.is_finite());
    }

    #[test]
    fn test_sample_std_and_sharpe() {
        let returns = [1.0, -1.0, 2.0, 0.0];
        let std = sample_std(&returns);
        // mean 0.5, squared deviations 0.25 + 2.25 + 2.25 + 0.25 = 5, / 3
        assert!((std - (5.0_f64 / 3.0).sqrt()).abs() < EPS);

        let closes = [100.0, 101.0, 99.99, 101.9898, 101.9898];
        let bars = bars_from(today(), &closes);
        let m = PerformanceMetrics::calculate_as_of(&bars, today());
        let r = daily_returns(&closes);
        let expected = mean(&r) / sample_std(&r) * 252.0_f64.sqrt();
        assert!((m.sharpe_ratio - expected).abs() < EPS);
        assert!((m.volatility - sample_std(&r) * 252.0_f64.sqrt()).abs() < EPS);
    }
}
