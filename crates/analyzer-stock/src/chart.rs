//! Chart series derived from a price history
//!
//! Nothing here is persisted; the dashboard rebuilds it on every render.

use crate::error::{Result, StockError};
use crate::models::PriceBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::{Next, indicators::SimpleMovingAverage};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A moving-average overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub window: usize,
    pub label: String,
    /// One value per bar, `None` until the window is full
    pub values: Vec<Option<f64>>,
}

impl Overlay {
    /// Latest defined value
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}

/// Everything the price view draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub ticker: String,
    /// Candlestick series
    pub candles: Vec<PriceBar>,
    /// Volume series, aligned with `candles`
    pub volume: Vec<u64>,
    pub overlays: Vec<Overlay>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ChartData {
    /// Build the price view for `bars`; each `(window, enabled)` pair adds an overlay
    pub fn build(
        ticker: impl Into<String>,
        bars: &[PriceBar],
        moving_averages: &[(usize, bool)],
    ) -> Result<Self> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let mut overlays = Vec::new();
        for &(window, enabled) in moving_averages {
            if enabled {
                overlays.push(Overlay {
                    window,
                    label: format!("{window}-Day MA"),
                    values: moving_average(&closes, window)?,
                });
            }
        }

        let min_price = bars.iter().map(|b| b.low).reduce(f64::min);
        let max_price = bars.iter().map(|b| b.high).reduce(f64::max);

        Ok(Self {
            ticker: ticker.into(),
            candles: bars.to_vec(),
            volume: bars.iter().map(|b| b.volume).collect(),
            overlays,
            start: bars.first().map(|b| b.date),
            end: bars.last().map(|b| b.date),
            min_price,
            max_price,
        })
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|b| b.close).collect()
    }
}

/// Rolling mean over `window` closes
pub fn moving_average(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut sma =
        SimpleMovingAverage::new(window).map_err(|e| StockError::Indicator(e.to_string()))?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let value = sma.next(close);
            (i + 1 >= window).then_some(value)
        })
        .collect())
}

/// One bar of the returns histogram, `[lower, upper)` except the last bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of `values` over their min..max range
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    if bins == 0 {
        return Vec::new();
    }

    if max == min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for v in finite {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }

    out
}

/// Unicode sparkline of `values`, averaged down to at most `width` cells
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let chunk = values.len().div_ceil(width);
    let points: Vec<f64> = values
        .chunks(chunk)
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect();

    let min = points.iter().copied().fold(f64::INFINITY, f64::min);
    let max = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    points
        .iter()
        .map(|&p| {
            if span <= 0.0 || !span.is_finite() {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                let level = ((p - min) / span * (SPARK_LEVELS.len() - 1) as f64).round();
                SPARK_LEVELS[(level as usize).min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: start + Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: (i as u64 + 1) * 100,
            })
            .collect()
    }

    #[test]
    fn test_moving_average_waits_for_full_window() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(ma.len(), 5);
        assert_eq!(ma[0], None);
        assert_eq!(ma[1], None);
        assert_eq!(ma[2], Some(2.0));
        assert_eq!(ma[3], Some(3.0));
        assert_eq!(ma[4], Some(4.0));
    }

    #[test]
    fn test_moving_average_longer_than_series() {
        let ma = moving_average(&[1.0, 2.0], 50).unwrap();
        assert!(ma.iter().all(Option::is_none));
    }

    #[test]
    fn test_moving_average_rejects_zero_window() {
        assert!(matches!(
            moving_average(&[1.0], 0),
            Err(StockError::Indicator(_))
        ));
    }

    #[test]
    fn test_chart_data_overlays_follow_toggles() {
        let data = ChartData::build("AAPL", &bars(&[10.0, 11.0, 12.0]), &[(2, true), (3, false)])
            .unwrap();
        assert_eq!(data.overlays.len(), 1);
        assert_eq!(data.overlays[0].label, "2-Day MA");
        assert_eq!(data.overlays[0].latest(), Some(11.5));
        assert_eq!(data.volume, vec![100, 200, 300]);
        assert_eq!(data.min_price, Some(9.0));
        assert_eq!(data.max_price, Some(13.0));
        assert_eq!(data.start, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_chart_data_empty() {
        let data = ChartData::build("AAPL", &[], &[(50, true)]).unwrap();
        assert!(data.candles.is_empty());
        assert_eq!(data.min_price, None);
        assert_eq!(data.overlays[0].latest(), None);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [-2.0, -1.0, 0.0, 0.5, 1.0, 2.0];
        let bins = histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].lower, -2.0);
        assert_eq!(bins[3].upper, 2.0);
        // the maximum lands in the last bin
        assert_eq!(bins[3].count, 2);
    }

    #[test]
    fn test_histogram_constant_and_empty() {
        let bins = histogram(&[1.5, 1.5, 1.5], 50);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);

        assert!(histogram(&[], 50).is_empty());
        assert!(histogram(&[f64::NAN], 50).is_empty());
    }

    #[test]
    fn test_sparkline() {
        let line = sparkline(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 8);
        assert_eq!(line, "▁▂▃▄▅▆▇█");

        let line = sparkline(&(0..100).map(f64::from).collect::<Vec<_>>(), 10);
        assert_eq!(line.chars().count(), 10);

        assert_eq!(sparkline(&[3.0, 3.0], 10), "▅▅");
        assert!(sparkline(&[], 10).is_empty());
    }
}
