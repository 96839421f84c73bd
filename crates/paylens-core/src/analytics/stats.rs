//! Spending statistics analyzer
//!
//! Turns one payee's ordered transaction history into descriptive
//! statistics: central tendency, spread, quartiles, linear trend,
//! volatility, and outliers.

use tracing::debug;

use crate::models::TransactionPoint;

use super::types::{Outlier, Quartiles, SpendingStatistics, TrendDirection};

/// Slope magnitudes below this count as a flat trend.
const STABLE_SLOPE_EPSILON: f64 = 0.01;

/// At most this many outliers are reported, most extreme first.
const MAX_OUTLIERS: usize = 10;

/// Analyze one payee's history. Empty input yields the neutral struct.
pub fn analyze_spending(payee_id: &str, points: &[TransactionPoint]) -> SpendingStatistics {
    if points.is_empty() {
        return SpendingStatistics::empty();
    }

    let amounts: Vec<f64> = points.iter().map(|p| p.amount).collect();
    let count = amounts.len();
    let total: f64 = amounts.iter().sum();
    let mean = total / count as f64;
    let std_dev = population_std_dev(&amounts, mean);

    let mut sorted = amounts.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let min = sorted[0];
    let max = sorted[count - 1];

    let quartiles = Quartiles {
        q1: quartile(&sorted, 0.25),
        q2: quartile(&sorted, 0.50),
        q3: quartile(&sorted, 0.75),
    };

    let (trend, trend_strength) = linear_trend(&amounts);

    // Coefficient of variation; a zero mean would divide by zero, so it
    // degrades to 0 instead.
    let volatility = if mean == 0.0 {
        0.0
    } else {
        (std_dev / mean.abs()).clamp(0.0, 1.0)
    };

    let outliers = find_outliers(points, mean, std_dev);

    let first_date = points.first().map(|p| p.date);
    let last_date = points.last().map(|p| p.date);
    let span_days = match (first_date, last_date) {
        (Some(first), Some(last)) => (last - first).num_days(),
        _ => 0,
    };

    debug!(
        payee = payee_id,
        count,
        mean,
        std_dev,
        outliers = outliers.len(),
        "Spending statistics computed"
    );

    SpendingStatistics {
        count,
        total,
        mean,
        median: median_of_sorted(&sorted),
        std_dev,
        min,
        max,
        quartiles,
        trend,
        trend_strength,
        volatility,
        outliers,
        first_date,
        last_date,
        span_days,
    }
}

/// Population standard deviation (divide by N, not N-1).
pub(crate) fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Median of an already-sorted slice: middle element for odd lengths,
/// average of the two middle elements for even lengths.
pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Percentile cut by index `floor(p * N)` on the sorted slice.
fn quartile(sorted: &[f64], p: f64) -> f64 {
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Ordinary least-squares fit of amount against transaction index.
///
/// Returns the trend direction (stable when |slope| is under the epsilon)
/// and strength = |R^2| clamped to [0, 1]. A single point or a constant
/// series fits nothing and reports stable/0.
fn linear_trend(amounts: &[f64]) -> (TrendDirection, f64) {
    let n = amounts.len();
    if n < 2 {
        return (TrendDirection::Stable, 0.0);
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = amounts.iter().sum::<f64>() / n_f;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    for (i, &y) in amounts.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = y - mean_y;
        ss_xy += dx * dy;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
    }

    let slope = ss_xy / ss_xx;

    let direction = if slope.abs() < STABLE_SLOPE_EPSILON {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    // R^2 is undefined for a constant series
    let strength = if ss_yy == 0.0 {
        0.0
    } else {
        ((ss_xy * ss_xy) / (ss_xx * ss_yy)).abs().clamp(0.0, 1.0)
    };

    (direction, strength)
}

/// Points beyond two standard deviations from the mean, sorted descending
/// by deviation score and capped to the most extreme few.
fn find_outliers(points: &[TransactionPoint], mean: f64, std_dev: f64) -> Vec<Outlier> {
    if std_dev == 0.0 {
        return Vec::new();
    }

    let mut outliers: Vec<Outlier> = points
        .iter()
        .filter_map(|p| {
            let deviation = (p.amount - mean).abs() / std_dev;
            if deviation > 2.0 {
                Some(Outlier {
                    date: p.date,
                    amount: p.amount,
                    deviation,
                })
            } else {
                None
            }
        })
        .collect();

    outliers.sort_by(|a, b| {
        b.deviation
            .partial_cmp(&a.deviation)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    outliers.truncate(MAX_OUTLIERS);
    outliers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(year: i32, month: u32, day: u32, amount: f64) -> TransactionPoint {
        TransactionPoint {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            amount,
        }
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let stats = analyze_spending("acme", &[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total, 0.0);
        assert!(stats.first_date.is_none());
    }

    #[test]
    fn test_single_point_has_no_spread() {
        let stats = analyze_spending("acme", &[point(2024, 1, 1, 42.0)]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.volatility, 0.0);
        assert_eq!(stats.trend, TrendDirection::Stable);
        assert!(stats.outliers.is_empty());
        assert_eq!(stats.span_days, 0);
    }

    #[test]
    fn test_mean_times_count_equals_sum() {
        let points = vec![
            point(2024, 1, 1, 50.0),
            point(2024, 2, 1, 50.0),
            point(2024, 3, 3, 52.0),
        ];
        let stats = analyze_spending("netflix", &points);
        assert!((stats.mean * stats.count as f64 - stats.total).abs() < 1e-9);
        assert!((stats.mean - 50.666666).abs() < 1e-4);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median_of_sorted(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median_of_sorted(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_outliers_subset_and_capped() {
        let mut points: Vec<TransactionPoint> =
            (1..=28).map(|d| point(2024, 1, d, 10.0)).collect();
        points.push(point(2024, 1, 29, 500.0));
        let stats = analyze_spending("acme", &points);
        assert_eq!(stats.outliers.len(), 1);
        assert_eq!(stats.outliers[0].amount, 500.0);
        assert!(stats.outliers[0].deviation > 2.0);
    }

    #[test]
    fn test_no_outliers_when_std_dev_zero() {
        let points = vec![point(2024, 1, 1, 10.0), point(2024, 2, 1, 10.0)];
        let stats = analyze_spending("acme", &points);
        assert_eq!(stats.std_dev, 0.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_increasing_trend() {
        let points: Vec<TransactionPoint> =
            (1..=6).map(|i| point(2024, i, 1, 10.0 * i as f64)).collect();
        let stats = analyze_spending("acme", &points);
        assert_eq!(stats.trend, TrendDirection::Increasing);
        assert!(stats.trend_strength > 0.99);
    }

    #[test]
    fn test_volatility_clamped() {
        // Wildly varying amounts push CV past 1; it must clamp
        let points = vec![
            point(2024, 1, 1, 1.0),
            point(2024, 2, 1, 1000.0),
            point(2024, 3, 1, 1.0),
        ];
        let stats = analyze_spending("acme", &points);
        assert!(stats.volatility <= 1.0);
    }

    #[test]
    fn test_volatility_zero_when_mean_zero() {
        let points = vec![point(2024, 1, 1, -50.0), point(2024, 2, 1, 50.0)];
        let stats = analyze_spending("acme", &points);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.volatility, 0.0);
    }

    #[test]
    fn test_quartiles_by_index() {
        let points: Vec<TransactionPoint> =
            (1..=4).map(|i| point(2024, i, 1, i as f64)).collect();
        let stats = analyze_spending("acme", &points);
        // floor(0.25*4)=1, floor(0.5*4)=2, floor(0.75*4)=3 on [1,2,3,4]
        assert_eq!(stats.quartiles.q1, 2.0);
        assert_eq!(stats.quartiles.q2, 3.0);
        assert_eq!(stats.quartiles.q3, 4.0);
    }
}
