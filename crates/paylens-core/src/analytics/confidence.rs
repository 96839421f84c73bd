//! Composite confidence scoring
//!
//! Produces one overall score from three sub-scores: data quality,
//! pattern reliability, and prediction accuracy. Each sub-score is an
//! unweighted mean of its factors, and each factor is clamped to [0, 1]
//! before averaging, so a single wild input cannot drag a score outside
//! the band.

use tracing::debug;

use crate::models::TransactionPoint;

use super::patterns::{detect_frequency, detect_seasonality};
use super::stats::analyze_spending;
use super::types::{ConfidenceBand, ConfidenceReport, FrequencyProfile, SpendingStatistics};
use super::AnalyzerConfig;

/// Transaction count at which the sample-size factor saturates.
const FULL_SAMPLE_COUNT: f64 = 20.0;

/// History span (days) at which the time-span factor saturates.
const FULL_SPAN_DAYS: f64 = 365.0;

/// Outlier ratios are scaled by this before being subtracted, so a history
/// that is 20% outliers zeroes its factor.
const OUTLIER_PENALTY_SCALE: f64 = 5.0;

/// Score one payee's analyzability.
pub fn score_confidence(
    payee_id: &str,
    points: &[TransactionPoint],
    config: &AnalyzerConfig,
) -> ConfidenceReport {
    let stats = analyze_spending(payee_id, points);
    let frequency = detect_frequency(payee_id, points);
    let seasonality = detect_seasonality(payee_id, points);

    let data_quality = data_quality_score(&stats, &frequency);

    let mean_seasonal_confidence = if seasonality.is_empty() {
        0.0
    } else {
        seasonality.iter().map(|s| s.confidence).sum::<f64>() / seasonality.len() as f64
    };
    let pattern_reliability = unweighted_mean(&[
        frequency.confidence,
        1.0 - stats.volatility,
        mean_seasonal_confidence,
        stats.trend_strength,
    ]);

    // historical_accuracy and external_factors are acknowledged placeholder
    // constants; nothing feeds real prediction feedback back in yet
    let prediction_accuracy = unweighted_mean(&[
        config.historical_accuracy,
        config.external_factors,
        frequency.confidence,
    ]);

    let overall = unweighted_mean(&[data_quality, pattern_reliability, prediction_accuracy]);

    let band = if overall > 0.8 {
        ConfidenceBand::High
    } else if overall > 0.6 {
        ConfidenceBand::Medium
    } else if overall > 0.4 {
        ConfidenceBand::Low
    } else {
        ConfidenceBand::VeryLow
    };

    let explanation = explain(band, data_quality, pattern_reliability, prediction_accuracy);

    debug!(
        payee = payee_id,
        overall,
        band = band.as_str(),
        "Confidence scored"
    );

    ConfidenceReport {
        overall,
        data_quality,
        pattern_reliability,
        prediction_accuracy,
        band,
        explanation,
    }
}

/// Data-quality sub-score: sample size, time span, interval regularity,
/// and an outlier penalty. Shared with the budget advisor.
pub(crate) fn data_quality_score(
    stats: &SpendingStatistics,
    frequency: &FrequencyProfile,
) -> f64 {
    if stats.count == 0 {
        return 0.0;
    }
    let outlier_ratio = stats.outliers.len() as f64 / stats.count as f64;
    unweighted_mean(&[
        stats.count as f64 / FULL_SAMPLE_COUNT,
        stats.span_days as f64 / FULL_SPAN_DAYS,
        frequency.regularity,
        1.0 - outlier_ratio * OUTLIER_PENALTY_SCALE,
    ])
}

/// Mean of the factors, each clamped to [0, 1] first.
fn unweighted_mean(factors: &[f64]) -> f64 {
    factors.iter().map(|f| f.clamp(0.0, 1.0)).sum::<f64>() / factors.len() as f64
}

fn explain(band: ConfidenceBand, data_quality: f64, pattern: f64, prediction: f64) -> String {
    let label = match band {
        ConfidenceBand::High => "High confidence",
        ConfidenceBand::Medium => "Medium confidence",
        ConfidenceBand::Low => "Low confidence",
        ConfidenceBand::VeryLow => "Very low confidence",
    };

    let mut weak: Vec<&str> = Vec::new();
    if data_quality < 0.5 {
        weak.push("data quality");
    }
    if pattern < 0.5 {
        weak.push("pattern reliability");
    }
    if prediction < 0.5 {
        weak.push("prediction accuracy");
    }

    if weak.is_empty() {
        label.to_string()
    } else {
        format!("{}; weak factors: {}", label, weak.join(", "))
    }
}
