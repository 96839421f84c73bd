//! Budget allocation advisor

use tracing::debug;

use crate::models::TransactionPoint;

use super::confidence::data_quality_score;
use super::patterns::{detect_frequency, detect_seasonality};
use super::stats::analyze_spending;
use super::types::{AmountRange, BudgetSuggestion, SeasonalAdjustment};
use super::AnalyzerConfig;

/// Average days per calendar month, used to project a daily rate.
const DAYS_PER_MONTH: f64 = 30.44;

/// Suggest a monthly allocation for one payee.
///
/// The rate comes from total spend over the observed span when the history
/// covers more than one day; single-day histories fall back to a
/// weekly-frequency estimate (mean x 4). `category_usage` is the payee's
/// share of its category spend, supplied by the caller and used only for
/// the rationale text.
pub fn suggest_budget(
    payee_id: &str,
    points: &[TransactionPoint],
    category_usage: Option<f64>,
    config: &AnalyzerConfig,
) -> BudgetSuggestion {
    let stats = analyze_spending(payee_id, points);
    let frequency = detect_frequency(payee_id, points);

    let monthly_allocation = if stats.span_days > 0 {
        (stats.total / stats.span_days as f64) * DAYS_PER_MONTH
    } else {
        // No span to project from; assume a weekly cadence
        stats.mean * 4.0
    };

    let spread = stats.volatility * monthly_allocation;
    let range = AmountRange {
        low: monthly_allocation - spread.abs(),
        high: monthly_allocation + spread.abs(),
    };

    let sample_factor = (stats.count as f64 / config.budget_target_count as f64).min(1.0);
    let confidence = data_quality_score(&stats, &frequency) * sample_factor;

    let seasonal_adjustments: Vec<SeasonalAdjustment> = detect_seasonality(payee_id, points)
        .iter()
        .filter(|s| (s.multiplier - 1.0).abs() > config.seasonal_multiplier_epsilon)
        .map(|s| SeasonalAdjustment {
            month: s.month,
            multiplier: s.multiplier,
            adjusted_allocation: monthly_allocation * s.multiplier,
        })
        .collect();

    let mut rationale = if stats.span_days > 0 {
        format!(
            "{:.2}/day over {} days, projected to {:.2}/month",
            stats.total / stats.span_days as f64,
            stats.span_days,
            monthly_allocation
        )
    } else {
        "Single-day history; assuming a weekly cadence".to_string()
    };
    if let Some(usage) = category_usage {
        rationale.push_str(&format!("; covers {:.0}% of its category", usage * 100.0));
    }

    debug!(
        payee = payee_id,
        monthly_allocation,
        confidence,
        adjustments = seasonal_adjustments.len(),
        "Budget suggested"
    );

    BudgetSuggestion {
        monthly_allocation,
        range,
        confidence,
        seasonal_adjustments,
        rationale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn monthly_points(n: usize, amount: f64) -> Vec<TransactionPoint> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        (0..n)
            .map(|i| TransactionPoint {
                date: start + Duration::days(30 * i as i64),
                amount,
            })
            .collect()
    }

    #[test]
    fn test_monthly_allocation_from_span() {
        let points = monthly_points(7, 30.0);
        let suggestion = suggest_budget("acme", &points, None, &AnalyzerConfig::default());

        // 210 over 180 days, projected to ~35.5/month
        let expected = (210.0 / 180.0) * DAYS_PER_MONTH;
        assert!((suggestion.monthly_allocation - expected).abs() < 1e-9);
        assert!(suggestion.confidence > 0.0);
        // Steady amounts produce a degenerate range
        assert_eq!(suggestion.range.low, suggestion.range.high);
    }

    #[test]
    fn test_zero_span_falls_back_to_weekly() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = vec![
            TransactionPoint { date, amount: 10.0 },
            TransactionPoint { date, amount: 20.0 },
        ];
        let suggestion = suggest_budget("acme", &points, None, &AnalyzerConfig::default());
        assert!((suggestion.monthly_allocation - 15.0 * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history() {
        let suggestion = suggest_budget("acme", &[], None, &AnalyzerConfig::default());
        assert_eq!(suggestion.monthly_allocation, 0.0);
        assert_eq!(suggestion.confidence, 0.0);
        assert!(suggestion.seasonal_adjustments.is_empty());
    }

    #[test]
    fn test_seasonal_adjustments_only_for_deviating_months() {
        let mut points = monthly_points(12, 30.0);
        // December spike
        points.push(TransactionPoint {
            date: NaiveDate::from_ymd_opt(2023, 12, 20).unwrap(),
            amount: 300.0,
        });
        points.sort_by_key(|p| p.date);

        let suggestion = suggest_budget("acme", &points, None, &AnalyzerConfig::default());
        assert!(!suggestion.seasonal_adjustments.is_empty());
        let december = suggestion
            .seasonal_adjustments
            .iter()
            .find(|a| a.month == 12)
            .expect("december deviates");
        assert!(december.multiplier > 1.0);
        assert!(december.adjusted_allocation > suggestion.monthly_allocation);
    }

    #[test]
    fn test_category_usage_in_rationale() {
        let points = monthly_points(4, 30.0);
        let suggestion = suggest_budget("acme", &points, Some(0.42), &AnalyzerConfig::default());
        assert!(suggestion.rationale.contains("42%"));
    }
}
