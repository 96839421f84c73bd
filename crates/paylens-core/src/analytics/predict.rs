//! Next-occurrence prediction
//!
//! A per-call decision sequence over the available signals: bail out on
//! tiny histories, anchor on the cadence when it is confident, then let a
//! matching seasonal profile sharpen the result.

use chrono::Duration;
use tracing::debug;

use crate::models::TransactionPoint;

use super::patterns::{detect_frequency, detect_seasonality};
use super::stats::analyze_spending;
use super::types::{
    AmountRange, PredictionMethod, PredictionResult, PredictionScenario, ScenarioKind,
};

/// Minimum cadence confidence required to anchor a date estimate.
const FREQUENCY_CONFIDENCE_GATE: f64 = 0.5;

/// Minimum seasonal confidence required to adjust the prediction.
const SEASONAL_CONFIDENCE_GATE: f64 = 0.3;

/// Maximum relative boost a seasonal match can add.
const SEASONAL_BOOST: f64 = 0.3;

/// Illustrative scenario probabilities; heuristic, not a distribution fit.
const EARLY_LATE_PROBABILITY: f64 = 0.25;
const HIGH_AMOUNT_PROBABILITY: f64 = 0.15;

/// Predict the payee's next transaction.
///
/// Fewer than two points is a terminal insufficient-data result. A cadence
/// below the confidence gate keeps the amount estimate but carries no date.
pub fn predict_next(payee_id: &str, points: &[TransactionPoint]) -> PredictionResult {
    if points.len() < 2 {
        return PredictionResult::insufficient_data();
    }

    let stats = analyze_spending(payee_id, points);
    let frequency = detect_frequency(payee_id, points);

    let amount_range = AmountRange {
        low: (stats.mean - stats.std_dev).max(0.0),
        high: stats.mean + stats.std_dev,
    };

    if frequency.confidence <= FREQUENCY_CONFIDENCE_GATE {
        return PredictionResult {
            next_date: None,
            predicted_amount: stats.mean,
            amount_range,
            confidence: 0.0,
            method: PredictionMethod::InsufficientData,
            rationale: format!(
                "Cadence confidence {:.2} is too low for a date estimate",
                frequency.confidence
            ),
            scenarios: Vec::new(),
        };
    }

    let last_date = points[points.len() - 1].date;
    let interval_days = frequency.mean_interval_days.round() as i64;
    let next_date = last_date + Duration::days(interval_days);

    let mut method = PredictionMethod::FrequencyBased;
    let mut confidence = (frequency.confidence * frequency.regularity).clamp(0.0, 1.0);
    let mut rationale = format!(
        "Recurs roughly every {} days ({}); last seen {}",
        interval_days,
        frequency.class.as_str(),
        last_date
    );

    // A confident seasonal profile for the predicted month sharpens the
    // estimate and scales the confidence up by at most 30%.
    use chrono::Datelike;
    let seasonality = detect_seasonality(payee_id, points);
    if let Some(seasonal) = seasonality
        .iter()
        .find(|s| s.month == next_date.month() && s.confidence > SEASONAL_CONFIDENCE_GATE)
    {
        confidence = (confidence * (1.0 + SEASONAL_BOOST * seasonal.confidence)).clamp(0.0, 1.0);
        method = PredictionMethod::SeasonalBased;
        rationale.push_str(&format!(
            "; month {} historically runs {:.0}% of the yearly mean",
            seasonal.month,
            seasonal.multiplier * 100.0
        ));
    }

    let mut scenarios = Vec::new();
    let interval_jitter = frequency.interval_std_dev.round() as i64;
    if interval_jitter >= 1 {
        scenarios.push(PredictionScenario {
            kind: ScenarioKind::Early,
            date: Some(next_date - Duration::days(interval_jitter)),
            amount: stats.mean,
            probability: EARLY_LATE_PROBABILITY,
        });
        scenarios.push(PredictionScenario {
            kind: ScenarioKind::Late,
            date: Some(next_date + Duration::days(interval_jitter)),
            amount: stats.mean,
            probability: EARLY_LATE_PROBABILITY,
        });
    }
    if stats.std_dev > 0.0 {
        scenarios.push(PredictionScenario {
            kind: ScenarioKind::HighAmount,
            date: Some(next_date),
            amount: stats.mean + stats.std_dev,
            probability: HIGH_AMOUNT_PROBABILITY,
        });
    }

    debug!(
        payee = payee_id,
        next = %next_date,
        method = method.as_str(),
        confidence,
        "Prediction generated"
    );

    PredictionResult {
        next_date: Some(next_date),
        predicted_amount: stats.mean,
        amount_range,
        confidence,
        method,
        rationale,
        scenarios,
    }
}
