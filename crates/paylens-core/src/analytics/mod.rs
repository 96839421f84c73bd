//! Temporal analytics engine
//!
//! Turns one payee's ordered transaction history into:
//! - Descriptive spending statistics (`stats`)
//! - Cadence, seasonality, and weekday patterns (`patterns`)
//! - A next-occurrence prediction (`predict`)
//! - A budget allocation suggestion (`budget`)
//! - A composite confidence score (`confidence`)
//!
//! Every operation is a pure function of its input collection; the engine
//! holds configuration only and never retains data between calls.

pub mod budget;
pub mod confidence;
pub mod patterns;
pub mod predict;
pub mod stats;
pub mod types;

use serde::{Deserialize, Serialize};

use crate::models::TransactionPoint;

pub use budget::suggest_budget;
pub use confidence::score_confidence;
pub use patterns::{detect_frequency, detect_seasonality, detect_weekday_pattern, IntervalSet};
pub use predict::predict_next;
pub use stats::analyze_spending;
pub use types::{
    AmountRange, BudgetSuggestion, ConfidenceBand, ConfidenceReport, FrequencyClass,
    FrequencyProfile, IntervalCluster, Outlier, PredictionMethod, PredictionResult,
    PredictionScenario, Quartiles, ScenarioKind, SeasonalAdjustment, SeasonalProfile,
    SpendingStatistics, TrendDirection, UnusualGap, WeekdayProfile,
};

/// Analyzer configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Transaction count at which the budget confidence stops scaling up
    pub budget_target_count: usize,
    /// How far a seasonal multiplier must sit from 1.0 before a budget
    /// adjustment is emitted for that month
    pub seasonal_multiplier_epsilon: f64,
    /// Placeholder accuracy of past predictions; not yet wired to real
    /// feedback, kept overridable until it is
    pub historical_accuracy: f64,
    /// Placeholder weight for external influences on prediction accuracy
    pub external_factors: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            budget_target_count: 20,
            seasonal_multiplier_epsilon: 0.05,
            historical_accuracy: 0.7,
            external_factors: 0.75,
        }
    }
}

/// Everything the engine knows about one payee, computed in one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayeeReport {
    pub payee_id: String,
    pub statistics: SpendingStatistics,
    pub frequency: FrequencyProfile,
    pub seasonality: Vec<SeasonalProfile>,
    pub weekdays: Vec<WeekdayProfile>,
    pub prediction: PredictionResult,
    pub budget: BudgetSuggestion,
    pub confidence: ConfidenceReport,
}

/// Facade over the analytics operations, carrying the configuration.
pub struct PayeeAnalyzer {
    config: AnalyzerConfig,
}

impl PayeeAnalyzer {
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
        }
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn analyze_spending(
        &self,
        payee_id: &str,
        points: &[TransactionPoint],
    ) -> SpendingStatistics {
        analyze_spending(payee_id, points)
    }

    pub fn detect_frequency(&self, payee_id: &str, points: &[TransactionPoint]) -> FrequencyProfile {
        detect_frequency(payee_id, points)
    }

    pub fn detect_seasonality(
        &self,
        payee_id: &str,
        points: &[TransactionPoint],
    ) -> Vec<SeasonalProfile> {
        detect_seasonality(payee_id, points)
    }

    pub fn detect_weekday_pattern(
        &self,
        payee_id: &str,
        points: &[TransactionPoint],
    ) -> Vec<WeekdayProfile> {
        detect_weekday_pattern(payee_id, points)
    }

    pub fn predict_next(&self, payee_id: &str, points: &[TransactionPoint]) -> PredictionResult {
        predict_next(payee_id, points)
    }

    pub fn suggest_budget(
        &self,
        payee_id: &str,
        points: &[TransactionPoint],
        category_usage: Option<f64>,
    ) -> BudgetSuggestion {
        suggest_budget(payee_id, points, category_usage, &self.config)
    }

    pub fn score_confidence(&self, payee_id: &str, points: &[TransactionPoint]) -> ConfidenceReport {
        score_confidence(payee_id, points, &self.config)
    }

    /// Run every analysis over the same collection.
    pub fn analyze_payee(&self, payee_id: &str, points: &[TransactionPoint]) -> PayeeReport {
        PayeeReport {
            payee_id: payee_id.to_string(),
            statistics: self.analyze_spending(payee_id, points),
            frequency: self.detect_frequency(payee_id, points),
            seasonality: self.detect_seasonality(payee_id, points),
            weekdays: self.detect_weekday_pattern(payee_id, points),
            prediction: self.predict_next(payee_id, points),
            budget: self.suggest_budget(payee_id, points, None),
            confidence: self.score_confidence(payee_id, points),
        }
    }
}

impl Default for PayeeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
