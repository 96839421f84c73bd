//! Report types produced by the temporal analytics engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Detected nominal transaction cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyClass {
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    Annual,
    /// Recurring but not matching any known cadence band
    Irregular,
    /// Not enough history to classify
    None,
}

impl FrequencyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyClass::Weekly => "weekly",
            FrequencyClass::BiWeekly => "bi_weekly",
            FrequencyClass::Monthly => "monthly",
            FrequencyClass::Quarterly => "quarterly",
            FrequencyClass::Annual => "annual",
            FrequencyClass::Irregular => "irregular",
            FrequencyClass::None => "none",
        }
    }
}

impl fmt::Display for FrequencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FrequencyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(FrequencyClass::Weekly),
            "bi_weekly" | "biweekly" => Ok(FrequencyClass::BiWeekly),
            "monthly" => Ok(FrequencyClass::Monthly),
            "quarterly" => Ok(FrequencyClass::Quarterly),
            "annual" | "yearly" => Ok(FrequencyClass::Annual),
            "irregular" => Ok(FrequencyClass::Irregular),
            "none" => Ok(FrequencyClass::None),
            _ => Err(format!("Unknown frequency class: {}", s)),
        }
    }
}

/// Direction of the linear amount trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive low/high amount band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub low: f64,
    pub high: f64,
}

/// Quartile cuts over the amount-sorted collection
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// A transaction flagged as more than two standard deviations from the mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub date: NaiveDate,
    pub amount: f64,
    /// Distance from the mean in standard deviations
    pub deviation: f64,
}

/// Descriptive statistics for one payee's transaction history.
///
/// Every field is recomputed from the input collection on each call; an
/// empty history yields the neutral struct from [`SpendingStatistics::empty`]
/// rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingStatistics {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divide by N)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub quartiles: Quartiles,
    pub trend: TrendDirection,
    /// Clamped |R^2| of the least-squares fit
    pub trend_strength: f64,
    /// Coefficient of variation clamped to [0, 1]
    pub volatility: f64,
    /// At most the 10 most extreme outliers, descending by deviation
    pub outliers: Vec<Outlier>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub span_days: i64,
}

impl SpendingStatistics {
    /// Neutral all-zero statistics for an empty history.
    pub fn empty() -> Self {
        Self {
            count: 0,
            total: 0.0,
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            quartiles: Quartiles::default(),
            trend: TrendDirection::Stable,
            trend_strength: 0.0,
            volatility: 0.0,
            outliers: Vec::new(),
            first_date: None,
            last_date: None,
            span_days: 0,
        }
    }
}

/// A bucket of similar day-gaps found by the greedy interval clusterer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalCluster {
    pub mean_days: f64,
    pub count: usize,
}

/// A consecutive gap long enough to break the payee's usual rhythm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusualGap {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub gap_days: i64,
    /// Heuristic explanation based on gap length and calendar position
    pub likely_cause: String,
}

/// Detected cadence profile for one payee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyProfile {
    pub class: FrequencyClass,
    pub confidence: f64,
    pub mean_interval_days: f64,
    pub interval_std_dev: f64,
    /// 1 minus the coefficient of variation of the intervals, floored at 0
    pub regularity: f64,
    /// Regularity blended with how well the mean interval fits its band
    pub predictability: f64,
    /// Clusters with at least two member intervals
    pub clusters: Vec<IntervalCluster>,
    /// Gaps exceeding max(60, 2 * mean interval) days, longest first
    pub unusual_gaps: Vec<UnusualGap>,
}

impl FrequencyProfile {
    /// Profile for a history too short to analyze (< 2 points).
    pub fn none() -> Self {
        Self {
            class: FrequencyClass::None,
            confidence: 0.0,
            mean_interval_days: 0.0,
            interval_std_dev: 0.0,
            regularity: 0.0,
            predictability: 0.0,
            clusters: Vec::new(),
            unusual_gaps: Vec::new(),
        }
    }
}

/// Per-calendar-month aggregate for one payee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile {
    /// Calendar month, 1-12
    pub month: u32,
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    /// This month's share of the yearly total
    pub share_of_year: f64,
    /// Monthly mean relative to the yearly mean
    pub multiplier: f64,
    /// Weighted by sample size (cap 10) and distinct-month coverage (cap 6)
    pub confidence: f64,
}

/// Per-weekday aggregate, keyed 0-6 from Monday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayProfile {
    /// 0 = Monday .. 6 = Sunday
    pub weekday: u32,
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    /// Count relative to the busiest weekday
    pub preference: f64,
}

/// How the prediction engine arrived at its estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    InsufficientData,
    FrequencyBased,
    SeasonalBased,
}

impl PredictionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionMethod::InsufficientData => "insufficient_data",
            PredictionMethod::FrequencyBased => "frequency_based",
            PredictionMethod::SeasonalBased => "seasonal_based",
        }
    }
}

impl fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Alternative outcome attached to a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Early,
    Late,
    HighAmount,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Early => "early",
            ScenarioKind::Late => "late",
            ScenarioKind::HighAmount => "high_amount",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionScenario {
    pub kind: ScenarioKind,
    pub date: Option<NaiveDate>,
    pub amount: f64,
    /// Fixed illustrative probability, not a distribution fit
    pub probability: f64,
}

/// Next-occurrence estimate for one payee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub next_date: Option<NaiveDate>,
    pub predicted_amount: f64,
    pub amount_range: AmountRange,
    pub confidence: f64,
    pub method: PredictionMethod,
    pub rationale: String,
    pub scenarios: Vec<PredictionScenario>,
}

impl PredictionResult {
    /// Terminal result when fewer than two transactions exist.
    pub fn insufficient_data() -> Self {
        Self {
            next_date: None,
            predicted_amount: 0.0,
            amount_range: AmountRange { low: 0.0, high: 0.0 },
            confidence: 0.0,
            method: PredictionMethod::InsufficientData,
            rationale: "Fewer than 2 transactions; no prediction possible".to_string(),
            scenarios: Vec::new(),
        }
    }
}

/// Budget adjustment emitted for a month whose multiplier deviates from 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalAdjustment {
    pub month: u32,
    pub multiplier: f64,
    pub adjusted_allocation: f64,
}

/// Suggested monthly budget allocation for one payee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSuggestion {
    pub monthly_allocation: f64,
    pub range: AmountRange,
    pub confidence: f64,
    pub seasonal_adjustments: Vec<SeasonalAdjustment>,
    pub rationale: String,
}

/// Overall confidence band derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
            ConfidenceBand::VeryLow => "very_low",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Composite confidence score with its three sub-scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceReport {
    /// Unweighted mean of the three sub-scores
    pub overall: f64,
    pub data_quality: f64,
    pub pattern_reliability: f64,
    pub prediction_accuracy: f64,
    pub band: ConfidenceBand,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_class_round_trip() {
        assert_eq!(FrequencyClass::BiWeekly.as_str(), "bi_weekly");
        assert_eq!(
            FrequencyClass::from_str("quarterly").unwrap(),
            FrequencyClass::Quarterly
        );
        assert!(FrequencyClass::from_str("fortnightly").is_err());
    }

    #[test]
    fn test_empty_statistics_is_neutral() {
        let stats = SpendingStatistics::empty();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.trend, TrendDirection::Stable);
        assert!(stats.outliers.is_empty());
        assert!(stats.first_date.is_none());
    }

    #[test]
    fn test_insufficient_prediction_is_terminal() {
        let p = PredictionResult::insufficient_data();
        assert!(p.next_date.is_none());
        assert_eq!(p.method, PredictionMethod::InsufficientData);
        assert_eq!(p.confidence, 0.0);
    }
}
