//! Paylens Core Library
//!
//! Shared functionality for the Paylens payee analytics tool:
//! - Temporal analytics over per-payee transaction histories
//!   (statistics, cadence/seasonality detection, prediction, budgets,
//!   confidence scoring)
//! - Fuzzy duplicate detection over payee contact records
//! - The edit-distance similarity primitive both engines share
//!
//! Everything here is pure and synchronous: the engines consume read-only
//! collections supplied by the caller and produce report structs, holding
//! no state beyond their configuration.

pub mod analytics;
pub mod dedupe;
pub mod error;
pub mod models;
pub mod similarity;

pub use analytics::{
    AnalyzerConfig, BudgetSuggestion, ConfidenceBand, ConfidenceReport, FrequencyClass,
    FrequencyProfile, IntervalSet, PayeeAnalyzer, PayeeReport, PredictionMethod,
    PredictionResult, SeasonalProfile, SpendingStatistics, TrendDirection, WeekdayProfile,
};
pub use dedupe::{
    DedupeConfig, DuplicateAction, DuplicateCandidate, DuplicateDetector, FieldPolicy,
    FieldResolution, FieldSimilarity, MatchField, MatchType, RiskLevel,
};
pub use error::{Error, Result};
pub use models::{ContactAddress, ContactRecord, TransactionPoint};
pub use similarity::{edit_distance, similarity};
