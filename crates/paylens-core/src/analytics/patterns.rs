//! Temporal pattern detection
//!
//! Detects:
//! - Transaction cadence: classifies the mean day-gap against fixed
//!   frequency bands (weekly through annual)
//! - Interval clusters: buckets of similar gaps found by a greedy scan
//! - Unusual gaps: rhythm breaks annotated with a heuristic cause
//! - Seasonality: per-calendar-month aggregates and multipliers
//! - Weekday preference: the same aggregation keyed by day of week

use chrono::Datelike;
use tracing::debug;

use crate::models::TransactionPoint;

use super::stats::population_std_dev;
use super::types::{
    FrequencyClass, FrequencyProfile, IntervalCluster, SeasonalProfile, UnusualGap,
    WeekdayProfile,
};

/// A cadence band: class, minimum, ideal midpoint, and maximum mean
/// interval in days.
struct FrequencyBand {
    class: FrequencyClass,
    min: f64,
    ideal: f64,
    max: f64,
}

const FREQUENCY_BANDS: &[FrequencyBand] = &[
    FrequencyBand { class: FrequencyClass::Weekly, min: 6.0, ideal: 7.0, max: 8.0 },
    FrequencyBand { class: FrequencyClass::BiWeekly, min: 13.0, ideal: 14.0, max: 15.0 },
    FrequencyBand { class: FrequencyClass::Monthly, min: 28.0, ideal: 30.0, max: 32.0 },
    FrequencyBand { class: FrequencyClass::Quarterly, min: 85.0, ideal: 90.0, max: 95.0 },
    FrequencyBand { class: FrequencyClass::Annual, min: 350.0, ideal: 365.0, max: 380.0 },
];

/// An interval joins an existing cluster when it is within this fraction
/// of the cluster's running mean.
const CLUSTER_TOLERANCE: f64 = 0.20;

/// A gap is unusual when it exceeds max(this floor, 2x the mean interval).
const UNUSUAL_GAP_FLOOR_DAYS: i64 = 60;

/// Day-gaps between consecutive transactions.
///
/// Holds count - 1 entries; never built from fewer than two points.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSet {
    days: Vec<i64>,
}

impl IntervalSet {
    /// Derive the gaps from an ascending-ordered history. Returns None
    /// for fewer than two points.
    pub fn from_points(points: &[TransactionPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let days = points
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days())
            .collect();
        Some(Self { days })
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> &[i64] {
        &self.days
    }

    pub fn mean(&self) -> f64 {
        self.days.iter().sum::<i64>() as f64 / self.days.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        let values: Vec<f64> = self.days.iter().map(|&d| d as f64).collect();
        population_std_dev(&values, self.mean())
    }

    /// 1 minus the coefficient of variation, floored at 0. A zero mean
    /// (same-day transactions) counts as fully regular; the caller zeroes
    /// the downstream confidence instead.
    pub fn regularity(&self) -> f64 {
        let mean = self.mean();
        if mean == 0.0 {
            return 1.0;
        }
        (1.0 - self.std_dev() / mean).max(0.0)
    }
}

/// Detect the payee's cadence. Histories with fewer than two points yield
/// the neutral [`FrequencyProfile::none`].
pub fn detect_frequency(payee_id: &str, points: &[TransactionPoint]) -> FrequencyProfile {
    let intervals = match IntervalSet::from_points(points) {
        Some(set) => set,
        None => return FrequencyProfile::none(),
    };

    let mean_interval = intervals.mean();
    let interval_std_dev = intervals.std_dev();
    let regularity = intervals.regularity();

    let (class, confidence) = classify_interval(mean_interval, regularity);

    // Same-day histories carry no cadence signal at all
    let confidence = if mean_interval == 0.0 { 0.0 } else { confidence };

    let predictability = (regularity + confidence) / 2.0;

    let clusters = cluster_intervals(intervals.days());
    let unusual_gaps = find_unusual_gaps(points, mean_interval);

    debug!(
        payee = payee_id,
        class = class.as_str(),
        confidence,
        mean_interval,
        regularity,
        "Frequency detected"
    );

    FrequencyProfile {
        class,
        confidence,
        mean_interval_days: mean_interval,
        interval_std_dev,
        regularity,
        predictability,
        clusters,
        unusual_gaps,
    }
}

/// Match the mean interval against the cadence bands.
///
/// In-band confidence is (1 - |mean - ideal| / bandwidth) * regularity;
/// off-band intervals fall back to irregular with confidence capped at 0.5.
fn classify_interval(mean_interval: f64, regularity: f64) -> (FrequencyClass, f64) {
    for band in FREQUENCY_BANDS {
        if mean_interval >= band.min && mean_interval <= band.max {
            let bandwidth = band.max - band.min;
            let fit = 1.0 - (mean_interval - band.ideal).abs() / bandwidth;
            let confidence = (fit * regularity).clamp(0.0, 1.0);
            return (band.class, confidence);
        }
    }
    (FrequencyClass::Irregular, regularity.min(0.5))
}

/// Greedy single-pass interval bucketing.
///
/// Each gap joins the first cluster whose running mean is within the
/// tolerance, recomputing the mean incrementally; otherwise it seeds a new
/// cluster. Singleton clusters are noise and are dropped from the report.
fn cluster_intervals(days: &[i64]) -> Vec<IntervalCluster> {
    struct RunningCluster {
        sum: f64,
        count: usize,
    }

    let mut clusters: Vec<RunningCluster> = Vec::new();

    for &gap in days {
        let gap = gap as f64;
        let joined = clusters.iter_mut().find(|c| {
            let mean = c.sum / c.count as f64;
            mean != 0.0 && (gap - mean).abs() / mean <= CLUSTER_TOLERANCE
        });
        match joined {
            Some(cluster) => {
                cluster.sum += gap;
                cluster.count += 1;
            }
            None => clusters.push(RunningCluster { sum: gap, count: 1 }),
        }
    }

    clusters
        .into_iter()
        .filter(|c| c.count >= 2)
        .map(|c| IntervalCluster {
            mean_days: c.sum / c.count as f64,
            count: c.count,
        })
        .collect()
}

/// Flag consecutive gaps that break the payee's rhythm, longest first.
fn find_unusual_gaps(points: &[TransactionPoint], mean_interval: f64) -> Vec<UnusualGap> {
    let threshold = (2.0 * mean_interval).max(UNUSUAL_GAP_FLOOR_DAYS as f64);

    let mut gaps: Vec<UnusualGap> = points
        .windows(2)
        .filter_map(|w| {
            let gap_days = (w[1].date - w[0].date).num_days();
            if (gap_days as f64) > threshold {
                Some(UnusualGap {
                    start: w[0].date,
                    end: w[1].date,
                    gap_days,
                    likely_cause: infer_gap_cause(gap_days, w[0].date.month(), w[1].date.month()),
                })
            } else {
                None
            }
        })
        .collect();

    gaps.sort_by(|a, b| b.gap_days.cmp(&a.gap_days));
    gaps
}

/// Heuristic cause text for an unusual gap, from its length and the
/// calendar months it spans.
fn infer_gap_cause(gap_days: i64, start_month: u32, end_month: u32) -> String {
    if gap_days > 300 {
        return "Possible cancellation followed by a later resumption".to_string();
    }
    let spans_summer = (start_month..=start_month.max(end_month))
        .any(|m| (6..=8).contains(&m))
        || (start_month > end_month && (6..=8).contains(&end_month));
    let spans_winter = start_month == 12 || end_month <= 2 || start_month > end_month;
    if gap_days > 150 {
        if spans_summer {
            return "Extended pause over the summer months".to_string();
        }
        if spans_winter {
            return "Extended pause over the winter holidays".to_string();
        }
        return "Service may have been paused".to_string();
    }
    if spans_summer {
        return "Skipped cycles over the summer months".to_string();
    }
    if spans_winter {
        return "Skipped cycles over the winter holidays".to_string();
    }
    "Missed or skipped billing cycle".to_string()
}

/// Per-calendar-month aggregates, ascending by month. Only observed
/// months appear, so the result has 0-12 entries.
pub fn detect_seasonality(payee_id: &str, points: &[TransactionPoint]) -> Vec<SeasonalProfile> {
    if points.is_empty() {
        return Vec::new();
    }

    let yearly_total: f64 = points.iter().map(|p| p.amount).sum();
    let yearly_mean = yearly_total / points.len() as f64;

    let mut by_month: [(usize, f64); 12] = [(0, 0.0); 12];
    for p in points {
        let slot = &mut by_month[p.date.month0() as usize];
        slot.0 += 1;
        slot.1 += p.amount;
    }

    let distinct_months = by_month.iter().filter(|(count, _)| *count > 0).count();

    let profiles: Vec<SeasonalProfile> = by_month
        .iter()
        .enumerate()
        .filter(|(_, (count, _))| *count > 0)
        .map(|(idx, &(count, total))| {
            let mean = total / count as f64;
            // Degenerate yearly totals make shares/multipliers meaningless;
            // substitute the neutral value instead of dividing by zero
            let share_of_year = if yearly_total == 0.0 {
                0.0
            } else {
                total / yearly_total
            };
            let multiplier = if yearly_mean == 0.0 { 1.0 } else { mean / yearly_mean };
            let sample_weight = (count.min(10) as f64 / 10.0) * 0.6;
            let coverage_weight = (distinct_months.min(6) as f64 / 6.0) * 0.4;
            SeasonalProfile {
                month: idx as u32 + 1,
                count,
                total,
                mean,
                share_of_year,
                multiplier,
                confidence: sample_weight + coverage_weight,
            }
        })
        .collect();

    debug!(
        payee = payee_id,
        months = profiles.len(),
        "Seasonality computed"
    );

    profiles
}

/// Per-weekday aggregates keyed 0 (Monday) through 6 (Sunday), with
/// preference measured against the busiest weekday.
pub fn detect_weekday_pattern(payee_id: &str, points: &[TransactionPoint]) -> Vec<WeekdayProfile> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut by_weekday: [(usize, f64); 7] = [(0, 0.0); 7];
    for p in points {
        let slot = &mut by_weekday[p.date.weekday().num_days_from_monday() as usize];
        slot.0 += 1;
        slot.1 += p.amount;
    }

    let busiest = by_weekday.iter().map(|(count, _)| *count).max().unwrap_or(0);
    if busiest == 0 {
        return Vec::new();
    }

    let profiles: Vec<WeekdayProfile> = by_weekday
        .iter()
        .enumerate()
        .filter(|(_, (count, _))| *count > 0)
        .map(|(idx, &(count, total))| WeekdayProfile {
            weekday: idx as u32,
            count,
            total,
            mean: total / count as f64,
            preference: count as f64 / busiest as f64,
        })
        .collect();

    debug!(
        payee = payee_id,
        weekdays = profiles.len(),
        "Weekday pattern computed"
    );

    profiles
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

    fn monthly_points(n: usize) -> Vec<TransactionPoint> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        (0..n)
            .map(|i| TransactionPoint {
                date: start + chrono::Duration::days(30 * i as i64),
                amount: 15.99,
            })
            .collect()
    }

    #[test]
    fn test_interval_set_length() {
        let points = monthly_points(5);
        let set = IntervalSet::from_points(&points).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.days(), &[30, 30, 30, 30]);
        assert!(IntervalSet::from_points(&points[..1]).is_none());
    }

    #[test]
    fn test_monthly_example_from_history() {
        // 2024-01-01, 2024-02-01, 2024-03-03: intervals [31, 31]
        let points = vec![
            point(2024, 1, 1, 50.0),
            point(2024, 2, 1, 50.0),
            point(2024, 3, 3, 52.0),
        ];
        let set = IntervalSet::from_points(&points).unwrap();
        assert_eq!(set.days(), &[31, 31]);
        assert!((set.regularity() - 1.0).abs() < 1e-9);

        let profile = detect_frequency("netflix", &points);
        assert_eq!(profile.class, FrequencyClass::Monthly);
        assert!(profile.confidence > 0.7);
    }

    #[test]
    fn test_ideal_interval_is_idempotent() {
        for band_days in [7i64, 14, 30, 90, 365] {
            let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
            let points: Vec<TransactionPoint> = (0..6)
                .map(|i| TransactionPoint {
                    date: start + chrono::Duration::days(band_days * i),
                    amount: 9.99,
                })
                .collect();
            let profile = detect_frequency("acme", &points);
            assert_ne!(profile.class, FrequencyClass::Irregular, "band {}", band_days);
            // Perfect regularity at the ideal midpoint
            assert!(
                profile.confidence >= 0.99 * profile.regularity,
                "band {} confidence {}",
                band_days,
                profile.confidence
            );
        }
    }

    #[test]
    fn test_off_band_is_irregular() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points: Vec<TransactionPoint> = (0..5)
            .map(|i| TransactionPoint {
                date: start + chrono::Duration::days(50 * i),
                amount: 10.0,
            })
            .collect();
        let profile = detect_frequency("acme", &points);
        assert_eq!(profile.class, FrequencyClass::Irregular);
        assert!(profile.confidence <= 0.5);
    }

    #[test]
    fn test_too_short_history() {
        let profile = detect_frequency("acme", &[point(2024, 1, 1, 10.0)]);
        assert_eq!(profile.class, FrequencyClass::None);
        assert_eq!(profile.confidence, 0.0);
    }

    #[test]
    fn test_same_day_history_has_no_cadence_signal() {
        let points = vec![point(2024, 1, 1, 10.0), point(2024, 1, 1, 20.0)];
        let profile = detect_frequency("acme", &points);
        assert_eq!(profile.regularity, 1.0);
        assert_eq!(profile.confidence, 0.0);
    }

    #[test]
    fn test_cluster_intervals_drops_singletons() {
        // Two tight groups plus one stray
        let clusters = cluster_intervals(&[30, 31, 29, 30, 7, 7, 200]);
        assert_eq!(clusters.len(), 2);
        assert!((clusters[0].mean_days - 30.0).abs() < 1.0);
        assert_eq!(clusters[0].count, 4);
        assert_eq!(clusters[1].count, 2);
    }

    #[test]
    fn test_unusual_gap_detection() {
        let points = vec![
            point(2024, 1, 1, 10.0),
            point(2024, 2, 1, 10.0),
            point(2024, 3, 1, 10.0),
            // 6-month hole
            point(2024, 9, 1, 10.0),
            point(2024, 10, 1, 10.0),
        ];
        let profile = detect_frequency("acme", &points);
        assert_eq!(profile.unusual_gaps.len(), 1);
        let gap = profile.unusual_gaps[0].gap_days;
        assert!(gap > 150);
        assert!(!profile.unusual_gaps[0].likely_cause.is_empty());
    }

    #[test]
    fn test_seasonality_shares_and_multipliers() {
        let points = vec![
            point(2023, 1, 10, 100.0),
            point(2023, 1, 20, 100.0),
            point(2023, 6, 10, 50.0),
            point(2023, 6, 20, 50.0),
        ];
        let profiles = detect_seasonality("acme", &points);
        assert_eq!(profiles.len(), 2);

        let january = &profiles[0];
        assert_eq!(january.month, 1);
        assert_eq!(january.count, 2);
        assert!((january.share_of_year - 200.0 / 300.0).abs() < 1e-9);
        // January mean 100 vs yearly mean 75
        assert!((january.multiplier - 100.0 / 75.0).abs() < 1e-9);

        let shares: f64 = profiles.iter().map(|p| p.share_of_year).sum();
        assert!((shares - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonality_empty() {
        assert!(detect_seasonality("acme", &[]).is_empty());
    }

    #[test]
    fn test_weekday_preference() {
        // 2024-01-01 was a Monday
        let points = vec![
            point(2024, 1, 1, 10.0),
            point(2024, 1, 8, 10.0),
            point(2024, 1, 15, 10.0),
            point(2024, 1, 6, 20.0), // Saturday
        ];
        let profiles = detect_weekday_pattern("acme", &points);
        assert_eq!(profiles.len(), 2);

        let monday = &profiles[0];
        assert_eq!(monday.weekday, 0);
        assert_eq!(monday.count, 3);
        assert_eq!(monday.preference, 1.0);

        let saturday = &profiles[1];
        assert_eq!(saturday.weekday, 5);
        assert!((saturday.preference - 1.0 / 3.0).abs() < 1e-9);
    }
}
