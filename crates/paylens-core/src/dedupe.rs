//! Fuzzy duplicate detection for payee contact records
//!
//! Compares every unordered pair of records, scores name/phone/email/
//! website similarity, aggregates a weighted total over the fields that
//! cleared their thresholds, and classifies the pair as merge, review, or
//! ignore with a suggested per-field conflict policy for merges.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::models::ContactRecord;
use crate::similarity::{normalize_hostname, normalize_phone, similarity, strip_www};

/// A contact field the engine compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Name,
    Phone,
    Email,
    Website,
}

impl MatchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchField::Name => "name",
            MatchField::Phone => "phone",
            MatchField::Email => "email",
            MatchField::Website => "website",
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a field matched exactly or only approximately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
}

/// Recommended handling for a duplicate pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateAction {
    Merge,
    Review,
    Ignore,
}

impl DuplicateAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateAction::Merge => "merge",
            DuplicateAction::Review => "review",
            DuplicateAction::Ignore => "ignore",
        }
    }
}

impl fmt::Display for DuplicateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk of acting on the recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// How to resolve one conflicting field when merging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldResolution {
    /// Keep the primary record's value
    KeepPrimary,
    /// Confidence too low to resolve automatically
    ManualReview,
}

/// One field's similarity contribution to a pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSimilarity {
    pub field: MatchField,
    pub match_type: MatchType,
    pub confidence: f64,
}

/// Per-field merge policy for a merge-classified pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicy {
    pub field: MatchField,
    pub resolution: FieldResolution,
}

/// A reported near-duplicate pair of contact records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    /// Id of the first record in row-major pair order (the merge primary)
    pub primary_id: i64,
    pub duplicate_id: i64,
    /// Fields that cleared their thresholds; uncleared fields are omitted
    pub similarities: Vec<FieldSimilarity>,
    /// Weighted sum over the cleared fields
    pub aggregate_score: f64,
    pub action: DuplicateAction,
    pub risk: RiskLevel,
    /// Present only for merge pairs
    pub merge_policy: Option<Vec<FieldPolicy>>,
}

/// Duplicate detection configuration
#[derive(Debug, Clone)]
pub struct DedupeConfig {
    /// Field weights in the aggregate score
    pub name_weight: f64,
    pub phone_weight: f64,
    pub email_weight: f64,
    pub website_weight: f64,

    /// Minimum similarity for a field to count toward the aggregate
    pub name_threshold: f64,
    pub phone_threshold: f64,
    pub email_threshold: f64,
    pub website_threshold: f64,

    /// Similarity above which phone/email matches count as exact
    pub phone_exact: f64,
    pub email_exact: f64,

    /// Pair is reported when at least this many fields matched...
    pub min_matched_fields: usize,
    /// ...or the aggregate exceeds this floor
    pub aggregate_floor: f64,

    /// Aggregate above which the pair is an automatic merge
    pub merge_threshold: f64,
    /// Aggregate below which the pair is ignored
    pub ignore_threshold: f64,
    /// Field confidence above which a merge keeps the primary value
    pub keep_primary_confidence: f64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            name_weight: 0.4,
            phone_weight: 0.3,
            email_weight: 0.2,
            website_weight: 0.1,
            name_threshold: 0.7,
            phone_threshold: 0.8,
            email_threshold: 0.9,
            website_threshold: 0.85,
            phone_exact: 0.98,
            email_exact: 0.99,
            min_matched_fields: 2,
            aggregate_floor: 0.6,
            merge_threshold: 0.9,
            ignore_threshold: 0.7,
            keep_primary_confidence: 0.95,
        }
    }
}

/// Detector over a collection of contact records.
pub struct DuplicateDetector {
    config: DedupeConfig,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self {
            config: DedupeConfig::default(),
        }
    }

    pub fn with_config(config: DedupeConfig) -> Self {
        Self { config }
    }

    /// Compare every unordered pair of records.
    ///
    /// Iteration is row-major (i from 0..n, j from i+1..n) so the result
    /// order is deterministic. A record with an empty name carries no
    /// comparable identity and is skipped; a pair itself never fails, at
    /// worst it is omitted from the results.
    pub fn find_duplicates(&self, records: &[ContactRecord]) -> Vec<DuplicateCandidate> {
        let mut candidates = Vec::new();

        for i in 0..records.len() {
            if records[i].name.trim().is_empty() {
                warn!(id = records[i].id, "Skipping contact record with empty name");
                continue;
            }
            for j in (i + 1)..records.len() {
                if records[j].name.trim().is_empty() {
                    continue;
                }
                if let Some(candidate) = self.score_pair(&records[i], &records[j]) {
                    candidates.push(candidate);
                }
            }
        }

        debug!(
            records = records.len(),
            candidates = candidates.len(),
            "Duplicate detection complete"
        );

        candidates
    }

    /// Score one pair. Returns None when the pair does not clear the
    /// reporting bar (fewer than two matched fields and a low aggregate).
    pub fn score_pair(
        &self,
        primary: &ContactRecord,
        other: &ContactRecord,
    ) -> Option<DuplicateCandidate> {
        let cfg = &self.config;
        let mut similarities = Vec::new();
        let mut aggregate_score = 0.0;

        if let Some(entry) = self.score_name(primary, other) {
            aggregate_score += cfg.name_weight * entry.confidence;
            similarities.push(entry);
        }
        if let Some(entry) = self.score_phone(primary, other) {
            aggregate_score += cfg.phone_weight * entry.confidence;
            similarities.push(entry);
        }
        if let Some(entry) = self.score_email(primary, other) {
            aggregate_score += cfg.email_weight * entry.confidence;
            similarities.push(entry);
        }
        if let Some(entry) = self.score_website(primary, other) {
            aggregate_score += cfg.website_weight * entry.confidence;
            similarities.push(entry);
        }

        if similarities.len() < cfg.min_matched_fields && aggregate_score <= cfg.aggregate_floor {
            return None;
        }

        let (action, risk) = if aggregate_score > cfg.merge_threshold {
            (DuplicateAction::Merge, RiskLevel::Low)
        } else if aggregate_score < cfg.ignore_threshold {
            (DuplicateAction::Ignore, RiskLevel::High)
        } else {
            (DuplicateAction::Review, RiskLevel::Medium)
        };

        let merge_policy = if action == DuplicateAction::Merge {
            Some(
                similarities
                    .iter()
                    .map(|s| FieldPolicy {
                        field: s.field,
                        resolution: if s.confidence > cfg.keep_primary_confidence {
                            FieldResolution::KeepPrimary
                        } else {
                            FieldResolution::ManualReview
                        },
                    })
                    .collect(),
            )
        } else {
            None
        };

        debug!(
            primary = primary.id,
            duplicate = other.id,
            score = aggregate_score,
            action = action.as_str(),
            "Duplicate candidate"
        );

        Some(DuplicateCandidate {
            primary_id: primary.id,
            duplicate_id: other.id,
            similarities,
            aggregate_score,
            action,
            risk,
            merge_policy,
        })
    }

    fn score_name(&self, a: &ContactRecord, b: &ContactRecord) -> Option<FieldSimilarity> {
        let confidence = similarity(&a.name, &b.name);
        if confidence <= self.config.name_threshold {
            return None;
        }
        Some(FieldSimilarity {
            field: MatchField::Name,
            match_type: if confidence == 1.0 {
                MatchType::Exact
            } else {
                MatchType::Fuzzy
            },
            confidence,
        })
    }

    fn score_phone(&self, a: &ContactRecord, b: &ContactRecord) -> Option<FieldSimilarity> {
        let (pa, pb) = match (&a.phone, &b.phone) {
            (Some(pa), Some(pb)) => (normalize_phone(pa), normalize_phone(pb)),
            _ => return None,
        };
        if pa.is_empty() || pb.is_empty() {
            return None;
        }
        let confidence = similarity(&pa, &pb);
        if confidence <= self.config.phone_threshold {
            return None;
        }
        Some(FieldSimilarity {
            field: MatchField::Phone,
            match_type: if confidence > self.config.phone_exact {
                MatchType::Exact
            } else {
                MatchType::Fuzzy
            },
            confidence,
        })
    }

    fn score_email(&self, a: &ContactRecord, b: &ContactRecord) -> Option<FieldSimilarity> {
        let (ea, eb) = match (&a.email, &b.email) {
            (Some(ea), Some(eb)) => (ea.trim().to_lowercase(), eb.trim().to_lowercase()),
            _ => return None,
        };
        if ea.is_empty() || eb.is_empty() {
            return None;
        }
        let confidence = similarity(&ea, &eb);
        if confidence <= self.config.email_threshold {
            return None;
        }
        Some(FieldSimilarity {
            field: MatchField::Email,
            match_type: if confidence > self.config.email_exact {
                MatchType::Exact
            } else {
                MatchType::Fuzzy
            },
            confidence,
        })
    }

    /// Website comparison prefers normalized hostnames: identical hosts are
    /// exact, hosts differing only by a leading "www." score 0.95, anything
    /// else falls back to the raw-string primitive.
    fn score_website(&self, a: &ContactRecord, b: &ContactRecord) -> Option<FieldSimilarity> {
        let (wa, wb) = match (&a.website, &b.website) {
            (Some(wa), Some(wb)) => (wa, wb),
            _ => return None,
        };
        let ha = normalize_hostname(wa);
        let hb = normalize_hostname(wb);
        if ha.is_empty() || hb.is_empty() {
            return None;
        }

        let (confidence, match_type) = if ha == hb {
            (1.0, MatchType::Exact)
        } else if strip_www(&ha) == strip_www(&hb) {
            (0.95, MatchType::Exact)
        } else {
            (similarity(wa, wb), MatchType::Fuzzy)
        };

        if confidence <= self.config.website_threshold {
            return None;
        }
        Some(FieldSimilarity {
            field: MatchField::Website,
            match_type,
            confidence,
        })
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str) -> ContactRecord {
        ContactRecord::new(id, name)
    }

    #[test]
    fn test_never_reports_self_pairs() {
        let records = vec![
            record(1, "Netflix").with_phone("+1 (555) 123-4567"),
            record(2, "Spotify").with_phone("555-987-6543"),
        ];
        let detector = DuplicateDetector::new();
        for candidate in detector.find_duplicates(&records) {
            assert_ne!(candidate.primary_id, candidate.duplicate_id);
        }
    }

    #[test]
    fn test_pair_score_is_symmetric() {
        let a = record(1, "Netflix Inc")
            .with_phone("+1 (555) 123-4567")
            .with_email("billing@netflix.com");
        let b = record(2, "Netflix, Inc.")
            .with_phone("5551234567")
            .with_email("billing@NETFLIX.com");

        let detector = DuplicateDetector::new();
        let ab = detector.score_pair(&a, &b).expect("pair reported");
        let ba = detector.score_pair(&b, &a).expect("pair reported");
        assert!((ab.aggregate_score - ba.aggregate_score).abs() < 1e-9);
        assert_eq!(ab.similarities.len(), ba.similarities.len());
    }

    #[test]
    fn test_phone_formats_normalize_to_exact() {
        let a = record(1, "Acme Utilities").with_phone("+1 (555) 123-4567");
        let b = record(2, "ACME Utility Co").with_phone("5551234567");

        let detector = DuplicateDetector::new();
        let phone = detector.score_phone(&a, &b).expect("phones comparable");
        assert_eq!(phone.confidence, 1.0);
        assert_eq!(phone.match_type, MatchType::Exact);
    }

    #[test]
    fn test_name_only_pair_is_not_reported() {
        // One matched field and a weighted aggregate of at most 0.4 never
        // clears the two-field / 0.6 reporting bar
        let records = vec![record(1, "Netflix Inc"), record(2, "Netflix, Inc.")];
        let detector = DuplicateDetector::new();
        assert!(detector.find_duplicates(&records).is_empty());
    }

    #[test]
    fn test_identical_records_merge_with_policy() {
        let a = record(1, "Netflix")
            .with_phone("+1 (555) 123-4567")
            .with_email("billing@netflix.com")
            .with_website("https://www.netflix.com");
        let b = record(2, "Netflix")
            .with_phone("1-555-123-4567")
            .with_email("Billing@Netflix.com")
            .with_website("netflix.com");

        let detector = DuplicateDetector::new();
        let candidates = detector.find_duplicates(&[a, b]);
        assert_eq!(candidates.len(), 1);

        let candidate = &candidates[0];
        // name 1.0*0.4 + phone 1.0*0.3 + email 1.0*0.2 + website 0.95*0.1
        assert!((candidate.aggregate_score - 0.995).abs() < 1e-9);
        assert_eq!(candidate.action, DuplicateAction::Merge);
        assert_eq!(candidate.risk, RiskLevel::Low);

        let policy = candidate.merge_policy.as_ref().expect("merge policy");
        assert_eq!(policy.len(), 4);
        // The www-stripped website at 0.95 sits at the manual-review side
        let website = policy
            .iter()
            .find(|p| p.field == MatchField::Website)
            .unwrap();
        assert_eq!(website.resolution, FieldResolution::ManualReview);
        let name = policy.iter().find(|p| p.field == MatchField::Name).unwrap();
        assert_eq!(name.resolution, FieldResolution::KeepPrimary);
    }

    #[test]
    fn test_two_matched_fields_reported_even_below_floor() {
        // Name and phone match but with modest confidence
        let a = record(1, "City Water Dept").with_phone("555 111 2222");
        let b = record(2, "City Water Dep").with_phone("(555) 111-2222");

        let detector = DuplicateDetector::new();
        let candidate = detector.score_pair(&a, &b).expect("two fields matched");
        assert_eq!(candidate.similarities.len(), 2);
        // 0.4 * ~0.93 + 0.3 * 1.0 is under the merge bar
        assert_ne!(candidate.action, DuplicateAction::Merge);
    }

    #[test]
    fn test_different_records_not_reported() {
        let records = vec![
            record(1, "Netflix")
                .with_phone("555-111-1111")
                .with_email("billing@netflix.com"),
            record(2, "City Water Dept")
                .with_phone("555-999-8888")
                .with_email("info@citywater.gov"),
        ];
        let detector = DuplicateDetector::new();
        assert!(detector.find_duplicates(&records).is_empty());
    }

    #[test]
    fn test_empty_name_records_are_skipped() {
        let records = vec![
            record(1, "").with_phone("555-111-1111"),
            record(2, " ").with_phone("555-111-1111"),
        ];
        let detector = DuplicateDetector::new();
        assert!(detector.find_duplicates(&records).is_empty());
    }

    #[test]
    fn test_website_www_stripping() {
        let a = record(1, "Acme").with_website("https://www.acme.com/pay");
        let b = record(2, "Acme").with_website("acme.com");

        let detector = DuplicateDetector::new();
        let website = detector.score_website(&a, &b).expect("hosts comparable");
        assert_eq!(website.confidence, 0.95);
        assert_eq!(website.match_type, MatchType::Exact);
    }

    #[test]
    fn test_row_major_result_order() {
        let base = |id: i64| {
            record(id, "Acme Corp")
                .with_phone("555-111-2222")
                .with_email("billing@acme.com")
        };
        let records = vec![base(10), base(20), base(30)];
        let detector = DuplicateDetector::new();
        let pairs: Vec<(i64, i64)> = detector
            .find_duplicates(&records)
            .iter()
            .map(|c| (c.primary_id, c.duplicate_id))
            .collect();
        assert_eq!(pairs, vec![(10, 20), (10, 30), (20, 30)]);
    }
}
