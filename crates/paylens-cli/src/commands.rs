//! Command implementations for the Paylens CLI

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use paylens_core::{ContactRecord, DuplicateDetector, PayeeAnalyzer, TransactionPoint};

/// One raw CSV row before validation. The payee column is optional for
/// single-payee files.
#[derive(Debug, Deserialize)]
struct HistoryRow {
    date: String,
    amount: String,
    #[serde(default)]
    payee: Option<String>,
}

/// Name used for rows in a file without a payee column.
const DEFAULT_PAYEE: &str = "(unnamed payee)";

/// Load and group a transaction history file by payee, ascending by date.
///
/// Malformed rows are skipped with a warning; one bad record never aborts
/// the batch.
pub fn load_history(path: &Path) -> Result<BTreeMap<String, Vec<TransactionPoint>>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut by_payee: BTreeMap<String, Vec<TransactionPoint>> = BTreeMap::new();
    let mut skipped = 0usize;

    for (line, row) in reader.deserialize::<HistoryRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping unreadable row");
                skipped += 1;
                continue;
            }
        };
        let point = match TransactionPoint::parse(&row.date, &row.amount) {
            Ok(point) => point,
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping invalid row");
                skipped += 1;
                continue;
            }
        };
        let payee = row
            .payee
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAYEE.to_string());
        by_payee.entry(payee).or_default().push(point);
    }

    for points in by_payee.values_mut() {
        points.sort_by_key(|p| p.date);
    }

    info!(
        payees = by_payee.len(),
        skipped,
        "Transaction history loaded"
    );
    Ok(by_payee)
}

/// Analyze every payee in the history file (or just one).
pub fn cmd_analyze(file: &Path, payee: Option<&str>, json: bool) -> Result<()> {
    let mut by_payee = load_history(file)?;

    if let Some(name) = payee {
        by_payee.retain(|key, _| key.as_str() == name);
        if by_payee.is_empty() {
            anyhow::bail!("No transactions found for payee '{}'", name);
        }
    }

    let analyzer = PayeeAnalyzer::new();
    let reports: Vec<_> = by_payee
        .iter()
        .map(|(name, points)| analyzer.analyze_payee(name, points))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!("{}", report.payee_id);
        println!(
            "  {} transactions, {:.2} total, mean {:.2} (median {:.2})",
            report.statistics.count,
            report.statistics.total,
            report.statistics.mean,
            report.statistics.median
        );
        println!(
            "  cadence: {} (confidence {:.2}, regularity {:.2})",
            report.frequency.class, report.frequency.confidence, report.frequency.regularity
        );
        match report.prediction.next_date {
            Some(date) => println!(
                "  next: {} for ~{:.2} ({}, confidence {:.2})",
                date,
                report.prediction.predicted_amount,
                report.prediction.method,
                report.prediction.confidence
            ),
            None => println!("  next: no reliable estimate"),
        }
        println!(
            "  budget: {:.2}/month ({:.2}-{:.2})",
            report.budget.monthly_allocation, report.budget.range.low, report.budget.range.high
        );
        println!(
            "  confidence: {:.2} [{}]",
            report.confidence.overall, report.confidence.band
        );
        if !report.statistics.outliers.is_empty() {
            println!("  outliers: {}", report.statistics.outliers.len());
        }
        for gap in &report.frequency.unusual_gaps {
            println!(
                "  gap: {} days ({} to {}) - {}",
                gap.gap_days, gap.start, gap.end, gap.likely_cause
            );
        }
        println!();
    }

    Ok(())
}

/// Run duplicate detection over a contacts JSON file.
pub fn cmd_dedupe(file: &Path, json: bool) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<ContactRecord> =
        serde_json::from_str(&raw).context("Contacts file is not a JSON array of records")?;

    info!(records = records.len(), "Contacts loaded");

    let detector = DuplicateDetector::new();
    let candidates = detector.find_duplicates(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("No duplicate candidates found among {} records", records.len());
        return Ok(());
    }

    for candidate in &candidates {
        println!(
            "{} <-> {}: {:.3} [{}]",
            candidate.primary_id,
            candidate.duplicate_id,
            candidate.aggregate_score,
            candidate.action
        );
        for sim in &candidate.similarities {
            println!("    {} {:.3} ({:?})", sim.field, sim.confidence, sim.match_type);
        }
    }

    Ok(())
}
