//! Domain models for Paylens

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single dated transaction for one payee.
///
/// Collections of points are expected to arrive sorted ascending by date
/// (the transaction-history provider's contract). Amounts keep their sign;
/// the engines never mutate a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

impl TransactionPoint {
    /// Create a point, rejecting non-finite amounts.
    pub fn new(date: NaiveDate, amount: f64) -> Result<Self> {
        if !amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "non-finite amount {} on {}",
                amount, date
            )));
        }
        Ok(Self { date, amount })
    }

    /// Parse a point from raw strings (`%Y-%m-%d` date).
    ///
    /// Used at the ingest boundary; a malformed row aborts that one record,
    /// never a whole batch.
    pub fn parse(date: &str, amount: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")?;
        let amount: f64 = amount
            .trim()
            .parse()
            .map_err(|_| Error::InvalidData(format!("unparsable amount: {}", amount)))?;
        Self::new(date, amount)
    }
}

/// A payee contact record, compared but never owned by the duplicate engine.
///
/// All string fields are raw and unvalidated; the engine normalizes copies
/// for comparison only and never persists the normalized forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<ContactAddress>,
}

impl ContactRecord {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone: None,
            email: None,
            website: None,
            address: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_address(mut self, address: ContactAddress) -> Self {
        self.address = Some(address);
        self
    }
}

/// A contact address, either structured or free text.
///
/// Upstream systems send addresses in both shapes; the split is decided at
/// the boundary so the engines never see untyped data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactAddress {
    Structured {
        street: String,
        city: String,
        region: String,
        postal_code: String,
        country: String,
    },
    Freeform(String),
}

impl ContactAddress {
    /// Heuristic conversion of a free-text address into structured fields.
    ///
    /// Splits on commas: street, city, region, postal code, country. Inputs
    /// with fewer than four comma-separated parts stay freeform.
    pub fn from_freeform(text: &str) -> Self {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() < 4 {
            return Self::Freeform(text.to_string());
        }
        Self::Structured {
            street: parts[0].to_string(),
            city: parts[1].to_string(),
            region: parts[2].to_string(),
            postal_code: parts[3].to_string(),
            country: parts.get(4).unwrap_or(&"").to_string(),
        }
    }

    /// Flatten back to a single comparison string.
    pub fn as_comparison_text(&self) -> String {
        match self {
            Self::Structured {
                street,
                city,
                region,
                postal_code,
                country,
            } => format!("{} {} {} {} {}", street, city, region, postal_code, country)
                .trim()
                .to_string(),
            Self::Freeform(text) => text.clone(),
        }
    }
}
