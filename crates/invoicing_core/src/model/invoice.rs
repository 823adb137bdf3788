//! Invoice domain model.
//!
//! # Responsibility
//! - Define the canonical invoice record persisted by repositories.
//! - Provide amount helpers and opt-in validation for callers.
//!
//! # Invariants
//! - `id` is the only field repositories interpret; everything else is payload.
//! - Money amounts are integer minor units, never floats.
//! - Wire names are camelCase to stay readable by existing invoice files.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a stored invoice.
pub type InvoiceId = Uuid;

static ISSUE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("issue date pattern is valid")
});

// Ten digits, optionally grouped with single dashes (e.g. 123-456-78-90).
static TAX_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9](-?[0-9]){9}$").expect("tax id pattern is valid"));

/// VAT rate applied to one invoice entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vat {
    #[serde(rename = "VAT_23")]
    Vat23,
    #[serde(rename = "VAT_8")]
    Vat8,
    #[serde(rename = "VAT_7")]
    Vat7,
    #[serde(rename = "VAT_5")]
    Vat5,
    #[serde(rename = "VAT_0")]
    Vat0,
    /// Exempt from VAT ("zwolniony").
    #[serde(rename = "VAT_ZW")]
    VatZw,
}

impl Vat {
    /// Rate as a whole percentage.
    pub fn rate_percent(self) -> i64 {
        match self {
            Self::Vat23 => 23,
            Self::Vat8 => 8,
            Self::Vat7 => 7,
            Self::Vat5 => 5,
            Self::Vat0 | Self::VatZw => 0,
        }
    }
}

/// Buyer or seller party printed on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub tax_identification_number: String,
    pub address: String,
    pub name: String,
}

impl Company {
    pub fn new(
        tax_identification_number: impl Into<String>,
        address: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            tax_identification_number: tax_identification_number.into(),
            address: address.into(),
            name: name.into(),
        }
    }
}

/// One billed line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEntry {
    pub description: String,
    pub quantity: u32,
    /// Net amount for the whole line, in minor units.
    pub price: i64,
    /// VAT amount for the whole line, in minor units.
    pub vat_value: i64,
    pub vat_rate: Vat,
}

impl InvoiceEntry {
    /// Builds an entry from a unit price, deriving net and VAT amounts.
    ///
    /// VAT is rounded half-up to the nearest minor unit.
    pub fn new(
        description: impl Into<String>,
        quantity: u32,
        unit_price: i64,
        vat_rate: Vat,
    ) -> Self {
        let price = unit_price.saturating_mul(i64::from(quantity));
        let vat_value = price
            .saturating_mul(vat_rate.rate_percent())
            .saturating_add(50)
            .div_euclid(100);
        Self {
            description: description.into(),
            quantity,
            price,
            vat_value,
            vat_rate,
        }
    }

    pub fn gross(&self) -> i64 {
        self.price.saturating_add(self.vat_value)
    }
}

/// Canonical invoice record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    /// Issue date in ISO `YYYY-MM-DD` form.
    pub date: String,
    pub buyer: Company,
    pub seller: Company,
    pub entries: Vec<InvoiceEntry>,
}

impl Invoice {
    /// Creates an invoice with a freshly generated random id.
    pub fn new(
        date: impl Into<String>,
        buyer: Company,
        seller: Company,
        entries: Vec<InvoiceEntry>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), date, buyer, seller, entries)
    }

    /// Creates an invoice with a caller-provided id.
    ///
    /// Used by import paths where identity already exists. The id is only a
    /// candidate: repositories may replace it on collision.
    pub fn with_id(
        id: InvoiceId,
        date: impl Into<String>,
        buyer: Company,
        seller: Company,
        entries: Vec<InvoiceEntry>,
    ) -> Self {
        Self {
            id,
            date: date.into(),
            buyer,
            seller,
            entries,
        }
    }

    pub fn net_total(&self) -> i64 {
        self.entries
            .iter()
            .fold(0_i64, |acc, entry| acc.saturating_add(entry.price))
    }

    pub fn vat_total(&self) -> i64 {
        self.entries
            .iter()
            .fold(0_i64, |acc, entry| acc.saturating_add(entry.vat_value))
    }

    pub fn gross_total(&self) -> i64 {
        self.net_total().saturating_add(self.vat_total())
    }

    /// Checks business rules callers may enforce before persisting.
    ///
    /// Repositories never call this: they store whatever payload they get.
    ///
    /// # Errors
    /// - `InvalidDate` when `date` is not a plausible `YYYY-MM-DD` value.
    /// - `InvalidTaxId` / `EmptyCompanyName` for malformed parties.
    /// - `ZeroQuantity` / `NegativeAmount` for malformed entries.
    pub fn validate(&self) -> Result<(), InvoiceValidationError> {
        validate_issue_date(&self.date)?;
        validate_company(&self.seller)?;
        validate_company(&self.buyer)?;

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.quantity == 0 {
                return Err(InvoiceValidationError::ZeroQuantity { index });
            }
            if entry.price < 0 || entry.vat_value < 0 {
                return Err(InvoiceValidationError::NegativeAmount { index });
            }
        }

        Ok(())
    }
}

/// Business-rule violations reported by [`Invoice::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceValidationError {
    InvalidDate(String),
    InvalidTaxId(String),
    EmptyCompanyName,
    ZeroQuantity { index: usize },
    NegativeAmount { index: usize },
}

impl Display for InvoiceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => {
                write!(f, "invoice date `{value}` is not a valid YYYY-MM-DD date")
            }
            Self::InvalidTaxId(value) => {
                write!(f, "tax identification number `{value}` must have 10 digits")
            }
            Self::EmptyCompanyName => write!(f, "company name cannot be empty"),
            Self::ZeroQuantity { index } => {
                write!(f, "invoice entry #{index} has zero quantity")
            }
            Self::NegativeAmount { index } => {
                write!(f, "invoice entry #{index} has a negative amount")
            }
        }
    }
}

impl Error for InvoiceValidationError {}

fn validate_issue_date(value: &str) -> Result<(), InvoiceValidationError> {
    let invalid = || InvoiceValidationError::InvalidDate(value.to_string());
    let captures = ISSUE_DATE_RE.captures(value).ok_or_else(invalid)?;

    let month: u32 = captures[2].parse().map_err(|_| invalid())?;
    let day: u32 = captures[3].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }

    Ok(())
}

fn validate_company(company: &Company) -> Result<(), InvoiceValidationError> {
    if company.name.trim().is_empty() {
        return Err(InvoiceValidationError::EmptyCompanyName);
    }
    if !TAX_ID_RE.is_match(company.tax_identification_number.trim()) {
        return Err(InvoiceValidationError::InvalidTaxId(
            company.tax_identification_number.clone(),
        ));
    }
    Ok(())
}
