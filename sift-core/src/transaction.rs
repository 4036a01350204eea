//! Finalized statement transactions

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Virtual debit entries come in pairs: a purchase and its later
/// correction or refund, linked by the id printed on the statement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DebitKind {
    Purchase,
    Correction,
    Refund,
}

impl DebitKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(DebitKind::Purchase),
            "correction" => Some(DebitKind::Correction),
            "refund" => Some(DebitKind::Refund),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DebitKind::Purchase => "purchase",
            DebitKind::Correction => "correction",
            DebitKind::Refund => "refund",
        }
    }

    /// Corrections and refunds give money back
    pub fn is_reversal(&self) -> bool {
        !matches!(self, DebitKind::Purchase)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DebitRef {
    pub kind: DebitKind,
    pub id: String,
}

/// One finalized, categorized statement entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Position in the finalized output
    pub sequence_index: usize,
    /// Ordinal of the first source line of the entry
    pub ordinal: usize,
    pub date: NaiveDate,
    /// Posting date, when the statement prints one
    pub posted: Option<NaiveDate>,
    pub description: String,
    /// Positive = expense, negative = credit/refund
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub category: String,
    /// Report group of the matched category rule
    pub group: Option<String>,
    /// Friendly vendor name of the matched category rule
    pub vendor: Option<String>,
    pub debit_ref: Option<DebitRef>,
}

impl Transaction {
    /// Vendor name if a rule provided one, otherwise the description
    pub fn display_name(&self) -> &str {
        self.vendor.as_deref().unwrap_or(&self.description)
    }

    pub fn is_expense(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_uncategorized(&self) -> bool {
        self.group.is_none()
    }
}
