//! "VISA Avion Unlimited" credit card statement layout (text)
//!
//! Expected extracted-text section:
//!   TRANSACTION POSTINGACTIVITY DESCRIPTION AMOUNT ($)DATE DATE
//!   JAN 05 JAN 06 AMAZON.CA AMAZON.CA ON
//!   $25.00
//!   JAN 28 JAN 28 OVERLIMIT FEE $29.00
//!
//! Amounts usually sit on the line after the description; fees print them
//! on the same line.

use anyhow::Result;
use chrono::NaiveDate;
use sift_core::{CategoryRuleSet, DateStyle};

use super::{StatementLayout, parse_statement_text};
use crate::resolver::StatementParse;

pub const FILE_MARKER: &str = "VISA Avion Unlimited";
pub const HEADER: &str = "TRANSACTION POSTINGACTIVITY DESCRIPTION AMOUNT ($)DATE DATE";

pub fn layout() -> StatementLayout {
    StatementLayout {
        name: "visa".to_string(),
        header: Some(HEADER.to_string()),
        date_styles: vec![DateStyle::MonDay],
        ignored: vec!["Foreign Currency".to_string()],
    }
}

/// Parse extracted VISA statement text.
///
/// `start` is the statement date; rows only print `MON DD`.
pub fn parse_visa_text(text: &str, start: NaiveDate, rules: &CategoryRuleSet) -> Result<StatementParse> {
    parse_statement_text(text, &layout(), start, rules)
}
