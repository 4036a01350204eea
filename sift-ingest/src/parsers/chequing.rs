//! "My Main Money Account" chequing statement layout (text)
//!
//! Expected extracted-text section:
//!   Date Description Withdrawals ($) Deposits ($) Balance ($)
//!   3 Jan Interac purchase - 5521 SOBEYS #44 45.00 1,134.50
//!   Visa Debit purchase - 778812
//!   AMAZON.CA 25.00 1,109.50
//!
//! Amount and running balance share the description line; rows on the same
//! day after the first carry no date.

use anyhow::Result;
use chrono::NaiveDate;
use sift_core::{CategoryRuleSet, DateStyle};

use super::{StatementLayout, parse_statement_text};
use crate::resolver::StatementParse;

pub const FILE_MARKER: &str = "My Main Money Account";
pub const HEADER: &str = "Date Description Withdrawals ($) Deposits ($) Balance ($)";

pub fn layout() -> StatementLayout {
    StatementLayout {
        name: "chequing".to_string(),
        header: Some(HEADER.to_string()),
        date_styles: vec![DateStyle::DayMon, DateStyle::Iso],
        ignored: vec![
            "Opening balance".to_string(),
            "Closing balance".to_string(),
            "Closing totals".to_string(),
        ],
    }
}

/// Parse extracted chequing statement text.
///
/// `start` is the statement date; rows only print `DD Mon`.
pub fn parse_chequing_text(
    text: &str,
    start: NaiveDate,
    rules: &CategoryRuleSet,
) -> Result<StatementParse> {
    parse_statement_text(text, &layout(), start, rules)
}
