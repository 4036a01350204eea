//! Statement layouts and the text-to-transactions entry points.
//!
//! A layout only describes where entries start (header line), which date
//! forms appear, and which lines are noise. The entry logic itself is shared.

pub mod chequing;
pub mod visa;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use log::debug;
use sift_core::{CategoryRuleSet, DateStyle};

use crate::resolver::{Resolver, StatementParse};
use crate::segmenter::Segmenter;
use crate::types::lines_from_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLayout {
    pub name: String,
    /// Column header line after which entries begin
    pub header: Option<String>,
    pub date_styles: Vec<DateStyle>,
    /// Lines containing any of these are skipped
    pub ignored: Vec<String>,
}

impl StatementLayout {
    /// No header, every date form, nothing ignored
    pub fn generic() -> Self {
        Self {
            name: "generic".to_string(),
            header: None,
            date_styles: DateStyle::ALL.to_vec(),
            ignored: Vec::new(),
        }
    }

    pub fn is_header(&self, line: &str) -> bool {
        self.header.as_deref() == Some(line.trim())
    }

    pub fn is_ignored(&self, line: &str) -> bool {
        self.ignored.iter().any(|p| line.contains(p.as_str()))
    }
}

/// Pick a layout from a statement file name.
pub fn layout_for_file(file_name: &str) -> StatementLayout {
    if file_name.contains(chequing::FILE_MARKER) {
        chequing::layout()
    } else if file_name.contains(visa::FILE_MARKER) {
        visa::layout()
    } else {
        StatementLayout::generic()
    }
}

/// Statement date from a file stem ending in `YYYY-MM-DD`,
/// e.g. `VISA Avion Unlimited 2024-02-03`.
pub fn statement_date(file_stem: &str) -> Result<NaiveDate> {
    let tail = file_stem
        .len()
        .checked_sub(10)
        .and_then(|i| file_stem.get(i..))
        .with_context(|| format!("{file_stem} has no trailing YYYY-MM-DD"))?;
    NaiveDate::parse_from_str(tail, "%Y-%m-%d")
        .with_context(|| format!("{file_stem} is not a valid statement name"))
}

/// Parse one statement's extracted text.
///
/// `start` is the statement date; it anchors the year of `MON DD` dates.
/// Fails only when the layout's header never appears, which means the
/// wrong layout was chosen. Per-entry problems are in `errors`.
pub fn parse_statement_text(
    text: &str,
    layout: &StatementLayout,
    start: NaiveDate,
    rules: &CategoryRuleSet,
) -> Result<StatementParse> {
    let mut segmenter = Segmenter::new(lines_from_text(text), layout);
    let parse = Resolver::new(rules, start).run(segmenter.by_ref());

    if !segmenter.in_items() {
        bail!(
            "header {:?} not found; is this a {} statement?",
            layout.header.as_deref().unwrap_or_default(),
            layout.name
        );
    }

    debug!(
        "{}: {} transactions, {} reversals, {} errors",
        layout.name,
        parse.transactions.len(),
        parse.reversals.len(),
        parse.errors.len()
    );
    Ok(parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_for_file() {
        assert_eq!(layout_for_file("My Main Money Account 2024-01-31.txt").name, "chequing");
        assert_eq!(layout_for_file("VISA Avion Unlimited 2024-02-03.txt").name, "visa");
        assert_eq!(layout_for_file("other.txt").name, "generic");
    }

    #[test]
    fn test_statement_date_from_stem() {
        let d = statement_date("VISA Avion Unlimited 2024-02-03").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert!(statement_date("notes").is_err());
        assert!(statement_date("statement 2024-13-40").is_err());
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let err = parse_statement_text("JAN 5 JAN 6 X $1.00", &visa::layout(), start, &CategoryRuleSet::default())
            .unwrap_err();
        assert!(err.to_string().contains("header"));
    }
}
