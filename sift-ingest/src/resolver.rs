//! Turns candidate blocks into finalized, categorized transactions.
//!
//! The output is an append-only log. The only mutation of earlier output is
//! `TransactionLog::undo_last`, used by NSF reversals to cancel the entry
//! the bank returned.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use sift_core::{CategoryRuleSet, Transaction, YearTracker};

use crate::classify::{BlockShape, Entry, classify_block};
use crate::error::{ParseError, ParseErrorKind};
use crate::types::CandidateBlock;

/// Audit record for a transaction removed by an NSF reversal
#[derive(Debug, Clone, PartialEq)]
pub struct Reversal {
    /// Ordinal of the reversal line
    pub ordinal: usize,
    /// Amount the statement says was returned
    pub returned: Decimal,
    pub removed: Transaction,
}

/// Finalized transactions in document order.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append, assigning the next sequence index.
    pub fn append(&mut self, mut txn: Transaction) -> &Transaction {
        txn.sequence_index = self.entries.len();
        self.entries.push(txn);
        &self.entries[self.entries.len() - 1]
    }

    /// Remove and return the most recent transaction.
    pub fn undo_last(&mut self) -> Option<Transaction> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<&Transaction> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Transaction> {
        self.entries
    }
}

/// Everything one statement parse produced
#[derive(Debug, Clone, Default)]
pub struct StatementParse {
    pub transactions: Vec<Transaction>,
    pub reversals: Vec<Reversal>,
    pub errors: Vec<ParseError>,
}

/// What resolving one block did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A transaction was appended at this sequence index
    Emitted(usize),
    /// The previous transaction was removed
    Reversed,
}

/// Per-statement resolver state. Holds no global state; independent
/// statements can be resolved in parallel against the same rule set.
pub struct Resolver<'r> {
    rules: &'r CategoryRuleSet,
    years: YearTracker,
    /// Date of the most recent dated block, reversals included
    current_date: Option<NaiveDate>,
    log: TransactionLog,
    reversals: Vec<Reversal>,
    errors: Vec<ParseError>,
}

impl<'r> Resolver<'r> {
    /// `start` is the statement date, used to give years to `MON DD` dates.
    pub fn new(rules: &'r CategoryRuleSet, start: NaiveDate) -> Self {
        Self {
            rules,
            years: YearTracker::new(start),
            current_date: None,
            log: TransactionLog::new(),
            reversals: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    /// Resolve every block; failing blocks are recorded and skipped.
    pub fn run<I>(mut self, blocks: I) -> StatementParse
    where
        I: IntoIterator<Item = CandidateBlock>,
    {
        for block in blocks {
            if let Err(err) = self.resolve_block(&block) {
                warn!("skipping entry: {err}");
                self.errors.push(err);
            }
        }
        self.finish()
    }

    pub fn finish(self) -> StatementParse {
        StatementParse {
            transactions: self.log.into_entries(),
            reversals: self.reversals,
            errors: self.errors,
        }
    }

    /// Resolve a single block against the log.
    pub fn resolve_block(&mut self, block: &CandidateBlock) -> Result<Outcome, ParseError> {
        let fail = |kind| ParseError::new(block.ordinal, kind);

        let shape = classify_block(block);
        if let BlockShape::Unrecognized(kind) = shape {
            return Err(fail(kind));
        }

        let date = match block.date {
            Some(marker) => {
                let date = self
                    .years
                    .resolve(marker)
                    .ok_or_else(|| fail(ParseErrorKind::InvalidDate { marker }))?;
                self.current_date = Some(date);
                Some(date)
            }
            None => None,
        };

        match shape {
            BlockShape::NsfReversal(nsf) => {
                let removed = self
                    .log
                    .undo_last()
                    .ok_or_else(|| fail(ParseErrorKind::OrphanReversal))?;
                if removed.amount != nsf.returned {
                    warn!(
                        "line {}: NSF returned {} but reversed entry \"{}\" was {}",
                        block.ordinal, nsf.returned, removed.description, removed.amount
                    );
                }
                debug!(
                    "line {}: NSF reversal removed #{} \"{}\"",
                    block.ordinal, removed.sequence_index, removed.description
                );
                self.reversals.push(Reversal {
                    ordinal: block.ordinal,
                    returned: nsf.returned,
                    removed,
                });
                Ok(Outcome::Reversed)
            }
            BlockShape::NsfFeeStack(fee) => {
                if !fee.is_consistent() {
                    warn!(
                        "line {}: NSF fee {} @ {} does not add up to {}",
                        block.ordinal, fee.count, fee.unit, fee.total
                    );
                }
                let entry = Entry {
                    description: fee.description(),
                    amount: fee.total,
                    debit_ref: None,
                };
                self.emit(block, date, entry)
            }
            BlockShape::SameLineFee(entry) | BlockShape::Ordinary(entry) => {
                self.emit(block, date, entry)
            }
            BlockShape::Unrecognized(kind) => Err(fail(kind)),
        }
    }

    fn emit(
        &mut self,
        block: &CandidateBlock,
        date: Option<NaiveDate>,
        entry: Entry,
    ) -> Result<Outcome, ParseError> {
        let date = date
            .or(self.current_date)
            .ok_or_else(|| ParseError::new(block.ordinal, ParseErrorKind::NoDateContext))?;
        let posted = block
            .posted
            .and_then(|marker| self.years.resolve_after(marker, date));

        let matched = self.rules.categorize(&entry.description);
        let rule = matched.rule();

        let txn = self.log.append(Transaction {
            sequence_index: 0,
            ordinal: block.ordinal,
            date,
            posted,
            category: matched.category().to_string(),
            group: rule.map(|r| r.group.clone()),
            vendor: rule.map(|r| r.vendor.clone()),
            description: entry.description,
            amount: entry.amount,
            debit_ref: entry.debit_ref,
        });
        debug!(
            "line {}: #{} {} \"{}\" {} [{}]",
            txn.ordinal, txn.sequence_index, txn.date, txn.description, txn.amount, txn.category
        );
        Ok(Outcome::Emitted(txn.sequence_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::StatementLayout;
    use crate::segmenter::Segmenter;
    use crate::types::lines_from_text;
    use sift_core::{CategoryRule, UNCATEGORIZED};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rules() -> CategoryRuleSet {
        CategoryRuleSet::new(vec![
            CategoryRule::new("Business", "Bank Fees", "NSF item fee", Some("NSF fees")),
            CategoryRule::new("Business", "Bank Fees", "OVERLIMIT FEE", None),
            CategoryRule::new("Food", "Groceries", "SOBEYS", Some("Sobeys")),
        ])
    }

    fn parse(text: &str, start: NaiveDate, rules: &CategoryRuleSet) -> StatementParse {
        let layout = StatementLayout::generic();
        Resolver::new(rules, start).run(Segmenter::new(lines_from_text(text), &layout))
    }

    #[test]
    fn test_ordinary_block_emits_one_transaction() {
        let p = parse("JAN 05 JAN 06 SOBEYS #44\n$25.00", ymd(2024, 2, 1), &rules());
        assert!(p.errors.is_empty());
        assert_eq!(p.transactions.len(), 1);
        let t = &p.transactions[0];
        assert_eq!(t.date, ymd(2024, 1, 5));
        assert_eq!(t.posted, Some(ymd(2024, 1, 6)));
        assert_eq!(t.amount, dec("25.00"));
        assert_eq!(t.category, "Groceries");
        assert_eq!(t.vendor.as_deref(), Some("Sobeys"));
        assert_eq!(t.sequence_index, 0);
    }

    #[test]
    fn test_nsf_reversal_removes_previous_only() {
        let text = "\
2 Jan PAYROLL 500.00 1,224.50
3 Jan GYM MEMBERSHIP 45.00 1,179.50
4 Jan Item returned NSF 45.00 - 1,224.50
";
        let p = parse(text, ymd(2024, 1, 31), &rules());
        assert!(p.errors.is_empty(), "{:?}", p.errors);
        let descs: Vec<_> = p.transactions.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["PAYROLL"]);
        assert_eq!(p.reversals.len(), 1);
        assert_eq!(p.reversals[0].removed.description, "GYM MEMBERSHIP");
        assert_eq!(p.reversals[0].ordinal, 3);
    }

    #[test]
    fn test_next_entry_reuses_freed_sequence_index() {
        let text = "\
2 Jan A 1.00 10.00
3 Jan B 2.00 8.00
Item returned NSF 2.00 - 10.00
C 3.00 7.00
";
        let p = parse(text, ymd(2024, 1, 31), &rules());
        let seq: Vec<_> = p.transactions.iter().map(|t| (t.description.as_str(), t.sequence_index)).collect();
        assert_eq!(seq, vec![("A", 0), ("C", 1)]);
        // C has no date of its own; it takes the last printed date, B's
        assert_eq!(p.transactions[1].date, ymd(2024, 1, 3));
    }

    #[test]
    fn test_fee_stack_is_single_transaction_with_inherited_date() {
        let text = "\
5 Jan SOBEYS #44 12.00 1,179.50
NSF item fee 2 @ $45.00 90.00 1,089.50
";
        let p = parse(text, ymd(2024, 1, 31), &rules());
        assert_eq!(p.transactions.len(), 2);
        let fee = &p.transactions[1];
        assert_eq!(fee.amount, dec("90.00"));
        assert_eq!(fee.description, "NSF item fee (x2)");
        assert_eq!(fee.date, ymd(2024, 1, 5));
        assert_eq!(fee.category, "Bank Fees");
    }

    #[test]
    fn test_fee_after_dated_reversal_takes_reversal_date() {
        let text = "\
2 Jan PAYROLL 500.00 600.00
23 Jan GYM MEMBERSHIP 45.00 555.00
23 Jan Item returned NSF 45.00 - 600.00
NSF item fee 1 @ $45.00 45.00 555.00
";
        let p = parse(text, ymd(2024, 1, 31), &rules());
        assert!(p.errors.is_empty(), "{:?}", p.errors);
        assert_eq!(p.transactions.len(), 2);
        assert_eq!(p.transactions[1].description, "NSF item fee (x1)");
        assert_eq!(p.transactions[1].date, ymd(2024, 1, 23));
    }

    #[test]
    fn test_amount_line_wins_over_money_in_description() {
        let p = parse("JAN 05 JAN 06 STEAM PURCHASE $10.00 USD\n$13.50", ymd(2024, 2, 3), &rules());
        assert!(p.errors.is_empty(), "{:?}", p.errors);
        assert_eq!(p.transactions.len(), 1);
        assert_eq!(p.transactions[0].description, "STEAM PURCHASE $10.00 USD");
        assert_eq!(p.transactions[0].amount, dec("13.50"));
    }

    #[test]
    fn test_same_line_amount_with_amount_line_is_ordinary() {
        let text = "JAN 07 JAN 07 GIFT CARD $25.00\n$25.00\nJAN 28 JAN 28 OVERLIMIT FEE $29.00";
        let p = parse(text, ymd(2024, 2, 3), &rules());
        assert!(p.errors.is_empty(), "{:?}", p.errors);
        let got: Vec<_> = p.transactions.iter().map(|t| (t.description.as_str(), t.amount)).collect();
        assert_eq!(got, vec![("GIFT CARD", dec("25.00")), ("OVERLIMIT FEE", dec("29.00"))]);
    }

    #[test]
    fn test_unrecognized_dated_block_leaves_date_state_alone() {
        let text = "\
2024-01-02 COFFEE $4.50
2025-06-01 Item returned NSF 4.50
NSF item fee 1 @ $45.00 45.00 55.00
";
        let p = parse(text, ymd(2024, 1, 31), &rules());
        assert_eq!(p.errors.len(), 1);
        assert_eq!(p.errors[0].ordinal, 2);
        assert_eq!(p.transactions[1].date, ymd(2024, 1, 2));
    }

    #[test]
    fn test_same_line_fee() {
        let p = parse("JAN 28 JAN 28 OVERLIMIT FEE $29.00", ymd(2024, 2, 3), &rules());
        assert_eq!(p.transactions.len(), 1);
        let t = &p.transactions[0];
        assert_eq!(t.date, ymd(2024, 1, 28));
        assert_eq!(t.amount, dec("29.00"));
        assert_eq!(t.description, "OVERLIMIT FEE");
        assert_eq!(t.vendor.as_deref(), Some("OVERLIMIT FEE"));
    }

    #[test]
    fn test_dateless_first_entry_has_no_date_context() {
        let p = parse("NSF item fee 1 @ $45.00 45.00 100.00\n3 Jan SOBEYS 5.00 95.00", ymd(2024, 1, 31), &rules());
        assert_eq!(p.errors.len(), 1);
        assert_eq!(p.errors[0].kind, ParseErrorKind::NoDateContext);
        assert_eq!(p.errors[0].ordinal, 1);
        assert_eq!(p.transactions.len(), 1);
    }

    #[test]
    fn test_orphan_reversal_is_reported() {
        let p = parse("4 Jan Item returned NSF 45.00 - 1,224.50", ymd(2024, 1, 31), &rules());
        assert_eq!(p.errors[0].kind, ParseErrorKind::OrphanReversal);
        assert!(p.transactions.is_empty());
    }

    #[test]
    fn test_unrecognized_block_does_not_stop_the_statement() {
        let text = "\
2024-01-02 COFFEE $4.50
2024-01-03 Item returned NSF 4.50
2024-01-04 SOBEYS $30.00
";
        let p = parse(text, ymd(2024, 1, 31), &rules());
        assert_eq!(p.transactions.len(), 2);
        assert_eq!(p.errors.len(), 1);
        assert!(matches!(p.errors[0].kind, ParseErrorKind::UnrecognizedBlock { .. }));
        assert_eq!(p.errors[0].ordinal, 2);
    }

    #[test]
    fn test_invalid_date_is_reported() {
        let p = parse("FEB 30 FEB 30 THING $1.00", ymd(2024, 3, 3), &rules());
        assert!(matches!(p.errors[0].kind, ParseErrorKind::InvalidDate { .. }));
    }

    #[test]
    fn test_uncategorized_sentinel() {
        let p = parse("2024-01-02 PETRO CANADA $40.00", ymd(2024, 1, 31), &rules());
        assert_eq!(p.transactions[0].category, UNCATEGORIZED);
        assert!(p.transactions[0].group.is_none());
    }

    #[test]
    fn test_log_undo_last() {
        let mut log = TransactionLog::new();
        assert!(log.undo_last().is_none());
        let t = Transaction {
            sequence_index: 99,
            ordinal: 1,
            date: ymd(2024, 1, 1),
            posted: None,
            description: "X".into(),
            amount: dec("1.00"),
            category: UNCATEGORIZED.into(),
            group: None,
            vendor: None,
            debit_ref: None,
        };
        assert_eq!(log.append(t.clone()).sequence_index, 0);
        assert_eq!(log.append(t).sequence_index, 1);
        assert_eq!(log.undo_last().unwrap().sequence_index, 1);
        assert_eq!(log.len(), 1);
    }
}
