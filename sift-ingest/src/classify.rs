//! Block classification.
//!
//! Every candidate block is matched against an ordered list of detectors;
//! the first one that claims the block decides its shape. Order:
//! NSF reversal, NSF fee stack, same-line fee, ordinary.

use log::trace;
use regex::Regex;
use rust_decimal::Decimal;
use sift_core::money::{MONEY_NUMBER, first_money, parse_money};
use sift_core::{DebitKind, DebitRef};
use std::sync::OnceLock;

use crate::error::ParseErrorKind;
use crate::types::{CandidateBlock, LineKind};

pub const NSF_REVERSAL_MARKER: &str = "Item returned NSF";
pub const NSF_FEE_MARKER: &str = "NSF item fee";

/// `Item returned NSF <returned> - <balance>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NsfReversal {
    pub returned: Decimal,
    pub balance: Decimal,
}

/// `NSF item fee <count> @ $<unit> <total> <balance>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NsfFeeStack {
    pub count: u32,
    pub unit: Decimal,
    pub total: Decimal,
    /// Balance carried forward; informational only
    pub balance: Decimal,
}

impl NsfFeeStack {
    /// `count * unit == total`
    pub fn is_consistent(&self) -> bool {
        Decimal::from(self.count) * self.unit == self.total
    }

    pub fn description(&self) -> String {
        format!("{NSF_FEE_MARKER} (x{})", self.count)
    }
}

/// Description and amount of an entry that becomes one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub description: String,
    pub amount: Decimal,
    pub debit_ref: Option<DebitRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockShape {
    Ordinary(Entry),
    NsfReversal(NsfReversal),
    NsfFeeStack(NsfFeeStack),
    SameLineFee(Entry),
    Unrecognized(ParseErrorKind),
}

impl BlockShape {
    pub fn name(&self) -> &'static str {
        match self {
            BlockShape::Ordinary(_) => "ordinary",
            BlockShape::NsfReversal(_) => "nsf-reversal",
            BlockShape::NsfFeeStack(_) => "nsf-fee-stack",
            BlockShape::SameLineFee(_) => "same-line-fee",
            BlockShape::Unrecognized(_) => "unrecognized",
        }
    }
}

type Detector = fn(&CandidateBlock) -> Option<BlockShape>;

const DETECTORS: [Detector; 4] = [
    detect_nsf_reversal,
    detect_nsf_fee_stack,
    detect_same_line_fee,
    detect_ordinary,
];

/// Classify a block; the first detector that claims it wins.
pub fn classify_block(block: &CandidateBlock) -> BlockShape {
    let shape = DETECTORS
        .iter()
        .find_map(|detect| detect(block))
        .unwrap_or_else(|| BlockShape::Unrecognized(ParseErrorKind::unrecognized("no known shape")));
    trace!("line {}: {}", block.ordinal, shape.name());
    shape
}

fn nsf_reversal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"Item returned NSF\s+(?P<returned>\$?{MONEY_NUMBER})\s+-\s+(?P<balance>-?\$?{MONEY_NUMBER})"
        ))
        .expect("nsf reversal regex")
    })
}

fn nsf_fee_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"NSF item fee\s+(?P<count>\d+)\s*@\s*\$(?P<unit>{MONEY_NUMBER})\s+(?P<total>\$?{MONEY_NUMBER})\s+(?P<balance>-?\$?{MONEY_NUMBER})"
        ))
        .expect("nsf fee regex")
    })
}

fn debit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Visa Debit (?P<kind>purchase|correction|refund) - (?P<id>\d+)")
            .expect("visa debit regex")
    })
}

fn interac_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Interac purchase - \d+\s+").expect("interac regex"))
}

/// Text of the first line containing `marker`
fn line_with<'b>(block: &'b CandidateBlock, marker: &str) -> Option<&'b str> {
    block
        .lines
        .iter()
        .map(|l| l.text.as_str())
        .find(|t| t.contains(marker))
}

fn money(caps: &regex::Captures<'_>, name: &str) -> Option<Decimal> {
    parse_money(caps.name(name)?.as_str())
}

/// Parse an NSF reversal line
pub fn parse_nsf_reversal(text: &str) -> Option<NsfReversal> {
    let caps = nsf_reversal_re().captures(text)?;
    Some(NsfReversal {
        returned: money(&caps, "returned")?,
        balance: money(&caps, "balance")?,
    })
}

/// Parse a stacked NSF fee line
pub fn parse_nsf_fee_stack(text: &str) -> Option<NsfFeeStack> {
    let caps = nsf_fee_re().captures(text)?;
    let count: u32 = caps["count"].parse().ok()?;
    if count == 0 {
        return None;
    }
    Some(NsfFeeStack {
        count,
        unit: money(&caps, "unit")?,
        total: money(&caps, "total")?,
        balance: money(&caps, "balance")?,
    })
}

fn detect_nsf_reversal(block: &CandidateBlock) -> Option<BlockShape> {
    let text = line_with(block, NSF_REVERSAL_MARKER)?;
    Some(match parse_nsf_reversal(text) {
        Some(r) => BlockShape::NsfReversal(r),
        None => BlockShape::Unrecognized(ParseErrorKind::unrecognized(format!(
            "malformed NSF reversal \"{text}\""
        ))),
    })
}

fn detect_nsf_fee_stack(block: &CandidateBlock) -> Option<BlockShape> {
    let text = line_with(block, NSF_FEE_MARKER)?;
    Some(match parse_nsf_fee_stack(text) {
        Some(f) => BlockShape::NsfFeeStack(f),
        None => BlockShape::Unrecognized(ParseErrorKind::unrecognized(format!(
            "malformed NSF fee \"{text}\""
        ))),
    })
}

fn detect_same_line_fee(block: &CandidateBlock) -> Option<BlockShape> {
    if block.first_amount_line().is_some() {
        return None;
    }
    let (_, amount) = block.first_same_line()?;
    Some(entry_shape(block, amount, BlockShape::SameLineFee))
}

fn detect_ordinary(block: &CandidateBlock) -> Option<BlockShape> {
    if let Some(amount) = block.first_amount_line() {
        return Some(entry_shape(block, amount, BlockShape::Ordinary));
    }

    // Amount printed inline: the description is what precedes it
    let mut parts = Vec::new();
    for line in &block.lines {
        if let Some(tok) = first_money(&line.text) {
            parts.push(line.text[..tok.start].to_string());
            return Some(finish_entry(parts, tok.value, BlockShape::Ordinary));
        }
        parts.push(line.text.clone());
    }

    Some(BlockShape::Unrecognized(ParseErrorKind::MissingAmount))
}

/// Description parts for a block whose amount comes from an amount line or
/// a same-line amount: every text line plus same-line labels.
fn entry_shape(
    block: &CandidateBlock,
    amount: Decimal,
    wrap: fn(Entry) -> BlockShape,
) -> BlockShape {
    let parts = block
        .lines
        .iter()
        .filter_map(|l| match &l.kind {
            LineKind::Text => Some(l.text.clone()),
            LineKind::SameLine { label, .. } => Some(label.clone()),
            LineKind::Amount(_) => None,
        })
        .collect();
    finish_entry(parts, amount, wrap)
}

fn finish_entry(parts: Vec<String>, amount: Decimal, wrap: fn(Entry) -> BlockShape) -> BlockShape {
    let mut debit_ref = None;
    let mut kept = Vec::with_capacity(parts.len());
    for part in parts {
        if let Some(found) = parse_debit_ref(&part) {
            debit_ref = Some(found);
            kept.push(debit_re().replace(&part, "").into_owned());
        } else {
            kept.push(part);
        }
    }

    let description = normalize_description(&kept.join(" "));
    if description.is_empty() {
        return BlockShape::Unrecognized(ParseErrorKind::unrecognized("entry has no description"));
    }

    let amount = match &debit_ref {
        Some(r) if r.kind.is_reversal() => -amount.abs(),
        _ => amount,
    };

    wrap(Entry {
        description,
        amount,
        debit_ref,
    })
}

/// `Visa Debit <kind> - <id>` header, if present in `text`
pub fn parse_debit_ref(text: &str) -> Option<DebitRef> {
    let caps = debit_re().captures(text)?;
    Some(DebitRef {
        kind: DebitKind::parse(&caps["kind"])?,
        id: caps["id"].to_string(),
    })
}

/// Collapse whitespace and drop the `Interac purchase - <n>` prefix.
pub fn normalize_description(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    interac_re().replace(&collapsed, "").trim().to_string()
}
