use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sift_core::DateMarker;

/// One line of extracted statement text with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    pub ordinal: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            ordinal,
            text: text.into(),
        }
    }
}

/// Split extracted text into numbered lines. Form feeds (page breaks) count
/// as line breaks; ordinals keep counting across pages.
pub fn lines_from_text(text: &str) -> Vec<RawLine> {
    text.split(['\n', '\x0c'])
        .map(|l| l.trim_end_matches('\r'))
        .enumerate()
        .map(|(i, l)| RawLine::new(i + 1, l))
        .collect()
}

/// Structural shape of a content line inside a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Description text, possibly with amounts embedded mid-line
    Text,
    /// A line holding only an amount
    Amount(Decimal),
    /// `<label> $<amount>` on one line
    SameLine { label: String, amount: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLine {
    pub ordinal: usize,
    /// Line text with any leading date tokens removed
    pub text: String,
    pub kind: LineKind,
}

/// Contiguous lines believed to form one statement entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBlock {
    /// Ordinal of the first line of the block
    pub ordinal: usize,
    pub date: Option<DateMarker>,
    pub posted: Option<DateMarker>,
    pub lines: Vec<BlockLine>,
}

impl CandidateBlock {
    pub fn new(ordinal: usize, date: Option<DateMarker>, posted: Option<DateMarker>) -> Self {
        Self {
            ordinal,
            date,
            posted,
            lines: Vec::new(),
        }
    }

    /// True once any line carries an amount: a dedicated amount line, a
    /// same-line amount, or a money token inside text.
    pub fn has_amount(&self) -> bool {
        self.lines.iter().any(|l| match l.kind {
            LineKind::Amount(_) | LineKind::SameLine { .. } => true,
            LineKind::Text => sift_core::money::first_money(&l.text).is_some(),
        })
    }

    /// True once a dedicated amount line has been attached.
    pub fn has_amount_line(&self) -> bool {
        self.first_amount_line().is_some()
    }

    pub fn first_amount_line(&self) -> Option<Decimal> {
        self.lines.iter().find_map(|l| match l.kind {
            LineKind::Amount(a) => Some(a),
            _ => None,
        })
    }

    pub fn first_same_line(&self) -> Option<(&str, Decimal)> {
        self.lines.iter().find_map(|l| match &l.kind {
            LineKind::SameLine { label, amount } => Some((label.as_str(), *amount)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
