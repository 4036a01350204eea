//! Groups statement lines into candidate entry blocks.
//!
//! A dated line always opens a block. A dedicated amount line attaches to
//! the current block unless that block already has one. Other undated lines
//! extend the current block until it holds an amount of any kind; after that
//! they open a new, undated block. That is how stand-alone fee and reversal
//! lines end up in blocks of their own.

use log::trace;
use sift_core::dates::strip_leading_dates;
use sift_core::money::{amount_only, trailing_dollar};

use crate::parsers::StatementLayout;
use crate::types::{BlockLine, CandidateBlock, LineKind, RawLine};

/// Structural kind of a content line (no date tokens)
pub fn content_kind(text: &str) -> LineKind {
    if let Some(amount) = amount_only(text) {
        return LineKind::Amount(amount);
    }
    if let Some((label, amount)) = trailing_dollar(text) {
        return LineKind::SameLine { label, amount };
    }
    LineKind::Text
}

/// Lazy, one-pass block iterator over the lines of one statement.
pub struct Segmenter<'a, I> {
    lines: I,
    layout: &'a StatementLayout,
    in_items: bool,
    current: Option<CandidateBlock>,
}

impl<'a, I> Segmenter<'a, I>
where
    I: Iterator<Item = RawLine>,
{
    pub fn new(lines: impl IntoIterator<IntoIter = I>, layout: &'a StatementLayout) -> Self {
        Self {
            lines: lines.into_iter(),
            layout,
            in_items: layout.header.is_none(),
            current: None,
        }
    }

    /// Whether the layout header has been seen (always true without one)
    pub fn in_items(&self) -> bool {
        self.in_items
    }

    /// Replace the current block with `next`, returning the old one if it
    /// is worth handing out.
    fn rotate(&mut self, next: Option<CandidateBlock>) -> Option<CandidateBlock> {
        let finished = std::mem::replace(&mut self.current, next)?;
        keep(finished)
    }

    fn push_content(&mut self, line: RawLine) -> Option<CandidateBlock> {
        let kind = content_kind(&line.text);
        let block_line = BlockLine {
            ordinal: line.ordinal,
            text: line.text.trim().to_string(),
            kind,
        };

        // A dedicated amount line completes any block still missing one;
        // other content only extends a block that has no amount at all.
        let attach = match (&self.current, &block_line.kind) {
            (Some(block), LineKind::Amount(_)) => !block.has_amount_line(),
            (Some(block), _) => !block.has_amount(),
            (None, _) => false,
        };

        match &mut self.current {
            Some(block) if attach => {
                block.lines.push(block_line);
                None
            }
            _ => {
                let mut block = CandidateBlock::new(line.ordinal, None, None);
                block.lines.push(block_line);
                self.rotate(Some(block))
            }
        }
    }
}

/// Drop blocks with nothing parseable: no content at all, or undated and
/// without any amount (page headers, footers, stray notes).
fn keep(block: CandidateBlock) -> Option<CandidateBlock> {
    if block.is_empty() || (block.date.is_none() && !block.has_amount()) {
        trace!("dropping boundary noise at line {}", block.ordinal);
        return None;
    }
    Some(block)
}

impl<'a, I> Iterator for Segmenter<'a, I>
where
    I: Iterator<Item = RawLine>,
{
    type Item = CandidateBlock;

    fn next(&mut self) -> Option<CandidateBlock> {
        while let Some(line) = self.lines.next() {
            let text = line.text.trim();
            if text.is_empty() {
                continue;
            }

            if !self.in_items {
                if self.layout.is_header(text) {
                    trace!("found header on line {}", line.ordinal);
                    self.in_items = true;
                }
                continue;
            }

            if self.layout.is_ignored(text) {
                trace!("{:3}: ignored \"{}\"", line.ordinal, text);
                continue;
            }

            if let Some(dates) = strip_leading_dates(text, &self.layout.date_styles) {
                trace!("{:3}: date {} \"{}\"", line.ordinal, dates.date, dates.rest);
                let mut block = CandidateBlock::new(line.ordinal, Some(dates.date), dates.posted);
                if !dates.rest.is_empty() {
                    block.lines.push(BlockLine {
                        ordinal: line.ordinal,
                        kind: content_kind(&dates.rest),
                        text: dates.rest,
                    });
                }
                if let Some(done) = self.rotate(Some(block)) {
                    return Some(done);
                }
                continue;
            }

            trace!("{:3}: \"{}\"", line.ordinal, text);
            if let Some(done) = self.push_content(line) {
                return Some(done);
            }
        }

        self.rotate(None)
    }
}
