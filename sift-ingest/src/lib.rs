//! sift-ingest: statement text to categorized transactions.
//!
//! Lines -> [`Segmenter`] (candidate blocks) -> [`Resolver`] (classify,
//! correct NSF reversals, date, categorize) -> [`StatementParse`].

pub mod classify;
pub mod error;
pub mod parsers;
pub mod resolver;
pub mod segmenter;
pub mod types;

pub use classify::{BlockShape, NsfFeeStack, NsfReversal, classify_block};
pub use error::{ParseError, ParseErrorKind};
pub use parsers::{StatementLayout, layout_for_file, parse_statement_text, statement_date};
pub use resolver::{Outcome, Resolver, Reversal, StatementParse, TransactionLog};
pub use segmenter::Segmenter;
pub use types::{BlockLine, CandidateBlock, LineKind, RawLine, lines_from_text};
