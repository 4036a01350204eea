//! Per-entry parse errors. A failing entry is skipped and recorded; it never
//! aborts the statement.

use sift_core::DateMarker;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Entry has no extractable monetary value
    #[error("no amount found for entry")]
    MissingAmount,

    /// Dateless entry with nothing earlier to inherit a date from
    #[error("entry has no date and there is no earlier transaction to take one from")]
    NoDateContext,

    /// Entry matches no known shape
    #[error("unrecognized entry: {reason}")]
    UnrecognizedBlock { reason: String },

    /// NSF reversal with an empty transaction log
    #[error("NSF reversal with no earlier transaction to reverse")]
    OrphanReversal,

    /// A date token naming an impossible day, e.g. FEB 30
    #[error("invalid date {marker}")]
    InvalidDate { marker: DateMarker },
}

impl ParseErrorKind {
    pub fn unrecognized(reason: impl Into<String>) -> Self {
        ParseErrorKind::UnrecognizedBlock {
            reason: reason.into(),
        }
    }
}

/// A parse error tagged with the ordinal of the entry's first line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {ordinal}: {kind}")]
pub struct ParseError {
    pub ordinal: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(ordinal: usize, kind: ParseErrorKind) -> Self {
        Self { ordinal, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_ordinal() {
        let err = ParseError::new(14, ParseErrorKind::MissingAmount);
        assert_eq!(err.to_string(), "line 14: no amount found for entry");

        let err = ParseError::new(
            3,
            ParseErrorKind::InvalidDate {
                marker: DateMarker {
                    year: None,
                    month: 2,
                    day: 30,
                },
            },
        );
        assert_eq!(err.to_string(), "line 3: invalid date FEB 30");
    }
}
