//! Money tokens as printed on statements: `1,089.50`, `$29.00`, `- $14.05`.
//!
//! Amounts are always two-decimal and may carry thousands separators, an
//! optional `$` and an optional leading `-` for credits.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

/// Regex fragment for the numeric part of a money token.
pub const MONEY_NUMBER: &str = r"(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}";

/// A money token located inside a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoneyToken {
    pub value: Decimal,
    /// Byte offset where the token (including sign and `$`) starts
    pub start: usize,
    pub end: usize,
}

fn amount_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^\s*(?P<neg>-\s*)?\$?(?P<num>{MONEY_NUMBER})\s*$"))
            .expect("amount-only regex")
    })
}

fn trailing_dollar_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<label>.*?\S)\s+(?P<neg>-\s*)?\$(?P<num>{MONEY_NUMBER})\s*$"
        ))
        .expect("trailing dollar regex")
    })
}

fn embedded_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?:^|\s)(?P<tok>(?P<neg>-\s*)?\$?(?P<num>{MONEY_NUMBER}))(?:\s|$)"
        ))
        .expect("embedded money regex")
    })
}

/// Parse a money string such as `1,089.50`, `$45.00` or `-$3.10`.
pub fn parse_money(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    let digits: String = rest
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if digits.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&digits).ok()?;
    Some(if negative { -value } else { value })
}

fn signed(neg: bool, num: &str) -> Option<Decimal> {
    let value = parse_money(num)?;
    Some(if neg { -value } else { value })
}

/// A line holding nothing but an amount, e.g. `$1,234.56` or `- $14.05`.
pub fn amount_only(line: &str) -> Option<Decimal> {
    let caps = amount_only_re().captures(line)?;
    signed(caps.name("neg").is_some(), &caps["num"])
}

/// A line ending in a `$<amount>` token after some label text.
///
/// Returns the trimmed label and the signed amount.
pub fn trailing_dollar(line: &str) -> Option<(String, Decimal)> {
    let caps = trailing_dollar_re().captures(line)?;
    let amount = signed(caps.name("neg").is_some(), &caps["num"])?;
    Some((caps["label"].trim().to_string(), amount))
}

/// First whitespace-delimited money token in `line`.
pub fn first_money(line: &str) -> Option<MoneyToken> {
    let caps = embedded_re().captures(line)?;
    let tok = caps.name("tok")?;
    let value = signed(caps.name("neg").is_some(), &caps["num"])?;
    Some(MoneyToken {
        value,
        start: tok.start(),
        end: tok.end(),
    })
}
