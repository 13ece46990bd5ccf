//! Price pattern matching.
//!
//! A price is one or more digits, a decimal point, and one or more digits
//! (`90.00`). The matched text is returned verbatim; no numeric conversion
//! or currency handling happens here.

use std::sync::LazyLock;

use regex::Regex;

/// Regex source for a decimal price.
pub const PRICE_PATTERN: &str = r"\d+\.\d+";

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PRICE_PATTERN).expect("valid regex"));

/// Why a piece of node text did not yield exactly one price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceMatch<'a> {
    /// Exactly one decimal substring was found.
    Unique(&'a str),
    /// The text holds no decimal substring.
    Missing,
    /// The text holds more than one decimal substring.
    Ambiguous(usize),
}

/// Scan `text` for decimal substrings and classify the result.
pub fn match_price(text: &str) -> PriceMatch<'_> {
    let mut matches = PRICE_RE.find_iter(text);
    let Some(first) = matches.next() else {
        return PriceMatch::Missing;
    };
    let extra = matches.count();
    if extra == 0 {
        PriceMatch::Unique(first.as_str())
    } else {
        PriceMatch::Ambiguous(extra + 1)
    }
}
