//! Amount type for handling free-text currency cells.
//!
//! This module provides the `Amount` type which wraps a whole-rupee integer and handles
//! parsing cells that may include currency markers, separators and stray characters.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Currency markers that spreadsheet authors prefix amounts with. `RS.` must be stripped
/// before `RS` so the dot does not survive into the numeric run.
const CURRENCY_MARKERS: &[&str] = &["LKR", "RS.", "RS"];

/// A non-negative whole-rupee amount parsed from a spreadsheet cell.
///
/// LKR has no minor unit in this domain, so the value is an integer. Parsing is lenient
/// and total: anything that does not contain a recognizable number becomes zero rather
/// than an error, so a dirty cell can never abort a whole sheet. A minus sign is never
/// recognized; amounts are always non-negative.
///
/// # Examples
///
/// ```
/// # use fundboard::model::Amount;
/// assert_eq!(Amount::parse("LKR 1,500.00").value(), 1500);
/// assert_eq!(Amount::parse("Rs. 2000").value(), 2000);
/// assert_eq!(Amount::parse("abc").value(), 0);
/// ```
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Creates an Amount from an already-parsed value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Parses a cell into an Amount, resolving anything unparseable to zero.
    ///
    /// Strips currency markers, `=` (pasted formula remnants), whitespace and
    /// thousands-separator commas, then takes the first contiguous run of digits with at
    /// most one decimal point and rounds it to the nearest integer.
    pub fn parse(cell: impl AsRef<str>) -> Self {
        let mut cleaned = cell.as_ref().trim().to_uppercase();
        for marker in CURRENCY_MARKERS {
            cleaned = cleaned.replace(marker, "");
        }
        cleaned.retain(|c| c != '=' && c != ',' && !c.is_whitespace());

        Self(numeric_run(&cleaned).map_or(0, |run| run.parse::<f64>().unwrap_or(0.0).round() as i64))
    }

    /// Returns the whole-rupee value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Extracts the first contiguous run of `[0-9.]`, truncated at a second decimal point so
/// the result parses the way a lenient float parser would ("1.2.3" reads as "1.2").
fn numeric_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit() || c == '.')?;
    let rest = &s[start..];
    let mut end = rest.len();
    let mut seen_dot = false;
    for (ix, c) in rest.char_indices() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => {
                end = ix;
                break;
            }
        }
    }
    let run = &rest[..end];
    // A bare "." has no digits to parse.
    if run.chars().any(|c| c.is_ascii_digit()) {
        Some(run)
    } else {
        None
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Amount(i64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lkr_prefix_with_commas() {
        assert_eq!(Amount::parse("LKR 1,500.00").value(), 1500);
    }

    #[test]
    fn test_parse_rs_dot_prefix() {
        assert_eq!(Amount::parse("Rs. 2000").value(), 2000);
    }

    #[test]
    fn test_parse_rs_prefix() {
        assert_eq!(Amount::parse("rs 750").value(), 750);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Amount::parse("").value(), 0);
        assert!(Amount::parse("   ").is_zero());
    }

    #[test]
    fn test_parse_no_digits() {
        assert_eq!(Amount::parse("abc").value(), 0);
        assert_eq!(Amount::parse("...").value(), 0);
    }

    #[test]
    fn test_parse_formula_remnant() {
        assert_eq!(Amount::parse("  =500 ").value(), 500);
    }

    #[test]
    fn test_parse_rounds_to_nearest() {
        assert_eq!(Amount::parse("99.5").value(), 100);
        assert_eq!(Amount::parse("99.4").value(), 99);
    }

    #[test]
    fn test_parse_negative_sign_ignored() {
        // A leading minus is not recognized; the digit run is taken as-is.
        assert_eq!(Amount::parse("-250").value(), 250);
    }

    #[test]
    fn test_parse_second_decimal_point_truncates() {
        assert_eq!(Amount::parse("1.2.3").value(), 1);
    }

    #[test]
    fn test_parse_trailing_text() {
        assert_eq!(Amount::parse("1500 only").value(), 1500);
    }

    #[test]
    fn test_serialize_as_integer() {
        let json = serde_json::to_string(&Amount::new(1500)).unwrap();
        assert_eq!(json, "1500");
    }

    #[test]
    fn test_deserialize_from_integer() {
        let amount: Amount = serde_json::from_str("1500").unwrap();
        assert_eq!(amount.value(), 1500);
    }
}
