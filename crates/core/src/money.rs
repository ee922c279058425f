//! Money in integer paise.
//!
//! All monetary values flow through this type. Storing the smallest currency
//! unit (paise) as `i64` keeps arithmetic exact; floating point never enters
//! ledger or invoice math. Percentages are expressed in basis points
//! (1800 bps = 18%) and rounded half-up via `i128` intermediates.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A monetary value in paise (1/100 rupee). Signed: ledger entries for
/// expenses are negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Whole rupees, no fractional part.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Apply a percentage expressed in basis points, rounding half-up.
    ///
    /// `Money::from_rupees(10_000).percent_bps(1800)` is ₹1,800 (18% GST).
    pub fn percent_bps(&self, bps: u32) -> Money {
        // i128 intermediate so large invoices cannot overflow.
        let paise = (self.0 as i128 * bps as i128 + 5_000) / 10_000;
        Money(paise as i64)
    }

    /// Parse a user-supplied rupee amount.
    ///
    /// Accepts an optional currency marker (`₹`, `Rs`, `Rs.`, `INR`,
    /// `rupees`), comma digit grouping and up to two decimal places
    /// (a third decimal digit rounds half-up): `"₹10,000"`, `"Rs. 1,500.50"`,
    /// `"inr 200"`, `"750"`.
    pub fn parse_rupees(input: &str) -> DomainResult<Money> {
        let trimmed = input.trim();
        let (trimmed, negative) = match trimmed.strip_prefix('-') {
            Some(rest) => (rest.trim_start(), true),
            None => (trimmed, false),
        };
        let s = strip_currency_marker(trimmed).trim_start();
        if s.is_empty() {
            return Err(DomainError::validation("amount is empty"));
        }

        let mut whole: i64 = 0;
        let mut frac_digits: Vec<u8> = Vec::new();
        let mut seen_digit = false;
        let mut in_fraction = false;

        for ch in s.chars() {
            match ch {
                '0'..='9' => {
                    seen_digit = true;
                    let d = (ch as u8 - b'0') as i64;
                    if in_fraction {
                        frac_digits.push(d as u8);
                    } else {
                        whole = whole
                            .checked_mul(10)
                            .and_then(|w| w.checked_add(d))
                            .ok_or_else(|| DomainError::validation("amount is too large"))?;
                    }
                }
                ',' if !in_fraction => {} // digit grouping, positions not enforced
                '.' if !in_fraction => in_fraction = true,
                c if c.is_whitespace() => {
                    // allow trailing whitespace only
                    break;
                }
                _ => {
                    return Err(DomainError::validation(format!(
                        "amount '{input}' contains unexpected character '{ch}'"
                    )));
                }
            }
        }

        if !seen_digit {
            return Err(DomainError::validation(format!(
                "amount '{input}' has no digits"
            )));
        }

        let p1 = *frac_digits.first().unwrap_or(&0) as i64;
        let p2 = *frac_digits.get(1).unwrap_or(&0) as i64;
        let round_up = frac_digits.get(2).is_some_and(|d| *d >= 5);

        let mut paise = whole
            .checked_mul(100)
            .and_then(|p| p.checked_add(p1 * 10 + p2))
            .ok_or_else(|| DomainError::validation("amount is too large"))?;
        if round_up {
            paise += 1;
        }
        Ok(Money(if negative { -paise } else { paise }))
    }
}

impl ValueObject for Money {}

/// Strip one leading currency marker, if any.
fn strip_currency_marker(s: &str) -> &str {
    if let Some(rest) = s.strip_prefix('₹') {
        return rest;
    }
    let lower = s.to_lowercase();
    for marker in ["rupees", "rupee", "inr", "rs.", "rs"] {
        if lower.starts_with(marker) {
            return &s[marker.len()..];
        }
    }
    s
}

/// Display with the ₹ sign and Indian digit grouping: `₹1,23,456.78`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let rupees = abs / 100;
        let paise = abs % 100;
        write!(f, "{sign}₹{}.{paise:02}", group_indian(rupees))
    }
}

/// Indian grouping: last three digits, then pairs (12,34,567).
fn group_indian(n: i64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let bytes = head.as_bytes();
    let mut end = bytes.len();
    while end > 2 {
        groups.push(core::str::from_utf8(&bytes[end - 2..end]).unwrap_or(""));
        end -= 2;
    }
    groups.push(core::str::from_utf8(&bytes[..end]).unwrap_or(""));
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_plain_and_marked_amounts() {
        assert_eq!(Money::parse_rupees("₹10,000").unwrap(), Money::from_rupees(10_000));
        assert_eq!(Money::parse_rupees("Rs. 1,500.50").unwrap(), Money::from_paise(150_050));
        assert_eq!(Money::parse_rupees("rs500").unwrap(), Money::from_rupees(500));
        assert_eq!(Money::parse_rupees("INR 200").unwrap(), Money::from_rupees(200));
        assert_eq!(Money::parse_rupees("rupees 75").unwrap(), Money::from_rupees(75));
        assert_eq!(Money::parse_rupees("750").unwrap(), Money::from_rupees(750));
    }

    #[test]
    fn parses_fractions_with_half_up_rounding() {
        assert_eq!(Money::parse_rupees("1.5").unwrap(), Money::from_paise(150));
        assert_eq!(Money::parse_rupees("1.005").unwrap(), Money::from_paise(101));
        assert_eq!(Money::parse_rupees("1.004").unwrap(), Money::from_paise(100));
    }

    #[test]
    fn rejects_non_amounts() {
        assert!(Money::parse_rupees("").is_err());
        assert!(Money::parse_rupees("₹").is_err());
        assert!(Money::parse_rupees("tomorrow").is_err());
        assert!(Money::parse_rupees("12abc").is_err());
    }

    #[test]
    fn percent_bps_rounds_half_up() {
        // ₹10,000 at 18% = ₹1,800
        assert_eq!(
            Money::from_rupees(10_000).percent_bps(1800),
            Money::from_rupees(1800)
        );
        // 1 paisa at 50% rounds up
        assert_eq!(Money::from_paise(1).percent_bps(5000), Money::from_paise(1));
    }

    #[test]
    fn displays_indian_grouping() {
        assert_eq!(Money::from_rupees(500).to_string(), "₹500.00");
        assert_eq!(Money::from_paise(12_34_56_778).to_string(), "₹12,34,567.78");
        assert_eq!(Money::from_paise(-55_000).to_string(), "-₹550.00");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    proptest! {
        /// Round-tripping a displayed amount through the parser is lossless.
        #[test]
        fn display_parse_round_trip(paise in 0i64..10_000_000_000) {
            let m = Money::from_paise(paise);
            let parsed = Money::parse_rupees(&m.to_string()).unwrap();
            prop_assert_eq!(parsed, m);
        }
    }
}
