//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) so that balances accumulate
//! exactly. Decimal input is rounded to cents once, at the edge, using
//! round-half-away-from-zero. Also hosts the allocation helpers used to
//! split an expense into per-member shares without losing a cent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use roomies::models::Money;
    /// let amount = Money::from_cents(8575); // $85.75
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from dollars and cents
    pub const fn from_dollars_cents(dollars: i64, cents: i64) -> Self {
        Self(dollars * 100 + cents)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole dollars portion (truncated toward zero)
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition, `None` on overflow
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum `amounts`, `None` if the total leaves the cent range
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Parse a money amount from a string
    ///
    /// Accepts "10.50", "-10.50", "$10.50", "10" (whole units) and ".5".
    /// Digits past the second decimal place are rounded half away from zero,
    /// so "10.555" becomes 10.56 and "-10.555" becomes -10.56.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let input = s.trim();
        let invalid = || MoneyParseError::InvalidFormat(input.to_string());

        let (negative, rest) = match input.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, input),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);

        let (whole, frac) = rest.split_once('.').unwrap_or((rest, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let cents = dollars
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(|| MoneyParseError::OutOfRange(input.to_string()))?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Allocate this amount across `weights`, returning one share per weight
    ///
    /// Shares always sum to exactly this amount. Each share gets the floor of
    /// its proportional part; leftover cents go one at a time to the largest
    /// fractional remainders, earlier positions winning ties. A zero total
    /// weight yields all-zero shares.
    pub fn allocate(&self, weights: &[u64]) -> Vec<Money> {
        let total: u128 = weights.iter().map(|&w| u128::from(w)).sum();
        if total == 0 {
            return vec![Money::zero(); weights.len()];
        }

        let magnitude = u128::from(self.0.unsigned_abs());
        let mut shares: Vec<u128> = weights
            .iter()
            .map(|&w| magnitude * u128::from(w) / total)
            .collect();

        let mut remainders: Vec<(usize, u128)> = weights
            .iter()
            .enumerate()
            .map(|(idx, &w)| (idx, magnitude * u128::from(w) % total))
            .collect();
        remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut leftover = magnitude - shares.iter().sum::<u128>();
        for (idx, _) in remainders {
            if leftover == 0 {
                break;
            }
            shares[idx] += 1;
            leftover -= 1;
        }

        let sign = self.0.signum();
        shares
            .into_iter()
            .map(|share| Money(sign * share as i64))
            .collect()
    }

    /// Split evenly across `parts` shares; remainder cents go to the first shares
    pub fn split_evenly(&self, parts: usize) -> Vec<Money> {
        self.allocate(&vec![1; parts])
    }

    /// This amount as a share of `total`, in basis points (10000 = 100%)
    ///
    /// Returns `None` when `total` is zero.
    pub fn basis_points_of(&self, total: Money) -> Option<i64> {
        if total.is_zero() {
            return None;
        }
        let bp = round_half_away_from_zero(i128::from(self.0) * 10_000, i128::from(total.0));
        Some(bp as i64)
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!(
                "-{}{}.{:02}",
                symbol,
                self.dollars().abs(),
                self.cents_part()
            )
        } else {
            format!("{}{}.{:02}", symbol, self.dollars(), self.cents_part())
        }
    }
}

/// Integer division rounding half away from zero
///
/// `denominator` must be non-zero.
pub fn round_half_away_from_zero(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) != (denominator < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

/// Format basis points as a percentage string ("33.33%")
pub fn format_basis_points(bp: i64) -> String {
    let sign = if bp < 0 { "-" } else { "" };
    let bp = bp.abs();
    format!("{}{}.{:02}%", sign, bp / 100, bp % 100)
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    OutOfRange(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::OutOfRange(s) => write!(f, "Amount out of range: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.cents(), 1050);
        assert_eq!(m.dollars(), 10);
        assert_eq!(m.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1050)), "$10.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(-1050)), "-$10.50");
        assert_eq!(format!("{}", Money::from_cents(5)), "$0.05");
        assert_eq!(Money::from_cents(-6431).format_with_symbol("€"), "-€64.31");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("$10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse(".5").unwrap().cents(), 50);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
    }

    #[test]
    fn test_parse_rounds_half_away_from_zero() {
        assert_eq!(Money::parse("10.555").unwrap().cents(), 1056);
        assert_eq!(Money::parse("10.554").unwrap().cents(), 1055);
        assert_eq!(Money::parse("-10.555").unwrap().cents(), -1056);
        assert_eq!(Money::parse("0.995").unwrap().cents(), 100);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("NaN").is_err());
        assert!(Money::parse("inf").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("1e5").is_err());
        assert!(Money::parse("-").is_err());
    }

    #[test]
    fn test_split_evenly_distributes_remainder_first() {
        let shares = Money::from_cents(8575).split_evenly(4);
        let cents: Vec<i64> = shares.iter().map(|m| m.cents()).collect();
        assert_eq!(cents, vec![2144, 2144, 2144, 2143]);
        assert_eq!(shares.iter().sum::<Money>().cents(), 8575);
    }

    #[test]
    fn test_allocate_largest_remainder() {
        // 100.00 at 33.33% / 33.33% / 33.34%
        let shares = Money::from_cents(10000).allocate(&[3333, 3333, 3334]);
        let cents: Vec<i64> = shares.iter().map(|m| m.cents()).collect();
        assert_eq!(cents, vec![3333, 3333, 3334]);

        // 10.00 three ways by weight 1:1:1 -> 3.34, 3.33, 3.33
        let shares = Money::from_cents(1000).allocate(&[1, 1, 1]);
        let cents: Vec<i64> = shares.iter().map(|m| m.cents()).collect();
        assert_eq!(cents, vec![334, 333, 333]);

        // the larger fraction wins the spare cent even when listed later
        let shares = Money::from_cents(101).allocate(&[1, 3]);
        let cents: Vec<i64> = shares.iter().map(|m| m.cents()).collect();
        assert_eq!(cents, vec![25, 76]);
    }

    #[test]
    fn test_allocate_zero_weights() {
        let shares = Money::from_cents(500).allocate(&[0, 0]);
        assert!(shares.iter().all(|m| m.is_zero()));
        assert!(Money::from_cents(500).allocate(&[]).is_empty());

        let shares = Money::from_cents(500).allocate(&[0, 1]);
        assert_eq!(shares, vec![Money::zero(), Money::from_cents(500)]);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_half_away_from_zero(5, 2), 3);
        assert_eq!(round_half_away_from_zero(-5, 2), -3);
        assert_eq!(round_half_away_from_zero(4, 3), 1);
        assert_eq!(round_half_away_from_zero(-4, 3), -1);
        assert_eq!(round_half_away_from_zero(5, -2), -3);
    }

    #[test]
    fn test_basis_points_of() {
        let total = Money::from_cents(8575);
        assert_eq!(Money::from_cents(2144).basis_points_of(total), Some(2500));
        assert_eq!(Money::from_cents(2143).basis_points_of(total), Some(2499));
        assert_eq!(Money::from_cents(100).basis_points_of(Money::zero()), None);
        assert_eq!(format_basis_points(2499), "24.99%");
        assert_eq!(format_basis_points(10000), "100.00%");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(a), None);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
        assert_eq!(Money::checked_sum([a, b, b]), Some(total));
        assert_eq!(Money::checked_sum([Money::from_cents(i64::MAX), b]), None);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
