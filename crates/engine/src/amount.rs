use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::EngineError;

/// Exact decimal amount of a record.
///
/// Amounts travel as strings and are persisted as text, so no value ever goes
/// through binary floating point. The scale written by the user is kept:
/// `"12.50"` is rendered back as `"12.50"`.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let taxi: Amount = "12.50".parse().unwrap();
/// let tip: Amount = "0.5".parse().unwrap();
/// assert_eq!(taxi.checked_add(tip).unwrap().to_string(), "13.00");
/// assert!("1e3".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Exact sum of `amounts` (returns `None` on overflow). An empty input
    /// sums to zero.
    #[must_use]
    pub fn total<I>(amounts: I) -> Option<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a plain decimal string.
    ///
    /// Accepts an optional leading `+`/`-` and at most one `.`. Rejects
    /// empty strings, thousands separators and scientific notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidInput(format!("invalid amount: {s}"));

        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('-')
            .or_else(|| trimmed.strip_prefix('+'))
            .unwrap_or(trimmed);

        let mut parts = digits.split('.');
        let int_part = parts.next().unwrap_or_default();
        let frac_part = parts.next();
        if parts.next().is_some() || int_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if let Some(frac) = frac_part
            && (frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(invalid());
        }

        let normalized = trimmed.strip_prefix('+').unwrap_or(trimmed);
        Decimal::from_str_exact(normalized)
            .map(Amount)
            .map_err(|_| invalid())
    }
}
