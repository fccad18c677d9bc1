//! Shared value types for the fulfillment domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry values
//! that take part in domain computations: money amounts and the autopilot
//! settings snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::SettingKey;

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// A US dollar amount.
///
/// Profit may legitimately be negative, so unlike a price this type accepts
/// any finite value. Ledger cells are rendered with two decimals via
/// [`Money::to_cell`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Money(f64);

impl Money {
    /// Creates a [`Money`] amount, returning `None` for infinite or NaN values.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    /// Exactly zero dollars.
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Parses a ledger cell leniently.
    ///
    /// Cells are free text in the spreadsheet, so only the leading numeric
    /// prefix counts (`"12.50 USD"` is 12.50). Returns `None` when the cell does
    /// not start with a number.
    pub fn parse_cell(cell: &str) -> Option<Self> {
        parse_leading_f64(cell).and_then(Self::new)
    }

    /// Returns the underlying amount.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Renders the amount with two decimals and no currency sign.
    pub fn to_cell(self) -> String {
        format!("{:.2}", self.0)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

/// Parses the longest numeric prefix of `text` (after leading whitespace).
///
/// Accepts an optional sign, digits with at most one decimal point, and an
/// optional exponent.
fn parse_leading_f64(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

// ---------------------------------------------------------------------------
// Settings snapshot
// ---------------------------------------------------------------------------

/// Value a toggle must hold, exactly, to count as enabled.
pub const TOGGLE_ON: &str = "ON";

/// Value reported for the global switch when the table has no entry for it.
pub const TOGGLE_OFF: &str = "OFF";

/// A snapshot of the settings table: key → raw value.
///
/// Loaded once per request and passed into the router explicitly, so routing
/// decisions never read ambient state. Values other than `"ON"` (including
/// lower-case `"on"`) are treated as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, String>);

impl Settings {
    /// Creates an empty snapshot (every toggle disabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the raw value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` only when `key` holds exactly `"ON"`.
    pub fn is_on(&self, key: &str) -> bool {
        self.get(key) == Some(TOGGLE_ON)
    }

    /// Returns `true` when the global kill switch is on.
    pub fn global_enabled(&self) -> bool {
        self.is_on(SettingKey::GLOBAL)
    }

    /// Returns the snapshot as it should be reported to operators: the global
    /// switch is always present and defaults to `"OFF"` when unset or empty.
    pub fn with_reported_defaults(mut self) -> Self {
        let missing = self
            .get(SettingKey::GLOBAL)
            .map_or(true, |v| v.is_empty());
        if missing {
            self.insert(SettingKey::GLOBAL, TOGGLE_OFF);
        }
        self
    }

    /// Returns `true` if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_cells_are_parsed_leniently() {
        assert_eq!(Money::parse_cell("12.5").unwrap().as_f64(), 12.5);
        assert_eq!(Money::parse_cell("  -3.25 USD").unwrap().as_f64(), -3.25);
        assert_eq!(Money::parse_cell("1e2").unwrap().as_f64(), 100.0);
        assert_eq!(Money::parse_cell("7e").unwrap().as_f64(), 7.0);
        assert_eq!(Money::parse_cell(".5").unwrap().as_f64(), 0.5);
        assert!(Money::parse_cell("").is_none());
        assert!(Money::parse_cell("n/a").is_none());
        assert!(Money::parse_cell("-").is_none());
    }

    #[test]
    fn money_renders_two_decimals() {
        assert_eq!(Money::new(23.5).unwrap().to_cell(), "23.50");
        assert_eq!((Money::zero() - Money::new(1.5).unwrap()).to_cell(), "-1.50");
        assert!(Money::new(f64::NAN).is_none());
    }

    #[test]
    fn only_exact_on_enables_a_toggle() {
        let settings: Settings = [("A", "ON"), ("B", "on"), ("C", "OFF"), ("D", "YES")]
            .into_iter()
            .collect();
        assert!(settings.is_on("A"));
        assert!(!settings.is_on("B"));
        assert!(!settings.is_on("C"));
        assert!(!settings.is_on("D"));
        assert!(!settings.is_on("missing"));
    }

    #[test]
    fn reported_defaults_inject_global_off() {
        let reported = Settings::new().with_reported_defaults();
        assert_eq!(reported.get(SettingKey::GLOBAL), Some("OFF"));

        let mut empty_value = Settings::new();
        empty_value.insert(SettingKey::GLOBAL, "");
        assert_eq!(
            empty_value.with_reported_defaults().get(SettingKey::GLOBAL),
            Some("OFF")
        );

        let mut on = Settings::new();
        on.insert(SettingKey::GLOBAL, "ON");
        assert_eq!(on.with_reported_defaults().get(SettingKey::GLOBAL), Some("ON"));
    }
}
