//! Rounding and cap policies.
//!
//! Rounding happens exactly once per component, after proration and before
//! caps. Both steps are pure functions over [`Decimal`].

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::RoundingMode;

/// Largest number of decimals a [`Decimal`] can carry.
pub const MAX_ROUNDING_DECIMALS: u32 = 28;

/// Rounds a value according to a rounding mode.
///
/// - `HalfUp` rounds to nearest, ties away from zero.
/// - `Up` always rounds away from zero.
/// - `Down` always truncates toward zero.
/// - `None` leaves the value at full precision.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::apply_rounding;
/// use payroll_engine::models::RoundingMode;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("123.455").unwrap();
/// assert_eq!(apply_rounding(value, RoundingMode::HalfUp, 2), Decimal::from_str("123.46").unwrap());
/// ```
pub fn apply_rounding(value: Decimal, mode: RoundingMode, decimals: u32) -> Decimal {
    let strategy = match mode {
        RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        RoundingMode::Up => RoundingStrategy::AwayFromZero,
        RoundingMode::Down => RoundingStrategy::ToZero,
        RoundingMode::None => return value,
    };
    value.round_dp_with_strategy(decimals, strategy)
}

/// The outcome of clamping a value to optional bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapOutcome {
    /// The clamped value.
    pub value: Decimal,
    /// The bound that was applied, if the value was outside the range.
    pub applied: Option<Decimal>,
}

/// Clamps a value to `[min, max]`; either bound may be absent.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::apply_caps;
/// use rust_decimal::Decimal;
///
/// let outcome = apply_caps(Decimal::new(1500, 0), Some(Decimal::ZERO), Some(Decimal::new(1000, 0)));
/// assert_eq!(outcome.value, Decimal::new(1000, 0));
/// assert_eq!(outcome.applied, Some(Decimal::new(1000, 0)));
/// ```
pub fn apply_caps(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> CapOutcome {
    if let Some(min) = min.filter(|min| value < *min) {
        return CapOutcome {
            value: min,
            applied: Some(min),
        };
    }
    if let Some(max) = max.filter(|max| value > *max) {
        return CapOutcome {
            value: max,
            applied: Some(max),
        };
    }
    CapOutcome {
        value,
        applied: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// RD-001: HALF_UP rounds ties away from zero
    #[test]
    fn test_half_up() {
        assert_eq!(apply_rounding(dec("123.455"), RoundingMode::HalfUp, 2), dec("123.46"));
        assert_eq!(apply_rounding(dec("123.454"), RoundingMode::HalfUp, 2), dec("123.45"));
        assert_eq!(
            apply_rounding(dec("-123.455"), RoundingMode::HalfUp, 2),
            dec("-123.46")
        );
    }

    /// RD-002: DOWN truncates toward zero
    #[test]
    fn test_down() {
        assert_eq!(apply_rounding(dec("123.459"), RoundingMode::Down, 2), dec("123.45"));
        assert_eq!(apply_rounding(dec("-123.459"), RoundingMode::Down, 2), dec("-123.45"));
    }

    /// RD-003: UP rounds away from zero
    #[test]
    fn test_up() {
        assert_eq!(apply_rounding(dec("123.451"), RoundingMode::Up, 2), dec("123.46"));
        assert_eq!(apply_rounding(dec("-123.451"), RoundingMode::Up, 2), dec("-123.46"));
        assert_eq!(apply_rounding(dec("123.45"), RoundingMode::Up, 2), dec("123.45"));
    }

    /// RD-004: NONE keeps full precision
    #[test]
    fn test_none_keeps_precision() {
        let value = dec("123.456789012345");
        assert_eq!(apply_rounding(value, RoundingMode::None, 2), value);
    }

    #[test]
    fn test_zero_decimals() {
        assert_eq!(apply_rounding(dec("2.5"), RoundingMode::HalfUp, 0), dec("3"));
        assert_eq!(apply_rounding(dec("2.9"), RoundingMode::Down, 0), dec("2"));
    }

    /// CP-001: value above max is capped
    #[test]
    fn test_cap_max() {
        let outcome = apply_caps(dec("1500"), Some(dec("0")), Some(dec("1000")));
        assert_eq!(outcome.value, dec("1000"));
        assert_eq!(outcome.applied, Some(dec("1000")));
    }

    /// CP-002: value below min is raised
    #[test]
    fn test_cap_min() {
        let outcome = apply_caps(dec("-50"), Some(dec("0")), None);
        assert_eq!(outcome.value, dec("0"));
        assert_eq!(outcome.applied, Some(dec("0")));
    }

    #[test]
    fn test_value_within_bounds_is_untouched() {
        let outcome = apply_caps(dec("500"), Some(dec("0")), Some(dec("1000")));
        assert_eq!(outcome.value, dec("500"));
        assert_eq!(outcome.applied, None);
    }

    #[test]
    fn test_no_bounds() {
        let outcome = apply_caps(dec("-99999"), None, None);
        assert_eq!(outcome.value, dec("-99999"));
        assert_eq!(outcome.applied, None);
    }

    proptest! {
        #[test]
        fn prop_capped_value_within_bounds(
            raw in -1_000_000i64..1_000_000i64,
            lo in -1000i64..1000i64,
            span in 0i64..5000i64,
        ) {
            let min = Decimal::new(lo, 0);
            let max = Decimal::new(lo + span, 0);
            let outcome = apply_caps(Decimal::new(raw, 2), Some(min), Some(max));
            prop_assert!(outcome.value >= min && outcome.value <= max);
        }

        #[test]
        fn prop_rounding_is_idempotent(mantissa in -10_000_000i64..10_000_000i64, dp in 0u32..4) {
            let value = Decimal::new(mantissa, 4);
            for mode in [RoundingMode::HalfUp, RoundingMode::Up, RoundingMode::Down] {
                let once = apply_rounding(value, mode, dp);
                prop_assert_eq!(apply_rounding(once, mode, dp), once);
            }
        }

        #[test]
        fn prop_down_never_grows_magnitude(mantissa in -10_000_000i64..10_000_000i64) {
            let value = Decimal::new(mantissa, 4);
            let rounded = apply_rounding(value, RoundingMode::Down, 2);
            prop_assert!(rounded.abs() <= value.abs());
        }
    }
}
