use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::checked;
use crate::error::FinWizError;
use crate::types::{with_metadata, ComputationOutput, Money, Periods};
use crate::FinWizResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Portfolio weights in two assets whose blended duration matches a liability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmunizationWeights {
    /// Weight in the asset with the first duration
    pub first: Decimal,
    /// Weight in the asset with the second duration; always 1 - first
    pub second: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImmunizationInput {
    pub first_duration: Periods,
    pub second_duration: Periods,
    pub liability_duration: Periods,
    /// Present value of the liability. When given, weights are turned into
    /// money allocations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liability_value: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImmunizationOutput {
    pub first_weight: Decimal,
    pub second_weight: Decimal,
    /// Blended duration of the weighted portfolio
    pub portfolio_duration: Periods,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_allocation: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_allocation: Option<Money>,
    /// True when one weight is negative (liability duration outside the asset range)
    pub requires_short_position: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve w1 * D1 + (1 - w1) * D2 = D_L for the two asset weights.
///
/// w1 = (D2 - D_L) / (D2 - D1), w2 = 1 - w1. Fails when the two asset
/// durations are equal, since no blend can then move the portfolio duration.
pub fn immunization_weights(
    first_duration: Periods,
    second_duration: Periods,
    liability_duration: Periods,
) -> FinWizResult<ImmunizationWeights> {
    if first_duration == second_duration {
        return Err(FinWizError::InvalidInput {
            field: "second_duration".into(),
            reason: "Asset durations must differ to immunize a liability.".into(),
        });
    }

    let first = checked::div(
        checked::sub(second_duration, liability_duration, "liability_duration")?,
        checked::sub(second_duration, first_duration, "second_duration")?,
        "first_weight",
    )?;
    Ok(ImmunizationWeights {
        first,
        second: checked::sub(Decimal::ONE, first, "second_weight")?,
    })
}

/// Immunize a liability with two assets, reporting weights, blended
/// duration and optional money allocations.
pub fn immunize(input: &ImmunizationInput) -> FinWizResult<ComputationOutput<ImmunizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let weights = immunization_weights(
        input.first_duration,
        input.second_duration,
        input.liability_duration,
    )?;

    let requires_short_position = weights.first < Decimal::ZERO || weights.second < Decimal::ZERO;
    if requires_short_position {
        warnings.push(format!(
            "Liability duration {} lies outside [{}, {}]; one asset must be sold short",
            input.liability_duration,
            input.first_duration.min(input.second_duration),
            input.first_duration.max(input.second_duration),
        ));
    }
    if let Some(value) = input.liability_value {
        if value <= Decimal::ZERO {
            warnings.push("Liability value is not positive; allocations are not meaningful".into());
        }
    }

    let portfolio_duration = checked::add(
        checked::mul(weights.first, input.first_duration, "portfolio_duration")?,
        checked::mul(weights.second, input.second_duration, "portfolio_duration")?,
        "portfolio_duration",
    )?;
    let allocate = |weight: Decimal, field: &str| {
        input
            .liability_value
            .map(|v| checked::mul(v, weight, field))
            .transpose()
    };

    let output = ImmunizationOutput {
        first_weight: weights.first,
        second_weight: weights.second,
        portfolio_duration,
        first_allocation: allocate(weights.first, "first_allocation")?,
        second_allocation: allocate(weights.second, "second_allocation")?,
        requires_short_position,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "assets": 2,
        "matched_moment": "duration only (first order)",
        "rebalancing": "none",
    });

    Ok(with_metadata(
        "Two-asset duration matching (Redington immunization)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_weights_textbook() {
        let w = immunization_weights(dec!(2.0), dec!(5.0), dec!(3.0)).unwrap();
        assert_eq!(w.first, dec!(2) / dec!(3));
        assert_eq!(w.first + w.second, Decimal::ONE);
    }

    #[test]
    fn test_weights_at_endpoints() {
        let w = immunization_weights(dec!(2), dec!(5), dec!(2)).unwrap();
        assert_eq!(
            w,
            ImmunizationWeights {
                first: Decimal::ONE,
                second: Decimal::ZERO
            }
        );
        let w = immunization_weights(dec!(2), dec!(5), dec!(5)).unwrap();
        assert_eq!(w.first, Decimal::ZERO);
        assert_eq!(w.second, Decimal::ONE);
    }

    #[test]
    fn test_equal_durations_rejected() {
        for d in [dec!(0), dec!(3.5), dec!(-1)] {
            let err = immunization_weights(d, d, dec!(4)).unwrap_err();
            assert!(matches!(err, FinWizError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_weights_outside_decimal_range_are_invalid_input() {
        let err = immunization_weights(Decimal::MIN, Decimal::MAX, dec!(0)).unwrap_err();
        assert!(matches!(err, FinWizError::InvalidInput { .. }));
    }

    #[test]
    fn test_immunize_allocations_and_blend() {
        let input = ImmunizationInput {
            first_duration: dec!(2),
            second_duration: dec!(6),
            liability_duration: dec!(5),
            liability_value: Some(dec!(1000000)),
        };
        let out = immunize(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.first_weight, dec!(0.25));
        assert_eq!(r.second_weight, dec!(0.75));
        assert_eq!(r.portfolio_duration, dec!(5));
        assert_eq!(r.first_allocation, Some(dec!(250000)));
        assert_eq!(r.second_allocation, Some(dec!(750000)));
        assert!(!r.requires_short_position);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_immunize_flags_short_position() {
        let input = ImmunizationInput {
            first_duration: dec!(2),
            second_duration: dec!(5),
            liability_duration: dec!(8),
            liability_value: None,
        };
        let out = immunize(&input).unwrap();
        assert!(out.result.requires_short_position);
        assert_eq!(out.result.first_weight, dec!(-1));
        assert_eq!(out.result.second_weight, dec!(2));
        assert!(out.result.first_allocation.is_none());
        assert_eq!(out.warnings.len(), 1);
    }
}
