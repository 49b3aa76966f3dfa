//! Overflow-checked `Decimal` arithmetic for formula code.
//!
//! `Decimal` tops out near 7.9e28 and its operators panic past that. These
//! helpers turn overflow into `InvalidInput` on the named field and a zero
//! divisor into `DivisionByZero`.

use rust_decimal::Decimal;

use crate::error::FinWizError;
use crate::FinWizResult;

fn out_of_range(field: &str) -> FinWizError {
    FinWizError::InvalidInput {
        field: field.into(),
        reason: "result exceeds the decimal range".into(),
    }
}

pub(crate) fn add(a: Decimal, b: Decimal, field: &str) -> FinWizResult<Decimal> {
    a.checked_add(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn sub(a: Decimal, b: Decimal, field: &str) -> FinWizResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn mul(a: Decimal, b: Decimal, field: &str) -> FinWizResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn div(a: Decimal, b: Decimal, field: &str) -> FinWizResult<Decimal> {
    if b.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: format!("{field}: divisor is zero"),
        });
    }
    a.checked_div(b).ok_or_else(|| out_of_range(field))
}

/// Checked sum of an iterator of fallible terms.
pub(crate) fn sum<I>(terms: I, field: &str) -> FinWizResult<Decimal>
where
    I: IntoIterator<Item = FinWizResult<Decimal>>,
{
    terms
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, term| add(acc, term?, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overflow_is_invalid_input() {
        let err = mul(Decimal::MAX, dec!(2), "value").unwrap_err();
        assert!(matches!(err, FinWizError::InvalidInput { ref field, .. } if field == "value"));
        assert!(div(Decimal::MAX, dec!(0.5), "value").is_err());
        assert!(add(Decimal::MAX, Decimal::MAX, "value").is_err());
        assert!(sub(Decimal::MIN, Decimal::MAX, "value").is_err());
    }

    #[test]
    fn test_zero_divisor_is_division_by_zero() {
        assert!(matches!(
            div(dec!(1), Decimal::ZERO, "value"),
            Err(FinWizError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_sum_propagates_and_adds() {
        let ok = sum([Ok(dec!(1)), Ok(dec!(2.5))], "total").unwrap();
        assert_eq!(ok, dec!(3.5));
        assert!(sum([Ok(Decimal::MAX), Ok(Decimal::MAX)], "total").is_err());
    }
}
