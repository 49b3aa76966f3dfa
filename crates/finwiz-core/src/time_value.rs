use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::checked;
use crate::error::FinWizError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinWizResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single time-value-of-money calculation, tagged by `calculation`.
///
/// ```json
/// { "calculation": "payout_annuity", "present_value": "250000", "rate": "0.004", "periods": 300 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculation", rename_all = "snake_case")]
pub enum AnnuityRequest {
    /// Level payment that exhausts `present_value` over `periods`
    PayoutAnnuity {
        present_value: Money,
        rate: Rate,
        periods: u32,
    },
    /// Accumulated value of end-of-period payments
    FvOrdinaryAnnuity {
        payment: Money,
        rate: Rate,
        periods: u32,
    },
    /// Present value of end-of-period payments
    PvOrdinaryAnnuity {
        payment: Money,
        rate: Rate,
        periods: u32,
    },
    /// Present value of start-of-period payments
    PvAnnuityDue {
        payment: Money,
        rate: Rate,
        periods: u32,
    },
    /// Level payment whose present value equals `present_value`
    PmtGivenPv {
        present_value: Money,
        rate: Rate,
        periods: u32,
    },
    Perpetuity {
        payment: Money,
        rate: Rate,
    },
    /// Accumulated value of payments growing at `growth_rate` per period
    FvGrowingOrdinaryAnnuity {
        payment: Money,
        rate: Rate,
        periods: u32,
        growth_rate: Rate,
    },
    FvLumpSum {
        present_value: Money,
        rate: Rate,
        periods: u32,
    },
    PvLumpSum {
        future_value: Money,
        rate: Rate,
        periods: u32,
    },
}

/// Result of an [`AnnuityRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnuityOutput {
    /// Snake-case name of the calculation performed
    pub calculation: String,
    /// The computed value (a payment, present value or future value)
    pub value: Money,
    /// Sum of all level payments, for calculations that solve for a payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_payments: Option<Money>,
    /// Portion of `total_payments` that is return on capital rather than principal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_component: Option<Money>,
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Level payment drawn from `pv` so that it is exhausted after `n` periods.
///
/// pmt = pv * r / (1 - (1+r)^-n)
pub fn payout_annuity(pv: Money, r: Rate, n: u32) -> FinWizResult<Money> {
    require_nonzero_rate(r, "payout annuity")?;
    let factor = compound_factor(r, n)?;
    if factor.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "payout annuity: (1 + r)^n is zero".into(),
        });
    }

    let discount = checked::div(Decimal::ONE, factor, "rate")?;
    let denominator = checked::sub(Decimal::ONE, discount, "rate")?;
    if denominator.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "payout annuity: 1 - (1 + r)^-n is zero".into(),
        });
    }

    checked::div(checked::mul(pv, r, "value")?, denominator, "value")
}

/// Future value of an ordinary annuity: pmt * ((1+r)^n - 1) / r
pub fn fv_ordinary_annuity(pmt: Money, r: Rate, n: u32) -> FinWizResult<Money> {
    require_nonzero_rate(r, "future value of ordinary annuity")?;
    let factor = compound_factor(r, n)?;
    let growth = checked::mul(pmt, checked::sub(factor, Decimal::ONE, "periods")?, "value")?;
    checked::div(growth, r, "value")
}

/// Present value of an ordinary annuity: pmt * (1/r - 1/(r * (1+r)^n))
pub fn pv_ordinary_annuity(pmt: Money, r: Rate, n: u32) -> FinWizResult<Money> {
    checked::mul(
        pmt,
        annuity_factor(r, n, "present value of ordinary annuity")?,
        "value",
    )
}

/// Present value of an annuity due.
///
/// Payments arrive at the start of each period, so every cash flow is
/// discounted one period less than the ordinary annuity:
/// pmt * (1/r - 1/(r * (1+r)^n)) * (1+r)
pub fn pv_annuity_due(pmt: Money, r: Rate, n: u32) -> FinWizResult<Money> {
    let one_plus_r = checked::add(Decimal::ONE, r, "rate")?;
    checked::mul(pv_ordinary_annuity(pmt, r, n)?, one_plus_r, "value")
}

/// Level payment whose ordinary-annuity present value equals `pv`.
pub fn pmt_given_pv(pv: Money, r: Rate, n: u32) -> FinWizResult<Money> {
    let factor = annuity_factor(r, n, "payment given present value")?;
    if factor.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "payment given present value: annuity factor is zero".into(),
        });
    }
    checked::div(pv, factor, "value")
}

/// Value of a level perpetuity: pmt / r
pub fn perpetuity(pmt: Money, r: Rate) -> FinWizResult<Money> {
    require_nonzero_rate(r, "perpetuity")?;
    checked::div(pmt, r, "value")
}

/// Future value of an ordinary annuity whose payment grows at `g` per period.
///
/// fv = pmt * ((1+r)^n - (1+g)^n) / (r - g)
pub fn fv_growing_ordinary_annuity(
    pmt: Money,
    r: Rate,
    n: u32,
    g: Rate,
) -> FinWizResult<Money> {
    let spread = checked::sub(r, g, "growth_rate")?;
    if spread.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "growing annuity: rate equals growth rate".into(),
        });
    }
    let rate_factor = compound_factor(r, n)?;
    let growth_factor = compound_factor(g, n)?;
    let accumulated = checked::mul(
        pmt,
        checked::sub(rate_factor, growth_factor, "periods")?,
        "value",
    )?;
    checked::div(accumulated, spread, "value")
}

/// Compound a single amount forward: pv * (1+r)^n
pub fn fv_lump_sum(pv: Money, r: Rate, n: u32) -> FinWizResult<Money> {
    checked::mul(pv, compound_factor(r, n)?, "value")
}

/// Discount a single amount back: fv / (1+r)^n
pub fn pv_lump_sum(fv: Money, r: Rate, n: u32) -> FinWizResult<Money> {
    let factor = compound_factor(r, n)?;
    if factor.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "lump sum discounting: (1 + r)^n is zero".into(),
        });
    }
    checked::div(fv, factor, "value")
}

/// Evaluate any [`AnnuityRequest`] and wrap the answer in the standard envelope.
pub fn evaluate_annuity(
    request: &AnnuityRequest,
) -> FinWizResult<ComputationOutput<AnnuityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (name, methodology, timing) = describe(request);
    let mut output = AnnuityOutput {
        calculation: name.to_string(),
        value: Decimal::ZERO,
        total_payments: None,
        interest_component: None,
    };

    match *request {
        AnnuityRequest::PayoutAnnuity {
            present_value,
            rate,
            periods,
        } => {
            output.value = payout_annuity(present_value, rate, periods)?;
            fill_payment_totals(&mut output, present_value, periods)?;
        }
        AnnuityRequest::FvOrdinaryAnnuity {
            payment,
            rate,
            periods,
        } => output.value = fv_ordinary_annuity(payment, rate, periods)?,
        AnnuityRequest::PvOrdinaryAnnuity {
            payment,
            rate,
            periods,
        } => output.value = pv_ordinary_annuity(payment, rate, periods)?,
        AnnuityRequest::PvAnnuityDue {
            payment,
            rate,
            periods,
        } => output.value = pv_annuity_due(payment, rate, periods)?,
        AnnuityRequest::PmtGivenPv {
            present_value,
            rate,
            periods,
        } => {
            output.value = pmt_given_pv(present_value, rate, periods)?;
            fill_payment_totals(&mut output, present_value, periods)?;
        }
        AnnuityRequest::Perpetuity { payment, rate } => {
            if rate < Decimal::ZERO {
                warnings.push("Negative rate: a perpetuity has no finite economic value".into());
            }
            output.value = perpetuity(payment, rate)?;
        }
        AnnuityRequest::FvGrowingOrdinaryAnnuity {
            payment,
            rate,
            periods,
            growth_rate,
        } => {
            if growth_rate > rate {
                warnings.push("Growth rate exceeds the periodic rate".into());
            }
            output.value = fv_growing_ordinary_annuity(payment, rate, periods, growth_rate)?;
        }
        AnnuityRequest::FvLumpSum {
            present_value,
            rate,
            periods,
        } => output.value = fv_lump_sum(present_value, rate, periods)?,
        AnnuityRequest::PvLumpSum {
            future_value,
            rate,
            periods,
        } => output.value = pv_lump_sum(future_value, rate, periods)?,
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "payment_timing": timing,
        "compounding": "once per period",
        "power_method": "iterative multiplication",
    });

    Ok(with_metadata(methodology, &assumptions, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// (1 + r)^n by repeated multiplication.
fn compound_factor(r: Rate, n: u32) -> FinWizResult<Decimal> {
    let one_plus_r = checked::add(Decimal::ONE, r, "rate")?;
    let mut factor = Decimal::ONE;
    for _ in 0..n {
        factor = factor
            .checked_mul(one_plus_r)
            .ok_or_else(|| FinWizError::InvalidInput {
                field: "periods".into(),
                reason: format!("(1 + {r})^{n} exceeds the decimal range"),
            })?;
    }
    Ok(factor)
}

/// 1/r - 1/(r * (1+r)^n), the present value of one unit paid each period.
fn annuity_factor(r: Rate, n: u32, context: &str) -> FinWizResult<Decimal> {
    require_nonzero_rate(r, context)?;
    let discounted = checked::mul(r, compound_factor(r, n)?, "periods")?;
    if discounted.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: format!("{context}: r * (1 + r)^n is zero"),
        });
    }
    checked::sub(
        checked::div(Decimal::ONE, r, "rate")?,
        checked::div(Decimal::ONE, discounted, "rate")?,
        "rate",
    )
}

fn require_nonzero_rate(r: Rate, context: &str) -> FinWizResult<()> {
    if r.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: format!("{context}: rate is zero"),
        });
    }
    Ok(())
}

fn fill_payment_totals(
    output: &mut AnnuityOutput,
    principal: Money,
    periods: u32,
) -> FinWizResult<()> {
    let total = checked::mul(output.value, Decimal::from(periods), "total_payments")?;
    output.total_payments = Some(total);
    output.interest_component = Some(checked::sub(total, principal, "interest_component")?);
    Ok(())
}

fn describe(request: &AnnuityRequest) -> (&'static str, &'static str, &'static str) {
    match request {
        AnnuityRequest::PayoutAnnuity { .. } => (
            "payout_annuity",
            "Payout annuity: pv * r / (1 - (1+r)^-n)",
            "end of period",
        ),
        AnnuityRequest::FvOrdinaryAnnuity { .. } => (
            "fv_ordinary_annuity",
            "Future value of ordinary annuity: pmt * ((1+r)^n - 1) / r",
            "end of period",
        ),
        AnnuityRequest::PvOrdinaryAnnuity { .. } => (
            "pv_ordinary_annuity",
            "Present value of ordinary annuity: pmt * (1/r - 1/(r(1+r)^n))",
            "end of period",
        ),
        AnnuityRequest::PvAnnuityDue { .. } => (
            "pv_annuity_due",
            "Present value of annuity due: pmt * (1/r - 1/(r(1+r)^n)) * (1+r)",
            "start of period",
        ),
        AnnuityRequest::PmtGivenPv { .. } => (
            "pmt_given_pv",
            "Payment given present value: pv / (1/r - 1/(r(1+r)^n))",
            "end of period",
        ),
        AnnuityRequest::Perpetuity { .. } => {
            ("perpetuity", "Level perpetuity: pmt / r", "end of period")
        }
        AnnuityRequest::FvGrowingOrdinaryAnnuity { .. } => (
            "fv_growing_ordinary_annuity",
            "Future value of growing annuity: pmt * ((1+r)^n - (1+g)^n) / (r - g)",
            "end of period",
        ),
        AnnuityRequest::FvLumpSum { .. } => (
            "fv_lump_sum",
            "Compounded lump sum: pv * (1+r)^n",
            "single amount",
        ),
        AnnuityRequest::PvLumpSum { .. } => (
            "pv_lump_sum",
            "Discounted lump sum: fv / (1+r)^n",
            "single amount",
        ),
    }
}
