use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::checked;
use crate::error::FinWizError;
use crate::types::{with_metadata, ComputationOutput, Money, Periods, Rate};
use crate::FinWizResult;

/// Relative gap between a supplied price and the discounted schedule above
/// which a warning is raised.
const PRICE_MISMATCH_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for duration and convexity analytics over an arbitrary schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowRiskInput {
    /// Cash flow received at the end of period i+1, equally spaced
    pub cash_flows: Vec<Money>,
    /// Periodic yield to maturity as a decimal
    pub ytm: Rate,
    /// Observed price. When omitted the schedule is priced at `ytm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bond_price: Option<Money>,
}

/// Output of [`analyze_cash_flows`]. All durations are in periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowRiskOutput {
    /// Price used as the weighting denominator
    pub price: Money,
    /// Whether `price` was supplied or derived by discounting the schedule
    pub price_source: String,
    pub macaulay_duration: Periods,
    /// Macaulay duration / (1 + ytm)
    pub modified_duration: Periods,
    pub convexity: Decimal,
    /// Price change for a one basis point yield move (modified_duration * price * 0.0001)
    pub dv01: Money,
    /// Estimated % price change for +100 bp using duration + convexity
    pub price_change_up_100bp: Decimal,
    /// Estimated % price change for -100 bp using duration + convexity
    pub price_change_down_100bp: Decimal,
    pub num_periods: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Present value of the schedule: sum of cf_i / (1+ytm)^(i+1).
pub fn bond_price(cash_flows: &[Money], ytm: Rate) -> FinWizResult<Money> {
    checked::sum(
        discounted_flows(cash_flows, ytm)?.into_iter().map(|(_, pv)| Ok(pv)),
        "bond_price",
    )
}

/// Macaulay duration of the schedule, in periods.
///
/// sum_i [ PV(cf_i) / bond_price * (i+1) ]. An empty schedule has zero
/// duration.
pub fn duration(cash_flows: &[Money], ytm: Rate, bond_price: Money) -> FinWizResult<Periods> {
    if bond_price.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "Macaulay duration: bond price is zero".to_string(),
        });
    }

    let weighted_sum = checked::sum(
        discounted_flows(cash_flows, ytm)?
            .into_iter()
            .map(|(t, pv)| checked::mul(pv, t, "macaulay_duration")),
        "macaulay_duration",
    )?;

    checked::div(weighted_sum, bond_price, "macaulay_duration")
}

/// Modified duration from a Macaulay duration: D / (1 + ytm).
pub fn modified_duration(macaulay_duration: Periods, ytm: Rate) -> FinWizResult<Periods> {
    let one_plus_y = checked::add(Decimal::ONE, ytm, "ytm")?;
    if one_plus_y.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "modified duration: (1 + ytm) is zero".to_string(),
        });
    }
    checked::div(macaulay_duration, one_plus_y, "modified_duration")
}

/// Convexity of the schedule, in periods squared.
///
/// sum_i [ PV(cf_i) * (i+1) * (i+2) ] / (bond_price * (1+ytm)^2)
pub fn convexity(cash_flows: &[Money], ytm: Rate, bond_price: Money) -> FinWizResult<Decimal> {
    if bond_price.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "convexity: bond price is zero".to_string(),
        });
    }

    let numerator = checked::sum(
        discounted_flows(cash_flows, ytm)?.into_iter().map(|(t, pv)| {
            checked::mul(checked::mul(pv, t, "convexity")?, t + Decimal::ONE, "convexity")
        }),
        "convexity",
    )?;

    let one_plus_y = checked::add(Decimal::ONE, ytm, "ytm")?;
    let denominator = checked::mul(
        checked::mul(bond_price, one_plus_y, "convexity")?,
        one_plus_y,
        "convexity",
    )?;
    if denominator.is_zero() {
        return Err(FinWizError::DivisionByZero {
            context: "convexity: denominator is zero".to_string(),
        });
    }

    checked::div(numerator, denominator, "convexity")
}

/// Full duration/convexity risk profile of a cash-flow schedule.
pub fn analyze_cash_flows(
    input: &CashFlowRiskInput,
) -> FinWizResult<ComputationOutput<CashFlowRiskOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.cash_flows.is_empty() && input.bond_price.is_none() {
        return Err(FinWizError::InvalidInput {
            field: "cash_flows".into(),
            reason: "An empty schedule cannot be priced; supply bond_price.".into(),
        });
    }
    if input.cash_flows.iter().any(|cf| *cf < Decimal::ZERO) {
        warnings.push("Schedule contains negative cash flows; convexity may be negative".into());
    }

    let (price, price_source) = match input.bond_price {
        Some(observed) => {
            let model = bond_price(&input.cash_flows, input.ytm)?;
            let gap = checked::sub(model, observed, "bond_price")?;
            if !observed.is_zero()
                && checked::div(gap, observed, "bond_price")?.abs() > PRICE_MISMATCH_TOLERANCE
            {
                warnings.push(format!(
                    "Supplied price {observed} differs from the schedule discounted at ytm ({}) by more than 1%",
                    model.round_dp(4)
                ));
            }
            (observed, "supplied")
        }
        None => (bond_price(&input.cash_flows, input.ytm)?, "discounted"),
    };

    let macaulay = duration(&input.cash_flows, input.ytm, price)?;
    let modified = modified_duration(macaulay, input.ytm)?;
    let convex = convexity(&input.cash_flows, input.ytm, price)?;

    let dv01 = checked::mul(checked::mul(modified, price, "dv01")?, dec!(0.0001), "dv01")?;
    let delta_y = dec!(0.01);
    let second_order = checked::mul(dec!(0.5) * delta_y * delta_y, convex, "convexity")?;
    let first_order = checked::mul(modified, delta_y, "modified_duration")?;

    let output = CashFlowRiskOutput {
        price,
        price_source: price_source.to_string(),
        macaulay_duration: macaulay,
        modified_duration: modified,
        convexity: convex,
        dv01,
        price_change_up_100bp: checked::sub(second_order, first_order, "price_change_up_100bp")?,
        price_change_down_100bp: checked::add(second_order, first_order, "price_change_down_100bp")?,
        num_periods: input.cash_flows.len(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "cash_flow_timing": "end of each equally spaced period",
        "duration_units": "periods",
        "ytm": input.ytm.to_string(),
        "price_change_estimate_shift": "100 bps",
    });

    Ok(with_metadata(
        "Macaulay / Modified Duration & Convexity of a periodic cash-flow schedule",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// (period number, PV) for each flow, discounting by iterative multiplication.
///
/// df_t = df_{t-1} * (1 + ytm), PV_t = cf_t / df_t.
fn discounted_flows(cash_flows: &[Money], ytm: Rate) -> FinWizResult<Vec<(Decimal, Money)>> {
    let one_plus_y = checked::add(Decimal::ONE, ytm, "ytm")?;
    let mut df = Decimal::ONE;
    let mut flows = Vec::with_capacity(cash_flows.len());

    for (i, cf) in cash_flows.iter().enumerate() {
        df = df.checked_mul(one_plus_y).ok_or_else(|| FinWizError::InvalidInput {
            field: "ytm".into(),
            reason: format!("discount factor at period {} exceeds the decimal range", i + 1),
        })?;
        if df.is_zero() {
            return Err(FinWizError::DivisionByZero {
                context: format!("discount factor at period {} is zero", i + 1),
            });
        }
        flows.push((Decimal::from(i as u64 + 1), checked::div(*cf, df, "cash_flows")?));
    }

    Ok(flows)
}
