use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use finwiz_core::time_value::{self, AnnuityRequest};

use crate::input;

/// Arguments for an annuity / lump-sum request
#[derive(Args)]
pub struct AnnuityArgs {
    /// Path to JSON input file, e.g. {"calculation": "payout_annuity", ...}
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_annuity(args: AnnuityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: AnnuityRequest = input::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for annuity")?;
    debug!(?request, "evaluating annuity request");
    let result = time_value::evaluate_annuity(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a level perpetuity
#[derive(Args)]
pub struct PerpetuityArgs {
    /// Payment received each period
    #[arg(long, allow_hyphen_values = true)]
    pub payment: Decimal,

    /// Periodic discount rate (e.g. 0.05 for 5%)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Decimal,
}

pub fn run_perpetuity(args: PerpetuityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = AnnuityRequest::Perpetuity {
        payment: args.payment,
        rate: args.rate,
    };
    let result = time_value::evaluate_annuity(&request)?;
    Ok(serde_json::to_value(result)?)
}
