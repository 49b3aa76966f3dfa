use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use finwiz_core::fixed_income::duration::{self, CashFlowRiskInput};
use finwiz_core::fixed_income::immunization::{self, ImmunizationInput};

use crate::input;

/// Arguments for duration & convexity
#[derive(Args)]
pub struct DurationArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated cash flows, one per period (e.g. "50,50,1050")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Periodic yield to maturity
    #[arg(long, allow_hyphen_values = true)]
    pub ytm: Option<Decimal>,

    /// Observed price (defaults to the schedule discounted at --ytm)
    #[arg(long, allow_hyphen_values = true)]
    pub bond_price: Option<Decimal>,
}

pub fn run_duration(args: DurationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let risk_input: CashFlowRiskInput = match args.cash_flows {
        Some(cash_flows) => CashFlowRiskInput {
            cash_flows,
            ytm: args.ytm.ok_or("--ytm is required with --cash-flows")?,
            bond_price: args.bond_price,
        },
        None => input::read_input(args.input.as_deref())?
            .ok_or("--cash-flows/--ytm, --input <file.json> or stdin required for duration")?,
    };
    debug!(periods = risk_input.cash_flows.len(), "analysing cash-flow schedule");
    let result = duration::analyze_cash_flows(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for two-asset immunization
#[derive(Args)]
pub struct ImmunizeArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Duration of the first asset (periods)
    #[arg(long, requires_all = ["second_duration", "liability_duration"])]
    pub first_duration: Option<Decimal>,

    /// Duration of the second asset (periods)
    #[arg(long)]
    pub second_duration: Option<Decimal>,

    /// Duration of the liability to immunize (periods)
    #[arg(long)]
    pub liability_duration: Option<Decimal>,

    /// Present value of the liability, for money allocations
    #[arg(long)]
    pub liability_value: Option<Decimal>,
}

pub fn run_immunize(args: ImmunizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let imm_input: ImmunizationInput = match (
        args.first_duration,
        args.second_duration,
        args.liability_duration,
    ) {
        (Some(first_duration), Some(second_duration), Some(liability_duration)) => {
            ImmunizationInput {
                first_duration,
                second_duration,
                liability_duration,
                liability_value: args.liability_value,
            }
        }
        _ => input::read_input(args.input.as_deref())?.ok_or(
            "--first-duration/--second-duration/--liability-duration, --input <file.json> or stdin required for immunize",
        )?,
    };
    let result = immunization::immunize(&imm_input)?;
    Ok(serde_json::to_value(result)?)
}
