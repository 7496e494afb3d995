use alloy_primitives::{Address, U256};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use rebalance_guard::{RebalanceViolation, RebalancingBasket, TokenFlows};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Preflight checks for rebalancing set token actions",
    long_about = None
)]
pub struct Cli {
    /// Path to preflight.json
    #[arg(long, default_value = "./configs/preflight.json")]
    pub config_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Override the configured RPC URL
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Rebalancing set token to check (defaults to the configured basket)
    #[arg(long)]
    pub basket: Option<Address>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the current lifecycle state
    Status,
    /// Can `caller` propose a rebalance now?
    Propose {
        #[arg(long)]
        caller: Address,
    },
    /// Can the auction be started now?
    Start,
    /// Can `bidder` bid `quantity` now?
    Bid {
        #[arg(long)]
        quantity: String,
        #[arg(long)]
        bidder: Address,
    },
    /// Component flows for `quantity` at the current price
    Quote {
        #[arg(long)]
        quantity: String,
    },
    /// Can the rebalance be settled now?
    Settle,
}

/// Parse a bid quantity in base units.
///
/// Anything that is not a non-negative integer is an invalid quantity.
pub fn parse_quantity(input: &str) -> Result<U256, RebalanceViolation> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(RebalanceViolation::InvalidQuantity);
    }
    trimmed
        .parse::<U256>()
        .map_err(|_| RebalanceViolation::InvalidQuantity)
}

/// Render a unix-millisecond timestamp for humans
pub fn format_ms(ms: U256) -> String {
    u64::try_from(ms)
        .ok()
        .and_then(|ms| i64::try_from(ms).ok())
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| format!("{} ms", ms))
}

pub fn describe_violation(violation: &RebalanceViolation) -> String {
    match violation {
        RebalanceViolation::TimingViolation { next_allowed_at_ms } => format!(
            "Insufficient time has passed, next allowed at {}",
            format_ms(*next_allowed_at_ms)
        ),
        other => other.to_string(),
    }
}

pub fn print_status(basket: &RebalancingBasket) {
    println!("Rebalancing set:        {}", basket.address);
    println!("Phase:                  {}", basket.phase);
    println!("Manager:                {}", basket.manager);
    println!(
        "Last rebalance:         {}",
        format_ms(basket.last_rebalance_timestamp.saturating_mul(U256::from(1000)))
    );
    println!("Rebalance interval:     {} s", basket.rebalance_interval);
    println!(
        "Proposal start:         {}",
        format_ms(basket.proposal_start_time.saturating_mul(U256::from(1000)))
    );
    println!("Proposal period:        {} s", basket.proposal_period);
    println!("Minimum bid:            {}", basket.minimum_bid);
    println!("Remaining current sets: {}", basket.remaining_current_sets);
}

pub fn print_flows(flows: &TokenFlows) {
    println!("{:<44} {:>40} {:>40}", "component", "inflow", "outflow");
    for ((token, inflow), outflow) in flows
        .tokens
        .iter()
        .zip(flows.inflow.iter())
        .zip(flows.outflow.iter())
    {
        println!(
            "{:<44} {:>40} {:>40}",
            token.to_string(),
            inflow.to_string(),
            outflow.to_string()
        );
    }
}
