use alloy::providers::ProviderBuilder;
use alloy::transports::http::reqwest::Url;
use clap::Parser;
use eyre::{Result, WrapErr};
use rebalance_guard::{
    time, OnchainStateReader, PreflightConfig, RebalancePreflight, RebalanceViolation,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Command};

/// Exit status when the action must not be attempted
const EXIT_VIOLATION: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let mut config = if cli.config_path.exists() {
        PreflightConfig::load_from_file(&cli.config_path)
            .await?
            .with_env_overrides()?
    } else {
        tracing::warn!(
            path = %cli.config_path.display(),
            "Config not found, using env and defaults"
        );
        PreflightConfig::from_env()?
    };
    if let Some(rpc_url) = cli.rpc_url.clone() {
        config.rpc_url = rpc_url;
    }
    if let Some(basket) = cli.basket {
        config.basket_address = Some(basket);
    }

    if !config.is_valid() {
        eyre::bail!(
            "Invalid configuration: rpc_url and transfer_proxy_address are required in {} or env",
            cli.config_path.display()
        );
    }
    let basket = config.basket_address.ok_or_else(|| {
        eyre::eyre!("No rebalancing set given: pass --basket or set basket_address")
    })?;

    tracing::info!(
        rpc_url = %config.rpc_url,
        basket = %basket,
        transfer_proxy = %config.transfer_proxy_address,
        "Config loaded"
    );

    let url: Url = config
        .rpc_url
        .parse()
        .wrap_err_with(|| format!("Invalid RPC URL: {}", config.rpc_url))?;
    let provider = ProviderBuilder::new().connect_http(url);
    let reader = Arc::new(OnchainStateReader::new(provider));
    let preflight = RebalancePreflight::new(reader, config.transfer_proxy_address);

    let outcome = run(&preflight, basket, cli.command).await;

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(violation) => {
            println!("✗ {}", cli::describe_violation(&violation));
            Ok(ExitCode::from(EXIT_VIOLATION))
        }
    }
}

async fn run<R>(
    preflight: &RebalancePreflight<R>,
    basket: alloy_primitives::Address,
    command: Command,
) -> Result<(), RebalanceViolation>
where
    R: rebalance_guard::ContractStateReader + ?Sized,
{
    match command {
        Command::Status => {
            let status = preflight.status(basket).await?;
            cli::print_status(&status);
        }
        Command::Propose { caller } => {
            preflight
                .check_propose(basket, caller, time::now_ms())
                .await?;
            println!("✓ {} may propose a rebalance of {}", caller, basket);
        }
        Command::Start => {
            preflight
                .check_start_rebalance(basket, time::now_ms())
                .await?;
            println!("✓ Rebalance auction of {} may be started", basket);
        }
        Command::Bid { quantity, bidder } => {
            let quantity = cli::parse_quantity(&quantity)?;
            let flows = preflight.check_bid(basket, quantity, bidder).await?;
            println!("✓ {} may bid {} on {}", bidder, quantity, basket);
            cli::print_flows(&flows);
        }
        Command::Quote { quantity } => {
            let quantity = cli::parse_quantity(&quantity)?;
            let flows = preflight.quote_bid(basket, quantity).await?;
            cli::print_flows(&flows);
        }
        Command::Settle => {
            preflight.check_settle(basket).await?;
            println!("✓ Rebalance of {} may be settled", basket);
        }
    }
    Ok(())
}
