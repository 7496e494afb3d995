//! Snapshot types for a rebalancing set token.

use crate::errors::ReadError;
use crate::phase::RebalancingPhase;
use crate::reader::ContractStateReader;
use alloy_primitives::{Address, U256};

/// Point-in-time view of a rebalancing set token.
///
/// Only used for display. Guards never validate against a snapshot, they
/// re-read the fields they need on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalancingBasket {
    pub address: Address,
    pub phase: RebalancingPhase,
    pub manager: Address,
    /// Seconds since epoch
    pub last_rebalance_timestamp: U256,
    /// Seconds
    pub rebalance_interval: U256,
    /// Seconds since epoch
    pub proposal_start_time: U256,
    /// Seconds
    pub proposal_period: U256,
    pub minimum_bid: U256,
    pub remaining_current_sets: U256,
}

impl RebalancingBasket {
    /// Read every field concurrently
    pub async fn fetch<R>(reader: &R, address: Address) -> Result<Self, ReadError>
    where
        R: ContractStateReader + ?Sized,
    {
        let (
            phase,
            manager,
            last_rebalance_timestamp,
            rebalance_interval,
            proposal_start_time,
            proposal_period,
            minimum_bid,
            remaining_current_sets,
        ) = tokio::try_join!(
            reader.rebalance_state(address),
            reader.manager(address),
            reader.last_rebalance_timestamp(address),
            reader.rebalance_interval(address),
            reader.proposal_start_time(address),
            reader.proposal_period(address),
            reader.minimum_bid(address),
            reader.remaining_current_sets(address),
        )?;

        Ok(Self {
            address,
            phase,
            manager,
            last_rebalance_timestamp,
            rebalance_interval,
            proposal_start_time,
            proposal_period,
            minimum_bid,
            remaining_current_sets,
        })
    }
}

/// Component flows for one bid quantity at the current auction price.
///
/// All three vectors are positional against the combined token array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFlows {
    pub tokens: Vec<Address>,
    /// Amount of each component the bidder must supply
    pub inflow: Vec<U256>,
    /// Amount of each component the bidder receives
    pub outflow: Vec<U256>,
}

impl TokenFlows {
    pub fn new(
        tokens: Vec<Address>,
        inflow: Vec<U256>,
        outflow: Vec<U256>,
    ) -> Result<Self, ReadError> {
        if inflow.len() != tokens.len() || outflow.len() != tokens.len() {
            return Err(ReadError::Malformed(format!(
                "bid price has {} inflows and {} outflows for {} combined tokens",
                inflow.len(),
                outflow.len(),
                tokens.len()
            )));
        }
        Ok(Self {
            tokens,
            inflow,
            outflow,
        })
    }

    /// (component, amount) pairs the bidder must supply, in combined token order
    pub fn required_inflows(&self) -> impl Iterator<Item = (Address, U256)> + '_ {
        self.tokens
            .iter()
            .copied()
            .zip(self.inflow.iter().copied())
            .filter(|(_, amount)| !amount.is_zero())
    }
}
