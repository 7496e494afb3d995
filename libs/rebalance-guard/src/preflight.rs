//! Check sequences run before each rebalancing transaction.
//!
//! Passing means "safe to attempt now", not a guarantee: the contract
//! re-checks everything atomically when the transaction lands.

use crate::basket::{RebalancingBasket, TokenFlows};
use crate::bid::BidAdmissionChecker;
use crate::errors::RebalanceViolation;
use crate::lifecycle::LifecycleGuard;
use crate::reader::ContractStateReader;
use alloy_primitives::{Address, U256};
use std::sync::Arc;

/// Guards composed per rebalancing action
pub struct RebalancePreflight<R: ?Sized> {
    reader: Arc<R>,
    lifecycle: LifecycleGuard<R>,
    bids: BidAdmissionChecker<R>,
    /// Contract that pulls bid inflows (the transfer proxy)
    spender: Address,
}

impl<R> RebalancePreflight<R>
where
    R: ContractStateReader + ?Sized,
{
    pub fn new(reader: Arc<R>, spender: Address) -> Self {
        Self {
            lifecycle: LifecycleGuard::new(reader.clone()),
            bids: BidAdmissionChecker::new(reader.clone()),
            reader,
            spender,
        }
    }

    /// Snapshot of every basket field, for display
    pub async fn status(&self, basket: Address) -> Result<RebalancingBasket, RebalanceViolation> {
        Ok(RebalancingBasket::fetch(self.reader.as_ref(), basket).await?)
    }

    /// Before `propose`
    pub async fn check_propose(
        &self,
        basket: Address,
        caller: Address,
        now_ms: U256,
    ) -> Result<(), RebalanceViolation> {
        let result = async {
            self.lifecycle.require_manager(basket, caller).await?;
            self.lifecycle.require_not_in_rebalance(basket).await?;
            self.lifecycle
                .require_rebalance_interval_elapsed(basket, now_ms)
                .await
        }
        .await;

        report("propose", basket, result)
    }

    /// Before `startRebalance`
    pub async fn check_start_rebalance(
        &self,
        basket: Address,
        now_ms: U256,
    ) -> Result<(), RebalanceViolation> {
        let result = async {
            self.lifecycle.require_in_proposal(basket).await?;
            self.lifecycle
                .require_proposal_period_elapsed(basket, now_ms)
                .await
        }
        .await;

        report("start_rebalance", basket, result)
    }

    /// Before `bid`. Returns the flows the funding checks were made against.
    pub async fn check_bid(
        &self,
        basket: Address,
        quantity: U256,
        bidder: Address,
    ) -> Result<TokenFlows, RebalanceViolation> {
        let result = async {
            self.bids.require_positive_quantity(quantity)?;
            self.lifecycle.require_in_rebalance(basket).await?;
            self.lifecycle.require_auction_not_exhausted(basket).await?;
            self.bids
                .require_multiple_of_minimum_bid(basket, quantity)
                .await?;
            self.bids
                .require_within_remaining_supply(basket, quantity)
                .await?;

            let flows = self.bids.compute_required_flows(basket, quantity).await?;
            self.bids.require_sufficient_balances(&flows, bidder).await?;
            self.bids
                .require_sufficient_allowances(&flows, bidder, self.spender)
                .await?;
            Ok::<_, RebalanceViolation>(flows)
        }
        .await;

        report("bid", basket, result)
    }

    /// Before `settleRebalance`
    pub async fn check_settle(&self, basket: Address) -> Result<(), RebalanceViolation> {
        let result = async {
            self.lifecycle.require_in_rebalance(basket).await?;
            self.lifecycle.require_enough_sets_rebalanced(basket).await
        }
        .await;

        report("settle", basket, result)
    }

    /// Price a bid without checking the bidder's funds
    pub async fn quote_bid(
        &self,
        basket: Address,
        quantity: U256,
    ) -> Result<TokenFlows, RebalanceViolation> {
        let result = async {
            self.bids.require_positive_quantity(quantity)?;
            self.lifecycle.require_in_rebalance(basket).await?;
            self.bids
                .require_multiple_of_minimum_bid(basket, quantity)
                .await?;
            self.bids
                .require_within_remaining_supply(basket, quantity)
                .await?;
            self.bids.compute_required_flows(basket, quantity).await
        }
        .await;

        report("quote", basket, result)
    }
}

fn report<T>(
    action: &'static str,
    basket: Address,
    result: Result<T, RebalanceViolation>,
) -> Result<T, RebalanceViolation> {
    match &result {
        Ok(_) => tracing::info!(action, basket = %basket, "Preflight passed"),
        Err(RebalanceViolation::NetworkFailure(e)) => {
            tracing::error!(action, basket = %basket, error = %e, "Preflight read failed")
        }
        Err(violation) => {
            tracing::warn!(action, basket = %basket, %violation, "Preflight rejected")
        }
    }
    result
}
