//! Lifecycle gating for rebalancing set tokens.
//!
//! Answers "is it currently legal to attempt X" from freshly read ledger
//! state. Settlement itself, and every phase change, happens on-chain.

use crate::errors::{PhaseRequirement, RebalanceViolation};
use crate::phase::RebalancingPhase;
use crate::reader::ContractStateReader;
use crate::time::window_end_ms;
use alloy_primitives::{Address, U256};
use std::sync::Arc;

/// Phase, timing, role and auction-progress checks
pub struct LifecycleGuard<R: ?Sized> {
    reader: Arc<R>,
}

impl<R> Clone for LifecycleGuard<R>
where
    R: ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
        }
    }
}

impl<R> LifecycleGuard<R>
where
    R: ContractStateReader + ?Sized,
{
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Required before proposing
    pub async fn require_not_in_rebalance(
        &self,
        basket: Address,
    ) -> Result<(), RebalanceViolation> {
        self.require_phase(basket, PhaseRequirement::IsNot(RebalancingPhase::Rebalance))
            .await
    }

    /// Required before starting the auction
    pub async fn require_in_proposal(&self, basket: Address) -> Result<(), RebalanceViolation> {
        self.require_phase(basket, PhaseRequirement::Is(RebalancingPhase::Proposal))
            .await
    }

    /// Required before bidding or settling
    pub async fn require_in_rebalance(&self, basket: Address) -> Result<(), RebalanceViolation> {
        self.require_phase(basket, PhaseRequirement::Is(RebalancingPhase::Rebalance))
            .await
    }

    async fn require_phase(
        &self,
        basket: Address,
        expected: PhaseRequirement,
    ) -> Result<(), RebalanceViolation> {
        let actual = self.reader.rebalance_state(basket).await?;

        let ok = match expected {
            PhaseRequirement::Is(phase) => actual == phase,
            PhaseRequirement::IsNot(phase) => actual != phase,
        };

        tracing::debug!(basket = %basket, %actual, %expected, ok, "Phase check");

        if ok {
            Ok(())
        } else {
            Err(RebalanceViolation::PhaseViolation {
                basket,
                expected,
                actual,
            })
        }
    }

    /// `caller` must be the basket manager.
    ///
    /// Addresses compare as raw bytes, so textual letter case has already
    /// been normalized away when `caller` was parsed.
    pub async fn require_manager(
        &self,
        basket: Address,
        caller: Address,
    ) -> Result<(), RebalanceViolation> {
        let manager = self.reader.manager(basket).await?;

        tracing::debug!(basket = %basket, caller = %caller, manager = %manager, "Manager check");

        if caller != manager {
            return Err(RebalanceViolation::AuthorizationViolation {
                basket,
                caller,
                manager,
            });
        }
        Ok(())
    }

    /// `lastRebalanceTimestamp + rebalanceInterval` must have passed
    pub async fn require_rebalance_interval_elapsed(
        &self,
        basket: Address,
        now_ms: U256,
    ) -> Result<(), RebalanceViolation> {
        let (last_rebalance, interval) = tokio::try_join!(
            self.reader.last_rebalance_timestamp(basket),
            self.reader.rebalance_interval(basket),
        )?;

        require_window_elapsed(window_end_ms(last_rebalance, interval), now_ms)
    }

    /// `proposalStartTime + proposalPeriod` must have passed
    pub async fn require_proposal_period_elapsed(
        &self,
        basket: Address,
        now_ms: U256,
    ) -> Result<(), RebalanceViolation> {
        let (proposal_start, period) = tokio::try_join!(
            self.reader.proposal_start_time(basket),
            self.reader.proposal_period(basket),
        )?;

        require_window_elapsed(window_end_ms(proposal_start, period), now_ms)
    }

    /// Bid gate: at least one whole minimum bid must remain in the auction
    pub async fn require_auction_not_exhausted(
        &self,
        basket: Address,
    ) -> Result<(), RebalanceViolation> {
        let (minimum_bid, remaining_current_sets) = self.auction_progress(basket).await?;

        if remaining_current_sets < minimum_bid {
            return Err(RebalanceViolation::AuctionExhausted {
                remaining_current_sets,
                minimum_bid,
            });
        }
        Ok(())
    }

    /// Settle gate: the remainder must have dropped below one minimum bid
    pub async fn require_enough_sets_rebalanced(
        &self,
        basket: Address,
    ) -> Result<(), RebalanceViolation> {
        let (minimum_bid, remaining_current_sets) = self.auction_progress(basket).await?;

        if remaining_current_sets >= minimum_bid {
            return Err(RebalanceViolation::AuctionInProgress {
                remaining_current_sets,
                minimum_bid,
            });
        }
        Ok(())
    }

    async fn auction_progress(&self, basket: Address) -> Result<(U256, U256), RebalanceViolation> {
        let (minimum_bid, remaining_current_sets) = tokio::try_join!(
            self.reader.minimum_bid(basket),
            self.reader.remaining_current_sets(basket),
        )?;

        tracing::debug!(
            basket = %basket,
            minimum_bid = %minimum_bid,
            remaining_current_sets = %remaining_current_sets,
            "Auction progress"
        );

        Ok((minimum_bid, remaining_current_sets))
    }
}

/// Boundary inclusive: `now_ms == next` is allowed
fn require_window_elapsed(
    next_allowed_at_ms: U256,
    now_ms: U256,
) -> Result<(), RebalanceViolation> {
    if now_ms < next_allowed_at_ms {
        tracing::debug!(
            now_ms = %now_ms,
            next_allowed_at_ms = %next_allowed_at_ms,
            "Time window not elapsed"
        );
        return Err(RebalanceViolation::TimingViolation { next_allowed_at_ms });
    }
    Ok(())
}
