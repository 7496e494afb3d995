use crate::errors::ReadError;
use crate::phase::RebalancingPhase;
use alloy_primitives::{Address, U256};

/// Read-only view of the ledger consumed by the guards.
///
/// Every call goes to the authoritative source; implementations must not
/// cache across calls. Errors are returned as-is and never retried here.
#[async_trait::async_trait]
pub trait ContractStateReader: Send + Sync {
    async fn rebalance_state(&self, basket: Address) -> Result<RebalancingPhase, ReadError>;

    async fn manager(&self, basket: Address) -> Result<Address, ReadError>;

    /// Seconds since epoch
    async fn last_rebalance_timestamp(&self, basket: Address) -> Result<U256, ReadError>;

    /// Seconds
    async fn rebalance_interval(&self, basket: Address) -> Result<U256, ReadError>;

    /// Seconds since epoch
    async fn proposal_start_time(&self, basket: Address) -> Result<U256, ReadError>;

    /// Seconds
    async fn proposal_period(&self, basket: Address) -> Result<U256, ReadError>;

    async fn minimum_bid(&self, basket: Address) -> Result<U256, ReadError>;

    async fn remaining_current_sets(&self, basket: Address) -> Result<U256, ReadError>;

    /// Union of the current and next component sets, in contract order
    async fn combined_token_array(&self, basket: Address) -> Result<Vec<Address>, ReadError>;

    /// Auction price for `quantity`: (inflow, outflow), positional against
    /// the combined token array
    async fn bid_price(
        &self,
        basket: Address,
        quantity: U256,
    ) -> Result<(Vec<U256>, Vec<U256>), ReadError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ReadError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ReadError>;
}
