//! In-memory ledger for exercising the guards without a node.

use super::traits::ContractStateReader;
use crate::errors::ReadError;
use crate::phase::RebalancingPhase;
use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// State of one simulated rebalancing set token
#[derive(Debug, Clone)]
pub struct SimulatedBasket {
    pub phase: RebalancingPhase,
    pub manager: Address,
    pub last_rebalance_timestamp: U256,
    pub rebalance_interval: U256,
    pub proposal_start_time: U256,
    pub proposal_period: U256,
    pub minimum_bid: U256,
    pub remaining_current_sets: U256,
    pub combined_tokens: Vec<Address>,
    /// Inflow per combined token for one `minimum_bid` worth of sets
    pub inflow_per_minimum_bid: Vec<U256>,
    /// Outflow per combined token for one `minimum_bid` worth of sets
    pub outflow_per_minimum_bid: Vec<U256>,
}

impl Default for SimulatedBasket {
    fn default() -> Self {
        Self {
            phase: RebalancingPhase::Default,
            manager: Address::ZERO,
            last_rebalance_timestamp: U256::ZERO,
            rebalance_interval: U256::ZERO,
            proposal_start_time: U256::ZERO,
            proposal_period: U256::ZERO,
            minimum_bid: U256::from(1),
            remaining_current_sets: U256::ZERO,
            combined_tokens: Vec::new(),
            inflow_per_minimum_bid: Vec::new(),
            outflow_per_minimum_bid: Vec::new(),
        }
    }
}

/// Simulated ledger.
///
/// State can be changed between reads to model blocks landing mid-check.
/// Bid prices scale linearly with `quantity / minimum_bid`, which is enough
/// to drive the guards; it is not the on-chain price curve.
#[derive(Default)]
pub struct SimulatedStateReader {
    baskets: RwLock<HashMap<Address, SimulatedBasket>>,
    balances: RwLock<HashMap<(Address, Address), U256>>,
    allowances: RwLock<HashMap<(Address, Address, Address), U256>>,
    failing_tokens: RwLock<HashSet<Address>>,
    failing_baskets: RwLock<HashSet<Address>>,
    token_reads: AtomicUsize,
}

impl SimulatedStateReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basket(self, address: Address, basket: SimulatedBasket) -> Self {
        self.set_basket(address, basket);
        self
    }

    pub fn set_basket(&self, address: Address, basket: SimulatedBasket) {
        self.baskets.write().insert(address, basket);
    }

    /// Mutate a basket in place, e.g. to advance its phase
    pub fn update_basket(&self, address: Address, f: impl FnOnce(&mut SimulatedBasket)) {
        if let Some(basket) = self.baskets.write().get_mut(&address) {
            f(basket);
        }
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.balances.write().insert((token, owner), amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances.write().insert((token, owner, spender), amount);
    }

    /// Make every balance/allowance read of `token` fail
    pub fn fail_token_reads(&self, token: Address) {
        self.failing_tokens.write().insert(token);
    }

    /// Make every read of `basket` fail
    pub fn fail_basket_reads(&self, basket: Address) {
        self.failing_baskets.write().insert(basket);
    }

    /// Number of balance/allowance reads served so far
    pub fn token_reads(&self) -> usize {
        self.token_reads.load(Ordering::Relaxed)
    }

    fn basket(&self, address: Address) -> Result<SimulatedBasket, ReadError> {
        if self.failing_baskets.read().contains(&address) {
            return Err(ReadError::Rpc(format!("simulated failure reading {}", address)));
        }
        self.baskets
            .read()
            .get(&address)
            .cloned()
            .ok_or_else(|| {
                ReadError::Rpc(format!("execution reverted: no contract at {}", address))
            })
    }

    fn check_token(&self, token: Address) -> Result<(), ReadError> {
        self.token_reads.fetch_add(1, Ordering::Relaxed);
        if self.failing_tokens.read().contains(&token) {
            return Err(ReadError::Rpc(format!("simulated failure reading {}", token)));
        }
        Ok(())
    }
}

fn scale(per_minimum_bid: &[U256], quantity: U256, minimum_bid: U256) -> Vec<U256> {
    per_minimum_bid
        .iter()
        .map(|unit| unit.saturating_mul(quantity) / minimum_bid)
        .collect()
}

#[async_trait::async_trait]
impl ContractStateReader for SimulatedStateReader {
    async fn rebalance_state(&self, basket: Address) -> Result<RebalancingPhase, ReadError> {
        Ok(self.basket(basket)?.phase)
    }

    async fn manager(&self, basket: Address) -> Result<Address, ReadError> {
        Ok(self.basket(basket)?.manager)
    }

    async fn last_rebalance_timestamp(&self, basket: Address) -> Result<U256, ReadError> {
        Ok(self.basket(basket)?.last_rebalance_timestamp)
    }

    async fn rebalance_interval(&self, basket: Address) -> Result<U256, ReadError> {
        Ok(self.basket(basket)?.rebalance_interval)
    }

    async fn proposal_start_time(&self, basket: Address) -> Result<U256, ReadError> {
        Ok(self.basket(basket)?.proposal_start_time)
    }

    async fn proposal_period(&self, basket: Address) -> Result<U256, ReadError> {
        Ok(self.basket(basket)?.proposal_period)
    }

    async fn minimum_bid(&self, basket: Address) -> Result<U256, ReadError> {
        Ok(self.basket(basket)?.minimum_bid)
    }

    async fn remaining_current_sets(&self, basket: Address) -> Result<U256, ReadError> {
        Ok(self.basket(basket)?.remaining_current_sets)
    }

    async fn combined_token_array(&self, basket: Address) -> Result<Vec<Address>, ReadError> {
        Ok(self.basket(basket)?.combined_tokens)
    }

    async fn bid_price(
        &self,
        basket: Address,
        quantity: U256,
    ) -> Result<(Vec<U256>, Vec<U256>), ReadError> {
        let basket = self.basket(basket)?;
        if basket.minimum_bid.is_zero() {
            return Err(ReadError::Rpc("execution reverted: division by zero".to_string()));
        }
        Ok((
            scale(&basket.inflow_per_minimum_bid, quantity, basket.minimum_bid),
            scale(&basket.outflow_per_minimum_bid, quantity, basket.minimum_bid),
        ))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ReadError> {
        self.check_token(token)?;
        Ok(self
            .balances
            .read()
            .get(&(token, owner))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ReadError> {
        self.check_token(token)?;
        Ok(self
            .allowances
            .read()
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bid_price_scales_with_quantity() {
        let basket = Address::repeat_byte(1);
        let reader = SimulatedStateReader::new().with_basket(
            basket,
            SimulatedBasket {
                minimum_bid: U256::from(100),
                combined_tokens: vec![Address::repeat_byte(0xa), Address::repeat_byte(0xb)],
                inflow_per_minimum_bid: vec![U256::from(10), U256::ZERO],
                outflow_per_minimum_bid: vec![U256::ZERO, U256::from(7)],
                ..Default::default()
            },
        );

        let (inflow, outflow) = reader.bid_price(basket, U256::from(300)).await.unwrap();
        assert_eq!(inflow, vec![U256::from(30), U256::ZERO]);
        assert_eq!(outflow, vec![U256::ZERO, U256::from(21)]);
    }

    #[tokio::test]
    async fn test_unknown_basket_is_rpc_error() {
        let reader = SimulatedStateReader::new();
        let result = reader.rebalance_state(Address::repeat_byte(9)).await;
        assert!(matches!(result, Err(ReadError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_missing_balance_reads_as_zero() {
        let reader = SimulatedStateReader::new();
        let balance = reader
            .balance_of(Address::repeat_byte(1), Address::repeat_byte(2))
            .await
            .unwrap();
        assert_eq!(balance, U256::ZERO);
        assert_eq!(reader.token_reads(), 1);
    }
}
