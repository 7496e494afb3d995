//! Ledger reader backed by an alloy provider.
//!
//! Each accessor encodes one `eth_call` against the rebalancing set token or
//! a component ERC-20 and decodes the return data. Nothing is cached, so two
//! consecutive reads may observe different blocks.

use super::traits::ContractStateReader;
use crate::errors::ReadError;
use crate::phase::RebalancingPhase;
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use common::interfaces::erc20::IERC20;
use common::interfaces::rebalancing_set_token::IRebalancingSetToken;

/// Read-only accessor for rebalancing set token state.
///
/// Generic over the alloy Provider type so both plain HTTP providers and
/// wallet-backed providers can be reused.
pub struct OnchainStateReader<P> {
    provider: P,
}

impl<P> OnchainStateReader<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Make a read-only call and decode its return value
    async fn call<C>(&self, to: Address, call: C) -> Result<C::Return, ReadError>
    where
        C: SolCall + Send + Sync,
    {
        let tx = TransactionRequest::default()
            .to(to)
            .input(call.abi_encode().into());

        let result_bytes = self
            .provider
            .call(tx)
            .await
            .map_err(|e| ReadError::Rpc(format!("{} on {} failed: {}", C::SIGNATURE, to, e)))?;

        C::abi_decode_returns(&result_bytes).map_err(|e| {
            ReadError::Malformed(format!("{} on {} returned bad data: {}", C::SIGNATURE, to, e))
        })
    }
}

#[async_trait::async_trait]
impl<P> ContractStateReader for OnchainStateReader<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn rebalance_state(&self, basket: Address) -> Result<RebalancingPhase, ReadError> {
        let code = self
            .call(basket, IRebalancingSetToken::rebalanceStateCall {})
            .await?;
        RebalancingPhase::try_from(code)
    }

    async fn manager(&self, basket: Address) -> Result<Address, ReadError> {
        self.call(basket, IRebalancingSetToken::managerCall {}).await
    }

    async fn last_rebalance_timestamp(&self, basket: Address) -> Result<U256, ReadError> {
        self.call(basket, IRebalancingSetToken::lastRebalanceTimestampCall {})
            .await
    }

    async fn rebalance_interval(&self, basket: Address) -> Result<U256, ReadError> {
        self.call(basket, IRebalancingSetToken::rebalanceIntervalCall {})
            .await
    }

    async fn proposal_start_time(&self, basket: Address) -> Result<U256, ReadError> {
        self.call(basket, IRebalancingSetToken::proposalStartTimeCall {})
            .await
    }

    async fn proposal_period(&self, basket: Address) -> Result<U256, ReadError> {
        self.call(basket, IRebalancingSetToken::proposalPeriodCall {})
            .await
    }

    async fn minimum_bid(&self, basket: Address) -> Result<U256, ReadError> {
        self.call(basket, IRebalancingSetToken::minimumBidCall {}).await
    }

    async fn remaining_current_sets(&self, basket: Address) -> Result<U256, ReadError> {
        self.call(basket, IRebalancingSetToken::remainingCurrentSetsCall {})
            .await
    }

    async fn combined_token_array(&self, basket: Address) -> Result<Vec<Address>, ReadError> {
        self.call(basket, IRebalancingSetToken::getCombinedTokenArrayCall {})
            .await
    }

    async fn bid_price(
        &self,
        basket: Address,
        quantity: U256,
    ) -> Result<(Vec<U256>, Vec<U256>), ReadError> {
        let decoded = self
            .call(basket, IRebalancingSetToken::getBidPriceCall { quantity })
            .await?;

        tracing::trace!(
            basket = %basket,
            quantity = %quantity,
            components = decoded._0.len(),
            "Read bid price"
        );

        Ok((decoded._0, decoded._1))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ReadError> {
        self.call(token, IERC20::balanceOfCall { account: owner })
            .await
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ReadError> {
        self.call(token, IERC20::allowanceCall { owner, spender })
            .await
    }
}
