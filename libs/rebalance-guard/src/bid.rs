//! Bid admission checks.
//!
//! Optimistic pre-flight only: each component is its own token contract and
//! there is no atomic multi-token read, so balances and allowances can move
//! between these checks and the bid transaction.

use crate::basket::TokenFlows;
use crate::errors::{ReadError, RebalanceViolation};
use crate::reader::ContractStateReader;
use alloy_primitives::{Address, U256};
use futures::future::join_all;
use std::sync::Arc;

/// Which per-component ledger a funding check reads
#[derive(Debug, Clone, Copy)]
enum Funding {
    Balance,
    Allowance { spender: Address },
}

/// Quantity and funding checks for a prospective bid
pub struct BidAdmissionChecker<R: ?Sized> {
    reader: Arc<R>,
}

impl<R> Clone for BidAdmissionChecker<R>
where
    R: ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
        }
    }
}

impl<R> BidAdmissionChecker<R>
where
    R: ContractStateReader + ?Sized,
{
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Component flows for `quantity` at the current auction price.
    ///
    /// The price comes from the contract and is used verbatim.
    pub async fn compute_required_flows(
        &self,
        basket: Address,
        quantity: U256,
    ) -> Result<TokenFlows, RebalanceViolation> {
        let (tokens, (inflow, outflow)) = tokio::try_join!(
            self.reader.combined_token_array(basket),
            self.reader.bid_price(basket, quantity),
        )?;

        let flows = TokenFlows::new(tokens, inflow, outflow)?;

        tracing::debug!(
            basket = %basket,
            quantity = %quantity,
            components = flows.tokens.len(),
            "Computed bid flows"
        );

        Ok(flows)
    }

    pub fn require_positive_quantity(&self, quantity: U256) -> Result<(), RebalanceViolation> {
        if quantity.is_zero() {
            return Err(RebalanceViolation::InvalidQuantity);
        }
        Ok(())
    }

    /// `quantity == remainingCurrentSets` is allowed
    pub async fn require_within_remaining_supply(
        &self,
        basket: Address,
        quantity: U256,
    ) -> Result<(), RebalanceViolation> {
        let remaining_current_sets = self.reader.remaining_current_sets(basket).await?;

        if quantity > remaining_current_sets {
            return Err(RebalanceViolation::QuantityExceedsSupply {
                quantity,
                remaining_current_sets,
            });
        }
        Ok(())
    }

    pub async fn require_multiple_of_minimum_bid(
        &self,
        basket: Address,
        quantity: U256,
    ) -> Result<(), RebalanceViolation> {
        let minimum_bid = self.reader.minimum_bid(basket).await?;

        if minimum_bid.is_zero() {
            return Err(ReadError::Malformed(format!("minimum bid of {} is zero", basket)).into());
        }

        if !(quantity % minimum_bid).is_zero() {
            return Err(RebalanceViolation::QuantityNotAligned {
                quantity,
                minimum_bid,
            });
        }
        Ok(())
    }

    /// Bidder must hold at least every non-zero inflow.
    ///
    /// Only inflows are checked: the price only moves in the bidder's favour
    /// between quote and execution, so the quoted inflow is an upper bound on
    /// what the bid will pull.
    pub async fn require_sufficient_balances(
        &self,
        flows: &TokenFlows,
        bidder: Address,
    ) -> Result<(), RebalanceViolation> {
        self.require_funding(flows, bidder, Funding::Balance).await
    }

    /// Bidder must have approved `spender` for at least every non-zero inflow
    pub async fn require_sufficient_allowances(
        &self,
        flows: &TokenFlows,
        bidder: Address,
        spender: Address,
    ) -> Result<(), RebalanceViolation> {
        self.require_funding(flows, bidder, Funding::Allowance { spender })
            .await
    }

    /// Reads run concurrently; results are judged in combined token order and
    /// the first failing component is reported.
    async fn require_funding(
        &self,
        flows: &TokenFlows,
        bidder: Address,
        funding: Funding,
    ) -> Result<(), RebalanceViolation> {
        let required: Vec<(Address, U256)> = flows.required_inflows().collect();

        let reads = required.iter().map(|(component, _)| {
            let component = *component;
            async move {
                match funding {
                    Funding::Balance => self.reader.balance_of(component, bidder).await,
                    Funding::Allowance { spender } => {
                        self.reader.allowance(component, bidder, spender).await
                    }
                }
            }
        });
        let available = join_all(reads).await;

        for ((component, required), actual) in required.into_iter().zip(available) {
            let actual = actual?;

            tracing::debug!(
                component = %component,
                bidder = %bidder,
                required = %required,
                actual = %actual,
                ?funding,
                "Funding check"
            );

            if actual < required {
                return Err(match funding {
                    Funding::Balance => RebalanceViolation::InsufficientBalance {
                        component,
                        required,
                        actual,
                    },
                    Funding::Allowance { .. } => RebalanceViolation::InsufficientAllowance {
                        component,
                        required,
                        actual,
                    },
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{SimulatedBasket, SimulatedStateReader};

    fn basket_address() -> Address {
        Address::repeat_byte(0x5e)
    }

    fn checker_with(basket: SimulatedBasket) -> BidAdmissionChecker<SimulatedStateReader> {
        BidAdmissionChecker::new(Arc::new(
            SimulatedStateReader::new().with_basket(basket_address(), basket),
        ))
    }

    #[test]
    fn test_positive_quantity() {
        let checker = checker_with(SimulatedBasket::default());
        assert_eq!(
            checker.require_positive_quantity(U256::ZERO),
            Err(RebalanceViolation::InvalidQuantity)
        );
        assert!(checker.require_positive_quantity(U256::from(1)).is_ok());
        assert!(checker.require_positive_quantity(U256::MAX).is_ok());
    }

    #[tokio::test]
    async fn test_multiple_of_minimum_bid() {
        let checker = checker_with(SimulatedBasket {
            minimum_bid: U256::from(7),
            ..Default::default()
        });

        for quantity in 0u64..50 {
            let result = checker
                .require_multiple_of_minimum_bid(basket_address(), U256::from(quantity))
                .await;
            assert_eq!(result.is_ok(), quantity % 7 == 0, "quantity {}", quantity);
        }
    }

    #[tokio::test]
    async fn test_zero_minimum_bid_is_malformed() {
        let checker = checker_with(SimulatedBasket {
            minimum_bid: U256::ZERO,
            ..Default::default()
        });

        let result = checker
            .require_multiple_of_minimum_bid(basket_address(), U256::from(10))
            .await;
        assert!(matches!(
            result,
            Err(RebalanceViolation::NetworkFailure(ReadError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_flows_follow_combined_token_order() {
        let tokens = vec![Address::repeat_byte(0xa), Address::repeat_byte(0xb)];
        let checker = checker_with(SimulatedBasket {
            minimum_bid: U256::from(10),
            combined_tokens: tokens.clone(),
            inflow_per_minimum_bid: vec![U256::from(3), U256::ZERO],
            outflow_per_minimum_bid: vec![U256::ZERO, U256::from(4)],
            ..Default::default()
        });

        let flows = checker
            .compute_required_flows(basket_address(), U256::from(20))
            .await
            .unwrap();

        assert_eq!(flows.tokens, tokens);
        assert_eq!(flows.inflow, vec![U256::from(6), U256::ZERO]);
        assert_eq!(flows.outflow, vec![U256::ZERO, U256::from(8)]);
    }
}
