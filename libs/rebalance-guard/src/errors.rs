//! Error types for rebalance preflight checks

use crate::phase::RebalancingPhase;
use alloy_primitives::{Address, U256};

/// Failure of a single ledger read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Transport or node error while calling the contract
    Rpc(String),
    /// The call succeeded but the returned data is not usable
    Malformed(String),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Rpc(msg) => write!(f, "RPC error: {}", msg),
            ReadError::Malformed(msg) => write!(f, "Malformed ledger data: {}", msg),
        }
    }
}

impl std::error::Error for ReadError {}

/// Phase a guard expected to find the basket in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseRequirement {
    Is(RebalancingPhase),
    IsNot(RebalancingPhase),
}

impl std::fmt::Display for PhaseRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseRequirement::Is(phase) => write!(f, "{}", phase),
            PhaseRequirement::IsNot(phase) => write!(f, "not {}", phase),
        }
    }
}

/// Reason an action may not be attempted right now.
///
/// Each preflight operation fails with exactly one of these. None of them
/// are retried inside this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebalanceViolation {
    // Lifecycle
    PhaseViolation {
        basket: Address,
        expected: PhaseRequirement,
        actual: RebalancingPhase,
    },
    AuthorizationViolation {
        basket: Address,
        caller: Address,
        manager: Address,
    },
    /// Earliest legal time, in unix milliseconds
    TimingViolation { next_allowed_at_ms: U256 },
    /// Less than one minimum bid is left to auction
    AuctionExhausted {
        remaining_current_sets: U256,
        minimum_bid: U256,
    },
    /// At least one minimum bid is still left to auction, so settling is premature
    AuctionInProgress {
        remaining_current_sets: U256,
        minimum_bid: U256,
    },

    // Bid quantity
    InvalidQuantity,
    QuantityExceedsSupply {
        quantity: U256,
        remaining_current_sets: U256,
    },
    QuantityNotAligned { quantity: U256, minimum_bid: U256 },

    // Funding
    InsufficientBalance {
        component: Address,
        required: U256,
        actual: U256,
    },
    InsufficientAllowance {
        component: Address,
        required: U256,
        actual: U256,
    },

    NetworkFailure(ReadError),
}

impl std::fmt::Display for RebalanceViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebalanceViolation::PhaseViolation {
                basket,
                expected,
                actual,
            } => write!(
                f,
                "Rebalancing set {} is in {} state, expected {}",
                basket, actual, expected
            ),
            RebalanceViolation::AuthorizationViolation {
                basket,
                caller,
                manager,
            } => write!(
                f,
                "Caller {} is not the manager of {} (manager is {})",
                caller, basket, manager
            ),
            RebalanceViolation::TimingViolation { next_allowed_at_ms } => write!(
                f,
                "Insufficient time has passed, next allowed at {} ms",
                next_allowed_at_ms
            ),
            RebalanceViolation::AuctionExhausted {
                remaining_current_sets,
                minimum_bid,
            } => write!(
                f,
                "Auction exhausted: {} remaining sets is below the minimum bid of {}",
                remaining_current_sets, minimum_bid
            ),
            RebalanceViolation::AuctionInProgress {
                remaining_current_sets,
                minimum_bid,
            } => write!(
                f,
                "Not enough sets rebalanced: {} remaining sets is at least the minimum bid of {}",
                remaining_current_sets, minimum_bid
            ),
            RebalanceViolation::InvalidQuantity => {
                write!(f, "Bid quantity must be a positive integer")
            }
            RebalanceViolation::QuantityExceedsSupply {
                quantity,
                remaining_current_sets,
            } => write!(
                f,
                "Bid quantity {} exceeds remaining current sets {}",
                quantity, remaining_current_sets
            ),
            RebalanceViolation::QuantityNotAligned {
                quantity,
                minimum_bid,
            } => write!(
                f,
                "Bid quantity {} is not a multiple of the minimum bid {}",
                quantity, minimum_bid
            ),
            RebalanceViolation::InsufficientBalance {
                component,
                required,
                actual,
            } => write!(
                f,
                "Insufficient balance of {}: required {}, available {}",
                component, required, actual
            ),
            RebalanceViolation::InsufficientAllowance {
                component,
                required,
                actual,
            } => write!(
                f,
                "Insufficient allowance of {}: required {}, approved {}",
                component, required, actual
            ),
            RebalanceViolation::NetworkFailure(err) => write!(f, "Network failure: {}", err),
        }
    }
}

impl std::error::Error for RebalanceViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RebalanceViolation::NetworkFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReadError> for RebalanceViolation {
    fn from(err: ReadError) -> Self {
        RebalanceViolation::NetworkFailure(err)
    }
}
