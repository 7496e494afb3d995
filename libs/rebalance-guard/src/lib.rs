//! Preflight validation for rebalancing set token auctions.
//!
//! Provides:
//! - `LifecycleGuard`: phase, timing, manager and auction-progress checks
//! - `BidAdmissionChecker`: bid quantity, balance and allowance checks
//! - `RebalancePreflight`: the check sequence for each rebalancing action
//! - `ContractStateReader`: the ledger read seam, with an alloy-backed and a
//!   simulated implementation
//!
//! Nothing is cached. Every check re-reads the ledger, and a pass only means
//! the transaction is worth attempting right now.

mod basket;
mod bid;
mod config;
mod errors;
mod lifecycle;
mod phase;
mod preflight;
pub mod reader;
pub mod time;

pub use basket::{RebalancingBasket, TokenFlows};
pub use bid::BidAdmissionChecker;
pub use config::{PreflightConfig, ENV_BASKET, ENV_RPC_URL, ENV_TRANSFER_PROXY};
pub use errors::{PhaseRequirement, ReadError, RebalanceViolation};
pub use lifecycle::LifecycleGuard;
pub use phase::RebalancingPhase;
pub use preflight::RebalancePreflight;
pub use reader::{ContractStateReader, OnchainStateReader, SimulatedBasket, SimulatedStateReader};
