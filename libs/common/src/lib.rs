//! Solidity bindings shared across the workspace.

pub mod interfaces {
    pub mod erc20;
    pub mod rebalancing_set_token;
}
