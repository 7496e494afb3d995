use crate::errors::ReadError;

/// Lifecycle phase of a rebalancing set token.
///
/// The chain stores this as a `uint8`; the raw code only exists at the
/// decode boundary (`TryFrom<u8>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RebalancingPhase {
    /// Idle, waiting for the manager to propose
    Default,
    /// A new composition has been proposed, auction not started
    Proposal,
    /// Auction running, bids accepted
    Rebalance,
}

impl RebalancingPhase {
    /// Raw `rebalanceState()` code
    pub fn code(&self) -> u8 {
        match self {
            RebalancingPhase::Default => 0,
            RebalancingPhase::Proposal => 1,
            RebalancingPhase::Rebalance => 2,
        }
    }

    /// Default -> Proposal -> Rebalance -> Default
    pub fn can_transition_to(&self, next: RebalancingPhase) -> bool {
        matches!(
            (self, next),
            (RebalancingPhase::Default, RebalancingPhase::Proposal)
                | (RebalancingPhase::Proposal, RebalancingPhase::Rebalance)
                | (RebalancingPhase::Rebalance, RebalancingPhase::Default)
        )
    }
}

impl TryFrom<u8> for RebalancingPhase {
    type Error = ReadError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RebalancingPhase::Default),
            1 => Ok(RebalancingPhase::Proposal),
            2 => Ok(RebalancingPhase::Rebalance),
            other => Err(ReadError::Malformed(format!(
                "unknown rebalance state code {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RebalancingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebalancingPhase::Default => write!(f, "Default"),
            RebalancingPhase::Proposal => write!(f, "Proposal"),
            RebalancingPhase::Rebalance => write!(f, "Rebalance"),
        }
    }
}
