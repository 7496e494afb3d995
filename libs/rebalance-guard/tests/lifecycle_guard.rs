use alloy_primitives::{Address, U256};
use rebalance_guard::{
    LifecycleGuard, PhaseRequirement, ReadError, RebalanceViolation, RebalancingPhase,
    SimulatedBasket, SimulatedStateReader,
};
use std::sync::Arc;

fn basket() -> Address {
    Address::repeat_byte(0x5e)
}

fn manager() -> Address {
    Address::repeat_byte(0x11)
}

fn setup(
    state: SimulatedBasket,
) -> (Arc<SimulatedStateReader>, LifecycleGuard<SimulatedStateReader>) {
    let reader = Arc::new(SimulatedStateReader::new().with_basket(basket(), state));
    let guard = LifecycleGuard::new(reader.clone());
    (reader, guard)
}

#[tokio::test]
async fn test_in_proposal_per_phase() {
    for phase in [
        RebalancingPhase::Default,
        RebalancingPhase::Proposal,
        RebalancingPhase::Rebalance,
    ] {
        let (_, guard) = setup(SimulatedBasket {
            phase,
            ..Default::default()
        });

        let result = guard.require_in_proposal(basket()).await;
        if phase == RebalancingPhase::Proposal {
            assert!(result.is_ok());
        } else {
            assert_eq!(
                result,
                Err(RebalanceViolation::PhaseViolation {
                    basket: basket(),
                    expected: PhaseRequirement::Is(RebalancingPhase::Proposal),
                    actual: phase,
                })
            );
        }
    }
}

#[tokio::test]
async fn test_in_rebalance_per_phase() {
    for phase in [
        RebalancingPhase::Default,
        RebalancingPhase::Proposal,
        RebalancingPhase::Rebalance,
    ] {
        let (_, guard) = setup(SimulatedBasket {
            phase,
            ..Default::default()
        });

        let result = guard.require_in_rebalance(basket()).await;
        assert_eq!(result.is_ok(), phase == RebalancingPhase::Rebalance, "{}", phase);
    }
}

#[tokio::test]
async fn test_not_in_rebalance_reports_actual_phase() {
    let (_, guard) = setup(SimulatedBasket {
        phase: RebalancingPhase::Rebalance,
        ..Default::default()
    });

    let result = guard.require_not_in_rebalance(basket()).await;
    assert_eq!(
        result,
        Err(RebalanceViolation::PhaseViolation {
            basket: basket(),
            expected: PhaseRequirement::IsNot(RebalancingPhase::Rebalance),
            actual: RebalancingPhase::Rebalance,
        })
    );
}

#[tokio::test]
async fn test_phase_is_reread_on_every_call() {
    let (reader, guard) = setup(SimulatedBasket {
        phase: RebalancingPhase::Proposal,
        ..Default::default()
    });

    assert!(guard.require_in_proposal(basket()).await.is_ok());

    reader.update_basket(basket(), |b| b.phase = RebalancingPhase::Rebalance);

    assert!(guard.require_in_proposal(basket()).await.is_err());
    assert!(guard.require_in_rebalance(basket()).await.is_ok());
}

#[tokio::test]
async fn test_manager_check() {
    let (_, guard) = setup(SimulatedBasket {
        manager: manager(),
        ..Default::default()
    });

    assert!(guard.require_manager(basket(), manager()).await.is_ok());

    let stranger = Address::repeat_byte(0x22);
    assert_eq!(
        guard.require_manager(basket(), stranger).await,
        Err(RebalanceViolation::AuthorizationViolation {
            basket: basket(),
            caller: stranger,
            manager: manager(),
        })
    );
}

#[tokio::test]
async fn test_manager_check_ignores_letter_case() {
    let manager: Address = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd".parse().unwrap();
    let (_, guard) = setup(SimulatedBasket {
        manager,
        ..Default::default()
    });

    let upper: Address = "0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD".parse().unwrap();
    assert!(guard.require_manager(basket(), upper).await.is_ok());
}

#[tokio::test]
async fn test_rebalance_interval_elapsed() {
    // last rebalance at t=1_000s, interval 3_600s => next at 4_600_000 ms
    let (_, guard) = setup(SimulatedBasket {
        last_rebalance_timestamp: U256::from(1_000),
        rebalance_interval: U256::from(3_600),
        ..Default::default()
    });
    let next = U256::from(4_600_000u64);

    assert_eq!(
        guard
            .require_rebalance_interval_elapsed(basket(), next - U256::from(1))
            .await,
        Err(RebalanceViolation::TimingViolation {
            next_allowed_at_ms: next
        })
    );
    assert_eq!(
        guard
            .require_rebalance_interval_elapsed(basket(), U256::ZERO)
            .await,
        Err(RebalanceViolation::TimingViolation {
            next_allowed_at_ms: next
        })
    );
    assert!(guard
        .require_rebalance_interval_elapsed(basket(), next)
        .await
        .is_ok());
    assert!(guard
        .require_rebalance_interval_elapsed(basket(), next + U256::from(1))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_proposal_period_elapsed() {
    let (_, guard) = setup(SimulatedBasket {
        phase: RebalancingPhase::Proposal,
        proposal_start_time: U256::from(1_700_000_000u64),
        proposal_period: U256::from(86_400),
        ..Default::default()
    });
    let next = U256::from(1_700_086_400_000u64);

    assert_eq!(
        guard
            .require_proposal_period_elapsed(basket(), next - U256::from(1))
            .await,
        Err(RebalanceViolation::TimingViolation {
            next_allowed_at_ms: next
        })
    );
    assert!(guard
        .require_proposal_period_elapsed(basket(), next)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_auction_progress_gates() {
    let (reader, guard) = setup(SimulatedBasket {
        phase: RebalancingPhase::Rebalance,
        minimum_bid: U256::from(100),
        remaining_current_sets: U256::from(500),
        ..Default::default()
    });

    assert!(guard.require_auction_not_exhausted(basket()).await.is_ok());
    assert_eq!(
        guard.require_enough_sets_rebalanced(basket()).await,
        Err(RebalanceViolation::AuctionInProgress {
            remaining_current_sets: U256::from(500),
            minimum_bid: U256::from(100),
        })
    );

    reader.update_basket(basket(), |b| b.remaining_current_sets = U256::from(40));

    assert_eq!(
        guard.require_auction_not_exhausted(basket()).await,
        Err(RebalanceViolation::AuctionExhausted {
            remaining_current_sets: U256::from(40),
            minimum_bid: U256::from(100),
        })
    );
    assert!(guard.require_enough_sets_rebalanced(basket()).await.is_ok());
}

#[tokio::test]
async fn test_read_failure_is_network_failure() {
    let (reader, guard) = setup(SimulatedBasket::default());
    reader.fail_basket_reads(basket());

    let result = guard.require_in_proposal(basket()).await;
    assert!(matches!(
        result,
        Err(RebalanceViolation::NetworkFailure(ReadError::Rpc(_)))
    ));

    let result = guard
        .require_rebalance_interval_elapsed(basket(), U256::MAX)
        .await;
    assert!(matches!(result, Err(RebalanceViolation::NetworkFailure(_))));
}
