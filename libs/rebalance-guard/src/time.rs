//! Time window helpers.
//!
//! The contract stores timestamps and periods in seconds; callers compare in
//! unix milliseconds.

use alloy_primitives::U256;

const MILLIS_PER_SECOND: u64 = 1000;

/// Earliest instant (ms) at which `start + period` (both seconds) has elapsed
pub fn window_end_ms(start_secs: U256, period_secs: U256) -> U256 {
    start_secs
        .saturating_add(period_secs)
        .saturating_mul(U256::from(MILLIS_PER_SECOND))
}

/// Current wall-clock time in unix milliseconds
pub fn now_ms() -> U256 {
    let millis = chrono::Utc::now().timestamp_millis();
    U256::from(u64::try_from(millis).unwrap_or(0))
}
