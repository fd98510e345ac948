use super::types::{HostPerformance, MICROS_PER_SECOND, PortState, Score};

/// Penalty added to any port that is not open
pub const NON_OPEN_PENALTY_MICROS: u64 = 10 * MICROS_PER_SECOND;

/// Score a probe result, lower is better.
///
/// Latency plus a flat penalty for non-open ports. The unreachable stand-in
/// is `closed`, so it pays the penalty on top of its own latency.
pub fn score(perf: &HostPerformance) -> Score {
    let penalty = match perf.state {
        PortState::Open => 0,
        PortState::Closed | PortState::Filtered | PortState::Unavailable => NON_OPEN_PENALTY_MICROS,
    };
    perf.latency_micros.saturating_add(penalty)
}
