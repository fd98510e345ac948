use serde::Deserialize;
use std::fmt;
use tokio::time::Instant;

use crate::error::{ProbeError, SelectionError};

/// One microsecond-resolution second
pub const MICROS_PER_SECOND: u64 = 1_000_000;

/// Latency reported for an endpoint whose probe produced nothing usable
pub const UNREACHABLE_LATENCY_MICROS: u64 = 100 * MICROS_PER_SECOND;

/// Comparable probe score, lower is better
pub type Score = u64;

/// A probe target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct EndpointAddress {
    pub host: String,
    pub port: u16,
}

impl EndpointAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Port state observed by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    Closed,
    Filtered,
    Unavailable,
}

impl PortState {
    /// Map an nmap port state to ours.
    ///
    /// Ambiguous nmap states collapse to `Filtered`, unknown ones to
    /// `Unavailable`.
    pub fn from_nmap(state: &str) -> Self {
        match state {
            "open" => PortState::Open,
            "closed" => PortState::Closed,
            "filtered" | "open|filtered" | "closed|filtered" | "unfiltered" => PortState::Filtered,
            _ => PortState::Unavailable,
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => write!(f, "open"),
            PortState::Closed => write!(f, "closed"),
            PortState::Filtered => write!(f, "filtered"),
            PortState::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Result of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPerformance {
    /// Smoothed round-trip time in microseconds
    pub latency_micros: u64,

    pub state: PortState,
}

impl HostPerformance {
    pub fn new(latency_micros: u64, state: PortState) -> Self {
        Self { latency_micros, state }
    }

    /// Stand-in for an endpoint that yielded no usable probe result
    pub const fn unreachable() -> Self {
        Self { latency_micros: UNREACHABLE_LATENCY_MICROS, state: PortState::Closed }
    }
}

/// An endpoint whose probe could not be carried out
#[derive(Debug)]
pub struct ProbeFailure {
    pub endpoint: EndpointAddress,
    pub error: ProbeError,
}

/// Winner of a selection pass
#[derive(Debug)]
pub struct Selection {
    pub endpoint: EndpointAddress,
    pub performance: HostPerformance,
    pub score: Score,

    /// Probes that failed during the pass, in probe order
    pub failures: Vec<ProbeFailure>,
}

/// Why a pass ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Initial,
    Scheduled,
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running(PassKind),
    Waiting,
    Stopped,
}

/// Outcome of one selection pass as seen by the driver
#[derive(Debug)]
pub struct CycleReport {
    /// Pass number, starting at 0 for the initial pass
    pub cycle: u64,
    pub kind: PassKind,
    pub started_at: Instant,
    pub finished_at: Instant,
    pub outcome: Result<Selection, SelectionError>,
}
