pub mod checker;
/// Selection engine module - probes, scores and picks endpoints
///
/// This module is responsible for:
/// - Probing endpoints through nmap or a TCP connect
/// - Scoring probe results
/// - Selecting the best endpoint of a pass
/// - Repeating the selection on a fixed period
pub mod executor;
pub mod nmap;
pub mod scheduler;
pub mod scoring;
pub mod selector;
pub mod types;

pub use checker::{NmapProber, Prober, TcpProber};
pub use executor::ProbeExecutor;
pub use scheduler::SelectionScheduler;
pub use scoring::{NON_OPEN_PENALTY_MICROS, score};
pub use selector::EndpointSelector;
pub use types::{
    CycleReport, DriverState, EndpointAddress, HostPerformance, PassKind, PortState, ProbeFailure,
    Score, Selection, UNREACHABLE_LATENCY_MICROS,
};
