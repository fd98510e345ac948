//! Upscout - best endpoint selection for Uppe
//!
//! Probes a fixed list of `host:port` endpoints, scores every probe result and
//! reports the endpoint with the best mix of availability and latency, once at
//! startup and then on a fixed schedule.

pub mod config;
pub mod error;
pub mod monitoring;

// Re-export main types
pub use config::{Config, ConfigBuilder, PeriodSpec, PeriodUnit, ProbeMethod, ProbeSettings};
pub use error::{ConfigError, ProbeError, SelectionError};
pub use monitoring::{
    CycleReport, DriverState, EndpointAddress, EndpointSelector, HostPerformance, PassKind,
    PortState, ProbeExecutor, ProbeFailure, Prober, Selection, SelectionScheduler, score,
};

/// Default location of the endpoint configuration, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "endpoints.toml";
