use std::io::Error as IoError;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::monitoring::types::ProbeFailure;

/// Errors raised while loading the endpoint configuration.
///
/// Every variant is fatal: the service exits before any probe is issued.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid period: {0} (must be a positive integer)")]
    InvalidPeriod(u32),
    #[error("Invalid endpoint #{index}: {reason}")]
    InvalidEndpoint { index: usize, reason: String },
}

/// Errors raised by a single probe.
///
/// These abort only the probe that produced them; the selection pass moves on
/// to the next endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: IoError,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit { program: String, status: String, stderr: String },
    #[error("Unparsable probe output: {0}")]
    Parse(String),
    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors raised by a selection pass.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No endpoint available!")]
    NoEndpointAvailable,
    #[error("All {} endpoint probes failed", .0.len())]
    AllProbesFailed(Vec<ProbeFailure>),
}
