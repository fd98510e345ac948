//! Configuration types for Upscout.
//!
//! This module defines the data structures read from `endpoints.toml`.

use std::num::NonZeroU32;

use serde::Deserialize;

use crate::monitoring::EndpointAddress;

/// Default program used by the nmap prober
pub const DEFAULT_NMAP_PATH: &str = "nmap";

/// Default TCP connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;

/// Unit of the selection period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// How often the selection pass repeats: `count` times `unit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPeriodSpec")]
pub struct PeriodSpec {
    pub unit: PeriodUnit,
    pub count: NonZeroU32,
}

/// `[period]` table as written in the file, before the count is checked
#[derive(Debug, Deserialize)]
pub(crate) struct RawPeriodSpec {
    #[serde(rename = "period_type")]
    pub(crate) unit: PeriodUnit,

    #[serde(rename = "period")]
    pub(crate) count: u32,
}

/// Transport used to probe endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// Run `nmap -oX -` and read the port state and smoothed RTT
    #[default]
    Nmap,
    /// Time a TCP connect from this process
    Tcp,
}

/// Probe transport settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub method: ProbeMethod,

    /// Program invoked by the nmap prober
    pub nmap_path: String,

    /// Upper bound for a single probe, unbounded when unset
    pub timeout_seconds: Option<u64>,

    /// Connect timeout of the TCP prober
    pub connect_timeout_ms: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            method: ProbeMethod::default(),
            nmap_path: DEFAULT_NMAP_PATH.to_string(),
            timeout_seconds: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub period: PeriodSpec,

    #[serde(default)]
    pub probe: ProbeSettings,

    /// Endpoints in probe order
    #[serde(default)]
    pub endpoints: Vec<EndpointAddress>,
}

/// Builder for Config
#[derive(Debug)]
pub struct ConfigBuilder {
    pub(crate) config: Config,
}
