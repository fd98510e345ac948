//! Service configuration for Upscout.
//!
//! Endpoints, the selection period and probe settings are read once from a
//! TOML file and stay immutable for the lifetime of the process.

mod methods;
mod types;

pub use types::{
    Config, ConfigBuilder, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_NMAP_PATH, PeriodSpec, PeriodUnit,
    ProbeMethod, ProbeSettings,
};
