use std::{env::var, str::FromStr};

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{
    Layer,
    filter::EnvFilter,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Output format picked through `RUST_LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(other.to_string()),
        }
    }
}

/// Install the global subscriber at `INFO`, overridable through `RUST_LOG`.
///
/// Panics if a global subscriber is already set.
pub fn init() {
    if let Err(error) = try_init() {
        panic!("Failed to install tracing subscriber: {error}");
    }
}

/// Like [`init`], but reports an already installed subscriber instead of panicking
pub fn try_init() -> Result<(), TryInitError> {
    initialize_tracing(LevelFilter::INFO)
}

/// Initialize tracing subscriber with default configuration.
fn initialize_tracing(level: LevelFilter) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let format = var("RUST_LOG_FORMAT").unwrap_or_default().parse::<LogFormat>();

    let log_layer = match format {
        Ok(LogFormat::Json) => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).try_init()?;

    if let Err(unknown) = format {
        warn!("Unknown RUST_LOG_FORMAT {unknown:?}, falling back to compact output");
    }

    Ok(())
}
