//! Shared tracing setup for Upscout binaries.

mod tracing;

pub use self::tracing::{LogFormat, init as init_tracing, try_init as try_init_tracing};
