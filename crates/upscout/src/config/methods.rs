//! Configuration methods for Upscout.
//!
//! Loading, validation, builders and the startup dump.

use std::{fmt, fs, num::NonZeroU32, path, str::FromStr, time::Duration};

use tracing::warn;

use super::types::{Config, ConfigBuilder, PeriodSpec, PeriodUnit, ProbeMethod, ProbeSettings, RawPeriodSpec};
use crate::error::ConfigError;
use crate::monitoring::EndpointAddress;

impl PeriodUnit {
    /// Length of one unit in seconds
    pub const fn seconds(self) -> u64 {
        match self {
            PeriodUnit::Seconds => 1,
            PeriodUnit::Minutes => 60,
            PeriodUnit::Hours => 60 * 60,
            PeriodUnit::Days => 24 * 60 * 60,
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodUnit::Seconds => write!(f, "SECONDS"),
            PeriodUnit::Minutes => write!(f, "MINUTES"),
            PeriodUnit::Hours => write!(f, "HOURS"),
            PeriodUnit::Days => write!(f, "DAYS"),
        }
    }
}

impl PeriodSpec {
    /// Period of `count` units; a count of zero is rejected
    pub fn new(unit: PeriodUnit, count: u32) -> Result<Self, ConfigError> {
        let count = NonZeroU32::new(count).ok_or(ConfigError::InvalidPeriod(count))?;
        Ok(Self { unit, count })
    }

    /// Interval between two scheduled passes.
    ///
    /// A count of 1 and a count of N only differ by the factor N, and the
    /// result is never zero.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.unit.seconds() * u64::from(self.count.get()))
    }
}

impl TryFrom<RawPeriodSpec> for PeriodSpec {
    type Error = ConfigError;

    fn try_from(raw: RawPeriodSpec) -> Result<Self, Self::Error> {
        Self::new(raw.unit, raw.count)
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMethod::Nmap => write!(f, "nmap"),
            ProbeMethod::Tcp => write!(f, "tcp"),
        }
    }
}

impl ProbeSettings {
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

impl Config {
    /// Create a new configuration builder
    pub fn builder(period: PeriodSpec) -> ConfigBuilder {
        ConfigBuilder {
            config: Config { period, probe: ProbeSettings::default(), endpoints: Vec::new() },
        }
    }

    /// Load and validate the configuration file at `path`.
    ///
    /// A path without a `.toml` extension is normalised to one. Unlike the
    /// Uppe service config no default file is created: a missing file is an
    /// error.
    ///
    /// ```rust,ignore
    /// let cfg = upscout::Config::from_path(upscout::DEFAULT_CONFIG_PATH)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_path(path: impl AsRef<path::Path>) -> Result<Self, ConfigError> {
        let config_path = normalize_toml_path(path.as_ref());
        let raw_string = fs::read_to_string(&config_path)
            .map_err(|source| ConfigError::Read { path: config_path.clone(), source })?;
        raw_string.parse()
    }

    /// Check values serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, endpoint) in self.endpoints.iter().enumerate() {
            if endpoint.host.trim().is_empty() {
                return Err(ConfigError::InvalidEndpoint { index, reason: "empty host".into() });
            }
            // would reach nmap's command line as an option
            if endpoint.host.starts_with('-') {
                return Err(ConfigError::InvalidEndpoint {
                    index,
                    reason: format!("host {:?} starts with '-'", endpoint.host),
                });
            }
            if endpoint.port == 0 {
                return Err(ConfigError::InvalidEndpoint {
                    index,
                    reason: format!("port 0 on {}", endpoint.host),
                });
            }
        }

        if self.endpoints.is_empty() {
            warn!("No endpoints configured, every selection pass will come up empty");
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Current Upscout Configuration State:")?;
        write_title_1(f, "Period")?;
        write_1(f, "Type", &self.period.unit)?;
        write_1(f, "Count", &self.period.count)?;
        write_title_1(f, "Probe")?;
        write_1(f, "Method", &self.probe.method)?;
        if self.probe.method == ProbeMethod::Nmap {
            write_1(f, "Program", &self.probe.nmap_path)?;
        } else {
            write_1(f, "Connect Timeout (ms)", &self.probe.connect_timeout_ms)?;
        }
        match self.probe.timeout_seconds {
            Some(seconds) => write_1(f, "Timeout (s)", &seconds)?,
            None => write_1(f, "Timeout (s)", &"none")?,
        }
        write_title_1(f, "Endpoints")?;
        for endpoint in &self.endpoints {
            write_2(f, "Endpoint", endpoint)?;
        }

        Ok(())
    }
}

impl ConfigBuilder {
    /// Build and validate the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Append an endpoint to the probe order
    pub fn endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.endpoints.push(EndpointAddress::new(host, port));
        self
    }

    /// Set the probe transport
    pub fn probe_method(mut self, method: ProbeMethod) -> Self {
        self.config.probe.method = method;
        self
    }

    /// Set the program run by the nmap prober
    pub fn nmap_path(mut self, path: impl Into<String>) -> Self {
        self.config.probe.nmap_path = path.into();
        self
    }

    /// Bound every probe to `seconds`
    pub fn probe_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.probe.timeout_seconds = Some(seconds);
        self
    }

    /// Set the TCP prober connect timeout
    pub fn connect_timeout_ms(mut self, millis: u64) -> Self {
        self.config.probe.connect_timeout_ms = millis;
        self
    }
}
