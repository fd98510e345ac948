use std::io::ErrorKind;
use std::time::{Duration, Instant};

use tokio::net::{TcpStream, lookup_host};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::nmap;
use super::types::{EndpointAddress, HostPerformance, PortState};
use crate::error::ProbeError;

/// Prober trait for the different probe transports
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Probe `endpoint` once.
    ///
    /// `Ok(None)` means the endpoint produced nothing observable (no host, no
    /// port). `Err` means the transport itself failed.
    async fn probe(&self, endpoint: &EndpointAddress) -> Result<Option<HostPerformance>, ProbeError>;
}

/// Runs `nmap <host> -oX - -p <port>` and reads its XML report
pub struct NmapProber {
    program: String,
}

impl NmapProber {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait::async_trait]
impl Prober for NmapProber {
    async fn probe(&self, endpoint: &EndpointAddress) -> Result<Option<HostPerformance>, ProbeError> {
        let port = endpoint.port.to_string();

        let output = Command::new(&self.program)
            .args([endpoint.host.as_str(), "-oX", "-", "-p", port.as_str()])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProbeError::Spawn { program: self.program.clone(), source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::Exit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: stderr.lines().next().unwrap_or_default().trim().to_string(),
            });
        }

        nmap::parse_report(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Times a TCP connect to the first resolved address of the endpoint
pub struct TcpProber {
    connect_timeout: Duration,
}

impl TcpProber {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

/// Whole microseconds in `elapsed`, saturating at `u64::MAX`
fn elapsed_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

#[async_trait::async_trait]
impl Prober for TcpProber {
    async fn probe(&self, endpoint: &EndpointAddress) -> Result<Option<HostPerformance>, ProbeError> {
        let addr = match lookup_host((endpoint.host.as_str(), endpoint.port)).await {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => addr,
                None => return Ok(None),
            },
            Err(e) => {
                debug!("Failed to resolve {}: {}", endpoint, e);
                return Ok(None);
            }
        };

        let start = Instant::now();
        let result = timeout(self.connect_timeout, TcpStream::connect(addr)).await;
        let latency = elapsed_micros(start.elapsed());

        match result {
            Ok(Ok(_stream)) => Ok(Some(HostPerformance::new(latency, PortState::Open))),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                Ok(Some(HostPerformance::new(latency, PortState::Closed)))
            }
            Ok(Err(e)) => {
                debug!("TCP connect to {} ({}) failed: {}", endpoint, addr, e);
                Ok(None)
            }
            // silently dropped SYNs
            Err(_) => Ok(Some(HostPerformance::new(latency, PortState::Filtered))),
        }
    }
}
