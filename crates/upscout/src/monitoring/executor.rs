use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::info;

use super::checker::{NmapProber, Prober, TcpProber};
use super::types::{EndpointAddress, HostPerformance};
use crate::config::{ProbeMethod, ProbeSettings};
use crate::error::ProbeError;

/// Probe executor - runs one probe and normalizes its result
pub struct ProbeExecutor {
    prober: Arc<dyn Prober>,
    probe_timeout: Option<Duration>,
}

impl ProbeExecutor {
    /// Create an executor around any prober, without a probe timeout
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self { prober, probe_timeout: None }
    }

    /// Create the executor described by the probe settings
    pub fn from_settings(settings: &ProbeSettings) -> Self {
        let prober: Arc<dyn Prober> = match settings.method {
            ProbeMethod::Nmap => Arc::new(NmapProber::new(settings.nmap_path.clone())),
            ProbeMethod::Tcp => Arc::new(TcpProber::new(settings.connect_timeout())),
        };

        Self { prober, probe_timeout: settings.probe_timeout() }
    }

    /// Abort probes running longer than `limit`
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.probe_timeout = Some(limit);
        self
    }

    /// Probe an endpoint.
    ///
    /// An endpoint with no observable result becomes
    /// [`HostPerformance::unreachable`]. Transport failures and timeouts are
    /// returned to the caller and affect this probe only.
    pub async fn execute(&self, endpoint: &EndpointAddress) -> Result<HostPerformance, ProbeError> {
        let probe = self.prober.probe(endpoint);

        let observed = match self.probe_timeout {
            Some(limit) => timeout(limit, probe).await.map_err(|_| ProbeError::Timeout(limit))??,
            None => probe.await?,
        };

        match observed {
            Some(perf) => {
                info!(
                    "Endpoint: {} Latency(in us): {} Status: {}",
                    endpoint, perf.latency_micros, perf.state
                );
                Ok(perf)
            }
            None => {
                info!("Endpoint: {} Status: Unavailable", endpoint);
                Ok(HostPerformance::unreachable())
            }
        }
    }
}
