//! Shared test doubles for Upscout integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use upscout::{EndpointAddress, EndpointSelector, HostPerformance, PortState, ProbeExecutor, ProbeError, Prober};

/// What the scripted prober answers for one endpoint
#[derive(Debug, Clone, Copy)]
pub enum Script {
    Answer(HostPerformance),
    NoResult,
    Fail,
    Hang,
}

/// In-memory prober answering from a script, recording every call
#[derive(Default)]
pub struct ScriptedProber {
    scripts: HashMap<EndpointAddress, Script>,
    delay: Duration,
    calls: Mutex<Vec<EndpointAddress>>,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, endpoint: &EndpointAddress, script: Script) -> Self {
        self.scripts.insert(endpoint.clone(), script);
        self
    }

    pub fn open(self, endpoint: &EndpointAddress, latency_micros: u64) -> Self {
        self.on(endpoint, Script::Answer(HostPerformance::new(latency_micros, PortState::Open)))
    }

    pub fn closed(self, endpoint: &EndpointAddress, latency_micros: u64) -> Self {
        self.on(endpoint, Script::Answer(HostPerformance::new(latency_micros, PortState::Closed)))
    }

    /// Every probe takes `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<EndpointAddress> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, endpoint: &EndpointAddress) -> Result<Option<HostPerformance>, ProbeError> {
        self.calls.lock().unwrap().push(endpoint.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.scripts.get(endpoint).copied().unwrap_or(Script::NoResult) {
            Script::Answer(perf) => Ok(Some(perf)),
            Script::NoResult => Ok(None),
            Script::Fail => Err(ProbeError::Parse("scripted failure".into())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Ok(None)
            }
        }
    }
}

pub fn endpoint(host: &str, port: u16) -> EndpointAddress {
    EndpointAddress::new(host, port)
}

pub fn selector_for(prober: Arc<ScriptedProber>) -> EndpointSelector {
    EndpointSelector::new(Arc::new(ProbeExecutor::new(prober)))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}
