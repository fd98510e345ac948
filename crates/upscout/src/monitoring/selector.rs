use std::sync::Arc;

use tracing::{debug, warn};

use super::executor::ProbeExecutor;
use super::scoring::score;
use super::types::{EndpointAddress, HostPerformance, ProbeFailure, Score, Selection};
use crate::error::SelectionError;

/// Endpoint selector - probes every endpoint in order and keeps the best score
pub struct EndpointSelector {
    executor: Arc<ProbeExecutor>,
}

impl EndpointSelector {
    pub fn new(executor: Arc<ProbeExecutor>) -> Self {
        Self { executor }
    }

    /// Probe and score `endpoints` one after another.
    ///
    /// The lowest score wins; on a tie the endpoint listed first is kept.
    /// Endpoints whose probe failed are skipped and listed in
    /// [`Selection::failures`].
    pub async fn select(&self, endpoints: &[EndpointAddress]) -> Result<Selection, SelectionError> {
        if endpoints.is_empty() {
            return Err(SelectionError::NoEndpointAvailable);
        }

        let mut best: Option<(&EndpointAddress, HostPerformance, Score)> = None;
        let mut failures = Vec::new();

        for endpoint in endpoints {
            let performance = match self.executor.execute(endpoint).await {
                Ok(performance) => performance,
                Err(error) => {
                    warn!("Probe of {} failed: {}", endpoint, error);
                    failures.push(ProbeFailure { endpoint: endpoint.clone(), error });
                    continue;
                }
            };

            let endpoint_score = score(&performance);
            debug!("Endpoint {} scored {}", endpoint, endpoint_score);

            let is_better = match &best {
                Some((_, _, best_score)) => endpoint_score < *best_score,
                None => true,
            };
            if is_better {
                best = Some((endpoint, performance, endpoint_score));
            }
        }

        match best {
            Some((endpoint, performance, best_score)) => Ok(Selection {
                endpoint: endpoint.clone(),
                performance,
                score: best_score,
                failures,
            }),
            None => Err(SelectionError::AllProbesFailed(failures)),
        }
    }
}
