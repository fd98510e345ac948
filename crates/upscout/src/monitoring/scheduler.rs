use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::selector::EndpointSelector;
use super::types::{CycleReport, DriverState, EndpointAddress, PassKind};
use crate::config::PeriodSpec;

/// Selection scheduler - runs one pass at startup, then one per period
pub struct SelectionScheduler {
    selector: EndpointSelector,
    endpoints: Arc<[EndpointAddress]>,
    period: PeriodSpec,
    report_tx: Option<mpsc::Sender<CycleReport>>,
    state_tx: watch::Sender<DriverState>,
    next_cycle: u64,
}

impl SelectionScheduler {
    /// Create a new selection scheduler
    pub fn new(
        selector: EndpointSelector,
        endpoints: impl Into<Arc<[EndpointAddress]>>,
        period: PeriodSpec,
    ) -> Self {
        let (state_tx, _) = watch::channel(DriverState::Idle);

        Self {
            selector,
            endpoints: endpoints.into(),
            period,
            report_tx: None,
            state_tx,
            next_cycle: 0,
        }
    }

    /// Send a [`CycleReport`] for every pass to `report_tx`
    pub fn with_reports(mut self, report_tx: mpsc::Sender<CycleReport>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    /// Watch the driver state
    pub fn subscribe_state(&self) -> watch::Receiver<DriverState> {
        self.state_tx.subscribe()
    }

    /// Interval between scheduled passes
    pub fn interval(&self) -> Duration {
        self.period.interval()
    }

    /// Run forever
    pub async fn run(mut self) {
        // never notified
        let shutdown = Arc::new(Notify::new());
        self.run_until(shutdown).await;
    }

    /// Run until `shutdown` is notified.
    ///
    /// Shutdown is only observed between passes: a pass that has started
    /// always completes and is reported. Passes never overlap; ticks that
    /// fall inside a long pass are skipped.
    pub async fn run_until(&mut self, shutdown: Arc<Notify>) {
        let period = self.interval();
        info!(
            "Selecting among {} endpoints every {} {} ({:?})",
            self.endpoints.len(),
            self.period.count,
            self.period.unit,
            period
        );

        self.run_pass(PassKind::Initial).await;

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            self.state_tx.send_replace(DriverState::Waiting);

            let stop = tokio::select! {
                biased;
                _ = shutdown.notified() => true,
                _ = ticker.tick() => false,
            };
            if stop {
                info!("Selection scheduler: shutdown signal received");
                break;
            }

            self.run_pass(PassKind::Scheduled).await;
        }

        self.state_tx.send_replace(DriverState::Stopped);
    }

    async fn run_pass(&mut self, kind: PassKind) {
        let cycle = self.next_cycle;
        self.next_cycle += 1;
        self.state_tx.send_replace(DriverState::Running(kind));

        info!("Start scanning of endpoints.");
        let started_at = Instant::now();
        let outcome = self.selector.select(&self.endpoints).await;
        let finished_at = Instant::now();

        match &outcome {
            Ok(selection) => info!("The best endpoint is {}", selection.endpoint),
            Err(e) => warn!("Selection pass {} found no endpoint: {}", cycle, e),
        }

        if let Some(report_tx) = &self.report_tx {
            let report = CycleReport { cycle, kind, started_at, finished_at, outcome };
            if let Err(e) = report_tx.send(report).await {
                debug!("Dropping cycle reports, receiver is gone: {}", e);
                self.report_tx = None;
            }
        }
    }
}
