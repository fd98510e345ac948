//! Scheduler tests running on paused tokio time

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedProber, endpoint, init_tracing, selector_for};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use upscout::{
    ConfigError, CycleReport, DriverState, EndpointAddress, PassKind, PeriodSpec, PeriodUnit, SelectionError,
    SelectionScheduler,
};

fn period(unit: PeriodUnit, count: u32) -> PeriodSpec {
    PeriodSpec::new(unit, count).unwrap()
}

/// Start a scheduler on its own task, returning its reports and a shutdown handle
fn spawn_scheduler(
    prober: Arc<ScriptedProber>,
    endpoints: Vec<EndpointAddress>,
    period: PeriodSpec,
) -> (mpsc::Receiver<CycleReport>, Arc<Notify>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(16);
    let shutdown = Arc::new(Notify::new());

    let mut scheduler = SelectionScheduler::new(selector_for(prober), endpoints, period).with_reports(tx);
    let handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { scheduler.run_until(shutdown).await }
    });

    (rx, shutdown, handle)
}

async fn collect(rx: &mut mpsc::Receiver<CycleReport>, count: usize) -> Vec<CycleReport> {
    let mut reports = Vec::with_capacity(count);
    while reports.len() < count {
        reports.push(rx.recv().await.expect("scheduler stopped early"));
    }
    reports
}

#[tokio::test(start_paused = true)]
async fn test_initial_pass_then_fixed_interval() {
    init_tracing();

    let best = endpoint("best", 443);
    let prober = Arc::new(ScriptedProber::new().open(&best, 100).closed(&endpoint("worse", 443), 50));
    let endpoints = vec![endpoint("worse", 443), best.clone()];

    let (mut rx, shutdown, handle) = spawn_scheduler(prober, endpoints, period(PeriodUnit::Seconds, 30));
    let reports = collect(&mut rx, 3).await;
    shutdown.notify_one();
    handle.await.unwrap();

    assert_eq!(reports[0].kind, PassKind::Initial);
    assert_eq!(reports[1].kind, PassKind::Scheduled);
    assert_eq!(reports[2].kind, PassKind::Scheduled);
    assert_eq!(reports.iter().map(|r| r.cycle).collect::<Vec<_>>(), vec![0, 1, 2]);

    for report in &reports {
        let selection = report.outcome.as_ref().expect("selection should succeed");
        assert_eq!(selection.endpoint, best);
    }

    let first_gap = reports[1].started_at - reports[0].finished_at;
    let second_gap = reports[2].started_at - reports[1].started_at;
    assert!(first_gap >= Duration::from_secs(30) && first_gap < Duration::from_secs(31), "{first_gap:?}");
    assert!(second_gap >= Duration::from_secs(30) && second_gap < Duration::from_secs(31), "{second_gap:?}");
}

#[tokio::test(start_paused = true)]
async fn test_empty_endpoint_list_keeps_scheduling() {
    let prober = Arc::new(ScriptedProber::new());

    let (mut rx, shutdown, handle) = spawn_scheduler(prober.clone(), Vec::new(), period(PeriodUnit::Minutes, 1));
    let reports = collect(&mut rx, 3).await;
    shutdown.notify_one();
    handle.await.unwrap();

    for report in &reports {
        assert!(matches!(report.outcome, Err(SelectionError::NoEndpointAvailable)));
    }
    assert!(prober.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hours_period_interval() {
    let scheduler = SelectionScheduler::new(
        selector_for(Arc::new(ScriptedProber::new())),
        vec![endpoint("a", 1)],
        period(PeriodUnit::Hours, 2),
    );
    assert_eq!(scheduler.interval(), Duration::from_secs(2 * 60 * 60));

    let prober = Arc::new(ScriptedProber::new());
    let (mut rx, shutdown, handle) = spawn_scheduler(prober, vec![endpoint("a", 1)], period(PeriodUnit::Hours, 2));
    let reports = collect(&mut rx, 2).await;
    shutdown.notify_one();
    handle.await.unwrap();

    let gap = reports[1].started_at - reports[0].finished_at;
    assert!(gap >= Duration::from_secs(7_200) && gap < Duration::from_secs(7_201), "{gap:?}");
}

#[tokio::test(start_paused = true)]
async fn test_long_passes_never_overlap() {
    // every pass takes 3 s against a 1 s period
    let prober = Arc::new(ScriptedProber::new().with_delay(Duration::from_millis(1_500)));
    let endpoints = vec![endpoint("a", 1), endpoint("b", 2)];

    let (mut rx, shutdown, handle) = spawn_scheduler(prober.clone(), endpoints, period(PeriodUnit::Seconds, 1));
    let reports = collect(&mut rx, 4).await;
    shutdown.notify_one();
    handle.await.unwrap();

    for pair in reports.windows(2) {
        assert!(pair[1].started_at >= pair[0].finished_at, "pass {} overlapped", pair[1].cycle);
    }
    // whole passes only: the probe count is a multiple of the endpoint count
    assert_eq!(prober.calls().len() % 2, 0);
}

#[tokio::test(start_paused = true)]
async fn test_driver_state_transitions() {
    let prober = Arc::new(ScriptedProber::new().with_delay(Duration::from_secs(1)));
    let mut scheduler = SelectionScheduler::new(
        selector_for(prober),
        vec![endpoint("a", 1)],
        period(PeriodUnit::Seconds, 10),
    );
    let mut state = scheduler.subscribe_state();
    assert_eq!(*state.borrow(), DriverState::Idle);

    let shutdown = Arc::new(Notify::new());
    let handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { scheduler.run_until(shutdown).await }
    });

    state.wait_for(|s| *s == DriverState::Running(PassKind::Initial)).await.unwrap();
    state.wait_for(|s| *s == DriverState::Waiting).await.unwrap();
    state.wait_for(|s| *s == DriverState::Running(PassKind::Scheduled)).await.unwrap();
    state.wait_for(|s| *s == DriverState::Waiting).await.unwrap();

    shutdown.notify_one();
    handle.await.unwrap();
    assert_eq!(*state.borrow(), DriverState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_pass_lets_it_finish() {
    let prober = Arc::new(ScriptedProber::new().with_delay(Duration::from_secs(5)));
    let (mut rx, shutdown, handle) =
        spawn_scheduler(prober.clone(), vec![endpoint("a", 1), endpoint("b", 2)], period(PeriodUnit::Minutes, 1));

    // lands while the initial pass is still probing
    tokio::time::sleep(Duration::from_secs(2)).await;
    shutdown.notify_one();
    handle.await.unwrap();

    let report = rx.recv().await.expect("initial pass should be reported");
    assert_eq!(report.kind, PassKind::Initial);
    assert!(report.outcome.is_ok());
    assert_eq!(prober.calls().len(), 2);
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_report_receiver_does_not_stop_driver() {
    let prober = Arc::new(ScriptedProber::new());
    let (rx, shutdown, handle) = spawn_scheduler(prober.clone(), vec![endpoint("a", 1)], period(PeriodUnit::Seconds, 1));
    drop(rx);

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert!(!handle.is_finished());
    assert!(prober.calls().len() >= 3);

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_run_forever_keeps_reporting() {
    let best = endpoint("a", 1);
    let prober = Arc::new(ScriptedProber::new().open(&best, 10));
    let (tx, mut rx) = mpsc::channel(16);

    let scheduler = SelectionScheduler::new(selector_for(prober), vec![best.clone()], period(PeriodUnit::Seconds, 5))
        .with_reports(tx);
    let handle = tokio::spawn(scheduler.run());

    let reports = collect(&mut rx, 2).await;
    assert_eq!(reports[0].kind, PassKind::Initial);
    assert_eq!(reports[1].kind, PassKind::Scheduled);
    assert_eq!(reports[1].outcome.as_ref().unwrap().endpoint, best);
    assert!(!handle.is_finished());

    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_zero_period_never_reaches_the_driver() {
    assert!(matches!(PeriodSpec::new(PeriodUnit::Seconds, 0), Err(ConfigError::InvalidPeriod(0))));

    // the shortest period that can be built drives a healthy scheduler
    let prober = Arc::new(ScriptedProber::new());
    let (mut rx, shutdown, handle) = spawn_scheduler(prober, vec![endpoint("a", 1)], period(PeriodUnit::Seconds, 1));
    let reports = collect(&mut rx, 2).await;
    shutdown.notify_one();

    let joined = handle.await;
    assert!(joined.is_ok(), "scheduler task failed: {joined:?}");
    assert_eq!(reports[1].kind, PassKind::Scheduled);
}
