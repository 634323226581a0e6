use super::*;
use crate::coordination::Coordinator;
use crate::observer::{ChannelObserver, PhaseEvent};
use tokio::time::timeout;

fn quick() -> DelayRange {
    DelayRange::fixed(Duration::from_millis(2))
}

#[tokio::test]
async fn phases_follow_the_cycle() {
    let coordinator = Arc::new(Coordinator::with_seats(3).unwrap());
    let (observer, mut rx) = ChannelObserver::new();
    let worker = Worker::new(WorkerId(1), coordinator.clone(), quick(), quick())
        .with_observer(Arc::new(observer))
        .with_seed(1);
    let stats = worker.stats();
    let shutdown = Shutdown::new();

    let task = tokio::spawn(worker.run(shutdown.clone()));
    tokio::time::sleep(Duration::from_millis(40)).await;
    shutdown.trigger();
    timeout(Duration::from_secs(1), task).await.unwrap().unwrap().unwrap();

    let mut phases = Vec::new();
    while let Ok(PhaseEvent { worker, phase }) = rx.try_recv() {
        assert_eq!(worker, WorkerId(1));
        phases.push(phase);
    }
    let cycle = [
        Phase::Thinking,
        Phase::Waiting,
        Phase::Acquired,
        Phase::Eating,
        Phase::Released,
    ];
    assert!(phases.len() >= cycle.len());
    for (seen, expected) in phases.iter().zip(cycle.iter().cycle()) {
        assert_eq!(seen, expected);
    }
    assert!(stats.meals() >= 1);
    assert!(coordinator.snapshot().eating().is_empty());
}

#[tokio::test]
async fn shutdown_while_waiting_holds_nothing() {
    let coordinator = Arc::new(Coordinator::with_seats(3).unwrap());
    coordinator.acquire_pair(WorkerId(0)).await.unwrap();
    let worker = Worker::new(
        WorkerId(1),
        coordinator.clone(),
        DelayRange::fixed(Duration::ZERO),
        quick(),
    );
    let stats = worker.stats();
    let shutdown = Shutdown::new();

    let task = tokio::spawn(worker.run(shutdown.clone()));
    timeout(Duration::from_secs(1), async {
        while !coordinator.snapshot().is_waiting(WorkerId(1)) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    shutdown.trigger();

    timeout(Duration::from_secs(1), task).await.unwrap().unwrap().unwrap();
    assert_eq!(stats.meals(), 0);
    let state = coordinator.snapshot();
    assert_eq!(state.held_by(WorkerId(1)), 0);
    assert!(state.waiting().is_empty());
}

#[tokio::test]
async fn shutdown_mid_meal_releases_pair() {
    let coordinator = Arc::new(Coordinator::with_seats(4).unwrap());
    let worker = Worker::new(
        WorkerId(2),
        coordinator.clone(),
        DelayRange::fixed(Duration::ZERO),
        DelayRange::fixed(Duration::from_secs(60)),
    );
    let stats = worker.stats();
    let shutdown = Shutdown::new();

    let task = tokio::spawn(worker.run(shutdown.clone()));
    timeout(Duration::from_secs(1), async {
        while !coordinator.snapshot().holds_pair(WorkerId(2)) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    shutdown.trigger();

    timeout(Duration::from_secs(1), task).await.unwrap().unwrap().unwrap();
    assert_eq!(stats.meals(), 1);
    assert!(coordinator.snapshot().eating().is_empty());
}

#[tokio::test]
async fn invalid_seat_surfaces_error() {
    let coordinator = Arc::new(Coordinator::with_seats(2).unwrap());
    let worker = Worker::new(
        WorkerId(5),
        coordinator,
        DelayRange::fixed(Duration::ZERO),
        quick(),
    );

    let result = worker.run(Shutdown::new()).await;

    assert!(matches!(result, Err(CoordinatorError::InvalidWorker { .. })));
}

#[test]
fn stats_track_longest_wait() {
    let stats = WorkerStats::default();
    stats.record_meal(Duration::from_millis(30));
    stats.record_meal(Duration::from_millis(120));
    stats.record_meal(Duration::from_millis(5));

    assert_eq!(
        stats.report(WorkerId(3)),
        WorkerReport {
            worker: WorkerId(3),
            meals: 3,
            longest_wait: Duration::from_millis(120),
        }
    );
}
