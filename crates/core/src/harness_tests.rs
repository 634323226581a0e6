use super::*;
use crate::config::DelayRange;
use crate::observer::{ChannelObserver, NoopObserver, Phase};
use tokio::time::timeout;

fn short_run(strategy: Strategy) -> TableConfig {
    TableConfig {
        strategy,
        run_for: Duration::from_millis(200),
        grace: Duration::from_millis(500),
        think: DelayRange::new(Duration::from_millis(1), Duration::from_millis(5)).unwrap(),
        eat: DelayRange::new(Duration::from_millis(1), Duration::from_millis(5)).unwrap(),
        ..TableConfig::default()
    }
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = TableConfig {
        workers: 1,
        ..TableConfig::default()
    };
    assert!(matches!(
        Harness::new(config),
        Err(HarnessError::Config(ConfigError::TooFewWorkers(1)))
    ));
}

#[test]
fn tables_are_named_after_their_strategy() {
    for strategy in Strategy::ALL {
        let table = build_table(&short_run(strategy)).unwrap();
        assert_eq!(table.name(), strategy.as_str());
        assert_eq!(table.seats(), 5);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_safe_strategy_feeds_every_worker() {
    for strategy in Strategy::ALL {
        if strategy == Strategy::LeftFirst {
            continue;
        }
        let harness = Harness::new(short_run(strategy))
            .unwrap()
            .with_observer(Arc::new(NoopObserver));

        let report = timeout(Duration::from_secs(3), harness.run(Shutdown::new()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.strategy, strategy);
        assert_eq!(report.workers.len(), 5);
        for worker in &report.workers {
            assert!(worker.meals > 0, "{strategy}: {} never ate", worker.worker);
        }
        assert_eq!(
            report.total_meals(),
            report.workers.iter().map(|w| w.meals).sum::<u64>()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn left_first_run_still_terminates() {
    let harness = Harness::new(short_run(Strategy::LeftFirst))
        .unwrap()
        .with_observer(Arc::new(NoopObserver));

    let report = timeout(Duration::from_secs(3), harness.run(Shutdown::new()))
        .await
        .expect("shutdown did not break a deadlocked table")
        .unwrap();

    assert_eq!(report.workers.len(), 5);
}

#[tokio::test]
async fn external_shutdown_ends_run_early() {
    let config = TableConfig {
        run_for: Duration::from_secs(600),
        ..short_run(Strategy::Fairness)
    };
    let harness = Harness::new(config).unwrap();
    let shutdown = Shutdown::new();

    let stopper = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown.trigger();
        })
    };
    let report = timeout(Duration::from_secs(3), harness.run(shutdown))
        .await
        .unwrap()
        .unwrap();
    stopper.await.unwrap();

    assert!(report.elapsed < Duration::from_secs(3));
}

#[tokio::test]
async fn observer_sees_every_worker() {
    let (observer, mut rx) = ChannelObserver::new();
    let harness = Harness::new(TableConfig {
        workers: 3,
        ..short_run(Strategy::Asymmetric)
    })
    .unwrap()
    .with_observer(Arc::new(observer));

    harness.run(Shutdown::new()).await.unwrap();

    let mut released = [false; 3];
    while let Ok(event) = rx.try_recv() {
        if event.phase == Phase::Released {
            released[event.worker.0] = true;
        }
    }
    assert_eq!(released, [true; 3]);
}

#[test]
fn report_summarises_workers() {
    let report = RunReport {
        strategy: Strategy::Greedy,
        workers: vec![
            WorkerReport {
                worker: WorkerId(0),
                meals: 4,
                longest_wait: Duration::from_millis(80),
            },
            WorkerReport {
                worker: WorkerId(1),
                meals: 6,
                longest_wait: Duration::from_millis(300),
            },
        ],
        elapsed: Duration::from_secs(1),
    };

    assert_eq!(report.total_meals(), 10);
    assert_eq!(report.longest_wait(), Duration::from_millis(300));
}
