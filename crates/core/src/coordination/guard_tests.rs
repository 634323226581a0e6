use super::*;
use crate::coordination::Coordinator;
use crate::id::ResourceId;
use std::sync::Arc;

#[tokio::test]
async fn dropping_guard_releases_pair() {
    let coordinator = Coordinator::with_seats(5).unwrap();

    {
        let guard = coordinator.acquire_guard(WorkerId(1)).await.unwrap();
        assert_eq!(guard.worker(), WorkerId(1));
        assert!(coordinator.snapshot().holds_pair(WorkerId(1)));
    }

    let state = coordinator.snapshot();
    assert!(state.is_available(ResourceId(1)));
    assert!(state.is_available(ResourceId(2)));
}

#[tokio::test]
async fn guard_acquires_through_any_table() {
    let coordinator = Coordinator::with_seats(3).unwrap();
    let table: &dyn PairTable = &coordinator;
    let shutdown = Shutdown::new();

    let guard = PairGuard::acquire(table, WorkerId(2), &shutdown).await.unwrap();
    assert!(coordinator.snapshot().holds_pair(WorkerId(2)));
    assert!(format!("{guard:?}").contains("fairness"));

    drop(guard);
    assert!(coordinator.snapshot().eating().is_empty());
}

#[tokio::test]
async fn cancelled_guard_acquire_holds_nothing() {
    let coordinator = Coordinator::with_seats(3).unwrap();
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let err = PairGuard::acquire(&coordinator, WorkerId(0), &shutdown)
        .await
        .unwrap_err();

    assert_eq!(err, CoordinatorError::Cancelled);
    assert!(coordinator.snapshot().eating().is_empty());
}

#[tokio::test]
async fn panicking_holder_still_releases() {
    let coordinator = Arc::new(Coordinator::with_seats(4).unwrap());

    let task = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            let _guard = coordinator.acquire_guard(WorkerId(3)).await.unwrap();
            panic!("worker failed mid-meal");
        })
    };

    assert!(task.await.unwrap_err().is_panic());
    let state = coordinator.snapshot();
    assert!(state.eating().is_empty());
    assert!(state.verify().is_ok());
}
