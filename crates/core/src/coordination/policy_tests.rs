use super::*;
use crate::clock::{Clock, FakeClock};
use yare::parameterized;

/// Record that `worker` ate at the clock's current time
fn serve(state: &mut RingState, worker: WorkerId, clock: &FakeClock) {
    state.claim(worker, clock.now()).unwrap();
    state.release(worker);
}

fn served_ring(seats: usize, clock: &FakeClock) -> RingState {
    let mut state = RingState::new(seats);
    for w in WorkerId::all(seats) {
        serve(&mut state, w, clock);
    }
    state
}

#[test]
fn fairness_rejects_margin_not_below_threshold() {
    let err = FairnessPolicy::new(Duration::from_secs(2), Duration::from_secs(2)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidThresholds { .. }));
    assert!(FairnessPolicy::new(Duration::from_secs(5), Duration::from_secs(2)).is_ok());
}

#[test]
fn fairness_defaults_match_reference_constants() {
    let policy = FairnessPolicy::default();
    assert_eq!(policy.starvation_threshold(), Duration::from_millis(5_000));
    assert_eq!(policy.fairness_margin(), Duration::from_millis(2_000));
}

#[test]
fn busy_resource_is_denied_by_every_policy() {
    let clock = FakeClock::new();
    let mut state = RingState::new(5);
    state.claim(WorkerId(0), clock.now()).unwrap();

    let policies: Vec<Box<dyn AdmissionPolicy>> = vec![
        Box::new(FairnessPolicy::default()),
        Box::new(GreedyPolicy),
        Box::new(CapacityPolicy::for_seats(5)),
    ];
    for policy in policies {
        assert_eq!(
            policy.admit(&state, WorkerId(4), clock.now()),
            Admission::Deny(Denial::Busy {
                resource: ResourceId(0),
                holder: Some(WorkerId(0)),
            }),
            "{}",
            policy.name()
        );
    }
}

#[test]
fn never_served_worker_is_admitted_as_starving() {
    let clock = FakeClock::new();
    let state = RingState::new(5);
    let policy = FairnessPolicy::default();

    assert_eq!(
        policy.admit(&state, WorkerId(2), clock.now()),
        Admission::Admit(AdmitReason::Starving)
    );
}

#[test]
fn served_worker_defers_to_never_served_neighbour() {
    let clock = FakeClock::new();
    let mut state = RingState::new(5);
    serve(&mut state, WorkerId(0), &clock);
    clock.advance_ms(100);

    let admission = FairnessPolicy::default().admit(&state, WorkerId(0), clock.now());

    assert_eq!(
        admission,
        Admission::Deny(Denial::Deferred {
            to: WorkerId(1),
            retry_after: Duration::from_millis(4_901),
        })
    );
}

#[test]
fn equal_waits_do_not_defer() {
    let clock = FakeClock::new();
    let state = served_ring(5, &clock);
    clock.advance_ms(1_000);

    for w in WorkerId::all(5) {
        assert_eq!(
            FairnessPolicy::default().admit(&state, w, clock.now()),
            Admission::Admit(AdmitReason::Fair)
        );
    }
}

#[parameterized(
    within_margin = { 2_000, true },
    just_past_margin = { 2_001, false },
    well_past_margin = { 3_500, false },
)]
fn relative_margin_decides(head_start_ms: u64, admitted: bool) {
    let clock = FakeClock::new();
    let mut state = RingState::new(5);
    // worker 3 last ate `head_start_ms` before everyone else did
    serve(&mut state, WorkerId(3), &clock);
    clock.advance_ms(head_start_ms);
    for w in [0, 1, 2, 4] {
        serve(&mut state, WorkerId(w), &clock);
    }
    clock.advance_ms(100);

    let admission = FairnessPolicy::default().admit(&state, WorkerId(0), clock.now());

    assert_eq!(admission.is_admit(), admitted, "{admission:?}");
}

#[test]
fn deferral_names_most_starved_with_lowest_id_on_ties() {
    let clock = FakeClock::new();
    let mut state = RingState::new(6);
    serve(&mut state, WorkerId(4), &clock);
    serve(&mut state, WorkerId(2), &clock);
    clock.advance_ms(1_000);
    serve(&mut state, WorkerId(5), &clock);
    clock.advance_ms(3_000);
    serve(&mut state, WorkerId(0), &clock);
    serve(&mut state, WorkerId(1), &clock);
    serve(&mut state, WorkerId(3), &clock);

    let admission = FairnessPolicy::default().admit(&state, WorkerId(0), clock.now());

    assert!(matches!(
        admission,
        Admission::Deny(Denial::Deferred { to: WorkerId(2), .. })
    ));
}

#[test]
fn starvation_ceiling_overrides_relative_fairness() {
    let clock = FakeClock::new();
    let mut state = RingState::new(5);
    serve(&mut state, WorkerId(2), &clock);
    clock.advance_ms(3_000);
    serve(&mut state, WorkerId(0), &clock);
    for w in [1, 3, 4] {
        serve(&mut state, WorkerId(w), &clock);
    }
    let policy = FairnessPolicy::default();

    // workers 1, 3 and 4 keep eating; worker 0 keeps deferring to worker 2
    for _ in 0..5 {
        clock.advance_ms(1_000);
        for w in [1, 3, 4] {
            serve(&mut state, WorkerId(w), &clock);
        }
        assert!(!policy.admit(&state, WorkerId(0), clock.now()).is_admit());
    }

    clock.advance_ms(1);
    assert_eq!(
        policy.admit(&state, WorkerId(0), clock.now()),
        Admission::Admit(AdmitReason::Starving)
    );
}

#[test]
fn retry_after_reaches_the_ceiling() {
    let clock = FakeClock::new();
    let mut state = RingState::new(3);
    serve(&mut state, WorkerId(0), &clock);
    clock.advance_ms(1_500);
    let policy = FairnessPolicy::default();

    let denial = match policy.admit(&state, WorkerId(0), clock.now()) {
        Admission::Deny(denial) => denial,
        other => panic!("expected deferral, got {other:?}"),
    };
    let retry_after = denial.retry_after().unwrap();
    assert_eq!(retry_after, Duration::from_millis(3_501));

    clock.advance(retry_after);
    assert!(policy.admit(&state, WorkerId(0), clock.now()).is_admit());
}

#[test]
fn greedy_ignores_history() {
    let clock = FakeClock::new();
    let mut state = RingState::new(5);
    serve(&mut state, WorkerId(0), &clock);

    assert_eq!(
        GreedyPolicy.admit(&state, WorkerId(0), clock.now()),
        Admission::Admit(AdmitReason::Available)
    );
}

#[test]
fn capacity_caps_concurrent_diners() {
    let clock = FakeClock::new();
    let mut state = RingState::new(6);
    let policy = CapacityPolicy::new(2);
    state.claim(WorkerId(0), clock.now()).unwrap();
    state.claim(WorkerId(2), clock.now()).unwrap();

    assert_eq!(
        policy.admit(&state, WorkerId(4), clock.now()),
        Admission::Deny(Denial::AtCapacity { eating: 2 })
    );

    state.release(WorkerId(2));
    assert!(policy.admit(&state, WorkerId(4), clock.now()).is_admit());
}

#[test]
fn capacity_never_drops_to_zero() {
    assert_eq!(CapacityPolicy::new(0).max_diners(), 1);
    assert_eq!(CapacityPolicy::for_seats(5).max_diners(), 4);
}
