// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized pair coordinator
//!
//! A monitor over [`RingState`]: one mutex is the only exclusion domain and a
//! [`Notify`] plays the condition variable. Waiters arm their notification
//! before checking the admission policy and release the mutex before
//! suspending, so a broadcast between the check and the suspension is never
//! lost. Every state change (admission and release) broadcasts to all
//! waiters, and each waiter re-checks its own predicate on wakeup.

use super::guard::PairGuard;
use super::policy::{Admission, AdmissionPolicy, FairnessPolicy};
use super::state::RingState;
use super::table::{check_worker, PairTable};
use crate::clock::{Clock, SystemClock};
use crate::error::CoordinatorError;
use crate::id::WorkerId;
use crate::shutdown::Shutdown;
use async_trait::async_trait;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

/// Hands out resource pairs to the workers of a ring
pub struct Coordinator<P = FairnessPolicy, C = SystemClock> {
    state: Mutex<RingState>,
    changed: Notify,
    policy: P,
    clock: C,
}

impl Coordinator {
    /// A coordinator with the default fairness policy and the system clock
    pub fn with_seats(seats: usize) -> Result<Self, CoordinatorError> {
        Self::new(seats, FairnessPolicy::default(), SystemClock)
    }
}

impl<P: AdmissionPolicy, C: Clock> Coordinator<P, C> {
    pub fn new(seats: usize, policy: P, clock: C) -> Result<Self, CoordinatorError> {
        if seats < 2 {
            return Err(CoordinatorError::TooFewSeats(seats));
        }
        Ok(Self {
            state: Mutex::new(RingState::new(seats)),
            changed: Notify::new(),
            policy,
            clock,
        })
    }

    pub fn seats(&self) -> usize {
        self.lock_state().seats()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Copy of the current state, taken under the lock
    pub fn snapshot(&self) -> RingState {
        self.lock_state().clone()
    }

    /// Evaluate the admission policy for `worker` right now without
    /// changing anything
    pub fn check(&self, worker: WorkerId) -> Result<Admission, CoordinatorError> {
        let state = self.lock_state();
        check_worker(worker, state.seats())?;
        Ok(self.policy.admit(&state, worker, self.clock.now()))
    }

    /// Wait until `worker` holds both of its resources
    pub async fn acquire_pair(&self, worker: WorkerId) -> Result<(), CoordinatorError> {
        self.acquire_pair_with_cancel(worker, std::future::pending::<()>())
            .await
    }

    /// Wait until `worker` holds both of its resources or `cancel` completes
    ///
    /// Returns `CoordinatorError::Cancelled` holding nothing if `cancel`
    /// resolves first. Dropping the returned future has the same effect.
    pub async fn acquire_pair_with_cancel<F>(
        &self,
        worker: WorkerId,
        cancel: F,
    ) -> Result<(), CoordinatorError>
    where
        F: Future<Output = ()>,
    {
        check_worker(worker, self.seats())?;
        tokio::pin!(cancel);
        let mut registration = WaitRegistration {
            state: &self.state,
            worker,
            armed: true,
        };

        loop {
            tokio::select! {
                biased;
                () = &mut cancel => return Err(CoordinatorError::Cancelled),
                () = std::future::ready(()) => {}
            }

            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let retry_after = {
                let mut state = self.lock_state();
                if state.holds_pair(worker) {
                    return Err(CoordinatorError::AlreadyHolding(worker));
                }
                let now = self.clock.now();
                match self.policy.admit(&state, worker, now) {
                    Admission::Admit(reason) => {
                        state.claim(worker, now)?;
                        let waited = state
                            .end_wait(worker)
                            .map(|since| now.saturating_duration_since(since))
                            .unwrap_or_default();
                        registration.armed = false;
                        debug_assert!(state.verify().is_ok(), "{:?}", state.verify());
                        drop(state);

                        self.changed.notify_waiters();
                        tracing::debug!(
                            worker = worker.0,
                            policy = self.policy.name(),
                            ?reason,
                            waited_ms = waited.as_millis() as u64,
                            "pair granted"
                        );
                        return Ok(());
                    }
                    Admission::Deny(denial) => {
                        state.begin_wait(worker, now);
                        tracing::trace!(worker = worker.0, ?denial, "pair denied");
                        denial.retry_after()
                    }
                }
            };

            tokio::select! {
                biased;
                () = &mut cancel => return Err(CoordinatorError::Cancelled),
                () = notified => {}
                () = sleep_or_pending(retry_after) => {}
            }
        }
    }

    /// Make both of `worker`'s resources available again and wake every
    /// waiter
    ///
    /// Releasing a pair the worker does not hold leaves all state untouched.
    pub fn release_pair(&self, worker: WorkerId) -> Result<(), CoordinatorError> {
        let freed = {
            let mut state = self.lock_state();
            check_worker(worker, state.seats())?;
            let freed = state.release(worker);
            debug_assert!(state.verify().is_ok(), "{:?}", state.verify());
            freed
        };

        if freed {
            self.changed.notify_waiters();
            tracing::debug!(worker = worker.0, "pair released");
        } else {
            tracing::warn!(worker = worker.0, "release without a held pair ignored");
        }
        Ok(())
    }

    /// Acquire `worker`'s pair as a guard that releases on drop
    pub async fn acquire_guard(
        &self,
        worker: WorkerId,
    ) -> Result<PairGuard<'_, Self>, CoordinatorError> {
        self.acquire_pair(worker).await?;
        Ok(PairGuard::acquired(self, worker))
    }

    fn lock_state(&self) -> MutexGuard<'_, RingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl<P: AdmissionPolicy, C: Clock> PairTable for Coordinator<P, C> {
    fn seats(&self) -> usize {
        self.lock_state().seats()
    }

    fn name(&self) -> &'static str {
        self.policy.name()
    }

    async fn acquire(&self, worker: WorkerId, shutdown: &Shutdown) -> Result<(), CoordinatorError> {
        self.acquire_pair_with_cancel(worker, shutdown.cancelled())
            .await
    }

    fn release(&self, worker: WorkerId) -> Result<(), CoordinatorError> {
        self.release_pair(worker)
    }
}

/// Clears a worker's waiting mark if its acquisition ends without a grant
struct WaitRegistration<'a> {
    state: &'a Mutex<RingState>,
    worker: WorkerId,
    armed: bool,
}

impl Drop for WaitRegistration<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.end_wait(self.worker);
        }
    }
}

async fn sleep_or_pending(after: Option<Duration>) {
    match after {
        Some(after) => tokio::time::sleep(after).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
