// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission policies
//!
//! A policy is a pure function of the ring state and the current time. The
//! coordinator evaluates it under its state lock every time a waiter wakes.
//!
//! - [`FairnessPolicy`] - availability, a starvation ceiling and a relative
//!   fairness margin (the default)
//! - [`GreedyPolicy`] - availability only
//! - [`CapacityPolicy`] - availability plus a cap on concurrent diners

use super::state::{RingState, Wait};
use crate::config::ConfigError;
use crate::id::{ResourceId, WorkerId};
use std::cmp::Reverse;
use std::time::{Duration, Instant};

/// Default starvation ceiling
pub const DEFAULT_STARVATION_THRESHOLD: Duration = Duration::from_millis(5_000);
/// Default fairness margin
pub const DEFAULT_FAIRNESS_MARGIN: Duration = Duration::from_millis(2_000);

/// Why a worker was let through
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmitReason {
    /// Both resources free and the policy has no further conditions
    Available,
    /// Waited past the starvation ceiling
    Starving,
    /// No other worker is starved enough to take precedence
    Fair,
}

/// Why a worker has to keep waiting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    /// One of the worker's resources is held
    Busy {
        resource: ResourceId,
        holder: Option<WorkerId>,
    },
    /// Another worker has waited longer by more than the fairness margin
    Deferred {
        to: WorkerId,
        /// Time until this worker crosses the starvation ceiling
        retry_after: Duration,
    },
    /// Too many workers are already eating
    AtCapacity { eating: usize },
}

impl Denial {
    /// Deadline after which the decision may change without any release
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Denial::Deferred { retry_after, .. } => Some(*retry_after),
            Denial::Busy { .. } | Denial::AtCapacity { .. } => None,
        }
    }
}

/// Outcome of one admission check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Admit(AdmitReason),
    Deny(Denial),
}

impl Admission {
    pub fn is_admit(&self) -> bool {
        matches!(self, Admission::Admit(_))
    }
}

/// Decides whether a waiting worker may take its pair now
pub trait AdmissionPolicy: Send + Sync + 'static {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn admit(&self, state: &RingState, worker: WorkerId, now: Instant) -> Admission;
}

/// Rule 1 shared by every policy: both resources must be free
fn busy(state: &RingState, worker: WorkerId) -> Option<Denial> {
    let (left, right) = worker.pair(state.seats());
    [left, right]
        .into_iter()
        .find(|r| !state.is_available(*r))
        .map(|resource| Denial::Busy {
            resource,
            holder: state.holder(resource),
        })
}

/// Time-based fairness with a hard starvation ceiling
///
/// Once both resources are free a worker is admitted unconditionally if it
/// has gone longer than `starvation_threshold` without eating. Otherwise it
/// defers to any worker whose wait is longer than its own by more than
/// `fairness_margin`. Workers never served count as infinitely starved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FairnessPolicy {
    starvation_threshold: Duration,
    fairness_margin: Duration,
}

impl FairnessPolicy {
    pub fn new(
        starvation_threshold: Duration,
        fairness_margin: Duration,
    ) -> Result<Self, ConfigError> {
        if fairness_margin >= starvation_threshold {
            return Err(ConfigError::InvalidThresholds {
                starvation_threshold,
                fairness_margin,
            });
        }
        Ok(Self {
            starvation_threshold,
            fairness_margin,
        })
    }

    pub fn starvation_threshold(&self) -> Duration {
        self.starvation_threshold
    }

    pub fn fairness_margin(&self) -> Duration {
        self.fairness_margin
    }

    /// The most starved worker other than `worker` whose wait beats `mine`
    /// by more than the margin; lowest id wins ties
    fn more_starved(
        &self,
        state: &RingState,
        worker: WorkerId,
        mine: Wait,
        now: Instant,
    ) -> Option<WorkerId> {
        WorkerId::all(state.seats())
            .filter(|other| *other != worker)
            .map(|other| (other, state.wait_of(other, now)))
            .filter(|(_, theirs)| theirs.exceeds(mine, self.fairness_margin))
            .max_by_key(|(other, theirs)| (*theirs, Reverse(*other)))
            .map(|(other, _)| other)
    }
}

impl Default for FairnessPolicy {
    fn default() -> Self {
        Self {
            starvation_threshold: DEFAULT_STARVATION_THRESHOLD,
            fairness_margin: DEFAULT_FAIRNESS_MARGIN,
        }
    }
}

impl AdmissionPolicy for FairnessPolicy {
    fn name(&self) -> &'static str {
        "fairness"
    }

    fn admit(&self, state: &RingState, worker: WorkerId, now: Instant) -> Admission {
        if let Some(denial) = busy(state, worker) {
            return Admission::Deny(denial);
        }

        let mine = state.wait_of(worker, now);
        let waited = match mine {
            Wait::Never => return Admission::Admit(AdmitReason::Starving),
            Wait::Served(waited) if waited > self.starvation_threshold => {
                return Admission::Admit(AdmitReason::Starving);
            }
            Wait::Served(waited) => waited,
        };

        match self.more_starved(state, worker, mine, now) {
            Some(to) => Admission::Deny(Denial::Deferred {
                to,
                // the ceiling is exclusive, so retry just past it
                retry_after: self.starvation_threshold.saturating_sub(waited)
                    + Duration::from_millis(1),
            }),
            None => Admission::Admit(AdmitReason::Fair),
        }
    }
}

/// Admit whenever both resources are free
///
/// Never deadlocks since pairs are taken atomically, but a worker can starve
/// if its neighbours keep alternating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GreedyPolicy;

impl AdmissionPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn admit(&self, state: &RingState, worker: WorkerId, _now: Instant) -> Admission {
        match busy(state, worker) {
            Some(denial) => Admission::Deny(denial),
            None => Admission::Admit(AdmitReason::Available),
        }
    }
}

/// Availability plus a limit on how many workers eat at once
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityPolicy {
    max_diners: usize,
}

impl CapacityPolicy {
    /// At least one diner is always allowed
    pub fn new(max_diners: usize) -> Self {
        Self {
            max_diners: max_diners.max(1),
        }
    }

    /// `seats - 1` diners, the classic counting gate
    pub fn for_seats(seats: usize) -> Self {
        Self::new(seats.saturating_sub(1))
    }

    pub fn max_diners(&self) -> usize {
        self.max_diners
    }
}

impl AdmissionPolicy for CapacityPolicy {
    fn name(&self) -> &'static str {
        "capacity"
    }

    fn admit(&self, state: &RingState, worker: WorkerId, _now: Instant) -> Admission {
        if let Some(denial) = busy(state, worker) {
            return Admission::Deny(denial);
        }
        let eating = state.eating().len();
        if eating >= self.max_diners {
            return Admission::Deny(Denial::AtCapacity { eating });
        }
        Admission::Admit(AdmitReason::Available)
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
