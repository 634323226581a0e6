// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget reporting of worker phase changes
//!
//! Observers must not block and cannot fail; the worker loop calls them
//! inline between coordination steps.

use crate::id::WorkerId;
use tokio::sync::mpsc;

/// A step in a worker's cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Thinking,
    Waiting,
    Acquired,
    Eating,
    Released,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Thinking => "started thinking",
            Phase::Waiting => "waiting for resources",
            Phase::Acquired => "acquired resources",
            Phase::Eating => "started eating",
            Phase::Released => "released resources",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives phase changes keyed by worker
pub trait PhaseObserver: Send + Sync {
    fn observe(&self, worker: WorkerId, phase: Phase);
}

/// Emits each phase change as a structured `tracing` event
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl PhaseObserver for TracingObserver {
    fn observe(&self, worker: WorkerId, phase: Phase) {
        tracing::info!(worker = worker.0, "{}", phase);
    }
}

/// Discards every phase change
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl PhaseObserver for NoopObserver {
    fn observe(&self, _worker: WorkerId, _phase: Phase) {}
}

/// A phase change delivered through a [`ChannelObserver`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEvent {
    pub worker: WorkerId,
    pub phase: Phase,
}

/// Forwards phase changes to an unbounded channel
///
/// Sends to a dropped receiver are ignored.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<PhaseEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PhaseEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PhaseObserver for ChannelObserver {
    fn observe(&self, worker: WorkerId, phase: Phase) {
        let _ = self.tx.send(PhaseEvent { worker, phase });
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
