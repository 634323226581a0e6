// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dine-core: ring resource coordination for the dining-workers problem
//!
//! This crate provides:
//! - A centralized coordinator that grants both adjacent resources at once,
//!   gated by a pluggable admission policy (fairness by default)
//! - Per-resource lock tables with fixed pick-up orders, as baselines
//! - The worker loop, a run harness and TOML configuration

pub mod clock;
pub mod config;
pub mod coordination;
pub mod error;
pub mod harness;
pub mod id;
pub mod observer;
pub mod shutdown;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, DelayRange, Strategy, TableConfig};
pub use coordination::{
    Admission, AdmissionPolicy, AdmitReason, CapacityPolicy, Coordinator, Denial, FairnessPolicy,
    ForkOrder, ForkTable, GreedyPolicy, PairGuard, PairTable, RingState, Wait,
};
pub use error::CoordinatorError;
pub use harness::{build_table, Harness, HarnessError, RunReport};
pub use id::{ResourceId, WorkerId};
pub use observer::{ChannelObserver, NoopObserver, Phase, PhaseEvent, PhaseObserver, TracingObserver};
pub use shutdown::Shutdown;
pub use worker::{Worker, WorkerReport, WorkerStats};
