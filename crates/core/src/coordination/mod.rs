// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pair acquisition around a ring of shared resources
//!
//! - **Coordinator** - one monitor over the whole ring, gated by an
//!   admission policy
//! - **ForkTable** - one lock per resource, picked up in a fixed order
//! - **PairGuard** - releases a held pair on drop

mod coordinator;
mod forks;
mod guard;
pub mod policy;
mod state;
mod table;

pub use coordinator::Coordinator;
pub use forks::{ForkOrder, ForkTable};
pub use guard::PairGuard;
pub use policy::{
    AdmissionPolicy, Admission, AdmitReason, CapacityPolicy, Denial, FairnessPolicy, GreedyPolicy,
    DEFAULT_FAIRNESS_MARGIN, DEFAULT_STARVATION_THRESHOLD,
};
pub use state::{RingState, Wait};
pub use table::PairTable;
