// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for pair acquisition

use crate::id::WorkerId;
use thiserror::Error;

/// Errors returned by a pair table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("{worker} is not seated at a table of {seats}")]
    InvalidWorker { worker: WorkerId, seats: usize },
    #[error("a ring needs at least 2 seats, got {0}")]
    TooFewSeats(usize),
    #[error("{0} already holds its pair")]
    AlreadyHolding(WorkerId),
    #[error("acquisition cancelled")]
    Cancelled,
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl CoordinatorError {
    /// True for the cooperative-shutdown case
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoordinatorError::Cancelled)
    }
}
