// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Seat and resource identities on the ring
//!
//! Workers and resources are plain indices. Worker `i` needs resource `i` on
//! its left and resource `(i + 1) % n` on its right; that mapping is the only
//! place the ring topology is encoded.

use serde::{Deserialize, Serialize};

/// Index of a worker around the ring
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub usize);

/// Index of a resource around the ring
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub usize);

impl WorkerId {
    /// Left resource for this worker
    pub fn left(self) -> ResourceId {
        ResourceId(self.0)
    }

    /// Right resource for this worker on a ring of `seats`
    pub fn right(self, seats: usize) -> ResourceId {
        ResourceId((self.0 + 1) % seats)
    }

    /// `(left, right)` on a ring of `seats`
    pub fn pair(self, seats: usize) -> (ResourceId, ResourceId) {
        (self.left(), self.right(seats))
    }

    /// Iterate every worker of a ring with `seats` positions
    pub fn all(seats: usize) -> impl Iterator<Item = WorkerId> {
        (0..seats).map(WorkerId)
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resource-{}", self.0)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
