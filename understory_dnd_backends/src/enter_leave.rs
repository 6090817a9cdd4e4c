// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Enter/leave bookkeeping for platform drags.
//!
//! Platforms fire `dragenter`/`dragleave` for every node the pointer crosses,
//! and the leave of the node being exited may arrive after the enter of the
//! node being entered. The counter keeps the set of entered nodes and reports
//! only the first enter into and the last leave out of the whole tree.

use smallvec::SmallVec;
use understory_dnd::backend::{NodeGeometry, NodeId};

/// Tracks which nodes a platform drag is currently inside.
#[derive(Clone, Debug, Default)]
pub(crate) struct EnterLeaveCounter {
    entered: SmallVec<[NodeId; 8]>,
}

impl EnterLeaveCounter {
    /// Record an enter into the innermost node of `path` (root→target).
    ///
    /// Returns `true` if the drag just entered the tree.
    pub(crate) fn enter(&mut self, path: &[NodeId], geometry: &dyn NodeGeometry) -> bool {
        let Some(&entering) = path.last() else {
            return false;
        };
        let was_empty = self.entered.is_empty();
        self.entered
            .retain(|n| geometry.is_attached(*n) && path.contains(n));
        if !self.entered.contains(&entering) {
            self.entered.push(entering);
        }
        was_empty
    }

    /// Record a leave of `node`.
    ///
    /// Returns `true` if the drag just left the tree.
    pub(crate) fn leave(&mut self, node: NodeId, geometry: &dyn NodeGeometry) -> bool {
        let was_empty = self.entered.is_empty();
        self.entered
            .retain(|n| geometry.is_attached(*n) && *n != node);
        !was_empty && self.entered.is_empty()
    }

    pub(crate) fn reset(&mut self) {
        self.entered.clear();
    }
}
