// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only queries over the drag state.
//!
//! A [`DragDropMonitor`] borrows the current state and the handler registry.
//! It is handed to every handler callback and every subscriber, and can be
//! obtained from [`DragDropManager::monitor`](crate::manager::DragDropManager::monitor).
//!
//! ## Hover stack
//!
//! [`DragDropMonitor::target_ids`] lists hovered targets outermost first. A
//! target is "over" if it appears anywhere in that list, and "shallowly over"
//! only if it is the last (innermost) entry:
//!
//! ```text
//! target_ids = [board, square]
//! is_over_target(board,  shallow = false) -> true
//! is_over_target(board,  shallow = true)  -> false
//! is_over_target(square, shallow = true)  -> true
//! ```

use core::cell::Cell;
use core::fmt;

use kurbo::{Point, Vec2};

use crate::id::{HandlerId, ItemType};
use crate::item::{DragItem, DropResult};
use crate::reducer::{DirtyHandlers, DragDropState};
use crate::registry::HandlerRegistry;

/// Flags detecting predicates that query themselves.
#[derive(Debug, Default)]
pub(crate) struct MonitorGuards {
    calling_can_drag: Cell<bool>,
    calling_can_drop: Cell<bool>,
}

/// Clears a guard flag when dropped.
struct GuardReset<'a>(&'a Cell<bool>);

impl Drop for GuardReset<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Read-only view of the drag state.
#[derive(Clone, Copy)]
pub struct DragDropMonitor<'a> {
    state: &'a DragDropState,
    registry: &'a HandlerRegistry,
    guards: &'a MonitorGuards,
}

impl fmt::Debug for DragDropMonitor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropMonitor")
            .field("state", self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> DragDropMonitor<'a> {
    pub(crate) fn new(
        state: &'a DragDropState,
        registry: &'a HandlerRegistry,
        guards: &'a MonitorGuards,
    ) -> Self {
        Self {
            state,
            registry,
            guards,
        }
    }

    /// The registry this monitor resolves ids against.
    #[must_use]
    pub fn registry(&self) -> &'a HandlerRegistry {
        self.registry
    }

    /// The raw state snapshot.
    #[must_use]
    pub fn state(&self) -> &'a DragDropState {
        self.state
    }

    /// Returns whether a drag may start from `source_id` now.
    ///
    /// # Panics
    ///
    /// Panics if `source_id` is not registered, or if called from inside the
    /// source's own [`can_drag`](crate::handler::DragSource::can_drag).
    #[must_use]
    pub fn can_drag_source(&self, source_id: HandlerId) -> bool {
        let Some(source) = self.registry.source(source_id) else {
            panic!("Expected to find a valid source. sourceId={source_id}");
        };
        if self.is_dragging() {
            return false;
        }
        assert!(
            !self.guards.calling_can_drag.get(),
            "You may not call monitor.can_drag_source() inside your can_drag() implementation."
        );
        self.guards.calling_can_drag.set(true);
        let _reset = GuardReset(&self.guards.calling_can_drag);
        source.can_drag(self, source_id)
    }

    /// Returns whether the current item may be dropped on `target_id` now.
    ///
    /// # Panics
    ///
    /// Panics if `target_id` is not registered, or if called from inside the
    /// target's own [`can_drop`](crate::handler::DropTarget::can_drop).
    #[must_use]
    pub fn can_drop_on_target(&self, target_id: HandlerId) -> bool {
        let Some(target) = self.registry.target(target_id) else {
            panic!("Expected to find a valid target. targetId={target_id}");
        };
        if !self.is_dragging() || self.did_drop() {
            return false;
        }
        let matches = self
            .registry
            .target_types(target_id)
            .is_some_and(|types| types.matches(self.item_type()));
        if !matches {
            return false;
        }
        assert!(
            !self.guards.calling_can_drop.get(),
            "You may not call monitor.can_drop_on_target() inside your can_drop() implementation."
        );
        self.guards.calling_can_drop.set(true);
        let _reset = GuardReset(&self.guards.calling_can_drop);
        target.can_drop(self, target_id)
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state.drag_operation.item_type.is_some()
    }

    /// Returns whether `source_id` is the (published) source of the drag in progress.
    ///
    /// # Panics
    ///
    /// Panics if `source_id` is neither registered nor pinned.
    #[must_use]
    pub fn is_dragging_source(&self, source_id: HandlerId) -> bool {
        let Some(source) = self.registry.source_or_pinned(source_id) else {
            panic!("Expected to find a valid source. sourceId={source_id}");
        };
        if !self.is_dragging() || !self.is_source_public() {
            return false;
        }
        if self.registry.source_type(source_id) != self.item_type() {
            return false;
        }
        source.is_dragging(self, source_id)
    }

    /// Returns whether `target_id` is in the hover stack.
    ///
    /// With `shallow`, only the innermost hovered target counts.
    #[must_use]
    pub fn is_over_target(&self, target_id: HandlerId, shallow: bool) -> bool {
        if !self.is_dragging() {
            return false;
        }
        let matches = self
            .registry
            .target_types(target_id)
            .is_some_and(|types| types.matches(self.item_type()));
        if !matches {
            return false;
        }
        let target_ids = self.target_ids();
        if shallow {
            target_ids.last() == Some(&target_id)
        } else {
            target_ids.contains(&target_id)
        }
    }

    /// Type of the dragged item.
    #[must_use]
    pub fn item_type(&self) -> Option<&'a ItemType> {
        self.state.drag_operation.item_type.as_ref()
    }

    /// The dragged item.
    #[must_use]
    pub fn item(&self) -> Option<&'a DragItem> {
        self.state.drag_operation.item.as_ref()
    }

    /// Source the drag began from.
    #[must_use]
    pub fn source_id(&self) -> Option<HandlerId> {
        self.state.drag_operation.source_id
    }

    /// Hovered targets, outermost first.
    #[must_use]
    pub fn target_ids(&self) -> &'a [HandlerId] {
        &self.state.drag_operation.target_ids
    }

    /// Result of the latest drop dispatch.
    #[must_use]
    pub fn drop_result(&self) -> Option<&'a DropResult> {
        self.state.drag_operation.drop_result.as_ref()
    }

    /// Returns `true` once any target handled a drop during this drag.
    #[must_use]
    pub fn did_drop(&self) -> bool {
        self.state.drag_operation.did_drop
    }

    /// Returns whether listeners may see the source as dragging.
    #[must_use]
    pub fn is_source_public(&self) -> bool {
        self.state.drag_operation.is_source_public
    }

    /// Pointer position when the drag began.
    #[must_use]
    pub fn initial_client_offset(&self) -> Option<Point> {
        self.state.drag_offset.initial_client_offset
    }

    /// Source origin when the drag began.
    #[must_use]
    pub fn initial_source_client_offset(&self) -> Option<Point> {
        self.state.drag_offset.initial_source_client_offset
    }

    /// Latest pointer position.
    #[must_use]
    pub fn client_offset(&self) -> Option<Point> {
        self.state.drag_offset.client_offset
    }

    /// Where the source origin would be if it followed the pointer.
    #[must_use]
    pub fn source_client_offset(&self) -> Option<Point> {
        self.state.drag_offset.source_client_offset()
    }

    /// Pointer movement since the drag began.
    #[must_use]
    pub fn difference_from_initial_offset(&self) -> Option<Vec2> {
        self.state.drag_offset.difference_from_initial()
    }

    /// State revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.state_id
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.state.ref_count
    }

    /// Handlers affected by the latest action.
    #[must_use]
    pub fn dirty_handlers(&self) -> &'a DirtyHandlers {
        &self.state.dirty_handlers
    }
}
