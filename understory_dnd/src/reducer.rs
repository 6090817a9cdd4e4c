// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag state machine: actions and the pure reducer that applies them.
//!
//! Drag phases are implicit in [`DragOperation`]:
//!
//! - idle: `item_type` is `None`;
//! - dragging: `item_type` is set and `did_drop` is `false`;
//! - dropped: `item_type` is set and `did_drop` is `true`.
//!
//! [`reduce`] never fails and never calls back into handlers; validation lives
//! in the [action creators](crate::actions).

use alloc::vec::Vec;

use kurbo::Point;
use smallvec::SmallVec;

use crate::id::{HandlerId, ItemType};
use crate::item::{DragItem, DropResult};
use crate::offset::DragOffset;

/// Ordered list of handler ids, outermost first.
pub type HandlerIds = SmallVec<[HandlerId; 4]>;

/// A state transition request.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Reset the drag offsets to a starting point (or clear them).
    InitCoords {
        /// Pointer position.
        client_offset: Option<Point>,
        /// Source origin.
        source_client_offset: Option<Point>,
    },
    /// Start a drag.
    BeginDrag {
        /// Type of the dragged item.
        item_type: ItemType,
        /// The dragged item.
        item: DragItem,
        /// Source the drag began from.
        source_id: HandlerId,
        /// Pointer position.
        client_offset: Option<Point>,
        /// Source origin.
        source_client_offset: Option<Point>,
        /// Whether listeners may already see the source as dragging.
        is_source_public: bool,
    },
    /// Reveal the drag source to listeners.
    PublishDragSource,
    /// Replace the hover stack.
    Hover {
        /// Hovered targets, outermost first.
        target_ids: HandlerIds,
        /// Pointer position.
        client_offset: Option<Point>,
    },
    /// Record a drop result.
    Drop {
        /// Cumulative drop result.
        drop_result: DropResult,
    },
    /// Return to idle.
    EndDrag,
    /// A source was registered.
    AddSource(HandlerId),
    /// A target was registered.
    AddTarget(HandlerId),
    /// A source was unregistered.
    RemoveSource(HandlerId),
    /// A target was unregistered.
    RemoveTarget(HandlerId),
}

/// The drag in progress, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragOperation {
    /// Type of the dragged item; `Some` exactly while dragging.
    pub item_type: Option<ItemType>,
    /// The dragged item.
    pub item: Option<DragItem>,
    /// Source the drag began from.
    pub source_id: Option<HandlerId>,
    /// Hovered targets, outermost first.
    pub target_ids: HandlerIds,
    /// Result of the latest drop dispatch.
    pub drop_result: Option<DropResult>,
    /// Whether a drop happened during this drag.
    pub did_drop: bool,
    /// Whether listeners may see the source as dragging.
    pub is_source_public: bool,
}

/// Handlers whose observable state changed with the latest action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DirtyHandlers {
    /// Nothing any handler observes changed.
    #[default]
    None,
    /// Anything may have changed.
    All,
    /// Only these handlers changed.
    Some(HandlerIds),
}

impl DirtyHandlers {
    /// Returns whether a subscriber interested in `handler_ids` must be told.
    ///
    /// `None` for `handler_ids` means "interested in everything".
    #[must_use]
    pub fn intersects(&self, handler_ids: Option<&[HandlerId]>) -> bool {
        match (self, handler_ids) {
            (Self::None, _) => false,
            (Self::All, _) | (_, None) => true,
            (Self::Some(dirty), Some(ids)) => ids.iter().any(|id| dirty.contains(id)),
        }
    }
}

/// The whole state tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragDropState {
    /// Pointer and source coordinates.
    pub drag_offset: DragOffset,
    /// The drag in progress.
    pub drag_operation: DragOperation,
    /// Number of registered handlers.
    pub ref_count: usize,
    /// Handlers affected by the latest action.
    pub dirty_handlers: DirtyHandlers,
    /// Revision, bumped by every action.
    pub state_id: u64,
}

/// Apply `action` to `state`, producing the next state.
#[must_use]
pub fn reduce(state: &DragDropState, action: &Action) -> DragDropState {
    DragDropState {
        drag_offset: reduce_drag_offset(&state.drag_offset, action),
        dirty_handlers: reduce_dirty_handlers(&state.drag_operation.target_ids, action),
        drag_operation: reduce_drag_operation(&state.drag_operation, action),
        ref_count: reduce_ref_count(state.ref_count, action),
        state_id: reduce_state_id(state.state_id),
    }
}

/// Revision part of [`reduce`]: every action moves it.
#[must_use]
pub fn reduce_state_id(state_id: u64) -> u64 {
    state_id.wrapping_add(1)
}

/// Offset part of [`reduce`].
#[must_use]
pub fn reduce_drag_offset(state: &DragOffset, action: &Action) -> DragOffset {
    match action {
        Action::InitCoords {
            client_offset,
            source_client_offset,
        }
        | Action::BeginDrag {
            client_offset,
            source_client_offset,
            ..
        } => DragOffset::begin(*client_offset, *source_client_offset),
        Action::Hover { client_offset, .. } => DragOffset {
            client_offset: *client_offset,
            ..*state
        },
        Action::EndDrag | Action::Drop { .. } => DragOffset::default(),
        _ => *state,
    }
}

/// Operation part of [`reduce`].
#[must_use]
pub fn reduce_drag_operation(state: &DragOperation, action: &Action) -> DragOperation {
    match action {
        Action::BeginDrag {
            item_type,
            item,
            source_id,
            is_source_public,
            ..
        } => DragOperation {
            item_type: Some(item_type.clone()),
            item: Some(item.clone()),
            source_id: Some(*source_id),
            is_source_public: *is_source_public,
            drop_result: None,
            did_drop: false,
            target_ids: state.target_ids.clone(),
        },
        Action::PublishDragSource => DragOperation {
            is_source_public: true,
            ..state.clone()
        },
        Action::Hover { target_ids, .. } => DragOperation {
            target_ids: target_ids.clone(),
            ..state.clone()
        },
        Action::RemoveTarget(id) => {
            let mut next = state.clone();
            next.target_ids.retain(|t| *t != *id);
            next
        }
        Action::Drop { drop_result } => DragOperation {
            drop_result: Some(drop_result.clone()),
            did_drop: true,
            target_ids: HandlerIds::new(),
            ..state.clone()
        },
        Action::EndDrag => DragOperation::default(),
        _ => state.clone(),
    }
}

/// Reference-count part of [`reduce`].
#[must_use]
pub fn reduce_ref_count(count: usize, action: &Action) -> usize {
    match action {
        Action::AddSource(_) | Action::AddTarget(_) => count + 1,
        Action::RemoveSource(_) | Action::RemoveTarget(_) => count.saturating_sub(1),
        _ => count,
    }
}

/// Dirty-set part of [`reduce`], given the hover stack before the action.
#[must_use]
pub fn reduce_dirty_handlers(prev_target_ids: &[HandlerId], action: &Action) -> DirtyHandlers {
    match action {
        Action::Hover { target_ids, .. } => hover_dirty_handlers(prev_target_ids, target_ids),
        Action::AddSource(_)
        | Action::AddTarget(_)
        | Action::RemoveSource(_)
        | Action::RemoveTarget(_) => DirtyHandlers::None,
        _ => DirtyHandlers::All,
    }
}

fn hover_dirty_handlers(prev: &[HandlerId], next: &[HandlerId]) -> DirtyHandlers {
    // Symmetric difference, entries of `next` first.
    let mut dirty: HandlerIds = next.iter().filter(|id| !prev.contains(id)).copied().collect();
    dirty.extend(prev.iter().filter(|id| !next.contains(id)).copied());

    if dirty.is_empty() && prev == next {
        return DirtyHandlers::None;
    }

    // Shallow hover changes when the innermost entry changes, even if membership did not.
    let prev_innermost = prev.last().copied();
    let next_innermost = next.last().copied();
    if prev_innermost != next_innermost {
        dirty.extend(prev_innermost);
        dirty.extend(next_innermost);
    }
    DirtyHandlers::Some(dirty)
}

/// Collect the ids of a dirty set for diagnostics.
#[must_use]
pub fn dirty_ids(dirty: &DirtyHandlers) -> Vec<HandlerId> {
    match dirty {
        DirtyHandlers::Some(ids) => ids.to_vec(),
        _ => Vec::new(),
    }
}
