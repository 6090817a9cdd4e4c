// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag source and drop target contracts.
//!
//! Handlers are registered with the
//! [`DragDropManager`](crate::manager::DragDropManager) and called back while a
//! drag is in progress. Every callback receives a read-only
//! [`DragDropMonitor`] and the handler's own id. Callbacks take `&self`; keep
//! any state that must change during a drag in a `Cell`/`RefCell`.

use crate::id::HandlerId;
use crate::item::{DragItem, DropResult};
use crate::monitor::DragDropMonitor;

/// Something that can be dragged.
pub trait DragSource {
    /// Returns whether a drag may start from this source right now.
    ///
    /// When several sources are candidates for one gesture, the innermost
    /// source that returns `true` wins.
    fn can_drag(&self, monitor: &DragDropMonitor<'_>, id: HandlerId) -> bool;

    /// Produce the item for a new drag, or `None` to cancel the drag.
    ///
    /// The item must be a JSON object.
    fn begin_drag(&self, monitor: &DragDropMonitor<'_>, id: HandlerId) -> Option<DragItem>;

    /// Called once when the drag that began from this source ends, whether or
    /// not it was dropped. The monitor still reports the drop result here.
    fn end_drag(&self, monitor: &DragDropMonitor<'_>, id: HandlerId);

    /// Returns whether this source is the one being dragged.
    ///
    /// The default compares `id` with the monitor's source id. Override it
    /// when a source may be re-registered under a new id mid-drag (for example
    /// a list row that is unmounted and mounted elsewhere).
    fn is_dragging(&self, monitor: &DragDropMonitor<'_>, id: HandlerId) -> bool {
        monitor.source_id() == Some(id)
    }
}

/// Something that accepts drops.
///
/// Every method has a default, so an empty `impl` yields a target that
/// accepts any matching item and produces no drop result.
pub trait DropTarget {
    /// Returns whether the current item may be dropped here.
    ///
    /// Only consulted for targets whose declared types match the item type.
    fn can_drop(&self, _monitor: &DragDropMonitor<'_>, _id: HandlerId) -> bool {
        true
    }

    /// Called for every hover update while this target is in the hover stack.
    fn hover(&self, _monitor: &DragDropMonitor<'_>, _id: HandlerId) {}

    /// Called on drop, innermost target first.
    ///
    /// Returning `None` keeps the running result: `{}` for the innermost
    /// target, and whatever the previous target produced otherwise. Outer
    /// targets may check [`DragDropMonitor::did_drop`] to see whether an inner
    /// target already handled the drop.
    fn drop(&self, _monitor: &DragDropMonitor<'_>, _id: HandlerId) -> Option<DropResult> {
        None
    }
}
