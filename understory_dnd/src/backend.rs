// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between the manager and input backends.
//!
//! A [`Backend`] turns native [`InputEvent`]s into drag actions. The manager
//! owns exactly one backend and keeps it inert (torn down) while no handler is
//! registered:
//!
//! - [`Backend::setup`] runs when the first handler is registered;
//! - [`Backend::teardown`] runs when the last handler is removed.
//!
//! Handlers are bound to host nodes with the `connect_*` methods. Each returns
//! a [`Connection`] token; pass it back to [`Backend::disconnect`] to unbind.
//! Connecting the same kind of node for the same handler again replaces the
//! previous binding.

use alloc::collections::BTreeMap;

use kurbo::{Point, Rect};

use crate::actions::DragDropActions;
use crate::id::HandlerId;
use crate::input::{DropEffect, InputEvent};

/// Identifier of a host node (a DOM element, a widget, a scene node).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

/// What a node was connected as.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectionKind {
    /// The node a drag starts from.
    DragSource,
    /// The node shown while dragging.
    DragPreview,
    /// A node that accepts drops.
    DropTarget,
}

/// Token for one node binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use = "dropping a Connection leaves the node bound; pass it to Backend::disconnect"]
pub struct Connection {
    /// What the node was connected as.
    pub kind: ConnectionKind,
    /// The handler the node belongs to.
    pub handler_id: HandlerId,
}

impl Connection {
    /// Build a token.
    pub const fn new(kind: ConnectionKind, handler_id: HandlerId) -> Self {
        Self { kind, handler_id }
    }
}

/// Options for a drag source node.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragSourceOptions {
    /// Drop effect to show; by default `Move`, or `Copy` while Alt is held.
    pub drop_effect: Option<DropEffect>,
}

/// Options for a drag preview node.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragPreviewOptions {
    /// Horizontal anchor of the preview under the pointer, `0.0..=1.0`.
    pub anchor_x: f64,
    /// Vertical anchor of the preview under the pointer, `0.0..=1.0`.
    pub anchor_y: f64,
    /// Fixed horizontal offset, overriding the anchor.
    pub offset_x: Option<f64>,
    /// Fixed vertical offset, overriding the anchor.
    pub offset_y: Option<f64>,
    /// Publish the source immediately instead of after the next frame, so the
    /// platform snapshots the node in its dragging state.
    pub capture_dragging_state: bool,
}

impl Default for DragPreviewOptions {
    fn default() -> Self {
        Self {
            anchor_x: 0.5,
            anchor_y: 0.5,
            offset_x: None,
            offset_y: None,
            capture_dragging_state: false,
        }
    }
}

/// Options for a drop target node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropTargetOptions {}

/// Image the platform should show while dragging.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragImage {
    /// Node to snapshot.
    pub node: NodeId,
    /// Position of the pointer within the image.
    pub offset: Point,
}

/// What the host should do with the native event after a backend saw it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventResponse {
    /// Suppress the platform's default handling.
    pub prevent_default: bool,
    /// Drop effect to report to the platform.
    pub drop_effect: Option<DropEffect>,
    /// Drag image to install.
    pub drag_image: Option<DragImage>,
}

impl EventResponse {
    /// A response that only prevents the default action.
    #[must_use]
    pub fn prevent_default() -> Self {
        Self {
            prevent_default: true,
            ..Self::default()
        }
    }

    /// Merge another response into this one.
    pub fn merge(&mut self, other: Self) {
        self.prevent_default |= other.prevent_default;
        self.drop_effect = other.drop_effect.or(self.drop_effect);
        self.drag_image = other.drag_image.or(self.drag_image);
    }
}

/// Diagnostic counters reported by [`Backend::profile`].
pub type Profile = BTreeMap<&'static str, usize>;

/// Layout queries backends need from the host.
pub trait NodeGeometry {
    /// Bounding box of `node` in client coordinates.
    fn client_rect(&self, node: NodeId) -> Option<Rect>;

    /// Returns whether `node` is still part of the host tree.
    fn is_attached(&self, _node: NodeId) -> bool {
        true
    }
}

/// Geometry for hosts that cannot answer layout queries.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoGeometry;

impl NodeGeometry for NoGeometry {
    fn client_rect(&self, _node: NodeId) -> Option<Rect> {
        None
    }
}

/// An input adapter.
pub trait Backend {
    /// Start listening for input.
    fn setup(&mut self);

    /// Stop listening for input.
    fn teardown(&mut self);

    /// Bind `node` as the drag handle of `source_id`.
    fn connect_drag_source(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        options: DragSourceOptions,
    ) -> Connection;

    /// Bind `node` as the drag preview of `source_id`.
    fn connect_drag_preview(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        options: DragPreviewOptions,
    ) -> Connection;

    /// Bind `node` as the drop area of `target_id`.
    fn connect_drop_target(
        &mut self,
        target_id: HandlerId,
        node: NodeId,
        options: DropTargetOptions,
    ) -> Connection;

    /// Unbind a node.
    fn disconnect(&mut self, connection: Connection);

    /// React to a native event.
    fn handle_event(
        &mut self,
        event: &InputEvent,
        actions: &mut DragDropActions<'_>,
    ) -> EventResponse;

    /// Run work deferred to the next frame.
    fn on_frame(&mut self, _timestamp: f64, _actions: &mut DragDropActions<'_>) {}

    /// Diagnostic counters.
    fn profile(&self) -> Profile {
        Profile::new()
    }
}
