// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend for platform drag-and-drop events (`dragstart` … `dragend`).
//!
//! The platform owns the gesture: it decides when a drag starts, draws the
//! drag image and reports where the pointer is. This backend maps that event
//! protocol onto the engine:
//!
//! | Event | Effect |
//! |---|---|
//! | `dragstart` | end a dangling drag, begin from the sources on the path (unpublished), pick the drag image |
//! | `dragenter` | track entered nodes, detect native items, hover immediately |
//! | `dragover` | queue a hover for the next frame, report the drop effect |
//! | `dragleave` | when the drag leaves the tree, cancel the queued hover and end native drags |
//! | `drop` | hover the drop path, drop with `dropEffect`, end |
//! | `dragend` | end the drag if the source never saw a drop |
//! | `mousemove` | end a drag whose source node was removed mid-drag |
//!
//! Work the platform expects "soon" (publishing the source after the drag
//! image was captured, ending a native drag after the last leave) runs before
//! the next event or frame; hover updates from `dragover` are coalesced to one
//! per [`Backend::on_frame`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Point;
use understory_dnd::actions::{BeginDragOptions, DragDropActions, HoverOptions};
use understory_dnd::backend::{
    Backend, Connection, ConnectionKind, DragImage, DragPreviewOptions, DragSourceOptions,
    DropTargetOptions, EventResponse, NodeGeometry, NodeId, Profile,
};
use understory_dnd::id::HandlerId;
use understory_dnd::input::{DropEffect, InputEvent, InputEventKind};
use understory_dnd::item::DropResult;
use understory_dnd::monitor::DragDropMonitor;
use understory_dnd::reducer::HandlerIds;

use crate::enter_leave::EnterLeaveCounter;
use crate::native::{NativeDragSource, NativeType, match_native_item_type};
use crate::path::{ids_on_path, registered_sources, registered_targets};
use crate::preview::drag_preview_offset;

/// How long after `dragstart` the detached-source check starts, in milliseconds.
const DETACHED_SOURCE_GRACE_MS: f64 = 1000.0;

/// Options for [`Html5Backend`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Html5BackendOptions {
    /// Only handle events whose path passes through this node.
    pub root: Option<NodeId>,
}

impl Html5BackendOptions {
    /// Restrict the backend to the subtree under `root`.
    #[must_use]
    pub fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }
}

#[derive(Clone, Debug)]
struct PendingHover {
    target_ids: HandlerIds,
    client_offset: Option<Point>,
}

/// Backend for platform drag-and-drop events.
pub struct Html5Backend {
    options: Html5BackendOptions,
    geometry: Box<dyn NodeGeometry>,
    active: bool,
    source_nodes: HashMap<HandlerId, NodeId>,
    source_options: HashMap<HandlerId, DragSourceOptions>,
    preview_nodes: HashMap<HandlerId, NodeId>,
    preview_options: HashMap<HandlerId, DragPreviewOptions>,
    target_nodes: HashMap<HandlerId, NodeId>,
    enter_leave: EnterLeaveCounter,
    native: Option<(HandlerId, Rc<NativeDragSource>)>,
    drag_source_node: Option<(NodeId, f64)>,
    alt_key_pressed: bool,
    pending_hover: Option<PendingHover>,
    publish_pending: bool,
    end_native_pending: bool,
}

impl fmt::Debug for Html5Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Html5Backend")
            .field("options", &self.options)
            .field("active", &self.active)
            .field("source_nodes", &self.source_nodes)
            .field("preview_nodes", &self.preview_nodes)
            .field("target_nodes", &self.target_nodes)
            .field("native", &self.native.as_ref().map(|(id, _)| *id))
            .field("pending_hover", &self.pending_hover)
            .finish_non_exhaustive()
    }
}

impl Html5Backend {
    /// Create a backend that queries node rects from `geometry`.
    pub fn new(geometry: impl NodeGeometry + 'static) -> Self {
        Self::with_options(geometry, Html5BackendOptions::default())
    }

    /// Create a backend with explicit options.
    pub fn with_options(geometry: impl NodeGeometry + 'static, options: Html5BackendOptions) -> Self {
        Self {
            options,
            geometry: Box::new(geometry),
            active: false,
            source_nodes: HashMap::new(),
            source_options: HashMap::new(),
            preview_nodes: HashMap::new(),
            preview_options: HashMap::new(),
            target_nodes: HashMap::new(),
            enter_leave: EnterLeaveCounter::default(),
            native: None,
            drag_source_node: None,
            alt_key_pressed: false,
            pending_hover: None,
            publish_pending: false,
            end_native_pending: false,
        }
    }

    /// Returns `true` if `node` is bound as a drag source.
    #[must_use]
    pub fn is_source_node(&self, node: NodeId) -> bool {
        self.source_nodes.values().any(|n| *n == node)
    }

    /// Returns `true` while a hover is queued for the next frame.
    #[must_use]
    pub fn has_pending_hover(&self) -> bool {
        self.pending_hover.is_some()
    }

    fn in_root(&self, event: &InputEvent) -> bool {
        self.options.root.is_none_or(|root| event.path.contains(&root))
    }

    fn is_dragging_native_item(monitor: &DragDropMonitor<'_>) -> bool {
        monitor
            .item_type()
            .is_some_and(|t| NativeType::from_item_type(t).is_some())
    }

    fn current_drop_effect(&self, monitor: &DragDropMonitor<'_>) -> DropEffect {
        if Self::is_dragging_native_item(monitor) {
            return DropEffect::Copy;
        }
        let configured = monitor
            .source_id()
            .and_then(|id| self.source_options.get(&id))
            .and_then(|o| o.drop_effect);
        configured.unwrap_or(if self.alt_key_pressed {
            DropEffect::Copy
        } else {
            DropEffect::Move
        })
    }

    fn current_preview_options(&self, monitor: &DragDropMonitor<'_>) -> DragPreviewOptions {
        monitor
            .source_id()
            .and_then(|id| self.preview_options.get(&id))
            .copied()
            .unwrap_or_default()
    }

    fn source_client_offset(&self, source_id: HandlerId) -> Option<Point> {
        let node = self.source_nodes.get(&source_id)?;
        self.geometry.client_rect(*node).map(|r| r.origin())
    }

    fn clear_drag_source_node(&mut self) -> bool {
        self.drag_source_node.take().is_some()
    }

    /// Run work deferred by the previous event.
    fn run_deferred(&mut self, actions: &mut DragDropActions<'_>) {
        if core::mem::take(&mut self.publish_pending) {
            actions.publish_drag_source();
        }
        if core::mem::take(&mut self.end_native_pending) {
            self.end_drag_native_item(actions);
        }
    }

    fn begin_drag_native_item(
        &mut self,
        ty: NativeType,
        event: &InputEvent,
        actions: &mut DragDropActions<'_>,
    ) {
        self.clear_drag_source_node();
        let source = Rc::new(NativeDragSource::new(ty, event.data_transfer.as_ref()));
        match actions.add_source_rc(ty.item_type(), source.clone()) {
            Ok(id) => {
                log::debug!("native {} drag entered as {id}", ty.name());
                self.native = Some((id, source));
                actions.begin_drag(&[id], BeginDragOptions::default());
            }
            Err(err) => log::warn!("cannot register native source: {err}"),
        }
    }

    fn end_drag_native_item(&mut self, actions: &mut DragDropActions<'_>) {
        if !Self::is_dragging_native_item(&actions.monitor()) {
            return;
        }
        actions.end_drag();
        if let Some((id, _)) = self.native.take() {
            actions.remove_source(id);
        }
    }

    fn drag_start(&mut self, event: &InputEvent, actions: &mut DragDropActions<'_>) -> EventResponse {
        self.clear_drag_source_node();
        let client_offset = event.position;

        if actions.monitor().is_dragging() {
            log::debug!("dragstart while a drag is in progress; ending it");
            self.pending_hover = None;
            if Self::is_dragging_native_item(&actions.monitor()) {
                self.end_drag_native_item(actions);
            } else {
                actions.end_drag();
            }
        }

        let source_ids = registered_sources(
            &actions.monitor(),
            ids_on_path(&self.source_nodes, &event.path),
        );
        let resolve: &dyn Fn(HandlerId) -> Option<Point> = &|id| self.source_client_offset(id);
        actions.begin_drag(
            &source_ids,
            BeginDragOptions {
                publish_source: false,
                client_offset,
                source_client_offset: Some(resolve),
            },
        );

        let monitor = actions.monitor();
        if monitor.is_dragging() {
            let mut response = EventResponse::default();
            let options = self.current_preview_options(&monitor);
            if event.data_transfer.is_some()
                && let Some(source_id) = monitor.source_id()
                && let Some(&source_node) = self.source_nodes.get(&source_id)
            {
                let preview_node = self
                    .preview_nodes
                    .get(&source_id)
                    .copied()
                    .unwrap_or(source_node);
                if let (Some(at), Some(source), Some(preview)) = (
                    client_offset,
                    self.geometry.client_rect(source_node),
                    self.geometry.client_rect(preview_node),
                ) {
                    response.drag_image = Some(DragImage {
                        node: preview_node,
                        offset: drag_preview_offset(source, preview, at, &options),
                    });
                }
            }
            if let Some(target) = event.target() {
                self.drag_source_node = Some((target, event.timestamp));
            }
            if options.capture_dragging_state {
                actions.publish_drag_source();
            } else {
                self.publish_pending = true;
            }
            response
        } else if let Some(ty) = match_native_item_type(event.data_transfer.as_ref()) {
            self.begin_drag_native_item(ty, event, actions);
            EventResponse::default()
        } else {
            // `DataTransfer::types` is never absent, so there is no untyped drag to let through.
            log::trace!("dragstart with no draggable source; cancelling");
            EventResponse::prevent_default()
        }
    }

    fn drag_enter(&mut self, event: &InputEvent, actions: &mut DragDropActions<'_>) -> EventResponse {
        if Self::is_dragging_native_item(&actions.monitor())
            && let (Some((_, source)), Some(dt)) = (&self.native, &event.data_transfer)
        {
            source.load_data_transfer(dt);
        }
        let first_enter = self.enter_leave.enter(&event.path, &*self.geometry);
        if first_enter
            && !actions.monitor().is_dragging()
            && let Some(ty) = match_native_item_type(event.data_transfer.as_ref())
        {
            self.begin_drag_native_item(ty, event, actions);
        }

        if !actions.monitor().is_dragging() {
            return EventResponse::default();
        }
        self.alt_key_pressed = event.alt_key;
        let target_ids = registered_targets(
            &actions.monitor(),
            ids_on_path(&self.target_nodes, &event.path),
        );
        if !target_ids.is_empty() {
            actions.hover(
                &target_ids,
                HoverOptions {
                    client_offset: event.position,
                },
            );
        }
        let monitor = actions.monitor();
        if target_ids.iter().any(|id| monitor.can_drop_on_target(*id)) {
            EventResponse {
                prevent_default: true,
                drop_effect: Some(self.current_drop_effect(&monitor)),
                drag_image: None,
            }
        } else {
            EventResponse::default()
        }
    }

    fn drag_over(&mut self, event: &InputEvent, actions: &mut DragDropActions<'_>) -> EventResponse {
        let monitor = actions.monitor();
        if !monitor.is_dragging() {
            return EventResponse {
                prevent_default: true,
                drop_effect: Some(DropEffect::None),
                drag_image: None,
            };
        }
        self.alt_key_pressed = event.alt_key;
        let target_ids = registered_targets(&monitor, ids_on_path(&self.target_nodes, &event.path));
        let can_drop = target_ids.iter().any(|id| monitor.can_drop_on_target(*id));
        log::trace!("dragover queues hover over {target_ids:?}");
        self.pending_hover = Some(PendingHover {
            target_ids,
            client_offset: event.position,
        });

        if can_drop {
            EventResponse {
                prevent_default: true,
                drop_effect: Some(self.current_drop_effect(&monitor)),
                drag_image: None,
            }
        } else if Self::is_dragging_native_item(&monitor) {
            EventResponse::prevent_default()
        } else {
            EventResponse {
                prevent_default: true,
                drop_effect: Some(DropEffect::None),
                drag_image: None,
            }
        }
    }

    fn drag_leave(&mut self, event: &InputEvent, actions: &mut DragDropActions<'_>) -> EventResponse {
        let native = Self::is_dragging_native_item(&actions.monitor());
        let Some(left) = event.target() else {
            return EventResponse::default();
        };
        if self.enter_leave.leave(left, &*self.geometry) {
            if native {
                self.end_native_pending = true;
            }
            self.pending_hover = None;
        }
        EventResponse {
            prevent_default: native,
            ..EventResponse::default()
        }
    }

    fn drop(&mut self, event: &InputEvent, actions: &mut DragDropActions<'_>) -> EventResponse {
        let mut response = EventResponse::default();
        let native = Self::is_dragging_native_item(&actions.monitor());
        if native {
            response.prevent_default = true;
            if let (Some((_, source)), Some(dt)) = (&self.native, &event.data_transfer) {
                source.load_data_transfer(dt);
            }
        } else if match_native_item_type(event.data_transfer.as_ref()).is_some() {
            response.prevent_default = true;
        }
        self.enter_leave.reset();
        self.pending_hover = None;

        if !actions.monitor().is_dragging() || actions.monitor().did_drop() {
            log::warn!("drop without a drag in progress");
            return response;
        }
        let target_ids = registered_targets(
            &actions.monitor(),
            ids_on_path(&self.target_nodes, &event.path),
        );
        actions.hover(
            &target_ids,
            HoverOptions {
                client_offset: event.position,
            },
        );
        let effect = self.current_drop_effect(&actions.monitor());
        let mut options = DropResult::new();
        options.insert("dropEffect".into(), effect.as_str().into());
        actions.drop(options);

        if native {
            self.end_drag_native_item(actions);
        } else if actions.monitor().is_dragging() {
            actions.end_drag();
        }
        response
    }

    fn drag_end(&mut self, actions: &mut DragDropActions<'_>) -> EventResponse {
        if self.clear_drag_source_node() && actions.monitor().is_dragging() {
            actions.end_drag();
        }
        self.pending_hover = None;
        EventResponse::default()
    }

    fn end_drag_if_source_detached(
        &mut self,
        event: &InputEvent,
        actions: &mut DragDropActions<'_>,
    ) -> EventResponse {
        let Some((node, since)) = self.drag_source_node else {
            return EventResponse::default();
        };
        if event.timestamp - since < DETACHED_SOURCE_GRACE_MS || self.geometry.is_attached(node) {
            return EventResponse::default();
        }
        log::debug!("drag source node {node:?} left the tree; ending drag");
        if self.clear_drag_source_node() && actions.monitor().is_dragging() {
            actions.end_drag();
        }
        self.pending_hover = None;
        EventResponse::default()
    }
}

impl Backend for Html5Backend {
    /// # Panics
    ///
    /// Panics if the backend is already set up.
    fn setup(&mut self) {
        assert!(!self.active, "Cannot have two HTML5 backends at the same time.");
        self.active = true;
    }

    fn teardown(&mut self) {
        self.active = false;
        self.clear_drag_source_node();
        self.enter_leave.reset();
        self.pending_hover = None;
        self.publish_pending = false;
        self.end_native_pending = false;
    }

    fn connect_drag_source(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        options: DragSourceOptions,
    ) -> Connection {
        self.source_nodes.insert(source_id, node);
        self.source_options.insert(source_id, options);
        Connection::new(ConnectionKind::DragSource, source_id)
    }

    fn connect_drag_preview(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        options: DragPreviewOptions,
    ) -> Connection {
        self.preview_nodes.insert(source_id, node);
        self.preview_options.insert(source_id, options);
        Connection::new(ConnectionKind::DragPreview, source_id)
    }

    fn connect_drop_target(
        &mut self,
        target_id: HandlerId,
        node: NodeId,
        _options: DropTargetOptions,
    ) -> Connection {
        self.target_nodes.insert(target_id, node);
        Connection::new(ConnectionKind::DropTarget, target_id)
    }

    fn disconnect(&mut self, connection: Connection) {
        let id = connection.handler_id;
        match connection.kind {
            ConnectionKind::DragSource => {
                self.source_nodes.remove(&id);
                self.source_options.remove(&id);
            }
            ConnectionKind::DragPreview => {
                self.preview_nodes.remove(&id);
                self.preview_options.remove(&id);
            }
            ConnectionKind::DropTarget => {
                self.target_nodes.remove(&id);
            }
        }
    }

    fn handle_event(
        &mut self,
        event: &InputEvent,
        actions: &mut DragDropActions<'_>,
    ) -> EventResponse {
        if !self.active {
            log::warn!("{} reached a torn down HTML5 backend", event.kind.name());
            return EventResponse::default();
        }
        self.run_deferred(actions);
        if !self.in_root(event) {
            log::trace!("{} outside the root; ignored", event.kind.name());
            return EventResponse::default();
        }
        match event.kind {
            InputEventKind::DragStart => self.drag_start(event, actions),
            InputEventKind::DragEnter => self.drag_enter(event, actions),
            InputEventKind::DragOver => self.drag_over(event, actions),
            InputEventKind::DragLeave => self.drag_leave(event, actions),
            InputEventKind::Drop => self.drop(event, actions),
            InputEventKind::DragEnd => self.drag_end(actions),
            InputEventKind::MouseMove => self.end_drag_if_source_detached(event, actions),
            _ => EventResponse::default(),
        }
    }

    fn on_frame(&mut self, _timestamp: f64, actions: &mut DragDropActions<'_>) {
        if !self.active {
            return;
        }
        self.run_deferred(actions);
        let Some(pending) = self.pending_hover.take() else {
            return;
        };
        let monitor = actions.monitor();
        if !monitor.is_dragging() || monitor.did_drop() {
            return;
        }
        let target_ids = registered_targets(&monitor, pending.target_ids);
        actions.hover(
            &target_ids,
            HoverOptions {
                client_offset: pending.client_offset,
            },
        );
    }

    fn profile(&self) -> Profile {
        Profile::from([
            ("source_nodes", self.source_nodes.len()),
            ("source_node_options", self.source_options.len()),
            ("source_preview_nodes", self.preview_nodes.len()),
            ("source_preview_node_options", self.preview_options.len()),
            ("target_nodes", self.target_nodes.len()),
            ("pending_hover", usize::from(self.pending_hover.is_some())),
            ("native_source", usize::from(self.native.is_some())),
        ])
    }
}
