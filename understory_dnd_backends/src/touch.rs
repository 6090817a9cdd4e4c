// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend for touch and mouse press/move/release input.
//!
//! Unlike platform drags, touch input has no built-in drag gesture. The
//! backend synthesizes one:
//!
//! 1. On press it remembers the sources under the pointer. With a start delay
//!    configured for the input kind, the press only counts once the delay has
//!    elapsed; a move before then cancels it.
//! 2. A move further than `touch_slop` from the press begins the drag. A move
//!    whose direction falls inside one of the scroll angle ranges is treated
//!    as a scroll instead, for the rest of the gesture.
//! 3. While dragging, every move hovers the targets under the pointer.
//! 4. Release drops and ends the drag. Escape cancels it when keyboard input
//!    is enabled.
//!
//! There are no timers: the start delay is resolved against the timestamps of
//! later events and of [`Backend::on_frame`].

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;
use understory_dnd::actions::{BeginDragOptions, DragDropActions, HoverOptions};
use understory_dnd::backend::{
    Backend, Connection, ConnectionKind, DragPreviewOptions, DragSourceOptions,
    DropTargetOptions, EventResponse, NodeGeometry, NodeId, Profile,
};
use understory_dnd::id::HandlerId;
use understory_dnd::input::{InputEvent, InputEventKind, Key};
use understory_dnd::item::DropResult;
use understory_dnd::reducer::HandlerIds;

use crate::path::{ids_on_path, registered_sources, registered_targets};

bitflags::bitflags! {
    /// Input kinds a [`TouchBackend`] listens to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InputKinds: u8 {
        /// `mousedown`, `mousemove`, `mouseup`.
        const MOUSE    = 0b0000_0001;
        /// `touchstart`, `touchmove`, `touchend`.
        const TOUCH    = 0b0000_0010;
        /// Escape cancels the drag.
        const KEYBOARD = 0b0000_0100;
    }
}

impl Default for InputKinds {
    fn default() -> Self {
        Self::TOUCH
    }
}

/// A range of move directions, in degrees.
///
/// Directions are measured as `atan2(dy, dx)` shifted by 180°, so a move to
/// the right is 180°, down is 270°, left is 360° and up is 90°. A missing
/// bound is open.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AngleRange {
    /// Lower bound, inclusive.
    pub start: Option<f64>,
    /// Upper bound, inclusive.
    pub end: Option<f64>,
}

impl AngleRange {
    /// A closed range.
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Returns `true` if `angle` lies inside the range.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        self.start.is_none_or(|s| angle >= s) && self.end.is_none_or(|e| angle <= e)
    }
}

/// Direction of the move from `from` to `to`, see [`AngleRange`].
fn move_angle(from: Point, to: Point) -> f64 {
    (to - from).atan2().to_degrees() + 180.0
}

/// Options for [`TouchBackend`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchBackendOptions {
    /// Input kinds to handle.
    pub inputs: InputKinds,
    /// Do not end the drag on `contextmenu`.
    pub ignore_context_menu: bool,
    /// Keep hovering a target that contains the source node while the
    /// pointer is outside it.
    pub enable_hover_outside_target: bool,
    /// Delay before a touch press counts, in milliseconds.
    pub delay_touch_start: f64,
    /// Delay before a mouse press counts, in milliseconds.
    pub delay_mouse_start: f64,
    /// Distance the pointer must move before the drag begins.
    pub touch_slop: f64,
    /// Move directions that scroll instead of dragging.
    pub scroll_angle_ranges: Vec<AngleRange>,
}

impl Default for TouchBackendOptions {
    fn default() -> Self {
        Self {
            inputs: InputKinds::default(),
            ignore_context_menu: false,
            enable_hover_outside_target: false,
            delay_touch_start: 0.0,
            delay_mouse_start: 0.0,
            touch_slop: 0.0,
            scroll_angle_ranges: Vec::new(),
        }
    }
}

impl TouchBackendOptions {
    /// Also handle mouse input.
    #[must_use]
    pub fn with_mouse(mut self) -> Self {
        self.inputs |= InputKinds::MOUSE;
        self
    }

    /// Also cancel drags with Escape.
    #[must_use]
    pub fn with_keyboard(mut self) -> Self {
        self.inputs |= InputKinds::KEYBOARD;
        self
    }

    /// Use the same start delay for touch and mouse.
    #[must_use]
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay_touch_start = delay;
        self.delay_mouse_start = delay;
        self
    }

    fn in_scroll_angle(&self, from: Point, to: Point) -> bool {
        if self.scroll_angle_ranges.is_empty() {
            return false;
        }
        let angle = move_angle(from, to);
        self.scroll_angle_ranges.iter().any(|r| r.contains(angle))
    }
}

#[derive(Copy, Clone, Debug)]
struct PendingStart {
    due: f64,
    position: Option<Point>,
}

/// Backend for touch and mouse press/move/release input.
pub struct TouchBackend {
    options: TouchBackendOptions,
    geometry: Box<dyn NodeGeometry>,
    active: bool,
    source_nodes: HashMap<HandlerId, NodeId>,
    target_nodes: HashMap<HandlerId, NodeId>,
    move_start_source_ids: Option<HandlerIds>,
    start_path: SmallVec<[NodeId; 8]>,
    start_client_offset: Option<Point>,
    pending_start: Option<PendingStart>,
    waiting_for_delay: bool,
    is_scrolling: bool,
}

impl fmt::Debug for TouchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchBackend")
            .field("options", &self.options)
            .field("active", &self.active)
            .field("source_nodes", &self.source_nodes)
            .field("target_nodes", &self.target_nodes)
            .field("waiting_for_delay", &self.waiting_for_delay)
            .field("is_scrolling", &self.is_scrolling)
            .finish_non_exhaustive()
    }
}

impl TouchBackend {
    /// Create a backend with explicit options.
    pub fn new(geometry: impl NodeGeometry + 'static, options: TouchBackendOptions) -> Self {
        Self {
            options,
            geometry: Box::new(geometry),
            active: false,
            source_nodes: HashMap::new(),
            target_nodes: HashMap::new(),
            move_start_source_ids: None,
            start_path: SmallVec::new(),
            start_client_offset: None,
            pending_start: None,
            waiting_for_delay: false,
            is_scrolling: false,
        }
    }

    /// The options this backend was built with.
    #[must_use]
    pub fn options(&self) -> &TouchBackendOptions {
        &self.options
    }

    /// Returns `true` while a delayed press has not started yet.
    #[must_use]
    pub fn is_waiting_for_delay(&self) -> bool {
        self.waiting_for_delay
    }

    /// Returns `true` once the current gesture was classified as a scroll.
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    fn accepts(&self, event: &InputEvent) -> bool {
        let kind = event.kind;
        (kind.is_touch() && self.options.inputs.contains(InputKinds::TOUCH))
            || (kind.is_mouse() && self.options.inputs.contains(InputKinds::MOUSE))
            || (kind == InputEventKind::KeyDown
                && self.options.inputs.contains(InputKinds::KEYBOARD))
            || (kind == InputEventKind::ContextMenu && !self.options.ignore_context_menu)
    }

    fn source_client_offset(&self, source_id: HandlerId) -> Option<Point> {
        let node = self.source_nodes.get(&source_id)?;
        self.geometry.client_rect(*node).map(|r| r.origin())
    }

    fn resolve_pending_start(&mut self, now: f64) {
        if let Some(pending) = self.pending_start
            && now >= pending.due
        {
            self.pending_start = None;
            self.start_move(pending.position);
        }
    }

    fn start_move(&mut self, position: Option<Point>) {
        if position.is_some() {
            self.start_client_offset = position;
        }
        self.waiting_for_delay = false;
    }

    fn press(&mut self, event: &InputEvent, actions: &mut DragDropActions<'_>) -> EventResponse {
        if !event.is_primary_button() {
            return EventResponse::default();
        }
        self.move_start_source_ids = Some(registered_sources(
            &actions.monitor(),
            ids_on_path(&self.source_nodes, &event.path),
        ));
        self.start_path = event.path.clone();

        let delay = if event.kind.is_touch() {
            self.options.delay_touch_start
        } else {
            self.options.delay_mouse_start
        };
        if delay > 0.0 {
            self.pending_start = Some(PendingStart {
                due: event.timestamp + delay,
                position: event.position,
            });
            self.waiting_for_delay = true;
        } else {
            self.start_move(event.position);
        }
        EventResponse::default()
    }

    fn drag_move(&mut self, event: &InputEvent, actions: &mut DragDropActions<'_>) -> EventResponse {
        self.pending_start = None;
        if self.waiting_for_delay {
            return EventResponse::default();
        }
        let Some(client_offset) = event.position else {
            return EventResponse::default();
        };

        let dragging = actions.monitor().is_dragging();
        if self.is_scrolling
            || (!dragging
                && self
                    .start_client_offset
                    .is_some_and(|start| self.options.in_scroll_angle(start, client_offset)))
        {
            self.is_scrolling = true;
            return EventResponse::default();
        }

        if !dragging
            && let Some(start) = self.start_client_offset
            && self.move_start_source_ids.is_some()
            && start.distance(client_offset) > self.options.touch_slop
            && let Some(source_ids) = self.move_start_source_ids.take()
        {
            let resolve: &dyn Fn(HandlerId) -> Option<Point> = &|id| self.source_client_offset(id);
            actions.begin_drag(
                &source_ids,
                BeginDragOptions {
                    publish_source: false,
                    client_offset: Some(start),
                    source_client_offset: Some(resolve),
                },
            );
        }

        if !actions.monitor().is_dragging() {
            return EventResponse::default();
        }
        actions.publish_drag_source();

        let monitor = actions.monitor();
        let mut target_ids =
            registered_targets(&monitor, ids_on_path(&self.target_nodes, &event.path));
        if self.options.enable_hover_outside_target
            && let Some(outside) = self.enclosing_target(&target_ids)
            && monitor.registry().contains_target(outside)
        {
            target_ids.push(outside);
        }
        if !monitor.did_drop() {
            actions.hover(
                &target_ids,
                HoverOptions {
                    client_offset: Some(client_offset),
                },
            );
        }
        EventResponse::prevent_default()
    }

    /// The innermost target around the pressed node that the pointer is not over.
    fn enclosing_target(&self, hovered: &[HandlerId]) -> Option<HandlerId> {
        self.start_path.iter().rev().find_map(|node| {
            self.target_nodes
                .iter()
                .filter(|(id, n)| *n == node && !hovered.contains(*id))
                .map(|(id, _)| *id)
                .min()
        })
    }

    fn release(&mut self, event: &InputEvent, actions: &mut DragDropActions<'_>) -> EventResponse {
        self.is_scrolling = false;
        self.pending_start = None;
        self.waiting_for_delay = false;
        if event.kind != InputEventKind::ContextMenu && !event.is_primary_button() {
            return EventResponse::default();
        }
        let monitor = actions.monitor();
        if !monitor.is_dragging() || monitor.did_drop() {
            self.move_start_source_ids = None;
            return EventResponse::default();
        }
        self.start_client_offset = None;
        log::debug!("{} drops the drag", event.kind.name());
        actions.drop(DropResult::new());
        actions.end_drag();
        EventResponse::prevent_default()
    }

    fn cancel_on_escape(
        &mut self,
        event: &InputEvent,
        actions: &mut DragDropActions<'_>,
    ) -> EventResponse {
        if event.key != Some(Key::Escape) || !actions.monitor().is_dragging() {
            return EventResponse::default();
        }
        log::debug!("escape cancels the drag");
        self.start_client_offset = None;
        self.move_start_source_ids = None;
        actions.end_drag();
        EventResponse::default()
    }
}

impl Backend for TouchBackend {
    /// # Panics
    ///
    /// Panics if the backend is already set up.
    fn setup(&mut self) {
        assert!(!self.active, "Cannot have two Touch backends at the same time.");
        self.active = true;
    }

    fn teardown(&mut self) {
        self.active = false;
        self.move_start_source_ids = None;
        self.start_path.clear();
        self.start_client_offset = None;
        self.pending_start = None;
        self.waiting_for_delay = false;
        self.is_scrolling = false;
    }

    fn connect_drag_source(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        _options: DragSourceOptions,
    ) -> Connection {
        self.source_nodes.insert(source_id, node);
        Connection::new(ConnectionKind::DragSource, source_id)
    }

    /// Touch drags have no platform drag image; previews are drawn by the host.
    fn connect_drag_preview(
        &mut self,
        source_id: HandlerId,
        _node: NodeId,
        _options: DragPreviewOptions,
    ) -> Connection {
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
        match connection.kind {
            ConnectionKind::DragSource => {
                self.source_nodes.remove(&connection.handler_id);
            }
            ConnectionKind::DragPreview => {}
            ConnectionKind::DropTarget => {
                self.target_nodes.remove(&connection.handler_id);
            }
        }
    }

    fn handle_event(
        &mut self,
        event: &InputEvent,
        actions: &mut DragDropActions<'_>,
    ) -> EventResponse {
        if !self.active {
            log::warn!("{} reached a torn down touch backend", event.kind.name());
            return EventResponse::default();
        }
        if !self.accepts(event) {
            return EventResponse::default();
        }
        self.resolve_pending_start(event.timestamp);
        match event.kind {
            InputEventKind::TouchStart | InputEventKind::MouseDown => self.press(event, actions),
            InputEventKind::TouchMove | InputEventKind::MouseMove => {
                self.drag_move(event, actions)
            }
            InputEventKind::TouchEnd | InputEventKind::MouseUp | InputEventKind::ContextMenu => {
                self.release(event, actions)
            }
            InputEventKind::KeyDown => self.cancel_on_escape(event, actions),
            _ => EventResponse::default(),
        }
    }

    fn on_frame(&mut self, timestamp: f64, _actions: &mut DragDropActions<'_>) {
        if self.active {
            self.resolve_pending_start(timestamp);
        }
    }

    fn profile(&self) -> Profile {
        Profile::from([
            ("source_nodes", self.source_nodes.len()),
            ("target_nodes", self.target_nodes.len()),
            (
                "move_start_source_ids",
                self.move_start_source_ids.as_ref().map_or(0, |ids| ids.len()),
            ),
        ])
    }
}
