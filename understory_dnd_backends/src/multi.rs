// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A backend that switches between other backends at runtime.
//!
//! A [`MultiBackend`] owns an ordered [`Pipeline`] of backends. The first one
//! starts active. Every other entry may carry a [`Transition`]: an event kind
//! plus a predicate. When an incoming event matches the transition of an
//! inactive entry, the multiplexer switches to it:
//!
//! 1. tear down the active backend,
//! 2. move every connected node from the old backend to the new one,
//! 3. notify the [`PreviewList`] listeners,
//! 4. set up the new backend,
//! 5. forward the triggering event to it, unless the entry skips that.
//!
//! Forwarding is what lets a `touchstart` both switch to the touch backend and
//! start the touch gesture.
//!
//! ```
//! use understory_dnd::input::{InputEvent, InputEventKind};
//! use understory_dnd::manager::DragDropManager;
//! use understory_dnd::test_backend::TestBackend;
//! use understory_dnd::backend::NodeId;
//! use understory_dnd_backends::multi::{
//!     MOUSE_TRANSITION, MultiBackend, Pipeline, PipelineEntry, TOUCH_TRANSITION,
//! };
//! use kurbo::Point;
//!
//! let mouse = TestBackend::new();
//! let touch = TestBackend::new();
//! let touch_log = touch.probe();
//! let multi = MultiBackend::new(
//!     Pipeline::new()
//!         .with(PipelineEntry::new("mouse", mouse).transition(MOUSE_TRANSITION))
//!         .with(PipelineEntry::new("touch", touch).preview(true).transition(TOUCH_TRANSITION)),
//! )
//! .unwrap();
//! let previews = multi.preview_list();
//!
//! let mut manager = DragDropManager::with_backend(multi);
//! # struct Square;
//! # impl understory_dnd::handler::DropTarget for Square {}
//! let square = manager.add_target("piece", Square).unwrap();
//! manager.connect_drop_target(square, NodeId(7), Default::default());
//!
//! manager.handle_event(&InputEvent::touch(InputEventKind::TouchStart, Point::ZERO, &[NodeId(7)]));
//! assert_eq!(previews.backend_id(), "touch");
//! assert!(previews.preview_enabled());
//! assert_eq!(touch_log.borrow().events, [InputEventKind::TouchStart]);
//! assert_eq!(touch_log.borrow().live.len(), 1);
//! ```

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use understory_dnd::actions::DragDropActions;
use understory_dnd::backend::{
    Backend, Connection, ConnectionKind, DragPreviewOptions, DragSourceOptions, DropTargetOptions,
    EventResponse, NodeId, Profile,
};
use understory_dnd::id::HandlerId;
use understory_dnd::input::{InputEvent, InputEventKind, PointerType};

use crate::error::PipelineError;

/// A rule that activates a pipeline entry.
#[derive(Copy, Clone, Debug)]
pub struct Transition {
    /// The event kind that can trigger the switch.
    pub event: InputEventKind,
    check: fn(&InputEvent) -> bool,
}

impl Transition {
    /// A transition on `event` when `check` accepts it.
    #[must_use]
    pub const fn new(event: InputEventKind, check: fn(&InputEvent) -> bool) -> Self {
        Self { event, check }
    }

    /// Returns `true` if `event` triggers this transition.
    #[must_use]
    pub fn matches(&self, event: &InputEvent) -> bool {
        event.kind == self.event && (self.check)(event)
    }
}

fn is_mouse_event(event: &InputEvent) -> bool {
    event.kind.is_mouse() && event.touches.is_none()
}

fn has_touches(event: &InputEvent) -> bool {
    event.touches.is_some()
}

fn is_drag_event(event: &InputEvent) -> bool {
    event.kind.is_drag()
}

fn is_mouse_pointer(event: &InputEvent) -> bool {
    event.pointer_type == Some(PointerType::Mouse)
}

/// Switch on `mousedown` from a mouse.
pub const MOUSE_TRANSITION: Transition = Transition::new(InputEventKind::MouseDown, is_mouse_event);
/// Switch on `touchstart` carrying touches.
pub const TOUCH_TRANSITION: Transition = Transition::new(InputEventKind::TouchStart, has_touches);
/// Switch on a platform `dragstart`.
pub const HTML5_DRAG_TRANSITION: Transition =
    Transition::new(InputEventKind::DragStart, is_drag_event);
/// Switch on `pointerdown` from a mouse pointer.
pub const POINTER_TRANSITION: Transition =
    Transition::new(InputEventKind::PointerDown, is_mouse_pointer);

/// One backend in a [`Pipeline`].
pub struct PipelineEntry {
    id: String,
    backend: Box<dyn Backend>,
    preview: bool,
    transition: Option<Transition>,
    skip_dispatch_on_transition: bool,
}

impl fmt::Debug for PipelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineEntry")
            .field("id", &self.id)
            .field("preview", &self.preview)
            .field("transition", &self.transition)
            .field("skip_dispatch_on_transition", &self.skip_dispatch_on_transition)
            .finish_non_exhaustive()
    }
}

impl PipelineEntry {
    /// An entry named `id` wrapping `backend`.
    pub fn new(id: impl Into<String>, backend: impl Backend + 'static) -> Self {
        Self {
            id: id.into(),
            backend: Box::new(backend),
            preview: false,
            transition: None,
            skip_dispatch_on_transition: false,
        }
    }

    /// Whether the host should draw its own drag preview while this entry is active.
    #[must_use]
    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Activate this entry when `transition` matches.
    #[must_use]
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Do not forward the event that activated this entry.
    #[must_use]
    pub fn skip_dispatch_on_transition(mut self) -> Self {
        self.skip_dispatch_on_transition = true;
        self
    }

    /// The entry id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Ordered backends for a [`MultiBackend`]. The first entry starts active.
#[derive(Debug, Default)]
pub struct Pipeline {
    /// The entries, in priority order.
    pub backends: Vec<PipelineEntry>,
}

impl Pipeline {
    /// An empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    #[must_use]
    pub fn with(mut self, entry: PipelineEntry) -> Self {
        self.backends.push(entry);
        self
    }
}

/// The state reported to preview listeners after a switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackendChange<'a> {
    /// Id of the entry that became active.
    pub backend_id: &'a str,
    /// Its preview flag.
    pub preview_enabled: bool,
}

/// Identifies a listener registered with a [`PreviewList`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreviewListenerId(u64);

type PreviewListener = Rc<dyn Fn(&BackendChange<'_>)>;

struct PreviewListInner {
    backend_id: String,
    preview_enabled: bool,
    next_id: u64,
    listeners: Vec<(PreviewListenerId, PreviewListener)>,
}

/// Shared handle to the backend-change listeners of a [`MultiBackend`].
///
/// Clones share the same list. The handle also reports the active entry, so
/// hosts can keep it after handing the backend to a manager.
#[derive(Clone)]
pub struct PreviewList(Rc<RefCell<PreviewListInner>>);

impl fmt::Debug for PreviewList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("PreviewList")
            .field("backend_id", &inner.backend_id)
            .field("preview_enabled", &inner.preview_enabled)
            .field("listeners", &inner.listeners.len())
            .finish_non_exhaustive()
    }
}

impl PreviewList {
    fn new(backend_id: &str, preview_enabled: bool) -> Self {
        Self(Rc::new(RefCell::new(PreviewListInner {
            backend_id: backend_id.into(),
            preview_enabled,
            next_id: 0,
            listeners: Vec::new(),
        })))
    }

    /// Call `listener` after every backend switch.
    pub fn register(&self, listener: impl Fn(&BackendChange<'_>) + 'static) -> PreviewListenerId {
        let mut inner = self.0.borrow_mut();
        let id = PreviewListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unregister(&self, id: PreviewListenerId) -> bool {
        let mut inner = self.0.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(l, _)| *l != id);
        inner.listeners.len() != before
    }

    /// Id of the active entry.
    #[must_use]
    pub fn backend_id(&self) -> String {
        self.0.borrow().backend_id.clone()
    }

    /// Preview flag of the active entry.
    #[must_use]
    pub fn preview_enabled(&self) -> bool {
        self.0.borrow().preview_enabled
    }

    fn backend_changed(&self, backend_id: &str, preview_enabled: bool) {
        let listeners: Vec<PreviewListener> = {
            let mut inner = self.0.borrow_mut();
            inner.backend_id = backend_id.into();
            inner.preview_enabled = preview_enabled;
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        let change = BackendChange {
            backend_id,
            preview_enabled,
        };
        for listener in listeners {
            listener(&change);
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum TrackedArgs {
    Source(NodeId, DragSourceOptions),
    Preview(NodeId, DragPreviewOptions),
    Target(NodeId, DropTargetOptions),
}

impl TrackedArgs {
    fn connect(self, backend: &mut dyn Backend, handler_id: HandlerId) -> Connection {
        match self {
            Self::Source(node, options) => backend.connect_drag_source(handler_id, node, options),
            Self::Preview(node, options) => backend.connect_drag_preview(handler_id, node, options),
            Self::Target(node, options) => backend.connect_drop_target(handler_id, node, options),
        }
    }
}

/// A backend that delegates to one of several backends and switches between
/// them on [`Transition`]s.
pub struct MultiBackend {
    entries: Vec<PipelineEntry>,
    current: usize,
    active: bool,
    nodes: BTreeMap<Connection, (TrackedArgs, Connection)>,
    previews: PreviewList,
}

impl fmt::Debug for MultiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiBackend")
            .field("entries", &self.entries)
            .field("current", &self.current_backend_id())
            .field("active", &self.active)
            .field("nodes", &self.nodes.len())
            .field("previews", &self.previews)
            .finish_non_exhaustive()
    }
}

impl MultiBackend {
    /// Build a multiplexer over `pipeline`.
    ///
    /// # Errors
    ///
    /// Fails if the pipeline is empty or its ids are empty or repeated.
    pub fn new(pipeline: Pipeline) -> Result<Self, PipelineError> {
        let entries = pipeline.backends;
        let Some(first) = entries.first() else {
            return Err(PipelineError::Empty);
        };
        for (index, entry) in entries.iter().enumerate() {
            if entry.id.is_empty() {
                return Err(PipelineError::MissingId(index));
            }
            if entries[..index].iter().any(|e| e.id == entry.id) {
                return Err(PipelineError::DuplicateId(entry.id.clone()));
            }
        }
        let previews = PreviewList::new(&first.id, first.preview);
        Ok(Self {
            entries,
            current: 0,
            active: false,
            nodes: BTreeMap::new(),
            previews,
        })
    }

    /// Id of the active entry.
    #[must_use]
    pub fn current_backend_id(&self) -> &str {
        &self.entries[self.current].id
    }

    /// Preview flag of the active entry.
    #[must_use]
    pub fn preview_enabled(&self) -> bool {
        self.entries[self.current].preview
    }

    /// Ids of all entries, in pipeline order.
    pub fn backend_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.id.as_str())
    }

    /// A handle to the backend-change listeners.
    #[must_use]
    pub fn preview_list(&self) -> PreviewList {
        self.previews.clone()
    }

    /// Number of nodes connected through this backend.
    #[must_use]
    pub fn connected_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn current_backend(&mut self) -> &mut dyn Backend {
        &mut *self.entries[self.current].backend
    }

    fn connect(&mut self, key: Connection, args: TrackedArgs) -> Connection {
        let handler_id = key.handler_id;
        if let Some((_, stale)) = self.nodes.remove(&key) {
            self.current_backend().disconnect(stale);
        }
        let inner = args.connect(self.current_backend(), handler_id);
        self.nodes.insert(key, (args, inner));
        key
    }

    fn transition_target(&self, event: &InputEvent) -> Option<usize> {
        self.entries.iter().enumerate().position(|(index, entry)| {
            index != self.current && entry.transition.is_some_and(|t| t.matches(event))
        })
    }

    fn switch_to(&mut self, next: usize) {
        let old = self.current;
        log::debug!(
            "switching backend {} -> {}",
            self.entries[old].id,
            self.entries[next].id
        );
        self.entries[old].backend.teardown();
        self.current = next;
        for (key, (args, inner)) in &mut self.nodes {
            self.entries[old].backend.disconnect(*inner);
            *inner = args.connect(&mut *self.entries[next].backend, key.handler_id);
        }
        let entry = &self.entries[next];
        self.previews.backend_changed(&entry.id, entry.preview);
        self.entries[next].backend.setup();
    }
}

impl Backend for MultiBackend {
    /// # Panics
    ///
    /// Panics if the backend is already set up.
    fn setup(&mut self) {
        assert!(!self.active, "Cannot have two MultiBackends at the same time.");
        self.active = true;
        self.current_backend().setup();
    }

    fn teardown(&mut self) {
        self.active = false;
        self.current_backend().teardown();
    }

    fn connect_drag_source(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        options: DragSourceOptions,
    ) -> Connection {
        let key = Connection::new(ConnectionKind::DragSource, source_id);
        self.connect(key, TrackedArgs::Source(node, options))
    }

    fn connect_drag_preview(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        options: DragPreviewOptions,
    ) -> Connection {
        let key = Connection::new(ConnectionKind::DragPreview, source_id);
        self.connect(key, TrackedArgs::Preview(node, options))
    }

    fn connect_drop_target(
        &mut self,
        target_id: HandlerId,
        node: NodeId,
        options: DropTargetOptions,
    ) -> Connection {
        let key = Connection::new(ConnectionKind::DropTarget, target_id);
        self.connect(key, TrackedArgs::Target(node, options))
    }

    fn disconnect(&mut self, connection: Connection) {
        if let Some((_, inner)) = self.nodes.remove(&connection) {
            self.current_backend().disconnect(inner);
        }
    }

    fn handle_event(
        &mut self,
        event: &InputEvent,
        actions: &mut DragDropActions<'_>,
    ) -> EventResponse {
        if !self.active {
            log::warn!("{} reached a torn down MultiBackend", event.kind.name());
            return EventResponse::default();
        }
        if let Some(next) = self.transition_target(event) {
            self.switch_to(next);
            if self.entries[next].skip_dispatch_on_transition {
                return EventResponse::default();
            }
        }
        self.current_backend().handle_event(event, actions)
    }

    fn on_frame(&mut self, timestamp: f64, actions: &mut DragDropActions<'_>) {
        if self.active {
            self.current_backend().on_frame(timestamp, actions);
        }
    }

    fn profile(&self) -> Profile {
        self.entries[self.current].backend.profile()
    }
}
