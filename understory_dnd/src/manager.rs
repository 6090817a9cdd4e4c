// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag-and-drop manager: one per application.
//!
//! [`DragDropManager`] owns the [`Store`], the [`HandlerRegistry`] and a boxed
//! [`Backend`]. Each public method is one "turn": it first deletes sources
//! whose removal was queued during an earlier turn, then does its work, then
//! brings the backend in line with the reference count (set up when the first
//! handler appears, torn down when the last one goes).
//!
//! ## Minimal example
//!
//! ```
//! use serde_json::json;
//! use understory_dnd::handler::{DragSource, DropTarget};
//! use understory_dnd::item::DragItem;
//! use understory_dnd::manager::DragDropManager;
//! use understory_dnd::monitor::DragDropMonitor;
//! use understory_dnd::id::HandlerId;
//!
//! struct Piece;
//! impl DragSource for Piece {
//!     fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool { true }
//!     fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
//!         Some(DragItem::new(json!({ "piece": "knight" })))
//!     }
//!     fn end_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) {}
//! }
//!
//! struct Square;
//! impl DropTarget for Square {}
//!
//! let mut manager = DragDropManager::new();
//! let piece = manager.add_source("knight", Piece).unwrap();
//! let square = manager.add_target("knight", Square).unwrap();
//!
//! let mut actions = manager.actions();
//! actions.begin_drag(&[piece], Default::default());
//! actions.hover(&[square], Default::default());
//! actions.drop(Default::default());
//! actions.end_drag();
//!
//! assert!(!manager.monitor().is_dragging());
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use crate::actions::DragDropActions;
use crate::backend::{
    Backend, Connection, DragPreviewOptions, DragSourceOptions, DropTargetOptions, EventResponse,
    NodeId, Profile,
};
use crate::error::RegistrationError;
use crate::handler::{DragSource, DropTarget};
use crate::id::{HandlerId, ItemType, TargetTypes};
use crate::input::InputEvent;
use crate::monitor::DragDropMonitor;
use crate::reducer::DragDropState;
use crate::registry::HandlerRegistry;
use crate::store::{ListenerId, Store};

/// Coordinates handlers, drag state and the input backend.
#[derive(Default)]
pub struct DragDropManager {
    store: Store,
    registry: HandlerRegistry,
    backend: Option<Box<dyn Backend>>,
    backend_active: bool,
}

impl fmt::Debug for DragDropManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropManager")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("backend", &self.backend.is_some())
            .field("backend_active", &self.backend_active)
            .finish()
    }
}

impl DragDropManager {
    /// Create a manager without a backend.
    ///
    /// Drags can still be driven through [`DragDropManager::actions`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager driving `backend`.
    #[must_use]
    pub fn with_backend(backend: impl Backend + 'static) -> Self {
        let mut manager = Self::new();
        manager.receive_backend(Box::new(backend));
        manager
    }

    /// Replace the backend.
    ///
    /// An active previous backend is torn down, and the new one is set up if
    /// handlers are registered.
    pub fn receive_backend(&mut self, backend: Box<dyn Backend>) {
        if self.backend_active
            && let Some(old) = self.backend.as_mut()
        {
            log::debug!("tearing down replaced backend");
            old.teardown();
        }
        self.backend_active = false;
        self.backend = Some(backend);
        self.sync_backend();
    }

    /// A monitor over the current state.
    #[must_use]
    pub fn monitor(&self) -> DragDropMonitor<'_> {
        self.store.monitor(&self.registry)
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &DragDropState {
        self.store.state()
    }

    /// The handler registry.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Action creators for this turn.
    ///
    /// Handlers registered or removed through the returned value are reflected
    /// in the backend's setup state at the start of the next turn.
    pub fn actions(&mut self) -> DragDropActions<'_> {
        self.begin_turn();
        DragDropActions::new(&mut self.store, &mut self.registry)
    }

    /// Register a drag source for items of type `ty`.
    pub fn add_source(
        &mut self,
        ty: impl Into<ItemType>,
        source: impl DragSource + 'static,
    ) -> Result<HandlerId, RegistrationError> {
        self.add_source_rc(ty.into(), Rc::new(source))
    }

    /// Register a shared drag source.
    pub fn add_source_rc(
        &mut self,
        ty: ItemType,
        source: Rc<dyn DragSource>,
    ) -> Result<HandlerId, RegistrationError> {
        let id = self.actions().add_source_rc(ty, source)?;
        self.sync_backend();
        Ok(id)
    }

    /// Register a drop target accepting `types`.
    pub fn add_target(
        &mut self,
        types: impl Into<TargetTypes>,
        target: impl DropTarget + 'static,
    ) -> Result<HandlerId, RegistrationError> {
        self.add_target_rc(types.into(), Rc::new(target))
    }

    /// Register a shared drop target.
    pub fn add_target_rc(
        &mut self,
        types: TargetTypes,
        target: Rc<dyn DropTarget>,
    ) -> Result<HandlerId, RegistrationError> {
        let id = self.actions().add_target_rc(types, target)?;
        self.sync_backend();
        Ok(id)
    }

    /// Unregister a source.
    ///
    /// The source stays resolvable until the start of the next turn, and for
    /// the rest of the drag if it is the source being dragged.
    ///
    /// # Panics
    ///
    /// Panics if the source is not registered.
    pub fn remove_source(&mut self, id: HandlerId) {
        self.actions().remove_source(id);
        self.sync_backend();
    }

    /// Unregister a target.
    ///
    /// # Panics
    ///
    /// Panics if the target is not registered.
    pub fn remove_target(&mut self, id: HandlerId) {
        self.actions().remove_target(id);
        self.sync_backend();
    }

    /// Subscribe to state changes relevant to `handler_ids` (all handlers with `None`).
    pub fn subscribe_to_state_change(
        &mut self,
        listener: impl FnMut(&DragDropMonitor<'_>) + 'static,
        handler_ids: Option<&[HandlerId]>,
    ) -> ListenerId {
        self.store.subscribe_to_state_change(listener, handler_ids)
    }

    /// Subscribe to changes of the drag offsets.
    pub fn subscribe_to_offset_change(
        &mut self,
        listener: impl FnMut(&DragDropMonitor<'_>) + 'static,
    ) -> ListenerId {
        self.store.subscribe_to_offset_change(listener)
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Feed a native event to the backend.
    ///
    /// Events arriving while there is no backend, or while it is torn down,
    /// are ignored.
    pub fn handle_event(&mut self, event: &InputEvent) -> EventResponse {
        self.begin_turn();
        if !self.backend_active {
            log::warn!("{} ignored: backend is not set up", event.kind.name());
            return EventResponse::default();
        }
        let Self {
            store,
            registry,
            backend,
            ..
        } = self;
        let response = match backend.as_mut() {
            Some(backend) => {
                let mut actions = DragDropActions::new(store, registry);
                backend.handle_event(event, &mut actions)
            }
            None => EventResponse::default(),
        };
        self.sync_backend();
        response
    }

    /// Run work the backend deferred to the next frame.
    pub fn on_frame(&mut self, timestamp: f64) {
        self.begin_turn();
        if !self.backend_active {
            return;
        }
        let Self {
            store,
            registry,
            backend,
            ..
        } = self;
        if let Some(backend) = backend.as_mut() {
            let mut actions = DragDropActions::new(store, registry);
            backend.on_frame(timestamp, &mut actions);
        }
        self.sync_backend();
    }

    /// Bind `node` as the drag handle of `source_id`. Returns `None` without a backend.
    pub fn connect_drag_source(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        options: DragSourceOptions,
    ) -> Option<Connection> {
        let backend = self.backend.as_mut()?;
        Some(backend.connect_drag_source(source_id, node, options))
    }

    /// Bind `node` as the drag preview of `source_id`. Returns `None` without a backend.
    pub fn connect_drag_preview(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        options: DragPreviewOptions,
    ) -> Option<Connection> {
        let backend = self.backend.as_mut()?;
        Some(backend.connect_drag_preview(source_id, node, options))
    }

    /// Bind `node` as the drop area of `target_id`. Returns `None` without a backend.
    pub fn connect_drop_target(
        &mut self,
        target_id: HandlerId,
        node: NodeId,
        options: DropTargetOptions,
    ) -> Option<Connection> {
        let backend = self.backend.as_mut()?;
        Some(backend.connect_drop_target(target_id, node, options))
    }

    /// Unbind a node.
    pub fn disconnect(&mut self, connection: Connection) {
        if let Some(backend) = self.backend.as_mut() {
            backend.disconnect(connection);
        }
    }

    /// The backend, if any.
    #[must_use]
    pub fn backend(&self) -> Option<&dyn Backend> {
        self.backend.as_deref()
    }

    /// The backend, if any.
    pub fn backend_mut(&mut self) -> Option<&mut (dyn Backend + 'static)> {
        self.backend.as_deref_mut()
    }

    /// Returns `true` while the backend is set up.
    #[must_use]
    pub fn is_backend_active(&self) -> bool {
        self.backend_active
    }

    /// Diagnostic counters of the backend.
    #[must_use]
    pub fn profile(&self) -> Profile {
        self.backend.as_ref().map(|b| b.profile()).unwrap_or_default()
    }

    /// Delete sources whose removal was queued. Returns how many were removed.
    pub fn flush_removals(&mut self) -> usize {
        self.registry.flush_removals()
    }

    fn begin_turn(&mut self) {
        let removed = self.flush_removals();
        if removed > 0 {
            log::trace!("flushed {removed} removed sources");
        }
        self.sync_backend();
    }

    /// Set up or tear down the backend when the reference count crossed zero.
    fn sync_backend(&mut self) {
        let wanted = self.store.state().ref_count > 0;
        if wanted == self.backend_active {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if wanted {
            log::debug!("setting up backend");
            backend.setup();
        } else {
            log::debug!("tearing down backend");
            backend.teardown();
        }
        self.backend_active = wanted;
    }
}
