// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Action creators: validated entry points that drive the drag state machine.
//!
//! [`DragDropActions`] borrows the store and the registry for the duration of
//! one turn. Backends receive it in [`Backend::handle_event`](crate::backend::Backend::handle_event);
//! applications get it from [`DragDropManager::actions`](crate::manager::DragDropManager::actions).
//!
//! ## Lifecycle
//!
//! ```text
//! begin_drag ──▶ hover* ──▶ drop? ──▶ end_drag
//!      │
//!      └─ cancelled (no source can drag, or begin_drag returned None)
//! ```
//!
//! Calling these out of order is a bug and panics: hovering or dropping while
//! idle, dropping twice, beginning while a drag is already running, or passing
//! unregistered or duplicate ids.

use alloc::rc::Rc;
use core::fmt;

use kurbo::Point;

use crate::error::RegistrationError;
use crate::handler::{DragSource, DropTarget};
use crate::id::{HandlerId, ItemType, TargetTypes};
use crate::item::DropResult;
use crate::monitor::DragDropMonitor;
use crate::reducer::{Action, HandlerIds};
use crate::registry::HandlerRegistry;
use crate::store::Store;

/// Options for [`DragDropActions::begin_drag`].
#[derive(Clone, Copy)]
pub struct BeginDragOptions<'a> {
    /// Reveal the source to listeners immediately.
    pub publish_source: bool,
    /// Pointer position at the start of the drag.
    pub client_offset: Option<Point>,
    /// Resolves the origin of a source node; required when `client_offset` is set.
    pub source_client_offset: Option<&'a dyn Fn(HandlerId) -> Option<Point>>,
}

impl Default for BeginDragOptions<'_> {
    fn default() -> Self {
        Self {
            publish_source: true,
            client_offset: None,
            source_client_offset: None,
        }
    }
}

impl fmt::Debug for BeginDragOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeginDragOptions")
            .field("publish_source", &self.publish_source)
            .field("client_offset", &self.client_offset)
            .field("source_client_offset", &self.source_client_offset.is_some())
            .finish()
    }
}

/// Options for [`DragDropActions::hover`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoverOptions {
    /// Pointer position.
    pub client_offset: Option<Point>,
}

/// Drag action creators for one turn.
pub struct DragDropActions<'a> {
    store: &'a mut Store,
    registry: &'a mut HandlerRegistry,
}

impl fmt::Debug for DragDropActions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropActions")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .finish()
    }
}

impl<'a> DragDropActions<'a> {
    pub(crate) fn new(store: &'a mut Store, registry: &'a mut HandlerRegistry) -> Self {
        Self { store, registry }
    }

    /// A monitor over the current state.
    #[must_use]
    pub fn monitor(&self) -> DragDropMonitor<'_> {
        self.store.monitor(self.registry)
    }

    fn dispatch(&mut self, action: Action) {
        self.store.dispatch(action, self.registry);
    }

    fn reset_coordinates(&mut self) {
        self.dispatch(Action::InitCoords {
            client_offset: None,
            source_client_offset: None,
        });
    }

    /// Start a drag from the innermost of `source_ids` that can drag.
    ///
    /// `source_ids` are ordered outermost first. If no source can drag, or the
    /// chosen source returns no item, the drag is cancelled and the offsets
    /// are reset.
    ///
    /// # Panics
    ///
    /// Panics if a drag is already in progress, if an id is not a registered
    /// source, if `client_offset` is set without `source_client_offset`, or if
    /// the item is not a JSON object.
    pub fn begin_drag(&mut self, source_ids: &[HandlerId], options: BeginDragOptions<'_>) {
        {
            let monitor = self.monitor();
            assert!(!monitor.is_dragging(), "Cannot call beginDrag while dragging.");
            for &id in source_ids {
                assert!(
                    id.is_source() && self.registry.contains_source(id),
                    "Expected sourceIds to be registered."
                );
            }
        }
        self.dispatch(Action::InitCoords {
            client_offset: options.client_offset,
            source_client_offset: None,
        });

        let source_id = {
            let monitor = self.monitor();
            source_ids
                .iter()
                .rev()
                .copied()
                .find(|&id| monitor.can_drag_source(id))
        };
        let Some(source_id) = source_id else {
            log::debug!("no source among {source_ids:?} can drag");
            self.reset_coordinates();
            return;
        };

        let source_client_offset = match (options.client_offset, options.source_client_offset) {
            (None, _) => None,
            (Some(_), Some(resolve)) => resolve(source_id),
            (Some(_), None) => panic!("source_client_offset must be provided with client_offset"),
        };
        self.dispatch(Action::InitCoords {
            client_offset: options.client_offset,
            source_client_offset,
        });

        let item = {
            let monitor = self.monitor();
            self.registry
                .source(source_id)
                .and_then(|source| source.begin_drag(&monitor, source_id))
        };
        let Some(item) = item else {
            log::debug!("source {source_id} cancelled the drag");
            self.reset_coordinates();
            return;
        };
        assert!(item.is_object(), "Item must be an object.");

        self.registry.pin_source(source_id);
        let Some(item_type) = self.registry.source_type(source_id).cloned() else {
            panic!("Expected to find a valid source. sourceId={source_id}");
        };
        log::debug!("begin drag of {item_type} from {source_id}");
        self.dispatch(Action::BeginDrag {
            item_type,
            item,
            source_id,
            client_offset: options.client_offset,
            source_client_offset,
            is_source_public: options.publish_source,
        });
    }

    /// Reveal the drag source to listeners. Does nothing while idle.
    pub fn publish_drag_source(&mut self) {
        if self.monitor().is_dragging() {
            self.dispatch(Action::PublishDragSource);
        }
    }

    /// Replace the hover stack with `target_ids` (outermost first).
    ///
    /// Targets that do not accept the dragged item type are filtered out, then
    /// the `hover` of every remaining target is called in the given order.
    ///
    /// # Panics
    ///
    /// Panics if no drag is in progress, if the drag was already dropped, or
    /// if `target_ids` contains duplicates or unregistered targets.
    pub fn hover(&mut self, target_ids: &[HandlerId], options: HoverOptions) {
        let ids: HandlerIds = {
            let monitor = self.monitor();
            assert!(monitor.is_dragging(), "Cannot call hover while not dragging.");
            assert!(!monitor.did_drop(), "Cannot call hover after drop.");
            for (i, id) in target_ids.iter().enumerate() {
                assert!(
                    !target_ids[i + 1..].contains(id),
                    "Expected targetIds to be unique in the passed array."
                );
                assert!(
                    id.is_target() && self.registry.contains_target(*id),
                    "Expected targetIds to be registered."
                );
            }

            let item_type = monitor.item_type();
            let ids: HandlerIds = target_ids
                .iter()
                .copied()
                .filter(|&id| {
                    self.registry
                        .target_types(id)
                        .is_some_and(|types| types.matches(item_type))
                })
                .collect();
            for &id in &ids {
                if let Some(target) = self.registry.target(id) {
                    target.hover(&monitor, id);
                }
            }
            ids
        };
        self.dispatch(Action::Hover {
            target_ids: ids,
            client_offset: options.client_offset,
        });
    }

    /// Drop on every hovered target that accepts the item, innermost first.
    ///
    /// One `Drop` action is dispatched per accepting target, so each target
    /// sees the result accumulated by the targets inside it. A target that
    /// returns no result keeps the running one (`{}` for the innermost). The
    /// entries of `options` are merged under every result. With no accepting
    /// target, a single drop with `options` alone is recorded.
    ///
    /// # Panics
    ///
    /// Panics if no drag is in progress or the drag was already dropped.
    pub fn drop(&mut self, options: DropResult) {
        let targets: HandlerIds = {
            let monitor = self.monitor();
            assert!(monitor.is_dragging(), "Cannot call drop while not dragging.");
            assert!(
                !monitor.did_drop(),
                "Cannot call drop twice during one drag operation."
            );
            monitor
                .target_ids()
                .iter()
                .rev()
                .copied()
                .filter(|&id| monitor.can_drop_on_target(id))
                .collect()
        };

        if targets.is_empty() {
            log::debug!("drop with no accepting target");
            self.dispatch(Action::Drop {
                drop_result: options,
            });
            return;
        }

        for (index, &target_id) in targets.iter().enumerate() {
            let result = {
                let monitor = self.monitor();
                let produced = self
                    .registry
                    .target(target_id)
                    .and_then(|target| DropTarget::drop(&**target, &monitor, target_id));
                produced.unwrap_or_else(|| {
                    if index == 0 {
                        DropResult::new()
                    } else {
                        monitor.drop_result().cloned().unwrap_or_default()
                    }
                })
            };
            let mut drop_result = options.clone();
            drop_result.extend(result);
            self.dispatch(Action::Drop { drop_result });
        }
    }

    /// End the drag, calling the source's `end_drag` and releasing the pin.
    ///
    /// # Panics
    ///
    /// Panics if no drag is in progress.
    pub fn end_drag(&mut self) {
        let source_id = {
            let monitor = self.monitor();
            assert!(monitor.is_dragging(), "Cannot call endDrag while not dragging.");
            let source_id = monitor.source_id();
            if let Some(id) = source_id
                && let Some(source) = self.registry.source_or_pinned(id)
            {
                source.end_drag(&monitor, id);
            }
            source_id
        };
        if source_id.is_some() && self.registry.pinned_source().is_some() {
            self.registry.unpin_source();
        }
        log::debug!("end drag from {source_id:?}");
        self.dispatch(Action::EndDrag);
    }

    /// Register a shared drag source. Backends use this for native items.
    pub fn add_source_rc(
        &mut self,
        ty: ItemType,
        source: Rc<dyn DragSource>,
    ) -> Result<HandlerId, RegistrationError> {
        let id = self.registry.add_source(ty, source)?;
        self.dispatch(Action::AddSource(id));
        Ok(id)
    }

    /// Register a shared drop target.
    pub fn add_target_rc(
        &mut self,
        types: TargetTypes,
        target: Rc<dyn DropTarget>,
    ) -> Result<HandlerId, RegistrationError> {
        let id = self.registry.add_target(types, target)?;
        self.dispatch(Action::AddTarget(id));
        Ok(id)
    }

    /// Unregister a source. Its table entry is deleted at the start of the next turn.
    ///
    /// # Panics
    ///
    /// Panics if the source is not registered.
    pub fn remove_source(&mut self, id: HandlerId) {
        self.registry.remove_source(id);
        self.dispatch(Action::RemoveSource(id));
    }

    /// Unregister a target immediately.
    ///
    /// # Panics
    ///
    /// Panics if the target is not registered.
    pub fn remove_target(&mut self, id: HandlerId) {
        self.registry.remove_target(id);
        self.dispatch(Action::RemoveTarget(id));
    }
}
