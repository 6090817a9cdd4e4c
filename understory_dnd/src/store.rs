// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State container: owns the state tree, applies actions, notifies subscribers.
//!
//! Dispatch is synchronous. [`Store::dispatch`] runs the [reducer](crate::reducer),
//! replaces the state and only then calls subscribers, in subscription order,
//! with a monitor over the new state. Subscribers get read-only access, and
//! reducers are pure functions, so nothing can dispatch while a dispatch is
//! running.
//!
//! ## Filtering
//!
//! State-change subscribers may declare the handler ids they care about. A
//! subscriber is skipped when the revision did not move, or when it moved by
//! exactly one action whose [dirty set](crate::reducer::DirtyHandlers) misses
//! all declared ids. After any gap of more than one revision the subscriber is
//! always called, since intermediate dirty sets are not kept.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::id::HandlerId;
use crate::monitor::{DragDropMonitor, MonitorGuards};
use crate::offset::DragOffset;
use crate::reducer::{Action, DragDropState, HandlerIds, reduce};
use crate::registry::HandlerRegistry;

/// Callback invoked with a monitor over the new state.
pub type Listener = Box<dyn FnMut(&DragDropMonitor<'_>)>;

/// Handle returned by the subscribe methods.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

enum Filter {
    StateChange {
        handler_ids: Option<HandlerIds>,
        prev_state_id: u64,
    },
    OffsetChange {
        prev: DragOffset,
    },
}

impl Filter {
    /// Decide whether to notify, and remember what was seen.
    fn should_notify(&mut self, state: &DragDropState) -> bool {
        match self {
            Self::StateChange {
                handler_ids,
                prev_state_id,
            } => {
                let current = state.state_id;
                let can_skip = current == *prev_state_id
                    || (current == prev_state_id.wrapping_add(1)
                        && !state.dirty_handlers.intersects(handler_ids.as_deref()));
                *prev_state_id = current;
                !can_skip
            }
            Self::OffsetChange { prev } => {
                if *prev == state.drag_offset {
                    return false;
                }
                *prev = state.drag_offset;
                true
            }
        }
    }
}

struct Subscriber {
    id: ListenerId,
    filter: Filter,
    listener: Listener,
}

/// The state container.
#[derive(Default)]
pub struct Store {
    state: DragDropState,
    subscribers: Vec<Subscriber>,
    next_listener: u64,
    guards: MonitorGuards,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Create a store holding the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &DragDropState {
        &self.state
    }

    /// A monitor over the current state.
    #[must_use]
    pub fn monitor<'a>(&'a self, registry: &'a HandlerRegistry) -> DragDropMonitor<'a> {
        DragDropMonitor::new(&self.state, registry, &self.guards)
    }

    /// Apply `action`, then notify subscribers.
    pub fn dispatch(&mut self, action: Action, registry: &HandlerRegistry) {
        log::trace!("dispatch {action:?}");
        self.state = reduce(&self.state, &action);

        let Self {
            state,
            subscribers,
            guards,
            ..
        } = self;
        let state: &DragDropState = state;
        let monitor = DragDropMonitor::new(state, registry, guards);
        for sub in subscribers.iter_mut() {
            if sub.filter.should_notify(state) {
                (sub.listener)(&monitor);
            }
        }
    }

    fn push(&mut self, filter: Filter, listener: Listener) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.subscribers.push(Subscriber {
            id,
            filter,
            listener,
        });
        id
    }

    /// Subscribe to state changes relevant to `handler_ids`.
    ///
    /// With `None`, the listener is told about every revision that marks any
    /// handler dirty.
    pub fn subscribe_to_state_change(
        &mut self,
        listener: impl FnMut(&DragDropMonitor<'_>) + 'static,
        handler_ids: Option<&[HandlerId]>,
    ) -> ListenerId {
        let filter = Filter::StateChange {
            handler_ids: handler_ids.map(HandlerIds::from_slice),
            prev_state_id: self.state.state_id,
        };
        self.push(filter, Box::new(listener))
    }

    /// Subscribe to changes of the drag offsets.
    pub fn subscribe_to_offset_change(
        &mut self,
        listener: impl FnMut(&DragDropMonitor<'_>) + 'static,
    ) -> ListenerId {
        let filter = Filter::OffsetChange {
            prev: self.state.drag_offset,
        };
        self.push(filter, Box::new(listener))
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
