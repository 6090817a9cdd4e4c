// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording backend for tests and demos.
//!
//! [`TestBackend`] drives nothing by itself. It records lifecycle calls,
//! connections and forwarded events into a shared [`TestLog`], which stays
//! readable through [`TestBackend::probe`] after the backend was moved into a
//! manager or a pipeline.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::actions::DragDropActions;
use crate::backend::{
    Backend, Connection, ConnectionKind, DragPreviewOptions, DragSourceOptions,
    DropTargetOptions, EventResponse, NodeId, Profile,
};
use crate::id::HandlerId;
use crate::input::{InputEvent, InputEventKind};

/// Everything a [`TestBackend`] saw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestLog {
    /// Number of `setup` calls.
    pub setups: usize,
    /// Number of `teardown` calls.
    pub teardowns: usize,
    /// Number of `connect_*` calls.
    pub connect_calls: usize,
    /// Current bindings.
    pub live: Vec<(Connection, NodeId)>,
    /// Every disconnected token, in order.
    pub disconnected: Vec<Connection>,
    /// Kinds of events passed to `handle_event`, in order.
    pub events: Vec<InputEventKind>,
    /// Timestamps passed to `on_frame`, in order.
    pub frames: Vec<f64>,
}

impl TestLog {
    /// Node currently bound for `kind` and `handler_id`.
    #[must_use]
    pub fn node_of(&self, kind: ConnectionKind, handler_id: HandlerId) -> Option<NodeId> {
        let key = Connection::new(kind, handler_id);
        self.live.iter().find(|(c, _)| *c == key).map(|(_, n)| *n)
    }
}

/// A backend that records calls into a shared [`TestLog`].
#[derive(Debug, Default)]
pub struct TestBackend {
    log: Rc<RefCell<TestLog>>,
    active: bool,
}

impl TestBackend {
    /// Create a backend with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the log.
    #[must_use]
    pub fn probe(&self) -> Rc<RefCell<TestLog>> {
        self.log.clone()
    }

    /// Returns `true` between `setup` and `teardown`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn connect(&mut self, kind: ConnectionKind, handler_id: HandlerId, node: NodeId) -> Connection {
        let connection = Connection::new(kind, handler_id);
        let mut log = self.log.borrow_mut();
        log.connect_calls += 1;
        log.live.retain(|(c, _)| *c != connection);
        log.live.push((connection, node));
        connection
    }
}

impl Backend for TestBackend {
    /// # Panics
    ///
    /// Panics if already set up.
    fn setup(&mut self) {
        assert!(!self.active, "Cannot have two backends at the same time.");
        self.active = true;
        self.log.borrow_mut().setups += 1;
    }

    fn teardown(&mut self) {
        self.active = false;
        self.log.borrow_mut().teardowns += 1;
    }

    fn connect_drag_source(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        _options: DragSourceOptions,
    ) -> Connection {
        self.connect(ConnectionKind::DragSource, source_id, node)
    }

    fn connect_drag_preview(
        &mut self,
        source_id: HandlerId,
        node: NodeId,
        _options: DragPreviewOptions,
    ) -> Connection {
        self.connect(ConnectionKind::DragPreview, source_id, node)
    }

    fn connect_drop_target(
        &mut self,
        target_id: HandlerId,
        node: NodeId,
        _options: DropTargetOptions,
    ) -> Connection {
        self.connect(ConnectionKind::DropTarget, target_id, node)
    }

    fn disconnect(&mut self, connection: Connection) {
        let mut log = self.log.borrow_mut();
        log.live.retain(|(c, _)| *c != connection);
        log.disconnected.push(connection);
    }

    fn handle_event(
        &mut self,
        event: &InputEvent,
        _actions: &mut DragDropActions<'_>,
    ) -> EventResponse {
        self.log.borrow_mut().events.push(event.kind);
        EventResponse::default()
    }

    fn on_frame(&mut self, timestamp: f64, _actions: &mut DragDropActions<'_>) {
        self.log.borrow_mut().frames.push(timestamp);
    }

    fn profile(&self) -> Profile {
        let log = self.log.borrow();
        Profile::from([
            ("live", log.live.len()),
            ("events", log.events.len()),
        ])
    }
}
