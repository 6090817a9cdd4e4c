// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connectors keep a handler's node bindings in sync with a backend.
//!
//! UI layers rebuild their views often; each rebuild reports the current
//! handler id, node and options. A connector remembers what is bound and only
//! talks to the backend when something actually changed, disconnecting the
//! stale binding first.
//!
//! ```
//! use understory_dnd::backend::{DragSourceOptions, NodeId};
//! use understory_dnd::connector::SourceConnector;
//! use understory_dnd::id::{HandlerId, HandlerRole};
//! use understory_dnd::test_backend::TestBackend;
//!
//! let mut backend = TestBackend::new();
//! let probe = backend.probe();
//! let mut connector = SourceConnector::new();
//! let id = HandlerId::new(HandlerRole::Source, 1);
//!
//! connector.receive_handler_id(&mut backend, Some(id));
//! connector.set_drag_source(&mut backend, Some(NodeId(7)), DragSourceOptions::default());
//! // Same node and options again: no backend traffic.
//! connector.set_drag_source(&mut backend, Some(NodeId(7)), DragSourceOptions::default());
//! assert_eq!(probe.borrow().connect_calls, 1);
//! ```

use crate::backend::{
    Backend, Connection, DragPreviewOptions, DragSourceOptions, DropTargetOptions, NodeId,
};
use crate::id::HandlerId;

/// One node binding of one kind.
#[derive(Clone, Debug, Default)]
struct Binding<O> {
    node: Option<NodeId>,
    options: O,
    connected: Option<(Connection, NodeId, O)>,
}

impl<O: Copy + PartialEq> Binding<O> {
    fn is_current(&self, handler_id: Option<HandlerId>) -> bool {
        match (handler_id.zip(self.node), &self.connected) {
            (None, None) => true,
            (Some((id, node)), Some((conn, bound, options))) => {
                conn.handler_id == id && *bound == node && *options == self.options
            }
            _ => false,
        }
    }

    fn sync(
        &mut self,
        backend: &mut dyn Backend,
        handler_id: Option<HandlerId>,
        connect: impl FnOnce(&mut dyn Backend, HandlerId, NodeId, O) -> Connection,
    ) {
        if self.is_current(handler_id) {
            return;
        }
        self.disconnect(backend);
        if let Some((id, node)) = handler_id.zip(self.node) {
            let connection = connect(backend, id, node, self.options);
            self.connected = Some((connection, node, self.options));
        }
    }

    fn disconnect(&mut self, backend: &mut dyn Backend) {
        if let Some((connection, ..)) = self.connected.take() {
            backend.disconnect(connection);
        }
    }
}

/// Binds a drag source's handle node and preview node.
#[derive(Clone, Debug, Default)]
pub struct SourceConnector {
    handler_id: Option<HandlerId>,
    source: Binding<DragSourceOptions>,
    preview: Binding<DragPreviewOptions>,
}

impl SourceConnector {
    /// Create a connector with nothing bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The handler the nodes belong to.
    #[must_use]
    pub fn handler_id(&self) -> Option<HandlerId> {
        self.handler_id
    }

    /// The active drag handle binding.
    #[must_use]
    pub fn source_connection(&self) -> Option<Connection> {
        self.source.connected.map(|(c, ..)| c)
    }

    /// The active preview binding.
    #[must_use]
    pub fn preview_connection(&self) -> Option<Connection> {
        self.preview.connected.map(|(c, ..)| c)
    }

    /// Change the handler id, rebinding both nodes if it differs.
    pub fn receive_handler_id(&mut self, backend: &mut dyn Backend, id: Option<HandlerId>) {
        if self.handler_id == id {
            return;
        }
        self.handler_id = id;
        self.reconnect(backend);
    }

    /// Set the drag handle node and its options.
    pub fn set_drag_source(
        &mut self,
        backend: &mut dyn Backend,
        node: Option<NodeId>,
        options: DragSourceOptions,
    ) {
        self.source.node = node;
        self.source.options = options;
        self.reconnect_source(backend);
    }

    /// Set the preview node and its options.
    pub fn set_drag_preview(
        &mut self,
        backend: &mut dyn Backend,
        node: Option<NodeId>,
        options: DragPreviewOptions,
    ) {
        self.preview.node = node;
        self.preview.options = options;
        self.reconnect_preview(backend);
    }

    /// Rebind whatever changed.
    pub fn reconnect(&mut self, backend: &mut dyn Backend) {
        self.reconnect_source(backend);
        self.reconnect_preview(backend);
    }

    fn reconnect_source(&mut self, backend: &mut dyn Backend) {
        self.source
            .sync(backend, self.handler_id, |b, id, node, options| {
                b.connect_drag_source(id, node, options)
            });
    }

    fn reconnect_preview(&mut self, backend: &mut dyn Backend) {
        self.preview
            .sync(backend, self.handler_id, |b, id, node, options| {
                b.connect_drag_preview(id, node, options)
            });
    }

    /// Unbind both nodes, keeping the remembered nodes and options.
    pub fn disconnect(&mut self, backend: &mut dyn Backend) {
        self.source.disconnect(backend);
        self.preview.disconnect(backend);
    }
}

/// Binds a drop target's node.
#[derive(Clone, Debug, Default)]
pub struct TargetConnector {
    handler_id: Option<HandlerId>,
    target: Binding<DropTargetOptions>,
}

impl TargetConnector {
    /// Create a connector with nothing bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The handler the node belongs to.
    #[must_use]
    pub fn handler_id(&self) -> Option<HandlerId> {
        self.handler_id
    }

    /// The active binding.
    #[must_use]
    pub fn connection(&self) -> Option<Connection> {
        self.target.connected.map(|(c, ..)| c)
    }

    /// Change the handler id, rebinding the node if it differs.
    pub fn receive_handler_id(&mut self, backend: &mut dyn Backend, id: Option<HandlerId>) {
        if self.handler_id == id {
            return;
        }
        self.handler_id = id;
        self.reconnect(backend);
    }

    /// Set the drop node and its options.
    pub fn set_drop_target(
        &mut self,
        backend: &mut dyn Backend,
        node: Option<NodeId>,
        options: DropTargetOptions,
    ) {
        self.target.node = node;
        self.target.options = options;
        self.reconnect(backend);
    }

    /// Rebind if anything changed.
    pub fn reconnect(&mut self, backend: &mut dyn Backend) {
        self.target
            .sync(backend, self.handler_id, |b, id, node, options| {
                b.connect_drop_target(id, node, options)
            });
    }

    /// Unbind the node, keeping the remembered node and options.
    pub fn disconnect(&mut self, backend: &mut dyn Backend) {
        self.target.disconnect(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ConnectionKind;
    use crate::id::HandlerRole;
    use crate::test_backend::TestBackend;

    fn s(n: u32) -> HandlerId {
        HandlerId::new(HandlerRole::Source, n)
    }

    #[test]
    fn nothing_binds_without_handler_id() {
        let mut backend = TestBackend::new();
        let probe = backend.probe();
        let mut c = SourceConnector::new();
        c.set_drag_source(&mut backend, Some(NodeId(1)), DragSourceOptions::default());
        assert_eq!(probe.borrow().connect_calls, 0);

        c.receive_handler_id(&mut backend, Some(s(1)));
        assert_eq!(probe.borrow().connect_calls, 1);
        assert_eq!(
            c.source_connection(),
            Some(Connection::new(ConnectionKind::DragSource, s(1)))
        );
    }

    #[test]
    fn option_change_rebinds() {
        let mut backend = TestBackend::new();
        let probe = backend.probe();
        let mut c = SourceConnector::new();
        c.receive_handler_id(&mut backend, Some(s(1)));
        c.set_drag_preview(&mut backend, Some(NodeId(2)), DragPreviewOptions::default());
        c.set_drag_preview(&mut backend, Some(NodeId(2)), DragPreviewOptions::default());
        assert_eq!(probe.borrow().connect_calls, 1);

        let options = DragPreviewOptions {
            anchor_x: 0.0,
            ..DragPreviewOptions::default()
        };
        c.set_drag_preview(&mut backend, Some(NodeId(2)), options);
        let log = probe.borrow();
        assert_eq!(log.connect_calls, 2);
        assert_eq!(log.disconnected.len(), 1);
    }

    #[test]
    fn new_handler_id_moves_binding() {
        let mut backend = TestBackend::new();
        let probe = backend.probe();
        let t1 = HandlerId::new(HandlerRole::Target, 1);
        let t2 = HandlerId::new(HandlerRole::Target, 2);
        let mut c = TargetConnector::new();
        c.set_drop_target(&mut backend, Some(NodeId(5)), DropTargetOptions::default());
        c.receive_handler_id(&mut backend, Some(t1));
        c.receive_handler_id(&mut backend, Some(t2));
        let log = probe.borrow();
        assert_eq!(
            log.disconnected,
            [Connection::new(ConnectionKind::DropTarget, t1)]
        );
        assert_eq!(log.node_of(ConnectionKind::DropTarget, t2), Some(NodeId(5)));
    }

    #[test]
    fn clearing_node_disconnects() {
        let mut backend = TestBackend::new();
        let mut c = TargetConnector::new();
        c.receive_handler_id(&mut backend, Some(HandlerId::new(HandlerRole::Target, 1)));
        c.set_drop_target(&mut backend, Some(NodeId(5)), DropTargetOptions::default());
        assert!(c.connection().is_some());
        c.set_drop_target(&mut backend, None, DropTargetOptions::default());
        assert!(c.connection().is_none());
        assert!(backend.probe().borrow().live.is_empty());
    }
}
