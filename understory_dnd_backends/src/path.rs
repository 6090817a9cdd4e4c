// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping event paths to bound handlers.

use hashbrown::HashMap;
use understory_dnd::backend::NodeId;
use understory_dnd::id::HandlerId;
use understory_dnd::monitor::DragDropMonitor;
use understory_dnd::reducer::HandlerIds;

/// Handler ids bound to nodes on `path` (root→target), outermost first.
///
/// Handlers bound to the same node are ordered by id. A node listed twice
/// contributes its handlers once.
pub(crate) fn ids_on_path(nodes: &HashMap<HandlerId, NodeId>, path: &[NodeId]) -> HandlerIds {
    let mut ids = HandlerIds::new();
    for (i, node) in path.iter().enumerate() {
        if path[..i].contains(node) {
            continue;
        }
        let start = ids.len();
        ids.extend(nodes.iter().filter(|(_, n)| *n == node).map(|(id, _)| *id));
        ids[start..].sort_unstable();
    }
    ids
}

/// Drop ids whose source is no longer registered.
pub(crate) fn registered_sources(monitor: &DragDropMonitor<'_>, mut ids: HandlerIds) -> HandlerIds {
    ids.retain(|id| monitor.registry().contains_source(*id));
    ids
}

/// Drop ids whose target is no longer registered.
pub(crate) fn registered_targets(monitor: &DragDropMonitor<'_>, mut ids: HandlerIds) -> HandlerIds {
    ids.retain(|id| monitor.registry().contains_target(*id));
    ids
}
