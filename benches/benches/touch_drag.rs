// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Point;
use serde_json::json;
use understory_dnd::backend::{DragSourceOptions, DropTargetOptions, NoGeometry, NodeId};
use understory_dnd::handler::{DragSource, DropTarget};
use understory_dnd::id::HandlerId;
use understory_dnd::input::{InputEvent, InputEventKind};
use understory_dnd::item::DragItem;
use understory_dnd::manager::DragDropManager;
use understory_dnd::monitor::DragDropMonitor;
use understory_dnd_backends::touch::{TouchBackend, TouchBackendOptions};

const ROOT: NodeId = NodeId(0);
const PIECE: NodeId = NodeId(1);

struct Source;

impl DragSource for Source {
    fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
        true
    }

    fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
        Some(DragItem::new(json!({})))
    }

    fn end_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) {}
}

struct Target;

impl DropTarget for Target {}

/// A row of `n` nested target nodes under the root.
fn build(n: u64) -> (DragDropManager, Vec<Vec<NodeId>>) {
    let backend = TouchBackend::new(NoGeometry, TouchBackendOptions::default());
    let mut manager = DragDropManager::with_backend(backend);
    let source = manager.add_source("piece", Source).unwrap();
    let _connection = manager.connect_drag_source(source, PIECE, DragSourceOptions::default());
    let mut paths = Vec::new();
    for i in 0..n {
        let node = NodeId(100 + i);
        let id = manager.add_target("piece", Target).unwrap();
        let _connection = manager.connect_drop_target(id, node, DropTargetOptions::default());
        paths.push(vec![ROOT, node]);
    }
    (manager, paths)
}

fn gesture(manager: &mut DragDropManager, paths: &[Vec<NodeId>]) {
    let touch = |kind, x: f64, path: &[NodeId]| InputEvent::touch(kind, Point::new(x, 0.0), path);
    manager.handle_event(&touch(InputEventKind::TouchStart, 0.0, &[ROOT, PIECE]));
    for (i, path) in paths.iter().enumerate() {
        manager.handle_event(&touch(InputEventKind::TouchMove, 10.0 + i as f64, path));
    }
    let last = paths.last().map_or(&[ROOT][..], Vec::as_slice);
    manager.handle_event(&touch(InputEventKind::TouchEnd, 0.0, last));
}

fn bench_touch(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_dnd_touch");

    for &n in &[16_u64, 256] {
        group.bench_function(format!("gesture(targets={n})"), |b| {
            b.iter_batched(
                || build(n),
                |(mut manager, paths)| {
                    gesture(&mut manager, &paths);
                    black_box(manager.monitor().revision());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_touch);
criterion_main!(benches);
