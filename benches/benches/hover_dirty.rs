// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Point;
use serde_json::json;
use understory_dnd::actions::{BeginDragOptions, HoverOptions};
use understory_dnd::handler::{DragSource, DropTarget};
use understory_dnd::id::HandlerId;
use understory_dnd::item::{DragItem, DropResult};
use understory_dnd::manager::DragDropManager;
use understory_dnd::monitor::DragDropMonitor;

struct Source;

impl DragSource for Source {
    fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
        true
    }

    fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
        Some(DragItem::new(json!({ "n": 0 })))
    }

    fn end_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) {}
}

struct Target;

impl DropTarget for Target {}

struct Board {
    manager: DragDropManager,
    source: HandlerId,
    targets: Vec<HandlerId>,
}

/// One source plus `n` targets, each with a subscriber filtered to its own id.
fn build_board(n: usize, subscribe: bool) -> Board {
    let mut manager = DragDropManager::new();
    let source = manager.add_source("piece", Source).unwrap();
    let mut targets = Vec::with_capacity(n);
    for _ in 0..n {
        let id = manager.add_target("piece", Target).unwrap();
        if subscribe {
            manager.subscribe_to_state_change(
                |monitor| {
                    black_box(monitor.revision());
                },
                Some(&[id]),
            );
        }
        targets.push(id);
    }
    Board {
        manager,
        source,
        targets,
    }
}

fn sweep(board: &mut Board, depth: usize) {
    let mut actions = board.manager.actions();
    actions.begin_drag(&[board.source], BeginDragOptions::default());
    for (i, window) in board.targets.windows(depth).enumerate() {
        actions.hover(
            window,
            HoverOptions {
                client_offset: Some(Point::new(i as f64, 0.0)),
            },
        );
    }
    actions.drop(DropResult::new());
    actions.end_drag();
}

fn bench_hover(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_dnd_hover");
    group.sample_size(50);

    for &(n, depth) in &[(64_usize, 1_usize), (64, 4), (1_024, 1), (1_024, 4)] {
        for subscribe in [false, true] {
            let name = if subscribe { "filtered" } else { "bare" };
            group.bench_function(format!("sweep_{name}(n={n},depth={depth})"), |b| {
                b.iter_batched(
                    || build_board(n, subscribe),
                    |mut board| {
                        sweep(&mut board, depth);
                        black_box(board.manager.monitor().revision());
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_hover);
criterion_main!(benches);
