// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Switch from platform drag events to touch input mid-session.
//!
//! The pipeline starts on the HTML5-style backend. The first `touchstart`
//! moves every connected node over to the touch backend, which also turns
//! on custom drag previews; a listener on the [`PreviewList`] prints each
//! change. A knight is then dragged from g1 to f3 by touch.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example touch_switch`

use serde_json::json;
use understory_dnd::backend::{DragPreviewOptions, DragSourceOptions, DropTargetOptions, NodeId};
use understory_dnd::handler::{DragSource, DropTarget};
use understory_dnd::id::HandlerId;
use understory_dnd::input::{InputEvent, InputEventKind};
use understory_dnd::item::DragItem;
use understory_dnd::manager::DragDropManager;
use understory_dnd::monitor::DragDropMonitor;
use understory_dnd_backends::html5::Html5Backend;
use understory_dnd_backends::multi::{
    HTML5_DRAG_TRANSITION, MultiBackend, Pipeline, PipelineEntry, PreviewList, TOUCH_TRANSITION,
};
use understory_dnd_backends::touch::{TouchBackend, TouchBackendOptions};
use understory_dnd_demos::{ChessLayout, Square};

const GHOST: NodeId = NodeId(900);

struct Knight;

impl DragSource for Knight {
    fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
        true
    }

    fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
        Some(DragItem::new(json!({ "piece": "knight" })))
    }

    fn end_drag(&self, monitor: &DragDropMonitor<'_>, _: HandlerId) {
        println!("knight dropped: {}", monitor.did_drop());
    }
}

struct BoardSquare;

impl DropTarget for BoardSquare {}

fn pipeline() -> Pipeline {
    let touch = TouchBackendOptions {
        touch_slop: 5.0,
        ..TouchBackendOptions::default()
    };
    Pipeline::new()
        .with(
            PipelineEntry::new("html5", Html5Backend::new(ChessLayout))
                .transition(HTML5_DRAG_TRANSITION),
        )
        .with(
            PipelineEntry::new("touch", TouchBackend::new(ChessLayout, touch))
                .preview(true)
                .transition(TOUCH_TRANSITION),
        )
}

fn print_previews(previews: &PreviewList) {
    println!(
        "active backend: {}, previews: {}",
        previews.backend_id(),
        previews.preview_enabled()
    );
}

fn main() {
    let multi = MultiBackend::new(pipeline()).unwrap();
    let previews = multi.preview_list();
    previews.register(|change| {
        println!(
            "backend changed to {} (previews: {})",
            change.backend_id, change.preview_enabled
        );
    });
    print_previews(&previews);

    let mut manager = DragDropManager::with_backend(multi);
    let g1 = Square::parse("g1").unwrap();
    let f3 = Square::parse("f3").unwrap();
    let knight = manager.add_source("knight", Knight).unwrap();
    let _connection = manager.connect_drag_source(knight, g1.piece_node(), DragSourceOptions::default());
    let _connection = manager.connect_drag_preview(knight, GHOST, DragPreviewOptions::default());
    for square in Square::all() {
        let id = manager.add_target("knight", BoardSquare).unwrap();
        let _connection = manager.connect_drop_target(id, square.node(), DropTargetOptions::default());
    }

    let touch = |kind, square: Square, with_piece| {
        InputEvent::touch(kind, square.center(), &square.path(with_piece))
    };
    manager.handle_event(&touch(InputEventKind::TouchStart, g1, true));
    print_previews(&previews);

    manager.handle_event(&touch(InputEventKind::TouchMove, f3, false));
    let monitor = manager.monitor();
    println!(
        "dragging: {}, offset from start: {:?}",
        monitor.is_dragging(),
        monitor.difference_from_initial_offset()
    );
    manager.handle_event(&touch(InputEventKind::TouchEnd, f3, false));
    println!("{:?}", manager.profile());
}
