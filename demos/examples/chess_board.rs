// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag a knight across a chessboard with platform drag events.
//!
//! Each square is a drop target that only accepts knight moves. The host
//! feeds `dragstart`, `dragenter`, `dragover` and `drop` events through the
//! HTML5-style backend and prints what the engine reports back.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example chess_board`

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use understory_dnd::backend::{DragSourceOptions, DropTargetOptions};
use understory_dnd::handler::{DragSource, DropTarget};
use understory_dnd::id::HandlerId;
use understory_dnd::input::{InputEvent, InputEventKind};
use understory_dnd::item::{DragItem, DropResult};
use understory_dnd::manager::DragDropManager;
use understory_dnd::monitor::DragDropMonitor;
use understory_dnd_backends::html5::Html5Backend;
use understory_dnd_demos::{ChessLayout, Square};

struct Knight {
    at: Rc<Cell<Square>>,
}

impl DragSource for Knight {
    fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
        true
    }

    fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
        Some(DragItem::new(json!({ "piece": "knight" })))
    }

    fn end_drag(&self, monitor: &DragDropMonitor<'_>, _: HandlerId) {
        let Some(result) = monitor.drop_result() else {
            println!("drag cancelled");
            return;
        };
        println!("drop result: {}", json!(result));
        if let Some(to) = result
            .get("to")
            .and_then(|to| to.as_str())
            .and_then(Square::parse)
        {
            self.at.set(to);
        }
    }
}

struct BoardSquare {
    square: Square,
    knight_at: Rc<Cell<Square>>,
}

impl DropTarget for BoardSquare {
    fn can_drop(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
        self.knight_at.get().is_knight_move(self.square)
    }

    fn drop(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DropResult> {
        let mut result = DropResult::new();
        result.insert("to".into(), json!(self.square.name()));
        Some(result)
    }
}

fn main() {
    let mut manager = DragDropManager::with_backend(Html5Backend::new(ChessLayout));

    let b1 = Square::parse("b1").unwrap();
    let knight_at = Rc::new(Cell::new(b1));
    let knight = manager
        .add_source(
            "knight",
            Knight {
                at: knight_at.clone(),
            },
        )
        .unwrap();
    let _connection = manager.connect_drag_source(knight, b1.piece_node(), DragSourceOptions::default());

    for square in Square::all() {
        let target = BoardSquare {
            square,
            knight_at: knight_at.clone(),
        };
        let id = manager.add_target("knight", target).unwrap();
        let _connection = manager.connect_drop_target(id, square.node(), DropTargetOptions::default());
    }

    let event = |kind, square: Square, with_piece| {
        InputEvent::drag(kind, square.center(), &square.path(with_piece))
    };

    let start = manager.handle_event(&event(InputEventKind::DragStart, b1, true));
    println!("dragstart: drag image {:?}", start.drag_image);

    let mut now = 0.0;
    for name in ["b2", "a3", "c3"] {
        let square = Square::parse(name).unwrap();
        manager.handle_event(&event(InputEventKind::DragEnter, square, false));
        let over = manager.handle_event(&event(InputEventKind::DragOver, square, false));
        now += 16.0;
        manager.on_frame(now);
        let monitor = manager.monitor();
        let accepts = monitor
            .target_ids()
            .first()
            .is_some_and(|id| monitor.can_drop_on_target(*id));
        println!(
            "over {name}: drop effect {:?}, accepts: {accepts}",
            over.drop_effect
        );
    }

    let c3 = Square::parse("c3").unwrap();
    manager.handle_event(&event(InputEventKind::Drop, c3, false));
    manager.handle_event(&event(InputEventKind::DragEnd, b1, true));
    println!("knight now on {}", knight_at.get().name());
}
