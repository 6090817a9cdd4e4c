// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the drag lifecycle driven through `DragDropManager`.
//!
//! These exercise registration and backend setup, source resolution on
//! begin, hover filtering, drop bubbling and deferred source removal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::Point;
use serde_json::json;
use understory_dnd::actions::{BeginDragOptions, HoverOptions};
use understory_dnd::handler::{DragSource, DropTarget};
use understory_dnd::id::{HandlerId, ItemType};
use understory_dnd::input::{InputEvent, InputEventKind};
use understory_dnd::item::{DragItem, DropResult};
use understory_dnd::manager::DragDropManager;
use understory_dnd::monitor::DragDropMonitor;
use understory_dnd::test_backend::TestBackend;

#[derive(Default)]
struct Piece {
    locked: bool,
    cancels: bool,
    ends: Rc<Cell<u32>>,
}

impl DragSource for Piece {
    fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
        !self.locked
    }

    fn begin_drag(&self, _: &DragDropMonitor<'_>, id: HandlerId) -> Option<DragItem> {
        (!self.cancels).then(|| DragItem::new(json!({ "source": id.to_string() })))
    }

    fn end_drag(&self, monitor: &DragDropMonitor<'_>, _: HandlerId) {
        assert!(monitor.is_dragging());
        self.ends.set(self.ends.get() + 1);
    }
}

#[derive(Default)]
struct Square {
    refuses: bool,
    result: Option<&'static str>,
    hovers: Rc<Cell<u32>>,
    seen: Rc<RefCell<Vec<Option<DropResult>>>>,
}

impl DropTarget for Square {
    fn can_drop(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
        !self.refuses
    }

    fn hover(&self, _: &DragDropMonitor<'_>, _: HandlerId) {
        self.hovers.set(self.hovers.get() + 1);
    }

    fn drop(&self, monitor: &DragDropMonitor<'_>, _: HandlerId) -> Option<DropResult> {
        self.seen.borrow_mut().push(monitor.drop_result().cloned());
        self.result.map(|name| {
            let mut result = DropResult::new();
            result.insert("square".into(), json!(name));
            result
        })
    }
}

fn begin(manager: &mut DragDropManager, sources: &[HandlerId]) {
    manager.actions().begin_drag(sources, BeginDragOptions::default());
}

#[test]
fn ref_count_follows_registrations_and_toggles_backend_once() {
    let backend = TestBackend::new();
    let probe = backend.probe();
    let mut manager = DragDropManager::with_backend(backend);
    assert!(!manager.is_backend_active());

    let a = manager.add_source("piece", Piece::default()).unwrap();
    let b = manager.add_target("piece", Square::default()).unwrap();
    let c = manager.add_target(["piece", "pawn"], Square::default()).unwrap();
    assert_eq!(manager.state().ref_count, 3);
    assert_eq!((probe.borrow().setups, probe.borrow().teardowns), (1, 0));

    manager.remove_target(b);
    manager.remove_source(a);
    assert_eq!(manager.state().ref_count, 1);
    assert_eq!(probe.borrow().teardowns, 0);

    manager.remove_target(c);
    assert_eq!(manager.state().ref_count, 0);
    assert_eq!((probe.borrow().setups, probe.borrow().teardowns), (1, 1));

    manager.add_target("piece", Square::default()).unwrap();
    assert_eq!((probe.borrow().setups, probe.borrow().teardowns), (2, 1));
}

#[test]
fn registration_errors_leave_ref_count_alone() {
    let mut manager = DragDropManager::new();
    assert!(manager.add_source("", Piece::default()).is_err());
    assert!(manager.add_target(Vec::<ItemType>::new(), Square::default()).is_err());
    assert_eq!(manager.state().ref_count, 0);
}

#[test]
fn begin_with_no_sources_stays_idle() {
    let mut manager = DragDropManager::new();
    begin(&mut manager, &[]);
    assert!(!manager.monitor().is_dragging());
    assert_eq!(manager.monitor().client_offset(), None);
}

#[test]
fn begin_selects_the_source() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    begin(&mut manager, &[s]);

    let monitor = manager.monitor();
    assert!(monitor.is_dragging());
    assert_eq!(monitor.source_id(), Some(s));
    assert_eq!(monitor.item_type().map(|t| t.as_str()), Some("piece"));
    assert_eq!(
        monitor.item().and_then(|i| i.get("source")),
        Some(json!(s.to_string()))
    );
    assert!(monitor.is_dragging_source(s));
}

#[test]
fn innermost_draggable_source_wins() {
    let mut manager = DragDropManager::new();
    let outer = manager.add_source("piece", Piece::default()).unwrap();
    let middle = manager.add_source("piece", Piece::default()).unwrap();
    let inner = manager
        .add_source(
            "piece",
            Piece {
                locked: true,
                ..Piece::default()
            },
        )
        .unwrap();
    begin(&mut manager, &[outer, middle, inner]);
    assert_eq!(manager.monitor().source_id(), Some(middle));
}

#[test]
fn cancelled_begin_resets_coordinates() {
    let mut manager = DragDropManager::new();
    let s = manager
        .add_source(
            "piece",
            Piece {
                cancels: true,
                ..Piece::default()
            },
        )
        .unwrap();
    let origin: &dyn Fn(HandlerId) -> Option<Point> = &|_| Some(Point::new(0.0, 0.0));
    manager.actions().begin_drag(
        &[s],
        BeginDragOptions {
            client_offset: Some(Point::new(5.0, 5.0)),
            source_client_offset: Some(origin),
            ..BeginDragOptions::default()
        },
    );
    let monitor = manager.monitor();
    assert!(!monitor.is_dragging());
    assert_eq!(monitor.client_offset(), None);
    assert_eq!(monitor.initial_source_client_offset(), None);
}

#[test]
fn offsets_follow_the_pointer() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let origin: &dyn Fn(HandlerId) -> Option<Point> = &|_| Some(Point::new(10.0, 10.0));
    let mut actions = manager.actions();
    actions.begin_drag(
        &[s],
        BeginDragOptions {
            client_offset: Some(Point::new(12.0, 14.0)),
            source_client_offset: Some(origin),
            ..BeginDragOptions::default()
        },
    );
    actions.hover(
        &[],
        HoverOptions {
            client_offset: Some(Point::new(20.0, 24.0)),
        },
    );
    let monitor = actions.monitor();
    assert_eq!(
        monitor.difference_from_initial_offset(),
        Some(kurbo::Vec2::new(8.0, 10.0))
    );
    assert_eq!(monitor.source_client_offset(), Some(Point::new(18.0, 20.0)));
}

#[test]
fn unpublished_source_is_not_dragging_until_published() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(
        &[s],
        BeginDragOptions {
            publish_source: false,
            ..BeginDragOptions::default()
        },
    );
    assert!(!actions.monitor().is_dragging_source(s));
    actions.publish_drag_source();
    assert!(actions.monitor().is_dragging_source(s));
}

#[test]
fn nested_targets_report_shallow_and_deep_hover() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let a = manager.add_target("piece", Square::default()).unwrap();
    let b = manager.add_target("piece", Square::default()).unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.hover(&[a, b], HoverOptions::default());

    let monitor = actions.monitor();
    assert!(!monitor.is_over_target(a, true));
    assert!(monitor.is_over_target(b, true));
    assert!(monitor.is_over_target(a, false));
    assert!(monitor.is_over_target(b, false));
}

#[test]
fn hover_skips_targets_of_other_types() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let pawn_hovers = Rc::new(Cell::new(0));
    let piece = manager.add_target("piece", Square::default()).unwrap();
    let pawn = manager
        .add_target(
            "pawn",
            Square {
                hovers: pawn_hovers.clone(),
                ..Square::default()
            },
        )
        .unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.hover(&[piece, pawn], HoverOptions::default());
    assert_eq!(actions.monitor().target_ids(), &[piece]);
    assert_eq!(pawn_hovers.get(), 0);
}

#[test]
#[should_panic(expected = "Expected targetIds to be unique in the passed array.")]
fn hover_rejects_duplicates() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let t = manager.add_target("piece", Square::default()).unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.hover(&[t, t], HoverOptions::default());
}

#[test]
#[should_panic(expected = "Cannot call hover while not dragging.")]
fn hover_while_idle_panics() {
    let mut manager = DragDropManager::new();
    let t = manager.add_target("piece", Square::default()).unwrap();
    manager.actions().hover(&[t], HoverOptions::default());
}

#[test]
#[should_panic(expected = "Cannot call beginDrag while dragging.")]
fn begin_while_dragging_panics() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    begin(&mut manager, &[s]);
    begin(&mut manager, &[s]);
}

#[test]
#[should_panic(expected = "Cannot call drop twice during one drag operation.")]
fn second_drop_panics() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.drop(DropResult::new());
    actions.drop(DropResult::new());
}

#[test]
#[should_panic(expected = "Cannot call hover after drop.")]
fn hover_after_drop_panics() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.drop(DropResult::new());
    actions.hover(&[], HoverOptions::default());
}

#[test]
fn drop_without_targets_records_empty_result() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.drop(DropResult::new());
    let monitor = actions.monitor();
    assert!(monitor.did_drop());
    assert_eq!(monitor.drop_result(), Some(&DropResult::new()));
}

#[test]
fn drop_bubbles_innermost_first() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let board_seen = Rc::new(RefCell::new(Vec::new()));
    let square_seen = Rc::new(RefCell::new(Vec::new()));
    let board = manager
        .add_target(
            "piece",
            Square {
                seen: board_seen.clone(),
                ..Square::default()
            },
        )
        .unwrap();
    let square = manager
        .add_target(
            "piece",
            Square {
                result: Some("e4"),
                seen: square_seen.clone(),
                ..Square::default()
            },
        )
        .unwrap();

    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.hover(&[board, square], HoverOptions::default());
    let mut options = DropResult::new();
    options.insert("dropEffect".into(), json!("move"));
    actions.drop(options);

    // The square ran first and saw nothing; the board saw the square's result.
    assert_eq!(*square_seen.borrow(), [None]);
    let board_view = board_seen.borrow();
    assert_eq!(board_view.len(), 1);
    let inherited = board_view[0].as_ref().unwrap();
    assert_eq!(inherited["square"], json!("e4"));
    assert_eq!(inherited["dropEffect"], json!("move"));

    let monitor = actions.monitor();
    assert!(monitor.did_drop());
    assert_eq!(monitor.drop_result().unwrap()["square"], json!("e4"));
    assert!(monitor.target_ids().is_empty());
}

#[test]
fn refusing_target_is_skipped_on_drop() {
    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Piece::default()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let open = manager
        .add_target(
            "piece",
            Square {
                result: Some("a1"),
                ..Square::default()
            },
        )
        .unwrap();
    let occupied = manager
        .add_target(
            "piece",
            Square {
                refuses: true,
                seen: seen.clone(),
                ..Square::default()
            },
        )
        .unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.hover(&[open, occupied], HoverOptions::default());
    actions.drop(DropResult::new());
    assert!(seen.borrow().is_empty());
    assert_eq!(actions.monitor().drop_result().unwrap()["square"], json!("a1"));
}

#[test]
fn end_drag_returns_to_idle_and_calls_source() {
    let ends = Rc::new(Cell::new(0));
    let mut manager = DragDropManager::new();
    let s = manager
        .add_source(
            "piece",
            Piece {
                ends: ends.clone(),
                ..Piece::default()
            },
        )
        .unwrap();
    begin(&mut manager, &[s]);
    manager.actions().end_drag();
    assert_eq!(ends.get(), 1);
    assert!(!manager.monitor().is_dragging());
    assert_eq!(manager.registry().pinned_source(), None);
}

#[test]
fn removed_source_survives_until_end_drag() {
    let ends = Rc::new(Cell::new(0));
    let mut manager = DragDropManager::new();
    let s = manager
        .add_source(
            "piece",
            Piece {
                ends: ends.clone(),
                ..Piece::default()
            },
        )
        .unwrap();
    begin(&mut manager, &[s]);
    manager.remove_source(s);

    // Same turn: the entry is still in the table.
    assert!(manager.registry().contains_source(s));
    assert!(manager.registry().is_removal_pending(s));
    assert_eq!(manager.state().ref_count, 0);

    let mut actions = manager.actions();
    let monitor = actions.monitor();
    assert!(!monitor.registry().contains_source(s));
    assert_eq!(monitor.source_id(), Some(s));
    assert!(monitor.is_dragging_source(s));
    actions.end_drag();

    assert_eq!(ends.get(), 1);
    assert!(!manager.monitor().is_dragging());
}

#[test]
fn hovering_target_may_update_the_item() {
    struct Reorder;
    impl DropTarget for Reorder {
        fn hover(&self, monitor: &DragDropMonitor<'_>, _: HandlerId) {
            if let Some(item) = monitor.item() {
                item.borrow_mut()["index"] = json!(3);
            }
        }
    }

    let mut manager = DragDropManager::new();
    let s = manager.add_source("row", Piece::default()).unwrap();
    let list = manager.add_target("row", Reorder).unwrap();
    let mut actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default());
    actions.hover(&[list], HoverOptions::default());
    assert_eq!(actions.monitor().item().and_then(|i| i.get("index")), Some(json!(3)));
}

#[test]
#[should_panic(expected = "inside your can_drag() implementation")]
fn recursive_can_drag_panics() {
    struct Nosy;
    impl DragSource for Nosy {
        fn can_drag(&self, monitor: &DragDropMonitor<'_>, id: HandlerId) -> bool {
            monitor.can_drag_source(id)
        }
        fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
            None
        }
        fn end_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) {}
    }

    let mut manager = DragDropManager::new();
    let s = manager.add_source("piece", Nosy).unwrap();
    begin(&mut manager, &[s]);
}

#[test]
fn events_reach_the_backend_only_while_set_up() {
    let backend = TestBackend::new();
    let probe = backend.probe();
    let mut manager = DragDropManager::with_backend(backend);
    let event = InputEvent::new(InputEventKind::MouseDown);

    manager.handle_event(&event);
    manager.on_frame(16.0);
    assert!(probe.borrow().events.is_empty());

    manager.add_target("piece", Square::default()).unwrap();
    manager.handle_event(&event);
    manager.on_frame(32.0);
    assert_eq!(probe.borrow().events, [InputEventKind::MouseDown]);
    assert_eq!(probe.borrow().frames, [32.0]);
}
