// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch and mouse gestures driven through `TouchBackend`.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use serde_json::json;
use understory_dnd::backend::{
    DragSourceOptions, DropTargetOptions, NoGeometry, NodeGeometry, NodeId,
};
use understory_dnd::handler::{DragSource, DropTarget};
use understory_dnd::id::HandlerId;
use understory_dnd::input::{InputEvent, InputEventKind, Key};
use understory_dnd::item::DragItem;
use understory_dnd::manager::DragDropManager;
use understory_dnd::monitor::DragDropMonitor;
use understory_dnd_backends::touch::{AngleRange, TouchBackend, TouchBackendOptions};

const BOARD: NodeId = NodeId(1);
const SQUARE_A: NodeId = NodeId(2);
const SQUARE_B: NodeId = NodeId(3);
const PIECE: NodeId = NodeId(4);

#[derive(Default)]
struct Piece {
    ends: Rc<RefCell<Vec<bool>>>,
}

impl DragSource for Piece {
    fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
        true
    }

    fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
        Some(DragItem::new(json!({})))
    }

    fn end_drag(&self, monitor: &DragDropMonitor<'_>, _: HandlerId) {
        self.ends.borrow_mut().push(monitor.did_drop());
    }
}

struct Square;

impl DropTarget for Square {}

struct Board {
    manager: DragDropManager,
    ends: Rc<RefCell<Vec<bool>>>,
    board: HandlerId,
    a: HandlerId,
    b: HandlerId,
}

fn board(options: TouchBackendOptions) -> Board {
    board_in(NoGeometry, options)
}

fn board_in(geometry: impl NodeGeometry + 'static, options: TouchBackendOptions) -> Board {
    let mut manager = DragDropManager::with_backend(TouchBackend::new(geometry, options));
    let piece = Piece::default();
    let ends = piece.ends.clone();
    let piece = manager.add_source("piece", piece).unwrap();
    let board = manager.add_target("piece", Square).unwrap();
    let a = manager.add_target("piece", Square).unwrap();
    let b = manager.add_target("piece", Square).unwrap();
    let _connection = manager.connect_drag_source(piece, PIECE, DragSourceOptions::default());
    let _connection = manager.connect_drop_target(board, BOARD, DropTargetOptions::default());
    let _connection = manager.connect_drop_target(a, SQUARE_A, DropTargetOptions::default());
    let _connection = manager.connect_drop_target(b, SQUARE_B, DropTargetOptions::default());
    Board {
        manager,
        ends,
        board,
        a,
        b,
    }
}

const PIECE_PATH: &[NodeId] = &[BOARD, SQUARE_A, PIECE];

fn touch(kind: InputEventKind, x: f64, y: f64, path: &[NodeId]) -> InputEvent {
    InputEvent::touch(kind, Point::new(x, y), path)
}

fn press(x: f64, y: f64) -> InputEvent {
    touch(InputEventKind::TouchStart, x, y, PIECE_PATH)
}

fn move_to(x: f64, y: f64, path: &[NodeId]) -> InputEvent {
    touch(InputEventKind::TouchMove, x, y, path)
}

#[test]
fn drag_begins_past_the_slop() {
    let Board {
        mut manager, b, ..
    } = board(TouchBackendOptions {
        touch_slop: 10.0,
        ..TouchBackendOptions::default()
    });
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(5.0, 0.0, PIECE_PATH));
    assert!(!manager.monitor().is_dragging());

    let response = manager.handle_event(&move_to(20.0, 0.0, &[SQUARE_B]));
    assert!(response.prevent_default);
    let monitor = manager.monitor();
    assert!(monitor.is_dragging());
    assert!(monitor.is_source_public());
    assert_eq!(monitor.initial_client_offset(), Some(Point::ORIGIN));
    assert_eq!(monitor.client_offset(), Some(Point::new(20.0, 0.0)));
    assert_eq!(monitor.target_ids(), &[b]);
}

#[test]
fn release_drops_and_ends() {
    let Board {
        mut manager,
        ends,
        board,
        a,
        ..
    } = board(TouchBackendOptions::default());
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, &[BOARD, SQUARE_A]));
    assert_eq!(manager.monitor().target_ids(), &[board, a]);

    manager.handle_event(&touch(InputEventKind::TouchEnd, 30.0, 0.0, &[BOARD, SQUARE_A]));
    assert!(!manager.monitor().is_dragging());
    assert_eq!(*ends.borrow(), [true]);
}

#[test]
fn release_without_a_drag_does_nothing() {
    let Board {
        mut manager, ends, ..
    } = board(TouchBackendOptions::default());
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&touch(InputEventKind::TouchEnd, 0.0, 0.0, PIECE_PATH));
    assert!(!manager.monitor().is_dragging());
    assert!(ends.borrow().is_empty());
}

#[test]
fn moving_during_the_start_delay_cancels_the_press() {
    let Board { mut manager, .. } =
        board(TouchBackendOptions::default().with_delay(200.0));
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, PIECE_PATH).with_timestamp(100.0));
    manager.handle_event(&move_to(40.0, 0.0, PIECE_PATH).with_timestamp(300.0));
    assert!(!manager.monitor().is_dragging());
}

#[test]
fn start_delay_elapses_on_later_events_or_frames() {
    let Board { mut manager, .. } =
        board(TouchBackendOptions::default().with_delay(200.0));
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, PIECE_PATH).with_timestamp(250.0));
    assert!(manager.monitor().is_dragging());
    manager.handle_event(&touch(InputEventKind::TouchEnd, 30.0, 0.0, PIECE_PATH));

    manager.handle_event(&press(0.0, 0.0).with_timestamp(1000.0));
    manager.on_frame(1250.0);
    manager.handle_event(&move_to(1.0, 0.0, PIECE_PATH).with_timestamp(1260.0));
    assert!(manager.monitor().is_dragging());
}

#[test]
fn moves_in_a_scroll_angle_scroll_for_the_rest_of_the_gesture() {
    let Board { mut manager, .. } = board(TouchBackendOptions {
        scroll_angle_ranges: vec![AngleRange::new(60.0, 120.0), AngleRange::new(240.0, 300.0)],
        ..TouchBackendOptions::default()
    });
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(1.0, 30.0, PIECE_PATH));
    manager.handle_event(&move_to(40.0, 30.0, PIECE_PATH));
    assert!(!manager.monitor().is_dragging());
    manager.handle_event(&touch(InputEventKind::TouchEnd, 40.0, 30.0, PIECE_PATH));

    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(40.0, 1.0, PIECE_PATH));
    assert!(manager.monitor().is_dragging());
}

#[test]
fn mouse_input_is_opt_in() {
    let mouse = |kind, x| InputEvent::mouse(kind, Point::new(x, 0.0), PIECE_PATH);

    let Board { mut manager, .. } = board(TouchBackendOptions::default());
    manager.handle_event(&mouse(InputEventKind::MouseDown, 0.0));
    manager.handle_event(&mouse(InputEventKind::MouseMove, 30.0));
    assert!(!manager.monitor().is_dragging());

    let Board { mut manager, .. } = board(TouchBackendOptions::default().with_mouse());
    let secondary = InputEvent {
        button: Some(2),
        ..mouse(InputEventKind::MouseDown, 0.0)
    };
    manager.handle_event(&secondary);
    manager.handle_event(&mouse(InputEventKind::MouseMove, 30.0));
    assert!(!manager.monitor().is_dragging());

    manager.handle_event(&mouse(InputEventKind::MouseDown, 0.0));
    manager.handle_event(&mouse(InputEventKind::MouseMove, 30.0));
    assert!(manager.monitor().is_dragging());
    manager.handle_event(&mouse(InputEventKind::MouseUp, 30.0));
    assert!(!manager.monitor().is_dragging());
}

#[test]
fn escape_cancels_when_keyboard_is_enabled() {
    let escape = InputEvent {
        key: Some(Key::Escape),
        ..InputEvent::new(InputEventKind::KeyDown)
    };

    let Board {
        mut manager, ends, ..
    } = board(TouchBackendOptions::default());
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, PIECE_PATH));
    manager.handle_event(&escape);
    assert!(manager.monitor().is_dragging());
    assert!(ends.borrow().is_empty());

    let Board {
        mut manager, ends, ..
    } = board(TouchBackendOptions::default().with_keyboard());
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, PIECE_PATH));
    manager.handle_event(&escape);
    assert!(!manager.monitor().is_dragging());
    assert_eq!(*ends.borrow(), [false]);
}

#[test]
fn context_menu_ends_the_drag_unless_ignored() {
    let context_menu = InputEvent::new(InputEventKind::ContextMenu).over(PIECE_PATH);

    let Board { mut manager, .. } = board(TouchBackendOptions::default());
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, PIECE_PATH));
    manager.handle_event(&context_menu);
    assert!(!manager.monitor().is_dragging());

    let Board { mut manager, .. } = board(TouchBackendOptions {
        ignore_context_menu: true,
        ..TouchBackendOptions::default()
    });
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, PIECE_PATH));
    manager.handle_event(&context_menu);
    assert!(manager.monitor().is_dragging());
}

#[test]
fn hover_outside_target_keeps_the_enclosing_square() {
    let Board {
        mut manager,
        board: board_id,
        a,
        ..
    } = board(TouchBackendOptions {
        enable_hover_outside_target: true,
        ..TouchBackendOptions::default()
    });
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, &[BOARD]));
    assert_eq!(manager.monitor().target_ids(), &[board_id, a]);

    let Board {
        mut manager,
        board: board_id,
        ..
    } = board(TouchBackendOptions::default());
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, &[BOARD]));
    assert_eq!(manager.monitor().target_ids(), &[board_id]);
}

/// The piece leaves the tree as soon as it is picked up.
struct UnmountedPiece;

impl NodeGeometry for UnmountedPiece {
    fn client_rect(&self, _: NodeId) -> Option<Rect> {
        None
    }

    fn is_attached(&self, node: NodeId) -> bool {
        node != PIECE
    }
}

#[test]
fn drag_survives_the_source_node_leaving_the_tree() {
    let Board {
        mut manager,
        ends,
        b,
        ..
    } = board_in(UnmountedPiece, TouchBackendOptions::default());
    manager.handle_event(&press(0.0, 0.0));
    manager.handle_event(&move_to(30.0, 0.0, &[SQUARE_B]));
    assert!(manager.monitor().is_dragging());
    assert_eq!(manager.monitor().target_ids(), &[b]);

    manager.handle_event(&touch(InputEventKind::TouchEnd, 30.0, 0.0, &[SQUARE_B]));
    assert_eq!(*ends.borrow(), [true]);
}
