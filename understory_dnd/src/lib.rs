// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd --heading-base-level=0

//! Understory DnD: a drag-and-drop coordination engine.
//!
//! The engine decouples *what* is dragged and *where* it may land from *how*
//! the platform reports input. Applications register drag sources and drop
//! targets; an input [`Backend`](backend::Backend) turns native events into a
//! small set of actions; a pure state machine records the drag; subscribers
//! hear about the changes that concern them.
//!
//! ```text
//! InputEvent ─▶ Backend ─▶ DragDropActions ─▶ reduce ─▶ Store ─▶ subscribers
//!                               │                          │
//!                               ▼                          ▼
//!                       DragSource/DropTarget ◀── DragDropMonitor
//! ```
//!
//! - [`id`]: handler ids (`S1`, `T2`, ...) and item types.
//! - [`registry`]: the handler table, with deferred source removal.
//! - [`handler`]: the [`DragSource`](handler::DragSource) and
//!   [`DropTarget`](handler::DropTarget) contracts.
//! - [`reducer`]: actions and the pure reducer.
//! - [`store`]: state container with filtered subscriptions.
//! - [`monitor`]: read-only queries over the state.
//! - [`actions`]: validated action creators.
//! - [`manager`]: ties everything to one backend.
//! - [`backend`] and [`input`]: the backend contract and the native event model.
//! - [`connector`]: keeps node bindings in sync with a backend.
//!
//! ## Example
//!
//! A knight dragged onto a square nested inside a board:
//!
//! ```rust
//! use serde_json::json;
//! use understory_dnd::handler::{DragSource, DropTarget};
//! use understory_dnd::id::HandlerId;
//! use understory_dnd::item::{DragItem, DropResult};
//! use understory_dnd::manager::DragDropManager;
//! use understory_dnd::monitor::DragDropMonitor;
//!
//! struct Knight;
//! impl DragSource for Knight {
//!     fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool { true }
//!     fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
//!         Some(DragItem::new(json!({ "from": "b1" })))
//!     }
//!     fn end_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) {}
//! }
//!
//! struct Square(&'static str);
//! impl DropTarget for Square {
//!     fn drop(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DropResult> {
//!         let mut result = DropResult::new();
//!         result.insert("to".into(), json!(self.0));
//!         Some(result)
//!     }
//! }
//!
//! struct Board;
//! impl DropTarget for Board {}
//!
//! let mut manager = DragDropManager::new();
//! let knight = manager.add_source("knight", Knight).unwrap();
//! let board = manager.add_target("knight", Board).unwrap();
//! let c3 = manager.add_target("knight", Square("c3")).unwrap();
//!
//! let mut actions = manager.actions();
//! actions.begin_drag(&[knight], Default::default());
//! actions.hover(&[board, c3], Default::default());
//!
//! let monitor = actions.monitor();
//! assert!(monitor.is_over_target(board, false));
//! assert!(!monitor.is_over_target(board, true));
//! assert!(monitor.is_over_target(c3, true));
//!
//! actions.drop(Default::default());
//! // The board produced nothing, so the square's result carries through.
//! assert_eq!(actions.monitor().drop_result().unwrap()["to"], json!("c3"));
//! actions.end_drag();
//! ```
//!
//! ## Turns
//!
//! Everything runs on one thread. Each manager call is a turn; removals of
//! drag sources requested in one turn take effect at the start of the next,
//! so a source that unregisters itself from inside a callback can still be
//! asked whether it is dragging.
//!
//! ## Features
//!
//! - `std` (default): build Kurbo and `serde_json` against the standard library.
//! - `libm`: `no_std` float math for Kurbo.
//! - `serde`: derive `Serialize`/`Deserialize` for ids, item types, events and options.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod actions;
pub mod backend;
pub mod connector;
pub mod error;
pub mod handler;
pub mod id;
pub mod input;
pub mod item;
pub mod manager;
pub mod monitor;
pub mod offset;
pub mod reducer;
pub mod registry;
pub mod store;
pub mod test_backend;
