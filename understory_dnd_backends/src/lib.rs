// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd_backends --heading-base-level=0

//! Understory DnD Backends: input adapters for `understory_dnd`.
//!
//! A backend turns a host's native events into drag actions. This crate has
//! three, each behind a feature of the same name:
//!
//! - [`html5`]: platform drag-and-drop events (`dragstart` … `dragend`),
//!   including drags of files, links and text that begin outside the
//!   application ([`native`]).
//! - [`touch`]: press/move/release input from touch screens and, optionally,
//!   the mouse, with start delays, slop and scroll detection.
//! - [`multi`]: a pipeline of backends with rules for switching between them
//!   while nodes stay connected.
//!
//! Hosts describe events as [`InputEvent`](understory_dnd::input::InputEvent)s
//! carrying the root→target node path, and answer layout queries through
//! [`NodeGeometry`](understory_dnd::backend::NodeGeometry).
//!
//! ## Example
//!
//! A touch drag of a knight onto a square:
//!
//! ```rust
//! use kurbo::Point;
//! use serde_json::json;
//! use understory_dnd::backend::{NoGeometry, NodeId};
//! use understory_dnd::handler::{DragSource, DropTarget};
//! use understory_dnd::id::HandlerId;
//! use understory_dnd::input::{InputEvent, InputEventKind};
//! use understory_dnd::item::DragItem;
//! use understory_dnd::manager::DragDropManager;
//! use understory_dnd::monitor::DragDropMonitor;
//! use understory_dnd_backends::touch::{TouchBackend, TouchBackendOptions};
//!
//! struct Knight;
//! impl DragSource for Knight {
//!     fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool { true }
//!     fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
//!         Some(DragItem::new(json!({})))
//!     }
//!     fn end_drag(&self, monitor: &DragDropMonitor<'_>, _: HandlerId) {
//!         assert!(monitor.did_drop());
//!     }
//! }
//! struct Square;
//! impl DropTarget for Square {}
//!
//! const B1: NodeId = NodeId(1);
//! const C3: NodeId = NodeId(2);
//!
//! let mut manager =
//!     DragDropManager::with_backend(TouchBackend::new(NoGeometry, TouchBackendOptions::default()));
//! let knight = manager.add_source("knight", Knight).unwrap();
//! let c3 = manager.add_target("knight", Square).unwrap();
//! manager.connect_drag_source(knight, B1, Default::default());
//! manager.connect_drop_target(c3, C3, Default::default());
//!
//! let touch = |kind, x, node| InputEvent::touch(kind, Point::new(x, 0.0), &[node]);
//! manager.handle_event(&touch(InputEventKind::TouchStart, 0.0, B1));
//! manager.handle_event(&touch(InputEventKind::TouchMove, 40.0, C3));
//! assert!(manager.monitor().is_over_target(c3, true));
//! manager.handle_event(&touch(InputEventKind::TouchEnd, 40.0, C3));
//! assert!(!manager.monitor().is_dragging());
//! ```
//!
//! ## Features
//!
//! - `std` (default): build dependencies against the standard library.
//! - `libm`: `no_std` float math for Kurbo.
//! - `html5`, `touch`, `multi` (default): the backends.
//! - `serde`: derive `Serialize`/`Deserialize` for backend options.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

#[cfg(feature = "multi")]
pub mod error;
#[cfg(feature = "html5")]
pub mod html5;
#[cfg(feature = "multi")]
pub mod multi;
#[cfg(feature = "html5")]
pub mod native;
#[cfg(feature = "html5")]
pub mod preview;
#[cfg(feature = "touch")]
pub mod touch;

#[cfg(feature = "html5")]
mod enter_leave;
#[cfg(any(feature = "html5", feature = "touch"))]
mod path;
