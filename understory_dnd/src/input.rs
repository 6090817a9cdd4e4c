// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native input events as seen by backends.
//!
//! Hosts translate their platform events (DOM, winit, a test script) into
//! [`InputEvent`]s. The engine does not hit test: each event carries the
//! root→target [`NodeId`] path under the pointer (for example produced by
//! `understory_responder`), and backends match connected nodes against it.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use smallvec::SmallVec;

use crate::backend::NodeId;

/// Which native event occurred.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputEventKind {
    /// A mouse button was pressed.
    MouseDown,
    /// The mouse moved.
    MouseMove,
    /// A mouse button was released.
    MouseUp,
    /// A touch began.
    TouchStart,
    /// A touch moved.
    TouchMove,
    /// A touch ended.
    TouchEnd,
    /// A pointer (of any [`PointerType`]) was pressed.
    PointerDown,
    /// A platform drag started.
    DragStart,
    /// A platform drag entered a node.
    DragEnter,
    /// A platform drag moved over a node.
    DragOver,
    /// A platform drag left a node.
    DragLeave,
    /// A platform drag was dropped.
    Drop,
    /// A platform drag finished.
    DragEnd,
    /// A key was pressed.
    KeyDown,
    /// A context menu was requested.
    ContextMenu,
}

impl InputEventKind {
    /// The DOM event name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::PointerDown => "pointerdown",
            Self::DragStart => "dragstart",
            Self::DragEnter => "dragenter",
            Self::DragOver => "dragover",
            Self::DragLeave => "dragleave",
            Self::Drop => "drop",
            Self::DragEnd => "dragend",
            Self::KeyDown => "keydown",
            Self::ContextMenu => "contextmenu",
        }
    }

    /// Returns `true` for `mouse*` events.
    #[must_use]
    pub const fn is_mouse(self) -> bool {
        matches!(self, Self::MouseDown | Self::MouseMove | Self::MouseUp)
    }

    /// Returns `true` for `touch*` events.
    #[must_use]
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::TouchStart | Self::TouchMove | Self::TouchEnd)
    }

    /// Returns `true` for platform drag-and-drop events.
    #[must_use]
    pub const fn is_drag(self) -> bool {
        matches!(
            self,
            Self::DragStart
                | Self::DragEnter
                | Self::DragOver
                | Self::DragLeave
                | Self::Drop
                | Self::DragEnd
        )
    }
}

/// Kind of device behind a pointer event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerType {
    /// A mouse.
    Mouse,
    /// A pen or stylus.
    Pen,
    /// A finger.
    Touch,
}

/// Keys the backends react to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    /// The Escape key.
    Escape,
    /// Any other key, by name.
    Other(String),
}

/// Drop effect shown to the user and reported to drop targets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DropEffect {
    /// Dropping is not allowed.
    None,
    /// The item is copied.
    Copy,
    /// The item is linked.
    Link,
    /// The item is moved.
    #[default]
    Move,
}

impl DropEffect {
    /// The DOM `dropEffect` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Copy => "copy",
            Self::Link => "link",
            Self::Move => "move",
        }
    }
}

/// A file carried by a platform drag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragFile {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
}

/// Data carried by a platform drag.
///
/// `types` lists the formats the platform advertises. Browsers advertise
/// formats during the whole drag but only release their data on drop, so
/// `data` and `files` may be empty until then.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataTransfer {
    /// Advertised formats.
    pub types: Vec<String>,
    /// Data by format.
    pub data: Vec<(String, String)>,
    /// Files being dragged.
    pub files: Vec<DragFile>,
}

impl DataTransfer {
    /// Create an empty data transfer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data for `format`, advertising it if needed.
    pub fn set_data(&mut self, format: &str, data: &str) {
        if !self.types.iter().any(|t| t == format) {
            self.types.push(String::from(format));
        }
        match self.data.iter_mut().find(|(f, _)| f == format) {
            Some((_, d)) => *d = String::from(data),
            None => self.data.push((String::from(format), String::from(data))),
        }
    }

    /// Returns the data for `format`, or `""`.
    #[must_use]
    pub fn get_data(&self, format: &str) -> &str {
        self.data
            .iter()
            .find(|(f, _)| f == format)
            .map_or("", |(_, d)| d.as_str())
    }

    /// Add a file, advertising the `Files` format.
    pub fn add_file(&mut self, file: DragFile) {
        if !self.types.iter().any(|t| t == "Files") {
            self.types.push(String::from("Files"));
        }
        self.files.push(file);
    }

    /// Returns `true` if `format` is advertised.
    #[must_use]
    pub fn has_type(&self, format: &str) -> bool {
        self.types.iter().any(|t| t == format)
    }
}

/// A native input event.
#[derive(Clone, Debug, PartialEq)]
pub struct InputEvent {
    /// Which event occurred.
    pub kind: InputEventKind,
    /// Root→target path of nodes under the pointer (or the focused node for keys).
    pub path: SmallVec<[NodeId; 8]>,
    /// Pointer position in client coordinates.
    pub position: Option<Point>,
    /// Event time in milliseconds.
    pub timestamp: f64,
    /// Mouse button (`0` is the primary button).
    pub button: Option<u16>,
    /// Whether Alt was held.
    pub alt_key: bool,
    /// Key for keyboard events.
    pub key: Option<Key>,
    /// Active touch points, set for touch events only.
    pub touches: Option<SmallVec<[Point; 2]>>,
    /// Pointer device for pointer events.
    pub pointer_type: Option<PointerType>,
    /// Data carried by platform drags.
    pub data_transfer: Option<DataTransfer>,
}

impl InputEvent {
    /// An event of `kind` with no path, position or payload.
    #[must_use]
    pub fn new(kind: InputEventKind) -> Self {
        Self {
            kind,
            path: SmallVec::new(),
            position: None,
            timestamp: 0.0,
            button: None,
            alt_key: false,
            key: None,
            touches: None,
            pointer_type: None,
            data_transfer: None,
        }
    }

    /// A mouse event at `position` over `path`, with the primary button.
    #[must_use]
    pub fn mouse(kind: InputEventKind, position: Point, path: &[NodeId]) -> Self {
        Self {
            button: Some(0),
            ..Self::new(kind).at(position).over(path)
        }
    }

    /// A single-finger touch event at `position` over `path`.
    ///
    /// `TouchEnd` events carry an empty touch list.
    #[must_use]
    pub fn touch(kind: InputEventKind, position: Point, path: &[NodeId]) -> Self {
        let touches = if kind == InputEventKind::TouchEnd {
            SmallVec::new()
        } else {
            smallvec::smallvec![position]
        };
        Self {
            touches: Some(touches),
            ..Self::new(kind).at(position).over(path)
        }
    }

    /// A platform drag event at `position` over `path`.
    #[must_use]
    pub fn drag(kind: InputEventKind, position: Point, path: &[NodeId]) -> Self {
        Self {
            data_transfer: Some(DataTransfer::new()),
            ..Self::new(kind).at(position).over(path)
        }
    }

    /// Set the pointer position.
    #[must_use]
    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the root→target path.
    #[must_use]
    pub fn over(mut self, path: &[NodeId]) -> Self {
        self.path = SmallVec::from_slice(path);
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the data transfer.
    #[must_use]
    pub fn with_data_transfer(mut self, data_transfer: DataTransfer) -> Self {
        self.data_transfer = Some(data_transfer);
        self
    }

    /// The innermost node, if any.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.path.last().copied()
    }

    /// Returns `true` for events that carry the primary button or none at all.
    #[must_use]
    pub fn is_primary_button(&self) -> bool {
        self.button.is_none_or(|b| b == 0)
    }
}
