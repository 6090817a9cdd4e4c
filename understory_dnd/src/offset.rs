// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag offsets: where the pointer and the dragged source started, and where the pointer is now.
//!
//! Only the three raw points are stored. Everything else is derived:
//!
//! - [`DragOffset::difference_from_initial`]: how far the pointer moved since the drag began.
//! - [`DragOffset::source_client_offset`]: where the source's origin would be if it followed the pointer.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_dnd::offset::DragOffset;
//!
//! // Pointer pressed at (10, 20) on a source whose origin is (0, 0).
//! let mut offset = DragOffset::begin(Some(Point::new(10.0, 20.0)), Some(Point::ORIGIN));
//!
//! // Pointer moves to (15, 25).
//! offset.client_offset = Some(Point::new(15.0, 25.0));
//!
//! assert_eq!(offset.difference_from_initial(), Some(Vec2::new(5.0, 5.0)));
//! assert_eq!(offset.source_client_offset(), Some(Point::new(5.0, 5.0)));
//! ```

use kurbo::{Point, Vec2};

/// Pointer and source coordinates for the drag in progress.
///
/// All fields are `None` while no drag is active.
#[derive(Debug, Clone, Default, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragOffset {
    /// Pointer position when the drag began.
    pub initial_client_offset: Option<Point>,
    /// Origin of the source node when the drag began.
    pub initial_source_client_offset: Option<Point>,
    /// Latest pointer position.
    pub client_offset: Option<Point>,
}

impl DragOffset {
    /// Offsets for a drag that starts with the pointer at `client_offset`.
    #[must_use]
    pub fn begin(client_offset: Option<Point>, source_client_offset: Option<Point>) -> Self {
        Self {
            initial_client_offset: client_offset,
            initial_source_client_offset: source_client_offset,
            client_offset,
        }
    }

    /// Pointer movement since the drag began.
    #[must_use]
    pub fn difference_from_initial(&self) -> Option<Vec2> {
        Some(self.client_offset? - self.initial_client_offset?)
    }

    /// Current position of the source origin, keeping its initial distance to the pointer.
    #[must_use]
    pub fn source_client_offset(&self) -> Option<Point> {
        let client = self.client_offset?;
        let initial_client = self.initial_client_offset?;
        let initial_source = self.initial_source_client_offset?;
        Some(initial_source + (client - initial_client))
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_offset_is_empty() {
        let offset = DragOffset::default();
        assert!(offset.is_empty());
        assert_eq!(offset.difference_from_initial(), None);
        assert_eq!(offset.source_client_offset(), None);
    }

    #[test]
    fn begin_sets_initial_and_current() {
        let start = Point::new(10.0, 20.0);
        let offset = DragOffset::begin(Some(start), None);

        assert_eq!(offset.initial_client_offset, Some(start));
        assert_eq!(offset.client_offset, Some(start));
        assert_eq!(offset.difference_from_initial(), Some(Vec2::ZERO));
    }

    #[test]
    fn source_offset_needs_all_three_points() {
        let offset = DragOffset::begin(Some(Point::new(10.0, 20.0)), None);
        assert_eq!(offset.source_client_offset(), None);
    }

    #[test]
    fn source_offset_keeps_grab_distance() {
        let mut offset =
            DragOffset::begin(Some(Point::new(110.0, 120.0)), Some(Point::new(100.0, 100.0)));
        offset.client_offset = Some(Point::new(150.0, 130.0));

        assert_eq!(offset.source_client_offset(), Some(Point::new(140.0, 110.0)));
    }

    #[test]
    fn negative_movement_deltas() {
        let mut offset = DragOffset::begin(Some(Point::new(100.0, 100.0)), None);
        offset.client_offset = Some(Point::new(90.0, 85.0));

        assert_eq!(offset.difference_from_initial(), Some(Vec2::new(-10.0, -15.0)));
    }

    #[test]
    fn fractional_coordinates() {
        let mut offset = DragOffset::begin(Some(Point::new(1.5, 2.7)), None);
        offset.client_offset = Some(Point::new(3.2, 4.1));

        let delta = offset.difference_from_initial().unwrap();
        assert!((delta.x - 1.7).abs() < f64::EPSILON * 10.0);
        assert!((delta.y - 1.4).abs() < f64::EPSILON * 10.0);
    }
}
