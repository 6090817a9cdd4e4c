// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement of the drag image under the pointer.
//!
//! The platform draws the drag image so that a chosen point of the image
//! stays under the pointer. By default that point keeps the grab position: a
//! piece grabbed at its lower-left corner is dragged by its lower-left corner.
//! When the preview is larger or smaller than the source, the anchor decides
//! how the grab point maps onto it:
//!
//! - anchor `0.0`: keep the distance to the leading edge;
//! - anchor `0.5`: scale the grab point proportionally;
//! - anchor `1.0`: keep the distance to the trailing edge.
//!
//! Anchors in between are interpolated with a monotone cubic through those
//! three points. Fixed offsets in [`DragPreviewOptions`] override the anchor.

use kurbo::{Point, Rect, Vec2};
use understory_dnd::backend::DragPreviewOptions;

/// Monotone cubic (Fritsch–Carlson) interpolation through three points.
#[derive(Clone, Debug)]
struct MonotonicInterpolant {
    xs: [f64; 3],
    ys: [f64; 3],
    c1s: [f64; 3],
    c2s: [f64; 2],
    c3s: [f64; 2],
}

impl MonotonicInterpolant {
    /// `xs` must be strictly increasing.
    fn new(xs: [f64; 3], ys: [f64; 3]) -> Self {
        let dxs = [xs[1] - xs[0], xs[2] - xs[1]];
        let ms = [(ys[1] - ys[0]) / dxs[0], (ys[2] - ys[1]) / dxs[1]];

        let middle = if ms[0] * ms[1] <= 0.0 {
            0.0
        } else {
            let common = dxs[0] + dxs[1];
            3.0 * common / ((common + dxs[1]) / ms[0] + (common + dxs[0]) / ms[1])
        };
        let c1s = [ms[0], middle, ms[1]];

        let mut c2s = [0.0; 2];
        let mut c3s = [0.0; 2];
        for i in 0..2 {
            let inv_dx = 1.0 / dxs[i];
            let common = c1s[i] + c1s[i + 1] - ms[i] - ms[i];
            c2s[i] = (ms[i] - c1s[i] - common) * inv_dx;
            c3s[i] = common * inv_dx * inv_dx;
        }
        Self {
            xs,
            ys,
            c1s,
            c2s,
            c3s,
        }
    }

    fn interpolate(&self, x: f64) -> f64 {
        if let Some(i) = self.xs.iter().position(|&xi| xi == x) {
            return self.ys[i];
        }
        let i = usize::from(x > self.xs[1]);
        let diff = x - self.xs[i];
        let diff_sq = diff * diff;
        self.ys[i] + self.c1s[i] * diff + self.c2s[i] * diff_sq + self.c3s[i] * diff * diff_sq
    }
}

fn anchored(anchor: f64, grab: f64, source_len: f64, preview_len: f64) -> f64 {
    if source_len == 0.0 {
        return grab;
    }
    let interpolant = MonotonicInterpolant::new(
        [0.0, 0.5, 1.0],
        [
            grab,
            grab / source_len * preview_len,
            grab + preview_len - source_len,
        ],
    );
    interpolant.interpolate(anchor)
}

/// Position of the pointer inside the drag image.
///
/// `source` and `preview` are client rects; `client_offset` is the pointer.
#[must_use]
pub fn drag_preview_offset(
    source: Rect,
    preview: Rect,
    client_offset: Point,
    options: &DragPreviewOptions,
) -> Point {
    let grab: Vec2 = client_offset - preview.origin();
    let x = options.offset_x.unwrap_or_else(|| {
        anchored(options.anchor_x, grab.x, source.width(), preview.width())
    });
    let y = options.offset_y.unwrap_or_else(|| {
        anchored(options.anchor_y, grab.y, source.height(), preview.height())
    });
    Point::new(x, y)
}
