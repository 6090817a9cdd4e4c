// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag payloads: the dragged item and drop results.

use alloc::rc::Rc;
use core::cell::{Ref, RefCell, RefMut};

use serde_json::{Map, Value};

/// Result produced by drop targets, merged over the options passed to
/// [`DragDropActions::drop`](crate::actions::DragDropActions::drop).
pub type DropResult = Map<alloc::string::String, Value>;

/// The item describing an in-progress drag.
///
/// Items are JSON objects behind a shared handle: every clone refers to the
/// same object, so a target may update the item while hovering (for example
/// to track the index a sortable row moved to) and later readers observe the
/// change. Sources return a fresh item from
/// [`DragSource::begin_drag`](crate::handler::DragSource::begin_drag).
///
/// ```
/// use serde_json::json;
/// use understory_dnd::item::DragItem;
///
/// let item = DragItem::new(json!({ "square": "e2" }));
/// let alias = item.clone();
/// alias.borrow_mut()["square"] = json!("e4");
/// assert_eq!(item.get("square"), Some(json!("e4")));
/// ```
#[derive(Clone, Debug)]
pub struct DragItem(Rc<RefCell<Value>>);

impl DragItem {
    /// Wrap a JSON value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Borrow the item.
    ///
    /// # Panics
    ///
    /// Panics if the item is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    /// Mutably borrow the item.
    ///
    /// # Panics
    ///
    /// Panics if the item is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Value> {
        self.0.borrow_mut()
    }

    /// Returns a copy of the field `key`, if the item is an object containing it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    /// Returns a copy of the whole item.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.0.borrow().clone()
    }

    /// Returns `true` if the item is a JSON object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.0.borrow().is_object()
    }

    /// Returns `true` if both handles refer to the same item.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Value> for DragItem {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl PartialEq for DragItem {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}
