// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler registry: the table of registered sources and targets.
//!
//! The registry only stores handlers. Registration through the
//! [`DragDropManager`](crate::manager::DragDropManager) additionally dispatches
//! the matching `Add*`/`Remove*` actions so the reference count stays current.
//!
//! ## Deferred source removal
//!
//! Removing a source does not delete its entry right away. The id is queued
//! and the entry stays resolvable until [`HandlerRegistry::flush_removals`],
//! which the manager runs at the start of the next turn. Independently, the
//! source of the drag in progress is pinned, so it stays resolvable through
//! [`HandlerRegistry::source_or_pinned`] until the drag ends even after the
//! table entry is gone.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::error::RegistrationError;
use crate::handler::{DragSource, DropTarget};
use crate::id::{HandlerId, HandlerRole, ItemType, TargetTypes};

#[derive(Clone)]
struct SourceEntry {
    ty: ItemType,
    handler: Rc<dyn DragSource>,
}

#[derive(Clone)]
struct TargetEntry {
    types: TargetTypes,
    handler: Rc<dyn DropTarget>,
}

/// Table of registered drag sources and drop targets.
#[derive(Default)]
pub struct HandlerRegistry {
    sources: HashMap<HandlerId, SourceEntry>,
    targets: HashMap<HandlerId, TargetEntry>,
    pinned: Option<(HandlerId, SourceEntry)>,
    pending_removals: Vec<HandlerId>,
    next_serial: u32,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("sources", &self.sources.len())
            .field("targets", &self.targets.len())
            .field("pinned", &self.pinned.as_ref().map(|(id, _)| *id))
            .field("pending_removals", &self.pending_removals)
            .field("next_serial", &self.next_serial)
            .finish()
    }
}

fn validate_type(ty: &ItemType) -> Result<(), RegistrationError> {
    if ty.as_str().is_empty() {
        return Err(RegistrationError::EmptyType);
    }
    Ok(())
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, role: HandlerRole) -> HandlerId {
        self.next_serial += 1;
        HandlerId::new(role, self.next_serial)
    }

    /// Store a drag source and return its new id.
    pub fn add_source(
        &mut self,
        ty: ItemType,
        handler: Rc<dyn DragSource>,
    ) -> Result<HandlerId, RegistrationError> {
        validate_type(&ty)?;
        let id = self.next_id(HandlerRole::Source);
        self.sources.insert(id, SourceEntry { ty, handler });
        Ok(id)
    }

    /// Store a drop target and return its new id.
    pub fn add_target(
        &mut self,
        types: TargetTypes,
        handler: Rc<dyn DropTarget>,
    ) -> Result<HandlerId, RegistrationError> {
        if types.is_empty() {
            return Err(RegistrationError::EmptyTargetTypes);
        }
        for ty in types.as_slice() {
            validate_type(ty)?;
        }
        let id = self.next_id(HandlerRole::Target);
        self.targets.insert(id, TargetEntry { types, handler });
        Ok(id)
    }

    /// Returns `true` if `id` is a source id.
    #[must_use]
    #[inline]
    pub fn is_source_id(&self, id: HandlerId) -> bool {
        id.is_source()
    }

    /// Returns `true` if `id` is a target id.
    #[must_use]
    #[inline]
    pub fn is_target_id(&self, id: HandlerId) -> bool {
        id.is_target()
    }

    /// Look up a source in the table.
    ///
    /// Sources whose removal is still pending are returned.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a source id.
    #[must_use]
    pub fn source(&self, id: HandlerId) -> Option<&Rc<dyn DragSource>> {
        assert!(id.is_source(), "Expected a valid source ID.");
        self.sources.get(&id).map(|e| &e.handler)
    }

    /// Look up a source, falling back to the pinned source.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a source id.
    #[must_use]
    pub fn source_or_pinned(&self, id: HandlerId) -> Option<&Rc<dyn DragSource>> {
        assert!(id.is_source(), "Expected a valid source ID.");
        match &self.pinned {
            Some((pinned, entry)) if *pinned == id => Some(&entry.handler),
            _ => self.sources.get(&id).map(|e| &e.handler),
        }
    }

    /// Look up a target.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a target id.
    #[must_use]
    pub fn target(&self, id: HandlerId) -> Option<&Rc<dyn DropTarget>> {
        assert!(id.is_target(), "Expected a valid target ID.");
        self.targets.get(&id).map(|e| &e.handler)
    }

    /// Returns the item type a source declared, including the pinned source.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a source id.
    #[must_use]
    pub fn source_type(&self, id: HandlerId) -> Option<&ItemType> {
        assert!(id.is_source(), "Expected a valid source ID.");
        match &self.pinned {
            Some((pinned, entry)) if *pinned == id => Some(&entry.ty),
            _ => self.sources.get(&id).map(|e| &e.ty),
        }
    }

    /// Returns the item types a target accepts.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a target id.
    #[must_use]
    pub fn target_types(&self, id: HandlerId) -> Option<&TargetTypes> {
        assert!(id.is_target(), "Expected a valid target ID.");
        self.targets.get(&id).map(|e| &e.types)
    }

    /// Returns `true` if the source table has an entry for `id`.
    #[must_use]
    pub fn contains_source(&self, id: HandlerId) -> bool {
        self.sources.contains_key(&id)
    }

    /// Returns `true` if the target table has an entry for `id`.
    #[must_use]
    pub fn contains_target(&self, id: HandlerId) -> bool {
        self.targets.contains_key(&id)
    }

    /// Returns `true` if removal of `id` was requested but not yet flushed.
    #[must_use]
    pub fn is_removal_pending(&self, id: HandlerId) -> bool {
        self.pending_removals.contains(&id)
    }

    /// Number of table entries (sources plus targets).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len() + self.targets.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.targets.is_empty()
    }

    /// Queue a source for removal.
    ///
    /// # Panics
    ///
    /// Panics if the source is not registered or its removal is already queued.
    pub fn remove_source(&mut self, id: HandlerId) {
        assert!(
            self.source(id).is_some() && !self.is_removal_pending(id),
            "Cannot remove a source that was not registered."
        );
        self.pending_removals.push(id);
    }

    /// Remove a target immediately.
    ///
    /// # Panics
    ///
    /// Panics if the target is not registered.
    pub fn remove_target(&mut self, id: HandlerId) {
        assert!(
            self.target(id).is_some(),
            "Cannot remove a target that was not registered."
        );
        self.targets.remove(&id);
    }

    /// Delete every source whose removal was queued. Returns how many were removed.
    pub fn flush_removals(&mut self) -> usize {
        let mut removed = 0;
        for id in self.pending_removals.drain(..) {
            if self.sources.remove(&id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Pin a source so it stays resolvable after removal.
    ///
    /// # Panics
    ///
    /// Panics if the source is not registered.
    pub fn pin_source(&mut self, id: HandlerId) {
        assert!(id.is_source(), "Expected a valid source ID.");
        let Some(entry) = self.sources.get(&id) else {
            panic!("Cannot pin a source that was not registered.");
        };
        self.pinned = Some((id, entry.clone()));
    }

    /// Release the pinned source.
    ///
    /// # Panics
    ///
    /// Panics if no source is pinned.
    pub fn unpin_source(&mut self) {
        assert!(self.pinned.is_some(), "No source is pinned at the time.");
        self.pinned = None;
    }

    /// Returns the id of the pinned source, if any.
    #[must_use]
    pub fn pinned_source(&self) -> Option<HandlerId> {
        self.pinned.as_ref().map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::DragItem;
    use crate::monitor::DragDropMonitor;

    struct Noop;

    impl DragSource for Noop {
        fn can_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> bool {
            true
        }
        fn begin_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) -> Option<DragItem> {
            None
        }
        fn end_drag(&self, _: &DragDropMonitor<'_>, _: HandlerId) {}
    }

    impl DropTarget for Noop {}

    #[test]
    fn serials_are_shared_across_roles() {
        let mut reg = HandlerRegistry::new();
        let s = reg.add_source("piece".into(), Rc::new(Noop)).unwrap();
        let t = reg.add_target("piece".into(), Rc::new(Noop)).unwrap();
        let s2 = reg.add_source("piece".into(), Rc::new(Noop)).unwrap();
        assert_eq!((s.serial(), t.serial(), s2.serial()), (1, 2, 3));
        assert!(s.is_source() && t.is_target());
    }

    #[test]
    fn empty_types_are_rejected() {
        let mut reg = HandlerRegistry::new();
        assert_eq!(
            reg.add_source("".into(), Rc::new(Noop)).err(),
            Some(RegistrationError::EmptyType)
        );
        assert_eq!(
            reg.add_target(TargetTypes::default(), Rc::new(Noop)).err(),
            Some(RegistrationError::EmptyTargetTypes)
        );
        assert_eq!(
            reg.add_target(["piece", ""].into(), Rc::new(Noop)).err(),
            Some(RegistrationError::EmptyType)
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn source_removal_is_deferred_until_flush() {
        let mut reg = HandlerRegistry::new();
        let s = reg.add_source("piece".into(), Rc::new(Noop)).unwrap();
        reg.remove_source(s);
        assert!(reg.contains_source(s));
        assert!(reg.is_removal_pending(s));
        assert_eq!(reg.flush_removals(), 1);
        assert!(!reg.contains_source(s));
        assert!(reg.source(s).is_none());
    }

    #[test]
    fn pinned_source_outlives_removal() {
        let mut reg = HandlerRegistry::new();
        let s = reg.add_source("piece".into(), Rc::new(Noop)).unwrap();
        reg.pin_source(s);
        reg.remove_source(s);
        reg.flush_removals();
        assert!(reg.source(s).is_none());
        assert!(reg.source_or_pinned(s).is_some());
        assert_eq!(reg.source_type(s), Some(&ItemType::new("piece")));
        reg.unpin_source();
        assert!(reg.source_or_pinned(s).is_none());
    }

    #[test]
    fn target_removal_is_immediate() {
        let mut reg = HandlerRegistry::new();
        let t = reg.add_target("piece".into(), Rc::new(Noop)).unwrap();
        reg.remove_target(t);
        assert!(!reg.contains_target(t));
    }

    #[test]
    #[should_panic(expected = "Expected a valid source ID.")]
    fn source_lookup_rejects_target_ids() {
        let mut reg = HandlerRegistry::new();
        let t = reg.add_target("piece".into(), Rc::new(Noop)).unwrap();
        let _ = reg.source(t);
    }

    #[test]
    #[should_panic(expected = "Cannot remove a source that was not registered.")]
    fn double_removal_panics() {
        let mut reg = HandlerRegistry::new();
        let s = reg.add_source("piece".into(), Rc::new(Noop)).unwrap();
        reg.remove_source(s);
        reg.remove_source(s);
    }

    #[test]
    #[should_panic(expected = "No source is pinned at the time.")]
    fn unpin_without_pin_panics() {
        HandlerRegistry::new().unpin_source();
    }
}
