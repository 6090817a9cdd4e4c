// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler identifiers and item types.
//!
//! Every registered drag source or drop target is addressed by a [`HandlerId`].
//! The id carries its [`HandlerRole`] so lookups can reject an id of the wrong
//! role, and a serial that is unique within one registry. The textual form is
//! `S<serial>` for sources and `T<serial>` for targets:
//!
//! ```
//! use understory_dnd::id::{HandlerId, HandlerRole};
//!
//! let id: HandlerId = "T12".parse().unwrap();
//! assert_eq!(id.role(), HandlerRole::Target);
//! assert_eq!(id.serial(), 12);
//! assert_eq!(id.to_string(), "T12");
//! ```

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use smallvec::SmallVec;

/// Whether a handler originates drags or receives drops.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HandlerRole {
    /// A drag source.
    Source,
    /// A drop target.
    Target,
}

impl HandlerRole {
    const fn prefix(self) -> char {
        match self {
            Self::Source => 'S',
            Self::Target => 'T',
        }
    }
}

/// Identifier of a registered handler.
///
/// Ordering follows registration order within one registry, since serials are
/// allocated from a single counter shared by both roles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandlerId {
    serial: u32,
    role: HandlerRole,
}

impl HandlerId {
    /// Build an id from its parts.
    #[must_use]
    pub const fn new(role: HandlerRole, serial: u32) -> Self {
        Self { serial, role }
    }

    /// Returns the role encoded in this id.
    #[must_use]
    #[inline]
    pub const fn role(self) -> HandlerRole {
        self.role
    }

    /// Returns the numeric part of this id.
    #[must_use]
    #[inline]
    pub const fn serial(self) -> u32 {
        self.serial
    }

    /// Returns `true` for source ids.
    #[must_use]
    #[inline]
    pub const fn is_source(self) -> bool {
        matches!(self.role, HandlerRole::Source)
    }

    /// Returns `true` for target ids.
    #[must_use]
    #[inline]
    pub const fn is_target(self) -> bool {
        matches!(self.role, HandlerRole::Target)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.role.prefix(), self.serial)
    }
}

/// Error returned when a string is not of the form `S<n>` or `T<n>`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse handler id from {0:?}")]
pub struct ParseHandlerIdError(String);

impl FromStr for HandlerId {
    type Err = ParseHandlerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseHandlerIdError(String::from(s));
        let mut chars = s.chars();
        let role = match chars.next() {
            Some('S') => HandlerRole::Source,
            Some('T') => HandlerRole::Target,
            _ => return Err(err()),
        };
        let serial = chars.as_str().parse::<u32>().map_err(|_| err())?;
        Ok(Self::new(role, serial))
    }
}

/// The type tag of a dragged item.
///
/// Sources declare exactly one item type; targets declare the set of item
/// types they accept (see [`TargetTypes`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemType(Cow<'static, str>);

impl ItemType {
    /// Create an item type from a static string.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ItemType {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ItemType {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// The item types a drop target accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetTypes(SmallVec<[ItemType; 2]>);

impl TargetTypes {
    /// Returns `true` if `item_type` is one of the accepted types.
    ///
    /// A missing item type (no drag in progress) matches nothing.
    #[must_use]
    pub fn matches(&self, item_type: Option<&ItemType>) -> bool {
        item_type.is_some_and(|t| self.0.contains(t))
    }

    /// Returns the accepted types in declaration order.
    #[must_use]
    pub fn as_slice(&self) -> &[ItemType] {
        &self.0
    }

    /// Returns `true` if no type was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ItemType> for TargetTypes {
    fn from(ty: ItemType) -> Self {
        Self(smallvec::smallvec![ty])
    }
}

impl From<&'static str> for TargetTypes {
    fn from(name: &'static str) -> Self {
        ItemType::new(name).into()
    }
}

impl From<Vec<ItemType>> for TargetTypes {
    fn from(types: Vec<ItemType>) -> Self {
        Self(types.into())
    }
}

impl<const N: usize> From<[&'static str; N]> for TargetTypes {
    fn from(names: [&'static str; N]) -> Self {
        Self(names.into_iter().map(ItemType::new).collect())
    }
}

impl FromIterator<ItemType> for TargetTypes {
    fn from_iter<I: IntoIterator<Item = ItemType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
