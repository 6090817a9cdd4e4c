// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable registration errors.
//!
//! Contract violations during a drag (hovering while idle, dropping twice,
//! duplicate target ids) are bugs in the caller and panic instead.

/// Why a handler could not be registered.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// An item type was the empty string.
    #[error("Type can only be a non-empty string.")]
    EmptyType,
    /// A target declared no item types at all.
    #[error("A drop target must accept at least one type.")]
    EmptyTargetTypes,
}
