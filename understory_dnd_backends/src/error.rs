// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while building a backend pipeline.

use alloc::string::String;

/// Why a [`Pipeline`](crate::multi::Pipeline) was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// The pipeline had no backends.
    #[error("MultiBackend: you must specify at least one backend")]
    Empty,
    /// The entry at this index had an empty id.
    #[error("MultiBackend: backend entry {0} needs a non-empty id")]
    MissingId(usize),
    /// Two entries shared an id.
    #[error("MultiBackend: backend id {0:?} is used more than once")]
    DuplicateId(String),
}
