// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for OSL action-spotting datasets.

pub mod annotation;
pub mod dataset;

use thiserror::Error;

/// Errors produced by model mutations.
///
/// All of these are recoverable at the UI boundary; none are fatal to the
/// process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// An operation addressed a collection position that does not exist.
    #[error("index {index} is out of range for a collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Attempted to add a label already present in the vocabulary; the
    /// operation is a no-op.
    #[error("label \"{0}\" is already present")]
    DuplicateLabel(String),

    /// Attempted to remove a label that is not in the vocabulary.
    #[error("label \"{0}\" not found")]
    LabelNotFound(String),
}
