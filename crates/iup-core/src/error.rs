// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the IUP image core.

use thiserror::Error;

use crate::types::HandleKind;

/// Top-level error type for all image core operations.
///
/// Nothing here is fatal: every failure leaves the array, image, or cache in
/// the state it had before the call.
#[derive(Debug, Error)]
pub enum IupError {
    // -- Buffer errors --
    #[error("allocation of {requested} elements failed")]
    Allocation { requested: usize },

    #[error("index {index} out of range for array of {count} elements")]
    IndexOutOfRange { index: usize, count: usize },

    // -- Image errors --
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("unsupported bit depth: {0}")]
    UnsupportedDepth(u8),

    #[error("palette has {0} entries, at most 256 allowed")]
    PaletteTooLarge(usize),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    // -- Native collaborators --
    #[error("native {kind} creation failed: {detail}")]
    Factory { kind: HandleKind, detail: String },

    #[error("unknown stock image: {0}")]
    UnknownStock(String),

    // -- Persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, IupError>;
