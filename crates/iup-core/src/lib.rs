// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iup-core — Core types, configuration, and error definitions shared across
// the image core crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AutoScale, ImageConfig};
pub use error::{IupError, Result};
pub use types::*;
