// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iup-image — Portable image layer shared by the IUP drivers.
//
// Provides the zero-filling growable array, logical images with
// nearest-neighbour and bilinear resampling, the per-image cache of derived
// native handles, DPI-driven scaling rules, and the stock image registry.

pub mod array;
pub mod cache;
pub mod dpi;
pub mod image;
pub mod names;
pub mod stock;

// Re-export the primary types so callers can use `iup_image::LogicalImage` etc.
pub use array::GrowableArray;
pub use cache::{CacheKey, HandleCache};
pub use crate::image::LogicalImage;
pub use names::{SelectionList, split_selection};
pub use stock::StockRegistry;
