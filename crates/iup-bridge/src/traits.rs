// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native collaborators of the
// image core.
//
// Every driver (GTK, Motif, Qt, Win32, WinUI, EFL) turns logical images into
// its own icon, cursor, and bitmap objects. The image core only ever sees
// opaque handles and hands them back for destruction.

use std::num::NonZeroU64;

use iup_core::error::Result;
use iup_core::types::{Color, HandleKind, ImageView};

/// Opaque native object reference produced by a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub NonZeroU64);

impl NativeHandle {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

/// Unified driver surface the image core talks to.
pub trait Backend: NativeImageFactory + ScreenMetrics {
    /// Human-readable driver name (e.g. "GTK 3", "Win32").
    fn backend_name(&self) -> &str;
}

/// Creates and destroys native image objects.
///
/// All calls happen on the toolkit's UI thread. A failed creation returns an
/// error and leaves no native object behind.
pub trait NativeImageFactory {
    /// Build a native icon from the image.
    fn create_icon(&mut self, image: &ImageView<'_>) -> Result<NativeHandle>;

    /// Build a native cursor; `image.hotspot` is the click point.
    fn create_cursor(&mut self, image: &ImageView<'_>) -> Result<NativeHandle>;

    /// Render the image into a native bitmap. `bgcolor` fills transparent
    /// areas on toolkits without alpha; `inactive` requests the greyed-out
    /// rendition.
    fn create_image(
        &mut self,
        image: &ImageView<'_>,
        bgcolor: Option<Color>,
        inactive: bool,
    ) -> Result<NativeHandle>;

    /// Load a native image from an application resource by name.
    fn load_resource(&mut self, name: &str) -> Result<NativeHandle>;

    /// Release a handle created by this factory as `kind`.
    fn destroy(&mut self, handle: NativeHandle, kind: HandleKind);
}

/// Screen metrics needed for stock icon sizing and DPI scaling.
pub trait ScreenMetrics {
    /// Current screen DPI, always positive.
    fn screen_dpi(&self) -> u32;
}
