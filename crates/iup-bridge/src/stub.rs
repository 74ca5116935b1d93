// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless backend for CI builds and tests where no native toolkit runs.
//
// Handles are plain counters. The backend keeps the set of live handles so
// leaks and double destroys are observable.

use std::collections::HashMap;
use std::num::NonZeroU64;

use iup_core::error::{IupError, Result};
use iup_core::types::{Color, HandleKind, ImageView};

use crate::traits::*;

/// Default DPI reported when nothing else is configured.
pub const DEFAULT_DPI: u32 = 96;

/// Backend that creates numbered handles without touching any toolkit.
#[derive(Debug)]
pub struct HeadlessBackend {
    dpi: u32,
    next: u64,
    live: HashMap<NativeHandle, HandleKind>,
    created: usize,
    destroyed: usize,
    fail_creation: bool,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl HeadlessBackend {
    pub fn new(dpi: u32) -> Self {
        Self {
            dpi: dpi.max(1),
            next: 1,
            live: HashMap::new(),
            created: 0,
            destroyed: 0,
            fail_creation: false,
        }
    }

    pub fn set_dpi(&mut self, dpi: u32) {
        self.dpi = dpi.max(1);
    }

    /// Make every subsequent creation fail until switched off again.
    pub fn set_fail_creation(&mut self, fail: bool) {
        self.fail_creation = fail;
    }

    /// Total successful creations.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Total successful destructions.
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    /// Handles created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: NativeHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn kind_of(&self, handle: NativeHandle) -> Option<HandleKind> {
        self.live.get(&handle).copied()
    }

    fn allocate(&mut self, kind: HandleKind, detail: &str) -> Result<NativeHandle> {
        if self.fail_creation {
            tracing::warn!(%kind, detail, "headless backend refusing creation");
            return Err(IupError::Factory {
                kind,
                detail: format!("creation disabled ({detail})"),
            });
        }
        let id = NonZeroU64::new(self.next).ok_or_else(|| IupError::Factory {
            kind,
            detail: "handle space exhausted".into(),
        })?;
        self.next = self.next.wrapping_add(1);

        let handle = NativeHandle(id);
        self.live.insert(handle, kind);
        self.created += 1;
        tracing::debug!(%handle, %kind, detail, "headless handle created");
        Ok(handle)
    }
}

impl Backend for HeadlessBackend {
    fn backend_name(&self) -> &str {
        "Headless"
    }
}

impl NativeImageFactory for HeadlessBackend {
    fn create_icon(&mut self, image: &ImageView<'_>) -> Result<NativeHandle> {
        let detail = format!("{}x{}", image.width, image.height);
        self.allocate(HandleKind::Icon, &detail)
    }

    fn create_cursor(&mut self, image: &ImageView<'_>) -> Result<NativeHandle> {
        if image.hotspot.x >= image.width || image.hotspot.y >= image.height {
            return Err(IupError::Factory {
                kind: HandleKind::Cursor,
                detail: format!(
                    "hotspot {}:{} outside {}x{}",
                    image.hotspot.x, image.hotspot.y, image.width, image.height
                ),
            });
        }
        let detail = format!("{}x{}", image.width, image.height);
        self.allocate(HandleKind::Cursor, &detail)
    }

    fn create_image(
        &mut self,
        image: &ImageView<'_>,
        bgcolor: Option<Color>,
        inactive: bool,
    ) -> Result<NativeHandle> {
        let detail = match bgcolor {
            Some(bg) => format!("{}x{} bg={bg} inactive={inactive}", image.width, image.height),
            None => format!("{}x{} inactive={inactive}", image.width, image.height),
        };
        self.allocate(HandleKind::Image, &detail)
    }

    fn load_resource(&mut self, name: &str) -> Result<NativeHandle> {
        if name.is_empty() {
            return Err(IupError::Factory {
                kind: HandleKind::Image,
                detail: "empty resource name".into(),
            });
        }
        self.allocate(HandleKind::Image, name)
    }

    fn destroy(&mut self, handle: NativeHandle, kind: HandleKind) {
        match self.live.remove(&handle) {
            Some(created_as) if created_as == kind => {
                self.destroyed += 1;
                tracing::debug!(%handle, %kind, "headless handle destroyed");
            }
            Some(created_as) => {
                self.destroyed += 1;
                tracing::warn!(%handle, %kind, %created_as, "handle destroyed with mismatched kind");
            }
            None => {
                tracing::warn!(%handle, %kind, "destroy of unknown or already destroyed handle");
            }
        }
    }
}

impl ScreenMetrics for HeadlessBackend {
    fn screen_dpi(&self) -> u32 {
        self.dpi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iup_core::types::{Hotspot, ImageDepth};

    fn view(pixels: &[u8]) -> ImageView<'_> {
        ImageView {
            width: 2,
            height: 2,
            depth: ImageDepth::Rgba32,
            pixels,
            palette: None,
            hotspot: Hotspot::default(),
        }
    }

    #[test]
    fn handles_are_distinct_and_tracked() {
        let pixels = [0u8; 16];
        let mut backend = HeadlessBackend::default();

        let a = backend.create_icon(&view(&pixels)).expect("icon");
        let b = backend.create_image(&view(&pixels), None, false).expect("image");
        assert_ne!(a, b);
        assert_eq!(backend.live(), 2);
        assert_eq!(backend.kind_of(a), Some(HandleKind::Icon));

        backend.destroy(a, HandleKind::Icon);
        assert!(!backend.is_live(a));
        assert_eq!(backend.live(), 1);
        assert_eq!(backend.destroyed(), 1);
    }

    #[test]
    fn double_destroy_is_not_counted() {
        let pixels = [0u8; 16];
        let mut backend = HeadlessBackend::default();
        let h = backend.create_icon(&view(&pixels)).expect("icon");

        backend.destroy(h, HandleKind::Icon);
        backend.destroy(h, HandleKind::Icon);
        assert_eq!(backend.destroyed(), 1);
    }

    #[test]
    fn failing_creation_reports_factory_error() {
        let pixels = [0u8; 16];
        let mut backend = HeadlessBackend::default();
        backend.set_fail_creation(true);

        let err = backend.create_icon(&view(&pixels)).unwrap_err();
        assert!(matches!(err, IupError::Factory { kind: HandleKind::Icon, .. }));
        assert_eq!(backend.created(), 0);
    }

    #[test]
    fn cursor_hotspot_must_lie_inside_image() {
        let pixels = [0u8; 16];
        let mut backend = HeadlessBackend::default();
        let mut v = view(&pixels);
        v.hotspot = Hotspot { x: 5, y: 0 };
        assert!(backend.create_cursor(&v).is_err());
    }

    #[test]
    fn dpi_is_never_zero() {
        let backend = HeadlessBackend::new(0);
        assert_eq!(backend.screen_dpi(), 1);
    }
}
