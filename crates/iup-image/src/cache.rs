// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Derived handle cache — native icons, cursors, and rendered bitmaps created
// from one logical image, keyed by what they were created for.
//
// Entries are created lazily through a `NativeImageFactory` and released
// through the same factory. Failed creations are not remembered, so the next
// request asks the factory again.

use std::collections::HashMap;

use iup_bridge::{NativeHandle, NativeImageFactory};
use iup_core::error::Result;
use iup_core::types::{Color, HandleKind, ImageView};
use tracing::{debug, instrument, warn};

/// What a cached native handle was created for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Icon,
    Cursor,
    /// Rendered bitmap. `bgcolor` is only set for background-dependent
    /// images, so each background gets its own rendering.
    Image {
        inactive: bool,
        bgcolor: Option<Color>,
    },
    /// Native image loaded from an application resource.
    Loaded(String),
}

impl CacheKey {
    /// Key for a rendered bitmap. The background colour takes part in the key
    /// when the image depends on it or the rendition is inactive (greying
    /// always blends in the background).
    pub fn for_image(inactive: bool, bg_dependent: bool, bgcolor: Option<Color>) -> Self {
        Self::Image {
            inactive,
            bgcolor: if bg_dependent || inactive { bgcolor } else { None },
        }
    }

    /// Native object kind the handle must be destroyed as.
    pub fn kind(&self) -> HandleKind {
        match self {
            Self::Icon => HandleKind::Icon,
            Self::Cursor => HandleKind::Cursor,
            Self::Image { .. } | Self::Loaded(_) => HandleKind::Image,
        }
    }
}

/// Legacy attribute form: `ICON`, `CURSOR`, `IMAGE_INACTIVE(255 0 0)`, ...
impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Icon => f.write_str("ICON"),
            Self::Cursor => f.write_str("CURSOR"),
            Self::Image { inactive, bgcolor } => {
                f.write_str("IMAGE")?;
                if *inactive {
                    f.write_str("_INACTIVE")?;
                }
                if let Some(bg) = bgcolor {
                    write!(f, "({bg})")?;
                }
                Ok(())
            }
            Self::Loaded(name) => write!(f, "LOADED({name})"),
        }
    }
}

/// Greyed-out pixels kept alongside the handles.
#[derive(Debug)]
struct InactiveScratch {
    bgcolor: Color,
    pixels: Vec<u8>,
}

/// Per-image map from cache key to native handle.
#[derive(Debug, Default)]
pub struct HandleCache {
    entries: HashMap<CacheKey, NativeHandle>,
    inactive: Option<InactiveScratch>,
}

impl HandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a handle without creating one.
    pub fn get(&self, key: &CacheKey) -> Option<NativeHandle> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.inactive.is_none()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    /// Return the handle for `key`, asking `factory` to create it on a miss.
    ///
    /// A factory error is returned as-is and nothing is stored.
    pub fn get_or_create<F>(
        &mut self,
        key: CacheKey,
        image: &ImageView<'_>,
        factory: &mut F,
    ) -> Result<NativeHandle>
    where
        F: NativeImageFactory + ?Sized,
    {
        if let Some(handle) = self.entries.get(&key) {
            return Ok(*handle);
        }

        let handle = match &key {
            CacheKey::Icon => factory.create_icon(image)?,
            CacheKey::Cursor => factory.create_cursor(image)?,
            CacheKey::Image { inactive, bgcolor } => {
                factory.create_image(image, *bgcolor, *inactive)?
            }
            CacheKey::Loaded(name) => factory.load_resource(name)?,
        };
        debug!(%key, %handle, "derived handle created");
        self.entries.insert(key, handle);
        Ok(handle)
    }

    /// Destroy and forget one entry. Returns `false` if it was not cached.
    pub fn remove<F>(&mut self, key: &CacheKey, factory: &mut F) -> bool
    where
        F: NativeImageFactory + ?Sized,
    {
        match self.entries.remove(key) {
            Some(handle) => {
                factory.destroy(handle, key.kind());
                true
            }
            None => false,
        }
    }

    /// Destroy every cached handle through `factory` and drop the scratch
    /// pixels. Running it on an empty cache does nothing.
    #[instrument(skip_all, fields(entries = self.entries.len()))]
    pub fn clear<F>(&mut self, factory: &mut F)
    where
        F: NativeImageFactory + ?Sized,
    {
        if self.is_empty() {
            return;
        }
        for (key, handle) in self.entries.drain() {
            debug!(%key, %handle, "releasing derived handle");
            factory.destroy(handle, key.kind());
        }
        self.inactive = None;
    }

    /// Cached greyed-out pixels computed against `bgcolor`, if any.
    pub fn inactive_pixels(&self, bgcolor: Color) -> Option<&[u8]> {
        self.inactive
            .as_ref()
            .filter(|s| s.bgcolor == bgcolor)
            .map(|s| s.pixels.as_slice())
    }

    /// Keep greyed-out pixels until the next `clear`, replacing any computed
    /// for another background.
    pub fn store_inactive(&mut self, bgcolor: Color, pixels: Vec<u8>) -> &[u8] {
        let scratch = self.inactive.insert(InactiveScratch { bgcolor, pixels });
        &scratch.pixels
    }

    /// Take the scratch pixels out, leaving none cached.
    pub fn take_inactive(&mut self, bgcolor: Color) -> Option<Vec<u8>> {
        match self.inactive.take() {
            Some(s) if s.bgcolor == bgcolor => Some(s.pixels),
            other => {
                self.inactive = other;
                None
            }
        }
    }
}

impl Drop for HandleCache {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            warn!(
                leaked = self.entries.len(),
                "handle cache dropped without clear; native handles leaked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iup_bridge::HeadlessBackend;
    use iup_core::types::{Hotspot, ImageDepth};

    const PIXELS: [u8; 16] = [255; 16];

    fn view() -> ImageView<'static> {
        ImageView {
            width: 2,
            height: 2,
            depth: ImageDepth::Rgba32,
            pixels: &PIXELS,
            palette: None,
            hotspot: Hotspot::default(),
        }
    }

    #[test]
    fn hit_does_not_call_factory_again() {
        let mut backend = HeadlessBackend::default();
        let mut cache = HandleCache::new();

        let a = cache
            .get_or_create(CacheKey::Icon, &view(), &mut backend)
            .expect("icon");
        let b = cache
            .get_or_create(CacheKey::Icon, &view(), &mut backend)
            .expect("icon");
        assert_eq!(a, b);
        assert_eq!(backend.created(), 1);
        assert_eq!(cache.len(), 1);

        cache.clear(&mut backend);
    }

    #[test]
    fn background_colours_are_cached_independently() {
        let mut backend = HeadlessBackend::default();
        let mut cache = HandleCache::new();
        let red = CacheKey::for_image(false, true, Some(Color::new(255, 0, 0)));
        let green = CacheKey::for_image(false, true, Some(Color::new(0, 255, 0)));

        let r = cache.get_or_create(red.clone(), &view(), &mut backend).expect("red");
        let g = cache.get_or_create(green.clone(), &view(), &mut backend).expect("green");
        assert_ne!(r, g);

        assert!(cache.remove(&red, &mut backend));
        assert!(!backend.is_live(r));
        assert!(backend.is_live(g));
        assert_eq!(cache.get(&green), Some(g));

        cache.clear(&mut backend);
        assert_eq!(backend.live(), 0);
    }

    #[test]
    fn background_ignored_for_independent_images() {
        let key = CacheKey::for_image(false, false, Some(Color::new(1, 2, 3)));
        assert_eq!(
            key,
            CacheKey::Image {
                inactive: false,
                bgcolor: None
            }
        );
    }

    #[test]
    fn inactive_keys_always_carry_the_background() {
        let white = CacheKey::for_image(true, false, Some(Color::new(255, 255, 255)));
        let black = CacheKey::for_image(true, false, Some(Color::new(0, 0, 0)));
        assert_ne!(white, black);
        assert_eq!(white.to_string(), "IMAGE_INACTIVE(255 255 255)");
    }

    #[test]
    fn factory_failure_stores_nothing_and_is_retried() {
        let mut backend = HeadlessBackend::default();
        let mut cache = HandleCache::new();

        backend.set_fail_creation(true);
        assert!(cache.get_or_create(CacheKey::Cursor, &view(), &mut backend).is_err());
        assert!(cache.is_empty());

        backend.set_fail_creation(false);
        let h = cache
            .get_or_create(CacheKey::Cursor, &view(), &mut backend)
            .expect("cursor");
        assert_eq!(backend.kind_of(h), Some(HandleKind::Cursor));

        cache.clear(&mut backend);
    }

    #[test]
    fn clear_destroys_with_matching_kinds() {
        let mut backend = HeadlessBackend::default();
        let mut cache = HandleCache::new();

        cache.get_or_create(CacheKey::Icon, &view(), &mut backend).expect("icon");
        cache.get_or_create(CacheKey::Cursor, &view(), &mut backend).expect("cursor");
        cache
            .get_or_create(CacheKey::Loaded("logo".into()), &view(), &mut backend)
            .expect("loaded");
        cache.store_inactive(Color::new(0, 0, 0), vec![1, 2, 3]);

        cache.clear(&mut backend);
        assert!(cache.is_empty());
        assert_eq!(backend.live(), 0);
        assert_eq!(backend.destroyed(), 3);
        assert!(cache.inactive_pixels(Color::new(0, 0, 0)).is_none());
    }

    #[test]
    fn works_through_a_boxed_backend() {
        let mut backend = iup_bridge::default_backend();
        let mut cache = HandleCache::new();
        let h = cache
            .get_or_create(CacheKey::Icon, &view(), &mut *backend)
            .expect("icon");
        assert_eq!(cache.get(&CacheKey::Icon), Some(h));
        cache.clear(&mut *backend);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_twice_on_empty_cache_is_noop() {
        let mut backend = HeadlessBackend::default();
        let mut cache = HandleCache::new();
        cache.clear(&mut backend);
        cache.clear(&mut backend);
        assert_eq!(backend.created(), 0);
        assert_eq!(backend.destroyed(), 0);
    }

    #[test]
    fn scratch_is_keyed_by_background() {
        let mut cache = HandleCache::new();
        let white = Color::new(255, 255, 255);
        cache.store_inactive(white, vec![9; 4]);

        assert_eq!(cache.inactive_pixels(white), Some(&[9u8; 4][..]));
        assert!(cache.inactive_pixels(Color::new(0, 0, 0)).is_none());
        assert!(cache.take_inactive(Color::new(0, 0, 0)).is_none());
        assert_eq!(cache.take_inactive(white), Some(vec![9; 4]));
        assert!(cache.is_empty());
    }

    #[test]
    fn keys_render_legacy_names() {
        assert_eq!(CacheKey::Icon.to_string(), "ICON");
        assert_eq!(CacheKey::for_image(true, false, None).to_string(), "IMAGE_INACTIVE");
        assert_eq!(
            CacheKey::for_image(false, true, Some(Color::new(255, 0, 0))).to_string(),
            "IMAGE(255 0 0)"
        );
        assert_eq!(CacheKey::Loaded("tux".into()).to_string(), "LOADED(tux)");
    }
}
