// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logical image — pixel buffer, palette, and hotspot of a toolkit image,
// plus the native handles derived from it.

pub mod codec;
pub mod inactive;
pub mod resample;

use iup_bridge::{NativeHandle, NativeImageFactory, ScreenMetrics};
use iup_core::config::ImageConfig;
use iup_core::error::{IupError, Result};
use iup_core::types::{Color, Hotspot, ImageDepth, ImageView, Palette};
use tracing::{debug, info, instrument};

use crate::cache::{CacheKey, HandleCache};
use crate::dpi;

/// A toolkit image in one of three pixel layouts.
///
/// The image exclusively owns its pixels and its derived native handles.
/// Anything that changes how the image renders (resize, pixel edits,
/// background dependence) releases the cached handles first, so the factory
/// passed in must be the one that created them.
#[derive(Debug)]
pub struct LogicalImage {
    width: u32,
    height: u32,
    depth: ImageDepth,
    /// Row-major, channel-interleaved; `width * height * channels` bytes.
    pixels: Vec<u8>,
    palette: Option<Palette>,
    hotspot: Hotspot,
    bg_dependent: bool,
    cache: HandleCache,
}

fn buffer_len(width: u32, height: u32, depth: ImageDepth) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(IupError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(depth.channels()))
        .ok_or(IupError::InvalidDimensions { width, height })
}

fn zeroed_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| IupError::Allocation { requested: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

impl LogicalImage {
    // -- Construction ---------------------------------------------------------

    /// A zero-filled image.
    pub fn new(width: u32, height: u32, depth: ImageDepth) -> Result<Self> {
        let pixels = zeroed_buffer(buffer_len(width, height, depth)?)?;
        Ok(Self::from_parts(width, height, depth, pixels))
    }

    /// Wrap an existing pixel buffer; its length must match the size.
    pub fn from_pixels(width: u32, height: u32, depth: ImageDepth, pixels: Vec<u8>) -> Result<Self> {
        let expected = buffer_len(width, height, depth)?;
        if pixels.len() != expected {
            return Err(IupError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self::from_parts(width, height, depth, pixels))
    }

    fn from_parts(width: u32, height: u32, depth: ImageDepth, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            depth,
            pixels,
            palette: None,
            hotspot: Hotspot::default(),
            bg_dependent: false,
            cache: HandleCache::new(),
        }
    }

    /// Attach a palette. Only 8bpp images have one. An image whose palette
    /// contains a background slot becomes background dependent.
    pub fn with_palette(mut self, palette: Palette) -> Result<Self> {
        if self.depth != ImageDepth::Palette8 {
            return Err(IupError::UnsupportedDepth(self.depth.bits()));
        }
        self.bg_dependent |= palette.has_background();
        self.palette = Some(palette);
        Ok(self)
    }

    pub fn with_hotspot(mut self, hotspot: Hotspot) -> Self {
        self.hotspot = hotspot;
        self
    }

    pub fn with_background_dependent(mut self, bg_dependent: bool) -> Self {
        self.bg_dependent = bg_dependent;
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> ImageDepth {
        self.depth
    }

    pub fn channels(&self) -> usize {
        self.depth.channels()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn hotspot(&self) -> Hotspot {
        self.hotspot
    }

    /// Hotspot only affects cursors; changing it drops a cached cursor.
    pub fn set_hotspot<F>(&mut self, hotspot: Hotspot, factory: &mut F)
    where
        F: NativeImageFactory + ?Sized,
    {
        if self.hotspot != hotspot {
            self.cache.remove(&CacheKey::Cursor, factory);
            self.hotspot = hotspot;
        }
    }

    /// Whether renderings bake in the background colour.
    pub fn is_bg_dependent(&self) -> bool {
        self.bg_dependent
    }

    pub fn set_background_dependent<F>(&mut self, bg_dependent: bool, factory: &mut F)
    where
        F: NativeImageFactory + ?Sized,
    {
        if self.bg_dependent != bg_dependent {
            self.cache.clear(factory);
            self.bg_dependent = bg_dependent;
        }
    }

    /// True when the content itself shows through to the background: a
    /// palette background slot, or any non-opaque alpha.
    pub fn has_transparency(&self) -> bool {
        match self.depth {
            ImageDepth::Palette8 => self.palette.as_ref().is_some_and(Palette::has_background),
            ImageDepth::Rgb24 => false,
            ImageDepth::Rgba32 => self.pixels.chunks_exact(4).any(|px| px[3] != 255),
        }
    }

    /// Channel bytes of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.channels();
        let offset = (y as usize * self.width as usize + x as usize) * channels;
        self.pixels.get(offset..offset + channels)
    }

    /// Borrowed description for native factories.
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            depth: self.depth,
            pixels: &self.pixels,
            palette: self.palette.as_ref(),
            hotspot: self.hotspot,
        }
    }

    pub fn cache(&self) -> &HandleCache {
        &self.cache
    }

    // -- Pixel edits ----------------------------------------------------------

    /// Edit the pixels in place. Cached handles are released first.
    pub fn update_pixels<F>(&mut self, factory: &mut F, edit: impl FnOnce(&mut [u8]))
    where
        F: NativeImageFactory + ?Sized,
    {
        self.cache.clear(factory);
        edit(&mut self.pixels);
    }

    /// Resize to `new_width` x `new_height`.
    ///
    /// Palette images are stretched nearest-neighbour, RGB and RGBA are
    /// interpolated bilinearly. The new buffer is fully populated before it
    /// replaces the old one, so a failure leaves the image unchanged.
    #[instrument(skip(self, factory), fields(from_w = self.width, from_h = self.height))]
    pub fn resize<F>(&mut self, new_width: u32, new_height: u32, factory: &mut F) -> Result<()>
    where
        F: NativeImageFactory + ?Sized,
    {
        if new_width == self.width && new_height == self.height {
            return Ok(());
        }
        let mut resized = zeroed_buffer(buffer_len(new_width, new_height, self.depth)?)?;

        match self.depth {
            ImageDepth::Palette8 => resample::stretch_map(
                &self.pixels,
                self.width as usize,
                self.height as usize,
                &mut resized,
                new_width as usize,
                new_height as usize,
            )?,
            ImageDepth::Rgb24 | ImageDepth::Rgba32 => resample::resize_bilinear(
                &self.pixels,
                self.width as usize,
                self.height as usize,
                &mut resized,
                new_width as usize,
                new_height as usize,
                self.depth.channels(),
            )?,
        }

        self.cache.clear(factory);
        self.width = new_width;
        self.height = new_height;
        self.pixels = resized;
        self.hotspot = Hotspot {
            x: self.hotspot.x.min(new_width - 1),
            y: self.hotspot.y.min(new_height - 1),
        };
        debug!(new_width, new_height, "image resized");
        Ok(())
    }

    /// Apply the configured automatic scaling for the current screen.
    /// Returns whether the image was resized.
    pub fn auto_scale<M, F>(&mut self, config: &ImageConfig, metrics: &M, factory: &mut F) -> Result<bool>
    where
        M: ScreenMetrics + ?Sized,
        F: NativeImageFactory + ?Sized,
    {
        let screen_dpi = dpi::effective_dpi(config, metrics);
        let Some(factor) = dpi::auto_scale_factor(config, screen_dpi) else {
            return Ok(false);
        };
        let (w, h) = dpi::scaled_size(self.width, self.height, factor, config.min_auto_scale_height);
        if (w, h) == (self.width, self.height) {
            return Ok(false);
        }
        info!(factor, screen_dpi, w, h, "auto-scaling image");
        self.resize(w, h, factory)?;
        Ok(true)
    }

    // -- Derived handles ------------------------------------------------------

    /// Cached native handle for `key`, created through `factory` on a miss.
    pub fn handle<F>(&mut self, key: CacheKey, factory: &mut F) -> Result<NativeHandle>
    where
        F: NativeImageFactory + ?Sized,
    {
        let view = ImageView {
            width: self.width,
            height: self.height,
            depth: self.depth,
            pixels: &self.pixels,
            palette: self.palette.as_ref(),
            hotspot: self.hotspot,
        };
        self.cache.get_or_create(key, &view, factory)
    }

    pub fn icon<F>(&mut self, factory: &mut F) -> Result<NativeHandle>
    where
        F: NativeImageFactory + ?Sized,
    {
        self.handle(CacheKey::Icon, factory)
    }

    pub fn cursor<F>(&mut self, factory: &mut F) -> Result<NativeHandle>
    where
        F: NativeImageFactory + ?Sized,
    {
        self.handle(CacheKey::Cursor, factory)
    }

    /// Rendered bitmap for drawing on `bgcolor`. Inactive renditions are
    /// greyed out here and the factory receives the greyed pixels.
    pub fn rendered<F>(
        &mut self,
        bgcolor: Option<Color>,
        inactive: bool,
        factory: &mut F,
    ) -> Result<NativeHandle>
    where
        F: NativeImageFactory + ?Sized,
    {
        if !inactive {
            let key = CacheKey::for_image(false, self.bg_dependent, bgcolor);
            return self.handle(key, factory);
        }
        let bg = bgcolor.unwrap_or(inactive::DEFAULT_BGCOLOR);
        let key = CacheKey::for_image(true, self.bg_dependent, Some(bg));
        if let Some(handle) = self.cache.get(&key) {
            return Ok(handle);
        }

        let (depth, pixels) = match self.cache.take_inactive(bg) {
            Some(pixels) => (self.inactive_depth(), pixels),
            None => inactive::inactive_pixels(&self.pixels, self.depth, self.palette.as_ref(), bg),
        };
        let view = ImageView {
            width: self.width,
            height: self.height,
            depth,
            pixels: &pixels,
            palette: None,
            hotspot: self.hotspot,
        };
        let result = self.cache.get_or_create(key, &view, factory);
        self.cache.store_inactive(bg, pixels);
        result
    }

    /// Native image loaded from an application resource, cached by name.
    pub fn loaded<F>(&mut self, resource: &str, factory: &mut F) -> Result<NativeHandle>
    where
        F: NativeImageFactory + ?Sized,
    {
        self.handle(CacheKey::Loaded(resource.to_string()), factory)
    }

    /// Greyed-out pixels against `bgcolor`, computed once per background
    /// and kept until the cache is cleared. Palette images come out as RGBA.
    pub fn inactive_view(&mut self, bgcolor: Color) -> ImageView<'_> {
        let depth = self.inactive_depth();
        if self.cache.inactive_pixels(bgcolor).is_none() {
            let (_, pixels) =
                inactive::inactive_pixels(&self.pixels, self.depth, self.palette.as_ref(), bgcolor);
            self.cache.store_inactive(bgcolor, pixels);
        }
        let pixels = self.cache.inactive_pixels(bgcolor).unwrap_or_default();
        ImageView {
            width: self.width,
            height: self.height,
            depth,
            pixels,
            palette: None,
            hotspot: self.hotspot,
        }
    }

    fn inactive_depth(&self) -> ImageDepth {
        match self.depth {
            ImageDepth::Palette8 => ImageDepth::Rgba32,
            other => other,
        }
    }

    /// Release every derived handle. Safe to call repeatedly.
    pub fn clear_cache<F>(&mut self, factory: &mut F)
    where
        F: NativeImageFactory + ?Sized,
    {
        self.cache.clear(factory);
    }

    /// Release the derived handles, then the image itself. Dropping an image
    /// without this leaks its native handles (and logs a warning).
    pub fn destroy<F>(mut self, factory: &mut F)
    where
        F: NativeImageFactory + ?Sized,
    {
        self.cache.clear(factory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iup_bridge::HeadlessBackend;
    use iup_core::config::AutoScale;
    use iup_core::types::{PaletteEntry, Rgba};

    fn rgba_2x2() -> LogicalImage {
        LogicalImage::from_pixels(
            2,
            2,
            ImageDepth::Rgba32,
            vec![
                255, 0, 0, 255, 0, 255, 0, 255, //
                0, 0, 255, 255, 255, 255, 255, 255,
            ],
        )
        .expect("image")
    }

    fn palette_image() -> LogicalImage {
        let palette = Palette::new(vec![
            PaletteEntry::Color(Rgba::new(0, 0, 0, 255)),
            PaletteEntry::Background,
        ])
        .expect("palette");
        LogicalImage::from_pixels(3, 2, ImageDepth::Palette8, vec![0, 1, 0, 1, 0, 1])
            .expect("image")
            .with_palette(palette)
            .expect("palette image")
    }

    #[test]
    fn buffer_length_is_validated() {
        let err = LogicalImage::from_pixels(2, 2, ImageDepth::Rgb24, vec![0; 11]).unwrap_err();
        assert!(matches!(err, IupError::BufferSize { expected: 12, actual: 11 }));
        assert!(matches!(
            LogicalImage::new(0, 4, ImageDepth::Rgba32),
            Err(IupError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn palette_only_on_8bpp() {
        let result = LogicalImage::new(1, 1, ImageDepth::Rgb24)
            .expect("image")
            .with_palette(Palette::default());
        assert!(matches!(result, Err(IupError::UnsupportedDepth(24))));
    }

    #[test]
    fn background_palette_slot_marks_image_dependent() {
        let image = palette_image();
        assert!(image.is_bg_dependent());
        assert!(image.has_transparency());
    }

    #[test]
    fn resize_to_same_size_is_identity() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2();
        let before = image.pixels().to_vec();
        image.resize(2, 2, &mut backend).expect("resize");
        assert_eq!(image.pixels(), &before[..]);

        let mut pal = palette_image();
        let before = pal.pixels().to_vec();
        pal.resize(3, 2, &mut backend).expect("resize");
        assert_eq!(pal.pixels(), &before[..]);
    }

    #[test]
    fn resize_updates_size_and_keeps_corners() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2();
        image.resize(4, 4, &mut backend).expect("resize");

        assert_eq!((image.width(), image.height()), (4, 4));
        assert_eq!(image.pixels().len(), 4 * 4 * 4);
        assert_eq!(image.pixel(0, 0), Some(&[255, 0, 0, 255][..]));
        assert_eq!(image.pixel(3, 0), Some(&[0, 255, 0, 255][..]));
        assert_eq!(image.pixel(0, 3), Some(&[0, 0, 255, 255][..]));
        assert_eq!(image.pixel(3, 3), Some(&[255, 255, 255, 255][..]));
        assert_eq!(image.pixel(4, 0), None);
    }

    #[test]
    fn resize_palette_image_keeps_palette_indices() {
        let mut backend = HeadlessBackend::default();
        let mut image = palette_image();
        image.resize(6, 4, &mut backend).expect("resize");
        assert!(image.pixels().iter().all(|&i| i <= 1));
        assert!(image.palette().is_some());
    }

    #[test]
    fn resize_releases_cached_handles() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2();
        let old = image.icon(&mut backend).expect("icon");

        image.resize(8, 8, &mut backend).expect("resize");
        assert!(!backend.is_live(old));
        assert!(image.cache().is_empty());

        let new = image.icon(&mut backend).expect("icon");
        assert_ne!(old, new);
        image.destroy(&mut backend);
        assert_eq!(backend.live(), 0);
    }

    #[test]
    fn failed_resize_leaves_image_untouched() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2();
        let handle = image.icon(&mut backend).expect("icon");

        assert!(image.resize(0, 3, &mut backend).is_err());
        assert_eq!((image.width(), image.height()), (2, 2));
        assert!(backend.is_live(handle));
        image.destroy(&mut backend);
    }

    #[test]
    fn rendered_images_are_keyed_by_background() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2().with_background_dependent(true);

        let red = image
            .rendered(Some("FF0000".parse().expect("color")), false, &mut backend)
            .expect("red");
        let green = image
            .rendered(Some("00FF00".parse().expect("color")), false, &mut backend)
            .expect("green");
        assert_ne!(red, green);
        assert_eq!(image.cache().len(), 2);

        image.destroy(&mut backend);
        assert_eq!(backend.live(), 0);
    }

    #[test]
    fn inactive_rendition_is_cached_with_scratch_pixels() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2();
        let bg = Color::new(255, 255, 255);

        let a = image.rendered(Some(bg), true, &mut backend).expect("inactive");
        let b = image.rendered(Some(bg), true, &mut backend).expect("inactive");
        assert_eq!(a, b);
        assert_eq!(backend.created(), 1);
        assert!(image.cache().inactive_pixels(bg).is_some());

        image.clear_cache(&mut backend);
        assert!(image.cache().inactive_pixels(bg).is_none());
        image.clear_cache(&mut backend);
        assert_eq!(backend.destroyed(), 1);
    }

    #[test]
    fn inactive_renditions_differ_per_background() {
        let mut backend = HeadlessBackend::default();
        let mut image =
            LogicalImage::from_pixels(1, 1, ImageDepth::Rgb24, vec![0, 0, 0]).expect("image");
        assert!(!image.is_bg_dependent());
        let white = Color::new(255, 255, 255);
        let black = Color::new(10, 10, 10);

        let on_white = image.rendered(Some(white), true, &mut backend).expect("white");
        let on_black = image.rendered(Some(black), true, &mut backend).expect("black");
        assert_ne!(on_white, on_black);
        assert_eq!(backend.created(), 2);
        assert_eq!(image.cache().inactive_pixels(black), Some(&[5u8, 5, 5][..]));

        // Active renditions of a background-independent image still share one.
        let a = image.rendered(Some(white), false, &mut backend).expect("active");
        let b = image.rendered(Some(black), false, &mut backend).expect("active");
        assert_eq!(a, b);

        image.destroy(&mut backend);
        assert_eq!(backend.live(), 0);
    }

    #[test]
    fn inactive_view_of_palette_image_is_rgba() {
        let mut image = palette_image();
        let view = image.inactive_view(Color::new(200, 200, 200));
        assert_eq!(view.depth, ImageDepth::Rgba32);
        assert_eq!(view.pixels.len(), 3 * 2 * 4);
        assert_eq!(&view.pixels[0..4], &[100, 100, 100, 255]);
    }

    #[test]
    fn changing_background_dependence_clears_cache() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2();
        image.rendered(None, false, &mut backend).expect("image");
        image.set_background_dependent(true, &mut backend);
        assert!(image.cache().is_empty());
        assert_eq!(backend.live(), 0);
    }

    #[test]
    fn moving_hotspot_drops_only_the_cursor() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2();
        let icon = image.icon(&mut backend).expect("icon");
        let cursor = image.cursor(&mut backend).expect("cursor");

        image.set_hotspot(Hotspot { x: 1, y: 1 }, &mut backend);
        assert!(!backend.is_live(cursor));
        assert!(backend.is_live(icon));
        image.destroy(&mut backend);
    }

    #[test]
    fn pixel_edits_release_handles() {
        let mut backend = HeadlessBackend::default();
        let mut image = rgba_2x2();
        image.icon(&mut backend).expect("icon");
        image.update_pixels(&mut backend, |px| px.fill(0));
        assert!(image.pixels().iter().all(|&b| b == 0));
        assert_eq!(backend.live(), 0);
    }

    #[test]
    fn auto_scale_follows_screen_dpi() {
        let mut backend = HeadlessBackend::new(144);
        let config = ImageConfig {
            auto_scale: AutoScale::Dpi,
            ..ImageConfig::default()
        };
        let mut image = LogicalImage::new(16, 16, ImageDepth::Rgb24).expect("image");

        let metrics = HeadlessBackend::new(144);
        assert!(image.auto_scale(&config, &metrics, &mut backend).expect("scale"));
        assert_eq!((image.width(), image.height()), (24, 24));

        let off = ImageConfig::default();
        assert!(!image.auto_scale(&off, &metrics, &mut backend).expect("scale"));
    }
}
