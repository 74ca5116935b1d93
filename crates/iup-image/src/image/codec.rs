// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image file codec — load logical images from PNG/JPEG/etc. and write them
// back out, using the `image` crate for the encoded formats.

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use iup_core::error::{IupError, Result};
use iup_core::types::ImageDepth;
use tracing::{debug, info, instrument};

use super::LogicalImage;

impl LogicalImage {
    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            IupError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Self::from_dynamic(img)
    }

    /// Decode an image from encoded bytes (PNG, JPEG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| IupError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Self::from_dynamic(img)
    }

    /// Convert a decoded image. Opaque RGB stays 24bpp, everything else
    /// (grey, alpha, 16-bit, float) becomes 32bpp RGBA.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageRgb8(rgb) => {
                let (w, h) = rgb.dimensions();
                Self::from_pixels(w, h, ImageDepth::Rgb24, rgb.into_raw())
            }
            other => {
                let rgba = other.into_rgba8();
                let (w, h) = rgba.dimensions();
                let bg_dependent = rgba.pixels().any(|p| p.0[3] != 255);
                Ok(Self::from_pixels(w, h, ImageDepth::Rgba32, rgba.into_raw())?
                    .with_background_dependent(bg_dependent))
            }
        }
    }

    /// Build a `DynamicImage`. Palette images are expanded to RGBA, with
    /// background slots left fully transparent.
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let (w, h) = (self.width(), self.height());
        let size_error = || IupError::ImageError(format!("pixel buffer does not fit {w}x{h}"));
        match self.depth() {
            ImageDepth::Rgb24 => RgbImage::from_raw(w, h, self.pixels().to_vec())
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(size_error),
            ImageDepth::Rgba32 => RgbaImage::from_raw(w, h, self.pixels().to_vec())
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(size_error),
            ImageDepth::Palette8 => {
                let palette = self.palette().cloned().unwrap_or_default();
                let mut raw = Vec::with_capacity(self.pixels().len() * 4);
                for &index in self.pixels() {
                    let c = palette.resolve(index, None);
                    raw.extend_from_slice(&[c.r, c.g, c.b, c.a]);
                }
                RgbaImage::from_raw(w, h, raw)
                    .map(DynamicImage::ImageRgba8)
                    .ok_or_else(size_error)
            }
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.to_dynamic()?, ImageFormat::Png)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.to_dynamic()?.save(path.as_ref()).map_err(|err| {
            IupError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| IupError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}
