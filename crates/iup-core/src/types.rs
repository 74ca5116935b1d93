// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core value types shared by the image core and the native bridges.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IupError, Result};

/// An opaque RGB colour, as used for background colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Renders the toolkit's attribute form, `"R G B"`.
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.r, self.g, self.b)
    }
}

/// Accepts `"R G B"` (decimal, whitespace separated) and `"#RRGGBB"` /
/// `"RRGGBB"` (hex).
impl FromStr for Color {
    type Err = IupError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || IupError::InvalidColor(s.to_string());

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.len() == 3 {
            let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
            return Ok(Self::new(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
            ));
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        Err(invalid())
    }
}

/// A colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(color: Color) -> Self {
        Self::new(color.r, color.g, color.b, 255)
    }

    pub const fn rgb(&self) -> Color {
        Color::new(self.r, self.g, self.b)
    }
}

/// Pixel layout of a logical image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageDepth {
    /// 8 bits per pixel, indices into a palette.
    Palette8,
    /// 24 bits per pixel, interleaved RGB.
    Rgb24,
    /// 32 bits per pixel, interleaved RGBA.
    Rgba32,
}

impl ImageDepth {
    /// Bytes per pixel.
    pub const fn channels(self) -> usize {
        match self {
            Self::Palette8 => 1,
            Self::Rgb24 => 3,
            Self::Rgba32 => 4,
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Palette8 => 8,
            Self::Rgb24 => 24,
            Self::Rgba32 => 32,
        }
    }

    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            8 => Ok(Self::Palette8),
            24 => Ok(Self::Rgb24),
            32 => Ok(Self::Rgba32),
            other => Err(IupError::UnsupportedDepth(other)),
        }
    }
}

/// One palette slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteEntry {
    Color(Rgba),
    /// Rendered with whatever background the image is drawn on.
    Background,
}

/// Maximum number of palette entries for an 8bpp image.
pub const PALETTE_SIZE: usize = 256;

/// Palette of an 8bpp image. Only the first contiguous run of defined
/// entries is used; indices past the end resolve to transparent black.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Result<Self> {
        if entries.len() > PALETTE_SIZE {
            return Err(IupError::PaletteTooLarge(entries.len()));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [PaletteEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_background(&self) -> bool {
        self.entries.contains(&PaletteEntry::Background)
    }

    /// Resolve an index to a colour; `Background` entries become `bgcolor`
    /// with full alpha, or fully transparent when no background is known.
    pub fn resolve(&self, index: u8, bgcolor: Option<Color>) -> Rgba {
        match self.entries.get(index as usize) {
            Some(PaletteEntry::Color(c)) => *c,
            Some(PaletteEntry::Background) => match bgcolor {
                Some(bg) => Rgba::opaque(bg),
                None => Rgba::new(0, 0, 0, 0),
            },
            None => Rgba::new(0, 0, 0, 0),
        }
    }
}

/// Cursor hotspot, in image pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: u32,
    pub y: u32,
}

/// Which native object a handle refers to. Handles must be destroyed with
/// the same kind they were created as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Icon,
    Cursor,
    Image,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Icon => "icon",
            Self::Cursor => "cursor",
            Self::Image => "image",
        };
        f.write_str(name)
    }
}

/// Borrowed description of a logical image, handed to native factories.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    pub width: u32,
    pub height: u32,
    pub depth: ImageDepth,
    pub pixels: &'a [u8],
    pub palette: Option<&'a Palette>,
    pub hotspot: Hotspot,
}

impl ImageView<'_> {
    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.depth.channels()
    }
}
