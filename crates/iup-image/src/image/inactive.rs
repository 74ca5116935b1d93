// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Greyed-out ("inactive") renditions of images, as drawn on disabled
// controls.

use iup_core::types::{Color, ImageDepth, Palette, Rgba};

/// Background assumed when the caller does not know the real one.
pub const DEFAULT_BGCOLOR: Color = Color::new(240, 240, 240);

/// Grey one colour against the background. Colours equal to the background
/// stay as they are; everything else becomes the average of its luma and
/// the background channel.
pub fn make_inactive(rgb: [u8; 3], bg: Color) -> [u8; 3] {
    let [r, g, b] = rgb;
    if Color::new(r, g, b) == bg {
        return rgb;
    }
    let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
    let mix = |channel: u8| ((luma + channel as u32) / 2) as u8;
    [mix(bg.r), mix(bg.g), mix(bg.b)]
}

/// Greyed-out copy of an image's pixels.
///
/// RGB and RGBA keep their layout (alpha untouched). Palette images are
/// expanded to RGBA, with `Background` entries resolved to `bg`.
pub fn inactive_pixels(
    pixels: &[u8],
    depth: ImageDepth,
    palette: Option<&Palette>,
    bg: Color,
) -> (ImageDepth, Vec<u8>) {
    match depth {
        ImageDepth::Palette8 => {
            let mut out = Vec::with_capacity(pixels.len() * 4);
            for &index in pixels {
                let color = palette
                    .map(|p| p.resolve(index, Some(bg)))
                    .unwrap_or_else(|| Rgba::new(index, index, index, 255));
                let [r, g, b] = make_inactive([color.r, color.g, color.b], bg);
                out.extend_from_slice(&[r, g, b, color.a]);
            }
            (ImageDepth::Rgba32, out)
        }
        ImageDepth::Rgb24 | ImageDepth::Rgba32 => {
            let channels = depth.channels();
            let mut out = pixels.to_vec();
            for px in out.chunks_exact_mut(channels) {
                let [r, g, b] = make_inactive([px[0], px[1], px[2]], bg);
                px[0] = r;
                px[1] = g;
                px[2] = b;
            }
            (depth, out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iup_core::types::PaletteEntry;

    #[test]
    fn background_coloured_pixels_are_preserved() {
        let bg = Color::new(10, 20, 30);
        assert_eq!(make_inactive([10, 20, 30], bg), [10, 20, 30]);
    }

    #[test]
    fn black_on_white_becomes_mid_grey() {
        let bg = Color::new(255, 255, 255);
        assert_eq!(make_inactive([0, 0, 0], bg), [127, 127, 127]);
    }

    #[test]
    fn rgba_alpha_is_untouched() {
        let pixels = [0, 0, 0, 77, 255, 255, 255, 200];
        let (depth, out) =
            inactive_pixels(&pixels, ImageDepth::Rgba32, None, Color::new(255, 255, 255));
        assert_eq!(depth, ImageDepth::Rgba32);
        assert_eq!(out[3], 77);
        assert_eq!(&out[4..8], &[255, 255, 255, 200]);
    }

    #[test]
    fn palette_images_expand_to_rgba() {
        let palette = Palette::new(vec![
            PaletteEntry::Color(Rgba::new(0, 0, 0, 255)),
            PaletteEntry::Background,
        ])
        .expect("palette");
        let bg = Color::new(200, 200, 200);
        let (depth, out) = inactive_pixels(&[0, 1], ImageDepth::Palette8, Some(&palette), bg);

        assert_eq!(depth, ImageDepth::Rgba32);
        assert_eq!(&out[0..4], &[100, 100, 100, 255]);
        assert_eq!(&out[4..8], &[200, 200, 200, 255]);
    }
}
