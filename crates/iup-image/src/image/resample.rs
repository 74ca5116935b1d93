// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel resampling: table-driven nearest-neighbour stretch for palette
// images and separable bilinear interpolation for RGB/RGBA.
//
// Both map destination index `i` to source position `i * (src-1)/(dst-1)`,
// so the first and last rows/columns land exactly on the source edges. A
// destination extent of 1 maps to source index 0.

use iup_core::error::{IupError, Result};

/// Source-per-destination step along one axis.
fn axis_factor(src: usize, dst: usize) -> f64 {
    if dst > 1 {
        (src - 1) as f64 / (dst - 1) as f64
    } else {
        0.0
    }
}

fn check_dims(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(IupError::InvalidDimensions {
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
        });
    }
    Ok(())
}

fn check_len(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() != expected {
        return Err(IupError::BufferSize {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Nearest-neighbour stretch of a one-byte-per-pixel image.
///
/// The horizontal lookup table is built once; each destination row picks its
/// source row with the same rounded linear mapping.
pub fn stretch_map(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    dst: &mut [u8],
    dst_width: usize,
    dst_height: usize,
) -> Result<()> {
    check_dims(src_width, src_height)?;
    check_dims(dst_width, dst_height)?;
    check_len(src, src_width * src_height)?;
    check_len(dst, dst_width * dst_height)?;

    let fx = axis_factor(src_width, dst_width);
    let xtab: Vec<usize> = (0..dst_width)
        .map(|x| ((fx * x as f64).round() as usize).min(src_width - 1))
        .collect();

    let fy = axis_factor(src_height, dst_height);
    for (y, row) in dst.chunks_exact_mut(dst_width).enumerate() {
        let sy = ((fy * y as f64).round() as usize).min(src_height - 1);
        let src_row = &src[sy * src_width..(sy + 1) * src_width];
        for (out, &sx) in row.iter_mut().zip(&xtab) {
            *out = src_row[sx];
        }
    }
    Ok(())
}

/// Interpolation sample along one axis: the two neighbouring source indices
/// and the weight of the higher one.
#[derive(Debug, Clone, Copy)]
struct AxisSample {
    lo: usize,
    hi: usize,
    frac: f64,
}

fn axis_samples(src: usize, dst: usize) -> Vec<AxisSample> {
    let factor = axis_factor(src, dst);
    (0..dst)
        .map(|i| {
            // Pin the last sample to the source edge so float error never
            // leaks a neighbour into it.
            if dst > 1 && i == dst - 1 {
                return AxisSample {
                    lo: src - 1,
                    hi: src - 1,
                    frac: 0.0,
                };
            }
            let pos = factor * i as f64;
            let lo = (pos.floor() as usize).min(src - 1);
            AxisSample {
                lo,
                hi: (lo + 1).min(src - 1),
                frac: pos - lo as f64,
            }
        })
        .collect()
}

/// Bilinear resize of an interleaved image with `channels` bytes per pixel.
///
/// Every channel, alpha included, is blended the same way (no
/// premultiplication); results are clamped to 0..=255 and truncated.
pub fn resize_bilinear(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    dst: &mut [u8],
    dst_width: usize,
    dst_height: usize,
    channels: usize,
) -> Result<()> {
    check_dims(src_width, src_height)?;
    check_dims(dst_width, dst_height)?;
    if channels == 0 {
        return Err(IupError::UnsupportedDepth(0));
    }
    check_len(src, src_width * src_height * channels)?;
    check_len(dst, dst_width * dst_height * channels)?;

    let cols = axis_samples(src_width, dst_width);
    let rows = axis_samples(src_height, dst_height);
    let src_stride = src_width * channels;

    for (row_out, ys) in dst.chunks_exact_mut(dst_width * channels).zip(&rows) {
        let u = ys.frac;
        let low_row = ys.lo * src_stride;
        let high_row = ys.hi * src_stride;

        for (px_out, xs) in row_out.chunks_exact_mut(channels).zip(&cols) {
            let t = xs.frac;
            let ll = low_row + xs.lo * channels;
            let hl = low_row + xs.hi * channels;
            let lh = high_row + xs.lo * channels;
            let hh = high_row + xs.hi * channels;

            for (c, out) in px_out.iter_mut().enumerate() {
                let fll = src[ll + c] as f64;
                let fhl = src[hl + c] as f64;
                let flh = src[lh + c] as f64;
                let fhh = src[hh + c] as f64;
                let value = u * t * (fhh - flh - fhl + fll)
                    + t * (fhl - fll)
                    + u * (flh - fll)
                    + fll;
                *out = value.clamp(0.0, 255.0) as u8;
            }
        }
    }
    Ok(())
}
