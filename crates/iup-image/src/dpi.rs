// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Screen-density rules: stock icon sizes and automatic image scaling.

use iup_bridge::ScreenMetrics;
use iup_core::config::{AutoScale, ImageConfig};

/// Stock icon sizes, smallest first.
pub const STOCK_SIZES: [u32; 3] = [24, 32, 48];

/// DPI the logical image sizes are designed for.
pub const BASE_DPI: u32 = 96;

/// DPI reported by `metrics`, unless the configuration overrides it.
pub fn effective_dpi<M: ScreenMetrics + ?Sized>(config: &ImageConfig, metrics: &M) -> u32 {
    config.screen_dpi.unwrap_or_else(|| metrics.screen_dpi()).max(1)
}

/// Stock icon size for a screen.
///
/// An explicit size snaps to the nearest of 24, 32, or 48. Otherwise the
/// DPI decides: 192 and up gives 48, 144 and up gives 32, anything lower 24.
pub fn stock_size(screen_dpi: u32, explicit: Option<u32>) -> u32 {
    match explicit {
        Some(size) => STOCK_SIZES
            .iter()
            .copied()
            .min_by_key(|s| s.abs_diff(size))
            .unwrap_or(STOCK_SIZES[0]),
        None if screen_dpi >= 192 => 48,
        None if screen_dpi >= 144 => 32,
        None => 24,
    }
}

/// Scale factor requested by the configuration, or `None` when it is close
/// enough to 1.0 that images should stay as they are.
pub fn auto_scale_factor(config: &ImageConfig, screen_dpi: u32) -> Option<f64> {
    let factor = match config.auto_scale {
        AutoScale::Off => return None,
        AutoScale::Dpi => screen_dpi as f64 / BASE_DPI as f64,
        AutoScale::Factor(f) => f,
    };
    if !factor.is_finite() || factor <= 0.0 {
        tracing::warn!(factor, "ignoring invalid auto-scale factor");
        return None;
    }
    if (factor - 1.0).abs() <= config.scale_tolerance {
        return None;
    }
    Some(factor)
}

/// Target size for scaling `width`x`height` by `factor`.
///
/// The height never drops below `min_height` (or the original height, if
/// that is already smaller); the width follows the effective height ratio so
/// the aspect is kept.
pub fn scaled_size(width: u32, height: u32, factor: f64, min_height: u32) -> (u32, u32) {
    let floor = min_height.min(height).max(1);
    let new_height = ((height as f64 * factor).round() as u32).max(floor);
    let effective = new_height as f64 / height.max(1) as f64;
    let new_width = ((width as f64 * effective).round() as u32).max(1);
    (new_width, new_height)
}
