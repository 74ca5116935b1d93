// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stock image registry — named images created on first use at the stock
// icon size of the current screen.
//
// The registry is an explicit object owned by the application context. It is
// created at startup and torn down (releasing every native handle) at
// shutdown.

use std::collections::BTreeMap;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use iup_bridge::{NativeImageFactory, ScreenMetrics};
use iup_core::config::ImageConfig;
use iup_core::error::{IupError, Result};
use tracing::{debug, info, instrument};

use crate::dpi;
use crate::image::LogicalImage;

/// Builds a stock image at the requested square size.
pub type StockCreator = fn(size: u32) -> Result<LogicalImage>;

struct StockEntry {
    creator: StockCreator,
    /// Name of the toolkit's own icon, when the driver has one.
    native_name: Option<String>,
    image: Option<LogicalImage>,
}

/// Name-to-image registry for stock images.
pub struct StockRegistry {
    size: u32,
    entries: BTreeMap<String, StockEntry>,
}

impl StockRegistry {
    /// Empty registry producing images of `size` pixels.
    pub fn new(size: u32) -> Self {
        Self {
            size: size.max(1),
            entries: BTreeMap::new(),
        }
    }

    /// Registry sized for the current screen, with the built-in images.
    pub fn for_screen<M>(config: &ImageConfig, metrics: &M) -> Self
    where
        M: ScreenMetrics + ?Sized,
    {
        let screen_dpi = dpi::effective_dpi(config, metrics);
        let size = dpi::stock_size(screen_dpi, config.stock_size);
        info!(screen_dpi, size, "stock registry initialised");
        let mut registry = Self::new(size);
        registry.register_builtins();
        registry
    }

    /// Register the built-in arrow, cancel, and tick images.
    pub fn register_builtins(&mut self) {
        self.register("IUP_ArrowUp", arrow_up, Some("go-up"));
        self.register("IUP_ArrowDown", arrow_down, Some("go-down"));
        self.register("IUP_Cancel", cancel, Some("process-stop"));
        self.register("IUP_Tick", tick, Some("object-select"));
    }

    /// Stock image size in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Add or replace a stock image. A previously created image under the
    /// same name is handed back so its native handles can be released.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        creator: StockCreator,
        native_name: Option<&str>,
    ) -> Option<LogicalImage> {
        let entry = StockEntry {
            creator,
            native_name: native_name.map(str::to_string),
            image: None,
        };
        self.entries
            .insert(name.into(), entry)
            .and_then(|old| old.image)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn native_name(&self, name: &str) -> Option<&str> {
        self.entries.get(name)?.native_name.as_deref()
    }

    /// Whether the image has been built yet.
    pub fn is_created(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.image.is_some())
    }

    /// The stock image, built on first request.
    pub fn get(&mut self, name: &str) -> Result<&mut LogicalImage> {
        let size = self.size;
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| IupError::UnknownStock(name.to_string()))?;

        if entry.image.is_none() {
            debug!(name, size, "creating stock image");
            entry.image = Some((entry.creator)(size)?);
        }
        entry
            .image
            .as_mut()
            .ok_or_else(|| IupError::UnknownStock(name.to_string()))
    }

    /// Release every created image and its native handles. Registrations
    /// stay, so images are rebuilt on the next request.
    #[instrument(skip_all, fields(entries = self.entries.len()))]
    pub fn teardown<F>(&mut self, factory: &mut F)
    where
        F: NativeImageFactory + ?Sized,
    {
        for (name, entry) in &mut self.entries {
            if let Some(image) = entry.image.take() {
                debug!(name = name.as_str(), "releasing stock image");
                image.destroy(factory);
            }
        }
    }
}

// -- Built-in images ----------------------------------------------------------

const ARROW_COLOR: Rgba<u8> = Rgba([64, 64, 64, 255]);
const CANCEL_COLOR: Rgba<u8> = Rgba([200, 40, 40, 255]);
const TICK_COLOR: Rgba<u8> = Rgba([40, 150, 40, 255]);

/// Scale a point laid out on a 24x24 grid to `size`.
fn grid_point(size: u32, x: f32, y: f32) -> Point<i32> {
    let k = size as f32 / 24.0;
    Point::new((x * k).round() as i32, (y * k).round() as i32)
}

fn draw_shapes(size: u32, color: Rgba<u8>, shapes: &[&[(f32, f32)]]) -> Result<LogicalImage> {
    let mut canvas = RgbaImage::new(size, size);
    for shape in shapes {
        let mut points: Vec<Point<i32>> =
            shape.iter().map(|&(x, y)| grid_point(size, x, y)).collect();
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() >= 3 {
            draw_polygon_mut(&mut canvas, &points, color);
        }
    }
    Ok(LogicalImage::from_dynamic(image::DynamicImage::ImageRgba8(canvas))?
        .with_background_dependent(true))
}

fn arrow_up(size: u32) -> Result<LogicalImage> {
    draw_shapes(
        size,
        ARROW_COLOR,
        &[
            &[(12.0, 4.0), (20.0, 13.0), (4.0, 13.0)],
            &[(9.0, 13.0), (15.0, 13.0), (15.0, 20.0), (9.0, 20.0)],
        ],
    )
}

fn arrow_down(size: u32) -> Result<LogicalImage> {
    draw_shapes(
        size,
        ARROW_COLOR,
        &[
            &[(4.0, 11.0), (20.0, 11.0), (12.0, 20.0)],
            &[(9.0, 4.0), (15.0, 4.0), (15.0, 11.0), (9.0, 11.0)],
        ],
    )
}

fn cancel(size: u32) -> Result<LogicalImage> {
    draw_shapes(
        size,
        CANCEL_COLOR,
        &[
            &[(5.0, 7.0), (7.0, 5.0), (19.0, 17.0), (17.0, 19.0)],
            &[(17.0, 5.0), (19.0, 7.0), (7.0, 19.0), (5.0, 17.0)],
        ],
    )
}

fn tick(size: u32) -> Result<LogicalImage> {
    draw_shapes(
        size,
        TICK_COLOR,
        &[
            &[(4.0, 12.0), (6.0, 10.0), (11.0, 15.0), (9.0, 17.0)],
            &[(9.0, 17.0), (18.0, 6.0), (20.0, 8.0), (11.0, 19.0)],
        ],
    )
}
