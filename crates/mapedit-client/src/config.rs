//! Compile-time client settings.

use mapedit_core::Coord;

/// REST base, same-origin with the embedded SPA unless overridden at build time.
pub const API_BASE_URL: &str = match option_env!("MAPEDIT_API_BASE_URL") {
    Some(url) => url,
    None => "/api",
};

pub const INITIAL_CENTER: Coord = Coord::new(35.2137, 31.7683);
pub const INITIAL_ZOOM: f64 = 7.0;

/// Logical SVG canvas size; the element scales to its container.
pub const MAP_WIDTH: f64 = 1200.0;
pub const MAP_HEIGHT: f64 = 800.0;

/// Pointer travel, in canvas pixels, below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;
/// Zoom levels per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 0.5;
