//! Color utility functions for the constellation background.

use constellation_core::{DisplayMode, FieldParams};
use ratatui::style::Color;

/// Dark backdrop (slate 900).
pub const DARK_BACKDROP: Rgb = Rgb::new(15, 23, 42);

/// Light backdrop (slate 50).
pub const LIGHT_BACKDROP: Rgb = Rgb::new(248, 250, 252);

/// Opaque color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from `[r, g, b]`.
    pub const fn from_array(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// Color with a floating point alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Rgba {
    /// Create a color, clamping `alpha` into `[0, 1]`.
    pub fn new(rgb: Rgb, alpha: f64) -> Self {
        let alpha = if alpha.is_nan() {
            0.0
        } else {
            alpha.clamp(0.0, 1.0)
        };
        Self { rgb, alpha }
    }

    /// Composite this color over an opaque backdrop.
    pub fn over(self, backdrop: Rgb) -> Rgb {
        let mix = |fg: u8, bg: u8| -> u8 {
            let v = fg as f64 * self.alpha + bg as f64 * (1.0 - self.alpha);
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            mix(self.rgb.r, backdrop.r),
            mix(self.rgb.g, backdrop.g),
            mix(self.rgb.b, backdrop.b),
        )
    }
}

/// Backdrop the effect is composited onto for the given mode.
pub fn backdrop(mode: DisplayMode) -> Rgb {
    match mode {
        DisplayMode::Dark => DARK_BACKDROP,
        DisplayMode::Light => LIGHT_BACKDROP,
    }
}

/// Fill color of a point.
pub fn point_color(mode: DisplayMode, params: &FieldParams) -> Rgba {
    Rgba::new(
        Rgb::from_array(params.base_color),
        params.point_opacity(mode),
    )
}

/// Stroke color of a line between two points `distance` apart.
pub fn link_color(distance: f64, mode: DisplayMode, params: &FieldParams) -> Rgba {
    Rgba::new(
        Rgb::from_array(params.base_color),
        link_opacity(distance, mode, params),
    )
}

/// Line opacity, fading linearly with distance and boosted in light mode.
pub fn link_opacity(distance: f64, mode: DisplayMode, params: &FieldParams) -> f64 {
    let opacity = params.link_opacity - distance / params.link_falloff;
    match mode {
        DisplayMode::Dark => opacity,
        DisplayMode::Light => opacity * params.light_link_boost,
    }
}
