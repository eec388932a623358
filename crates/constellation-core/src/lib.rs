//! Core types shared by the constellation crates.

use serde::Deserialize;

/// Drawable area measured in virtual pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Create a viewport of the given size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Area in square pixels.
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when either dimension is zero.
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Light or dark rendering, driving color and opacity only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Dark,
    Light,
}

impl DisplayMode {
    /// Switch to the other mode.
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Dark => DisplayMode::Light,
            DisplayMode::Light => DisplayMode::Dark,
        }
    }

    /// Whether this is the dark mode.
    pub fn is_dark(self) -> bool {
        self == DisplayMode::Dark
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::Dark => "dark",
            DisplayMode::Light => "light",
        }
    }
}

/// User preference for the display mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Follow whatever the host environment reports.
    #[default]
    Auto,
    Dark,
    Light,
}

impl ThemePreference {
    /// Resolve to a concrete mode, using `detected` for [`ThemePreference::Auto`].
    ///
    /// An environment that cannot report a preference falls back to dark.
    pub fn resolve(self, detected: Option<DisplayMode>) -> DisplayMode {
        match self {
            ThemePreference::Auto => detected.unwrap_or_default(),
            ThemePreference::Dark => DisplayMode::Dark,
            ThemePreference::Light => DisplayMode::Light,
        }
    }
}

/// Tunable constants of the constellation effect.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    /// Viewport area allotted to each point.
    pub area_per_point: u64,
    /// Upper bound on the number of points regardless of area.
    pub max_points: usize,
    /// Velocity components are drawn from `[-max_speed, max_speed)`.
    pub max_speed: f64,
    /// Smallest point radius.
    pub min_radius: f64,
    /// Point radii are drawn from `[min_radius, max_radius)`.
    pub max_radius: f64,
    /// Points closer than this are linked.
    pub link_distance: f64,
    /// Line opacity at zero distance.
    pub link_opacity: f64,
    /// Distance over which line opacity drops by one.
    pub link_falloff: f64,
    /// Line opacity multiplier in light mode.
    pub light_link_boost: f64,
    /// Point opacity in dark mode.
    pub dark_point_opacity: f64,
    /// Point opacity in light mode.
    pub light_point_opacity: f64,
    /// Stroke width of connecting lines.
    pub line_width: f64,
    /// Quiet period before a burst of resizes is handled.
    pub resize_debounce_ms: u64,
    /// Base hue shared by points and lines.
    pub base_color: [u8; 3],
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            area_per_point: 15_000,
            max_points: 100,
            max_speed: 0.25,
            min_radius: 1.0,
            max_radius: 3.0,
            link_distance: 150.0,
            link_opacity: 0.15,
            link_falloff: 1000.0,
            light_link_boost: 1.5,
            dark_point_opacity: 0.2,
            light_point_opacity: 0.4,
            line_width: 0.5,
            resize_debounce_ms: 200,
            base_color: [100, 116, 139],
        }
    }
}

impl FieldParams {
    /// Opacity of a point for the given mode.
    pub fn point_opacity(&self, mode: DisplayMode) -> f64 {
        match mode {
            DisplayMode::Dark => self.dark_point_opacity,
            DisplayMode::Light => self.light_point_opacity,
        }
    }
}
