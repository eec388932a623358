//! Drifting points (stateful).

use constellation_core::{FieldParams, Viewport};
use rand::Rng;

/// A single drifting point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal position in `[0, width)`.
    pub x: f64,
    /// Vertical position in `[0, height)`.
    pub y: f64,
    /// Horizontal velocity per frame.
    pub vx: f64,
    /// Vertical velocity per frame.
    pub vy: f64,
    /// Disk radius.
    pub radius: f64,
}

impl Point {
    /// Spawn a point at a uniformly random position inside `viewport`.
    ///
    /// The viewport must not be empty.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport, params: &FieldParams) -> Self {
        let width = viewport.width as f64;
        let height = viewport.height as f64;
        Self {
            x: uniform(rng, 0.0, width).min(last_inside(width)),
            y: uniform(rng, 0.0, height).min(last_inside(height)),
            vx: uniform(rng, -params.max_speed, params.max_speed),
            vy: uniform(rng, -params.max_speed, params.max_speed),
            radius: uniform(rng, params.min_radius, params.max_radius),
        }
    }

    /// Advance one frame, bouncing off the viewport edges.
    ///
    /// Each axis is reflected independently, so a corner hit flips both
    /// components.
    pub fn step(&mut self, viewport: Viewport) {
        (self.x, self.vx) = reflect(self.x, self.vx, viewport.width as f64);
        (self.y, self.vy) = reflect(self.y, self.vy, viewport.height as f64);
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Number of points for a viewport: one per `area_per_point`, capped at `max_points`.
pub fn point_count(viewport: Viewport, params: &FieldParams) -> usize {
    let by_area = viewport
        .area()
        .checked_div(params.area_per_point)
        .unwrap_or(u64::MAX);
    usize::try_from(by_area)
        .unwrap_or(usize::MAX)
        .min(params.max_points)
}

/// Build a fresh point set sized for `viewport`.
pub fn populate<R: Rng + ?Sized>(
    rng: &mut R,
    viewport: Viewport,
    params: &FieldParams,
) -> Vec<Point> {
    if viewport.is_empty() {
        return Vec::new();
    }
    (0..point_count(viewport, params))
        .map(|_| Point::spawn(rng, viewport, params))
        .collect()
}

/// Move `pos` by `vel` along one axis, inverting `vel` when the move would
/// leave `[0, extent)`.
fn reflect(pos: f64, vel: f64, extent: f64) -> (f64, f64) {
    let inside = |v: f64| v >= 0.0 && v < extent;

    let next = pos + vel;
    if inside(next) {
        return (next, vel);
    }

    let vel = -vel;
    let bounced = pos + vel;
    if inside(bounced) {
        (bounced, vel)
    } else {
        (pos.clamp(0.0, last_inside(extent).max(0.0)), vel)
    }
}

/// Largest coordinate strictly below `extent`.
fn last_inside(extent: f64) -> f64 {
    extent - extent * f64::EPSILON
}

/// Uniform draw from `[low, high)`.
///
/// Empty or non-finite ranges yield `low`, or zero when `low` is not finite.
fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low && (high - low).is_finite() {
        rng.random_range(low..high)
    } else if low.is_finite() {
        low
    } else {
        0.0
    }
}
