//! Drawing surface abstraction.

use constellation_core::Viewport;

use crate::color::Rgba;

/// Something the renderer can paint onto.
///
/// The renderer takes ownership of the surface on activation and hands it
/// back on deactivation, after calling [`Surface::release`].
pub trait Surface {
    /// Match the surface to a new viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Whether drawing calls would have any effect.
    fn is_ready(&self) -> bool;

    /// Start a frame, clearing whatever the previous one drew.
    fn begin_frame(&mut self);

    /// Fill a disk centered on `(x, y)`.
    fn fill_disk(&mut self, x: f64, y: f64, radius: f64, color: Rgba);

    /// Stroke a straight line.
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgba);

    /// Free anything held for drawing.
    fn release(&mut self) {}
}
