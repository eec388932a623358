//! Recording surface painted through a ratatui [`Canvas`].

use constellation_core::{DisplayMode, Viewport};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Context, Line, Points},
    },
};

use crate::color::{Rgba, backdrop};
use crate::surface::Surface;

/// A shape recorded during a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Disk {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgba,
    },
    Segment {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        color: Rgba,
    },
}

/// Surface that keeps the shapes of the last frame for painting later.
#[derive(Debug, Default)]
pub struct ShapeBuffer {
    viewport: Viewport,
    shapes: Vec<Shape>,
    /// Number of frames started since creation.
    frames: u64,
    released: bool,
}

impl ShapeBuffer {
    /// Create an empty buffer for `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Viewport the buffer is sized for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Shapes drawn in the current frame.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Number of frames drawn so far.
    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    /// Whether the renderer has let go of this buffer.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Widget painting the recorded frame for the given mode.
    pub fn widget(&self, mode: DisplayMode) -> ConstellationCanvas<'_> {
        ConstellationCanvas { buffer: self, mode }
    }
}

impl Surface for ShapeBuffer {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.shapes.clear();
    }

    fn is_ready(&self) -> bool {
        !self.released && !self.viewport.is_empty()
    }

    fn begin_frame(&mut self) {
        self.shapes.clear();
        self.frames += 1;
    }

    fn fill_disk(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.shapes.push(Shape::Disk {
            x,
            y,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgba) {
        self.shapes.push(Shape::Segment {
            from,
            to,
            width,
            color,
        });
    }

    fn release(&mut self) {
        self.shapes.clear();
        self.released = true;
    }
}

/// Full-area widget for a [`ShapeBuffer`].
///
/// Terminal colors have no alpha, so every shape is composited onto the
/// mode's backdrop before painting. Disks light every Braille dot they
/// overlap; lines are always one dot wide.
#[derive(Debug)]
pub struct ConstellationCanvas<'a> {
    buffer: &'a ShapeBuffer,
    mode: DisplayMode,
}

impl Widget for ConstellationCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let backdrop = backdrop(self.mode);
        let width = self.buffer.viewport.width as f64;
        let height = self.buffer.viewport.height as f64;
        // Braille packs 2x4 dots into each cell.
        let dot = (
            width / (area.width.max(1) as f64 * 2.0),
            height / (area.height.max(1) as f64 * 4.0),
        );

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(backdrop.into())
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for shape in &self.buffer.shapes {
                    paint_shape(ctx, shape, (width, height), dot, |c| {
                        c.over(backdrop).into()
                    });
                }
            })
            .render(area, buf);
    }
}

/// Canvas y grows upwards; surface y grows downwards.
fn paint_shape(
    ctx: &mut Context<'_>,
    shape: &Shape,
    (width, height): (f64, f64),
    dot: (f64, f64),
    color: impl Fn(Rgba) -> Color,
) {
    match shape {
        Shape::Disk {
            x,
            y,
            radius,
            color: c,
        } => {
            // Nothing wider than the viewport is visible.
            let radius = radius.min(width.max(height));
            let coords: Vec<(f64, f64)> = disk_dots(*x, *y, radius, dot)
                .into_iter()
                .map(|(dx, dy)| (dx, height - dy))
                .collect();
            ctx.draw(&Points {
                coords: &coords,
                color: color(*c),
            });
        }
        Shape::Segment {
            from, to, color: c, ..
        } => ctx.draw(&Line {
            x1: from.0,
            y1: height - from.1,
            x2: to.0,
            y2: height - to.1,
            color: color(*c),
        }),
    }
}

/// Centers of the `dot`-sized grid cells a disk overlaps, in surface
/// coordinates. The dot holding the center is always included.
fn disk_dots(x: f64, y: f64, radius: f64, dot: (f64, f64)) -> Vec<(f64, f64)> {
    let (dot_w, dot_h) = dot;
    if !(dot_w > 0.0 && dot_h > 0.0 && radius.is_finite()) {
        return vec![(x, y)];
    }
    let radius = radius.max(0.0);
    let first_col = ((x - radius) / dot_w).floor() as i64;
    let last_col = ((x + radius) / dot_w).floor() as i64;
    let first_row = ((y - radius) / dot_h).floor() as i64;
    let last_row = ((y + radius) / dot_h).floor() as i64;

    let mut dots = Vec::new();
    for row in first_row..=last_row {
        let top = row as f64 * dot_h;
        let ny = y.clamp(top, top + dot_h);
        for col in first_col..=last_col {
            let left = col as f64 * dot_w;
            let nx = x.clamp(left, left + dot_w);
            let (dx, dy) = (nx - x, ny - y);
            if dx * dx + dy * dy <= radius * radius {
                dots.push((left + dot_w / 2.0, top + dot_h / 2.0));
            }
        }
    }
    dots
}
