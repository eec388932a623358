//! Animated constellation background.
//!
//! A fixed set of points drifts across the viewport, bouncing off its
//! edges, and nearby points are joined by faint lines. The renderer is
//! driven by the host through a [`FrameScheduler`] and paints onto any
//! [`Surface`]; [`ShapeBuffer`] records frames and paints them with a
//! ratatui canvas.

mod canvas;
mod color;
mod debounce;
mod links;
mod point;
mod renderer;
mod scheduler;
mod surface;

pub use canvas::{ConstellationCanvas, Shape, ShapeBuffer};
pub use color::{Rgb, Rgba, backdrop, link_color, link_opacity, point_color};
pub use debounce::Debouncer;
pub use links::{Link, for_each_link, links};
pub use point::{Point, point_count, populate};
pub use renderer::Constellation;
pub use scheduler::{FrameClock, FrameHandle, FrameScheduler};
pub use surface::Surface;
