//! Constellation background lifecycle and per-frame rendering.

use std::time::{Duration, Instant};

use constellation_core::{DisplayMode, FieldParams, Viewport};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, trace};

use crate::color::{link_color, point_color};
use crate::debounce::Debouncer;
use crate::links::for_each_link;
use crate::point::{Point, populate};
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::surface::Surface;

/// Animated constellation background.
///
/// Idle until [`Constellation::activate`] hands it a surface; running until
/// [`Constellation::deactivate`] takes the surface back.
#[derive(Debug)]
pub struct Constellation<S, R = StdRng> {
    /// Tunable constants.
    params: FieldParams,
    /// Current light/dark mode.
    display_mode: DisplayMode,
    /// Source of point positions, velocities and radii.
    rng: R,
    /// Number of point sets built so far.
    generation: u64,
    /// Lifecycle state.
    state: State<S>,
}

#[derive(Debug)]
enum State<S> {
    Idle,
    Running(Session<S>),
}

/// Everything that only exists while running.
#[derive(Debug)]
struct Session<S> {
    surface: S,
    viewport: Viewport,
    points: Vec<Point>,
    resize: Debouncer<Viewport>,
    /// The single outstanding frame request.
    frame: Option<FrameHandle>,
}

impl<S: Surface> Constellation<S> {
    /// Create an idle background seeded from the operating system.
    pub fn new(params: FieldParams, display_mode: DisplayMode) -> Self {
        Self::with_rng(params, display_mode, StdRng::from_os_rng())
    }
}

impl<S: Surface, R: rand::Rng> Constellation<S, R> {
    /// Create an idle background drawing randomness from `rng`.
    pub fn with_rng(params: FieldParams, display_mode: DisplayMode, rng: R) -> Self {
        Self {
            params,
            display_mode,
            rng,
            generation: 0,
            state: State::Idle,
        }
    }

    /// Start animating onto `surface`.
    ///
    /// Seeds a point set for `viewport` and requests the first frame. If the
    /// background is already running the surface is handed back unused.
    pub fn activate(
        &mut self,
        mut surface: S,
        viewport: Viewport,
        scheduler: &mut impl FrameScheduler,
    ) -> Result<(), S> {
        if self.is_running() {
            return Err(surface);
        }

        surface.resize(viewport);
        let points = self.regenerate(viewport);
        debug!(
            width = viewport.width,
            height = viewport.height,
            points = points.len(),
            mode = self.display_mode.name(),
            "constellation activated"
        );

        self.state = State::Running(Session {
            surface,
            viewport,
            points,
            resize: Debouncer::new(Duration::from_millis(self.params.resize_debounce_ms)),
            frame: Some(scheduler.request_frame()),
        });
        Ok(())
    }

    /// Stop animating and hand the surface back.
    ///
    /// Cancels the outstanding frame and any pending resize. Calling this
    /// while idle does nothing and returns `None`.
    pub fn deactivate(&mut self, scheduler: &mut impl FrameScheduler) -> Option<S> {
        let State::Running(mut session) = std::mem::replace(&mut self.state, State::Idle) else {
            return None;
        };

        if let Some(handle) = session.frame.take() {
            scheduler.cancel_frame(handle);
        }
        session.resize.cancel();
        session.surface.release();
        debug!(generation = self.generation, "constellation deactivated");
        Some(session.surface)
    }

    /// Run one frame if `handle` is the outstanding request.
    ///
    /// Returns whether the frame was drawn. Stale or cancelled handles are
    /// ignored.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: Instant,
        scheduler: &mut impl FrameScheduler,
    ) -> bool {
        let expected = match &self.state {
            State::Running(session) => session.frame,
            State::Idle => None,
        };
        if expected != Some(handle) {
            trace!(frame = handle.id(), "ignoring stale frame");
            return false;
        }

        self.service_timers(now);

        let mode = self.display_mode;
        let State::Running(session) = &mut self.state else {
            return false;
        };

        for point in &mut session.points {
            point.step(session.viewport);
        }

        let drawn = session.surface.is_ready();
        if drawn {
            draw(session, mode, &self.params);
        }

        session.frame = Some(scheduler.request_frame());
        drawn
    }

    /// Note a viewport change; the point set is rebuilt once resizes settle.
    pub fn on_resize(&mut self, viewport: Viewport, now: Instant) {
        if let State::Running(session) = &mut self.state {
            session.resize.trigger(viewport, now);
        }
    }

    /// Apply a settled resize, if one is due at `now`.
    ///
    /// Returns whether the point set was rebuilt.
    pub fn service_timers(&mut self, now: Instant) -> bool {
        let due = match &mut self.state {
            State::Running(session) => session.resize.fire(now),
            State::Idle => None,
        };
        let Some(viewport) = due else {
            return false;
        };

        let points = self.regenerate(viewport);
        let State::Running(session) = &mut self.state else {
            return false;
        };
        session.surface.resize(viewport);
        session.viewport = viewport;
        session.points = points;
        debug!(
            width = viewport.width,
            height = viewport.height,
            points = session.points.len(),
            generation = self.generation,
            "rebuilt point set after resize"
        );
        true
    }

    /// Switch between light and dark rendering without touching the points.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if mode != self.display_mode {
            debug!(mode = mode.name(), "display mode changed");
        }
        self.display_mode = mode;
    }

    /// Current light/dark mode.
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Tunable constants in use.
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Whether the background is between activation and teardown.
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    /// Number of point sets built since creation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current points, empty while idle.
    pub fn points(&self) -> &[Point] {
        match &self.state {
            State::Running(session) => &session.points,
            State::Idle => &[],
        }
    }

    /// Viewport the points live in, if running.
    pub fn viewport(&self) -> Option<Viewport> {
        match &self.state {
            State::Running(session) => Some(session.viewport),
            State::Idle => None,
        }
    }

    /// The surface being drawn onto, if running.
    pub fn surface(&self) -> Option<&S> {
        match &self.state {
            State::Running(session) => Some(&session.surface),
            State::Idle => None,
        }
    }

    /// When the host must call [`Constellation::service_timers`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            State::Running(session) => session.resize.deadline(),
            State::Idle => None,
        }
    }

    fn regenerate(&mut self, viewport: Viewport) -> Vec<Point> {
        self.generation += 1;
        populate(&mut self.rng, viewport, &self.params)
    }
}

/// Paint one frame: every disk first, then the links between them.
fn draw<S: Surface>(session: &mut Session<S>, mode: DisplayMode, params: &FieldParams) {
    let surface = &mut session.surface;
    surface.begin_frame();

    let fill = point_color(mode, params);
    for point in &session.points {
        surface.fill_disk(point.x, point.y, point.radius, fill);
    }

    let points = &session.points;
    for_each_link(points, params.link_distance, |link| {
        let (a, b) = (&points[link.a], &points[link.b]);
        surface.stroke_line(
            (a.x, a.y),
            (b.x, b.y),
            params.line_width,
            link_color(link.distance, mode, params),
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Shape, ShapeBuffer};
    use crate::scheduler::FrameClock;

    type TestConstellation = Constellation<ShapeBuffer, StdRng>;

    fn constellation(mode: DisplayMode) -> TestConstellation {
        Constellation::with_rng(FieldParams::default(), mode, StdRng::seed_from_u64(42))
    }

    fn running(viewport: Viewport) -> (TestConstellation, FrameClock, Instant) {
        let now = Instant::now();
        let mut clock = FrameClock::new(Duration::from_millis(16), now);
        let mut bg = constellation(DisplayMode::Dark);
        bg.activate(ShapeBuffer::new(viewport), viewport, &mut clock)
            .expect("idle background activates");
        (bg, clock, now)
    }

    fn tick(bg: &mut TestConstellation, clock: &mut FrameClock, now: Instant) -> bool {
        let handle = clock.pending().expect("frame requested");
        bg.on_frame(handle, now, clock)
    }

    #[test]
    fn test_activate_seeds_points() {
        let (bg, clock, _) = running(Viewport::new(800, 600));
        assert!(bg.is_running());
        assert_eq!(bg.points().len(), 32);
        assert_eq!(bg.generation(), 1);
        assert!(clock.pending().is_some());
    }

    #[test]
    fn test_activate_twice_returns_surface() {
        let (mut bg, mut clock, _) = running(Viewport::new(800, 600));
        let second = ShapeBuffer::new(Viewport::new(10, 10));
        let rejected = bg.activate(second, Viewport::new(10, 10), &mut clock);
        assert!(rejected.is_err());
        assert_eq!(bg.viewport(), Some(Viewport::new(800, 600)));
    }

    #[test]
    fn test_frame_draws_points_then_links() {
        let (mut bg, mut clock, now) = running(Viewport::new(800, 600));
        assert!(tick(&mut bg, &mut clock, now));

        let shapes = bg.surface().expect("running").shapes();
        let disks = shapes
            .iter()
            .take_while(|s| matches!(s, Shape::Disk { .. }))
            .count();
        assert_eq!(disks, 32);
        assert!(
            shapes[disks..]
                .iter()
                .all(|s| matches!(s, Shape::Segment { width, .. } if *width == 0.5))
        );
    }

    #[test]
    fn test_frame_requests_next_frame() {
        let (mut bg, mut clock, now) = running(Viewport::new(800, 600));
        let first = clock.pending().expect("first frame");
        assert!(bg.on_frame(first, now, &mut clock));
        let second = clock.pending().expect("next frame");
        assert_ne!(first, second);

        // The consumed handle is stale now.
        assert!(!bg.on_frame(first, now, &mut clock));
        assert_eq!(bg.surface().expect("running").frames_drawn(), 1);
    }

    #[test]
    fn test_points_move_each_frame() {
        let (mut bg, mut clock, now) = running(Viewport::new(800, 600));
        let before = bg.points().to_vec();
        tick(&mut bg, &mut clock, now);
        let moved = bg
            .points()
            .iter()
            .zip(&before)
            .filter(|(after, before)| after.x != before.x || after.y != before.y)
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn test_display_mode_changes_colors_only() {
        let (mut bg, mut clock, now) = running(Viewport::new(800, 600));
        tick(&mut bg, &mut clock, now);
        let dark_alpha = match bg.surface().expect("running").shapes()[0] {
            Shape::Disk { color, .. } => color.alpha,
            _ => unreachable!("disks are drawn first"),
        };

        bg.set_display_mode(DisplayMode::Light);
        let generation = bg.generation();
        tick(&mut bg, &mut clock, now);
        let light_alpha = match bg.surface().expect("running").shapes()[0] {
            Shape::Disk { color, .. } => color.alpha,
            _ => unreachable!("disks are drawn first"),
        };

        assert_eq!(dark_alpha, 0.2);
        assert_eq!(light_alpha, 0.4);
        assert_eq!(bg.generation(), generation);
        assert_eq!(bg.points().len(), 32);
    }

    #[test]
    fn test_resize_burst_rebuilds_once() {
        let (mut bg, mut clock, start) = running(Viewport::new(800, 600));
        for i in 0..20u64 {
            let at = start + Duration::from_millis(i * 5);
            bg.on_resize(Viewport::new(800 + i as u32, 600), at);
            assert!(!bg.service_timers(at));
        }
        assert_eq!(bg.generation(), 1);

        let settled = start + Duration::from_millis(95 + 200);
        assert_eq!(bg.next_deadline(), Some(settled));
        tick(&mut bg, &mut clock, settled);

        assert_eq!(bg.generation(), 2);
        assert_eq!(bg.viewport(), Some(Viewport::new(819, 600)));
        assert_eq!(bg.surface().expect("running").viewport(), Viewport::new(819, 600));
        assert_eq!(bg.points().len(), 32);
        assert_eq!(bg.next_deadline(), None);
    }

    #[test]
    fn test_resize_replaces_point_set() {
        let (mut bg, _clock, start) = running(Viewport::new(800, 600));
        bg.on_resize(Viewport::new(1920, 1080), start);
        assert!(bg.service_timers(start + Duration::from_millis(200)));
        assert_eq!(bg.points().len(), 100);
        for p in bg.points() {
            assert!(p.x < 1920.0 && p.y < 1080.0);
        }
    }

    #[test]
    fn test_non_finite_params_still_animate() {
        let params = FieldParams {
            max_speed: f64::INFINITY,
            max_radius: f64::INFINITY,
            ..FieldParams::default()
        };
        let now = Instant::now();
        let mut clock = FrameClock::new(Duration::from_millis(16), now);
        let mut bg: TestConstellation =
            Constellation::with_rng(params, DisplayMode::Dark, StdRng::seed_from_u64(9));
        let viewport = Viewport::new(800, 600);
        bg.activate(ShapeBuffer::new(viewport), viewport, &mut clock)
            .expect("idle background activates");

        assert_eq!(bg.points().len(), 32);
        assert!(tick(&mut bg, &mut clock, now));
        for p in bg.points() {
            assert!(p.x >= 0.0 && p.x < 800.0);
            assert!(p.y >= 0.0 && p.y < 600.0);
        }
    }

    #[test]
    fn test_zero_size_surface_skips_drawing() {
        let (mut bg, mut clock, now) = running(Viewport::new(0, 0));
        assert!(bg.points().is_empty());
        assert!(!tick(&mut bg, &mut clock, now));
        assert_eq!(bg.surface().expect("running").frames_drawn(), 0);
        // The loop keeps going so a later resize can bring it to life.
        assert!(clock.pending().is_some());
    }

    #[test]
    fn test_deactivate_cancels_everything() {
        let (mut bg, mut clock, now) = running(Viewport::new(800, 600));
        tick(&mut bg, &mut clock, now);
        let outstanding = clock.pending().expect("frame requested");
        bg.on_resize(Viewport::new(100, 100), now);

        let surface = bg.deactivate(&mut clock).expect("was running");
        assert!(surface.is_released());
        assert_eq!(surface.frames_drawn(), 1);
        assert!(!bg.is_running());
        assert_eq!(clock.pending(), None);
        assert_eq!(bg.next_deadline(), None);

        assert!(!bg.on_frame(outstanding, now, &mut clock));
        assert!(!bg.service_timers(now + Duration::from_secs(1)));
        assert_eq!(bg.generation(), 1);
    }

    #[test]
    fn test_deactivate_twice() {
        let (mut bg, mut clock, _) = running(Viewport::new(800, 600));
        assert!(bg.deactivate(&mut clock).is_some());
        assert!(bg.deactivate(&mut clock).is_none());
        assert!(bg.points().is_empty());
        assert_eq!(bg.viewport(), None);
    }

    #[test]
    fn test_resize_while_idle_is_ignored() {
        let mut bg = constellation(DisplayMode::Dark);
        let now = Instant::now();
        bg.on_resize(Viewport::new(800, 600), now);
        assert!(!bg.service_timers(now + Duration::from_secs(1)));
        assert_eq!(bg.generation(), 0);
    }

    #[test]
    fn test_reactivate_after_teardown() {
        let (mut bg, mut clock, now) = running(Viewport::new(800, 600));
        bg.deactivate(&mut clock);
        bg.activate(ShapeBuffer::new(Viewport::new(800, 600)), Viewport::new(800, 600), &mut clock)
            .expect("idle again");
        assert!(tick(&mut bg, &mut clock, now));
        assert_eq!(bg.generation(), 2);
    }
}
