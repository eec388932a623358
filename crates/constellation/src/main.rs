use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use color_eyre::eyre::WrapErr;
use constellation_background::{Constellation, FrameClock, ShapeBuffer};
use constellation_config::Config;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Style, Stylize},
    text::Line,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod preference;

/// Environment variable naming a file to write logs to.
const LOG_ENV: &str = "CONSTELLATION_LOG";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing()?;
    let config = Config::load()?;
    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    ratatui::restore();
    result
}

/// Log to the file named by `CONSTELLATION_LOG`, if any.
///
/// The terminal is the UI, so nothing is logged to stderr.
fn init_tracing() -> color_eyre::Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };
    let file = File::create(&path)
        .wrap_err_with(|| format!("failed to create log file {}", path.to_string_lossy()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// Loaded configuration.
    config: Config,
    /// Animated background.
    background: Constellation<ShapeBuffer>,
    /// Frame pacing for the background.
    clock: FrameClock,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        let detected = preference::detect();
        let mode = config.theme.resolve(detected);
        info!(?detected, mode = mode.name(), fps = config.fps, "starting");

        Self {
            running: false,
            background: Constellation::new(config.field.clone(), mode),
            clock: FrameClock::with_fps(config.fps, Instant::now()),
            config,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        let viewport = self.config.viewport(size.width, size.height);
        if self
            .background
            .activate(ShapeBuffer::new(viewport), viewport, &mut self.clock)
            .is_err()
        {
            warn!("background was already running");
        }

        self.running = true;
        let result = self.event_loop(&mut terminal);
        self.background.deactivate(&mut self.clock);
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        while self.running {
            let now = Instant::now();
            self.background.service_timers(now);
            if let Some(handle) = self.clock.take_due(now) {
                self.background.on_frame(handle, now, &mut self.clock);
                terminal.draw(|frame| self.render(frame))?;
            }
            self.handle_crossterm_events(self.wait_timeout(Instant::now()))?;
        }
        Ok(())
    }

    /// How long to wait for input before the next frame or resize is due.
    fn wait_timeout(&self, now: Instant) -> Duration {
        [self.clock.next_wakeup(), self.background.next_deadline()]
            .into_iter()
            .flatten()
            .min()
            .map_or(self.clock.interval(), |at| at.saturating_duration_since(now))
    }

    /// Renders the user interface.
    fn render(&self, frame: &mut Frame) {
        let mode = self.background.display_mode();
        let area = frame.area();

        if let Some(surface) = self.background.surface() {
            frame.render_widget(surface.widget(mode), area);
        }

        let (fg, muted) = if mode.is_dark() {
            (Color::Rgb(226, 232, 240), Color::Rgb(100, 116, 139))
        } else {
            (Color::Rgb(30, 41, 59), Color::Rgb(100, 116, 139))
        };

        let chunks = Layout::vertical([
            Constraint::Fill(1),   // Top padding
            Constraint::Length(1), // Title
            Constraint::Length(1), // Tagline
            Constraint::Fill(1),   // Bottom padding
            Constraint::Length(1), // Help text
        ])
        .split(area);

        let title = Line::from(self.config.title.as_str().bold().fg(fg)).centered();
        frame.render_widget(title, chunks[1]);

        let tagline = Line::from(self.config.tagline.as_str())
            .style(Style::new().fg(muted))
            .centered();
        frame.render_widget(tagline, chunks[2]);

        let help = Line::from(vec![
            "q".bold().fg(fg),
            " quit  ".fg(muted),
            "d".bold().fg(fg),
            format!(" {} mode", mode.toggle().name()).fg(muted),
        ])
        .centered();
        frame.render_widget(help, chunks[4]);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(columns, rows) => self.on_resize(columns, rows),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('d')) => self.toggle_display_mode(),
            _ => {}
        }
    }

    /// Forward a terminal resize to the background.
    fn on_resize(&mut self, columns: u16, rows: u16) {
        let viewport = self.config.viewport(columns, rows);
        debug!(columns, rows, "terminal resized");
        self.background.on_resize(viewport, Instant::now());
    }

    /// Switch between light and dark rendering.
    fn toggle_display_mode(&mut self) {
        let mode = self.background.display_mode().toggle();
        self.background.set_display_mode(mode);
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constellation_core::{DisplayMode, ThemePreference};
    use ratatui::{Terminal, backend::TestBackend};

    fn app(theme: ThemePreference) -> App {
        App::new(Config {
            theme,
            ..Config::default()
        })
    }

    #[test]
    fn test_toggle_display_mode() {
        let mut app = app(ThemePreference::Dark);
        app.on_key_event(KeyEvent::from(KeyCode::Char('d')));
        assert_eq!(app.background.display_mode(), DisplayMode::Light);
        app.on_key_event(KeyEvent::from(KeyCode::Char('d')));
        assert_eq!(app.background.display_mode(), DisplayMode::Dark);
    }

    #[test]
    fn test_quit_keys() {
        for key in [
            KeyEvent::from(KeyCode::Char('q')),
            KeyEvent::from(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = app(ThemePreference::Dark);
            app.running = true;
            app.on_key_event(key);
            assert!(!app.running);
        }
    }

    #[test]
    fn test_render_frame() {
        let mut app = app(ThemePreference::Light);
        let viewport = app.config.viewport(40, 12);
        app.background
            .activate(ShapeBuffer::new(viewport), viewport, &mut app.clock)
            .expect("activates");
        let handle = app.clock.pending().expect("frame requested");
        app.background
            .on_frame(handle, Instant::now(), &mut app.clock);

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).expect("test backend");
        terminal.draw(|frame| app.render(frame)).expect("draws");

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("constellation"));
        assert!(text.contains("dark mode"));
    }

    #[test]
    fn test_wait_timeout_tracks_resize_deadline() {
        let mut app = app(ThemePreference::Dark);
        let viewport = app.config.viewport(100, 40);
        app.background
            .activate(ShapeBuffer::new(viewport), viewport, &mut app.clock)
            .expect("activates");
        let now = Instant::now();
        assert!(app.wait_timeout(now) <= app.clock.interval());

        app.background.on_resize(app.config.viewport(120, 40), now);
        assert!(app.wait_timeout(now) <= app.clock.interval());
    }
}
