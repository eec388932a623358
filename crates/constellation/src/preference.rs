//! Terminal light/dark preference detection.

use constellation_core::DisplayMode;

/// Environment variable set by many terminals as `fg;bg` color indices.
const COLORFGBG: &str = "COLORFGBG";

/// Ask the environment which mode the terminal is in.
///
/// Returns `None` when the terminal does not say.
pub fn detect() -> Option<DisplayMode> {
    std::env::var(COLORFGBG)
        .ok()
        .and_then(|value| parse_colorfgbg(&value))
}

/// Interpret a `COLORFGBG` value by its last (background) field.
///
/// ANSI indices 0-6 and 8 are dark backgrounds; everything else is light.
pub fn parse_colorfgbg(value: &str) -> Option<DisplayMode> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(DisplayMode::Dark),
        7 | 9..=15 => Some(DisplayMode::Light),
        _ => None,
    }
}
