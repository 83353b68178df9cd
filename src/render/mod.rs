//! Terminal renderers for service payloads
//!
//! Every renderer returns a `String` so commands decide where it goes and
//! tests can inspect it. Shared vocabulary (congestion and traffic badges,
//! time formatting, placeholders, map links) lives here.

use crate::api::{Coordinates, Scalar};
use crate::formatter::Inline;
use chrono::NaiveDateTime;
use colored::{Color, Colorize};
use url::Url;

pub mod area_status;
pub mod events;
pub mod map;
pub mod recommendation;

/// Shown for any value the service did not provide
pub const NO_INFO: &str = "정보 없음";

/// Color of a congestion level (`여유`, `보통`, `약간 붐빔`, `붐빔`)
///
/// Orange has no portable ANSI code, so slightly busy renders yellow.
pub fn congestion_color(level: Option<&str>) -> Color {
    match level.map(str::trim) {
        Some("여유") => Color::Green,
        Some("보통") => Color::Blue,
        Some("약간 붐빔") => Color::Yellow,
        Some("붐빔") => Color::Red,
        _ => Color::BrightBlack,
    }
}

/// Color of a road traffic status (`원활`, `서행`, `정체`)
pub fn traffic_color(status: Option<&str>) -> Color {
    match status.map(str::trim) {
        Some("원활") => Color::Green,
        Some("서행") => Color::Yellow,
        Some("정체") => Color::Red,
        _ => Color::BrightBlack,
    }
}

/// Bracketed, colored label
pub fn badge(text: &str, color: Color) -> String {
    format!("[{}]", text.color(color).bold())
}

/// Congestion badge, `정보 없음` when the level is missing
pub fn congestion_badge(level: Option<&str>) -> String {
    badge(non_empty(level).unwrap_or(NO_INFO), congestion_color(level))
}

/// Format a data timestamp as `HH:MM`
///
/// Timestamps in `YYYY-MM-DD HH:MM[:SS]` form are shortened; anything else is
/// returned as given.
///
/// # Examples
///
/// ```
/// use culture_guide::render::format_time;
///
/// assert_eq!(format_time(Some("2024-05-01 14:35:12")), "14:35");
/// assert_eq!(format_time(Some("곧")), "곧");
/// assert_eq!(format_time(None), "정보 없음");
/// ```
pub fn format_time(timestamp: Option<&str>) -> String {
    let Some(raw) = non_empty(timestamp) else {
        return NO_INFO.to_string();
    };

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// `Some` only for a value with visible content
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Text or a placeholder
pub fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    non_empty(value).unwrap_or(placeholder)
}

/// Scalar text or a placeholder
pub fn scalar_or(value: Option<&Scalar>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.is_blank() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

/// OpenStreetMap link centered on a point with a marker
///
/// # Examples
///
/// ```
/// use culture_guide::api::Coordinates;
/// use culture_guide::render::map_link;
///
/// let link = map_link(Coordinates { lat: 37.5665, lng: 126.978 });
/// assert!(link.ends_with("#map=15/37.5665/126.978"));
/// ```
pub fn map_link(coordinates: Coordinates) -> String {
    let lat = coordinates.lat.to_string();
    let lng = coordinates.lng.to_string();
    match Url::parse_with_params(
        "https://www.openstreetmap.org/",
        &[("mlat", lat.as_str()), ("mlon", lng.as_str())],
    ) {
        Ok(mut url) => {
            url.set_fragment(Some(&format!("map=15/{}/{}", lat, lng)));
            url.to_string()
        }
        Err(_) => format!("https://www.openstreetmap.org/#map=15/{}/{}", lat, lng),
    }
}

/// Styled text of formatted inlines; continuation lines start with `indent`
pub fn render_inlines(inlines: &[Inline], indent: &str) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(text) => out.push_str(&text.bold().to_string()),
            Inline::LineBreak => {
                out.push('\n');
                out.push_str(indent);
            }
            Inline::Bullet => out.push_str("• "),
        }
    }
    out
}

/// Heading line used by every renderer
pub(crate) fn heading(text: &str) -> String {
    format!("{}\n", text.bold())
}
