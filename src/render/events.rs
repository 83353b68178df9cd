//! Cultural event cards

use super::{heading, non_empty, or_placeholder, scalar_or};
use crate::api::{EventList, EventRecord};
use colored::Colorize;
use url::Url;

/// Shown instead of cards when the list is empty
pub const NO_EVENTS: &str = "현재 등록된 문화 행사 정보가 없습니다.";

const KAKAO_SEARCH_BASE: &str = "https://map.kakao.com/link/search/";

/// Kakao map search link for a place name, the name percent-encoded as one
/// path segment
///
/// # Examples
///
/// ```
/// use culture_guide::render::events::kakao_map_url;
///
/// assert_eq!(
///     kakao_map_url("서울 광장"),
///     "https://map.kakao.com/link/search/%EC%84%9C%EC%9A%B8%20%EA%B4%91%EC%9E%A5"
/// );
/// ```
pub fn kakao_map_url(place: &str) -> String {
    let Ok(mut url) = Url::parse(KAKAO_SEARCH_BASE) else {
        return KAKAO_SEARCH_BASE.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(place);
    }
    url.to_string()
}

/// Render the event list
pub fn render(events: &EventList) -> String {
    let mut out = heading("🎭 문화 행사 정보");

    if events.is_empty() {
        out.push_str(&format!("  {}\n", NO_EVENTS.dimmed()));
        return out;
    }

    let shown = events.data.len();
    out.push_str(&format!(
        "  총 {}개의 행사 중 {}개 표시\n\n",
        scalar_or(events.total_count.as_ref(), &shown.to_string()),
        shown
    ));

    for (i, event) in events.data.iter().enumerate() {
        render_card(&mut out, i + 1, event);
    }

    out
}

fn render_card(out: &mut String, index: usize, event: &EventRecord) {
    out.push_str(&format!(
        "  {}. {}  [{}]\n",
        index,
        or_placeholder(event.title.as_deref(), "제목 없음").bold(),
        or_placeholder(event.codename.as_deref(), "분류 없음").cyan()
    ));

    match non_empty(event.place.as_deref()) {
        Some(place) => {
            out.push_str(&format!(
                "     장소: {} 📍 {}\n",
                place,
                kakao_map_url(place).underline()
            ));
        }
        None => {
            out.push_str("     장소: 장소 미정\n");
        }
    }

    out.push_str(&format!(
        "     날짜: {}\n",
        or_placeholder(event.date.as_deref(), "날짜 미정")
    ));
    out.push_str(&format!(
        "     요금: {}\n",
        or_placeholder(event.use_fee.as_deref(), "요금 정보 없음")
    ));

    if let Some(program) = non_empty(event.program.as_deref()) {
        out.push_str(&format!("     프로그램: {}\n", program));
    }

    out.push('\n');
}
