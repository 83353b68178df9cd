//! Composite recommendation panel

use super::{area_status, events, heading, or_placeholder, render_inlines, NO_INFO};
use crate::api::{Analysis, RecommendationResult};
use crate::formatter::{format_recommendation, RecommendationSections};
use colored::Colorize;

/// Shown when events exist but the service produced no narrative
pub const NO_PERSONALIZED: &str = "현재 사용자 정보에 기반한 맞춤 행사 추천을 생성하지 못했습니다. \
더 정확한 추천을 위해 사용자 설정을 업데이트하거나 다른 지역을 검색해보세요.";

/// Render a loaded recommendation
pub fn render(result: &RecommendationResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{} 추천 정보\n", result.area.bold().cyan()));
    out.push_str(&format!(
        "입력하신 위치와 가장 가까운 주요 지역은 '{}'입니다.\n",
        result.area.bold()
    ));
    if let Some(c) = result.status.coordinates {
        out.push_str(&format!("좌표 정보: 위도 {}, 경도 {}\n", c.lat, c.lng));
    }
    out.push('\n');

    if let Some(status) = area_status::render(&result.area, &result.status) {
        out.push_str(&status);
        out.push('\n');
    }

    if !result.events.is_empty() {
        out.push_str(&heading("🎯 맞춤 행사 추천"));
        match result
            .personalized_recommendation
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        {
            Some(text) => out.push_str(&render_sections(&format_recommendation(text))),
            None => {
                out.push_str(&format!("  {}\n", NO_PERSONALIZED));
            }
        }
        out.push('\n');
    }

    render_analysis(&mut out, &result.analysis);
    out.push('\n');
    out.push_str(&events::render(&result.events));

    out
}

fn render_analysis(out: &mut String, analysis: &Analysis) {
    out.push_str(&heading("🤖 AI 큐레이터의 분석"));
    for (label, value) in [
        ("현재 상황 평가", &analysis.situation),
        ("최적의 방문 시간대", &analysis.best_time),
        ("추천 동선", &analysis.route),
        ("주의사항", &analysis.warnings),
    ] {
        out.push_str(&format!(
            "  {}\n    {}\n",
            label.underline(),
            or_placeholder(value.as_deref(), NO_INFO)
        ));
    }
}

/// Render formatted narrative sections with indentation and emphasis
pub fn render_sections(sections: &RecommendationSections) -> String {
    let mut out = String::new();
    for section in sections.iter() {
        if let Some(title) = section.title {
            out.push_str(&format!("  {}\n", title.bold().yellow()));
        }
        out.push_str(&format!("    {}\n", render_inlines(&section.inlines, "    ")));
    }
    out
}
