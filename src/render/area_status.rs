//! Live status block of a recommended area

use super::{
    badge, congestion_badge, congestion_color, format_time, heading, map_link, non_empty,
    or_placeholder, scalar_or, traffic_color, NO_INFO,
};
use crate::api::{AreaStatus, Commercial, Forecast, Population};
use colored::Colorize;
use prettytable::{format, row, Table};

/// Render the status of `area`
///
/// Returns `None` unless both population and traffic data are present.
pub fn render(area: &str, status: &AreaStatus) -> Option<String> {
    let population = status.population.as_ref()?;
    let traffic = status.traffic.as_ref()?;

    let mut out = heading("📍 현재 현황");

    out.push_str(&format!(
        "  실시간 혼잡도  {}  {}\n",
        congestion_badge(population.congestion_level.as_deref()),
        or_placeholder(
            population.congestion_message.as_deref(),
            "현재 도보 상황 정보가 없습니다."
        )
    ));

    let range = population.population_range.as_ref();
    out.push_str(&format!(
        "  현재 인구      {} ~ {}명  (데이터 업데이트: {})\n",
        scalar_or(range.and_then(|r| r.min.as_ref()), "0"),
        scalar_or(range.and_then(|r| r.max.as_ref()), "0"),
        format_time(population.current_time.as_deref())
    ));

    let traffic_status = traffic.status.as_deref();
    out.push_str(&format!(
        "  교통 상황      {} ({} km/h)  {}\n",
        badge(
            or_placeholder(traffic_status, NO_INFO),
            traffic_color(traffic_status)
        ),
        scalar_or(traffic.speed.as_ref(), "?"),
        or_placeholder(
            traffic.message.as_deref(),
            "현재 도로 교통 정보가 없습니다."
        )
    ));

    if let Some(commercial) = &status.commercial {
        if let Some(level) = non_empty(commercial.congestion_level.as_deref()) {
            let detail = if commercial.food_businesses.is_empty() {
                "상세 업종 정보 없음".to_string()
            } else {
                format!("{}개 업종 정보 있음", commercial.food_businesses.len())
            };
            out.push_str(&format!(
                "  상권 활성도    {}  {}\n",
                badge(level, congestion_color(Some(level))),
                detail
            ));
        }
    }

    render_demographics(&mut out, population);
    render_forecasts(&mut out, &population.forecasts);

    if let Some(commercial) = &status.commercial {
        render_businesses(&mut out, commercial);
    }

    if let Some(coordinates) = status.coordinates {
        out.push_str(&format!(
            "\n  🗺  {}  {}\n",
            area.bold(),
            map_link(coordinates).underline()
        ));
    }

    Some(out)
}

fn render_demographics(out: &mut String, population: &Population) {
    let Some(ratio) = &population.gender_ratio else {
        return;
    };

    out.push_str(&format!("\n{}", heading("인구 통계")));
    out.push_str(&format!(
        "  성비: 남성 {}%, 여성 {}%\n",
        scalar_or(ratio.male.as_ref(), "?"),
        scalar_or(ratio.female.as_ref(), "?")
    ));

    if let Some(ages) = &population.age_distribution {
        let entries: Vec<String> = ages
            .iter()
            .map(|(age, pct)| format!("{}대: {}%", age, pct))
            .collect();
        out.push_str(&format!("  연령 분포: {}\n", entries.join(", ")));
    }
}

fn render_forecasts(out: &mut String, forecasts: &[Forecast]) {
    if forecasts.is_empty() {
        return;
    }

    out.push_str(&format!(
        "\n{}",
        heading(&format!("📊 향후 {}시간 예측 정보", forecasts.len()))
    ));
    for forecast in forecasts {
        let level = forecast.congestion_level.as_deref();
        out.push_str(&format!(
            "  🕒 {} 예측  {}  예측 인구: {}~{}명\n",
            or_placeholder(forecast.time.as_deref(), "?"),
            format!("예측 혼잡도: {}", or_placeholder(level, NO_INFO))
                .color(congestion_color(level)),
            scalar_or(forecast.population_min.as_ref(), "?"),
            scalar_or(forecast.population_max.as_ref(), "?")
        ));
    }
}

fn render_businesses(out: &mut String, commercial: &Commercial) {
    if commercial.food_businesses.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["카테고리", "혼잡도", "결제 수", "매장 수"]);
    for business in &commercial.food_businesses {
        table.add_row(row![
            or_placeholder(business.category.as_deref(), "-"),
            or_placeholder(business.congestion_level.as_deref(), "-"),
            scalar_or(business.payment_count.as_ref(), "-"),
            scalar_or(business.store_count.as_ref(), "-")
        ]);
    }

    out.push_str(&format!("\n{}{}", heading("상권 현황:"), table));
}
