//! Congestion map: marker table, coarse marker grid, and area detail

use super::{congestion_badge, congestion_color, format_time, heading, map_link, scalar_or, NO_INFO};
use crate::api::CongestionArea;
use crate::congestion_map::CongestionMapView;
use colored::{Color, Colorize};
use prettytable::{format, row, Table};

/// Shown while no area is selected
pub const SELECT_PROMPT: &str = "목록에서 지역을 선택하면 상세 정보가 표시됩니다.";

/// Shown when the detail of the selected area could not be fetched
pub const DETAIL_FAILED: &str = "지역 상세 정보를 불러오지 못했습니다.";

const GRID_WIDTH: usize = 48;
const GRID_HEIGHT: usize = 14;
const MARKER_LABELS: &[u8] = b"123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Render the whole view: list, grid, and the selection panel
pub fn render_view(view: &CongestionMapView) -> String {
    let mut out = heading("서울시 실시간 혼잡도 지도");

    if let Some(error) = view.list_error() {
        out.push_str(&format!("{}\n", error.red()));
        return out;
    }

    out.push_str(&render_area_list(view.areas(), view.selected()));
    out.push('\n');
    out.push_str(&render_marker_grid(view.areas()));
    out.push('\n');

    match (view.selected(), view.detail()) {
        (None, _) => {
            out.push_str(&format!("{}\n", SELECT_PROMPT.dimmed()));
        }
        (Some(_), Some(detail)) => out.push_str(&render_area_detail(detail)),
        (Some(area), None) if view.detail_failed() => {
            out.push_str(&format!("{} {}\n", area.bold(), DETAIL_FAILED.yellow()));
        }
        (Some(_), None) => {
            out.push_str("지역 정보를 불러오는 중입니다...\n");
        }
    }

    out
}

/// Numbered marker table, the selected row flagged
pub fn render_area_list(areas: &[CongestionArea], selected: Option<&str>) -> String {
    if areas.is_empty() {
        return format!("{}\n", "표시할 지역이 없습니다.".dimmed());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(row!["", "#", "지역", "혼잡도", "업데이트"]);

    for (i, area) in areas.iter().enumerate() {
        let marker = if selected == Some(area.area.as_str()) {
            "▶"
        } else {
            ""
        };
        table.add_row(row![
            marker,
            label(i).to_string(),
            area.area,
            congestion_badge(area.congestion_level.as_deref()),
            format_time(area.timestamp.as_deref())
        ]);
    }

    table.to_string()
}

/// Marker label for the area at `index`; beyond the alphabet markers share `*`
fn label(index: usize) -> char {
    MARKER_LABELS.get(index).map(|b| *b as char).unwrap_or('*')
}

/// Plot every area with coordinates on a character grid, north up
///
/// Areas without coordinates are left out of the grid but stay in the list.
pub fn render_marker_grid(areas: &[CongestionArea]) -> String {
    let points: Vec<(usize, f64, f64, Color)> = areas
        .iter()
        .enumerate()
        .filter_map(|(i, a)| {
            a.coordinates().map(|c| {
                (
                    i,
                    c.lat,
                    c.lng,
                    congestion_color(a.congestion_level.as_deref()),
                )
            })
        })
        .collect();

    if points.is_empty() {
        return format!("{}\n", "좌표 정보가 있는 지역이 없습니다.".dimmed());
    }

    let (min_lat, max_lat) = bounds(points.iter().map(|p| p.1));
    let (min_lng, max_lng) = bounds(points.iter().map(|p| p.2));

    let mut grid: Vec<Vec<Option<(char, Color)>>> = vec![vec![None; GRID_WIDTH]; GRID_HEIGHT];
    for (i, lat, lng, color) in &points {
        let col = scale(*lng, min_lng, max_lng, GRID_WIDTH);
        let row = GRID_HEIGHT - 1 - scale(*lat, min_lat, max_lat, GRID_HEIGHT);
        grid[row][col] = Some((label(*i), *color));
    }

    let mut out = String::new();
    out.push_str(&format!("┌{}┐\n", "─".repeat(GRID_WIDTH)));
    for cells in &grid {
        out.push('│');
        for cell in cells {
            match cell {
                Some((c, color)) => out.push_str(&c.to_string().color(*color).bold().to_string()),
                None => out.push(' '),
            }
        }
        out.push_str("│\n");
    }
    out.push_str(&format!("└{}┘\n", "─".repeat(GRID_WIDTH)));

    let center_lat = (min_lat + max_lat) / 2.0;
    let center_lng = (min_lng + max_lng) / 2.0;
    out.push_str(&format!(
        "{} {}\n",
        "지도:".dimmed(),
        map_link(crate::api::Coordinates {
            lat: center_lat,
            lng: center_lng
        })
    ));

    out
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Map `value` in `[min, max]` to a cell index in `0..cells`; a degenerate
/// range maps to the middle
fn scale(value: f64, min: f64, max: f64, cells: usize) -> usize {
    let span = max - min;
    if !span.is_finite() || span <= f64::EPSILON {
        return cells / 2;
    }
    let ratio = ((value - min) / span).clamp(0.0, 1.0);
    ((ratio * (cells - 1) as f64).round() as usize).min(cells - 1)
}

/// Detail panel of one area
pub fn render_area_detail(detail: &CongestionArea) -> String {
    let mut out = heading(&format!("{} 상세 정보", detail.area));

    let range = detail.population_range.as_ref();
    out.push_str(&format!("  {}\n", "혼잡도 정보".underline()));
    out.push_str(&format!(
        "    혼잡도 레벨  {}\n",
        congestion_badge(detail.congestion_level.as_deref())
    ));
    out.push_str(&format!(
        "    예상 인구    {} ~ {}명\n",
        scalar_or(range.and_then(|r| r.min.as_ref()), "0"),
        scalar_or(range.and_then(|r| r.max.as_ref()), "0")
    ));

    let traffic = detail.traffic_status.as_ref();
    out.push_str(&format!("  {}\n", "도로 상태".underline()));
    out.push_str(&format!(
        "    속도         {} km/h\n",
        scalar_or(traffic.and_then(|t| t.speed.as_ref()), "?")
    ));
    out.push_str(&format!(
        "    교통 메시지  {}\n",
        super::or_placeholder(traffic.and_then(|t| t.message.as_deref()), NO_INFO)
    ));

    if let Some(coordinates) = detail.coordinates() {
        out.push_str(&format!("  {}\n", map_link(coordinates).underline()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{PopulationRange, Scalar, Traffic};

    fn area(name: &str, lat: Option<f64>, lng: Option<f64>) -> CongestionArea {
        CongestionArea {
            area: name.to_string(),
            congestion_level: Some("붐빔".into()),
            latitude: lat,
            longitude: lng,
            ..Default::default()
        }
    }

    #[test]
    fn test_area_list_marks_selection() {
        let areas = vec![area("강남역", None, None), area("명동", None, None)];
        let out = render_area_list(&areas, Some("명동"));
        assert!(out.contains("강남역"));
        assert!(out.contains("명동"));
        assert_eq!(out.matches('▶').count(), 1);
    }

    /// Grid rows only, without escape codes
    fn grid_rows(areas: &[CongestionArea]) -> Vec<String> {
        colored::control::set_override(false);
        render_marker_grid(areas)
            .lines()
            .filter(|l| l.starts_with('│'))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_grid_skips_areas_without_coordinates() {
        let areas = vec![
            area("북쪽", Some(37.60), Some(126.98)),
            area("좌표 없음", None, None),
            area("남쪽", Some(37.50), Some(127.02)),
        ];
        let rows = grid_rows(&areas).join("\n");
        assert!(rows.contains('1'));
        assert!(rows.contains('3'));
        assert!(!rows.contains('2'));
    }

    #[test]
    fn test_grid_orientation_north_up() {
        let areas = vec![
            area("북쪽", Some(37.60), Some(126.98)),
            area("남쪽", Some(37.50), Some(127.02)),
        ];
        let rows = grid_rows(&areas);
        assert_eq!(rows.len(), GRID_HEIGHT);
        let north_row = rows.iter().position(|l| l.contains('1')).unwrap();
        let south_row = rows.iter().position(|l| l.contains('2')).unwrap();
        assert!(north_row < south_row);
    }

    #[test]
    fn test_grid_without_points() {
        let out = render_marker_grid(&[area("좌표 없음", None, None)]);
        assert!(out.contains("좌표 정보가 있는 지역이 없습니다."));
    }

    #[test]
    fn test_scale_degenerate_range() {
        assert_eq!(scale(5.0, 5.0, 5.0, 10), 5);
        assert_eq!(scale(0.0, 0.0, 1.0, 10), 0);
        assert_eq!(scale(1.0, 0.0, 1.0, 10), 9);
    }

    #[test]
    fn test_detail_defaults() {
        let out = render_area_detail(&area("홍대", None, None));
        assert!(out.contains("홍대 상세 정보"));
        assert!(out.contains("0 ~ 0명"));
        assert!(out.contains("? km/h"));
        assert!(out.contains(NO_INFO));
    }

    #[test]
    fn test_detail_values() {
        let detail = CongestionArea {
            population_range: Some(PopulationRange {
                min: Some(Scalar::Num(5000.0)),
                max: Some(Scalar::Num(7000.0)),
            }),
            traffic_status: Some(Traffic {
                status: None,
                speed: Some(Scalar::Num(22.0)),
                message: Some("원활한 흐름".into()),
            }),
            ..area("여의도", Some(37.52), Some(126.92))
        };
        let out = render_area_detail(&detail);
        assert!(out.contains("5000 ~ 7000명"));
        assert!(out.contains("22 km/h"));
        assert!(out.contains("원활한 흐름"));
        assert!(out.contains("openstreetmap"));
    }
}
