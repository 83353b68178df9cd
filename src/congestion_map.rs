//! Congestion map view state
//!
//! The marker list is fetched once when the view opens and never refreshed.
//! Selecting an area toggles it: selecting the current area clears the
//! selection, selecting another one fetches its detail.

use crate::api::{CongestionArea, CultureApi};

/// Shown when the marker list cannot be fetched
pub const LIST_LOAD_FAILED: &str = "혼잡도 데이터를 불러오는데 실패했습니다.";

/// Outcome of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The area is now selected and its detail loaded
    Selected,
    /// The area is selected but its detail could not be fetched
    DetailFailed,
    /// The area was already selected and has been deselected
    Deselected,
}

/// State of the congestion map
#[derive(Debug, Default)]
pub struct CongestionMapView {
    areas: Vec<CongestionArea>,
    list_error: Option<String>,
    selected: Option<String>,
    detail: Option<CongestionArea>,
    detail_failed: bool,
}

impl CongestionMapView {
    /// Fetch the marker list and build the view
    ///
    /// A failed fetch still yields a view, carrying the list error.
    pub async fn load(api: &dyn CultureApi) -> Self {
        match api.get_congestion_areas().await {
            Ok(areas) => {
                tracing::info!("Loaded {} congestion areas", areas.len());
                Self {
                    areas,
                    ..Default::default()
                }
            }
            Err(e) => {
                tracing::error!("Congestion list request failed: {:#}", e);
                Self {
                    list_error: Some(LIST_LOAD_FAILED.to_string()),
                    ..Default::default()
                }
            }
        }
    }

    /// All markers, in service order
    pub fn areas(&self) -> &[CongestionArea] {
        &self.areas
    }

    /// Error from the initial list fetch
    pub fn list_error(&self) -> Option<&str> {
        self.list_error.as_deref()
    }

    /// Name of the selected area
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Detail of the selected area, when loaded
    pub fn detail(&self) -> Option<&CongestionArea> {
        self.detail.as_ref()
    }

    /// Whether the last detail fetch for the selected area failed
    pub fn detail_failed(&self) -> bool {
        self.detail_failed
    }

    /// Resolve user input to a marker
    ///
    /// Accepts the 1-based list number, the exact area name, or failing that
    /// the single area whose name contains the input.
    pub fn find_area(&self, query: &str) -> Option<&CongestionArea> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Ok(n) = query.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| self.areas.get(i));
        }

        if let Some(exact) = self.areas.iter().find(|a| a.area == query) {
            return Some(exact);
        }

        let mut partial = self.areas.iter().filter(|a| a.area.contains(query));
        match (partial.next(), partial.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Toggle the selection of `area`
    ///
    /// Selecting the selected area deselects it and clears its detail.
    /// Selecting another area replaces the selection and fetches its detail;
    /// on failure the detail is cleared while the selection and marker list
    /// are kept.
    pub async fn select(&mut self, api: &dyn CultureApi, area: &str) -> Selection {
        if self.selected.as_deref() == Some(area) {
            tracing::debug!("Deselecting area {}", area);
            self.clear_selection();
            return Selection::Deselected;
        }

        self.selected = Some(area.to_string());
        self.detail = None;
        self.detail_failed = false;

        match api.get_area_congestion(area).await {
            Ok(detail) => {
                self.detail = Some(detail);
                Selection::Selected
            }
            Err(e) => {
                tracing::error!("Area detail request for '{}' failed: {:#}", area, e);
                self.detail_failed = true;
                Selection::DetailFailed
            }
        }
    }

    /// Drop the selection and any detail
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.detail = None;
        self.detail_failed = false;
    }
}
