//! Recommendation view state
//!
//! A search takes one preference snapshot, issues one request, and replaces
//! the whole view state with the outcome.

use crate::api::{CultureApi, RecommendationResult};
use crate::error::GuideError;
use crate::preferences::UserContext;

/// Local validation message for an empty location
pub const EMPTY_LOCATION: &str = "위치를 입력해 주세요";

/// Shown when a search fails without a service-provided message
pub const SEARCH_FAILED: &str = "추천 정보를 가져오는데 실패했습니다.";

/// Exactly one of these holds at any time
#[derive(Debug, Clone, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Loaded(Box<RecommendationResult>),
}

/// Recommendation panel
#[derive(Debug, Default)]
pub struct RecommendationView {
    state: ViewState,
}

impl RecommendationView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Whether a search is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }

    /// Search recommendations for a free-text location
    ///
    /// Whitespace-only input fails locally with [`EMPTY_LOCATION`] and sends
    /// nothing. Otherwise any previous result is dropped, a single request
    /// is issued with the current preference snapshot, and the state becomes
    /// `Loaded` or `Error`.
    pub async fn search(
        &mut self,
        api: &dyn CultureApi,
        context: &UserContext,
        location: &str,
    ) -> &ViewState {
        let location = location.trim();
        if location.is_empty() {
            self.state = ViewState::Error(EMPTY_LOCATION.to_string());
            return &self.state;
        }

        if self.is_loading() {
            tracing::warn!("Recommendation search already in progress");
            return &self.state;
        }

        let preferences = context.snapshot();
        self.state = ViewState::Loading;
        tracing::info!(location, "Searching recommendations");

        self.state = match api.get_recommendations(location, &preferences).await {
            Ok(result) => ViewState::Loaded(Box::new(result)),
            Err(e) => {
                tracing::error!("Recommendation request failed: {:#}", e);
                ViewState::Error(failure_message(&e))
            }
        };

        &self.state
    }
}

/// Service-provided detail when present, otherwise the fixed fallback
fn failure_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<GuideError>() {
        Some(GuideError::Api {
            detail: Some(detail),
            ..
        }) => detail.clone(),
        _ => SEARCH_FAILED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{AgeGroup, PreferenceStore, PreferencesPatch};
    use crate::storage::LocalStorage;
    use crate::test_utils::FakeApi;
    use tempfile::tempdir;

    fn context() -> (UserContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new_with_path(dir.path().join("prefs.json")).unwrap();
        (UserContext::load(PreferenceStore::open(storage)), dir)
    }

    #[tokio::test]
    async fn test_blank_location_sends_nothing() {
        let api = FakeApi::new();
        let (ctx, _dir) = context();
        let mut view = RecommendationView::new();

        let state = view.search(&api, &ctx, "   ").await;
        assert!(matches!(state, ViewState::Error(msg) if msg == EMPTY_LOCATION));
        assert_eq!(api.calls().recommend, 0);
    }

    #[tokio::test]
    async fn test_success_replaces_result() {
        let api = FakeApi::new().with_recommendation(RecommendationResult {
            area: "홍대".into(),
            ..Default::default()
        });
        let (ctx, _dir) = context();
        let mut view = RecommendationView::new();

        view.search(&api, &ctx, "홍대 근처").await;
        match view.state() {
            ViewState::Loaded(result) => assert_eq!(result.area, "홍대"),
            other => panic!("unexpected state: {:?}", other),
        }
        assert_eq!(api.calls().recommend, 1);
    }

    #[tokio::test]
    async fn test_request_uses_current_preferences() {
        let api = FakeApi::new();
        let (mut ctx, _dir) = context();
        ctx.update(&PreferencesPatch {
            age_group: Some(AgeGroup::Fifties),
            ..Default::default()
        })
        .unwrap();

        RecommendationView::new().search(&api, &ctx, "명동").await;
        assert_eq!(
            api.last_preferences().map(|p| p.age_group),
            Some(AgeGroup::Fifties)
        );
    }

    #[tokio::test]
    async fn test_service_detail_is_surfaced() {
        let api = FakeApi::new().failing_with_detail("지역을 찾을 수 없습니다");
        let (ctx, _dir) = context();
        let mut view = RecommendationView::new();

        let state = view.search(&api, &ctx, "없는 곳").await;
        assert!(matches!(state, ViewState::Error(msg) if msg == "지역을 찾을 수 없습니다"));
    }

    #[tokio::test]
    async fn test_error_status_without_detail_uses_fallback() {
        let api = FakeApi::new().failing_with_status(500);
        let (ctx, _dir) = context();
        let mut view = RecommendationView::new();

        let state = view.search(&api, &ctx, "성수").await;
        assert!(matches!(state, ViewState::Error(msg) if msg == SEARCH_FAILED));
    }

    #[tokio::test]
    async fn test_transport_failure_uses_fallback() {
        let api = FakeApi::new().failing();
        let (ctx, _dir) = context();
        let mut view = RecommendationView::new();

        let state = view.search(&api, &ctx, "강남").await;
        assert!(matches!(state, ViewState::Error(msg) if msg == SEARCH_FAILED));
    }

    #[tokio::test]
    async fn test_failure_after_success_drops_old_result() {
        let api = FakeApi::new();
        let (ctx, _dir) = context();
        let mut view = RecommendationView::new();

        view.search(&api, &ctx, "강남").await;
        assert!(matches!(view.state(), ViewState::Loaded(_)));

        view.search(&api, &ctx, "").await;
        assert!(matches!(view.state(), ViewState::Error(_)));
    }
}
