//! Test utilities for Culture Guide
//!
//! Provides temporary preference stores and a scriptable in-memory
//! [`CultureApi`] used by the view-state tests.

use crate::api::{CongestionArea, CultureApi, RecommendationResult};
use crate::error::{GuideError, Result};
use crate::preferences::{PreferenceStore, UserContext, UserPreferences};
use crate::storage::LocalStorage;
use async_trait::async_trait;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Load a user context backed by a fresh store inside `dir`
pub fn temp_context(dir: &TempDir) -> UserContext {
    let storage = LocalStorage::new_with_path(dir.path().join("preferences.json"))
        .expect("Failed to create preference store");
    UserContext::load(PreferenceStore::open(storage))
}

/// Number of calls per endpoint
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FakeCalls {
    pub chat: usize,
    pub recommend: usize,
    pub list: usize,
    pub detail: usize,
}

/// How a fake endpoint fails
#[derive(Debug, Clone)]
enum Failure {
    Transport,
    Detail(String),
    Status(u16),
}

impl Failure {
    fn to_error(&self) -> anyhow::Error {
        match self {
            Failure::Transport => {
                GuideError::Transport("connection refused".to_string()).into()
            }
            Failure::Detail(detail) => GuideError::Api {
                status: 404,
                detail: Some(detail.clone()),
            }
            .into(),
            Failure::Status(status) => GuideError::Api {
                status: *status,
                detail: None,
            }
            .into(),
        }
    }
}

/// Scriptable in-memory culture service
///
/// Answers every call from canned data, records call counts and the last
/// preference snapshot it received.
#[derive(Debug, Default)]
pub struct FakeApi {
    answer: Option<String>,
    recommendation: Option<RecommendationResult>,
    areas: Vec<CongestionArea>,
    failure: Option<Failure>,
    detail_fails: bool,
    calls: Mutex<FakeCalls>,
    last_preferences: Mutex<Option<UserPreferences>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, answer: &str) -> Self {
        self.answer = Some(answer.to_string());
        self
    }

    pub fn with_recommendation(mut self, result: RecommendationResult) -> Self {
        self.recommendation = Some(result);
        self
    }

    pub fn with_areas(mut self, areas: Vec<CongestionArea>) -> Self {
        self.areas = areas;
        self
    }

    /// Every call fails at the transport level
    pub fn failing(mut self) -> Self {
        self.failure = Some(Failure::Transport);
        self
    }

    /// Every call fails with a service-provided detail message
    pub fn failing_with_detail(mut self, detail: &str) -> Self {
        self.failure = Some(Failure::Detail(detail.to_string()));
        self
    }

    /// Every call fails with an error status and no detail body
    pub fn failing_with_status(mut self, status: u16) -> Self {
        self.failure = Some(Failure::Status(status));
        self
    }

    /// Only the per-area detail endpoint fails
    pub fn failing_detail(mut self) -> Self {
        self.detail_fails = true;
        self
    }

    pub fn calls(&self) -> FakeCalls {
        *self.calls.lock().unwrap()
    }

    pub fn last_preferences(&self) -> Option<UserPreferences> {
        *self.last_preferences.lock().unwrap()
    }

    fn record(&self, preferences: Option<&UserPreferences>, bump: impl FnOnce(&mut FakeCalls)) {
        bump(&mut *self.calls.lock().unwrap());
        if let Some(p) = preferences {
            *self.last_preferences.lock().unwrap() = Some(*p);
        }
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CultureApi for FakeApi {
    async fn send_chat_message(
        &self,
        message: &str,
        preferences: &UserPreferences,
    ) -> Result<String> {
        self.record(Some(preferences), |c| c.chat += 1);
        self.check()?;
        Ok(self
            .answer
            .clone()
            .unwrap_or_else(|| format!("echo: {}", message)))
    }

    async fn get_recommendations(
        &self,
        location: &str,
        preferences: &UserPreferences,
    ) -> Result<RecommendationResult> {
        self.record(Some(preferences), |c| c.recommend += 1);
        self.check()?;
        Ok(self.recommendation.clone().unwrap_or_else(|| RecommendationResult {
            area: location.to_string(),
            ..Default::default()
        }))
    }

    async fn get_congestion_areas(&self) -> Result<Vec<CongestionArea>> {
        self.record(None, |c| c.list += 1);
        self.check()?;
        Ok(self.areas.clone())
    }

    async fn get_area_congestion(&self, area: &str) -> Result<CongestionArea> {
        self.record(None, |c| c.detail += 1);
        self.check()?;
        if self.detail_fails {
            return Err(GuideError::Transport("timeout".to_string()).into());
        }
        Ok(self
            .areas
            .iter()
            .find(|a| a.area == area)
            .cloned()
            .unwrap_or_else(|| CongestionArea {
                area: area.to_string(),
                ..Default::default()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_api_counts_and_records() {
        let api = FakeApi::new().with_answer("네");
        let prefs = UserPreferences::default();
        assert_eq!(api.send_chat_message("안녕", &prefs).await.unwrap(), "네");
        assert_eq!(api.calls().chat, 1);
        assert_eq!(api.last_preferences(), Some(prefs));
    }

    #[tokio::test]
    async fn test_fake_api_detail_failure_is_api_error() {
        let api = FakeApi::new().failing_with_detail("없음");
        let err = api.get_congestion_areas().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GuideError>(),
            Some(GuideError::Api { status: 404, .. })
        ));
    }

    #[test]
    fn test_fake_api_detail_falls_back_to_requested_name() {
        let api = FakeApi::new();
        let detail = tokio_test::block_on(api.get_area_congestion("북촌")).unwrap();
        assert_eq!(detail.area, "북촌");
        assert_eq!(api.calls().detail, 1);
    }

    #[test]
    fn test_temp_context_is_first_visit() {
        let dir = temp_dir();
        assert!(temp_context(&dir).is_first_visit());
    }
}
