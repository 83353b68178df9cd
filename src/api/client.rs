//! HTTP implementation of [`CultureApi`]

use super::types::{
    ChatRequest, ChatResponse, CongestionArea, CongestionList, ErrorBody, RecommendationRequest,
    RecommendationResult,
};
use super::CultureApi;
use crate::config::ApiConfig;
use crate::error::{GuideError, Result};
use crate::preferences::UserPreferences;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Client for the culture service REST API
///
/// Every request shares the configured timeout; expiry surfaces as an
/// ordinary [`GuideError::Transport`] failure.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
}

impl HttpApiClient {
    /// Create a client for the configured service
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// built
    ///
    /// # Examples
    ///
    /// ```
    /// use culture_guide::api::HttpApiClient;
    /// use culture_guide::config::ApiConfig;
    ///
    /// let client = HttpApiClient::new(&ApiConfig::default());
    /// assert!(client.is_ok());
    /// ```
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            GuideError::Config(format!("Invalid api.base_url '{}': {}", config.base_url, e))
        })?;

        // Endpoint paths are appended below the base path.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("culture-guide/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GuideError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized culture service client: base_url={}, timeout={}s",
            base_url,
            config.timeout_seconds
        );

        Ok(Self { client, base_url })
    }

    /// Resolve an endpoint from literal segments plus an optional
    /// percent-encoded trailing segment
    fn endpoint(&self, segments: &[&str], trailing: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                GuideError::Config(format!("Base URL cannot carry a path: {}", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(segments);
            if let Some(segment) = trailing {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("{} request failed: {}", what, e);
            GuideError::Transport(format!("{} request failed: {}", what, e))
        })?;

        let response = Self::check_status(response, what).await?;

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read {} response body: {}", what, e);
            GuideError::Transport(format!("Failed to read {} response: {}", what, e))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse {} response: {}", what, e);
            GuideError::Serialization(e).into()
        })
    }

    /// Map a non-success status to [`GuideError::Api`], keeping the `detail`
    /// field of the error body when there is one
    async fn check_status(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::error!("{} returned error {}: {}", what, status, text);

        let detail = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .map(|body| body.message())
            .filter(|m| !m.trim().is_empty());

        Err(GuideError::Api {
            status: status.as_u16(),
            detail,
        }
        .into())
    }
}

#[async_trait]
impl CultureApi for HttpApiClient {
    async fn send_chat_message(
        &self,
        message: &str,
        preferences: &UserPreferences,
    ) -> Result<String> {
        let url = self.endpoint(&["api", "chat", "message", ""], None)?;
        let body = ChatRequest {
            message,
            user_preferences: preferences,
        };

        let response: ChatResponse = self
            .send(self.request(Method::POST, url).json(&body), "Chat")
            .await?;

        tracing::debug!("Chat answer received: {} chars", response.answer.chars().count());
        Ok(response.answer)
    }

    async fn get_recommendations(
        &self,
        location: &str,
        preferences: &UserPreferences,
    ) -> Result<RecommendationResult> {
        let url = self.endpoint(&["api", "recommendation", ""], None)?;
        let body = RecommendationRequest {
            location,
            user_preferences: preferences,
        };

        let result: RecommendationResult = self
            .send(self.request(Method::POST, url).json(&body), "Recommendation")
            .await?;

        tracing::debug!(
            "Recommendation for '{}' resolved to area '{}' with {} events",
            location,
            result.area,
            result.events.data.len()
        );
        Ok(result)
    }

    async fn get_congestion_areas(&self) -> Result<Vec<CongestionArea>> {
        let url = self.endpoint(&["api", "map", "congestion"], None)?;
        let list: CongestionList = self
            .send(self.request(Method::GET, url), "Congestion list")
            .await?;

        tracing::debug!("Fetched {} congestion areas", list.data.len());
        Ok(list.data)
    }

    async fn get_area_congestion(&self, area: &str) -> Result<CongestionArea> {
        let url = self.endpoint(&["api", "map", "congestion"], Some(area))?;
        self.send(self.request(Method::GET, url), "Area congestion")
            .await
    }
}
