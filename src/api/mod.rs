//! Remote culture service access
//!
//! The [`CultureApi`] trait is the seam between the views and the network;
//! [`HttpApiClient`] is the production implementation. Views receive the
//! trait object so tests can substitute a fake.

use crate::error::Result;
use crate::preferences::UserPreferences;
use async_trait::async_trait;

pub mod client;
pub mod types;

pub use client::HttpApiClient;
pub use types::{
    Analysis, AreaStatus, Commercial, CongestionArea, Coordinates, EventList, EventRecord,
    FoodBusiness, Forecast, GenderRatio, Population, PopulationRange, RecommendationResult,
    Scalar, Traffic,
};

/// Operations offered by the culture service
#[async_trait]
pub trait CultureApi: Send + Sync {
    /// Send one chat message and return the assistant's answer
    async fn send_chat_message(
        &self,
        message: &str,
        preferences: &UserPreferences,
    ) -> Result<String>;

    /// Fetch the composite recommendation for a free-text location
    async fn get_recommendations(
        &self,
        location: &str,
        preferences: &UserPreferences,
    ) -> Result<RecommendationResult>;

    /// Fetch the congestion marker list
    async fn get_congestion_areas(&self) -> Result<Vec<CongestionArea>>;

    /// Fetch the congestion detail of one area
    async fn get_area_congestion(&self, area: &str) -> Result<CongestionArea>;
}
