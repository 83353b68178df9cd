//! Request and response payloads of the culture service
//!
//! Response types are lenient: every field the service may omit is optional
//! or defaulted, `null` is accepted wherever a collection or nested object is
//! expected, and numeric-looking fields accept numbers or strings.

use crate::preferences::UserPreferences;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A numeric value the service may send as a JSON number or a string
///
/// # Examples
///
/// ```
/// use culture_guide::api::Scalar;
///
/// let n: Scalar = serde_json::from_str("12.0").unwrap();
/// let s: Scalar = serde_json::from_str("\"12\"").unwrap();
/// assert_eq!(n.to_string(), "12");
/// assert_eq!(s.to_string(), "12");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// JSON number
    Num(f64),
    /// JSON string
    Text(String),
}

impl Scalar {
    /// Whether the value is blank (an empty string)
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Num(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Num(n as f64)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

/// Body of `POST /api/chat/message/`
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub user_preferences: &'a UserPreferences,
}

/// Reply of `POST /api/chat/message/`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Body of `POST /api/recommendation/`
#[derive(Debug, Serialize)]
pub struct RecommendationRequest<'a> {
    pub location: &'a str,
    pub user_preferences: &'a UserPreferences,
}

/// Composite recommendation payload for one location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Nearest known area to the searched location
    #[serde(default)]
    pub area: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: AreaStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: EventList,
    /// AI-generated narrative, sectioned for display by the formatter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalized_recommendation: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analysis: Analysis,
}

/// Live status of an area
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<Population>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<Traffic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commercial: Option<Commercial>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// WGS84 point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Population {
    #[serde(default)]
    pub congestion_level: Option<String>,
    #[serde(default)]
    pub congestion_message: Option<String>,
    #[serde(default)]
    pub population_range: Option<PopulationRange>,
    /// `YYYY-MM-DD HH:MM[:SS]` as reported by the service
    #[serde(default)]
    pub current_time: Option<String>,
    #[serde(default)]
    pub gender_ratio: Option<GenderRatio>,
    /// Percentage per age bracket, keyed by the bracket's decade (`"20"`)
    #[serde(default)]
    pub age_distribution: Option<BTreeMap<String, Scalar>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forecasts: Vec<Forecast>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationRange {
    #[serde(default)]
    pub min: Option<Scalar>,
    #[serde(default)]
    pub max: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenderRatio {
    #[serde(default)]
    pub male: Option<Scalar>,
    #[serde(default)]
    pub female: Option<Scalar>,
}

/// Hourly population forecast
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub congestion_level: Option<String>,
    #[serde(default)]
    pub population_min: Option<Scalar>,
    #[serde(default)]
    pub population_max: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Traffic {
    #[serde(default)]
    pub status: Option<String>,
    /// Average road speed in km/h
    #[serde(default)]
    pub speed: Option<Scalar>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Commercial activity around an area
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Commercial {
    #[serde(default)]
    pub congestion_level: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub food_businesses: Vec<FoodBusiness>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodBusiness {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub congestion_level: Option<String>,
    #[serde(default)]
    pub payment_count: Option<Scalar>,
    #[serde(default)]
    pub store_count: Option<Scalar>,
}

/// Events near the area, possibly truncated by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventList {
    /// Total matches before truncation
    #[serde(default)]
    pub total_count: Option<Scalar>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<EventRecord>,
}

impl EventList {
    /// Whether there is any event to show
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One cultural event, using the upstream open-data field names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct EventRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub codename: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub use_fee: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
}

/// Curator analysis of the current situation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub best_time: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
}

/// Reply of `GET /api/map/congestion`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CongestionList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<CongestionArea>,
}

/// Congestion snapshot of one area, used both as a map marker and as detail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CongestionArea {
    #[serde(alias = "name")]
    pub area: String,
    #[serde(default)]
    pub congestion_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_range: Option<PopulationRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_status: Option<Traffic>,
    #[serde(
        default,
        alias = "commercial_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub commercial: Option<Commercial>,
}

impl CongestionArea {
    /// Position of the marker, preferring the flat latitude/longitude pair
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => self.coordinates,
        }
    }
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Human-readable detail; validation errors arrive as arrays of objects
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
