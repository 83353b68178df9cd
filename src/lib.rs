//! Culture Guide - cultural events, recommendations, and congestion library
//!
//! This library provides the core functionality behind the `culture-guide`
//! CLI: a typed client for the culture recommendation service, locally
//! persisted user preferences, the chat and recommendation view state, and
//! terminal rendering of the service's payloads.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Service client trait, HTTP implementation, and payload types
//! - `preferences`: Preference values, the local store, and the shared user context
//! - `chat`: Chat session state and multi-line input
//! - `recommendation`: Recommendation panel state
//! - `congestion_map`: Congestion map state and area selection
//! - `formatter`: Splits the AI curator's text into titled sections
//! - `render`: Terminal rendering of every view
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use culture_guide::api::{CultureApi, HttpApiClient};
//! use culture_guide::preferences::UserPreferences;
//! use culture_guide::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = HttpApiClient::new(&config.api)?;
//!     let answer = client
//!         .send_chat_message("홍대 지역 전시회 알려줘", &UserPreferences::default())
//!         .await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod congestion_map;
pub mod error;
pub mod formatter;
pub mod preferences;
pub mod recommendation;
pub mod render;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{GuideError, Result};
pub use preferences::{UserContext, UserPreferences};

#[cfg(test)]
pub mod test_utils;
