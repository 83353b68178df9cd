//! Command-line interface definition for Culture Guide
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, recommendations, the congestion map, and
//! preference management.

use clap::{Args, Parser, Subcommand};

/// Culture Guide - cultural events, recommendations, and congestion at a glance
///
/// Talks to the culture recommendation service using the preferences stored
/// on this device.
#[derive(Parser, Debug, Clone)]
#[command(name = "culture-guide")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the service base address (e.g. http://localhost:8000)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Override the preference store file
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Culture Guide
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive chatbot
    Chat,

    /// Get a personalized recommendation for a location
    Recommend {
        /// Location to search for (e.g. 강남역, 홍대, 명동)
        #[arg(required = true, num_args = 1..)]
        location: Vec<String>,

        /// Print the raw service payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse the real-time congestion map
    Map {
        /// Show the detail of one area and exit
        #[arg(short, long)]
        area: Option<String>,

        /// Print the marker list (or area detail) as JSON and exit
        #[arg(long)]
        json: bool,
    },

    /// Show or change the stored user preferences
    Prefs {
        /// Preference subcommand
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

/// Preference management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PrefsCommand {
    /// Show the current preferences
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one or more preferences
    Set(PrefsSetArgs),

    /// Restore the default preferences
    Reset,
}

/// Fields accepted by `prefs set`
///
/// Values may be given in Korean (`여성`, `30대`, `예`, `대중교통`) or English
/// (`female`, `30s`, `yes`, `transit`).
#[derive(Args, Debug, Clone, Default)]
pub struct PrefsSetArgs {
    /// Gender (남성/male, 여성/female)
    #[arg(long)]
    pub gender: Option<String>,

    /// Age group (10대..50대, 60대 이상 / 10s..60s)
    #[arg(long)]
    pub age_group: Option<String>,

    /// Travelling with children (예/yes, 아니오/no)
    #[arg(long)]
    pub has_children: Option<String>,

    /// Transportation (도보/walk, 자동차/car, 대중교통/transit, 자전거/bicycle)
    #[arg(long)]
    pub transportation: Option<String>,
}

impl PrefsSetArgs {
    /// Whether no field was supplied
    pub fn is_empty(&self) -> bool {
        self.gender.is_none()
            && self.age_group.is_none()
            && self.has_children.is_none()
            && self.transportation.is_none()
    }
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_base: None,
            storage_path: None,
            command: Commands::Chat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.api_base.is_none());
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["culture-guide", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_cli_parse_recommend_joins_location_words() {
        let cli = Cli::try_parse_from(["culture-guide", "recommend", "강남역", "주변"]).unwrap();
        if let Commands::Recommend { location, json } = cli.command {
            assert_eq!(location, vec!["강남역".to_string(), "주변".to_string()]);
            assert!(!json);
        } else {
            panic!("Expected Recommend command");
        }
    }

    #[test]
    fn test_cli_parse_recommend_requires_location() {
        let cli = Cli::try_parse_from(["culture-guide", "recommend"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_map_with_area() {
        let cli = Cli::try_parse_from(["culture-guide", "map", "--area", "홍대 관광특구"]).unwrap();
        if let Commands::Map { area, json } = cli.command {
            assert_eq!(area.as_deref(), Some("홍대 관광특구"));
            assert!(!json);
        } else {
            panic!("Expected Map command");
        }
    }

    #[test]
    fn test_cli_parse_prefs_set() {
        let cli = Cli::try_parse_from([
            "culture-guide",
            "prefs",
            "set",
            "--gender",
            "여성",
            "--transportation",
            "transit",
        ])
        .unwrap();
        if let Commands::Prefs {
            command: PrefsCommand::Set(args),
        } = cli.command
        {
            assert_eq!(args.gender.as_deref(), Some("여성"));
            assert_eq!(args.transportation.as_deref(), Some("transit"));
            assert!(args.age_group.is_none());
            assert!(!args.is_empty());
        } else {
            panic!("Expected Prefs Set command");
        }
    }

    #[test]
    fn test_cli_parse_global_api_base() {
        let cli = Cli::try_parse_from([
            "culture-guide",
            "--api-base",
            "http://localhost:8000",
            "map",
        ])
        .unwrap();
        assert_eq!(cli.api_base.as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        let cli = Cli::try_parse_from(["culture-guide", "invalid"]);
        assert!(cli.is_err());
    }
}
