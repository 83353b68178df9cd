//! User preferences and the session-wide user context
//!
//! Preferences are the demographic and travel attributes sent with every
//! personalized request. They are persisted through [`LocalStorage`] under
//! the `userPreferences` key as a JSON string, next to the `visited`
//! first-visit flag.
//!
//! [`UserContext`] owns the single preference set of a session. Views read
//! it through [`UserContext::snapshot`]; [`UserContext::update`] is the only
//! mutation entry point.

use crate::error::{GuideError, Result};
use crate::storage::LocalStorage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage key for the serialized preference set
pub const PREFERENCES_KEY: &str = "userPreferences";

/// Storage key for the first-visit flag
pub const VISITED_KEY: &str = "visited";

/// Generates a preference enum whose wire value is the Korean label used by
/// the service, with English aliases accepted when parsing user input.
macro_rules! preference_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal [$($alias:literal),*]),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Korean label sent to the service
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = GuideError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                let lower = trimmed.to_lowercase();
                $(
                    if trimmed == $label $(|| lower == $alias)* {
                        return Ok($name::$variant);
                    }
                )+
                Err(GuideError::Validation(format!(
                    "Invalid {}: '{}'. Must be one of: {}",
                    $field,
                    trimmed,
                    $name::ALL
                        .iter()
                        .map(|v| v.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                )))
            }
        }
    };
}

preference_enum! {
    /// Gender of the user
    Gender, "gender" {
        Male => "남성" ["male", "m"],
        Female => "여성" ["female", "f"],
    }
}

preference_enum! {
    /// Age bracket of the user
    AgeGroup, "age_group" {
        Teens => "10대" ["10s", "teens"],
        Twenties => "20대" ["20s"],
        Thirties => "30대" ["30s"],
        Forties => "40대" ["40s"],
        Fifties => "50대" ["50s"],
        SixtiesPlus => "60대 이상" ["60s", "60+", "60s+"],
    }
}

preference_enum! {
    /// Whether the user travels with children
    HasChildren, "has_children" {
        Yes => "예" ["yes", "y", "true"],
        No => "아니오" ["no", "n", "false"],
    }
}

preference_enum! {
    /// Preferred way of getting around
    Transportation, "transportation" {
        Walk => "도보" ["walk", "walking"],
        Car => "자동차" ["car", "drive"],
        Transit => "대중교통" ["transit", "public", "bus", "subway"],
        Bicycle => "자전거" ["bicycle", "bike"],
    }
}

impl Default for Gender {
    fn default() -> Self {
        Self::Male
    }
}

impl Default for AgeGroup {
    fn default() -> Self {
        Self::Twenties
    }
}

impl Default for HasChildren {
    fn default() -> Self {
        Self::No
    }
}

impl Default for Transportation {
    fn default() -> Self {
        Self::Walk
    }
}

/// The preference set sent with personalized requests
///
/// Missing fields in a persisted object fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserPreferences {
    /// Gender
    #[serde(default)]
    pub gender: Gender,
    /// Age group
    #[serde(default)]
    pub age_group: AgeGroup,
    /// Travelling with children
    #[serde(default)]
    pub has_children: HasChildren,
    /// Transportation
    #[serde(default)]
    pub transportation: Transportation,
}

/// A partial change to [`UserPreferences`]; `None` fields are left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreferencesPatch {
    /// New gender
    pub gender: Option<Gender>,
    /// New age group
    pub age_group: Option<AgeGroup>,
    /// New children flag
    pub has_children: Option<HasChildren>,
    /// New transportation
    pub transportation: Option<Transportation>,
}

impl PreferencesPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a patch for a single field from user input
    ///
    /// `field` accepts the wire names (`gender`, `age_group`, `has_children`,
    /// `transportation`) and a few short forms.
    ///
    /// # Examples
    ///
    /// ```
    /// use culture_guide::preferences::{PreferencesPatch, Transportation};
    ///
    /// let patch = PreferencesPatch::from_field("transport", "대중교통").unwrap();
    /// assert_eq!(patch.transportation, Some(Transportation::Transit));
    /// ```
    pub fn from_field(field: &str, value: &str) -> Result<Self> {
        let mut patch = Self::default();
        match field.trim().to_lowercase().replace('-', "_").as_str() {
            "gender" => patch.gender = Some(value.parse()?),
            "age_group" | "age" => patch.age_group = Some(value.parse()?),
            "has_children" | "children" => patch.has_children = Some(value.parse()?),
            "transportation" | "transport" => patch.transportation = Some(value.parse()?),
            other => {
                return Err(GuideError::Validation(format!(
                    "Unknown preference field: '{}'. Must be one of: gender, age_group, has_children, transportation",
                    other
                ))
                .into())
            }
        }
        Ok(patch)
    }
}

impl UserPreferences {
    /// Shallow-merge a patch, returning the resulting set
    ///
    /// # Examples
    ///
    /// ```
    /// use culture_guide::preferences::{Gender, PreferencesPatch, UserPreferences};
    ///
    /// let patch = PreferencesPatch { gender: Some(Gender::Female), ..Default::default() };
    /// let merged = UserPreferences::default().merge(&patch);
    /// assert_eq!(merged.gender, Gender::Female);
    /// assert_eq!(merged.age_group, UserPreferences::default().age_group);
    /// ```
    pub fn merge(&self, patch: &PreferencesPatch) -> Self {
        Self {
            gender: patch.gender.unwrap_or(self.gender),
            age_group: patch.age_group.unwrap_or(self.age_group),
            has_children: patch.has_children.unwrap_or(self.has_children),
            transportation: patch.transportation.unwrap_or(self.transportation),
        }
    }
}

/// Persistence for the preference set and the first-visit flag
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    storage: LocalStorage,
}

impl PreferenceStore {
    /// Wrap a storage backend
    pub fn open(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Load the persisted preferences and determine whether this is a first visit
    ///
    /// A missing or unparsable preference blob yields the defaults. When the
    /// `visited` flag is absent it is written immediately so that later
    /// sessions are never treated as first visits.
    pub fn load(&self) -> (UserPreferences, bool) {
        let preferences = self.load_preferences();

        let first_visit = match self.storage.get_item(VISITED_KEY) {
            Ok(Some(_)) => false,
            Ok(None) => {
                if let Err(e) = self.storage.set_item(VISITED_KEY, "true") {
                    tracing::error!("Failed to persist first-visit flag: {}", e);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Failed to read first-visit flag: {}", e);
                false
            }
        };

        (preferences, first_visit)
    }

    fn load_preferences(&self) -> UserPreferences {
        let raw = match self.storage.get_item(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return UserPreferences::default(),
            Err(e) => {
                tracing::warn!("Failed to read stored preferences, using defaults: {}", e);
                return UserPreferences::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Stored preferences are invalid, using defaults: {}", e);
            UserPreferences::default()
        })
    }

    /// Persist the full preference set
    pub fn save(&self, preferences: &UserPreferences) -> Result<()> {
        let json = serde_json::to_string(preferences)?;
        self.storage.set_item(PREFERENCES_KEY, &json)
    }
}

/// The session's single preference set plus the first-visit state
///
/// Created once per process and passed down to every view.
#[derive(Debug)]
pub struct UserContext {
    store: PreferenceStore,
    preferences: UserPreferences,
    first_visit: bool,
}

impl UserContext {
    /// Load the context from a store
    pub fn load(store: PreferenceStore) -> Self {
        let (preferences, first_visit) = store.load();
        tracing::debug!(?preferences, first_visit, "Loaded user context");
        Self {
            store,
            preferences,
            first_visit,
        }
    }

    /// Current preference set
    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    /// Copy of the current set, taken once per request
    pub fn snapshot(&self) -> UserPreferences {
        self.preferences
    }

    /// Merge a patch and persist the resulting set
    ///
    /// The in-memory set only changes once the new set has been written.
    ///
    /// # Errors
    ///
    /// Returns the storage error when persisting fails
    pub fn update(&mut self, patch: &PreferencesPatch) -> Result<&UserPreferences> {
        let updated = self.preferences.merge(patch);
        self.store.save(&updated)?;
        tracing::info!(preferences = ?updated, "Updated user preferences");
        self.preferences = updated;
        Ok(&self.preferences)
    }

    /// Restore and persist the default set
    pub fn reset(&mut self) -> Result<&UserPreferences> {
        let defaults = UserPreferences::default();
        self.store.save(&defaults)?;
        self.preferences = defaults;
        Ok(&self.preferences)
    }

    /// Whether the onboarding message is still due in this session
    pub fn is_first_visit(&self) -> bool {
        self.first_visit
    }

    /// Record that the onboarding message has been shown
    pub fn mark_onboarded(&mut self) {
        self.first_visit = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_context() -> (UserContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new_with_path(dir.path().join("prefs.json")).unwrap();
        (UserContext::load(PreferenceStore::open(storage)), dir)
    }

    #[test]
    fn test_default_preferences() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.gender, Gender::Male);
        assert_eq!(prefs.age_group, AgeGroup::Twenties);
        assert_eq!(prefs.has_children, HasChildren::No);
        assert_eq!(prefs.transportation, Transportation::Walk);
    }

    #[test]
    fn test_preferences_serialize_with_korean_labels() {
        let json = serde_json::to_value(UserPreferences::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "gender": "남성",
                "age_group": "20대",
                "has_children": "아니오",
                "transportation": "도보"
            })
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"gender":"여성"}"#).unwrap();
        assert_eq!(prefs.gender, Gender::Female);
        assert_eq!(prefs.transportation, Transportation::Walk);
    }

    #[test]
    fn test_parse_accepts_korean_and_english() {
        assert_eq!("여성".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(
            "60대 이상".parse::<AgeGroup>().unwrap(),
            AgeGroup::SixtiesPlus
        );
        assert_eq!("60s".parse::<AgeGroup>().unwrap(), AgeGroup::SixtiesPlus);
        assert_eq!("예".parse::<HasChildren>().unwrap(), HasChildren::Yes);
        assert_eq!("bike".parse::<Transportation>().unwrap(), Transportation::Bicycle);
    }

    #[test]
    fn test_parse_rejects_unknown_value() {
        let err = "spaceship".parse::<Transportation>().unwrap_err();
        assert!(err.to_string().contains("transportation"));
        assert!(err.to_string().contains("대중교통"));
    }

    #[test]
    fn test_merge_leaves_absent_fields_unchanged() {
        let base = UserPreferences {
            gender: Gender::Female,
            age_group: AgeGroup::Forties,
            has_children: HasChildren::Yes,
            transportation: Transportation::Car,
        };
        let patch = PreferencesPatch {
            age_group: Some(AgeGroup::Thirties),
            ..Default::default()
        };
        let merged = base.merge(&patch);
        assert_eq!(merged.age_group, AgeGroup::Thirties);
        assert_eq!(merged.gender, base.gender);
        assert_eq!(merged.has_children, base.has_children);
        assert_eq!(merged.transportation, base.transportation);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let patch = PreferencesPatch {
            gender: Some(Gender::Female),
            transportation: Some(Transportation::Transit),
            ..Default::default()
        };
        for gender in Gender::ALL {
            for transportation in Transportation::ALL {
                let base = UserPreferences {
                    gender: *gender,
                    transportation: *transportation,
                    ..Default::default()
                };
                let once = base.merge(&patch);
                assert_eq!(once.merge(&patch), once);
            }
        }
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let base = UserPreferences::default();
        let patch = PreferencesPatch::default();
        assert!(patch.is_empty());
        assert_eq!(base.merge(&patch), base);
    }

    #[test]
    fn test_patch_from_field() {
        let patch = PreferencesPatch::from_field("age-group", "30s").unwrap();
        assert_eq!(patch.age_group, Some(AgeGroup::Thirties));
        assert!(patch.gender.is_none());

        assert!(PreferencesPatch::from_field("shoe_size", "270").is_err());
        assert!(PreferencesPatch::from_field("gender", "unknown").is_err());
    }

    #[test]
    fn test_context_first_visit_then_not() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let first = UserContext::load(PreferenceStore::open(
            LocalStorage::new_with_path(&path).unwrap(),
        ));
        assert!(first.is_first_visit());

        let second = UserContext::load(PreferenceStore::open(
            LocalStorage::new_with_path(&path).unwrap(),
        ));
        assert!(!second.is_first_visit());
    }

    #[test]
    fn test_mark_onboarded_clears_flag() {
        let (mut ctx, _dir) = test_context();
        assert!(ctx.is_first_visit());
        ctx.mark_onboarded();
        assert!(!ctx.is_first_visit());
    }

    #[test]
    fn test_update_persists_full_set() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let mut ctx = UserContext::load(PreferenceStore::open(
            LocalStorage::new_with_path(&path).unwrap(),
        ));

        let patch = PreferencesPatch {
            has_children: Some(HasChildren::Yes),
            ..Default::default()
        };
        ctx.update(&patch).unwrap();

        let reloaded = UserContext::load(PreferenceStore::open(
            LocalStorage::new_with_path(&path).unwrap(),
        ));
        assert_eq!(reloaded.preferences(), ctx.preferences());
        assert_eq!(reloaded.preferences().has_children, HasChildren::Yes);
    }

    #[test]
    fn test_update_failure_leaves_state_unchanged() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes every write fail.
        let path = dir.path().join("prefs.json");
        std::fs::create_dir_all(&path).unwrap();
        let mut ctx = UserContext::load(PreferenceStore::open(
            LocalStorage::new_with_path(&path).unwrap(),
        ));

        let patch = PreferencesPatch {
            gender: Some(Gender::Female),
            ..Default::default()
        };
        assert!(ctx.update(&patch).is_err());
        assert_eq!(ctx.preferences().gender, Gender::Male);
    }

    #[test]
    fn test_invalid_stored_blob_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new_with_path(dir.path().join("prefs.json")).unwrap();
        storage
            .set_item(PREFERENCES_KEY, r#"{"gender": "robot"}"#)
            .unwrap();

        let ctx = UserContext::load(PreferenceStore::open(storage));
        assert_eq!(*ctx.preferences(), UserPreferences::default());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (mut ctx, _dir) = test_context();
        ctx.update(&PreferencesPatch {
            transportation: Some(Transportation::Car),
            ..Default::default()
        })
        .unwrap();
        ctx.reset().unwrap();
        assert_eq!(*ctx.preferences(), UserPreferences::default());
    }
}
