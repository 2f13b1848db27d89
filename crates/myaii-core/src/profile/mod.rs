//! Local user profile and onboarding.
//!
//! The profile lives on the device only. Onboarding captures name and phone;
//! the profile screen may later add an email and a language.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::storage::{get_json, set_json, KeyValueStore};

/// Storage key of the full profile record
pub const USER_PROFILE_KEY: &str = "myaii:userProfile";

/// Storage key of the bare display name used by the avatar greeting
pub const USER_NAME_KEY: &str = "myaii_user_name";

/// Minimum digits in a phone number, whitespace excluded
const MIN_PHONE_LEN: usize = 6;

/// Fallback form of address when no name is known
const ANONYMOUS_NAME: &str = "du";

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::De => write!(f, "de"),
            Language::En => write!(f, "en"),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            other => Err(Error::validation(format!("unsupported language '{}'", other))),
        }
    }
}

/// Stored user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub language: Language,
    pub is_onboarded: bool,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Name to address the user by
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { ANONYMOUS_NAME } else { name }
    }

    /// Initials of the first and last name part, `?` when unnamed.
    pub fn initials(&self) -> String {
        let parts: Vec<&str> = self.name.split_whitespace().collect();
        let initial = |s: &str| s.chars().next().map(|c| c.to_uppercase().collect::<String>());

        match parts.as_slice() {
            [] => "?".to_string(),
            [only] => initial(*only).unwrap_or_default(),
            [first, .., last] => format!(
                "{}{}",
                initial(*first).unwrap_or_default(),
                initial(*last).unwrap_or_default()
            ),
        }
    }
}

/// Onboarding input
#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub name: String,
    pub phone: String,
}

impl ProfileInput {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Check name and phone the way the onboarding form does.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Please enter your name."));
        }
        validate_phone(&self.phone)
    }
}

fn validate_phone(phone: &str) -> Result<()> {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.chars().count() < MIN_PHONE_LEN {
        return Err(Error::validation("Please enter a valid mobile number."));
    }
    Ok(())
}

/// Changes applied from the profile screen
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    /// `Some("")` clears the email
    pub email: Option<String>,
    pub language: Option<Language>,
}

/// Where the app should land after the splash screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialRoute {
    Home,
    Login,
}

/// Route onboarded users home, everyone else to login.
pub fn initial_route(profile: Option<&UserProfile>) -> InitialRoute {
    match profile {
        Some(p) if p.is_onboarded => InitialRoute::Home,
        _ => InitialRoute::Login,
    }
}

/// Profile persistence on top of a key-value store.
#[derive(Clone)]
pub struct ProfileStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Complete onboarding: validate, stamp and persist a new profile.
    pub fn save(&self, input: &ProfileInput) -> Result<UserProfile> {
        input.validate()?;

        let profile = UserProfile {
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: None,
            language: Language::default(),
            is_onboarded: true,
            created_at: Utc::now(),
        };
        self.write(&profile)?;

        info!("User profile saved");
        Ok(profile)
    }

    /// Apply edits to the stored profile, keeping its creation time.
    pub fn update(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let mut profile = self
            .load()?
            .ok_or_else(|| Error::NotFound("user profile".to_string()))?;

        if let Some(name) = &update.name {
            profile.name = name.trim().to_string();
        }
        if let Some(phone) = &update.phone {
            validate_phone(phone)?;
            profile.phone = phone.trim().to_string();
        }
        if let Some(email) = &update.email {
            let email = email.trim();
            profile.email = (!email.is_empty()).then(|| email.to_string());
        }
        if let Some(language) = update.language {
            profile.language = language;
        }

        self.write(&profile)?;
        Ok(profile)
    }

    /// Load the profile. A corrupt record is logged and treated as absent.
    pub fn load(&self) -> Result<Option<UserProfile>> {
        match get_json::<UserProfile>(self.store.as_ref(), USER_PROFILE_KEY) {
            Ok(profile) => Ok(profile),
            Err(Error::Serialization(e)) => {
                warn!("Failed to parse stored user profile: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Name stored for the avatar greeting
    pub fn avatar_name(&self) -> Result<Option<String>> {
        self.store.get(USER_NAME_KEY)
    }

    /// Logout: remove the profile and the mirrored name.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(USER_PROFILE_KEY)?;
        self.store.remove(USER_NAME_KEY)?;
        info!("User profile cleared");
        Ok(())
    }

    fn write(&self, profile: &UserProfile) -> Result<()> {
        set_json(self.store.as_ref(), USER_PROFILE_KEY, profile)?;

        let name = profile.name.trim();
        if name.is_empty() {
            self.store.remove(USER_NAME_KEY)
        } else {
            self.store.set(USER_NAME_KEY, name)
        }
    }
}
