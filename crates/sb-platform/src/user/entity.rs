//! User Entity
//!
//! Accounts are either volunteers or one of the elevated organizer roles.
//! What a role may do is expressed as a fixed capability set rather than
//! string comparisons at each call site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::shared::error::PlatformError;
use crate::shared::ids::IdGenerator;

/// Actions gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    BrowseShifts,
    ApplyForShifts,
    ManageOwnProfile,
    ManageShifts,
    ManageVolunteers,
    ViewStatistics,
}

const VOLUNTEER_CAPABILITIES: &[Capability] = &[
    Capability::BrowseShifts,
    Capability::ApplyForShifts,
    Capability::ManageOwnProfile,
];

const ORGANIZER_CAPABILITIES: &[Capability] = &[
    Capability::BrowseShifts,
    Capability::ApplyForShifts,
    Capability::ManageOwnProfile,
    Capability::ManageShifts,
    Capability::ManageVolunteers,
    Capability::ViewStatistics,
];

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Volunteer,
    Coordinator,
    Admin,
    Organizer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Volunteer, Role::Coordinator, Role::Admin, Role::Organizer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Volunteer => "volunteer",
            Role::Coordinator => "coordinator",
            Role::Admin => "admin",
            Role::Organizer => "organizer",
        }
    }

    /// Coordinator, admin and organizer all hold the organizer capability set
    pub fn is_elevated(&self) -> bool {
        !matches!(self, Role::Volunteer)
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        if self.is_elevated() {
            ORGANIZER_CAPABILITIES
        } else {
            VOLUNTEER_CAPABILITIES
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| PlatformError::validation(format!("Unknown role: {}", s.trim())))
    }
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    /// Unique login name
    pub username: String,

    /// Argon2id PHC string, never returned by the API
    #[serde(rename = "password")]
    pub password_hash: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub contact: String,

    #[serde(default)]
    pub profile_picture: String,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: IdGenerator::generate(),
            username: username.into(),
            password_hash: password_hash.into(),
            role,
            name: String::new(),
            email: String::new(),
            contact: String::new(),
            profile_picture: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Name shown in rankings: the profile name, or the username when unset
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }

    /// Overwrite the profile fields present in `update`, leaving the rest untouched.
    pub fn apply_profile_update(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(contact) = update.contact {
            self.contact = contact;
        }
        if let Some(profile_picture) = update.profile_picture {
            self.profile_picture = profile_picture;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial profile change; `None` fields are left as they are
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub profile_picture: Option<String>,
}
