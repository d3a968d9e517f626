//! Core data types for drainadopt.
//!
//! These mirror the JSON the drain API speaks. The client never invents
//! drain identifiers; it only reads records and submits updates.

use serde::{Deserialize, Serialize};

use drainadopt_maps::LatLng;

/// A storm drain record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drain {
    /// Server-assigned identifier.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Photo of the drain.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// The adopting user, if any.
    #[serde(default)]
    pub adopted_by_user_id: Option<i64>,
}

/// Whether a drain can still be adopted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AdoptionStatus {
    /// Nobody has adopted the drain.
    Available,
    /// A user has adopted the drain.
    Adopted,
}

impl std::fmt::Display for AdoptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::Adopted => write!(f, "Adopted"),
        }
    }
}

impl Drain {
    /// Adoption status derived from the adopting user.
    #[must_use]
    pub fn status(&self) -> AdoptionStatus {
        if self.adopted_by_user_id.is_some() {
            AdoptionStatus::Adopted
        } else {
            AdoptionStatus::Available
        }
    }

    /// Check if someone has adopted this drain.
    #[must_use]
    pub fn is_adopted(&self) -> bool {
        self.adopted_by_user_id.is_some()
    }

    /// The drain's position.
    #[must_use]
    pub fn location(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Coordinates formatted to six decimal places.
    #[must_use]
    pub fn coordinates_text(&self) -> String {
        self.location().to_string()
    }

    /// Link that opens the drain's position in Google Maps.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be built.
    pub fn maps_url(&self) -> crate::Result<reqwest::Url> {
        Ok(drainadopt_maps::search_url(self.location())?)
    }
}

/// A partial drain update. Absent fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New photo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// New latitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// New longitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// A user's role in the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// May edit and delete drains.
    #[serde(alias = "admin")]
    Admin,
    /// May adopt drains.
    #[default]
    #[serde(alias = "adopter")]
    Adopter,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Adopter => write!(f, "ADOPTER"),
        }
    }
}

/// The signed-in user, as provided by the auth context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server identifier of the user.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Role.
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Check if this user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The authentication context the views act under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// A session with nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session for a signed-in user.
    #[must_use]
    pub fn signed_in(user: User, token: Option<String>) -> Self {
        Self {
            token,
            user: Some(user),
        }
    }

    /// The signed-in user.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Bearer token for API requests.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Check if someone is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Check if the signed-in user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}

/// Error body returned by the drain API.
///
/// Every field is optional. `error` is only the reason phrase, so it is never
/// shown in place of `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP status echoed in the body.
    #[serde(default)]
    pub status: Option<u16>,
    /// Short reason phrase, e.g. `Not Found`.
    #[serde(default)]
    pub error: Option<String>,
    /// Detailed message.
    #[serde(default)]
    pub message: Option<String>,
    /// Request path.
    #[serde(default)]
    pub path: Option<String>,
}

impl ApiErrorBody {
    /// The server's message, if it sent a non-empty one.
    #[must_use]
    pub fn best_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}
