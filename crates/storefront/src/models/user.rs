//! User profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{Email, Role, UserId};

/// A user profile document, keyed by the auth service's stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier issued by the authentication service.
    pub uid: UserId,
    pub full_name: String,
    pub email: Email,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, rename = "province_city", skip_serializing_if = "Option::is_none")]
    pub province_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Authorization tier.
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_deleted: bool,
}

impl User {
    /// Whether this user may see every order and mutate the catalog.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
