use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Millis;

/// Content preferences merged field-by-field by the preferences endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub favorite_ingredients: Vec<String>,
}

/// A viewer account. Credentials are issued and checked by the external
/// auth service; only the hash storage lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub avatar: Option<String>,
    pub bio: String,
    pub location: String,
    pub preferences: Preferences,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<Millis>,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl User {
    pub fn from_row(row: &SqliteRow) -> AppResult<Self> {
        let preferences: String = row.try_get("preferences")?;
        Ok(User {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            avatar: row.try_get("avatar")?,
            bio: row.try_get("bio")?,
            location: row.try_get("location")?,
            preferences: serde_json::from_str(&preferences)?,
            is_active: row.try_get("is_active")?,
            last_login: row.try_get("last_login")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Follower projection returned by the partner followers listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerSummary {
    pub id: Uuid,
    pub full_name: String,
    pub avatar: Option<String>,
    pub bio: String,
    pub location: String,
    pub cuisines: Vec<String>,
}

impl From<User> for FollowerSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            avatar: user.avatar,
            bio: user.bio,
            location: user.location,
            cuisines: user.preferences.cuisines,
        }
    }
}
