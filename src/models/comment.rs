use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Millis;

pub const COMMENT_MAX_LEN: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub food: Uuid,
    pub text: String,
    pub like_count: i64,
    pub created_at: Millis,
    pub updated_at: Millis,
    /// Commenter display name, populated by listing joins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl Comment {
    pub fn from_row(row: &SqliteRow) -> AppResult<Self> {
        Ok(Comment {
            id: row.try_get("id")?,
            user: row.try_get("user_id")?,
            food: row.try_get("food_id")?,
            text: row.try_get("text")?,
            like_count: row.try_get("like_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            user_name: row.try_get::<Option<String>, _>("user_name").ok().flatten(),
        })
    }
}
