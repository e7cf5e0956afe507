use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Cuisine, GeoPoint, Millis};

/// A business account that posts food videos.
///
/// `followers_count` is a derived counter over the follow edge set,
/// maintained exclusively by the follow/unfollow operations via atomic
/// increments. `total_videos` tracks active food posts the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPartner {
    pub id: Uuid,
    pub name: String,
    pub contact_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub logo: Option<String>,
    pub description: String,
    pub cuisine: Vec<Cuisine>,
    pub location: GeoPoint,
    pub rating: f64,
    pub total_reviews: i64,
    pub followers_count: i64,
    pub total_videos: i64,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl FoodPartner {
    pub fn from_row(row: &SqliteRow) -> AppResult<Self> {
        let cuisine: String = row.try_get("cuisine")?;
        let lat: f64 = row.try_get("lat")?;
        let lng: f64 = row.try_get("lng")?;
        Ok(FoodPartner {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            contact_name: row.try_get("contact_name")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            logo: row.try_get("logo")?,
            description: row.try_get("description")?,
            cuisine: serde_json::from_str(&cuisine)?,
            location: GeoPoint::new(lng, lat),
            rating: row.try_get("rating")?,
            total_reviews: row.try_get("total_reviews")?,
            followers_count: row.try_get("followers_count")?,
            total_videos: row.try_get("total_videos")?,
            is_verified: row.try_get("is_verified")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
