use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Cuisine, DietaryTag, GeoPoint, Millis};

/// Weighted engagement signal used for trending/relevance ordering.
/// Saves and comments weigh more than likes; views contribute a trickle.
pub fn engagement_score(likes: i64, saves: i64, comments: i64, views: i64) -> f64 {
    likes as f64 * 2.0 + saves as f64 * 3.0 + comments as f64 * 4.0 + views as f64 * 0.1
}

/// SQL expression mirroring [`engagement_score`], used as a sort key.
pub const ENGAGEMENT_SCORE_SQL: &str =
    "(f.like_count * 2.0 + f.saves_count * 3.0 + f.comments_count * 4.0 + f.view_count * 0.1)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
}

/// A food video post owned by a partner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    /// Storage key of the uploaded video (upload itself is external).
    pub video: String,
    pub thumbnail: Option<String>,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub cuisine: Cuisine,
    pub dietary_info: Vec<DietaryTag>,
    pub difficulty: Difficulty,
    pub cooking_time: Option<i64>,
    pub servings: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub food_partner: Uuid,
    pub location: GeoPoint,
    pub tags: Vec<String>,
    pub like_count: i64,
    pub saves_count: i64,
    pub comments_count: i64,
    pub view_count: i64,
    pub average_rating: f64,
    pub total_ratings: i64,
    pub is_active: bool,
    pub is_featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_until: Option<Millis>,
    pub created_at: Millis,
    pub updated_at: Millis,
    /// Derived, never persisted; recomputed from counters on every read.
    #[serde(default)]
    pub engagement_score: f64,
    /// Populated only for distance-sorted geo searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Food {
    pub fn engagement_score(&self) -> f64 {
        engagement_score(
            self.like_count,
            self.saves_count,
            self.comments_count,
            self.view_count,
        )
    }

    pub fn from_row(row: &SqliteRow) -> AppResult<Self> {
        let ingredients: String = row.try_get("ingredients")?;
        let dietary_info: String = row.try_get("dietary_info")?;
        let tags: String = row.try_get("tags")?;
        let nutritional_info: Option<String> = row.try_get("nutritional_info")?;
        let cuisine: String = row.try_get("cuisine")?;
        let difficulty: String = row.try_get("difficulty")?;
        let lat: f64 = row.try_get("lat")?;
        let lng: f64 = row.try_get("lng")?;

        let like_count: i64 = row.try_get("like_count")?;
        let saves_count: i64 = row.try_get("saves_count")?;
        let comments_count: i64 = row.try_get("comments_count")?;
        let view_count: i64 = row.try_get("view_count")?;

        Ok(Food {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            video: row.try_get("video")?,
            thumbnail: row.try_get("thumbnail")?,
            description: row.try_get("description")?,
            ingredients: serde_json::from_str(&ingredients)?,
            cuisine: cuisine.parse().unwrap_or_default(),
            dietary_info: serde_json::from_str(&dietary_info)?,
            difficulty: difficulty.parse().unwrap_or_default(),
            cooking_time: row.try_get("cooking_time")?,
            servings: row.try_get("servings")?,
            nutritional_info: nutritional_info
                .map(|raw| serde_json::from_str(&raw))
                .transpose()?,
            price: row.try_get("price")?,
            food_partner: row.try_get("partner_id")?,
            location: GeoPoint::new(lng, lat),
            tags: serde_json::from_str(&tags)?,
            like_count,
            saves_count,
            comments_count,
            view_count,
            average_rating: row.try_get("average_rating")?,
            total_ratings: row.try_get("total_ratings")?,
            is_active: row.try_get("is_active")?,
            is_featured: row.try_get("is_featured")?,
            featured_until: row.try_get("featured_until")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            engagement_score: engagement_score(like_count, saves_count, comments_count, view_count),
            distance_km: None,
        })
    }
}
