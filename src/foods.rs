// Food post lifecycle: creation/removal with partner video-count
// maintenance, like/save toggles with storage-level dedup, view counting,
// and listings. Counter updates are single-statement atomic increments.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::{
    current_time_millis, Cuisine, DietaryTag, Difficulty, Food, GeoPoint, Ingredient,
    NutritionalInfo, Pagination,
};
use crate::notifications::Notifier;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    pub name: String,
    pub video: String,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub cuisine: Cuisine,
    #[serde(default)]
    pub dietary_info: Vec<DietaryTag>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub cooking_time: Option<i64>,
    pub servings: Option<i64>,
    pub nutritional_info: Option<NutritionalInfo>,
    pub price: Option<f64>,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResult {
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub saved: bool,
    pub saves_count: i64,
}

#[derive(Debug, Serialize)]
pub struct FoodPage {
    pub foods: Vec<Food>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct FoodService {
    db: Arc<Database>,
    notifier: Notifier,
}

impl FoodService {
    pub fn new(db: Arc<Database>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    fn validate(request: &CreateFoodRequest) -> AppResult<()> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("Food name is required".to_string()));
        }
        if request.name.chars().count() > 100 {
            return Err(AppError::Validation(
                "Food name cannot exceed 100 characters".to_string(),
            ));
        }
        if request.video.trim().is_empty() {
            return Err(AppError::Validation("Video URL is required".to_string()));
        }
        if request.description.chars().count() > 500 {
            return Err(AppError::Validation(
                "Description cannot exceed 500 characters".to_string(),
            ));
        }
        if let Some(minutes) = request.cooking_time {
            if !(1..=480).contains(&minutes) {
                return Err(AppError::Validation(
                    "Cooking time must be between 1 and 480 minutes".to_string(),
                ));
            }
        }
        if let Some(servings) = request.servings {
            if !(1..=50).contains(&servings) {
                return Err(AppError::Validation(
                    "Servings must be between 1 and 50".to_string(),
                ));
            }
        }
        if let Some(price) = request.price {
            if price < 0.0 {
                return Err(AppError::Validation(
                    "Price cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub async fn create(&self, partner_id: Uuid, request: CreateFoodRequest) -> AppResult<Food> {
        Self::validate(&request)?;

        let partner_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM partners WHERE id = ?")
            .bind(partner_id)
            .fetch_one(self.db.pool())
            .await?;
        if partner_exists == 0 {
            return Err(AppError::NotFound("Food partner not found".to_string()));
        }

        let now = current_time_millis();
        let location = request.location.unwrap_or_default();
        let food = Food {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            video: request.video,
            thumbnail: request.thumbnail,
            description: request.description,
            ingredients: request.ingredients,
            cuisine: request.cuisine,
            dietary_info: request.dietary_info,
            difficulty: request.difficulty,
            cooking_time: request.cooking_time,
            servings: request.servings.unwrap_or(1),
            nutritional_info: request.nutritional_info,
            price: request.price,
            food_partner: partner_id,
            location,
            tags: request
                .tags
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            like_count: 0,
            saves_count: 0,
            comments_count: 0,
            view_count: 0,
            average_rating: 0.0,
            total_ratings: 0,
            is_active: true,
            is_featured: false,
            featured_until: None,
            created_at: now,
            updated_at: now,
            engagement_score: 0.0,
            distance_km: None,
        };

        sqlx::query(
            "INSERT INTO foods (id, name, video, thumbnail, description, ingredients, cuisine,
                                dietary_info, difficulty, cooking_time, servings,
                                nutritional_info, price, partner_id, lat, lng, tags,
                                like_count, saves_count, comments_count, view_count,
                                average_rating, total_ratings, is_active, is_featured,
                                featured_until, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, 0, 0, 0, 0, 1, 0, NULL, ?, ?)",
        )
        .bind(food.id)
        .bind(&food.name)
        .bind(&food.video)
        .bind(&food.thumbnail)
        .bind(&food.description)
        .bind(serde_json::to_string(&food.ingredients)?)
        .bind(food.cuisine.as_str())
        .bind(serde_json::to_string(&food.dietary_info)?)
        .bind(food.difficulty.as_str())
        .bind(food.cooking_time)
        .bind(food.servings)
        .bind(
            food.nutritional_info
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(food.price)
        .bind(food.food_partner)
        .bind(food.location.lat())
        .bind(food.location.lng())
        .bind(serde_json::to_string(&food.tags)?)
        .bind(food.created_at)
        .bind(food.updated_at)
        .execute(self.db.pool())
        .await?;

        // Side effects must not fail the primary write.
        if let Err(e) =
            sqlx::query("UPDATE partners SET total_videos = total_videos + 1 WHERE id = ?")
                .bind(partner_id)
                .execute(self.db.pool())
                .await
        {
            warn!("Failed to update partner video count: {}", e);
        }
        if let Err(e) = self.notifier.new_food_post(&food).await {
            warn!("Failed to fan out new food post notification: {}", e);
        }

        info!("Partner {} posted food {} ({})", partner_id, food.name, food.id);
        Ok(food)
    }

    pub async fn get(&self, food_id: Uuid) -> AppResult<Food> {
        let row = sqlx::query("SELECT * FROM foods WHERE id = ?")
            .bind(food_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Food not found".to_string()))?;
        Food::from_row(&row)
    }

    /// Active foods, newest first.
    pub async fn list(&self, page: u32, limit: u32) -> AppResult<FoodPage> {
        let rows = sqlx::query(
            "SELECT * FROM foods WHERE is_active = 1
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(i64::from(limit))
        .bind(Pagination::offset(page, limit))
        .fetch_all(self.db.pool())
        .await?;
        let foods = rows.iter().map(Food::from_row).collect::<AppResult<Vec<_>>>()?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM foods WHERE is_active = 1")
            .fetch_one(self.db.pool())
            .await?;

        Ok(FoodPage {
            foods,
            pagination: Pagination::new(page, limit, total as u64),
        })
    }

    /// Permanent removal by the owning partner; cleans up reaction and
    /// comment rows in one transaction, then adjusts the partner counter.
    pub async fn delete(&self, partner_id: Uuid, food_id: Uuid) -> AppResult<()> {
        let food = self.get(food_id).await?;
        if food.food_partner != partner_id {
            return Err(AppError::NotFound(
                "Food not found or not authorized".to_string(),
            ));
        }

        let mut tx = self.db.pool().begin().await?;
        sqlx::query(
            "DELETE FROM comment_likes WHERE comment_id IN
             (SELECT id FROM comments WHERE food_id = ?)",
        )
        .bind(food_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM comments WHERE food_id = ?")
            .bind(food_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM food_likes WHERE food_id = ?")
            .bind(food_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM food_saves WHERE food_id = ?")
            .bind(food_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM foods WHERE id = ?")
            .bind(food_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if let Err(e) =
            sqlx::query("UPDATE partners SET total_videos = total_videos - 1 WHERE id = ?")
                .bind(partner_id)
                .execute(self.db.pool())
                .await
        {
            warn!("Failed to update partner video count on delete: {}", e);
        }

        info!("Partner {} deleted food {}", partner_id, food_id);
        Ok(())
    }

    async fn ensure_user(&self, user_id: Uuid) -> AppResult<()> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        if exists == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Like toggle. The unique (user, food) key arbitrates concurrent
    /// toggles: a violation means the like already exists.
    pub async fn toggle_like(&self, user_id: Uuid, food_id: Uuid) -> AppResult<LikeResult> {
        self.ensure_user(user_id).await?;
        let food = self.get(food_id).await?;

        let insert = sqlx::query(
            "INSERT INTO food_likes (user_id, food_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(food_id)
        .bind(current_time_millis())
        .execute(self.db.pool())
        .await;

        let liked = match insert {
            Ok(_) => {
                sqlx::query("UPDATE foods SET like_count = like_count + 1 WHERE id = ?")
                    .bind(food_id)
                    .execute(self.db.pool())
                    .await?;
                if let Err(e) = self.notifier.food_liked(&food, user_id).await {
                    warn!("Failed to send like notification: {}", e);
                }
                true
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                sqlx::query("DELETE FROM food_likes WHERE user_id = ? AND food_id = ?")
                    .bind(user_id)
                    .bind(food_id)
                    .execute(self.db.pool())
                    .await?;
                sqlx::query("UPDATE foods SET like_count = like_count - 1 WHERE id = ?")
                    .bind(food_id)
                    .execute(self.db.pool())
                    .await?;
                false
            }
            Err(e) => return Err(e.into()),
        };

        let like_count: i64 = sqlx::query_scalar("SELECT like_count FROM foods WHERE id = ?")
            .bind(food_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(LikeResult { liked, like_count })
    }

    /// Save toggle, same discipline as likes.
    pub async fn toggle_save(&self, user_id: Uuid, food_id: Uuid) -> AppResult<SaveResult> {
        self.ensure_user(user_id).await?;
        self.get(food_id).await?;

        let insert = sqlx::query(
            "INSERT INTO food_saves (user_id, food_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(food_id)
        .bind(current_time_millis())
        .execute(self.db.pool())
        .await;

        let saved = match insert {
            Ok(_) => {
                sqlx::query("UPDATE foods SET saves_count = saves_count + 1 WHERE id = ?")
                    .bind(food_id)
                    .execute(self.db.pool())
                    .await?;
                true
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                sqlx::query("DELETE FROM food_saves WHERE user_id = ? AND food_id = ?")
                    .bind(user_id)
                    .bind(food_id)
                    .execute(self.db.pool())
                    .await?;
                sqlx::query("UPDATE foods SET saves_count = saves_count - 1 WHERE id = ?")
                    .bind(food_id)
                    .execute(self.db.pool())
                    .await?;
                false
            }
            Err(e) => return Err(e.into()),
        };

        let saves_count: i64 = sqlx::query_scalar("SELECT saves_count FROM foods WHERE id = ?")
            .bind(food_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(SaveResult { saved, saves_count })
    }

    pub async fn saved(&self, user_id: Uuid, page: u32, limit: u32) -> AppResult<FoodPage> {
        self.ensure_user(user_id).await?;

        let rows = sqlx::query(
            "SELECT f.* FROM food_saves fs
             JOIN foods f ON f.id = fs.food_id
             WHERE fs.user_id = ? AND f.is_active = 1
             ORDER BY fs.created_at DESC
             LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(Pagination::offset(page, limit))
        .fetch_all(self.db.pool())
        .await?;
        let foods = rows.iter().map(Food::from_row).collect::<AppResult<Vec<_>>>()?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM food_saves fs
             JOIN foods f ON f.id = fs.food_id
             WHERE fs.user_id = ? AND f.is_active = 1",
        )
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(FoodPage {
            foods,
            pagination: Pagination::new(page, limit, total as u64),
        })
    }

    /// View counter; fire-and-forget from the client's perspective.
    pub async fn record_view(&self, food_id: Uuid) -> AppResult<i64> {
        let updated = sqlx::query("UPDATE foods SET view_count = view_count + 1 WHERE id = ?")
            .bind(food_id)
            .execute(self.db.pool())
            .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Food not found".to_string()));
        }
        let view_count: i64 = sqlx::query_scalar("SELECT view_count FROM foods WHERE id = ?")
            .bind(food_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(view_count)
    }
}
