// Social graph operations: explicit follow/unfollow over the follow edge
// set, follower/following listings, and per-user preference management.
//
// The follows table is authoritative; partners.followers_count is a derived
// counter maintained here via atomic increments only.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::user::FollowerSummary;
use crate::models::{current_time_millis, FoodPartner, Pagination, Preferences, User};
use crate::notifications::Notifier;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResult {
    pub following_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatus {
    pub is_following: bool,
    pub following_count: i64,
}

#[derive(Debug, Serialize)]
pub struct FollowingPage {
    pub following: Vec<FoodPartner>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct FollowersPage {
    pub followers: Vec<FollowerSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingStats {
    pub count: i64,
    pub total_videos: i64,
    pub average_rating: f64,
}

#[derive(Debug, Serialize)]
pub struct SocialStats {
    pub following: FollowingStats,
    pub preferences: Preferences,
}

/// Partial preference update; omitted sub-fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub cuisines: Option<Vec<String>>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub favorite_ingredients: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct SocialService {
    db: Arc<Database>,
    notifier: Notifier,
}

impl SocialService {
    pub fn new(db: Arc<Database>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    async fn load_user(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        User::from_row(&row)
    }

    async fn load_partner(&self, partner_id: Uuid) -> AppResult<FoodPartner> {
        let row = sqlx::query("SELECT * FROM partners WHERE id = ?")
            .bind(partner_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Food partner not found".to_string()))?;
        FoodPartner::from_row(&row)
    }

    async fn following_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    pub async fn follow(&self, user_id: Uuid, partner_id: Uuid) -> AppResult<FollowResult> {
        let partner = self.load_partner(partner_id).await?;
        self.load_user(user_id).await?;

        let already: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE user_id = ? AND partner_id = ?",
        )
        .bind(user_id)
        .bind(partner_id)
        .fetch_one(self.db.pool())
        .await?;
        if already > 0 {
            return Err(AppError::Conflict(
                "Already following this partner".to_string(),
            ));
        }

        let insert = sqlx::query(
            "INSERT INTO follows (user_id, partner_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(partner_id)
        .bind(current_time_millis())
        .execute(self.db.pool())
        .await;
        match insert {
            Ok(_) => {}
            // The primary key backs up the pre-check under concurrency.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::Conflict(
                    "Already following this partner".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        sqlx::query("UPDATE partners SET followers_count = followers_count + 1 WHERE id = ?")
            .bind(partner_id)
            .execute(self.db.pool())
            .await?;

        if let Err(e) = self.notifier.new_follower(&partner, user_id).await {
            warn!("Failed to send follow notification: {}", e);
        }

        info!("User {} followed partner {}", user_id, partner_id);
        Ok(FollowResult {
            following_count: self.following_count(user_id).await?,
        })
    }

    pub async fn unfollow(&self, user_id: Uuid, partner_id: Uuid) -> AppResult<FollowResult> {
        self.load_partner(partner_id).await?;
        self.load_user(user_id).await?;

        let removed = sqlx::query("DELETE FROM follows WHERE user_id = ? AND partner_id = ?")
            .bind(user_id)
            .bind(partner_id)
            .execute(self.db.pool())
            .await?;
        if removed.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Not following this partner".to_string(),
            ));
        }

        sqlx::query("UPDATE partners SET followers_count = followers_count - 1 WHERE id = ?")
            .bind(partner_id)
            .execute(self.db.pool())
            .await?;

        info!("User {} unfollowed partner {}", user_id, partner_id);
        Ok(FollowResult {
            following_count: self.following_count(user_id).await?,
        })
    }

    /// Followed partners in follow order, with partner summaries.
    pub async fn following(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> AppResult<FollowingPage> {
        self.load_user(user_id).await?;

        let rows = sqlx::query(
            "SELECT p.* FROM follows fw
             JOIN partners p ON p.id = fw.partner_id
             WHERE fw.user_id = ?
             ORDER BY fw.created_at ASC, fw.rowid ASC
             LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(Pagination::offset(page, limit))
        .fetch_all(self.db.pool())
        .await?;

        let following = rows
            .iter()
            .map(FoodPartner::from_row)
            .collect::<AppResult<Vec<_>>>()?;
        let total = self.following_count(user_id).await?;

        Ok(FollowingPage {
            following,
            pagination: Pagination::new(page, limit, total as u64),
        })
    }

    /// Active users following the partner, newest account first. Computed
    /// from the edge table rather than a materialized reverse list.
    pub async fn followers(
        &self,
        partner_id: Uuid,
        page: u32,
        limit: u32,
    ) -> AppResult<FollowersPage> {
        self.load_partner(partner_id).await?;

        let rows = sqlx::query(
            "SELECT u.* FROM users u
             JOIN follows fw ON fw.user_id = u.id
             WHERE fw.partner_id = ? AND u.is_active = 1
             ORDER BY u.created_at DESC
             LIMIT ? OFFSET ?",
        )
        .bind(partner_id)
        .bind(i64::from(limit))
        .bind(Pagination::offset(page, limit))
        .fetch_all(self.db.pool())
        .await?;

        let followers = rows
            .iter()
            .map(|row| User::from_row(row).map(FollowerSummary::from))
            .collect::<AppResult<Vec<_>>>()?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users u
             JOIN follows fw ON fw.user_id = u.id
             WHERE fw.partner_id = ? AND u.is_active = 1",
        )
        .bind(partner_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(FollowersPage {
            followers,
            pagination: Pagination::new(page, limit, total as u64),
        })
    }

    pub async fn follow_status(&self, user_id: Uuid, partner_id: Uuid) -> AppResult<FollowStatus> {
        self.load_user(user_id).await?;
        let is_following: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE user_id = ? AND partner_id = ?",
        )
        .bind(user_id)
        .bind(partner_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(FollowStatus {
            is_following: is_following > 0,
            following_count: self.following_count(user_id).await?,
        })
    }

    /// Totals across followed partners; the mean rating weighs each partner
    /// equally regardless of its own video count.
    pub async fn stats(&self, user_id: Uuid) -> AppResult<SocialStats> {
        let user = self.load_user(user_id).await?;

        let rows = sqlx::query(
            "SELECT p.total_videos, p.rating FROM follows fw
             JOIN partners p ON p.id = fw.partner_id
             WHERE fw.user_id = ?",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        use sqlx::Row;
        let count = rows.len() as i64;
        let mut total_videos = 0i64;
        let mut rating_sum = 0f64;
        for row in &rows {
            total_videos += row.try_get::<i64, _>("total_videos")?;
            rating_sum += row.try_get::<f64, _>("rating")?;
        }
        let average_rating = if count > 0 {
            (rating_sum / count as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };

        Ok(SocialStats {
            following: FollowingStats {
                count,
                total_videos,
                average_rating,
            },
            preferences: user.preferences,
        })
    }

    /// Merge the provided preference sub-fields; omitted ones are kept.
    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        update: PreferencesUpdate,
    ) -> AppResult<Preferences> {
        let user = self.load_user(user_id).await?;

        let mut preferences = user.preferences;
        if let Some(cuisines) = update.cuisines {
            preferences.cuisines = cuisines;
        }
        if let Some(dietary) = update.dietary_restrictions {
            preferences.dietary_restrictions = dietary;
        }
        if let Some(ingredients) = update.favorite_ingredients {
            preferences.favorite_ingredients = ingredients;
        }

        sqlx::query("UPDATE users SET preferences = ?, updated_at = ? WHERE id = ?")
            .bind(serde_json::to_string(&preferences)?)
            .bind(current_time_millis())
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        info!("User {} updated preferences", user_id);
        Ok(preferences)
    }
}
