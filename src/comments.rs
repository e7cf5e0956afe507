// Comments on food posts, plus comment likes. The owning food's
// comments_count tracks creations and deletions; the (user, comment) like
// pair is unique at the storage layer.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::comment::COMMENT_MAX_LEN;
use crate::models::{current_time_millis, Comment, Food, Pagination};
use crate::notifications::Notifier;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub food_id: Uuid,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLikeResult {
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    notifier: Notifier,
}

impl CommentService {
    pub fn new(db: Arc<Database>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    fn validate_text(text: &str) -> AppResult<()> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "Comment text is required".to_string(),
            ));
        }
        if text.chars().count() > COMMENT_MAX_LEN {
            return Err(AppError::Validation(
                "Comment cannot exceed 500 characters".to_string(),
            ));
        }
        Ok(())
    }

    async fn load_food(&self, food_id: Uuid) -> AppResult<Food> {
        let row = sqlx::query("SELECT * FROM foods WHERE id = ?")
            .bind(food_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Food not found".to_string()))?;
        Food::from_row(&row)
    }

    pub async fn create(&self, user_id: Uuid, request: CreateCommentRequest) -> AppResult<Comment> {
        Self::validate_text(&request.text)?;
        let food = self.load_food(request.food_id).await?;

        let user_name: Option<String> =
            sqlx::query_scalar("SELECT full_name FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?;
        let user_name = user_name.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = current_time_millis();
        let comment = Comment {
            id: Uuid::new_v4(),
            user: user_id,
            food: request.food_id,
            text: request.text,
            like_count: 0,
            created_at: now,
            updated_at: now,
            user_name: Some(user_name),
        };

        sqlx::query(
            "INSERT INTO comments (id, user_id, food_id, text, like_count, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(comment.id)
        .bind(comment.user)
        .bind(comment.food)
        .bind(&comment.text)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(self.db.pool())
        .await?;

        // Counter and fanout are side effects of the primary write.
        if let Err(e) =
            sqlx::query("UPDATE foods SET comments_count = comments_count + 1 WHERE id = ?")
                .bind(comment.food)
                .execute(self.db.pool())
                .await
        {
            warn!("Failed to update comment count: {}", e);
        }
        if let Err(e) = self
            .notifier
            .food_commented(&food, user_id, &comment.text)
            .await
        {
            warn!("Failed to send comment notification: {}", e);
        }

        Ok(comment)
    }

    /// Comments for a food, newest first, with commenter names.
    pub async fn for_food(&self, food_id: Uuid, page: u32, limit: u32) -> AppResult<CommentPage> {
        self.load_food(food_id).await?;

        let rows = sqlx::query(
            "SELECT c.*, u.full_name AS user_name FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.food_id = ?
             ORDER BY c.created_at DESC, c.rowid DESC
             LIMIT ? OFFSET ?",
        )
        .bind(food_id)
        .bind(i64::from(limit))
        .bind(Pagination::offset(page, limit))
        .fetch_all(self.db.pool())
        .await?;
        let comments = rows
            .iter()
            .map(Comment::from_row)
            .collect::<AppResult<Vec<_>>>()?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE food_id = ?")
            .bind(food_id)
            .fetch_one(self.db.pool())
            .await?;

        Ok(CommentPage {
            comments,
            pagination: Pagination::new(page, limit, total as u64),
        })
    }

    /// Edit own comment.
    pub async fn update(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
        request: UpdateCommentRequest,
    ) -> AppResult<Comment> {
        Self::validate_text(&request.text)?;

        let updated = sqlx::query(
            "UPDATE comments SET text = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&request.text)
        .bind(current_time_millis())
        .bind(comment_id)
        .bind(user_id)
        .execute(self.db.pool())
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Comment not found or not authorized".to_string(),
            ));
        }

        let row = sqlx::query(
            "SELECT c.*, u.full_name AS user_name FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.id = ?",
        )
        .bind(comment_id)
        .fetch_one(self.db.pool())
        .await?;
        Comment::from_row(&row)
    }

    /// Delete own comment and release its like rows; decrements the food's
    /// comment counter as a logged side effect.
    pub async fn delete(&self, user_id: Uuid, comment_id: Uuid) -> AppResult<()> {
        let food_id: Option<Uuid> =
            sqlx::query_scalar("SELECT food_id FROM comments WHERE id = ? AND user_id = ?")
                .bind(comment_id)
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?;
        let food_id = food_id.ok_or_else(|| {
            AppError::NotFound("Comment not found or not authorized".to_string())
        })?;

        let mut tx = self.db.pool().begin().await?;
        sqlx::query("DELETE FROM comment_likes WHERE comment_id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if let Err(e) =
            sqlx::query("UPDATE foods SET comments_count = comments_count - 1 WHERE id = ?")
                .bind(food_id)
                .execute(self.db.pool())
                .await
        {
            warn!("Failed to update comment count on delete: {}", e);
        }

        info!("User {} deleted comment {}", user_id, comment_id);
        Ok(())
    }

    /// Like toggle on a comment; the unique pair key arbitrates races.
    pub async fn toggle_like(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
    ) -> AppResult<CommentLikeResult> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_one(self.db.pool())
            .await?;
        if exists == 0 {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        let insert = sqlx::query(
            "INSERT INTO comment_likes (user_id, comment_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(comment_id)
        .bind(current_time_millis())
        .execute(self.db.pool())
        .await;

        let liked = match insert {
            Ok(_) => {
                sqlx::query("UPDATE comments SET like_count = like_count + 1 WHERE id = ?")
                    .bind(comment_id)
                    .execute(self.db.pool())
                    .await?;
                true
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                sqlx::query("DELETE FROM comment_likes WHERE user_id = ? AND comment_id = ?")
                    .bind(user_id)
                    .bind(comment_id)
                    .execute(self.db.pool())
                    .await?;
                sqlx::query("UPDATE comments SET like_count = like_count - 1 WHERE id = ?")
                    .bind(comment_id)
                    .execute(self.db.pool())
                    .await?;
                false
            }
            Err(e) => return Err(e.into()),
        };

        let like_count: i64 = sqlx::query_scalar("SELECT like_count FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(CommentLikeResult { liked, like_count })
    }
}
