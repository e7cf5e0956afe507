// In-memory notification fanout.
//
// Inboxes and the live-listener registry are process-local shared state:
// notifications survive for the lifetime of the process only, and a
// multi-process deployment would replace this with an external keyed log
// plus a pub/sub channel. Appends to the inbox are at-least-once; live
// delivery is best-effort.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::Row;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::{current_time_millis, Food, FoodPartner, Millis, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewFoodPost,
    FoodLiked,
    FoodCommented,
    NewFollower,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewFoodPost => "new_food_post",
            NotificationKind::FoodLiked => "food_liked",
            NotificationKind::FoodCommented => "food_commented",
            NotificationKind::NewFollower => "new_follower",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: Value,
    pub read: bool,
    pub created_at: Millis,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: &str, message: String, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            message,
            data,
            read: false,
            created_at: current_time_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
    pub unread_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    pub total: u64,
    pub unread: u64,
    pub by_type: BTreeMap<String, u64>,
}

/// Per-recipient capped inbox plus live-listener registry.
pub struct NotificationHub {
    inboxes: RwLock<HashMap<Uuid, VecDeque<Notification>>>,
    listeners: RwLock<HashMap<Uuid, Vec<UnboundedSender<Notification>>>>,
    capacity: usize,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            inboxes: RwLock::new(HashMap::new()),
            listeners: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a live listener for a recipient. The receiver gets every
    /// notification published while it stays open; dropped receivers are
    /// pruned on the next publish.
    pub async fn subscribe(&self, recipient: Uuid) -> UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.write().await.entry(recipient).or_default().push(tx);
        rx
    }

    /// Push to live listeners, then append to the durable-for-the-process
    /// inbox, evicting oldest entries beyond capacity.
    pub async fn publish(&self, recipient: Uuid, notification: Notification) {
        {
            let mut listeners = self.listeners.write().await;
            if let Some(senders) = listeners.get_mut(&recipient) {
                senders.retain(|tx| tx.send(notification.clone()).is_ok());
                if senders.is_empty() {
                    listeners.remove(&recipient);
                }
            }
        }

        let mut inboxes = self.inboxes.write().await;
        let inbox = inboxes.entry(recipient).or_default();
        inbox.push_back(notification);
        while inbox.len() > self.capacity {
            inbox.pop_front();
        }
    }

    pub async fn list(
        &self,
        recipient: Uuid,
        page: u32,
        limit: u32,
        unread_only: bool,
    ) -> NotificationPage {
        let inboxes = self.inboxes.read().await;
        let inbox = inboxes.get(&recipient);

        let unread_count = inbox
            .map(|q| q.iter().filter(|n| !n.read).count() as u64)
            .unwrap_or(0);

        // Inbox is append-ordered; newest-first is a reverse walk.
        let mut visible: Vec<Notification> = inbox
            .map(|q| {
                q.iter()
                    .filter(|n| !unread_only || !n.read)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        visible.reverse();

        let total = visible.len() as u64;
        let start = Pagination::offset(page, limit) as usize;
        let notifications = visible
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        NotificationPage {
            notifications,
            pagination: Pagination::new(page, limit, total),
            unread_count,
        }
    }

    /// Mark the given ids (or all, when `ids` is `None`) as read.
    /// Returns the remaining unread count.
    pub async fn mark_read(&self, recipient: Uuid, ids: Option<&[Uuid]>) -> u64 {
        let mut inboxes = self.inboxes.write().await;
        let Some(inbox) = inboxes.get_mut(&recipient) else {
            return 0;
        };
        for notification in inbox.iter_mut() {
            match ids {
                Some(ids) if !ids.contains(&notification.id) => {}
                _ => notification.read = true,
            }
        }
        inbox.iter().filter(|n| !n.read).count() as u64
    }

    pub async fn delete(&self, recipient: Uuid, id: Uuid) -> AppResult<()> {
        let mut inboxes = self.inboxes.write().await;
        let inbox = inboxes
            .get_mut(&recipient)
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
        let position = inbox
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
        inbox.remove(position);
        Ok(())
    }

    pub async fn stats(&self, recipient: Uuid) -> NotificationStats {
        let inboxes = self.inboxes.read().await;
        let Some(inbox) = inboxes.get(&recipient) else {
            return NotificationStats {
                total: 0,
                unread: 0,
                by_type: BTreeMap::new(),
            };
        };
        let mut by_type = BTreeMap::new();
        for notification in inbox.iter() {
            *by_type
                .entry(notification.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        NotificationStats {
            total: inbox.len() as u64,
            unread: inbox.iter().filter(|n| !n.read).count() as u64,
            by_type,
        }
    }
}

/// Truncate to `max` characters, appending an ellipsis when cut.
fn truncate_message(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max).collect();
        cut.push_str("...");
        cut
    }
}

/// Builds and fans out event notifications. Every trigger is best-effort:
/// callers log failures and never let them abort the primary write.
#[derive(Clone)]
pub struct Notifier {
    db: Arc<Database>,
    hub: Arc<NotificationHub>,
}

impl Notifier {
    pub fn new(db: Arc<Database>, hub: Arc<NotificationHub>) -> Self {
        Self { db, hub }
    }

    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }

    async fn user_name(&self, user_id: Uuid) -> AppResult<String> {
        let row = sqlx::query("SELECT full_name FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(row.try_get("full_name")?)
    }

    async fn partner_name(&self, partner_id: Uuid) -> AppResult<String> {
        let row = sqlx::query("SELECT name FROM partners WHERE id = ?")
            .bind(partner_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Food partner not found".to_string()))?;
        Ok(row.try_get("name")?)
    }

    /// New post by a partner: notify every active follower.
    pub async fn new_food_post(&self, food: &Food) -> AppResult<()> {
        let partner_name = self.partner_name(food.food_partner).await?;

        let follower_rows = sqlx::query(
            "SELECT fw.user_id FROM follows fw
             JOIN users u ON u.id = fw.user_id
             WHERE fw.partner_id = ? AND u.is_active = 1",
        )
        .bind(food.food_partner)
        .fetch_all(self.db.pool())
        .await?;

        let follower_count = follower_rows.len();
        for row in follower_rows {
            let follower: Uuid = row.try_get("user_id")?;
            let notification = Notification::new(
                NotificationKind::NewFoodPost,
                "New Food Post",
                format!("{} posted a new dish: {}", partner_name, food.name),
                json!({
                    "foodId": food.id,
                    "partnerId": food.food_partner,
                    "foodName": food.name,
                }),
            );
            self.hub.publish(follower, notification).await;
        }

        info!(
            "Sent new food post notifications for {} to {} followers",
            food.name, follower_count
        );
        Ok(())
    }

    /// Like on a food item: notify the owning partner, unless the liker is
    /// the owner.
    pub async fn food_liked(&self, food: &Food, liker: Uuid) -> AppResult<()> {
        if food.food_partner == liker {
            return Ok(());
        }
        let liker_name = self.user_name(liker).await?;
        let notification = Notification::new(
            NotificationKind::FoodLiked,
            "Food Liked",
            format!("{} liked your dish: {}", liker_name, food.name),
            json!({
                "foodId": food.id,
                "likerId": liker,
                "foodName": food.name,
            }),
        );
        self.hub.publish(food.food_partner, notification).await;
        Ok(())
    }

    /// Comment on a food item: notify the owning partner, unless the
    /// commenter is the owner. Comment text is truncated to 50 characters.
    pub async fn food_commented(&self, food: &Food, commenter: Uuid, text: &str) -> AppResult<()> {
        if food.food_partner == commenter {
            return Ok(());
        }
        let commenter_name = self.user_name(commenter).await?;
        let notification = Notification::new(
            NotificationKind::FoodCommented,
            "New Comment",
            format!("{} commented on your dish: {}", commenter_name, food.name),
            json!({
                "foodId": food.id,
                "commenterId": commenter,
                "foodName": food.name,
                "commentText": truncate_message(text, 50),
            }),
        );
        self.hub.publish(food.food_partner, notification).await;
        Ok(())
    }

    /// New follow: notify the partner.
    pub async fn new_follower(&self, partner: &FoodPartner, follower: Uuid) -> AppResult<()> {
        let follower_name = self.user_name(follower).await?;
        let notification = Notification::new(
            NotificationKind::NewFollower,
            "New Follower",
            format!("{} started following you", follower_name),
            json!({
                "followerId": follower,
                "partnerId": partner.id,
            }),
        );
        self.hub.publish(partner.id, notification).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_char_safe_and_bounded() {
        assert_eq!(truncate_message("short", 50), "short");

        let long = "x".repeat(60);
        let cut = truncate_message(&long, 50);
        assert_eq!(cut.chars().count(), 53);
        assert!(cut.ends_with("..."));

        // Multi-byte characters must not split.
        let emoji = "🍜".repeat(60);
        let cut = truncate_message(&emoji, 50);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 53);
    }
}
