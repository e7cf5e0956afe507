mod common;

use common::*;
use reeldine::error::AppError;
use reeldine::notifications::{Notification, NotificationHub, NotificationKind};
use serde_json::json;
use uuid::Uuid;

fn sample(kind: NotificationKind, message: &str) -> Notification {
    Notification::new(kind, "Test", message.to_string(), json!({}))
}

#[tokio::test]
async fn inbox_never_exceeds_capacity_and_evicts_oldest() {
    let hub = NotificationHub::new(100);
    let user = Uuid::new_v4();

    for i in 0..101 {
        hub.publish(user, sample(NotificationKind::NewFoodPost, &format!("n{}", i)))
            .await;
    }

    let page = hub.list(user, 1, 200, false).await;
    assert_eq!(page.pagination.total_items, 100);
    // Newest first; the oldest entry (n0) was evicted.
    assert_eq!(page.notifications[0].message, "n100");
    assert!(page.notifications.iter().all(|n| n.message != "n0"));
}

#[tokio::test]
async fn mark_all_read_is_isolated_per_user() {
    let hub = NotificationHub::new(100);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for _ in 0..3 {
        hub.publish(alice, sample(NotificationKind::FoodLiked, "like"))
            .await;
        hub.publish(bob, sample(NotificationKind::FoodLiked, "like"))
            .await;
    }

    let remaining = hub.mark_read(alice, None).await;
    assert_eq!(remaining, 0);
    assert_eq!(hub.list(alice, 1, 20, false).await.unread_count, 0);
    assert_eq!(hub.list(bob, 1, 20, false).await.unread_count, 3);
}

#[tokio::test]
async fn mark_specific_ids_read() {
    let hub = NotificationHub::new(100);
    let user = Uuid::new_v4();

    hub.publish(user, sample(NotificationKind::FoodLiked, "a")).await;
    hub.publish(user, sample(NotificationKind::FoodLiked, "b")).await;

    let page = hub.list(user, 1, 20, false).await;
    let target = page.notifications[0].id;
    let remaining = hub.mark_read(user, Some(&[target])).await;
    assert_eq!(remaining, 1);

    let unread = hub.list(user, 1, 20, true).await;
    assert_eq!(unread.notifications.len(), 1);
    assert_ne!(unread.notifications[0].id, target);
}

#[tokio::test]
async fn delete_removes_one_entry() {
    let hub = NotificationHub::new(100);
    let user = Uuid::new_v4();

    hub.publish(user, sample(NotificationKind::NewFollower, "a")).await;
    hub.publish(user, sample(NotificationKind::NewFollower, "b")).await;

    let page = hub.list(user, 1, 20, false).await;
    let target = page.notifications[0].id;
    hub.delete(user, target).await.unwrap();
    assert_eq!(hub.list(user, 1, 20, false).await.pagination.total_items, 1);

    let err = hub.delete(user, target).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn stats_group_by_type() {
    let hub = NotificationHub::new(100);
    let user = Uuid::new_v4();

    hub.publish(user, sample(NotificationKind::FoodLiked, "l")).await;
    hub.publish(user, sample(NotificationKind::FoodLiked, "l")).await;
    hub.publish(user, sample(NotificationKind::NewFollower, "f")).await;
    hub.mark_read(user, None).await;
    hub.publish(user, sample(NotificationKind::FoodCommented, "c")).await;

    let stats = hub.stats(user).await;
    assert_eq!(stats.total, 4);
    assert_eq!(stats.unread, 1);
    assert_eq!(stats.by_type.get("food_liked"), Some(&2));
    assert_eq!(stats.by_type.get("new_follower"), Some(&1));
    assert_eq!(stats.by_type.get("food_commented"), Some(&1));
}

#[tokio::test]
async fn live_listener_receives_push_and_inbox_keeps_copy() {
    let hub = NotificationHub::new(100);
    let user = Uuid::new_v4();

    let mut rx = hub.subscribe(user).await;
    hub.publish(user, sample(NotificationKind::NewFoodPost, "live"))
        .await;

    let delivered = rx.recv().await.unwrap();
    assert_eq!(delivered.message, "live");
    assert_eq!(hub.list(user, 1, 20, false).await.pagination.total_items, 1);
}

#[tokio::test]
async fn new_post_fans_out_to_followers_only() {
    let app = spawn().await;
    let state = &app.state;
    let follower = create_user(state, "Follower", "follower@example.com").await;
    let bystander = create_user(state, "Bystander", "bystander@example.com").await;
    let partner = create_partner(state, "Fanout Foods", "fanout@example.com").await;

    state.social.follow(follower.id, partner.id).await.unwrap();
    // Consume the new_follower notification sent to the partner.
    state.hub.mark_read(partner.id, None).await;

    create_food(state, partner.id, "Broadcast Bowl", |_| {}).await;

    let inbox = state.hub.list(follower.id, 1, 20, false).await;
    assert_eq!(inbox.pagination.total_items, 1);
    let n = &inbox.notifications[0];
    assert_eq!(n.kind, NotificationKind::NewFoodPost);
    assert!(n.message.contains("Fanout Foods"));
    assert!(n.message.contains("Broadcast Bowl"));

    let empty = state.hub.list(bystander.id, 1, 20, false).await;
    assert_eq!(empty.pagination.total_items, 0);
}

#[tokio::test]
async fn follow_notifies_partner() {
    let app = spawn().await;
    let state = &app.state;
    let user = create_user(state, "Keen Fan", "fan@example.com").await;
    let partner = create_partner(state, "Popular Pot", "popular@example.com").await;

    state.social.follow(user.id, partner.id).await.unwrap();

    let inbox = state.hub.list(partner.id, 1, 20, false).await;
    assert_eq!(inbox.pagination.total_items, 1);
    assert_eq!(inbox.notifications[0].kind, NotificationKind::NewFollower);
    assert!(inbox.notifications[0].message.contains("Keen Fan"));
}

#[tokio::test]
async fn like_notifies_owning_partner() {
    let app = spawn().await;
    let state = &app.state;
    let user = create_user(state, "Liker", "liker@example.com").await;
    let partner = create_partner(state, "Liked Kitchen", "liked@example.com").await;
    let food = create_food(state, partner.id, "Tasty", |_| {}).await;

    state.foods.toggle_like(user.id, food.id).await.unwrap();

    let inbox = state.hub.list(partner.id, 1, 20, false).await;
    assert_eq!(inbox.pagination.total_items, 1);
    assert_eq!(inbox.notifications[0].kind, NotificationKind::FoodLiked);
    assert!(inbox.notifications[0].message.contains("Liker"));
}

#[tokio::test]
async fn comment_notification_truncates_long_text() {
    let app = spawn().await;
    let state = &app.state;
    let user = create_user(state, "Chatty", "chatty@example.com").await;
    let partner = create_partner(state, "Comment Cafe", "cafe@example.com").await;
    let food = create_food(state, partner.id, "Discussed Dish", |_| {}).await;

    let long_text = "y".repeat(80);
    state
        .comments
        .create(
            user.id,
            reeldine::comments::CreateCommentRequest {
                food_id: food.id,
                text: long_text,
            },
        )
        .await
        .unwrap();

    let inbox = state.hub.list(partner.id, 1, 20, false).await;
    assert_eq!(inbox.pagination.total_items, 1);
    let n = &inbox.notifications[0];
    assert_eq!(n.kind, NotificationKind::FoodCommented);
    let preview = n.data["commentText"].as_str().unwrap();
    assert_eq!(preview.chars().count(), 53);
    assert!(preview.ends_with("..."));
}
