mod common;

use common::*;
use reeldine::comments::{CreateCommentRequest, UpdateCommentRequest};
use reeldine::error::AppError;

#[tokio::test]
async fn create_and_delete_maintain_partner_video_count() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Counter Cafe", "counter@example.com").await;

    let food = create_food(state, partner.id, "Counted Dish", |_| {}).await;
    let after_create = state.accounts.get_partner(partner.id).await.unwrap();
    assert_eq!(after_create.total_videos, 1);

    state.foods.delete(partner.id, food.id).await.unwrap();
    let after_delete = state.accounts.get_partner(partner.id).await.unwrap();
    assert_eq!(after_delete.total_videos, 0);

    let err = state.foods.get(food.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn delete_requires_ownership() {
    let app = spawn().await;
    let state = &app.state;
    let owner = create_partner(state, "Owner", "owner@example.com").await;
    let other = create_partner(state, "Other", "other@example.com").await;
    let food = create_food(state, owner.id, "Guarded Dish", |_| {}).await;

    let err = state.foods.delete(other.id, food.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(state.foods.get(food.id).await.is_ok());
}

#[tokio::test]
async fn like_toggle_round_trips() {
    let app = spawn().await;
    let state = &app.state;
    let user = create_user(state, "Ada", "ada@example.com").await;
    let partner = create_partner(state, "Toggle Tavern", "toggle@example.com").await;
    let food = create_food(state, partner.id, "Toggled Dish", |_| {}).await;

    let liked = state.foods.toggle_like(user.id, food.id).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.like_count, 1);

    let unliked = state.foods.toggle_like(user.id, food.id).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.like_count, 0);
}

#[tokio::test]
async fn save_toggle_and_saved_listing() {
    let app = spawn().await;
    let state = &app.state;
    let user = create_user(state, "Ada", "ada@example.com").await;
    let partner = create_partner(state, "Save Shack", "save@example.com").await;
    let keeper = create_food(state, partner.id, "Keeper", |_| {}).await;
    create_food(state, partner.id, "Skipped", |_| {}).await;

    let saved = state.foods.toggle_save(user.id, keeper.id).await.unwrap();
    assert!(saved.saved);
    assert_eq!(saved.saves_count, 1);

    let listing = state.foods.saved(user.id, 1, 20).await.unwrap();
    assert_eq!(listing.pagination.total_items, 1);
    assert_eq!(listing.foods[0].name, "Keeper");

    let unsaved = state.foods.toggle_save(user.id, keeper.id).await.unwrap();
    assert!(!unsaved.saved);
    let listing = state.foods.saved(user.id, 1, 20).await.unwrap();
    assert_eq!(listing.pagination.total_items, 0);
}

#[tokio::test]
async fn views_increment() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "View Venue", "views@example.com").await;
    let food = create_food(state, partner.id, "Watched Dish", |_| {}).await;

    assert_eq!(state.foods.record_view(food.id).await.unwrap(), 1);
    assert_eq!(state.foods.record_view(food.id).await.unwrap(), 2);

    let reloaded = state.foods.get(food.id).await.unwrap();
    assert_eq!(reloaded.view_count, 2);
    assert!((reloaded.engagement_score - 0.2).abs() < 1e-9);
}

#[tokio::test]
async fn create_food_validation() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Strict Stove", "strict@example.com").await;

    let mut nameless = food_request("ok");
    nameless.name = "  ".to_string();
    let err = state.foods.create(partner.id, nameless).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut marathon = food_request("Slow Roast");
    marathon.cooking_time = Some(900);
    let err = state.foods.create(partner.id, marathon).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut banquet = food_request("Banquet");
    banquet.servings = Some(200);
    let err = state.foods.create(partner.id, banquet).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn comments_maintain_food_counter() {
    let app = spawn().await;
    let state = &app.state;
    let user = create_user(state, "Ada", "ada@example.com").await;
    let partner = create_partner(state, "Comment Corner", "comments@example.com").await;
    let food = create_food(state, partner.id, "Discussed", |_| {}).await;

    let comment = state
        .comments
        .create(
            user.id,
            CreateCommentRequest {
                food_id: food.id,
                text: "Looks delicious".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(comment.user_name.as_deref(), Some("Ada"));
    assert_eq!(state.foods.get(food.id).await.unwrap().comments_count, 1);

    let listing = state.comments.for_food(food.id, 1, 20).await.unwrap();
    assert_eq!(listing.pagination.total_items, 1);
    assert_eq!(listing.comments[0].text, "Looks delicious");

    state.comments.delete(user.id, comment.id).await.unwrap();
    assert_eq!(state.foods.get(food.id).await.unwrap().comments_count, 0);
}

#[tokio::test]
async fn comment_update_is_owner_scoped() {
    let app = spawn().await;
    let state = &app.state;
    let author = create_user(state, "Author", "author@example.com").await;
    let stranger = create_user(state, "Stranger", "stranger@example.com").await;
    let partner = create_partner(state, "Edit Eatery", "edit@example.com").await;
    let food = create_food(state, partner.id, "Edited Dish", |_| {}).await;

    let comment = state
        .comments
        .create(
            author.id,
            CreateCommentRequest {
                food_id: food.id,
                text: "first draft".to_string(),
            },
        )
        .await
        .unwrap();

    let err = state
        .comments
        .update(
            stranger.id,
            comment.id,
            UpdateCommentRequest {
                text: "hijacked".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let updated = state
        .comments
        .update(
            author.id,
            comment.id,
            UpdateCommentRequest {
                text: "second draft".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.text, "second draft");
}

#[tokio::test]
async fn comment_like_toggle_is_deduplicated() {
    let app = spawn().await;
    let state = &app.state;
    let author = create_user(state, "Author", "author@example.com").await;
    let fan = create_user(state, "Fan", "fan@example.com").await;
    let partner = create_partner(state, "Like Lounge", "likes@example.com").await;
    let food = create_food(state, partner.id, "Liked Dish", |_| {}).await;

    let comment = state
        .comments
        .create(
            author.id,
            CreateCommentRequest {
                food_id: food.id,
                text: "so good".to_string(),
            },
        )
        .await
        .unwrap();

    let liked = state.comments.toggle_like(fan.id, comment.id).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.like_count, 1);

    let unliked = state.comments.toggle_like(fan.id, comment.id).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.like_count, 0);
}

#[tokio::test]
async fn comment_text_length_is_bounded() {
    let app = spawn().await;
    let state = &app.state;
    let user = create_user(state, "Ada", "ada@example.com").await;
    let partner = create_partner(state, "Bound Bistro", "bound@example.com").await;
    let food = create_food(state, partner.id, "Bounded Dish", |_| {}).await;

    let err = state
        .comments
        .create(
            user.id,
            CreateCommentRequest {
                food_id: food.id,
                text: "z".repeat(501),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = spawn().await;
    let state = &app.state;
    create_user(state, "First", "same@example.com").await;

    let err = state
        .accounts
        .create_user(reeldine::accounts::CreateUserRequest {
            full_name: "Second".to_string(),
            email: "same@example.com".to_string(),
            avatar: None,
            bio: String::new(),
            location: String::new(),
            preferences: Default::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
