// Shared integration-test harness: an AppState over a temporary on-disk
// SQLite database, plus seeding helpers. Not every test binary uses every
// helper.
#![allow(dead_code)]

use reeldine::accounts::{CreatePartnerRequest, CreateUserRequest};
use reeldine::app_state::AppState;
use reeldine::config::{
    CacheConfig, Config, DatabaseConfig, NotificationConfig, ServerConfig,
};
use reeldine::foods::CreateFoodRequest;
use reeldine::models::{Food, FoodPartner, GeoPoint, Preferences, User};
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestApp {
    pub state: AppState,
    _dir: TempDir,
}

pub async fn spawn() -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("reeldine-test.db");
    let config = Config {
        database: DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        cache: CacheConfig {
            capacity: 64,
            search_ttl_secs: 300,
        },
        notifications: NotificationConfig {
            inbox_capacity: 100,
        },
    };
    let state = AppState::new(config).await.expect("app state");
    TestApp { state, _dir: dir }
}

pub async fn create_user(state: &AppState, name: &str, email: &str) -> User {
    state
        .accounts
        .create_user(CreateUserRequest {
            full_name: name.to_string(),
            email: email.to_string(),
            avatar: None,
            bio: String::new(),
            location: String::new(),
            preferences: Preferences::default(),
        })
        .await
        .expect("create user")
}

pub async fn create_partner_at(
    state: &AppState,
    name: &str,
    email: &str,
    lat: f64,
    lng: f64,
) -> FoodPartner {
    state
        .accounts
        .create_partner(CreatePartnerRequest {
            name: name.to_string(),
            contact_name: "Test Contact".to_string(),
            phone: "+1 555 0100".to_string(),
            address: "1 Test Street".to_string(),
            email: email.to_string(),
            logo: None,
            description: String::new(),
            cuisine: Vec::new(),
            location: Some(GeoPoint::new(lng, lat)),
            is_verified: false,
        })
        .await
        .expect("create partner")
}

pub async fn create_partner(state: &AppState, name: &str, email: &str) -> FoodPartner {
    create_partner_at(state, name, email, 0.0, 0.0).await
}

pub fn food_request(name: &str) -> CreateFoodRequest {
    CreateFoodRequest {
        name: name.to_string(),
        video: format!("videos/{}.mp4", name.to_lowercase().replace(' ', "-")),
        thumbnail: None,
        description: String::new(),
        ingredients: Vec::new(),
        cuisine: Default::default(),
        dietary_info: Vec::new(),
        difficulty: Default::default(),
        cooking_time: None,
        servings: None,
        nutritional_info: None,
        price: None,
        location: None,
        tags: Vec::new(),
    }
}

pub async fn create_food(
    state: &AppState,
    partner: Uuid,
    name: &str,
    customize: impl FnOnce(&mut CreateFoodRequest),
) -> Food {
    let mut request = food_request(name);
    customize(&mut request);
    state
        .foods
        .create(partner, request)
        .await
        .expect("create food")
}

/// Directly adjust engagement counters, bypassing the toggles, to shape
/// ranking scenarios.
pub async fn set_food_counters(
    state: &AppState,
    food: Uuid,
    likes: i64,
    saves: i64,
    comments: i64,
    views: i64,
) {
    sqlx::query(
        "UPDATE foods SET like_count = ?, saves_count = ?, comments_count = ?, view_count = ?
         WHERE id = ?",
    )
    .bind(likes)
    .bind(saves)
    .bind(comments)
    .bind(views)
    .bind(food)
    .execute(state.db.pool())
    .await
    .expect("set counters");
}
