// User and partner profile management. Credential issuance and session
// handling live with the external auth service; this layer owns only the
// profile records the rest of the platform references.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::{
    current_time_millis, Cuisine, FoodPartner, GeoPoint, Preferences, User,
};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9+\-\s()]+$").unwrap());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub full_name: String,
    pub email: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub preferences: Preferences,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartnerRequest {
    pub name: String,
    pub contact_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    pub logo: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cuisine: Vec<Cuisine>,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Clone)]
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<User> {
        if request.full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }
        if request.full_name.chars().count() > 50 {
            return Err(AppError::Validation(
                "Full name cannot exceed 50 characters".to_string(),
            ));
        }
        let email = request.email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(AppError::Validation(
                "Please enter a valid email".to_string(),
            ));
        }
        if request.bio.chars().count() > 200 {
            return Err(AppError::Validation(
                "Bio cannot exceed 200 characters".to_string(),
            ));
        }

        let now = current_time_millis();
        let user = User {
            id: Uuid::new_v4(),
            full_name: request.full_name.trim().to_string(),
            email,
            password_hash: None,
            avatar: request.avatar,
            bio: request.bio,
            location: request.location,
            preferences: request.preferences,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            "INSERT INTO users (id, full_name, email, password_hash, avatar, bio, location,
                                preferences, is_active, last_login, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, NULL, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(&user.bio)
        .bind(&user.location)
        .bind(serde_json::to_string(&user.preferences)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::Conflict(
                    "Account with this email already exists".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        info!("Created user {} ({})", user.full_name, user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        User::from_row(&row)
    }

    pub async fn create_partner(&self, request: CreatePartnerRequest) -> AppResult<FoodPartner> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Business name is required".to_string(),
            ));
        }
        if request.name.chars().count() > 100 {
            return Err(AppError::Validation(
                "Business name cannot exceed 100 characters".to_string(),
            ));
        }
        if request.contact_name.trim().is_empty() {
            return Err(AppError::Validation("Contact name is required".to_string()));
        }
        if !PHONE_RE.is_match(&request.phone) || request.phone.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter a valid phone number".to_string(),
            ));
        }
        if request.address.trim().is_empty() {
            return Err(AppError::Validation("Address is required".to_string()));
        }
        if request.address.chars().count() > 200 {
            return Err(AppError::Validation(
                "Address cannot exceed 200 characters".to_string(),
            ));
        }
        let email = request.email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(AppError::Validation(
                "Please enter a valid email".to_string(),
            ));
        }
        if request.description.chars().count() > 500 {
            return Err(AppError::Validation(
                "Description cannot exceed 500 characters".to_string(),
            ));
        }

        let now = current_time_millis();
        let location = request.location.unwrap_or_default();
        let partner = FoodPartner {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            contact_name: request.contact_name.trim().to_string(),
            phone: request.phone,
            address: request.address,
            email,
            password_hash: None,
            logo: request.logo,
            description: request.description,
            cuisine: request.cuisine,
            location,
            rating: 0.0,
            total_reviews: 0,
            followers_count: 0,
            total_videos: 0,
            is_verified: request.is_verified,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            "INSERT INTO partners (id, name, contact_name, phone, address, email, password_hash,
                                   logo, description, cuisine, lat, lng, rating, total_reviews,
                                   followers_count, total_videos, is_verified, is_active,
                                   created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, 0, 0, ?, 1, ?, ?)",
        )
        .bind(partner.id)
        .bind(&partner.name)
        .bind(&partner.contact_name)
        .bind(&partner.phone)
        .bind(&partner.address)
        .bind(&partner.email)
        .bind(&partner.password_hash)
        .bind(&partner.logo)
        .bind(&partner.description)
        .bind(serde_json::to_string(&partner.cuisine)?)
        .bind(partner.location.lat())
        .bind(partner.location.lng())
        .bind(partner.is_verified)
        .bind(partner.created_at)
        .bind(partner.updated_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::Conflict(
                    "Account with this email already exists".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        info!("Created partner {} ({})", partner.name, partner.id);
        Ok(partner)
    }

    pub async fn get_partner(&self, partner_id: Uuid) -> AppResult<FoodPartner> {
        let row = sqlx::query("SELECT * FROM partners WHERE id = ?")
            .bind(partner_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Food partner not found".to_string()))?;
        FoodPartner::from_row(&row)
    }
}
