use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Async database handle with a SQLx connection pool.
///
/// All tables use UUID primary keys and millisecond Unix timestamps.
/// Counter columns (like/save/comment/view/follower/video counts) are only
/// ever mutated with single-statement atomic increments.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT,
                avatar TEXT,
                bio TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                preferences TEXT NOT NULL DEFAULT '{}',
                is_active INTEGER NOT NULL DEFAULT 1,
                last_login INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS partners (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                contact_name TEXT NOT NULL,
                phone TEXT NOT NULL,
                address TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT,
                logo TEXT,
                description TEXT NOT NULL DEFAULT '',
                cuisine TEXT NOT NULL DEFAULT '[]',
                lat REAL NOT NULL DEFAULT 0,
                lng REAL NOT NULL DEFAULT 0,
                rating REAL NOT NULL DEFAULT 0,
                total_reviews INTEGER NOT NULL DEFAULT 0,
                followers_count INTEGER NOT NULL DEFAULT 0,
                total_videos INTEGER NOT NULL DEFAULT 0,
                is_verified INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS foods (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                video TEXT NOT NULL,
                thumbnail TEXT,
                description TEXT NOT NULL DEFAULT '',
                ingredients TEXT NOT NULL DEFAULT '[]',
                cuisine TEXT NOT NULL DEFAULT 'Other',
                dietary_info TEXT NOT NULL DEFAULT '[]',
                difficulty TEXT NOT NULL DEFAULT 'Medium',
                cooking_time INTEGER,
                servings INTEGER NOT NULL DEFAULT 1,
                nutritional_info TEXT,
                price REAL,
                partner_id TEXT NOT NULL REFERENCES partners(id),
                lat REAL NOT NULL DEFAULT 0,
                lng REAL NOT NULL DEFAULT 0,
                tags TEXT NOT NULL DEFAULT '[]',
                like_count INTEGER NOT NULL DEFAULT 0,
                saves_count INTEGER NOT NULL DEFAULT 0,
                comments_count INTEGER NOT NULL DEFAULT 0,
                view_count INTEGER NOT NULL DEFAULT 0,
                average_rating REAL NOT NULL DEFAULT 0,
                total_ratings INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_featured INTEGER NOT NULL DEFAULT 0,
                featured_until INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // Follow edges: insertion order is the follow order, and this table
        // is the authoritative representation of the social graph.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS follows (
                user_id TEXT NOT NULL REFERENCES users(id),
                partner_id TEXT NOT NULL REFERENCES partners(id),
                created_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, partner_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS food_likes (
                user_id TEXT NOT NULL REFERENCES users(id),
                food_id TEXT NOT NULL REFERENCES foods(id),
                created_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, food_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS food_saves (
                user_id TEXT NOT NULL REFERENCES users(id),
                food_id TEXT NOT NULL REFERENCES foods(id),
                created_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, food_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id),
                food_id TEXT NOT NULL REFERENCES foods(id),
                text TEXT NOT NULL,
                like_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // Uniqueness at the storage layer; a violation means "already liked".
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS comment_likes (
                user_id TEXT NOT NULL REFERENCES users(id),
                comment_id TEXT NOT NULL REFERENCES comments(id),
                created_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, comment_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        // Performance indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_foods_partner ON foods(partner_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_foods_cuisine ON foods(cuisine)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_foods_created ON foods(created_at DESC)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_foods_geo ON foods(lat, lng)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_partners_geo ON partners(lat, lng)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_comments_food ON comments(food_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_follows_partner ON follows(partner_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_food_saves_user ON food_saves(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
