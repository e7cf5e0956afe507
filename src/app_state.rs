use std::sync::Arc;
use std::time::Duration;

use crate::{
    accounts::AccountService,
    cache::{MemoryCacheStore, QueryCache},
    comments::CommentService,
    config::Config,
    database::Database,
    foods::FoodService,
    notifications::{NotificationHub, Notifier},
    search::SearchService,
    social::SocialService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
    pub accounts: AccountService,
    pub foods: FoodService,
    pub comments: CommentService,
    pub social: SocialService,
    pub search: SearchService,
    pub hub: Arc<NotificationHub>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let database = Database::new(&config.database.url, config.database.max_connections).await?;
        database.init().await?;
        let db = Arc::new(database);

        // Process-local fanout hub and the cache-aside layer
        let hub = Arc::new(NotificationHub::new(config.notifications.inbox_capacity));
        let notifier = Notifier::new(db.clone(), hub.clone());
        let store = Arc::new(MemoryCacheStore::new(config.cache.capacity));
        let cache = QueryCache::new(store, Duration::from_secs(config.cache.search_ttl_secs));

        Ok(Self {
            accounts: AccountService::new(db.clone()),
            foods: FoodService::new(db.clone(), notifier.clone()),
            comments: CommentService::new(db.clone(), notifier.clone()),
            social: SocialService::new(db.clone(), notifier),
            search: SearchService::new(db.clone(), cache),
            db,
            hub,
            config,
        })
    }
}
