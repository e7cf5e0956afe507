// Search/filter engine: translates flat query parameters into a filter +
// sort + pagination plan over the food and partner collections, with a
// cache-aside layer in front of the expensive aggregate queries.

pub mod params;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::Sqlite;
use sqlx::{QueryBuilder, Row};
use std::sync::Arc;

use crate::cache::QueryCache;
use crate::database::Database;
use crate::error::AppResult;
use crate::geo::{bounding_box, haversine_km};
use crate::models::food::ENGAGEMENT_SCORE_SQL;
use crate::models::{Food, FoodPartner, Pagination};

pub use params::{
    FoodSearchParams, FoodSearchPlan, GeoFilter, PartnerSearchParams, PartnerSearchPlan,
    SortKey, SuggestionParams, DEFAULT_RADIUS_KM,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct FoodSearchResult {
    pub foods: Vec<Food>,
    pub pagination: Pagination,
    pub filters: FiltersEcho,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PartnerSearchResult {
    pub partners: Vec<FoodPartner>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FiltersEcho {
    pub applied: AppliedFilters,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub query: Option<String>,
    pub cuisine: Option<String>,
    pub price_range: Option<String>,
    pub rating: Option<String>,
    pub ingredients: Option<String>,
    pub dietary_restrictions: Option<String>,
    /// `[longitude, latitude]` when a geographic filter was active.
    pub coordinates: Option<[f64; 2]>,
    pub radius: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionList {
    pub suggestions: Vec<Suggestion>,
}

/// Escape LIKE wildcards so user text matches literally (paired with
/// `ESCAPE '\'` in the SQL).
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn like_contains(raw: &str) -> String {
    format!("%{}%", escape_like(raw))
}

fn like_prefix(raw: &str) -> String {
    format!("{}%", escape_like(raw))
}

fn food_order_clause(sort: SortKey) -> String {
    match sort {
        SortKey::Newest => " ORDER BY f.created_at DESC".to_string(),
        SortKey::Oldest => " ORDER BY f.created_at ASC".to_string(),
        SortKey::Rating => " ORDER BY f.average_rating DESC".to_string(),
        SortKey::PriceLow => " ORDER BY f.price ASC".to_string(),
        SortKey::PriceHigh => " ORDER BY f.price DESC".to_string(),
        SortKey::Trending => format!(" ORDER BY {} DESC", ENGAGEMENT_SCORE_SQL),
        // Distance re-sorts the returned page after the fact; the primary
        // query keeps creation-time order.
        SortKey::Distance => " ORDER BY f.created_at DESC".to_string(),
        SortKey::Relevance => {
            format!(" ORDER BY {} DESC, f.created_at DESC", ENGAGEMENT_SCORE_SQL)
        }
    }
}

fn push_food_filters(qb: &mut QueryBuilder<'_, Sqlite>, plan: &FoodSearchPlan) {
    qb.push(" WHERE f.is_active = 1");

    if let Some(text) = &plan.text {
        let pattern = like_contains(text);
        qb.push(" AND (f.name LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR f.description LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR EXISTS (SELECT 1 FROM json_each(f.tags) je WHERE je.value LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\'))");
    }

    if !plan.cuisines.is_empty() {
        qb.push(" AND f.cuisine IN (");
        let mut separated = qb.separated(", ");
        for cuisine in &plan.cuisines {
            separated.push_bind(cuisine.clone());
        }
        qb.push(")");
    }

    if let Some(geo) = &plan.geo {
        let (min_lat, max_lat, min_lng, max_lng) = bounding_box(geo.lat, geo.lng, geo.radius_km);
        qb.push(" AND f.lat BETWEEN ");
        qb.push_bind(min_lat);
        qb.push(" AND ");
        qb.push_bind(max_lat);
        qb.push(" AND f.lng BETWEEN ");
        qb.push_bind(min_lng);
        qb.push(" AND ");
        qb.push_bind(max_lng);
    }

    if let Some(price) = &plan.price {
        qb.push(" AND f.price >= ");
        qb.push_bind(price.min);
        if let Some(max) = price.max {
            qb.push(" AND f.price <= ");
            qb.push_bind(max);
        }
    }

    if let Some(min_rating) = plan.min_rating {
        qb.push(" AND f.average_rating >= ");
        qb.push_bind(min_rating);
    }

    if !plan.ingredients.is_empty() {
        qb.push(" AND EXISTS (SELECT 1 FROM json_each(f.ingredients) ji WHERE ");
        for (i, ingredient) in plan.ingredients.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push("json_extract(ji.value, '$.name') LIKE ");
            qb.push_bind(like_contains(ingredient));
            qb.push(" ESCAPE '\\'");
        }
        qb.push(")");
    }

    if !plan.dietary.is_empty() {
        qb.push(" AND EXISTS (SELECT 1 FROM json_each(f.dietary_info) jd WHERE jd.value IN (");
        let mut separated = qb.separated(", ");
        for tag in &plan.dietary {
            separated.push_bind(tag.clone());
        }
        qb.push("))");
    }
}

fn push_partner_filters(qb: &mut QueryBuilder<'_, Sqlite>, plan: &PartnerSearchPlan) {
    qb.push(" WHERE p.is_active = 1");

    if let Some(text) = &plan.text {
        let pattern = like_contains(text);
        qb.push(" AND (p.name LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR p.description LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR p.address LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }

    if !plan.cuisines.is_empty() {
        qb.push(" AND EXISTS (SELECT 1 FROM json_each(p.cuisine) jc WHERE jc.value IN (");
        let mut separated = qb.separated(", ");
        for cuisine in &plan.cuisines {
            separated.push_bind(cuisine.clone());
        }
        qb.push("))");
    }

    if let Some(geo) = &plan.geo {
        let (min_lat, max_lat, min_lng, max_lng) = bounding_box(geo.lat, geo.lng, geo.radius_km);
        qb.push(" AND p.lat BETWEEN ");
        qb.push_bind(min_lat);
        qb.push(" AND ");
        qb.push_bind(max_lat);
        qb.push(" AND p.lng BETWEEN ");
        qb.push_bind(min_lng);
        qb.push(" AND ");
        qb.push_bind(max_lng);
    }

    if let Some(min_rating) = plan.min_rating {
        qb.push(" AND p.rating >= ");
        qb.push_bind(min_rating);
    }

    if let Some(verified) = plan.verified {
        qb.push(" AND p.is_verified = ");
        qb.push_bind(verified);
    }
}

#[derive(Clone)]
pub struct SearchService {
    db: Arc<Database>,
    cache: QueryCache,
}

impl SearchService {
    pub fn new(db: Arc<Database>, cache: QueryCache) -> Self {
        Self { db, cache }
    }

    /// Food search. Returns the result page and whether it came from cache.
    pub async fn search_foods(
        &self,
        params: FoodSearchParams,
    ) -> AppResult<(FoodSearchResult, bool)> {
        let key = QueryCache::key("search", &params)?;
        if let Some(hit) = self.cache.get(&key).await {
            if let Ok(result) = serde_json::from_value::<FoodSearchResult>(hit) {
                return Ok((result, true));
            }
        }

        let plan = params.plan();
        let (foods, total) = self.run_food_query(&plan).await?;

        let result = FoodSearchResult {
            foods,
            pagination: Pagination::new(plan.page, plan.limit, total),
            filters: FiltersEcho {
                applied: AppliedFilters {
                    query: params.q.clone(),
                    cuisine: params.cuisine.clone(),
                    price_range: params.price_range.clone(),
                    rating: params.rating.clone(),
                    ingredients: params.ingredients.clone(),
                    dietary_restrictions: params.dietary_restrictions.clone(),
                    coordinates: plan.geo.map(|g| [g.lng, g.lat]),
                    radius: plan.geo.map(|g| g.radius_km).unwrap_or(DEFAULT_RADIUS_KM),
                },
            },
        };

        self.cache.put(&key, serde_json::to_value(&result)?).await;
        Ok((result, false))
    }

    async fn run_food_query(&self, plan: &FoodSearchPlan) -> AppResult<(Vec<Food>, u64)> {
        if let Some(geo) = plan.geo {
            return self.run_food_geo_query(plan, geo).await;
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT f.* FROM foods f");
        push_food_filters(&mut qb, plan);
        qb.push(&food_order_clause(plan.sort));
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(plan.limit));
        qb.push(" OFFSET ");
        qb.push_bind(Pagination::offset(plan.page, plan.limit));

        let rows = qb.build().fetch_all(self.db.pool()).await?;
        let foods = rows.iter().map(Food::from_row).collect::<AppResult<Vec<_>>>()?;

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS total FROM foods f");
        push_food_filters(&mut count_qb, plan);
        let total: i64 = count_qb
            .build()
            .fetch_one(self.db.pool())
            .await?
            .try_get("total")?;

        Ok((foods, total as u64))
    }

    /// Geo path: indexed bounding-box prefilter in SQL, exact haversine
    /// filter here. Counting and pagination happen after the exact filter
    /// so the metadata reflects the true circle.
    async fn run_food_geo_query(
        &self,
        plan: &FoodSearchPlan,
        geo: GeoFilter,
    ) -> AppResult<(Vec<Food>, u64)> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT f.* FROM foods f");
        push_food_filters(&mut qb, plan);
        qb.push(&food_order_clause(plan.sort));

        let rows = qb.build().fetch_all(self.db.pool()).await?;
        let candidates = rows.iter().map(Food::from_row).collect::<AppResult<Vec<_>>>()?;

        let in_radius: Vec<Food> = candidates
            .into_iter()
            .filter(|food| {
                haversine_km(geo.lat, geo.lng, food.location.lat(), food.location.lng())
                    <= geo.radius_km
            })
            .collect();

        let total = in_radius.len() as u64;
        let start = Pagination::offset(plan.page, plan.limit) as usize;
        let mut page: Vec<Food> = in_radius
            .into_iter()
            .skip(start)
            .take(plan.limit as usize)
            .collect();

        if plan.sort == SortKey::Distance {
            // The page boundary is decided before the distance re-sort;
            // only the rows of the current page are reordered.
            for food in &mut page {
                food.distance_km = Some(haversine_km(
                    geo.lat,
                    geo.lng,
                    food.location.lat(),
                    food.location.lng(),
                ));
            }
            page.sort_by(|a, b| {
                let da = a.distance_km.unwrap_or(f64::INFINITY);
                let db = b.distance_km.unwrap_or(f64::INFINITY);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        Ok((page, total))
    }

    /// Partner search; fixed rating-then-followers ordering.
    pub async fn search_partners(
        &self,
        params: PartnerSearchParams,
    ) -> AppResult<(PartnerSearchResult, bool)> {
        let key = QueryCache::key("partners", &params)?;
        if let Some(hit) = self.cache.get(&key).await {
            if let Ok(result) = serde_json::from_value::<PartnerSearchResult>(hit) {
                return Ok((result, true));
            }
        }

        let plan = params.plan();
        let (partners, total) = self.run_partner_query(&plan).await?;

        let result = PartnerSearchResult {
            partners,
            pagination: Pagination::new(plan.page, plan.limit, total),
        };

        self.cache.put(&key, serde_json::to_value(&result)?).await;
        Ok((result, false))
    }

    async fn run_partner_query(
        &self,
        plan: &PartnerSearchPlan,
    ) -> AppResult<(Vec<FoodPartner>, u64)> {
        const ORDER: &str = " ORDER BY p.rating DESC, p.followers_count DESC";

        if let Some(geo) = plan.geo {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT p.* FROM partners p");
            push_partner_filters(&mut qb, plan);
            qb.push(ORDER);

            let rows = qb.build().fetch_all(self.db.pool()).await?;
            let candidates = rows
                .iter()
                .map(FoodPartner::from_row)
                .collect::<AppResult<Vec<_>>>()?;

            let in_radius: Vec<FoodPartner> = candidates
                .into_iter()
                .filter(|p| {
                    haversine_km(geo.lat, geo.lng, p.location.lat(), p.location.lng())
                        <= geo.radius_km
                })
                .collect();

            let total = in_radius.len() as u64;
            let start = Pagination::offset(plan.page, plan.limit) as usize;
            let page = in_radius
                .into_iter()
                .skip(start)
                .take(plan.limit as usize)
                .collect();
            return Ok((page, total));
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT p.* FROM partners p");
        push_partner_filters(&mut qb, plan);
        qb.push(ORDER);
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(plan.limit));
        qb.push(" OFFSET ");
        qb.push_bind(Pagination::offset(plan.page, plan.limit));

        let rows = qb.build().fetch_all(self.db.pool()).await?;
        let partners = rows
            .iter()
            .map(FoodPartner::from_row)
            .collect::<AppResult<Vec<_>>>()?;

        let mut count_qb =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS total FROM partners p");
        push_partner_filters(&mut count_qb, plan);
        let total: i64 = count_qb
            .build()
            .fetch_one(self.db.pool())
            .await?
            .try_get("total")?;

        Ok((partners, total as u64))
    }

    /// Prefix suggestions across food names/tags, partner names, and the
    /// most frequent matching tags.
    pub async fn suggestions(&self, params: SuggestionParams) -> AppResult<SuggestionList> {
        let query = params
            .q
            .as_ref()
            .map(|q| q.trim().to_string())
            .unwrap_or_default();
        if query.chars().count() < 2 {
            return Ok(SuggestionList {
                suggestions: Vec::new(),
            });
        }

        let kind = params.kind.as_deref().unwrap_or("all");
        let prefix = like_prefix(&query);
        let mut suggestions = Vec::new();

        if kind == "all" || kind == "foods" {
            let rows = sqlx::query(
                "SELECT name, tags, cuisine FROM foods
                 WHERE is_active = 1 AND (name LIKE ? ESCAPE '\\'
                    OR EXISTS (SELECT 1 FROM json_each(tags) je WHERE je.value LIKE ? ESCAPE '\\'))
                 LIMIT 5",
            )
            .bind(&prefix)
            .bind(&prefix)
            .fetch_all(self.db.pool())
            .await?;

            for row in rows {
                let tags: String = row.try_get("tags")?;
                suggestions.push(Suggestion {
                    kind: "food".to_string(),
                    text: row.try_get("name")?,
                    category: row.try_get("cuisine")?,
                    tags: Some(serde_json::from_str(&tags)?),
                });
            }
        }

        if kind == "all" || kind == "partners" {
            let rows = sqlx::query(
                "SELECT name, cuisine FROM partners
                 WHERE is_active = 1 AND name LIKE ? ESCAPE '\\'
                 LIMIT 5",
            )
            .bind(&prefix)
            .fetch_all(self.db.pool())
            .await?;

            for row in rows {
                let cuisine: String = row.try_get("cuisine")?;
                let cuisines: Vec<String> = serde_json::from_str(&cuisine)?;
                suggestions.push(Suggestion {
                    kind: "partner".to_string(),
                    text: row.try_get("name")?,
                    category: cuisines.join(", "),
                    tags: None,
                });
            }
        }

        if kind == "all" || kind == "tags" {
            let rows = sqlx::query(
                "SELECT je.value AS tag, COUNT(*) AS uses
                 FROM foods f, json_each(f.tags) je
                 WHERE f.is_active = 1 AND je.value LIKE ? ESCAPE '\\'
                 GROUP BY je.value
                 ORDER BY uses DESC
                 LIMIT 5",
            )
            .bind(&prefix)
            .fetch_all(self.db.pool())
            .await?;

            for row in rows {
                suggestions.push(Suggestion {
                    kind: "tag".to_string(),
                    text: row.try_get("tag")?,
                    category: "tag".to_string(),
                    tags: None,
                });
            }
        }

        Ok(SuggestionList { suggestions })
    }
}
