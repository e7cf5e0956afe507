// Domain model types shared across services and the HTTP surface.

pub mod comment;
pub mod food;
pub mod partner;
pub mod user;

pub use comment::Comment;
pub use food::{engagement_score, Difficulty, Food, Ingredient, NutritionalInfo};
pub use partner::FoodPartner;
pub use user::{Preferences, User};

use serde::{Deserialize, Serialize};

/// Millisecond Unix timestamp, the storage representation for all times.
pub type Millis = i64;

pub fn current_time_millis() -> Millis {
    chrono::Utc::now().timestamp_millis()
}

/// GeoJSON point. Coordinates are always `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: GeoPointKind,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub enum GeoPointKind {
    #[default]
    Point,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            kind: GeoPointKind::Point,
            coordinates: [lng, lat],
        }
    }

    pub fn lng(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Cuisine taxonomy shared by foods, partners and user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Cuisine {
    Italian,
    Chinese,
    Indian,
    Mexican,
    Japanese,
    Thai,
    French,
    American,
    Mediterranean,
    #[default]
    Other,
}

impl Cuisine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cuisine::Italian => "Italian",
            Cuisine::Chinese => "Chinese",
            Cuisine::Indian => "Indian",
            Cuisine::Mexican => "Mexican",
            Cuisine::Japanese => "Japanese",
            Cuisine::Thai => "Thai",
            Cuisine::French => "French",
            Cuisine::American => "American",
            Cuisine::Mediterranean => "Mediterranean",
            Cuisine::Other => "Other",
        }
    }
}

impl std::str::FromStr for Cuisine {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Italian" => Ok(Cuisine::Italian),
            "Chinese" => Ok(Cuisine::Chinese),
            "Indian" => Ok(Cuisine::Indian),
            "Mexican" => Ok(Cuisine::Mexican),
            "Japanese" => Ok(Cuisine::Japanese),
            "Thai" => Ok(Cuisine::Thai),
            "French" => Ok(Cuisine::French),
            "American" => Ok(Cuisine::American),
            "Mediterranean" => Ok(Cuisine::Mediterranean),
            "Other" => Ok(Cuisine::Other),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Cuisine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dietary classification tags attached to food posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietaryTag {
    Vegetarian,
    Vegan,
    #[serde(rename = "Gluten-Free")]
    GlutenFree,
    #[serde(rename = "Dairy-Free")]
    DairyFree,
    #[serde(rename = "Nut-Free")]
    NutFree,
    #[serde(rename = "Low-Carb")]
    LowCarb,
    Keto,
    Halal,
    Kosher,
}

/// Page metadata common to every paginated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total_items.div_ceil(u64::from(limit)) as u32;
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Row offset for a 1-indexed page.
    pub fn offset(page: u32, limit: u32) -> i64 {
        i64::from(page.saturating_sub(1)) * i64::from(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_math_is_exact() {
        let p = Pagination::new(2, 20, 45);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);

        let last = Pagination::new(3, 20, 45);
        assert!(!last.has_next);

        let empty = Pagination::new(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn has_next_implies_items_beyond_page() {
        for total in [1u64, 19, 20, 21, 40, 41, 99] {
            for page in 1u32..=6 {
                let p = Pagination::new(page, 20, total);
                if p.has_next {
                    assert!(u64::from(page) * 20 < total + 20);
                    assert!(u64::from(page * 20 - 20) < total);
                }
            }
        }
    }

    #[test]
    fn geo_point_serializes_lng_lat_order() {
        let p = GeoPoint::new(2.35, 48.85);
        let v = serde_json::to_value(p).unwrap();
        assert_eq!(v["type"], "Point");
        assert_eq!(v["coordinates"][0], 2.35);
        assert_eq!(v["coordinates"][1], 48.85);
    }

    #[test]
    fn dietary_tag_names_round_trip() {
        let v = serde_json::to_value(DietaryTag::GlutenFree).unwrap();
        assert_eq!(v, "Gluten-Free");
        let t: DietaryTag = serde_json::from_value(v).unwrap();
        assert_eq!(t, DietaryTag::GlutenFree);
    }
}
