// Lenient request-parameter parsing for the search surface.
//
// Every filter arrives as an optional raw string; a value that fails to
// parse means "filter absent", never a validation error. The raw structs
// are also the cache-key material, so any parameter change produces a
// distinct cache entry.

use serde::{Deserialize, Serialize};

pub const DEFAULT_RADIUS_KM: f64 = 10.0;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodSearchParams {
    pub q: Option<String>,
    pub cuisine: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    #[serde(rename = "priceRange")]
    pub price_range: Option<String>,
    pub rating: Option<String>,
    pub ingredients: Option<String>,
    #[serde(rename = "dietaryRestrictions")]
    pub dietary_restrictions: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerSearchParams {
    pub q: Option<String>,
    pub cuisine: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub rating: Option<String>,
    #[serde(rename = "isVerified")]
    pub is_verified: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionParams {
    pub q: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Oldest,
    Rating,
    PriceLow,
    PriceHigh,
    Trending,
    Distance,
    Relevance,
}

impl SortKey {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("newest") => SortKey::Newest,
            Some("oldest") => SortKey::Oldest,
            Some("rating") => SortKey::Rating,
            Some("price_low") => SortKey::PriceLow,
            Some("price_high") => SortKey::PriceHigh,
            Some("trending") => SortKey::Trending,
            Some("distance") => SortKey::Distance,
            _ => SortKey::Relevance,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GeoFilter {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PriceRange {
    pub min: f64,
    pub max: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FoodSearchPlan {
    pub text: Option<String>,
    pub cuisines: Vec<String>,
    pub geo: Option<GeoFilter>,
    pub price: Option<PriceRange>,
    pub min_rating: Option<f64>,
    pub ingredients: Vec<String>,
    pub dietary: Vec<String>,
    pub sort: SortKey,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone)]
pub struct PartnerSearchPlan {
    pub text: Option<String>,
    pub cuisines: Vec<String>,
    pub geo: Option<GeoFilter>,
    pub min_rating: Option<f64>,
    pub verified: Option<bool>,
    pub page: u32,
    pub limit: u32,
}

fn parse_f64(raw: &Option<String>) -> Option<f64> {
    raw.as_ref().and_then(|s| s.trim().parse::<f64>().ok())
}

fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn csv(raw: &Option<String>) -> Vec<String> {
    raw.as_ref()
        .map(|s| {
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_geo(
    lat: &Option<String>,
    lng: &Option<String>,
    radius: &Option<String>,
) -> Option<GeoFilter> {
    let lat = parse_f64(lat)?;
    let lng = parse_f64(lng)?;
    Some(GeoFilter {
        lat,
        lng,
        radius_km: parse_f64(radius).unwrap_or(DEFAULT_RADIUS_KM),
    })
}

fn parse_price_range(raw: &Option<String>) -> Option<PriceRange> {
    let raw = non_empty(raw)?;
    let mut parts = raw.splitn(2, '-');
    let min = parts.next()?.trim().parse::<f64>().ok()?;
    let max = parts.next().and_then(|p| p.trim().parse::<f64>().ok());
    Some(PriceRange { min, max })
}

fn parse_page(raw: &Option<String>) -> u32 {
    raw.as_ref()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

fn parse_limit(raw: &Option<String>) -> u32 {
    raw.as_ref()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|l| *l >= 1)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE)
}

impl FoodSearchParams {
    pub fn plan(&self) -> FoodSearchPlan {
        let geo = parse_geo(&self.lat, &self.lng, &self.radius);
        let mut sort = SortKey::parse(self.sort_by.as_deref());
        // Distance ordering needs a center; without one it degrades to the
        // same creation-time order the primary query would use anyway.
        if sort == SortKey::Distance && geo.is_none() {
            sort = SortKey::Newest;
        }
        FoodSearchPlan {
            text: non_empty(&self.q),
            cuisines: csv(&self.cuisine),
            geo,
            price: parse_price_range(&self.price_range),
            min_rating: parse_f64(&self.rating),
            ingredients: csv(&self.ingredients),
            dietary: csv(&self.dietary_restrictions),
            sort,
            page: parse_page(&self.page),
            limit: parse_limit(&self.limit),
        }
    }
}

impl PartnerSearchParams {
    pub fn plan(&self) -> PartnerSearchPlan {
        PartnerSearchPlan {
            text: non_empty(&self.q),
            cuisines: csv(&self.cuisine),
            geo: parse_geo(&self.lat, &self.lng, &self.radius),
            min_rating: parse_f64(&self.rating),
            verified: self.is_verified.as_ref().map(|v| v == "true"),
            page: parse_page(&self.page),
            limit: parse_limit(&self.limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(overrides: impl FnOnce(&mut FoodSearchParams)) -> FoodSearchPlan {
        let mut p = FoodSearchParams::default();
        overrides(&mut p);
        p.plan()
    }

    #[test]
    fn malformed_numbers_drop_the_filter() {
        let plan = params(|p| {
            p.rating = Some("not-a-number".to_string());
            p.lat = Some("abc".to_string());
            p.lng = Some("12.5".to_string());
            p.price_range = Some("cheap".to_string());
        });
        assert!(plan.min_rating.is_none());
        assert!(plan.geo.is_none());
        assert!(plan.price.is_none());
    }

    #[test]
    fn price_range_forms() {
        let both = params(|p| p.price_range = Some("10-50".to_string()));
        let price = both.price.unwrap();
        assert_eq!(price.min, 10.0);
        assert_eq!(price.max, Some(50.0));

        let floor = params(|p| p.price_range = Some("10".to_string()));
        let price = floor.price.unwrap();
        assert_eq!(price.min, 10.0);
        assert!(price.max.is_none());
    }

    #[test]
    fn geo_requires_both_coordinates_and_defaults_radius() {
        let plan = params(|p| {
            p.lat = Some("48.85".to_string());
            p.lng = Some("2.35".to_string());
        });
        let geo = plan.geo.unwrap();
        assert_eq!(geo.radius_km, DEFAULT_RADIUS_KM);

        let missing = params(|p| p.lat = Some("48.85".to_string()));
        assert!(missing.geo.is_none());
    }

    #[test]
    fn sort_key_fallbacks() {
        let unknown = params(|p| p.sort_by = Some("spicy".to_string()));
        assert_eq!(unknown.sort, SortKey::Relevance);

        let distance_without_geo = params(|p| p.sort_by = Some("distance".to_string()));
        assert_eq!(distance_without_geo.sort, SortKey::Newest);

        let distance_with_geo = params(|p| {
            p.sort_by = Some("distance".to_string());
            p.lat = Some("0".to_string());
            p.lng = Some("0".to_string());
        });
        assert_eq!(distance_with_geo.sort, SortKey::Distance);
    }

    #[test]
    fn paging_defaults_and_caps() {
        let plan = params(|p| {
            p.page = Some("0".to_string());
            p.limit = Some("5000".to_string());
        });
        assert_eq!(plan.page, 1);
        assert_eq!(plan.limit, MAX_PAGE_SIZE);

        let defaults = params(|_| {});
        assert_eq!(defaults.page, 1);
        assert_eq!(defaults.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn csv_lists_trim_and_skip_empties() {
        let plan = params(|p| p.cuisine = Some("Italian, Thai,,  Mexican ".to_string()));
        assert_eq!(plan.cuisines, vec!["Italian", "Thai", "Mexican"]);
    }
}
