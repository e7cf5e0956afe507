mod common;

use common::*;
use reeldine::geo::haversine_km;
use reeldine::search::{FoodSearchParams, SuggestionParams};

fn params(overrides: impl FnOnce(&mut FoodSearchParams)) -> FoodSearchParams {
    let mut p = FoodSearchParams::default();
    overrides(&mut p);
    p
}

#[tokio::test]
async fn text_search_matches_name_and_tags() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Trattoria", "trattoria@example.com").await;

    create_food(state, partner.id, "Pasta Primavera", |_| {}).await;
    create_food(state, partner.id, "Rice Bowl", |_| {}).await;
    create_food(state, partner.id, "Mystery Dish", |f| {
        f.tags = vec!["pasta".to_string()];
    })
    .await;

    let (result, _) = state
        .search
        .search_foods(params(|p| p.q = Some("pasta".to_string())))
        .await
        .unwrap();

    let names: Vec<&str> = result.foods.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(result.pagination.total_items, 2);
    assert!(names.contains(&"Pasta Primavera"));
    assert!(names.contains(&"Mystery Dish"));
    assert!(!names.contains(&"Rice Bowl"));
}

#[tokio::test]
async fn radius_filter_returns_only_foods_within_radius() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Geo Kitchen", "geo@example.com").await;

    create_food(state, partner.id, "At Center", |f| {
        f.location = Some(reeldine::models::GeoPoint::new(0.0, 0.0));
    })
    .await;
    create_food(state, partner.id, "Nearby", |f| {
        f.location = Some(reeldine::models::GeoPoint::new(0.05, 0.0));
    })
    .await;
    create_food(state, partner.id, "Far Away", |f| {
        f.location = Some(reeldine::models::GeoPoint::new(1.0, 1.0));
    })
    .await;

    let (result, _) = state
        .search
        .search_foods(params(|p| {
            p.lat = Some("0".to_string());
            p.lng = Some("0".to_string());
            p.radius = Some("10".to_string());
        }))
        .await
        .unwrap();

    assert_eq!(result.pagination.total_items, 2);
    for food in &result.foods {
        let d = haversine_km(0.0, 0.0, food.location.lat(), food.location.lng());
        assert!(d <= 10.0, "{} is {}km away", food.name, d);
    }
    assert_eq!(result.filters.applied.coordinates, Some([0.0, 0.0]));
}

#[tokio::test]
async fn distance_sort_orders_nearest_first() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Distance Diner", "distance@example.com").await;

    // Seed farther point first so creation order disagrees with distance.
    create_food(state, partner.id, "Two Degrees", |f| {
        f.location = Some(reeldine::models::GeoPoint::new(2.0, 0.0));
    })
    .await;
    create_food(state, partner.id, "One Degree", |f| {
        f.location = Some(reeldine::models::GeoPoint::new(1.0, 0.0));
    })
    .await;

    let (result, _) = state
        .search
        .search_foods(params(|p| {
            p.lat = Some("0".to_string());
            p.lng = Some("0".to_string());
            p.radius = Some("300".to_string());
            p.sort_by = Some("distance".to_string());
        }))
        .await
        .unwrap();

    assert_eq!(result.foods.len(), 2);
    assert_eq!(result.foods[0].name, "One Degree");
    assert_eq!(result.foods[1].name, "Two Degrees");
    let first = result.foods[0].distance_km.unwrap();
    let second = result.foods[1].distance_km.unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn pagination_metadata_is_exact() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Paginator", "paginator@example.com").await;

    for i in 0..25 {
        create_food(state, partner.id, &format!("Dish {}", i), |_| {}).await;
    }

    let (page2, _) = state
        .search
        .search_foods(params(|p| {
            p.page = Some("2".to_string());
            p.limit = Some("10".to_string());
        }))
        .await
        .unwrap();
    assert_eq!(page2.foods.len(), 10);
    assert_eq!(page2.pagination.current_page, 2);
    assert_eq!(page2.pagination.total_items, 25);
    assert_eq!(page2.pagination.total_pages, 3);
    assert!(page2.pagination.has_next);
    assert!(page2.pagination.has_prev);

    let (page3, _) = state
        .search
        .search_foods(params(|p| {
            p.page = Some("3".to_string());
            p.limit = Some("10".to_string());
        }))
        .await
        .unwrap();
    assert_eq!(page3.foods.len(), 5);
    assert!(!page3.pagination.has_next);
}

#[tokio::test]
async fn trending_orders_by_engagement_score() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Trending", "trending@example.com").await;

    let a = create_food(state, partner.id, "Likes Only", |_| {}).await;
    let b = create_food(state, partner.id, "Saves Only", |_| {}).await;
    let c = create_food(state, partner.id, "Comments Only", |_| {}).await;
    set_food_counters(state, a.id, 100, 0, 0, 0).await; // 200
    set_food_counters(state, b.id, 0, 100, 0, 0).await; // 300
    set_food_counters(state, c.id, 0, 0, 100, 0).await; // 400

    let (result, _) = state
        .search
        .search_foods(params(|p| p.sort_by = Some("trending".to_string())))
        .await
        .unwrap();

    let names: Vec<&str> = result.foods.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Comments Only", "Saves Only", "Likes Only"]);
    assert_eq!(result.foods[0].engagement_score, 400.0);
}

#[tokio::test]
async fn price_filter_and_lenient_rating() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Pricing", "pricing@example.com").await;

    create_food(state, partner.id, "Cheap", |f| f.price = Some(5.0)).await;
    create_food(state, partner.id, "Mid", |f| f.price = Some(15.0)).await;
    create_food(state, partner.id, "Expensive", |f| f.price = Some(50.0)).await;

    let (result, _) = state
        .search
        .search_foods(params(|p| {
            p.price_range = Some("10-20".to_string());
            // Malformed rating is dropped, not an error.
            p.rating = Some("not-a-number".to_string());
        }))
        .await
        .unwrap();

    assert_eq!(result.pagination.total_items, 1);
    assert_eq!(result.foods[0].name, "Mid");

    let (floor_only, _) = state
        .search
        .search_foods(params(|p| p.price_range = Some("15".to_string())))
        .await
        .unwrap();
    assert_eq!(floor_only.pagination.total_items, 2);
}

#[tokio::test]
async fn second_identical_search_is_served_from_cache() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Cached", "cached@example.com").await;
    create_food(state, partner.id, "Dish", |_| {}).await;

    let (first, cached_first) = state
        .search
        .search_foods(params(|p| p.q = Some("dish".to_string())))
        .await
        .unwrap();
    assert!(!cached_first);

    let (second, cached_second) = state
        .search
        .search_foods(params(|p| p.q = Some("dish".to_string())))
        .await
        .unwrap();
    assert!(cached_second);
    assert_eq!(
        first.pagination.total_items,
        second.pagination.total_items
    );

    // A different parameter set misses.
    let (_, cached_other) = state
        .search
        .search_foods(params(|p| p.q = Some("other".to_string())))
        .await
        .unwrap();
    assert!(!cached_other);
}

#[tokio::test]
async fn suggestions_cover_foods_partners_and_tags() {
    let app = spawn().await;
    let state = &app.state;
    let partner = create_partner(state, "Pasta Palace", "palace@example.com").await;

    create_food(state, partner.id, "Pasta Primavera", |f| {
        f.tags = vec!["pasta".to_string(), "italian".to_string()];
    })
    .await;
    create_food(state, partner.id, "Pasta Carbonara", |f| {
        f.tags = vec!["pasta".to_string()];
    })
    .await;

    let list = state
        .search
        .suggestions(SuggestionParams {
            q: Some("pa".to_string()),
            kind: None,
        })
        .await
        .unwrap();

    let has = |kind: &str, text: &str| {
        list.suggestions
            .iter()
            .any(|s| s.kind == kind && s.text == text)
    };
    assert!(has("food", "Pasta Primavera"));
    assert!(has("partner", "Pasta Palace"));
    assert!(has("tag", "pasta"));

    // Below the two-character threshold nothing is suggested.
    let empty = state
        .search
        .suggestions(SuggestionParams {
            q: Some("p".to_string()),
            kind: None,
        })
        .await
        .unwrap();
    assert!(empty.suggestions.is_empty());
}
