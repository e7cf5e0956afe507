/// Earth radius in kilometers, shared by every great-circle computation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometers (haversine).
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Bounding box `(min_lat, max_lat, min_lng, max_lng)` that fully contains
/// the circle of `radius_km` around the point. Used as an indexed prefilter;
/// the exact circle is enforced with `haversine_km` afterwards.
pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let d_lat = radius_km / 111.0;
    // Longitude degrees shrink with latitude; clamp the divisor away from
    // zero so polar queries degrade to a full-longitude scan instead of NaN.
    let lng_scale = lat.to_radians().cos().abs().max(0.01);
    let d_lng = radius_km / (111.0 * lng_scale);
    (lat - d_lat, lat + d_lat, lng - d_lng, lng + d_lng)
}
