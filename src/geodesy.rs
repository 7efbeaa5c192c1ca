//! Great-circle distance between two points on the Earth's surface.

/// Mean Earth radius in kilometers, as used throughout the engine.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between `(lat1, lng1)` and `(lat2, lng2)`, in kilometers,
/// via the haversine formula. Always non-negative; `distance_km(p, p) == 0.0`.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}
