use crate::core::error::OracleError;
use crate::models::Coordinates;
use async_trait::async_trait;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// External geocoding oracle: postal code to coordinates
///
/// Injected so the engine can be exercised with a deterministic stub
/// instead of a live network call. Failure must be surfaced distinctly,
/// never folded into a wrong coordinate pair.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, postal_code: &str) -> Result<Coordinates, OracleError>;
}

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Normalize a distance vector relative to its own maximum
///
/// Every distance is divided by the maximum distance observed in this
/// candidate set, so the farthest candidate scores exactly 1.0. A zero
/// maximum (all candidates equidistant with the seeker) uses divisor 1 to
/// avoid division by zero, producing all-zero scores.
///
/// Normalization is relative to the current result set, not absolute: the
/// same shelter can receive a different proximity score in a different
/// query. Implemented as a pure function over the full vector so the
/// semantics stay exact and side-effect-free.
pub fn normalize_distances(distances: &[f64]) -> Vec<f64> {
    let max = distances.iter().cloned().fold(0.0_f64, f64::max);
    let divisor = if max == 0.0 { 1.0 } else { max };

    distances.iter().map(|d| d / divisor).collect()
}
