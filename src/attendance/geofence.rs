use geo::{GeodesicDistance, Point};

use crate::error::AppError;

/// Hospital reference point (decimal degrees)
pub const HOSPITAL_LAT: f64 = 22.930758;
pub const HOSPITAL_LON: f64 = -82.689342;

/// Check-ins farther than this from the hospital are rejected
pub const MAX_DISTANCE_METERS: f64 = 200.0;

/// Parses a submitted `(latitude, longitude)` pair of decimal-degree strings.
pub fn parse_coordinate(lat: &str, lon: &str) -> Result<(f64, f64), AppError> {
    let lat: f64 = lat.trim().parse().map_err(|_| AppError::InvalidCoordinate)?;
    let lon: f64 = lon.trim().parse().map_err(|_| AppError::InvalidCoordinate)?;

    if !lat.is_finite() || !lon.is_finite() {
        return Err(AppError::InvalidCoordinate);
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::InvalidCoordinate);
    }

    Ok((lat, lon))
}

/// Geodesic distance in meters between two points on the WGS-84 ellipsoid
/// (Karney's algorithm). The pair is put in a canonical order first so the
/// result does not depend on argument order.
pub fn distance_meters(lat: f64, lon: f64, ref_lat: f64, ref_lon: f64) -> f64 {
    let ((lat1, lon1), (lat2, lon2)) = if (lat, lon) <= (ref_lat, ref_lon) {
        ((lat, lon), (ref_lat, ref_lon))
    } else {
        ((ref_lat, ref_lon), (lat, lon))
    };

    // geo points are (x = lon, y = lat)
    Point::new(lon1, lat1).geodesic_distance(&Point::new(lon2, lat2))
}

/// Boundary inclusive: exactly `max_meters` away still passes.
pub fn within_radius(distance: f64, max_meters: f64) -> bool {
    distance <= max_meters
}

/// Distance from the hospital reference point
pub fn distance_to_hospital(lat: f64, lon: f64) -> f64 {
    distance_meters(lat, lon, HOSPITAL_LAT, HOSPITAL_LON)
}

/// The point `meters` away from `(lat, lon)` along `bearing_deg`.
/// Used to build test points at exact distances.
#[cfg(test)]
pub(crate) fn destination(lat: f64, lon: f64, bearing_deg: f64, meters: f64) -> (f64, f64) {
    use geo::GeodesicDestination;

    let p = Point::new(lon, lat).geodesic_destination(bearing_deg, meters);
    (p.y(), p.x())
}
