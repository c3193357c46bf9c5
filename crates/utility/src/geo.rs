pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Great-circle distance in meters between two coordinates given in degrees.
pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Wraps a longitude into `[-180, 180]`. Values already in range are returned
/// unchanged, so `180.0` stays `180.0` rather than flipping to `-180.0`.
pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        return longitude;
    }
    let wrapped = (longitude + MAX_LONGITUDE).rem_euclid(2.0 * MAX_LONGITUDE);
    wrapped - MAX_LONGITUDE
}

pub fn clamp_latitude(latitude: f64) -> f64 {
    latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

/// Converts a distance along a meridian into degrees of latitude.
pub fn meters_to_latitude_degrees(meters: f64) -> f64 {
    meters / EARTH_RADIUS_METERS * 180.0 / std::f64::consts::PI
}
