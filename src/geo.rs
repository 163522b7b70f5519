//! Great-circle geometry between epicentre and station.
//!
//! Spherical-earth approximation (mean radius). Accuracy is well within a
//! few km over teleseismic distances, far below the resolution of the
//! travel-time and magnitude models consuming these numbers.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// km per degree used for display-layer distance conversion.
pub const KM_PER_DEGREE_DISPLAY: f64 = 111.32;

/// km per degree used inside the Ms estimator (IASPEI convention).
pub const KM_PER_DEGREE_IASPEI: f64 = 111.195;

/// Great-circle distance (km) and forward azimuth (degrees, 0..360 from
/// north) from point 1 to point 2.
pub fn distance_azimuth(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    // Haversine distance
    let dphi = phi2 - phi1;
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlon / 2.0).sin().powi(2);
    let central_angle = 2.0 * a.sqrt().clamp(0.0, 1.0).asin();
    let distance_km = EARTH_RADIUS_KM * central_angle;

    // Initial bearing
    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    let azimuth_deg = (y.atan2(x).to_degrees() + 360.0) % 360.0;

    (distance_km, azimuth_deg)
}

/// Epicentral distance in degrees of arc.
pub fn distance_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (km, _) = distance_azimuth(lat1, lon1, lat2, lon2);
    kilometers_to_degrees(km)
}

/// Convert kilometres to degrees of arc along a great circle.
pub fn kilometers_to_degrees(km: f64) -> f64 {
    km / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let (km, _) = distance_azimuth(10.0, 20.0, 10.0, 20.0);
        assert!(km < 1e-6);
    }

    #[test]
    fn test_equator_quarter_circle() {
        // 90 degrees along the equator
        let (km, az) = distance_azimuth(0.0, 0.0, 0.0, 90.0);
        assert!((km - EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2).abs() < 1.0);
        assert!((az - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_tohoku_to_majo() {
        // 2011 Tohoku epicentre to IU.MAJO is roughly 430 km
        let (km, _) = distance_azimuth(38.297, 142.373, 36.545, 138.204);
        assert!(km > 390.0 && km < 470.0, "got {} km", km);
    }

    #[test]
    fn test_north_azimuth() {
        let (_, az) = distance_azimuth(0.0, 0.0, 10.0, 0.0);
        assert!(az < 0.5 || az > 359.5);
    }

    #[test]
    fn test_km_degree_roundtrip() {
        let deg = kilometers_to_degrees(KM_PER_DEGREE_DISPLAY);
        assert!((deg - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_symmetry() {
        let (forward, _) = distance_azimuth(38.3, 142.4, -21.2, -159.8);
        let (backward, _) = distance_azimuth(-21.2, -159.8, 38.3, 142.4);
        assert!((forward - backward).abs() < 1e-6);
    }
}
