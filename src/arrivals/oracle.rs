//! Travel-time oracle seam.
//!
//! P and S travel times come from an external 1-D earth-model oracle. The
//! crate ships a coarse table-interpolated standard-earth implementation so
//! the workbench runs without native bindings; deployments can inject a
//! higher-fidelity oracle behind the same trait.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Distance {0} degrees outside supported range")]
    DistanceOutOfRange(f64),

    #[error("Travel-time oracle unavailable: {0}")]
    Unavailable(String),
}

/// One computed phase arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseArrival {
    /// Phase name (P, Pn, S, Sn, ...).
    pub name: String,
    /// Travel time in seconds from the origin.
    pub time_s: f64,
}

/// External travel-time model for body waves.
///
/// One immutable instance is shared process-wide.
pub trait TravelTimeOracle: Send + Sync {
    /// Travel times for the requested phases at a source depth (km) and
    /// epicentral distance (degrees).
    fn travel_times(
        &self,
        source_depth_km: f64,
        distance_deg: f64,
        phases: &[&str],
    ) -> Result<Vec<PhaseArrival>, OracleError>;
}

/// Surface-focus P travel times, seconds, at 10-degree steps (0..=100).
/// Values follow the standard iasp91 curves to within a few seconds, which
/// is ample for windowing and sanity checks.
const P_TABLE: [f64; 11] =
    [0.0, 150.0, 276.0, 372.0, 458.0, 530.0, 600.0, 666.0, 724.0, 778.0, 828.0];

/// Surface-focus S travel times, seconds, same grid.
const S_TABLE: [f64; 11] =
    [0.0, 268.0, 500.0, 672.0, 825.0, 958.0, 1082.0, 1199.0, 1306.0, 1404.0, 1494.0];

const TABLE_STEP_DEG: f64 = 10.0;

/// Near-source vertical velocities used for the depth correction, km/s.
const P_SOURCE_VELOCITY: f64 = 8.04;
const S_SOURCE_VELOCITY: f64 = 4.48;

/// Coarse built-in standard-earth travel-time model.
///
/// Linear interpolation over a surface-focus table plus a first-order depth
/// correction (the ray leaves the source below the crust, so a deeper
/// source shortens the path by roughly the vertical travel time).
#[derive(Debug, Default)]
pub struct StandardEarthOracle;

impl StandardEarthOracle {
    fn interpolate(table: &[f64; 11], distance_deg: f64) -> Option<f64> {
        if !(0.0..=100.0).contains(&distance_deg) {
            return None;
        }
        let position = distance_deg / TABLE_STEP_DEG;
        let lower = position.floor() as usize;
        if lower >= table.len() - 1 {
            return Some(table[table.len() - 1]);
        }
        let fraction = position - lower as f64;
        Some(table[lower] + fraction * (table[lower + 1] - table[lower]))
    }

    fn phase_time(phase: &str, depth_km: f64, distance_deg: f64) -> Option<f64> {
        let (table, source_velocity) = match phase {
            "P" => (&P_TABLE, P_SOURCE_VELOCITY),
            "S" => (&S_TABLE, S_SOURCE_VELOCITY),
            _ => return None,
        };
        let surface_time = Self::interpolate(table, distance_deg)?;
        if surface_time <= 0.0 {
            return None;
        }
        let corrected = surface_time - depth_km.max(0.0) / source_velocity;
        Some(corrected.max(surface_time * 0.5))
    }
}

impl TravelTimeOracle for StandardEarthOracle {
    fn travel_times(
        &self,
        source_depth_km: f64,
        distance_deg: f64,
        phases: &[&str],
    ) -> Result<Vec<PhaseArrival>, OracleError> {
        if !(0.0..=100.0).contains(&distance_deg) {
            return Err(OracleError::DistanceOutOfRange(distance_deg));
        }
        let mut arrivals = Vec::new();
        for phase in phases {
            if let Some(time_s) = Self::phase_time(phase, source_depth_km, distance_deg) {
                arrivals.push(PhaseArrival { name: (*phase).to_string(), time_s });
            }
        }
        Ok(arrivals)
    }
}

/// Plain-velocity fallback estimates used when the oracle fails. These keep
/// the display layer populated; they never feed the Vp/Vs structural factor.
pub mod fallback {
    use crate::geo::KM_PER_DEGREE_DISPLAY;

    pub const P_VELOCITY_KMS: f64 = 8.0;
    pub const S_VELOCITY_KMS: f64 = 4.5;

    pub fn p_time_s(distance_deg: f64) -> f64 {
        distance_deg * KM_PER_DEGREE_DISPLAY / P_VELOCITY_KMS
    }

    pub fn s_time_s(distance_deg: f64) -> f64 {
        distance_deg * KM_PER_DEGREE_DISPLAY / S_VELOCITY_KMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p_before_s_everywhere() {
        let oracle = StandardEarthOracle;
        for d in [1.0, 5.0, 15.0, 30.0, 60.0, 95.0] {
            let arrivals = oracle.travel_times(10.0, d, &["P", "S"]).expect("arrivals");
            assert_eq!(arrivals.len(), 2);
            assert!(arrivals[0].time_s < arrivals[1].time_s, "P >= S at {} deg", d);
        }
    }

    #[test]
    fn test_table_endpoints() {
        let oracle = StandardEarthOracle;
        let arrivals = oracle.travel_times(0.0, 60.0, &["P"]).expect("arrivals");
        assert!((arrivals[0].time_s - 600.0).abs() < 1.0);
    }

    #[test]
    fn test_depth_shortens_travel_time() {
        let oracle = StandardEarthOracle;
        let shallow = oracle.travel_times(0.0, 40.0, &["P"]).expect("arrivals")[0].time_s;
        let deep = oracle.travel_times(300.0, 40.0, &["P"]).expect("arrivals")[0].time_s;
        assert!(deep < shallow);
    }

    #[test]
    fn test_distance_out_of_range() {
        let oracle = StandardEarthOracle;
        assert!(oracle.travel_times(10.0, 140.0, &["P"]).is_err());
    }

    #[test]
    fn test_unknown_phase_skipped() {
        let oracle = StandardEarthOracle;
        let arrivals = oracle.travel_times(10.0, 30.0, &["P", "PKP"]).expect("arrivals");
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].name, "P");
    }

    #[test]
    fn test_fallback_velocities() {
        // 10 degrees at 8 km/s is about 139 s.
        assert!((fallback::p_time_s(10.0) - 139.15).abs() < 1.0);
        assert!(fallback::s_time_s(10.0) > fallback::p_time_s(10.0));
    }
}
