//! Arrival Model
//!
//! Combines the external body-wave travel-time oracle with the empirical
//! surface-wave velocity model to attach P, S, Love and Rayleigh arrival
//! times (seconds after origin) to a station.

mod oracle;
mod surface;

pub use oracle::{fallback, OracleError, PhaseArrival, StandardEarthOracle, TravelTimeOracle};
pub use surface::{
    surface_velocities, SurfaceVelocities, LOVE_BOUNDS_KMS, LOVE_RAYLEIGH_RATIO,
    RAYLEIGH_BOUNDS_KMS, V0_LOVE_KMS, V0_RAYLEIGH_KMS,
};

use crate::types::{Event, StationArrivals};
use std::sync::Arc;
use tracing::debug;

/// Computes arrivals for an (event, station) pair.
///
/// Holds a shared immutable oracle; one arrival model serves the whole
/// process.
#[derive(Clone)]
pub struct ArrivalModel {
    oracle: Arc<dyn TravelTimeOracle>,
}

impl ArrivalModel {
    pub fn new(oracle: Arc<dyn TravelTimeOracle>) -> Self {
        Self { oracle }
    }

    /// Built-in standard-earth oracle.
    pub fn standard() -> Self {
        Self::new(Arc::new(StandardEarthOracle))
    }

    /// Compute the full arrival set for a path.
    ///
    /// `distance_km`/`distance_deg` are the precomputed great-circle
    /// measures. P and S are `None` when the oracle fails; the surface pair
    /// always exists. When both body-wave picks exist their ratio estimates
    /// Vp/Vs for the structural factor, otherwise it stays neutral.
    pub fn arrivals(&self, event: &Event, distance_km: f64, distance_deg: f64) -> StationArrivals {
        let (p_s, s_s) = match self.oracle.travel_times(event.depth_km, distance_deg, &["P", "S"])
        {
            Ok(arrivals) => {
                let mut p = None;
                let mut s = None;
                for arrival in arrivals {
                    match arrival.name.as_str() {
                        "P" | "Pn" | "Pg" if p.is_none() => p = Some(arrival.time_s),
                        "S" | "Sn" | "Sg" if s.is_none() => s = Some(arrival.time_s),
                        _ => {}
                    }
                }
                (p, s)
            }
            Err(e) => {
                debug!(error = %e, distance_deg, "Travel-time oracle failed, P/S left empty");
                (None, None)
            }
        };

        let vp_vs = match (p_s, s_s) {
            (Some(p), Some(s)) if p > 0.0 => Some(s / p),
            _ => None,
        };

        let velocities =
            surface_velocities(event.depth_km, distance_km, event.magnitude, vp_vs);
        let love_s = distance_km / velocities.love_kms;
        let rayleigh_s = distance_km / velocities.rayleigh_kms;

        StationArrivals {
            p_s,
            s_s,
            love_s,
            rayleigh_s,
            surface_s: rayleigh_s,
            love_velocity_kms: velocities.love_kms,
            rayleigh_velocity_kms: velocities.rayleigh_kms,
            factors: velocities.factors,
        }
    }
}
