//! Empirical surface-wave velocity model.
//!
//! Group velocities for Love and Rayleigh waves are estimated as a product
//! of a base velocity and empirical correction factors for source depth,
//! propagation distance, event magnitude and crustal structure (Vp/Vs).
//! The factors encode that deep sources excite slower fundamental modes,
//! long paths sample faster mantle-influenced velocities, and large events
//! carry more long-period energy.

use crate::types::SurfaceFactors;
use serde::{Deserialize, Serialize};

/// Base group velocities, km/s.
pub const V0_LOVE_KMS: f64 = 4.5;
pub const V0_RAYLEIGH_KMS: f64 = 3.5;

/// Love waves lead Rayleigh waves by this fixed ratio.
pub const LOVE_RAYLEIGH_RATIO: f64 = 1.12;

/// Allowed velocity ranges after all corrections, km/s.
pub const LOVE_BOUNDS_KMS: (f64, f64) = (3.8, 5.2);
pub const RAYLEIGH_BOUNDS_KMS: (f64, f64) = (3.0, 4.5);

/// Velocities with the factors that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceVelocities {
    pub love_kms: f64,
    pub rayleigh_kms: f64,
    pub factors: SurfaceFactors,
}

fn depth_factor(depth_km: f64) -> f64 {
    match depth_km {
        d if d < 20.0 => 1.00,
        d if d < 35.0 => 0.98,
        d if d < 70.0 => 0.92,
        d if d < 150.0 => 0.80,
        d if d < 300.0 => 0.65,
        _ => 0.50,
    }
}

fn distance_factor(distance_km: f64) -> f64 {
    match distance_km {
        d if d < 500.0 => 0.92,
        d if d < 1000.0 => 0.95,
        d if d < 2000.0 => 0.98,
        d if d < 4000.0 => 1.00,
        d if d < 6000.0 => 1.02,
        d if d < 10000.0 => 1.04,
        _ => 1.06,
    }
}

fn magnitude_factor(magnitude: f64) -> f64 {
    match magnitude {
        m if m < 5.0 => 0.95,
        m if m < 5.5 => 0.97,
        m if m < 6.0 => 0.99,
        m if m < 6.5 => 1.00,
        m if m < 7.0 => 1.02,
        m if m < 7.5 => 1.04,
        m if m < 8.0 => 1.06,
        _ => 1.08,
    }
}

fn structural_factor(vp_vs: Option<f64>) -> (f64, &'static str) {
    match vp_vs {
        Some(r) if r > 1.80 => (0.93, "sedimentary"),
        Some(r) if r > 1.75 => (0.97, "normal crust"),
        Some(r) if r > 1.70 => (1.00, "average"),
        Some(_) => (1.05, "crystalline"),
        None => (1.00, "unknown"),
    }
}

/// Compute Love and Rayleigh group velocities for one path.
///
/// After the factor product the Love velocity is locked to
/// 1.12 x Rayleigh and both are clamped to their physical ranges, so the
/// ratio can deviate slightly at the extremes.
pub fn surface_velocities(
    depth_km: f64,
    distance_km: f64,
    magnitude: f64,
    vp_vs: Option<f64>,
) -> SurfaceVelocities {
    let f_depth = depth_factor(depth_km);
    let f_dist = distance_factor(distance_km);
    let f_mag = magnitude_factor(magnitude);
    let (f_struct, interpretation) = structural_factor(vp_vs);

    let combined = f_depth * f_dist * f_mag * f_struct;
    let rayleigh = V0_RAYLEIGH_KMS * combined;
    let love = LOVE_RAYLEIGH_RATIO * rayleigh;

    SurfaceVelocities {
        love_kms: love.clamp(LOVE_BOUNDS_KMS.0, LOVE_BOUNDS_KMS.1),
        rayleigh_kms: rayleigh.clamp(RAYLEIGH_BOUNDS_KMS.0, RAYLEIGH_BOUNDS_KMS.1),
        factors: SurfaceFactors {
            depth: f_depth,
            distance: f_dist,
            magnitude: f_mag,
            structural: f_struct,
            structural_interpretation: interpretation.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_path() {
        // Shallow, mid-distance, M6.2, unknown structure: every factor is
        // exactly 1, Rayleigh sits at its base velocity.
        let v = surface_velocities(10.0, 3000.0, 6.2, None);
        assert!((v.rayleigh_kms - 3.5).abs() < 1e-9);
        assert!((v.love_kms - 1.12 * v.rayleigh_kms).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_hold_for_extremes() {
        for depth in [0.0, 30.0, 60.0, 120.0, 250.0, 600.0] {
            for distance in [100.0, 800.0, 1500.0, 3000.0, 5000.0, 9000.0, 15000.0] {
                for magnitude in [4.0, 5.2, 6.0, 7.2, 8.5, 9.5] {
                    for vp_vs in [None, Some(1.6), Some(1.72), Some(1.78), Some(1.9)] {
                        let v = surface_velocities(depth, distance, magnitude, vp_vs);
                        assert!(
                            (3.8..=5.2).contains(&v.love_kms),
                            "Love {} out of range",
                            v.love_kms
                        );
                        assert!(
                            (3.0..=4.5).contains(&v.rayleigh_kms),
                            "Rayleigh {} out of range",
                            v.rayleigh_kms
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_love_leads_rayleigh() {
        let v = surface_velocities(15.0, 4500.0, 7.8, Some(1.73));
        assert!(v.love_kms > v.rayleigh_kms);
        let ratio = v.love_kms / v.rayleigh_kms;
        assert!((ratio - 1.12).abs() < 0.15, "ratio {}", ratio);
    }

    #[test]
    fn test_deep_events_slow_down() {
        let shallow = surface_velocities(10.0, 3000.0, 7.0, None);
        let deep = surface_velocities(400.0, 3000.0, 7.0, None);
        assert!(deep.rayleigh_kms < shallow.rayleigh_kms);
    }

    #[test]
    fn test_structural_interpretations() {
        assert_eq!(
            surface_velocities(10.0, 3000.0, 6.0, Some(1.85)).factors.structural_interpretation,
            "sedimentary"
        );
        assert_eq!(
            surface_velocities(10.0, 3000.0, 6.0, Some(1.65)).factors.structural_interpretation,
            "crystalline"
        );
        assert_eq!(
            surface_velocities(10.0, 3000.0, 6.0, None).factors.structural_interpretation,
            "unknown"
        );
    }
}
