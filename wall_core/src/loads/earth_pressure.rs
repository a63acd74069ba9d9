//! Active and passive earth pressure coefficients.
//!
//! Coulomb is the default: it accounts for the face batter and for friction
//! between the soil and the back of the structure. Rankine ignores both and
//! inclines the resultant at the backslope angle.

use serde::{Deserialize, Serialize};

use super::soil::SoilProperties;
use crate::errors::LoadModelError;

/// δ/φ used when the design file does not give one
pub const DEFAULT_WALL_FRICTION_RATIO: f64 = 0.66;

/// Earth pressure theory used for the active coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarthPressureTheory {
    #[default]
    Coulomb,
    Rankine,
}

impl EarthPressureTheory {
    pub fn display_name(&self) -> &'static str {
        match self {
            EarthPressureTheory::Coulomb => "Coulomb",
            EarthPressureTheory::Rankine => "Rankine",
        }
    }
}

/// Active coefficient and the direction of the resultant it produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePressure {
    pub theory: EarthPressureTheory,
    /// Ka
    pub ka: f64,
    /// Inclination of the resultant from horizontal, δ_eff (deg)
    pub wall_friction_deg: f64,
    /// Back of the wall measured from horizontal, β (deg)
    pub wall_angle_deg: f64,
    /// Backslope i (deg)
    pub backslope_deg: f64,
}

/// Coulomb active coefficient. All angles in radians.
///
/// `beta` is the back of the wall measured from horizontal (π/2 for a
/// vertical wall), `delta` the wall friction angle and `i` the backslope.
pub fn coulomb_ka(phi: f64, delta: f64, beta: f64, i: f64) -> f64 {
    let numerator = beta.sin().recip() * (beta - phi).sin();
    let denominator = (beta + delta).sin().sqrt() + ((phi + delta).sin() * (phi - i).sin() / (beta - i).sin()).sqrt();
    (numerator / denominator).powi(2)
}

/// Rankine active coefficient for a sloping backfill. Angles in radians.
pub fn rankine_ka(phi: f64, i: f64) -> f64 {
    let cos_i = i.cos();
    let root = (cos_i.powi(2) - phi.cos().powi(2)).sqrt();
    cos_i * (cos_i - root) / (cos_i + root)
}

/// Rankine passive coefficient `tan²(45° + φ/2)`
pub fn passive_coefficient(friction_angle_deg: f64) -> f64 {
    failure_plane_slope(friction_angle_deg).powi(2)
}

/// `tan(45° + φ/2)`, slope of the active failure plane used to project a
/// surcharge onto the back of the wall
pub fn failure_plane_slope(friction_angle_deg: f64) -> f64 {
    (45.0 + friction_angle_deg / 2.0).to_radians().tan()
}

/// Active coefficient of `soil` against a wall battered `batter_angle_deg`
/// from vertical.
///
/// `zone` only names the soil in errors.
pub fn active_pressure(
    theory: EarthPressureTheory,
    soil: &SoilProperties,
    zone: &str,
    batter_angle_deg: f64,
    wall_friction_ratio: f64,
    backslope_deg: f64,
) -> Result<ActivePressure, LoadModelError> {
    soil.validate(zone)?;
    if !(0.0..=1.0).contains(&wall_friction_ratio) {
        return Err(LoadModelError::InvalidWallFriction {
            ratio: wall_friction_ratio,
        });
    }
    if !(backslope_deg >= 0.0 && backslope_deg < soil.friction_angle_deg) {
        return Err(LoadModelError::BackslopeTooSteep {
            zone: zone.to_string(),
            backslope_deg,
            friction_angle_deg: soil.friction_angle_deg,
        });
    }

    let phi = soil.friction_angle_rad();
    let i = backslope_deg.to_radians();
    let wall_angle_deg = 90.0 - batter_angle_deg;

    let (ka, wall_friction_deg) = match theory {
        EarthPressureTheory::Coulomb => {
            let delta_deg = wall_friction_ratio * soil.friction_angle_deg;
            let ka = coulomb_ka(phi, delta_deg.to_radians(), wall_angle_deg.to_radians(), i);
            (ka, delta_deg)
        }
        EarthPressureTheory::Rankine => (rankine_ka(phi, i), backslope_deg),
    };

    if !ka.is_finite() || ka <= 0.0 {
        return Err(LoadModelError::undefined(
            "Ka",
            zone,
            format!(
                "{} coefficient evaluated to {ka} (phi = {}, batter = {batter_angle_deg} deg, backslope = {backslope_deg} deg)",
                theory.display_name(),
                soil.friction_angle_deg
            ),
        ));
    }

    Ok(ActivePressure {
        theory,
        ka,
        wall_friction_deg,
        wall_angle_deg,
        backslope_deg,
    })
}
