//! Earth pressure and surcharge acting on the wall.
//!
//! The load model is built once per analysis from the validated geometry and
//! soil profile and is then read by every failure mode. It holds two
//! pressure states:
//!
//! - [`PressureRole::Internal`] - infill against the back of the blocks,
//!   the demand carried by the geogrid and by the course interfaces
//! - [`PressureRole::External`] - retained soil against the back of the
//!   whole structure (block column, or block + reinforced mass)
//!
//! # Example
//!
//! ```
//! use wall_core::geometry::{CourseSpec, WallGeometry};
//! use wall_core::loads::{EarthPressureTheory, LoadModel, PressureSettings, SoilProfile, SoilProperties};
//!
//! let courses: Vec<CourseSpec> = (0..3)
//!     .map(|i| CourseSpec::new(i as f64 * 0.4, 0.4, 0.9, 21.6))
//!     .collect();
//! let (wall, _) = WallGeometry::build(&courses, &[], None).unwrap();
//! let soils = SoilProfile::uniform(SoilProperties::granular(18.0, 30.0));
//! let settings = PressureSettings { theory: EarthPressureTheory::Rankine, ..Default::default() };
//!
//! let loads = LoadModel::build(&wall, &soils, None, &settings).unwrap();
//! // Pa = ½·Ka·γ·H² with Ka = 1/3
//! assert!((loads.external.total.horizontal_kn_m - 4.32).abs() < 1e-9);
//! ```

pub mod distribution;
pub mod earth_pressure;
pub mod soil;
pub mod surcharge;

pub use distribution::{DiagramResultant, PressureDiagram, PressureSegment};
pub use earth_pressure::{
    active_pressure, passive_coefficient, ActivePressure, EarthPressureTheory,
    DEFAULT_WALL_FRICTION_RATIO,
};
pub use soil::{SoilProfile, SoilProperties};
pub use surcharge::Surcharge;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::LoadModelError;
use crate::geometry::{SelfWeight, WallGeometry};

/// Pressure theory settings shared by both pressure states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureSettings {
    pub theory: EarthPressureTheory,
    /// δ/φ for Coulomb
    pub wall_friction_ratio: f64,
    /// Backslope i (deg)
    pub backslope_deg: f64,
}

impl Default for PressureSettings {
    fn default() -> Self {
        PressureSettings {
            theory: EarthPressureTheory::Coulomb,
            wall_friction_ratio: DEFAULT_WALL_FRICTION_RATIO,
            backslope_deg: 0.0,
        }
    }
}

/// Which face of the structure a pressure state loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureRole {
    Internal,
    External,
}

impl PressureRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            PressureRole::Internal => "Internal",
            PressureRole::External => "External",
        }
    }
}

/// A resultant split into components, with its point of application.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceComponents {
    /// kN/m, positive pushing the wall outward
    pub horizontal_kn_m: f64,
    /// kN/m, positive downward
    pub vertical_kn_m: f64,
    /// Height of the horizontal component above the base (m)
    pub height_m: f64,
    /// x of the vertical component from the toe (m)
    pub x_m: f64,
}

impl ForceComponents {
    /// Overturning moment of the horizontal component about the toe
    pub fn overturning_moment(&self) -> f64 {
        self.horizontal_kn_m * self.height_m
    }

    /// Restoring moment of the vertical component about the toe
    pub fn restoring_moment(&self) -> f64 {
        self.vertical_kn_m * self.x_m
    }

    fn combine(a: &ForceComponents, b: &ForceComponents) -> ForceComponents {
        let horizontal = a.horizontal_kn_m + b.horizontal_kn_m;
        let vertical = a.vertical_kn_m + b.vertical_kn_m;
        ForceComponents {
            horizontal_kn_m: horizontal,
            vertical_kn_m: vertical,
            height_m: if horizontal > 0.0 {
                (a.overturning_moment() + b.overturning_moment()) / horizontal
            } else {
                0.0
            },
            x_m: if vertical > 0.0 {
                (a.restoring_moment() + b.restoring_moment()) / vertical
            } else {
                a.x_m
            },
        }
    }
}

/// Active pressure of one soil zone against one face of the structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureState {
    pub role: PressureRole,
    /// "retained" or "reinforced"
    pub zone: String,
    pub soil: SoilProperties,
    pub coefficient: ActivePressure,
    /// Depth of the tension zone ignored for cohesive soil (m)
    pub tension_crack_depth_m: f64,
    /// Depth band loaded by the surcharge, clipped to the wall
    pub surcharge_band_m: Option<(f64, f64)>,
    /// Active pressure (along the resultant direction) from soil weight
    pub soil_diagram: PressureDiagram,
    /// Active pressure from the surcharge
    pub surcharge_diagram: PressureDiagram,
    pub soil_force: ForceComponents,
    pub surcharge_force: ForceComponents,
    pub total: ForceComponents,
}

impl PressureState {
    fn build(
        role: PressureRole,
        zone: &str,
        soil: &SoilProperties,
        geometry: &WallGeometry,
        surcharge: Option<&Surcharge>,
        settings: &PressureSettings,
        back_offset_m: f64,
        back_x: impl Fn(f64) -> f64,
    ) -> Result<Self, LoadModelError> {
        let coefficient = active_pressure(
            settings.theory,
            soil,
            zone,
            geometry.batter_angle_deg,
            settings.wall_friction_ratio,
            settings.backslope_deg,
        )?;
        let height = geometry.height_m;
        let ka = coefficient.ka;

        // σ(z) = Ka·γ·z − 2c√Ka, zero above the tension crack
        let cohesion_relief = 2.0 * soil.cohesion_kpa * ka.sqrt();
        let tension_crack_depth_m = (cohesion_relief / (ka * soil.unit_weight_kn_m3)).min(height);
        let mut soil_diagram = PressureDiagram::new(height);
        soil_diagram.push(PressureSegment::new(
            tension_crack_depth_m,
            height,
            0.0,
            ka * soil.unit_weight_kn_m3 * height - cohesion_relief,
        ));

        let mut surcharge_diagram = PressureDiagram::new(height);
        let mut surcharge_band_m = None;
        if let Some(q) = surcharge.filter(|q| q.pressure_kpa > 0.0) {
            let (z1, z2) = q.lateral_band(back_offset_m, soil.friction_angle_deg);
            let z2 = z2.unwrap_or(height).min(height);
            if z1 < z2 {
                surcharge_band_m = Some((z1, z2));
                surcharge_diagram.push(PressureSegment::uniform(z1, z2, ka * q.pressure_kpa));
            }
        }

        let delta = coefficient.wall_friction_deg.to_radians();
        let components = |r: DiagramResultant| ForceComponents {
            horizontal_kn_m: r.force_kn_m * delta.cos(),
            vertical_kn_m: r.force_kn_m * delta.sin(),
            height_m: r.height_m,
            x_m: back_x(r.height_m),
        };
        let soil_force = components(soil_diagram.resultant());
        let surcharge_force = components(surcharge_diagram.resultant());
        let total = ForceComponents::combine(&soil_force, &surcharge_force);

        debug!(
            role = role.display_name(),
            zone,
            ka,
            delta_deg = coefficient.wall_friction_deg,
            horizontal_kn_m = total.horizontal_kn_m,
            height_m = total.height_m,
            "pressure state"
        );

        Ok(PressureState {
            role,
            zone: zone.to_string(),
            soil: *soil,
            coefficient,
            tension_crack_depth_m,
            surcharge_band_m,
            soil_diagram,
            surcharge_diagram,
            soil_force,
            surcharge_force,
            total,
        })
    }

    fn horizontal_factor(&self) -> f64 {
        self.coefficient.wall_friction_deg.to_radians().cos()
    }

    /// Horizontal pressure at depth `z` (kPa)
    pub fn horizontal_pressure_at(&self, z: f64) -> f64 {
        (self.soil_diagram.pressure_at(z) + self.surcharge_diagram.pressure_at(z)) * self.horizontal_factor()
    }

    /// Horizontal force between two depths (kN/m)
    pub fn horizontal_force_between(&self, from_depth_m: f64, to_depth_m: f64) -> f64 {
        let soil = self.soil_diagram.resultant_between(from_depth_m, to_depth_m);
        let surcharge = self.surcharge_diagram.resultant_between(from_depth_m, to_depth_m);
        (soil.force_kn_m + surcharge.force_kn_m) * self.horizontal_factor()
    }
}

/// Vertical load of the surcharge lying over the structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurchargeWeight {
    /// W_q (kN/m)
    pub force_kn_m: f64,
    /// x of W_q from the toe (m)
    pub x_m: f64,
    pub live: bool,
}

/// Everything acting on the wall for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadModel {
    pub settings: PressureSettings,
    pub internal: PressureState,
    pub external: PressureState,
    pub self_weight: SelfWeight,
    pub surcharge: Option<Surcharge>,
    pub surcharge_weight: Option<SurchargeWeight>,
}

impl LoadModel {
    /// Build both pressure states, the structure's self weight and the
    /// surcharge weight over the structure.
    pub fn build(
        geometry: &WallGeometry,
        soils: &SoilProfile,
        surcharge: Option<&Surcharge>,
        settings: &PressureSettings,
    ) -> Result<Self, LoadModelError> {
        soils.validate()?;
        if let Some(q) = surcharge {
            q.validate()?;
        }

        let (internal_zone, internal_soil) = if geometry.is_reinforced() {
            ("reinforced", soils.infill())
        } else {
            ("retained", &soils.retained)
        };
        let top_depth = geometry.top_course().depth_m;
        let internal = PressureState::build(
            PressureRole::Internal,
            internal_zone,
            internal_soil,
            geometry,
            surcharge,
            settings,
            top_depth,
            |y| geometry.block_back_x(y),
        )?;

        let top_x = geometry.batter_offset_m;
        let back_top = geometry.back_x(geometry.height_m);
        let external = PressureState::build(
            PressureRole::External,
            "retained",
            &soils.retained,
            geometry,
            surcharge,
            settings,
            back_top - top_x,
            |y| geometry.back_x(y),
        )?;

        let self_weight = geometry.self_weight(soils.infill().unit_weight_kn_m3);
        let surcharge_weight = surcharge.and_then(|q| {
            q.load_over(top_x, top_x, back_top).map(|(force_kn_m, x_m)| SurchargeWeight {
                force_kn_m,
                x_m,
                live: q.live,
            })
        });

        debug!(
            weight_kn_m = self_weight.total_kn_m,
            centroid_x_m = self_weight.centroid_x_m,
            surcharge_weight_kn_m = surcharge_weight.map(|w| w.force_kn_m).unwrap_or(0.0),
            "self weight"
        );

        Ok(LoadModel {
            settings: *settings,
            internal,
            external,
            self_weight,
            surcharge: surcharge.cloned(),
            surcharge_weight,
        })
    }

    /// Surcharge weight that may be counted as resisting (dead loads only)
    pub fn stabilizing_surcharge(&self) -> Option<&SurchargeWeight> {
        self.surcharge_weight.as_ref().filter(|w| !w.live)
    }

    /// Surcharge pressure that may be counted as confining the grid (dead loads only)
    pub fn stabilizing_surcharge_kpa(&self) -> f64 {
        match &self.surcharge {
            Some(q) if !q.live => q.pressure_kpa,
            _ => 0.0,
        }
    }

    /// True when the surcharge is a dead load
    pub fn surcharge_is_dead(&self) -> bool {
        self.surcharge.as_ref().is_some_and(|q| !q.live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CourseSpec, GeogridSpec};

    fn wall(layers: &[GeogridSpec]) -> WallGeometry {
        let courses: Vec<CourseSpec> = (0..6)
            .map(|i| CourseSpec::new(i as f64 * 0.2, 0.2, 0.3, 21.0))
            .collect();
        WallGeometry::build(&courses, layers, None).unwrap().0
    }

    fn rankine() -> PressureSettings {
        PressureSettings {
            theory: EarthPressureTheory::Rankine,
            ..Default::default()
        }
    }

    fn grid(depth_m: f64) -> GeogridSpec {
        GeogridSpec {
            depth_m,
            length_m: 1.0,
            front_offset_m: 0.0,
            ultimate_strength_kn_m: 30.0,
            reduction_factor: 2.0,
            connection_intercept_kn_m: 5.0,
            connection_slope: 0.4,
            interaction_coefficient: 0.8,
            coverage_ratio: 1.0,
            label: None,
        }
    }

    #[test]
    fn test_triangular_pressure_resultant_at_third_height() {
        let wall = wall(&[]);
        let soils = SoilProfile::uniform(SoilProperties::granular(18.0, 30.0));
        let loads = LoadModel::build(&wall, &soils, None, &rankine()).unwrap();

        let ext = &loads.external;
        let ka = ext.coefficient.ka;
        let h = wall.height_m;
        assert!((ext.total.horizontal_kn_m - 0.5 * ka * 18.0 * h * h).abs() < 1e-9);
        assert!((ext.total.height_m - h / 3.0).abs() < 1e-12);
        assert_eq!(ext.total.vertical_kn_m, 0.0);
        assert!(ext.surcharge_band_m.is_none());
        // unreinforced: both states look at retained soil against the blocks
        assert_eq!(loads.internal.total, loads.external.total);
    }

    #[test]
    fn test_surcharge_rectangle_raises_resultant() {
        let wall = wall(&[]);
        let soils = SoilProfile::uniform(SoilProperties::granular(18.0, 30.0));
        let q = Surcharge::uniform(12.0);
        let loads = LoadModel::build(&wall, &soils, Some(&q), &rankine()).unwrap();

        let ext = &loads.external;
        let ka = ext.coefficient.ka;
        let h = wall.height_m;
        let f_soil = 0.5 * ka * 18.0 * h * h;
        let f_q = ka * 12.0 * h;
        assert!((ext.surcharge_force.horizontal_kn_m - f_q).abs() < 1e-9);
        assert!((ext.surcharge_force.height_m - h / 2.0).abs() < 1e-12);
        let expected_height = (f_soil * h / 3.0 + f_q * h / 2.0) / (f_soil + f_q);
        assert!((ext.total.height_m - expected_height).abs() < 1e-12);
        // surcharge over the block column is live: weight recorded, never stabilizing
        assert!(loads.surcharge_weight.is_some());
        assert!(loads.stabilizing_surcharge().is_none());
    }

    #[test]
    fn test_distant_strip_loads_lower_band() {
        let wall = wall(&[]);
        let soils = SoilProfile::uniform(SoilProperties::granular(18.0, 30.0));
        let strip = Surcharge {
            offset_m: 0.5,
            width_m: Some(0.2),
            ..Surcharge::uniform(10.0)
        };
        let loads = LoadModel::build(&wall, &soils, Some(&strip), &rankine()).unwrap();
        let (z1, z2) = loads.external.surcharge_band_m.unwrap();
        let slope = 3f64.sqrt();
        assert!((z1 - 0.2 * slope).abs() < 1e-12);
        assert!((z2 - 0.4 * slope).abs() < 1e-12);
        assert!(loads.surcharge_weight.is_none());
    }

    #[test]
    fn test_cohesion_tension_crack() {
        let wall = wall(&[]);
        let soil = SoilProperties {
            cohesion_kpa: 2.0,
            ..SoilProperties::granular(18.0, 30.0)
        };
        let loads = LoadModel::build(&wall, &SoilProfile::uniform(soil), None, &rankine()).unwrap();
        let ext = &loads.external;
        let ka = ext.coefficient.ka;
        let z_c = 2.0 * 2.0 / (18.0 * ka.sqrt());
        assert!((ext.tension_crack_depth_m - z_c).abs() < 1e-12);
        assert_eq!(ext.horizontal_pressure_at(z_c / 2.0), 0.0);
        let h = wall.height_m;
        let expected = 0.5 * (ka * 18.0 * h - 2.0 * 2.0 * ka.sqrt()) * (h - z_c);
        assert!((ext.total.horizontal_kn_m - expected).abs() < 1e-9);
    }

    #[test]
    fn test_coulomb_components() {
        let wall = wall(&[]);
        let soils = SoilProfile::uniform(SoilProperties::granular(18.0, 30.0));
        let loads = LoadModel::build(&wall, &soils, None, &PressureSettings::default()).unwrap();
        let ext = &loads.external;
        let delta = ext.coefficient.wall_friction_deg.to_radians();
        let ratio = ext.total.vertical_kn_m / ext.total.horizontal_kn_m;
        assert!((ratio - delta.tan()).abs() < 1e-12);
        assert!((ext.total.x_m - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_reinforced_states_use_their_own_soils() {
        let wall = wall(&[grid(0.4), grid(0.8)]);
        let soils = SoilProfile {
            retained: SoilProperties::granular(18.0, 28.0),
            reinforced: Some(SoilProperties::granular(20.0, 34.0)),
            foundation: None,
        };
        let loads = LoadModel::build(&wall, &soils, None, &rankine()).unwrap();
        assert_eq!(loads.internal.zone, "reinforced");
        assert_eq!(loads.external.zone, "retained");
        assert!(loads.internal.coefficient.ka < loads.external.coefficient.ka);
        assert!((loads.external.total.x_m - 1.0).abs() < 1e-12);
        assert!(loads.self_weight.soil_kn_m > 0.0);

        let total = loads.internal.total.horizontal_kn_m;
        let split = loads.internal.horizontal_force_between(0.0, 0.6) + loads.internal.horizontal_force_between(0.6, wall.height_m);
        assert!((total - split).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_soil_fails_fast() {
        let wall = wall(&[]);
        let soils = SoilProfile::uniform(SoilProperties::granular(18.0, 95.0));
        assert!(LoadModel::build(&wall, &soils, None, &rankine()).is_err());

        let soils = SoilProfile::uniform(SoilProperties::granular(18.0, 30.0));
        let steep = PressureSettings {
            backslope_deg: 35.0,
            ..rankine()
        };
        assert!(matches!(
            LoadModel::build(&wall, &soils, None, &steep),
            Err(LoadModelError::BackslopeTooSteep { .. })
        ));
    }
}
