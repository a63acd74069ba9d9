//! # Analysis Pipeline
//!
//! `WallAnalysisInput` → [`PreparedWall`] (geometry, layers, load model) →
//! every [`FailureMode`] → [`DesignReport`].
//!
//! ```rust
//! use wall_core::analysis::{analyze, AnalysisOptions, WallAnalysisInput};
//! use wall_core::failure_modes::FactorsOfSafety;
//! use wall_core::geometry::CourseSpec;
//! use wall_core::loads::{SoilProfile, SoilProperties};
//!
//! let input = WallAnalysisInput {
//!     courses: (0..3).map(|i| CourseSpec::new(i as f64 * 0.4, 0.4, 0.9, 21.6)).collect(),
//!     geogrid: Vec::new(),
//!     footing: None,
//!     soils: SoilProfile::uniform(SoilProperties::granular(17.7, 30.0)),
//!     surcharge: None,
//!     options: AnalysisOptions::default(),
//!     factors: FactorsOfSafety::default(),
//! };
//!
//! let report = analyze(&input).unwrap();
//! assert_eq!(report.results.len(), 8);
//! assert!(report.acceptable);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::{CalcError, CalcResult};
use crate::failure_modes::course_sliding::CourseInterface;
use crate::failure_modes::{FactorsOfSafety, FailureMode, FailureModeResult};
use crate::geometry::{CourseSpec, Footing, GeogridLayer, GeogridSpec, WallGeometry};
use crate::loads::{
    EarthPressureTheory, LoadModel, PressureSettings, SoilProfile, SoilProperties, Surcharge,
    DEFAULT_WALL_FRICTION_RATIO,
};
use crate::report::DesignReport;

fn default_wall_friction_ratio() -> f64 {
    DEFAULT_WALL_FRICTION_RATIO
}

/// Analysis switches read from the `analysis` section of a design file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub theory: EarthPressureTheory,
    /// δ/φ for Coulomb
    #[serde(default = "default_wall_friction_ratio")]
    pub wall_friction_ratio: f64,
    /// Backslope i (deg)
    #[serde(default)]
    pub backslope_deg: f64,
    /// Count passive soil in front of the embedded toe against sliding
    #[serde(default)]
    pub include_passive_resistance: bool,
    /// Allowable bearing pressure (kPa); the bearing pressure check needs it
    #[serde(default, alias = "allowable_bearing")]
    pub allowable_bearing_kpa: Option<f64>,
    /// Interface shear properties; the course sliding check needs them
    #[serde(default)]
    pub course_interface: Option<CourseInterface>,
    /// Evaluate failure modes on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            theory: EarthPressureTheory::default(),
            wall_friction_ratio: DEFAULT_WALL_FRICTION_RATIO,
            backslope_deg: 0.0,
            include_passive_resistance: false,
            allowable_bearing_kpa: None,
            course_interface: None,
            parallel: false,
        }
    }
}

impl AnalysisOptions {
    pub fn pressure_settings(&self) -> PressureSettings {
        PressureSettings {
            theory: self.theory,
            wall_friction_ratio: self.wall_friction_ratio,
            backslope_deg: self.backslope_deg,
        }
    }
}

/// Everything the analysis needs, in SI units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallAnalysisInput {
    pub courses: Vec<CourseSpec>,
    pub geogrid: Vec<GeogridSpec>,
    pub footing: Option<Footing>,
    pub soils: SoilProfile,
    pub surcharge: Option<Surcharge>,
    pub options: AnalysisOptions,
    pub factors: FactorsOfSafety,
}

/// Read-only view handed to every failure mode.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub geometry: &'a WallGeometry,
    /// Top first
    pub layers: &'a [GeogridLayer],
    pub soils: &'a SoilProfile,
    pub loads: &'a LoadModel,
    pub factors: &'a FactorsOfSafety,
    pub options: &'a AnalysisOptions,
}

impl AnalysisContext<'_> {
    /// Soil under the structure's base: the infill under a reinforced mass,
    /// the foundation soil under a bare block column
    pub fn base_soil(&self) -> &SoilProperties {
        if self.geometry.is_reinforced() {
            self.soils.infill()
        } else {
            self.soils.foundation_soil()
        }
    }
}

/// Validated geometry and load model, ready for the failure modes.
#[derive(Debug, Clone)]
pub struct PreparedWall {
    pub geometry: WallGeometry,
    pub layers: Vec<GeogridLayer>,
    pub soils: SoilProfile,
    pub loads: LoadModel,
    pub factors: FactorsOfSafety,
    pub options: AnalysisOptions,
}

impl PreparedWall {
    /// Build the geometry and load model; fails fast on any invalid input
    pub fn prepare(input: &WallAnalysisInput) -> CalcResult<Self> {
        input.factors.validate()?;
        if let Some(interface) = &input.options.course_interface {
            interface.validate()?;
        }

        let (geometry, layers) = WallGeometry::build(&input.courses, &input.geogrid, input.footing.as_ref())?;
        info!(
            height_m = geometry.height_m,
            courses = geometry.courses.len(),
            layers = layers.len(),
            base_width_m = geometry.base_width_m,
            "geometry built"
        );

        let loads = LoadModel::build(
            &geometry,
            &input.soils,
            input.surcharge.as_ref(),
            &input.options.pressure_settings(),
        )?;
        info!(
            theory = loads.settings.theory.display_name(),
            external_ka = loads.external.coefficient.ka,
            external_force_kn_m = loads.external.total.horizontal_kn_m,
            "load model built"
        );

        Ok(PreparedWall {
            geometry,
            layers,
            soils: input.soils.clone(),
            loads,
            factors: input.factors,
            options: input.options.clone(),
        })
    }

    pub fn context(&self) -> AnalysisContext<'_> {
        AnalysisContext {
            geometry: &self.geometry,
            layers: &self.layers,
            soils: &self.soils,
            loads: &self.loads,
            factors: &self.factors,
            options: &self.options,
        }
    }

    /// Run every failure mode; results always come back in [`FailureMode::ALL`] order
    pub fn evaluate(&self) -> CalcResult<Vec<FailureModeResult>> {
        let ctx = self.context();
        if self.options.parallel {
            FailureMode::ALL.par_iter().map(|mode| mode.evaluate(&ctx)).collect()
        } else {
            FailureMode::ALL.iter().map(|mode| mode.evaluate(&ctx)).collect()
        }
    }
}

/// Run the full pipeline and aggregate the results.
#[instrument(skip(input), fields(courses = input.courses.len(), layers = input.geogrid.len()))]
pub fn analyze(input: &WallAnalysisInput) -> CalcResult<DesignReport> {
    let wall = PreparedWall::prepare(input)?;
    let results = wall.evaluate()?;
    info!(modes = results.len(), "failure modes evaluated");
    let report = DesignReport::from_results(&wall, results);
    if report.results.len() != FailureMode::ALL.len() {
        return Err(CalcError::calculation_failed(
            "analysis",
            format!("expected {} results, got {}", FailureMode::ALL.len(), report.results.len()),
        ));
    }
    Ok(report)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure_modes::CheckStatus;

    #[test]
    fn test_scenario_pinned_values() {
        let wall = PreparedWall::prepare(&fixtures::scenario()).unwrap();
        assert!((wall.loads.external.coefficient.ka - 1.0 / 3.0).abs() < 1e-12);
        assert!((wall.loads.external.total.horizontal_kn_m - 4.236_472_8).abs() < 1e-6);
        assert!((wall.loads.external.total.height_m - 0.4).abs() < 1e-12);
        assert!((wall.loads.self_weight.total_kn_m - 23.300_600_4).abs() < 1e-6);

        let report = analyze(&fixtures::scenario()).unwrap();
        let overturning = report.result(FailureMode::Overturning).unwrap();
        assert!((overturning.factor_of_safety.unwrap() - 6.1875).abs() < 1e-6);
        let sliding = report.result(FailureMode::Sliding).unwrap();
        assert!((sliding.factor_of_safety.unwrap() - 3.175_426_480_5).abs() < 1e-6);
        assert!(report.acceptable);
    }

    #[test]
    fn test_results_in_fixed_order() {
        let report = analyze(&fixtures::reinforced()).unwrap();
        let modes: Vec<FailureMode> = report.results.iter().map(|r| r.mode).collect();
        assert_eq!(modes, FailureMode::ALL.to_vec());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = analyze(&fixtures::reinforced()).unwrap();
        let mut input = fixtures::reinforced();
        input.options.parallel = true;
        let parallel = analyze(&input).unwrap();
        assert_eq!(sequential.results, parallel.results);
        assert_eq!(sequential.acceptable, parallel.acceptable);
    }

    #[test]
    fn test_repeat_runs_identical() {
        let first = analyze(&fixtures::reinforced()).unwrap();
        let second = analyze(&fixtures::reinforced()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_reinforced_base_uses_infill() {
        let wall = PreparedWall::prepare(&fixtures::reinforced()).unwrap();
        assert_eq!(wall.context().base_soil().friction_angle_deg, 34.0);
        let wall = PreparedWall::prepare(&fixtures::scenario()).unwrap();
        assert_eq!(wall.context().base_soil().friction_angle_deg, 30.0);
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let mut input = fixtures::scenario();
        input.courses.clear();
        assert!(matches!(analyze(&input), Err(CalcError::Geometry(_))));

        let mut input = fixtures::scenario();
        input.soils.retained.friction_angle_deg = 0.0;
        assert!(matches!(analyze(&input), Err(CalcError::LoadModel(_))));

        let mut input = fixtures::scenario();
        input.factors.sliding = -1.0;
        assert!(matches!(analyze(&input), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_options_parse_with_defaults() {
        let options: AnalysisOptions = serde_json::from_str(r#"{"theory": "rankine"}"#).unwrap();
        assert_eq!(options.theory, EarthPressureTheory::Rankine);
        assert_eq!(options.wall_friction_ratio, DEFAULT_WALL_FRICTION_RATIO);
        assert!(serde_json::from_str::<AnalysisOptions>(r#"{"theroy": "rankine"}"#).is_err());

        let report = analyze(&fixtures::scenario()).unwrap();
        assert_eq!(
            report.result(FailureMode::BearingPressure).unwrap().status,
            CheckStatus::NotApplicable
        );
    }
}
