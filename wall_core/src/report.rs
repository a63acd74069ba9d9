//! # Design Report
//!
//! Aggregates the failure mode results into the single artifact handed to
//! the renderer and dumped as JSON. The report never alters a result; it
//! only derives the overall verdict, the governing mode and the warnings.
//!
//! Nothing time or run dependent is stored here, so the same input always
//! produces an identical report.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::{AnalysisOptions, PreparedWall};
use crate::equations::registry::{load_model_equations, Equation, EquationTracker};
use crate::failure_modes::{CheckStatus, FailureMode, FailureModeResult};
use crate::geometry::{GeogridLayer, WallGeometry};
use crate::loads::{EarthPressureTheory, LoadModel, SoilProfile};

/// Non-fatal notice that a mode did not reach its required FOS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureModeWarning {
    pub mode: FailureMode,
    pub factor_of_safety: f64,
    pub required: f64,
    pub message: String,
}

/// Derived parameters listed in the report, external pressure state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedParameters {
    /// X_batt (m)
    pub batter_offset_m: f64,
    /// ω (deg)
    pub batter_angle_deg: f64,
    /// δ_eff (deg)
    pub wall_friction_deg: f64,
    pub ka: f64,
    /// F_a, soil resultant along its line of action (kN/m)
    pub active_force_kn_m: f64,
    pub active_horizontal_kn_m: f64,
    pub active_vertical_kn_m: f64,
    /// y of the active force above the base (m)
    pub active_height_m: f64,
    /// x of the vertical component from the toe (m)
    pub active_x_m: f64,
    pub block_weight_kn_m: f64,
    pub soil_weight_kn_m: f64,
    pub centroid_x_m: f64,
    /// V_t, self weight plus every vertical load on the base (kN/m)
    pub total_vertical_kn_m: f64,
}

impl DerivedParameters {
    fn from_loads(geometry: &WallGeometry, loads: &LoadModel) -> Self {
        let external = &loads.external;
        let soil = &external.soil_force;
        let surcharge = loads.surcharge_weight.map(|w| w.force_kn_m).unwrap_or(0.0);
        DerivedParameters {
            batter_offset_m: geometry.batter_offset_m,
            batter_angle_deg: geometry.batter_angle_deg,
            wall_friction_deg: external.coefficient.wall_friction_deg,
            ka: external.coefficient.ka,
            active_force_kn_m: soil.horizontal_kn_m.hypot(soil.vertical_kn_m),
            active_horizontal_kn_m: soil.horizontal_kn_m,
            active_vertical_kn_m: soil.vertical_kn_m,
            active_height_m: soil.height_m,
            active_x_m: soil.x_m,
            block_weight_kn_m: loads.self_weight.block_kn_m,
            soil_weight_kn_m: loads.self_weight.soil_kn_m,
            centroid_x_m: loads.self_weight.centroid_x_m,
            total_vertical_kn_m: loads.self_weight.total_kn_m + external.total.vertical_kn_m + surcharge,
        }
    }
}

/// Complete outcome of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignReport {
    pub geometry: WallGeometry,
    pub layers: Vec<GeogridLayer>,
    pub soils: SoilProfile,
    pub options: AnalysisOptions,
    pub derived: DerivedParameters,
    pub loads: LoadModel,
    /// In [`FailureMode::ALL`] order
    pub results: Vec<FailureModeResult>,
    /// True when no applicable mode fails
    pub acceptable: bool,
    /// Mode with the lowest FOS / required FOS
    pub governing_mode: Option<FailureMode>,
    pub warnings: Vec<FailureModeWarning>,
}

impl DesignReport {
    pub fn from_results(wall: &PreparedWall, mut results: Vec<FailureModeResult>) -> Self {
        results.sort_by_key(|r| FailureMode::ALL.iter().position(|m| *m == r.mode));

        let acceptable = results
            .iter()
            .filter(|r| r.is_applicable())
            .all(|r| r.status != CheckStatus::Fail);

        let governing_mode = results
            .iter()
            .filter(|r| r.is_applicable())
            .filter_map(|r| r.utilization_margin().map(|m| (m, r.mode)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, mode)| mode);

        let warnings: Vec<FailureModeWarning> = results
            .iter()
            .filter(|r| r.status == CheckStatus::Fail)
            .map(|r| {
                let fos = r.factor_of_safety.unwrap_or(0.0);
                FailureModeWarning {
                    mode: r.mode,
                    factor_of_safety: fos,
                    required: r.required_factor_of_safety,
                    message: format!(
                        "{} factor of safety {:.2} is below the required {:.2}",
                        r.name, fos, r.required_factor_of_safety
                    ),
                }
            })
            .collect();
        for warning in &warnings {
            warn!(mode = ?warning.mode, fos = warning.factor_of_safety, required = warning.required, "{}", warning.message);
        }
        info!(acceptable, governing = ?governing_mode, "design verdict");

        DesignReport {
            geometry: wall.geometry.clone(),
            layers: wall.layers.clone(),
            soils: wall.soils.clone(),
            options: wall.options.clone(),
            derived: DerivedParameters::from_loads(&wall.geometry, &wall.loads),
            loads: wall.loads.clone(),
            results,
            acceptable,
            governing_mode,
            warnings,
        }
    }

    pub fn result(&self, mode: FailureMode) -> Option<&FailureModeResult> {
        self.results.iter().find(|r| r.mode == mode)
    }

    /// Console summary: one line per mode plus the verdict
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.results.iter().map(FailureModeResult::summary_line).collect();
        let verdict = if self.acceptable { "ACCEPTABLE" } else { "NOT ACCEPTABLE" };
        match self.governing_mode {
            Some(mode) => lines.push(format!("Design {verdict} (governing: {})", mode.display_name())),
            None => lines.push(format!("Design {verdict}")),
        }
        lines
    }

    /// Every equation the analysis applied, for the report appendix
    pub fn equations_used(&self) -> EquationTracker {
        let mut tracker = EquationTracker::new();
        let coulomb = self.options.theory == EarthPressureTheory::Coulomb;
        for equation in load_model_equations(coulomb, self.geometry.is_reinforced()) {
            tracker.record(equation, "Load model");
        }
        for result in self.results.iter().filter(|r| r.is_applicable()) {
            for &equation in result.mode.equations() {
                if equation == Equation::PassiveResistance && !self.options.include_passive_resistance {
                    continue;
                }
                if result.elements.is_empty() {
                    tracker.record(equation, result.name.clone());
                } else {
                    for element in &result.elements {
                        tracker.record_for_element(equation, result.name.clone(), element.label.clone());
                    }
                }
            }
        }
        tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, fixtures};

    #[test]
    fn test_scenario_report() {
        let report = analyze(&fixtures::scenario()).unwrap();
        assert!(report.acceptable);
        assert!(report.warnings.is_empty());
        // ultimate bearing: about 3.24 / 2.0, below sliding at 3.18 / 1.5
        assert_eq!(report.governing_mode, Some(FailureMode::UltimateBearing));
        let margins: Vec<f64> = report.results.iter().filter_map(|r| r.utilization_margin()).collect();
        let lowest = margins.iter().cloned().fold(f64::INFINITY, f64::min);
        let governing = report.result(report.governing_mode.unwrap()).unwrap();
        assert_eq!(governing.utilization_margin(), Some(lowest));

        assert!((report.derived.ka - 1.0 / 3.0).abs() < 1e-12);
        assert!((report.derived.active_force_kn_m - 4.236_472_8).abs() < 1e-6);
        assert!((report.derived.total_vertical_kn_m - 23.300_600_4).abs() < 1e-6);
    }

    #[test]
    fn test_failing_mode_makes_design_unacceptable() {
        let mut input = fixtures::scenario();
        input.factors.sliding = 4.0;
        let report = analyze(&input).unwrap();
        assert!(!report.acceptable);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].mode, FailureMode::Sliding);
        assert_eq!(report.governing_mode, Some(FailureMode::Sliding));
        assert!(report.summary_lines().last().unwrap().contains("NOT ACCEPTABLE"));
    }

    #[test]
    fn test_not_applicable_modes_do_not_decide() {
        let report = analyze(&fixtures::scenario()).unwrap();
        let rupture = report.result(FailureMode::GeogridRupture).unwrap();
        assert_eq!(rupture.status, CheckStatus::NotApplicable);
        assert!(report.acceptable);
        assert_eq!(report.summary_lines().len(), FailureMode::ALL.len() + 1);
    }

    #[test]
    fn test_equations_used() {
        let report = analyze(&fixtures::reinforced()).unwrap();
        let tracker = report.equations_used();
        let unique = tracker.unique_equations();
        assert!(unique.contains(&Equation::CoulombActiveCoefficient));
        assert!(unique.contains(&Equation::PulloutResistance));
        assert!(!unique.contains(&Equation::PassiveResistance));
        assert!(!unique.contains(&Equation::CourseInterfaceShear));
        let pullout_layers = tracker
            .usages()
            .iter()
            .filter(|u| u.equation == Equation::PulloutResistance)
            .count();
        assert_eq!(pullout_layers, 3);
    }

    #[test]
    fn test_report_json_roundtrip_is_stable() {
        let report = analyze(&fixtures::reinforced()).unwrap();
        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: DesignReport = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string_pretty(&parsed).unwrap(), json);
    }
}
