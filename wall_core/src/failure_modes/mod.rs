//! # Failure Modes
//!
//! Each way the wall can fail is one [`FailureMode`] variant. Every variant
//! reads the same [`AnalysisContext`] (geometry, layers, soils, load model,
//! required factors of safety) and produces an immutable
//! [`FailureModeResult`]. No evaluator reads another evaluator's output, so
//! they can run in any order or in parallel.
//!
//! ## Factor of safety
//!
//! `FOS = resisting / driving`. When the driving quantity is negligible
//! (≤ 1e-12) the check is [`CheckStatus::NotApplicable`] and the FOS is
//! `None`, so no infinity or NaN ever reaches the report.

pub mod bearing;
pub mod course_sliding;
pub mod geogrid;
pub mod overturning;
pub mod sliding;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisContext;
use crate::equations::registry::Equation;
use crate::errors::{CalcError, CalcResult};
use crate::loads::LoadModel;

/// Driving quantities at or below this are treated as zero
pub const DRIVING_EPSILON: f64 = 1e-12;

// ============================================================================
// Modes
// ============================================================================

/// The closed set of checks run on every wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    Sliding,
    Overturning,
    BearingPressure,
    UltimateBearing,
    GeogridRupture,
    GeogridPullout,
    GeogridConnection,
    CourseSliding,
}

impl FailureMode {
    /// Every mode, in report order
    pub const ALL: [FailureMode; 8] = [
        FailureMode::Sliding,
        FailureMode::Overturning,
        FailureMode::BearingPressure,
        FailureMode::UltimateBearing,
        FailureMode::GeogridRupture,
        FailureMode::GeogridPullout,
        FailureMode::GeogridConnection,
        FailureMode::CourseSliding,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            FailureMode::Sliding => "Base Sliding",
            FailureMode::Overturning => "Overturning",
            FailureMode::BearingPressure => "Bearing Pressure",
            FailureMode::UltimateBearing => "Ultimate Bearing Capacity",
            FailureMode::GeogridRupture => "Geogrid Rupture",
            FailureMode::GeogridPullout => "Geogrid Pullout",
            FailureMode::GeogridConnection => "Geogrid Connection",
            FailureMode::CourseSliding => "Internal Course Sliding",
        }
    }

    /// What the driving and resisting quantities measure
    pub fn driving_kind(&self) -> QuantityKind {
        match self {
            FailureMode::Overturning => QuantityKind::Moment,
            FailureMode::BearingPressure | FailureMode::UltimateBearing => QuantityKind::Pressure,
            _ => QuantityKind::Force,
        }
    }

    /// Minimum acceptable factor of safety
    pub fn required(&self, factors: &FactorsOfSafety) -> f64 {
        match self {
            FailureMode::Sliding => factors.sliding,
            FailureMode::Overturning => factors.overturning,
            FailureMode::BearingPressure => factors.bearing_pressure,
            FailureMode::UltimateBearing => factors.ultimate_bearing,
            FailureMode::GeogridRupture => factors.geogrid_rupture,
            FailureMode::GeogridPullout => factors.geogrid_pullout,
            FailureMode::GeogridConnection => factors.geogrid_connection,
            FailureMode::CourseSliding => factors.course_sliding,
        }
    }

    /// Equations this mode applies, in order of use
    pub fn equations(&self) -> &'static [Equation] {
        match self {
            FailureMode::Sliding => &[
                Equation::SlidingResistance,
                Equation::PassiveResistance,
                Equation::FactorOfSafety,
            ],
            FailureMode::Overturning => &[Equation::OverturningMoments, Equation::FactorOfSafety],
            FailureMode::BearingPressure => &[
                Equation::BearingEccentricity,
                Equation::BearingPressureDistribution,
                Equation::FactorOfSafety,
            ],
            FailureMode::UltimateBearing => &[
                Equation::BearingEccentricity,
                Equation::BearingPressureDistribution,
                Equation::BearingCapacityFactors,
                Equation::UltimateBearingCapacity,
                Equation::FactorOfSafety,
            ],
            FailureMode::GeogridRupture => &[
                Equation::TributaryLayerLoad,
                Equation::LongTermAllowableStrength,
                Equation::FactorOfSafety,
            ],
            FailureMode::GeogridPullout => &[
                Equation::TributaryLayerLoad,
                Equation::PulloutEmbedment,
                Equation::PulloutResistance,
                Equation::FactorOfSafety,
            ],
            FailureMode::GeogridConnection => &[
                Equation::TributaryLayerLoad,
                Equation::ConnectionStrength,
                Equation::FactorOfSafety,
            ],
            FailureMode::CourseSliding => &[Equation::CourseInterfaceShear, Equation::FactorOfSafety],
        }
    }

    /// Run this check against the shared context
    pub fn evaluate(&self, ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
        match self {
            FailureMode::Sliding => sliding::evaluate(ctx),
            FailureMode::Overturning => overturning::evaluate(ctx),
            FailureMode::BearingPressure => bearing::evaluate_allowable(ctx),
            FailureMode::UltimateBearing => bearing::evaluate_ultimate(ctx),
            FailureMode::GeogridRupture => geogrid::evaluate_rupture(ctx),
            FailureMode::GeogridPullout => geogrid::evaluate_pullout(ctx),
            FailureMode::GeogridConnection => geogrid::evaluate_connection(ctx),
            FailureMode::CourseSliding => course_sliding::evaluate(ctx),
        }
    }
}

// ============================================================================
// Required factors of safety
// ============================================================================

fn default_fos() -> f64 {
    1.5
}

fn default_bearing_fos() -> f64 {
    2.0
}

/// Minimum factors of safety per mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorsOfSafety {
    #[serde(default = "default_fos")]
    pub sliding: f64,
    #[serde(default = "default_fos")]
    pub overturning: f64,
    #[serde(default = "default_bearing_fos")]
    pub bearing_pressure: f64,
    #[serde(default = "default_bearing_fos")]
    pub ultimate_bearing: f64,
    #[serde(default = "default_fos")]
    pub geogrid_rupture: f64,
    #[serde(default = "default_fos")]
    pub geogrid_pullout: f64,
    #[serde(default = "default_fos")]
    pub geogrid_connection: f64,
    #[serde(default = "default_fos")]
    pub course_sliding: f64,
}

impl Default for FactorsOfSafety {
    fn default() -> Self {
        FactorsOfSafety {
            sliding: default_fos(),
            overturning: default_fos(),
            bearing_pressure: default_bearing_fos(),
            ultimate_bearing: default_bearing_fos(),
            geogrid_rupture: default_fos(),
            geogrid_pullout: default_fos(),
            geogrid_connection: default_fos(),
            course_sliding: default_fos(),
        }
    }
}

impl FactorsOfSafety {
    pub fn validate(&self) -> CalcResult<()> {
        for mode in FailureMode::ALL {
            let value = mode.required(self);
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(
                    format!("factors_of_safety.{}", mode_key(mode)),
                    value.to_string(),
                    "required factor of safety must be positive",
                ));
            }
        }
        Ok(())
    }
}

fn mode_key(mode: FailureMode) -> &'static str {
    match mode {
        FailureMode::Sliding => "sliding",
        FailureMode::Overturning => "overturning",
        FailureMode::BearingPressure => "bearing_pressure",
        FailureMode::UltimateBearing => "ultimate_bearing",
        FailureMode::GeogridRupture => "geogrid_rupture",
        FailureMode::GeogridPullout => "geogrid_pullout",
        FailureMode::GeogridConnection => "geogrid_connection",
        FailureMode::CourseSliding => "course_sliding",
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    NotApplicable,
}

impl CheckStatus {
    fn from_fos(factor_of_safety: Option<f64>, required: f64) -> Self {
        match factor_of_safety {
            None => CheckStatus::NotApplicable,
            Some(fos) if fos >= required => CheckStatus::Pass,
            Some(_) => CheckStatus::Fail,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "OK",
            CheckStatus::Fail => "FAIL",
            CheckStatus::NotApplicable => "N/A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    Force,
    Moment,
    Pressure,
}

impl QuantityKind {
    /// SI units of the driving and resisting values
    pub fn units(&self) -> &'static str {
        match self {
            QuantityKind::Force => "kN/m",
            QuantityKind::Moment => "kN·m/m",
            QuantityKind::Pressure => "kPa",
        }
    }
}

/// A named intermediate value shown in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Symbol in Typst math notation
    pub symbol: String,
    pub description: String,
    pub value: f64,
    pub units: String,
}

impl Quantity {
    pub fn new(symbol: impl Into<String>, description: impl Into<String>, value: f64, units: impl Into<String>) -> Self {
        Quantity {
            symbol: symbol.into(),
            description: description.into(),
            value,
            units: units.into(),
        }
    }
}

/// One check on one geogrid layer or course interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCheck {
    pub label: String,
    pub driving: f64,
    pub resisting: f64,
    pub factor_of_safety: Option<f64>,
    pub status: CheckStatus,
    pub details: Vec<Quantity>,
}

impl ElementCheck {
    pub fn new(label: impl Into<String>, driving: f64, resisting: f64, required: f64) -> Self {
        let factor_of_safety = factor_of_safety(driving, resisting);
        ElementCheck {
            label: label.into(),
            driving,
            resisting,
            factor_of_safety,
            status: CheckStatus::from_fos(factor_of_safety, required),
            details: Vec::new(),
        }
    }

    pub fn detail(mut self, symbol: &str, description: &str, value: f64, units: &str) -> Self {
        self.details.push(Quantity::new(symbol, description, value, units));
        self
    }
}

/// Outcome of one failure mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureModeResult {
    pub mode: FailureMode,
    pub name: String,
    pub driving_kind: QuantityKind,
    /// Governing driving quantity
    pub driving: f64,
    /// Governing resisting quantity
    pub resisting: f64,
    pub factor_of_safety: Option<f64>,
    pub required_factor_of_safety: f64,
    pub status: CheckStatus,
    pub quantities: Vec<Quantity>,
    /// Per layer or per interface checks; empty for whole-wall modes
    pub elements: Vec<ElementCheck>,
    pub notes: Vec<String>,
}

/// `resisting / driving`, or None when the driving quantity is negligible
pub fn factor_of_safety(driving: f64, resisting: f64) -> Option<f64> {
    if !driving.is_finite() || !resisting.is_finite() || driving <= DRIVING_EPSILON {
        return None;
    }
    Some(resisting / driving)
}

impl FailureModeResult {
    fn empty(mode: FailureMode, required: f64) -> Self {
        FailureModeResult {
            mode,
            name: mode.display_name().to_string(),
            driving_kind: mode.driving_kind(),
            driving: 0.0,
            resisting: 0.0,
            factor_of_safety: None,
            required_factor_of_safety: required,
            status: CheckStatus::NotApplicable,
            quantities: Vec::new(),
            elements: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Whole-wall check with one driving and one resisting quantity
    pub fn single(mode: FailureMode, factors: &FactorsOfSafety, driving: f64, resisting: f64) -> Self {
        let required = mode.required(factors);
        let fos = factor_of_safety(driving, resisting);
        let mut result = Self::empty(mode, required);
        result.driving = driving;
        result.resisting = resisting;
        result.factor_of_safety = fos;
        result.status = CheckStatus::from_fos(fos, required);
        if fos.is_none() {
            result.notes.push("Driving quantity is negligible; check not applicable.".to_string());
        }
        result
    }

    /// Check over several elements; the element with the lowest FOS governs.
    ///
    /// The mode fails when any element fails.
    pub fn per_element(mode: FailureMode, factors: &FactorsOfSafety, elements: Vec<ElementCheck>) -> Self {
        let mut result = Self::empty(mode, mode.required(factors));

        let governing = elements
            .iter()
            .filter_map(|e| e.factor_of_safety.map(|fos| (fos, e)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, e)| e);

        if let Some(g) = governing {
            result.driving = g.driving;
            result.resisting = g.resisting;
            result.factor_of_safety = g.factor_of_safety;
            result.status = if elements.iter().any(|e| e.status == CheckStatus::Fail) {
                CheckStatus::Fail
            } else {
                CheckStatus::Pass
            };
            result.notes.push(format!("Governed by {}.", g.label));
        } else {
            result.notes.push("No element carries a driving load; check not applicable.".to_string());
        }
        result.elements = elements;
        result
    }

    /// Mode that does not apply to this wall
    pub fn not_applicable(mode: FailureMode, factors: &FactorsOfSafety, note: impl Into<String>) -> Self {
        let mut result = Self::empty(mode, mode.required(factors));
        result.notes.push(note.into());
        result
    }

    pub fn quantity(mut self, symbol: &str, description: &str, value: f64, units: &str) -> Self {
        self.quantities.push(Quantity::new(symbol, description, value, units));
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Mark the mode failed regardless of the computed FOS
    pub fn failed(mut self, factor_of_safety: f64) -> Self {
        self.factor_of_safety = Some(factor_of_safety);
        self.status = CheckStatus::Fail;
        self
    }

    pub fn is_applicable(&self) -> bool {
        self.status != CheckStatus::NotApplicable
    }

    /// FOS over required FOS; the lowest ratio governs the design
    pub fn utilization_margin(&self) -> Option<f64> {
        self.factor_of_safety.map(|fos| fos / self.required_factor_of_safety)
    }

    /// One console line: `OK   Base Sliding  FOS 3.18 (min 1.50)`
    pub fn summary_line(&self) -> String {
        match self.factor_of_safety {
            Some(fos) => format!(
                "{:<4} {:<26} FOS {:>7.2} (min {:.2})",
                self.status.label(),
                self.name,
                fos,
                self.required_factor_of_safety
            ),
            None => format!("{:<4} {:<26} not applicable", self.status.label(), self.name),
        }
    }
}

/// Vertical earth-pressure components allowed to resist failure, as
/// (force kN/m, moment about the toe kN·m/m). The soil component always
/// counts; the surcharge component only for a dead surcharge.
pub(crate) fn resisting_vertical(loads: &LoadModel) -> (f64, f64) {
    let soil = &loads.external.soil_force;
    let mut force = soil.vertical_kn_m;
    let mut moment = soil.restoring_moment();
    if loads.surcharge_is_dead() {
        let q = &loads.external.surcharge_force;
        force += q.vertical_kn_m;
        moment += q.restoring_moment();
    }
    (force, moment)
}
