//! Base pressure under the structure and the foundation's capacity to carry it.
//!
//! Both bearing modes share one [`BaseReaction`]. All surcharge on the
//! structure counts as vertical load here, live or dead: bearing is the one
//! check where more load is never favourable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FailureMode, FailureModeResult};
use crate::analysis::AnalysisContext;
use crate::errors::{CalcError, CalcResult, LoadModelError};

/// Shape of the contact pressure under the base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum BearingDistribution {
    /// Resultant inside the middle third, full contact
    Trapezoidal { max_kpa: f64, min_kpa: f64 },
    /// Resultant outside the middle third, zero pressure at the far edge
    Triangular { max_kpa: f64, contact_length_m: f64 },
    /// Resultant outside the base: the wall overturns
    OutsideBase,
}

impl BearingDistribution {
    pub fn max_pressure_kpa(&self) -> Option<f64> {
        match self {
            BearingDistribution::Trapezoidal { max_kpa, .. } | BearingDistribution::Triangular { max_kpa, .. } => {
                Some(*max_kpa)
            }
            BearingDistribution::OutsideBase => None,
        }
    }
}

/// Pressure distribution for vertical load `V` on a base of width `B` with
/// eccentricity `e` (positive toward the toe).
///
/// ```rust
/// use wall_core::failure_modes::bearing::{bearing_distribution, BearingDistribution};
///
/// let centred = bearing_distribution(30.0, 1.5, 0.0);
/// assert_eq!(centred, BearingDistribution::Trapezoidal { max_kpa: 20.0, min_kpa: 20.0 });
/// ```
pub fn bearing_distribution(vertical_kn_m: f64, base_width_m: f64, eccentricity_m: f64) -> BearingDistribution {
    let e = eccentricity_m.abs();
    if e <= base_width_m / 6.0 {
        let mean = vertical_kn_m / base_width_m;
        let spread = 6.0 * e / base_width_m;
        return BearingDistribution::Trapezoidal {
            max_kpa: mean * (1.0 + spread),
            min_kpa: mean * (1.0 - spread),
        };
    }
    let a = base_width_m / 2.0 - e;
    if a <= 0.0 {
        return BearingDistribution::OutsideBase;
    }
    BearingDistribution::Triangular {
        max_kpa: 2.0 * vertical_kn_m / (3.0 * a),
        contact_length_m: 3.0 * a,
    }
}

/// Resultant of every load on the base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseReaction {
    /// V (kN/m)
    pub vertical_kn_m: f64,
    /// Σ M_r including all surcharge (kN·m/m)
    pub restoring_moment: f64,
    /// Σ M_o (kN·m/m)
    pub overturning_moment: f64,
    /// x̄ from the toe (m)
    pub resultant_x_m: f64,
    /// e = B/2 − x̄ (m)
    pub eccentricity_m: f64,
    pub base_width_m: f64,
    pub distribution: BearingDistribution,
}

pub fn base_reaction(ctx: &AnalysisContext) -> CalcResult<BaseReaction> {
    let loads = ctx.loads;
    let external = &loads.external;
    let weight = &loads.self_weight;

    let (surcharge, surcharge_moment) = loads
        .surcharge_weight
        .map(|w| (w.force_kn_m, w.force_kn_m * w.x_m))
        .unwrap_or((0.0, 0.0));

    let vertical = weight.total_kn_m + external.total.vertical_kn_m + surcharge;
    if !(vertical > 0.0) {
        return Err(CalcError::calculation_failed(
            "bearing",
            format!("total vertical load on the base is {vertical} kN/m"),
        ));
    }

    let restoring = weight.moment_about_toe() + external.total.restoring_moment() + surcharge_moment;
    let overturning = external.total.overturning_moment();
    let resultant_x_m = (restoring - overturning) / vertical;
    let base_width_m = ctx.geometry.base_width_m;
    let eccentricity_m = base_width_m / 2.0 - resultant_x_m;
    let distribution = bearing_distribution(vertical, base_width_m, eccentricity_m);

    debug!(vertical, resultant_x_m, eccentricity_m, ?distribution, "base reaction");

    Ok(BaseReaction {
        vertical_kn_m: vertical,
        restoring_moment: restoring,
        overturning_moment: overturning,
        resultant_x_m,
        eccentricity_m,
        base_width_m,
        distribution,
    })
}

fn with_reaction(result: FailureModeResult, reaction: &BaseReaction) -> FailureModeResult {
    let result = result
        .quantity("V", "Total vertical load on the base", reaction.vertical_kn_m, "kN/m")
        .quantity("sum M_r", "Restoring moment, all surcharge included", reaction.restoring_moment, "kN·m/m")
        .quantity("sum M_o", "Overturning moment", reaction.overturning_moment, "kN·m/m")
        .quantity("overline(x)", "Resultant from the toe", reaction.resultant_x_m, "m")
        .quantity("e", "Eccentricity from the base centre", reaction.eccentricity_m, "m")
        .quantity("B", "Base width", reaction.base_width_m, "m");
    match reaction.distribution {
        BearingDistribution::Trapezoidal { max_kpa, min_kpa } => result
            .quantity("sigma_(\"max\")", "Peak base pressure", max_kpa, "kPa")
            .quantity("sigma_(\"min\")", "Minimum base pressure", min_kpa, "kPa"),
        BearingDistribution::Triangular { max_kpa, contact_length_m } => result
            .quantity("sigma_(\"max\")", "Peak base pressure", max_kpa, "kPa")
            .quantity("3a", "Length of base in contact", contact_length_m, "m")
            .note("Resultant outside the middle third; triangular pressure with partial contact."),
        BearingDistribution::OutsideBase => result,
    }
}

fn outside_base(mode: FailureMode, ctx: &AnalysisContext, resisting: f64, reaction: &BaseReaction) -> FailureModeResult {
    let mut result = FailureModeResult::not_applicable(
        mode,
        ctx.factors,
        "Resultant falls outside the base; the wall overturns.",
    )
    .failed(0.0);
    result.resisting = resisting;
    with_reaction(result, reaction)
}

/// Peak base pressure against the allowable bearing pressure, when one is given
pub fn evaluate_allowable(ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
    let mode = FailureMode::BearingPressure;
    let Some(allowable) = ctx.options.allowable_bearing_kpa else {
        return Ok(FailureModeResult::not_applicable(
            mode,
            ctx.factors,
            "No allowable bearing pressure supplied.",
        ));
    };
    if !allowable.is_finite() || allowable <= 0.0 {
        return Err(CalcError::invalid_input(
            "analysis.allowable_bearing_kpa",
            allowable.to_string(),
            "must be positive",
        ));
    }

    let reaction = base_reaction(ctx)?;
    let Some(sigma_max) = reaction.distribution.max_pressure_kpa() else {
        return Ok(outside_base(mode, ctx, allowable, &reaction));
    };
    let result = FailureModeResult::single(mode, ctx.factors, sigma_max, allowable)
        .quantity("q_(\"allow\")", "Allowable bearing pressure", allowable, "kPa");
    Ok(with_reaction(result, &reaction))
}

/// Bearing capacity factors (N_q, N_c, N_γ) for a friction angle in degrees.
///
/// ```rust
/// use wall_core::failure_modes::bearing::bearing_capacity_factors;
///
/// let (nq, nc, ngamma) = bearing_capacity_factors(30.0).unwrap();
/// assert!((nq - 18.40).abs() < 0.01);
/// assert!((nc - 30.14).abs() < 0.01);
/// assert!((ngamma - 15.67).abs() < 0.01);
/// ```
pub fn bearing_capacity_factors(friction_angle_deg: f64) -> Result<(f64, f64, f64), LoadModelError> {
    if 1.4 * friction_angle_deg >= 90.0 {
        return Err(LoadModelError::undefined(
            "N_gamma",
            "foundation",
            format!("tan(1.4 phi) undefined for phi = {friction_angle_deg} deg"),
        ));
    }
    let phi = friction_angle_deg.to_radians();
    let nq = (std::f64::consts::PI * phi.tan()).exp() * (45.0 + friction_angle_deg / 2.0).to_radians().tan().powi(2);
    let nc = (nq - 1.0) / phi.tan();
    let ngamma = (nq - 1.0) * (1.4 * phi).tan();
    Ok((nq, nc, ngamma))
}

/// Peak base pressure against the ultimate bearing capacity of the foundation
pub fn evaluate_ultimate(ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
    let mode = FailureMode::UltimateBearing;
    let soil = ctx.soils.foundation_soil();
    let (nq, nc, ngamma) = bearing_capacity_factors(soil.friction_angle_deg)?;

    let footing = ctx.geometry.footing.as_ref();
    let width = footing.and_then(|f| f.width_m).unwrap_or(ctx.geometry.base_width_m);
    let depth = footing.map(|f| f.embedment_m).unwrap_or(0.0);
    let gamma = soil.unit_weight_kn_m3;
    let capacity = 0.5 * gamma * width * ngamma + soil.cohesion_kpa * nc + gamma * depth * nq;

    debug!(nq, nc, ngamma, capacity, "ultimate bearing");

    let reaction = base_reaction(ctx)?;
    let result = match reaction.distribution.max_pressure_kpa() {
        Some(sigma_max) => FailureModeResult::single(mode, ctx.factors, sigma_max, capacity),
        None => outside_base(mode, ctx, capacity, &reaction),
    };
    let result = result
        .quantity("N_q", "Bearing capacity factor", nq, "-")
        .quantity("N_c", "Bearing capacity factor", nc, "-")
        .quantity("N_gamma", "Bearing capacity factor", ngamma, "-")
        .quantity("B_f", "Bearing width", width, "m")
        .quantity("D", "Embedment depth", depth, "m")
        .quantity("q_f", "Ultimate bearing capacity", capacity, "kPa");
    Ok(if reaction.distribution == BearingDistribution::OutsideBase {
        result
    } else {
        with_reaction(result, &reaction)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{fixtures, PreparedWall};
    use crate::failure_modes::CheckStatus;

    #[test]
    fn test_distribution_is_continuous_at_middle_third() {
        let (v, b) = (40.0, 1.2);
        let inside = bearing_distribution(v, b, b / 6.0 - 1e-9);
        let outside = bearing_distribution(v, b, b / 6.0 + 1e-9);
        assert!(matches!(inside, BearingDistribution::Trapezoidal { .. }));
        assert!(matches!(outside, BearingDistribution::Triangular { .. }));
        let diff = inside.max_pressure_kpa().unwrap() - outside.max_pressure_kpa().unwrap();
        assert!(diff.abs() < 1e-6);
        assert!((inside.max_pressure_kpa().unwrap() - 2.0 * v / b).abs() < 1e-6);
    }

    #[test]
    fn test_distribution_sign_and_outside() {
        let toe = bearing_distribution(30.0, 1.5, 0.1);
        let heel = bearing_distribution(30.0, 1.5, -0.1);
        assert_eq!(toe.max_pressure_kpa(), heel.max_pressure_kpa());
        assert_eq!(bearing_distribution(30.0, 1.5, 0.8), BearingDistribution::OutsideBase);
    }

    #[test]
    fn test_scenario_base_reaction() {
        let wall = PreparedWall::prepare(&fixtures::scenario()).unwrap();
        let reaction = base_reaction(&wall.context()).unwrap();

        let w = fixtures::block_unit_weight() * 1.2 * 0.9;
        let m_o = 0.5 * fixtures::soil_unit_weight() * 1.44 / 3.0 * 0.4;
        let x_bar = (w * 0.45 - m_o) / w;
        assert!((reaction.vertical_kn_m - w).abs() < 1e-9);
        assert!((reaction.eccentricity_m - (0.45 - x_bar)).abs() < 1e-9);

        let expected_max = w / 0.9 * (1.0 + 6.0 * reaction.eccentricity_m / 0.9);
        assert_eq!(
            reaction.distribution,
            bearing_distribution(reaction.vertical_kn_m, 0.9, reaction.eccentricity_m)
        );
        assert!((reaction.distribution.max_pressure_kpa().unwrap() - expected_max).abs() < 1e-9);
    }

    #[test]
    fn test_allowable_requires_value() {
        let wall = PreparedWall::prepare(&fixtures::scenario()).unwrap();
        let result = evaluate_allowable(&wall.context()).unwrap();
        assert_eq!(result.status, CheckStatus::NotApplicable);

        let mut input = fixtures::scenario();
        input.options.allowable_bearing_kpa = Some(150.0);
        let wall = PreparedWall::prepare(&input).unwrap();
        let result = evaluate_allowable(&wall.context()).unwrap();
        assert_eq!(result.status, CheckStatus::Pass);
        assert!((result.resisting - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_ultimate_bearing() {
        let wall = PreparedWall::prepare(&fixtures::scenario()).unwrap();
        let result = evaluate_ultimate(&wall.context()).unwrap();
        let (_, _, ngamma) = bearing_capacity_factors(30.0).unwrap();
        let expected = 0.5 * fixtures::soil_unit_weight() * 0.9 * ngamma;
        assert!((result.resisting - expected).abs() < 1e-9);
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn test_steep_foundation_angle_fails_fast() {
        let err = bearing_capacity_factors(65.0).unwrap_err();
        assert!(matches!(err, LoadModelError::UndefinedCoefficient { .. }));
    }
}
