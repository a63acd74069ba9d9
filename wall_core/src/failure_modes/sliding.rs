//! Sliding of the whole structure along its base.

use tracing::debug;

use super::{resisting_vertical, FailureMode, FailureModeResult};
use crate::analysis::AnalysisContext;
use crate::errors::CalcResult;
use crate::loads::passive_coefficient;

/// Passive resistance of the soil in front of the embedded toe (kN/m).
///
/// `½·Kp·γ_f·D² + 2·c_f·√Kp·D` with Rankine Kp of the foundation soil.
/// Zero without a footing embedment.
pub fn passive_resistance(ctx: &AnalysisContext) -> f64 {
    let depth = ctx.geometry.footing.as_ref().map(|f| f.embedment_m).unwrap_or(0.0);
    if depth <= 0.0 {
        return 0.0;
    }
    let soil = ctx.soils.foundation_soil();
    let kp = passive_coefficient(soil.friction_angle_deg);
    0.5 * kp * soil.unit_weight_kn_m3 * depth * depth + 2.0 * soil.cohesion_kpa * kp.sqrt() * depth
}

pub fn evaluate(ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
    let loads = ctx.loads;
    let external = &loads.external;

    let driving = external.total.horizontal_kn_m;
    let weight = loads.self_weight.total_kn_m;
    let (vertical, _) = resisting_vertical(loads);
    let surcharge = loads.stabilizing_surcharge().map(|w| w.force_kn_m).unwrap_or(0.0);
    let normal = weight + vertical + surcharge;

    let base_soil = ctx.base_soil();
    let mu = base_soil.friction_coefficient();
    let friction = normal * mu;
    let passive = if ctx.options.include_passive_resistance {
        passive_resistance(ctx)
    } else {
        0.0
    };
    let resisting = friction + passive;

    debug!(driving, normal, mu, passive, "sliding");

    let mut result = FailureModeResult::single(FailureMode::Sliding, ctx.factors, driving, resisting)
        .quantity("F_(\"ah\")", "Horizontal active force on the structure", external.soil_force.horizontal_kn_m, "kN/m")
        .quantity("F_(\"qh\")", "Horizontal surcharge force", external.surcharge_force.horizontal_kn_m, "kN/m")
        .quantity("W", "Self weight of the structure", weight, "kN/m")
        .quantity("F_(\"av\")", "Vertical active component counted as resisting", vertical, "kN/m")
        .quantity("W_(q,\"dead\")", "Dead surcharge over the structure", surcharge, "kN/m")
        .quantity("N", "Normal force on the base", normal, "kN/m")
        .quantity("phi_(\"base\")", "Friction angle at the base", base_soil.friction_angle_deg, "deg")
        .quantity("F_r", "Base friction resistance", friction, "kN/m");

    if ctx.options.include_passive_resistance {
        result = result.quantity("P_p", "Passive resistance at the toe", passive, "kN/m");
    } else {
        result = result.note("Passive resistance at the toe ignored.");
    }
    if loads.surcharge_weight.is_some_and(|w| w.live) {
        result = result.note("Live surcharge over the structure not counted as resisting.");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use crate::analysis::PreparedWall;
    use crate::failure_modes::CheckStatus;
    use crate::geometry::Footing;

    #[test]
    fn test_unreinforced_closed_form() {
        let wall = PreparedWall::prepare(&fixtures::scenario()).unwrap();
        let result = evaluate(&wall.context()).unwrap();

        let ka = 1.0 / 3.0;
        let pa = 0.5 * ka * fixtures::soil_unit_weight() * 1.2 * 1.2;
        let w = fixtures::block_unit_weight() * 1.2 * 0.9;
        let expected = w * 30f64.to_radians().tan() / pa;

        let fos = result.factor_of_safety.unwrap();
        assert!((fos - expected).abs() / expected < 1e-6);
        assert!((fos - 3.175_426_480_5).abs() < 1e-6);
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn test_passive_resistance_is_optional() {
        let mut input = fixtures::scenario();
        input.footing = Some(Footing {
            width_m: None,
            thickness_m: 0.15,
            embedment_m: 0.3,
        });
        let without = evaluate(&PreparedWall::prepare(&input).unwrap().context()).unwrap();

        input.options.include_passive_resistance = true;
        let wall = PreparedWall::prepare(&input).unwrap();
        let with = evaluate(&wall.context()).unwrap();

        let passive = 0.5 * 3.0 * fixtures::soil_unit_weight() * 0.09;
        assert!((passive_resistance(&wall.context()) - passive).abs() < 1e-9);
        assert!((with.resisting - without.resisting - passive).abs() < 1e-9);
    }
}
