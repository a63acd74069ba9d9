//! Rotation of the structure about its toe.

use tracing::debug;

use super::{resisting_vertical, FailureMode, FailureModeResult};
use crate::analysis::AnalysisContext;
use crate::errors::CalcResult;

pub fn evaluate(ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
    let loads = ctx.loads;
    let external = &loads.external;
    let weight = &loads.self_weight;

    let overturning = external.total.overturning_moment();

    let weight_moment = weight.moment_about_toe();
    let (vertical, vertical_moment) = resisting_vertical(loads);
    let surcharge_moment = loads
        .stabilizing_surcharge()
        .map(|w| w.force_kn_m * w.x_m)
        .unwrap_or(0.0);
    let restoring = weight_moment + vertical_moment + surcharge_moment;

    debug!(overturning, restoring, "overturning");

    Ok(FailureModeResult::single(FailureMode::Overturning, ctx.factors, overturning, restoring)
        .quantity("W_f", "Block weight", weight.block_kn_m, "kN/m")
        .quantity("W_s", "Reinforced soil weight", weight.soil_kn_m, "kN/m")
        .quantity("\"CM\"_x", "Centre of mass from the toe", weight.centroid_x_m, "m")
        .quantity("F_(\"ah\")", "Horizontal active force", external.soil_force.horizontal_kn_m, "kN/m")
        .quantity("y_a", "Height of the active force", external.soil_force.height_m, "m")
        .quantity("F_(\"qh\")", "Horizontal surcharge force", external.surcharge_force.horizontal_kn_m, "kN/m")
        .quantity("y_q", "Height of the surcharge force", external.surcharge_force.height_m, "m")
        .quantity("F_(\"av\")", "Vertical component counted as restoring", vertical, "kN/m")
        .quantity("x_a", "x of the vertical component", external.soil_force.x_m, "m")
        .quantity("M_o", "Overturning moment about the toe", overturning, "kN·m/m")
        .quantity("M_r", "Restoring moment about the toe", restoring, "kN·m/m"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{fixtures, PreparedWall};

    fn quantity(result: &FailureModeResult, symbol: &str) -> f64 {
        result.quantities.iter().find(|q| q.symbol == symbol).map(|q| q.value).unwrap()
    }

    #[test]
    fn test_scenario_moments() {
        let wall = PreparedWall::prepare(&fixtures::scenario()).unwrap();
        let result = evaluate(&wall.context()).unwrap();

        let gamma_s = fixtures::soil_unit_weight();
        let gamma_w = fixtures::block_unit_weight();
        let pa = 0.5 * gamma_s * 1.2 * 1.2 / 3.0;
        let m_o = pa * 0.4;
        let m_r = gamma_w * 1.2 * 0.9 * 0.45;

        assert!((result.driving - m_o).abs() / m_o < 1e-6);
        assert!((result.resisting - m_r).abs() / m_r < 1e-6);
        assert!((result.driving - 1.694_589_12).abs() < 1e-6);
        assert!((result.resisting - 10.485_270_18).abs() < 1e-6);
        assert!((result.factor_of_safety.unwrap() - 6.1875).abs() < 1e-6);
        assert!((quantity(&result, "M_o") - result.driving).abs() < 1e-12);
    }

    #[test]
    fn test_heavier_blocks_never_reduce_fos() {
        let mut previous = 0.0;
        for unit_weight in [16.0, 19.0, 21.6, 24.0] {
            let mut input = fixtures::scenario();
            for course in &mut input.courses {
                course.unit_weight_kn_m3 = unit_weight;
            }
            let wall = PreparedWall::prepare(&input).unwrap();
            let fos = evaluate(&wall.context()).unwrap().factor_of_safety.unwrap();
            assert!(fos >= previous);
            previous = fos;
        }
    }

    #[test]
    fn test_live_surcharge_only_drives() {
        let mut input = fixtures::scenario();
        input.surcharge = Some(crate::loads::Surcharge::uniform(10.0));
        let live = evaluate(&PreparedWall::prepare(&input).unwrap().context()).unwrap();

        let base = evaluate(&PreparedWall::prepare(&fixtures::scenario()).unwrap().context()).unwrap();
        assert!(live.driving > base.driving);
        assert!((live.resisting - base.resisting).abs() < 1e-12);

        if let Some(q) = input.surcharge.as_mut() {
            q.live = false;
        }
        let dead = evaluate(&PreparedWall::prepare(&input).unwrap().context()).unwrap();
        // 10 kPa over the 0.9 m block top, centred at 0.45 m
        assert!((dead.resisting - base.resisting - 10.0 * 0.9 * 0.45).abs() < 1e-9);
    }
}
