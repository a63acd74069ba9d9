//! Sliding of the block column along the interface between two courses.
//!
//! Only checked when the interface shear properties of the block system are
//! supplied in the analysis options.

use serde::{Deserialize, Serialize};

use super::{ElementCheck, FailureMode, FailureModeResult};
use crate::analysis::AnalysisContext;
use crate::errors::{CalcError, CalcResult};
use crate::geometry::ordinal;

/// Shear capacity `a_u + N·μ` of a course-to-course interface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourseInterface {
    /// a_u (kN/m)
    #[serde(default, alias = "shear_intercept")]
    pub shear_intercept_kn_m: f64,
    /// μ
    pub friction_coefficient: f64,
}

impl CourseInterface {
    pub fn validate(&self) -> CalcResult<()> {
        if !self.shear_intercept_kn_m.is_finite() || self.shear_intercept_kn_m < 0.0 {
            return Err(CalcError::invalid_input(
                "analysis.course_interface.shear_intercept_kn_m",
                self.shear_intercept_kn_m.to_string(),
                "must be non-negative",
            ));
        }
        if !self.friction_coefficient.is_finite() || self.friction_coefficient < 0.0 {
            return Err(CalcError::invalid_input(
                "analysis.course_interface.friction_coefficient",
                self.friction_coefficient.to_string(),
                "must be non-negative",
            ));
        }
        Ok(())
    }

    pub fn capacity_kn_m(&self, normal_kn_m: f64) -> f64 {
        self.shear_intercept_kn_m + normal_kn_m * self.friction_coefficient
    }
}

pub fn evaluate(ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
    let mode = FailureMode::CourseSliding;
    let Some(interface) = ctx.options.course_interface else {
        return Ok(FailureModeResult::not_applicable(
            mode,
            ctx.factors,
            "Course interface shear properties not supplied.",
        ));
    };
    let geometry = ctx.geometry;
    if geometry.courses.len() < 2 {
        return Ok(FailureModeResult::not_applicable(
            mode,
            ctx.factors,
            "Single course wall has no course interfaces.",
        ));
    }

    let required = mode.required(ctx.factors);
    let elements = geometry.courses[1..]
        .iter()
        .map(|course| {
            let elevation = course.base_elevation_m;
            let depth = geometry.height_m - elevation;
            let driving = ctx.loads.internal.horizontal_force_between(0.0, depth);
            let normal = geometry.block_weight_above(elevation);
            let capacity = interface.capacity_kn_m(normal);
            ElementCheck::new(format!("Top of {} course", ordinal(course.index)), driving, capacity, required)
                .detail("y", "Interface elevation", elevation, "m")
                .detail("F_h", "Internal horizontal force above", driving, "kN/m")
                .detail("N", "Block weight above", normal, "kN/m")
                .detail("V_u", "Interface shear capacity", capacity, "kN/m")
        })
        .collect();
    Ok(FailureModeResult::per_element(mode, ctx.factors, elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{fixtures, PreparedWall};
    use crate::failure_modes::CheckStatus;

    #[test]
    fn test_not_configured() {
        let wall = PreparedWall::prepare(&fixtures::scenario()).unwrap();
        let result = evaluate(&wall.context()).unwrap();
        assert_eq!(result.status, CheckStatus::NotApplicable);
    }

    #[test]
    fn test_interfaces() {
        let mut input = fixtures::scenario();
        input.options.course_interface = Some(CourseInterface {
            shear_intercept_kn_m: 2.0,
            friction_coefficient: 0.6,
        });
        let wall = PreparedWall::prepare(&input).unwrap();
        let result = evaluate(&wall.context()).unwrap();

        assert_eq!(result.elements.len(), 2);
        assert_eq!(result.elements[0].label, "Top of 1st course");
        assert_eq!(result.elements[1].label, "Top of 2nd course");

        // interface at 0.4 m carries the pressure over the top 0.8 m
        let gamma_s = fixtures::soil_unit_weight();
        let driving = 0.5 * gamma_s / 3.0 * 0.8 * 0.8;
        let normal = fixtures::block_unit_weight() * 0.8 * 0.9;
        let first = &result.elements[0];
        assert!((first.driving - driving).abs() < 1e-9);
        assert!((first.resisting - (2.0 + 0.6 * normal)).abs() < 1e-9);
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn test_validation() {
        let bad = CourseInterface {
            shear_intercept_kn_m: -1.0,
            friction_coefficient: 0.5,
        };
        assert!(bad.validate().is_err());
    }
}
