//! # Design Files
//!
//! A [`WallDesign`] is the strictly-typed form of a design file, in JSON or
//! TOML. It is parsed, never executed, and every section rejects unknown
//! fields. [`WallDesign::analysis_input`] converts it to SI and resolves the
//! course stack and geogrid placement into a [`WallAnalysisInput`].
//!
//! ```rust
//! use wall_core::config::WallDesign;
//!
//! let design = WallDesign::from_toml_str(r#"
//! [project]
//! title = "Garden wall"
//!
//! [courses.uniform]
//! count = 3
//! block = { height_m = 0.4, depth_m = 0.9, unit_weight_kn_m3 = 21.6 }
//!
//! [soil.retained]
//! unit_weight_kn_m3 = 17.7
//! friction_angle_deg = 30.0
//! "#).unwrap();
//!
//! let input = design.analysis_input().unwrap();
//! assert_eq!(input.courses.len(), 3);
//! assert!((input.courses[2].base_elevation_m - 0.8).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{AnalysisOptions, WallAnalysisInput};
use crate::errors::{CalcError, CalcResult};
use crate::failure_modes::FactorsOfSafety;
use crate::geometry::{ordinal, CourseSpec, Footing, GeogridSpec};
use crate::loads::{SoilProfile, SoilProperties, Surcharge};
use crate::project::{ProjectMetadata, SCHEMA_VERSION};
use crate::units::UnitSystem;

/// Tolerance on "wall height is a whole number of courses" (m)
const COURSE_MULTIPLE_TOLERANCE_M: f64 = 1e-5;

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_units() -> String {
    "si".to_string()
}

fn default_one() -> f64 {
    1.0
}

// ============================================================================
// Sections
// ============================================================================

/// One block as used in a uniform stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockSpec {
    #[serde(alias = "height")]
    pub height_m: f64,
    #[serde(alias = "depth")]
    pub depth_m: f64,
    #[serde(alias = "unit_weight")]
    pub unit_weight_kn_m3: f64,
    #[serde(default, alias = "length")]
    pub length_m: Option<f64>,
}

/// Identical courses stacked with a constant setback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniformStack {
    /// Number of courses; derived from `wall_height_m` when absent
    #[serde(default)]
    pub count: Option<usize>,
    /// Must be a whole number of block heights when given
    #[serde(default, alias = "wall_height")]
    pub wall_height_m: Option<f64>,
    pub block: BlockSpec,
    /// Setback of every course above the first (m)
    #[serde(default, alias = "setback")]
    pub setback_m: f64,
}

/// How the courses are described.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseLayout {
    Uniform(UniformStack),
    /// Bottom course first
    Explicit(Vec<CourseSpec>),
}

/// Properties shared by every layer of one geogrid product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeogridProduct {
    #[serde(alias = "ultimate_strength")]
    pub ultimate_strength_kn_m: f64,
    #[serde(default = "default_one")]
    pub reduction_factor: f64,
    #[serde(default, alias = "connection_intercept")]
    pub connection_intercept_kn_m: f64,
    #[serde(default)]
    pub connection_slope: f64,
    pub interaction_coefficient: f64,
    #[serde(default = "default_one")]
    pub coverage_ratio: f64,
}

/// A layer placed by depth below the top of the wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerPlacement {
    #[serde(alias = "depth")]
    pub depth_m: f64,
    /// Overrides the section's length
    #[serde(default, alias = "length")]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Geogrid layers, placed above given courses and/or at given depths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeogridConfig {
    pub product: GeogridProduct,
    /// Default grid length (m)
    #[serde(default, alias = "length")]
    pub length_m: Option<f64>,
    #[serde(default, alias = "front_offset")]
    pub front_offset_m: f64,
    /// 1-based course numbers, counted from the bottom
    #[serde(default)]
    pub above_courses: Vec<usize>,
    #[serde(default)]
    pub layers: Vec<LayerPlacement>,
}

/// A complete design file.
///
/// Field names carry SI suffixes (`height_m`, `unit_weight_kn_m3`,
/// `pressure_kpa`). With `units = "us_customary"` the same fields hold ft,
/// pcf, psf and lb/ft values, so every unit-bearing field also accepts its
/// unit-neutral name (`height`, `unit_weight`, `pressure`). Values are read in
/// the declared unit system either way and converted to SI once by
/// [`WallDesign::analysis_input`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WallDesign {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub project: ProjectMetadata,
    /// "si" or "us_customary"
    #[serde(default = "default_units")]
    pub units: String,
    pub courses: CourseLayout,
    #[serde(default)]
    pub geogrid: Option<GeogridConfig>,
    pub soil: SoilProfile,
    #[serde(default)]
    pub surcharge: Option<Surcharge>,
    #[serde(default)]
    pub footing: Option<Footing>,
    #[serde(default)]
    pub analysis: AnalysisOptions,
    #[serde(default)]
    pub factors_of_safety: FactorsOfSafety,
}

/// Parse a unit system name
pub fn parse_unit_system(name: &str) -> CalcResult<UnitSystem> {
    match name.trim().to_ascii_lowercase().as_str() {
        "si" | "metric" => Ok(UnitSystem::Si),
        "us_customary" | "us" | "imperial" => Ok(UnitSystem::UsCustomary),
        _ => Err(CalcError::UnknownUnits {
            units: name.to_string(),
        }),
    }
}

impl WallDesign {
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        serde_json::from_str(json).map_err(|e| CalcError::serialization(e.to_string()))
    }

    pub fn from_toml_str(toml: &str) -> CalcResult<Self> {
        toml::from_str(toml).map_err(|e| CalcError::serialization(e.to_string()))
    }

    pub fn unit_system(&self) -> CalcResult<UnitSystem> {
        parse_unit_system(&self.units)
    }

    /// Resolve the design into SI analysis input
    pub fn analysis_input(&self) -> CalcResult<WallAnalysisInput> {
        let units = self.unit_system()?;
        let courses = self.course_specs(units)?;
        let geogrid = match &self.geogrid {
            Some(config) => geogrid_specs(config, &courses, units)?,
            None => Vec::new(),
        };
        debug!(units = units.label(), courses = courses.len(), layers = geogrid.len(), "design resolved");

        let soil = |s: &SoilProperties| SoilProperties {
            unit_weight_kn_m3: units.unit_weight_kn_m3(s.unit_weight_kn_m3),
            friction_angle_deg: s.friction_angle_deg,
            cohesion_kpa: units.pressure_kpa(s.cohesion_kpa),
        };
        let soils = SoilProfile {
            retained: soil(&self.soil.retained),
            reinforced: self.soil.reinforced.as_ref().map(soil),
            foundation: self.soil.foundation.as_ref().map(soil),
        };

        let surcharge = self.surcharge.as_ref().map(|q| Surcharge {
            pressure_kpa: units.pressure_kpa(q.pressure_kpa),
            offset_m: units.length_m(q.offset_m),
            width_m: q.width_m.map(|w| units.length_m(w)),
            live: q.live,
        });

        let footing = self.footing.as_ref().map(|f| Footing {
            width_m: f.width_m.map(|w| units.length_m(w)),
            thickness_m: units.length_m(f.thickness_m),
            embedment_m: units.length_m(f.embedment_m),
        });

        let mut options = self.analysis.clone();
        options.allowable_bearing_kpa = options.allowable_bearing_kpa.map(|p| units.pressure_kpa(p));
        if let Some(interface) = options.course_interface.as_mut() {
            interface.shear_intercept_kn_m = units.line_force_kn_m(interface.shear_intercept_kn_m);
        }

        Ok(WallAnalysisInput {
            courses,
            geogrid,
            footing,
            soils,
            surcharge,
            options,
            factors: self.factors_of_safety,
        })
    }

    fn course_specs(&self, units: UnitSystem) -> CalcResult<Vec<CourseSpec>> {
        match &self.courses {
            CourseLayout::Explicit(specs) => Ok(specs
                .iter()
                .map(|c| CourseSpec {
                    base_elevation_m: units.length_m(c.base_elevation_m),
                    height_m: units.length_m(c.height_m),
                    depth_m: units.length_m(c.depth_m),
                    setback_m: units.length_m(c.setback_m),
                    unit_weight_kn_m3: units.unit_weight_kn_m3(c.unit_weight_kn_m3),
                    block_length_m: c.block_length_m.map(|l| units.length_m(l)),
                })
                .collect()),
            CourseLayout::Uniform(stack) => uniform_courses(stack, units),
        }
    }
}

fn uniform_courses(stack: &UniformStack, units: UnitSystem) -> CalcResult<Vec<CourseSpec>> {
    let height = units.length_m(stack.block.height_m);
    if !height.is_finite() || height <= 0.0 {
        return Err(CalcError::invalid_input(
            "courses.uniform.block.height_m",
            stack.block.height_m.to_string(),
            "block height must be positive",
        ));
    }

    let count = match (stack.count, stack.wall_height_m) {
        (count, Some(wall_height)) => {
            let wall_height = units.length_m(wall_height);
            let courses = (wall_height / height).round();
            if (courses * height - wall_height).abs() > COURSE_MULTIPLE_TOLERANCE_M {
                return Err(CalcError::invalid_input(
                    "courses.uniform.wall_height_m",
                    wall_height.to_string(),
                    format!("wall height is not a whole number of {height} m courses"),
                ));
            }
            let courses = courses as usize;
            if count.is_some_and(|c| c != courses) {
                return Err(CalcError::invalid_input(
                    "courses.uniform.count",
                    format!("{count:?}"),
                    format!("wall height holds {courses} courses"),
                ));
            }
            courses
        }
        (Some(count), None) => count,
        (None, None) => return Err(CalcError::missing_field("courses.uniform.count")),
    };

    let depth = units.length_m(stack.block.depth_m);
    let unit_weight = units.unit_weight_kn_m3(stack.block.unit_weight_kn_m3);
    let setback = units.length_m(stack.setback_m);
    let block_length = stack.block.length_m.map(|l| units.length_m(l));

    Ok((0..count)
        .map(|i| CourseSpec {
            base_elevation_m: i as f64 * height,
            height_m: height,
            depth_m: depth,
            setback_m: if i == 0 { 0.0 } else { setback },
            unit_weight_kn_m3: unit_weight,
            block_length_m: block_length,
        })
        .collect())
}

fn geogrid_specs(config: &GeogridConfig, courses: &[CourseSpec], units: UnitSystem) -> CalcResult<Vec<GeogridSpec>> {
    let product = &config.product;
    let wall_height: f64 = courses.iter().map(|c| c.height_m).sum();
    let default_length = config.length_m.map(|l| units.length_m(l));

    let spec = |depth_m: f64, length_m: f64, label: Option<String>| GeogridSpec {
        depth_m,
        length_m,
        front_offset_m: units.length_m(config.front_offset_m),
        ultimate_strength_kn_m: units.line_force_kn_m(product.ultimate_strength_kn_m),
        reduction_factor: product.reduction_factor,
        connection_intercept_kn_m: units.line_force_kn_m(product.connection_intercept_kn_m),
        connection_slope: product.connection_slope,
        interaction_coefficient: product.interaction_coefficient,
        coverage_ratio: product.coverage_ratio,
        label,
    };

    let mut specs = Vec::with_capacity(config.above_courses.len() + config.layers.len());
    for &n in &config.above_courses {
        if n == 0 || n >= courses.len() {
            return Err(CalcError::invalid_input(
                "geogrid.above_courses",
                n.to_string(),
                format!("must be between 1 and {} for a {}-course wall", courses.len().saturating_sub(1), courses.len()),
            ));
        }
        let length = default_length.ok_or_else(|| CalcError::missing_field("geogrid.length_m"))?;
        let top_of_course: f64 = courses[..n].iter().map(|c| c.height_m).sum();
        specs.push(spec(
            wall_height - top_of_course,
            length,
            Some(format!("Above {} course", ordinal(n))),
        ));
    }
    for (k, layer) in config.layers.iter().enumerate() {
        let length = layer
            .length_m
            .map(|l| units.length_m(l))
            .or(default_length)
            .ok_or_else(|| CalcError::missing_field(format!("geogrid.layers[{k}].length_m")))?;
        specs.push(spec(units.length_m(layer.depth_m), length, layer.label.clone()));
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESIGN_JSON: &str = r#"{
        "project": { "title": "Test wall", "job_id": "26-001" },
        "courses": { "uniform": {
            "wall_height_m": 1.8,
            "block": { "height_m": 0.2, "depth_m": 0.3, "unit_weight_kn_m3": 21.0 },
            "setback_m": 0.01
        } },
        "geogrid": {
            "product": { "ultimate_strength_kn_m": 40.0, "reduction_factor": 2.0, "interaction_coefficient": 0.8 },
            "length_m": 1.2,
            "above_courses": [2, 6],
            "layers": [ { "depth_m": 0.4, "length_m": 1.5 } ]
        },
        "soil": {
            "retained": { "unit_weight_kn_m3": 18.0, "friction_angle_deg": 30.0 },
            "reinforced": { "unit_weight_kn_m3": 20.0, "friction_angle_deg": 34.0 }
        },
        "analysis": { "theory": "rankine" }
    }"#;

    #[test]
    fn test_uniform_stack_and_grid_placement() {
        let design = WallDesign::from_json_str(DESIGN_JSON).unwrap();
        assert_eq!(design.version, SCHEMA_VERSION);
        let input = design.analysis_input().unwrap();

        assert_eq!(input.courses.len(), 9);
        assert_eq!(input.courses[0].setback_m, 0.0);
        assert_eq!(input.courses[1].setback_m, 0.01);

        assert_eq!(input.geogrid.len(), 3);
        // above the 2nd course: 0.4 m up a 1.8 m wall
        assert!((input.geogrid[0].depth_m - 1.4).abs() < 1e-9);
        assert_eq!(input.geogrid[0].label.as_deref(), Some("Above 2nd course"));
        assert!((input.geogrid[1].depth_m - 0.6).abs() < 1e-9);
        assert_eq!(input.geogrid[2].length_m, 1.5);
        assert_eq!(input.geogrid[2].connection_slope, 0.0);
    }

    #[test]
    fn test_height_must_be_whole_courses() {
        let json = DESIGN_JSON.replace("\"wall_height_m\": 1.8", "\"wall_height_m\": 1.75");
        let err = WallDesign::from_json_str(&json).unwrap().analysis_input().unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "courses.uniform.wall_height_m"));
    }

    #[test]
    fn test_grid_above_top_course_rejected() {
        let json = DESIGN_JSON.replace("[2, 6]", "[2, 9]");
        let err = WallDesign::from_json_str(&json).unwrap().analysis_input().unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "geogrid.above_courses"));
    }

    #[test]
    fn test_unknown_fields_and_units() {
        let json = DESIGN_JSON.replace("\"setback_m\": 0.01", "\"set_back\": 0.01");
        assert!(matches!(WallDesign::from_json_str(&json), Err(CalcError::SerializationError { .. })));

        let json = DESIGN_JSON.replace("\"project\"", "\"units\": \"cubits\", \"project\"");
        let design = WallDesign::from_json_str(&json).unwrap();
        assert!(matches!(design.analysis_input(), Err(CalcError::UnknownUnits { .. })));
    }

    #[test]
    fn test_us_customary_conversion() {
        let toml = r#"
units = "us_customary"

[[courses.explicit]]
base_elevation_m = 0.0
height_m = 2.0
depth_m = 1.0
unit_weight_kn_m3 = 120.0

[soil.retained]
unit_weight_kn_m3 = 110.0
friction_angle_deg = 32.0

[surcharge]
pressure_kpa = 250.0
live = false
"#;
        let design = WallDesign::from_toml_str(toml).unwrap();
        let input = design.analysis_input().unwrap();
        assert!((input.courses[0].height_m - 0.6096).abs() < 1e-12);
        assert!((input.courses[0].unit_weight_kn_m3 - 18.850).abs() < 1e-3);
        assert!((input.soils.retained.unit_weight_kn_m3 - 17.280).abs() < 1e-3);
        assert_eq!(input.soils.retained.friction_angle_deg, 32.0);
        let q = input.surcharge.unwrap();
        assert!((q.pressure_kpa - 11.970).abs() < 1e-3);
        assert!(!q.live);
    }

    #[test]
    fn test_unit_neutral_field_names() {
        let toml = r#"
units = "us_customary"

[courses.uniform]
count = 3
setback = 0.05
block = { height = 0.5, depth = 1.0, unit_weight = 120.0 }

[soil.retained]
unit_weight = 110.0
friction_angle_deg = 32.0
cohesion = 50.0

[surcharge]
pressure = 250.0
offset = 2.0
"#;
        let neutral = WallDesign::from_toml_str(toml).unwrap().analysis_input().unwrap();

        let suffixed = toml
            .replace("setback =", "setback_m =")
            .replace("height =", "height_m =")
            .replace("depth =", "depth_m =")
            .replace("unit_weight =", "unit_weight_kn_m3 =")
            .replace("cohesion =", "cohesion_kpa =")
            .replace("pressure =", "pressure_kpa =")
            .replace("offset =", "offset_m =");
        let suffixed = WallDesign::from_toml_str(&suffixed).unwrap().analysis_input().unwrap();

        assert_eq!(neutral, suffixed);
        assert!((neutral.courses[0].height_m - 0.1524).abs() < 1e-12);
        assert!((neutral.soils.retained.cohesion_kpa - 2.394).abs() < 1e-3);
        assert!((neutral.surcharge.unwrap().offset_m - 0.6096).abs() < 1e-12);
    }

    #[test]
    fn test_missing_count() {
        let json = DESIGN_JSON.replace("\"wall_height_m\": 1.8,", "");
        let err = WallDesign::from_json_str(&json).unwrap().analysis_input().unwrap_err();
        assert_eq!(err, CalcError::missing_field("courses.uniform.count"));
    }
}
