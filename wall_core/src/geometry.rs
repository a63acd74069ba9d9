//! # Wall Geometry
//!
//! Turns raw course and geogrid dimensions into a validated [`WallGeometry`]
//! plus the geogrid layers sorted top-first. Everything downstream (earth
//! pressure, every failure mode) reads its reference points from here.
//!
//! ## Coordinates
//!
//! ```text
//!        x_face(top) = X_batt
//!        |<---------- L_t ---------->|
//!   y=H  +----+......................+   <- top of wall
//!         \   |  reinforced fill     :
//!          \  |======================:   <- geogrid layer (depth d below top)
//!           \ |                      :
//!   y=0  +---+-+.....................+   <- base
//!        ^ toe (x = 0)               ^ heel (x = B)
//! ```
//!
//! - `x` is measured horizontally from the toe (front bottom corner of the
//!   bottom course), positive into the retained soil.
//! - `y` is the elevation above the base; `z = H - y` is depth below the top.
//!
//! ## Example
//!
//! ```rust
//! use wall_core::geometry::{CourseSpec, WallGeometry};
//!
//! let courses: Vec<CourseSpec> = (0..3)
//!     .map(|i| CourseSpec::new(i as f64 * 0.4, 0.4, 0.9, 21.6))
//!     .collect();
//! let (wall, layers) = WallGeometry::build(&courses, &[], None).unwrap();
//!
//! assert!((wall.height_m - 1.2).abs() < 1e-12);
//! assert!((wall.base_width_m - 0.9).abs() < 1e-12);
//! assert!(layers.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::GeometryError;

/// Tolerance for comparing elevations and depths (m)
pub const LENGTH_TOLERANCE_M: f64 = 1e-9;

// ============================================================================
// Courses
// ============================================================================

/// One course of blocks as described by the designer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourseSpec {
    /// Elevation of the course base above the footing (m)
    #[serde(alias = "base_elevation")]
    pub base_elevation_m: f64,
    /// Course height (m)
    #[serde(alias = "height")]
    pub height_m: f64,
    /// Front-to-back block dimension (m)
    #[serde(alias = "depth")]
    pub depth_m: f64,
    /// Horizontal setback of this course's face behind the course below (m)
    #[serde(default, alias = "setback")]
    pub setback_m: f64,
    /// Unit weight of the infilled block (kN/m³)
    #[serde(alias = "unit_weight")]
    pub unit_weight_kn_m3: f64,
    /// Block length along the wall (m), informational
    #[serde(default, alias = "block_length")]
    pub block_length_m: Option<f64>,
}

impl CourseSpec {
    /// A course with no setback and no block length
    pub fn new(base_elevation_m: f64, height_m: f64, depth_m: f64, unit_weight_kn_m3: f64) -> Self {
        CourseSpec {
            base_elevation_m,
            height_m,
            depth_m,
            setback_m: 0.0,
            unit_weight_kn_m3,
            block_length_m: None,
        }
    }

    /// Same course with a setback
    pub fn with_setback(mut self, setback_m: f64) -> Self {
        self.setback_m = setback_m;
        self
    }
}

/// A validated course with its face position resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// 0 = bottom course
    pub index: usize,
    pub base_elevation_m: f64,
    pub height_m: f64,
    pub depth_m: f64,
    pub setback_m: f64,
    /// x of the course face (sum of setbacks up to and including this course)
    pub face_x_m: f64,
    pub unit_weight_kn_m3: f64,
    pub block_length_m: Option<f64>,
}

impl Course {
    /// Elevation of the course top (m)
    pub fn top_elevation_m(&self) -> f64 {
        self.base_elevation_m + self.height_m
    }

    /// x of the back face of the block (m)
    pub fn back_x_m(&self) -> f64 {
        self.face_x_m + self.depth_m
    }

    /// Block weight per metre run (kN/m)
    pub fn weight_kn_m(&self) -> f64 {
        self.unit_weight_kn_m3 * self.height_m * self.depth_m
    }

    /// x of the block centroid (m)
    pub fn centroid_x_m(&self) -> f64 {
        self.face_x_m + self.depth_m / 2.0
    }
}

// ============================================================================
// Geogrid
// ============================================================================

fn default_one() -> f64 {
    1.0
}

/// One geogrid layer as described by the designer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeogridSpec {
    /// Depth below the top of the wall (m)
    pub depth_m: f64,
    /// Grid length (m)
    pub length_m: f64,
    /// Distance from the wall face to the front end of the grid (m)
    #[serde(default)]
    pub front_offset_m: f64,
    /// Ultimate tensile strength T_ult (kN/m)
    pub ultimate_strength_kn_m: f64,
    /// Combined creep, installation damage and durability factor (≥ 1)
    #[serde(default = "default_one")]
    pub reduction_factor: f64,
    /// Connection strength intercept `a` in `a + b·N` (kN/m)
    #[serde(default)]
    pub connection_intercept_kn_m: f64,
    /// Connection strength slope `b` in `a + b·N`
    #[serde(default)]
    pub connection_slope: f64,
    /// Soil interaction coefficient C_i
    pub interaction_coefficient: f64,
    /// Coverage ratio R_c in (0, 1]
    #[serde(default = "default_one")]
    pub coverage_ratio: f64,
    /// Display label (defaults to "Layer n", numbered from the top)
    #[serde(default)]
    pub label: Option<String>,
}

/// A validated geogrid layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeogridLayer {
    /// 0 = top layer
    pub index: usize,
    pub label: String,
    pub depth_m: f64,
    /// Elevation above the base, `H - depth`
    pub elevation_m: f64,
    pub length_m: f64,
    pub front_offset_m: f64,
    pub ultimate_strength_kn_m: f64,
    pub reduction_factor: f64,
    /// Long-term allowable design strength `T_ult / RF` (kN/m)
    pub ltads_kn_m: f64,
    pub connection_intercept_kn_m: f64,
    pub connection_slope: f64,
    pub interaction_coefficient: f64,
    pub coverage_ratio: f64,
}

impl GeogridLayer {
    /// Connection capacity `a + b·N` for a normal load N (kN/m)
    pub fn connection_capacity_kn_m(&self, normal_kn_m: f64) -> f64 {
        self.connection_intercept_kn_m + self.connection_slope * normal_kn_m
    }

    /// x of the back end of the grid, measured from the face
    pub fn reach_m(&self) -> f64 {
        self.front_offset_m + self.length_m
    }
}

// ============================================================================
// Footing
// ============================================================================

/// Leveling pad under the bottom course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Footing {
    /// Pad width (m); the base width of the wall is used when absent
    #[serde(default, alias = "width")]
    pub width_m: Option<f64>,
    /// Pad thickness (m)
    #[serde(alias = "thickness")]
    pub thickness_m: f64,
    /// Depth from finished grade at the toe to the underside of the pad (m)
    #[serde(default, alias = "embedment")]
    pub embedment_m: f64,
}

// ============================================================================
// Wall
// ============================================================================

/// Validated wall geometry. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallGeometry {
    /// Courses, bottom first
    pub courses: Vec<Course>,
    /// Overall height H (m)
    pub height_m: f64,
    /// Face x of the top course, X_batt (m)
    pub batter_offset_m: f64,
    /// Face batter from vertical, ω (deg)
    pub batter_angle_deg: f64,
    /// Reinforced depth L_t measured from the face; None for an unreinforced wall
    pub reinforced_depth_m: Option<f64>,
    /// Base width B (m)
    pub base_width_m: f64,
    /// x of the heel (m)
    pub heel_x_m: f64,
    pub footing: Option<Footing>,
}

fn check_positive(field: String, value: f64) -> Result<(), GeometryError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GeometryError::invalid_dimension(field, value, "must be positive and finite"));
    }
    Ok(())
}

fn check_non_negative(field: String, value: f64) -> Result<(), GeometryError> {
    if !value.is_finite() || value < 0.0 {
        return Err(GeometryError::invalid_dimension(field, value, "must be non-negative and finite"));
    }
    Ok(())
}

impl WallGeometry {
    /// Validate courses, geogrid and footing and derive the shared reference points.
    ///
    /// Returns the geometry and the geogrid layers sorted by depth, top first.
    pub fn build(
        courses: &[CourseSpec],
        layers: &[GeogridSpec],
        footing: Option<&Footing>,
    ) -> Result<(WallGeometry, Vec<GeogridLayer>), GeometryError> {
        if courses.is_empty() {
            return Err(GeometryError::NoCourses);
        }

        let mut built: Vec<Course> = Vec::with_capacity(courses.len());
        let mut face_x = 0.0;
        let mut expected_base = 0.0;
        for (i, spec) in courses.iter().enumerate() {
            check_positive(format!("courses[{i}].height_m"), spec.height_m)?;
            check_positive(format!("courses[{i}].depth_m"), spec.depth_m)?;
            check_positive(format!("courses[{i}].unit_weight_kn_m3"), spec.unit_weight_kn_m3)?;
            check_non_negative(format!("courses[{i}].setback_m"), spec.setback_m)?;
            if let Some(length) = spec.block_length_m {
                check_positive(format!("courses[{i}].block_length_m"), length)?;
            }
            if !spec.base_elevation_m.is_finite()
                || (spec.base_elevation_m - expected_base).abs() > LENGTH_TOLERANCE_M
            {
                return Err(GeometryError::NonContiguousCourses {
                    course: i,
                    expected_m: expected_base,
                    actual_m: spec.base_elevation_m,
                });
            }
            if i == 0 && spec.setback_m.abs() > LENGTH_TOLERANCE_M {
                return Err(GeometryError::BaseCourseSetback {
                    setback_m: spec.setback_m,
                });
            }

            face_x += spec.setback_m;
            built.push(Course {
                index: i,
                base_elevation_m: expected_base,
                height_m: spec.height_m,
                depth_m: spec.depth_m,
                setback_m: spec.setback_m,
                face_x_m: face_x,
                unit_weight_kn_m3: spec.unit_weight_kn_m3,
                block_length_m: spec.block_length_m,
            });
            expected_base += spec.height_m;
        }

        let height_m = expected_base;
        let top = &built[built.len() - 1];
        let batter_offset_m = top.face_x_m;
        let rise_to_top_course = height_m - top.height_m;
        let batter_angle_deg = if built.len() > 1 && rise_to_top_course > LENGTH_TOLERANCE_M {
            (batter_offset_m / rise_to_top_course).atan().to_degrees()
        } else {
            0.0
        };

        if let Some(footing) = footing {
            check_positive("footing.thickness_m".to_string(), footing.thickness_m)?;
            check_non_negative("footing.embedment_m".to_string(), footing.embedment_m)?;
            if let Some(width) = footing.width_m {
                check_positive("footing.width_m".to_string(), width)?;
            }
        }

        let layers = build_layers(layers, height_m)?;

        let base_depth = built[0].depth_m;
        let reinforced_depth_m = if layers.is_empty() {
            None
        } else {
            Some(layers.iter().map(GeogridLayer::reach_m).fold(base_depth, f64::max))
        };
        let base_width_m = reinforced_depth_m.unwrap_or(base_depth);

        let geometry = WallGeometry {
            courses: built,
            height_m,
            batter_offset_m,
            batter_angle_deg,
            reinforced_depth_m,
            base_width_m,
            heel_x_m: base_width_m,
            footing: footing.cloned(),
        };
        Ok((geometry, layers))
    }

    /// True when at least one geogrid layer ties the face into the fill
    pub fn is_reinforced(&self) -> bool {
        self.reinforced_depth_m.is_some()
    }

    /// Face batter from vertical, ω (rad)
    pub fn batter_angle_rad(&self) -> f64 {
        self.batter_angle_deg.to_radians()
    }

    /// The top course
    pub fn top_course(&self) -> &Course {
        &self.courses[self.courses.len() - 1]
    }

    /// The course occupying elevation `y` (the top course for y ≥ H)
    pub fn course_at(&self, elevation_m: f64) -> &Course {
        self.courses
            .iter()
            .find(|c| elevation_m < c.top_elevation_m() - LENGTH_TOLERANCE_M)
            .unwrap_or_else(|| self.top_course())
    }

    /// x of the straight face line through the course faces, `y·tan ω`
    pub fn face_line_x(&self, elevation_m: f64) -> f64 {
        elevation_m * self.batter_angle_rad().tan()
    }

    /// x of the back of the block column at elevation `y`
    pub fn block_back_x(&self, elevation_m: f64) -> f64 {
        self.course_at(elevation_m).back_x_m()
    }

    /// x of the back of the structure at elevation `y`
    ///
    /// Back of the blocks for an unreinforced wall, back of the reinforced
    /// mass (`y·tan ω + L_t`) otherwise.
    pub fn back_x(&self, elevation_m: f64) -> f64 {
        match self.reinforced_depth_m {
            Some(l_t) => self.face_line_x(elevation_m) + l_t,
            None => self.block_back_x(elevation_m),
        }
    }

    /// Self weight of the structure about the toe.
    ///
    /// Reinforced soil between the back of each course and `L_t` is included
    /// with the infill unit weight when the wall is reinforced.
    pub fn self_weight(&self, infill_unit_weight_kn_m3: f64) -> SelfWeight {
        let mut block = 0.0;
        let mut block_moment = 0.0;
        let mut soil = 0.0;
        let mut soil_moment = 0.0;

        for course in &self.courses {
            let w = course.weight_kn_m();
            block += w;
            block_moment += w * course.centroid_x_m();

            if let Some(l_t) = self.reinforced_depth_m {
                let soil_depth = (l_t - course.depth_m).max(0.0);
                let w_s = infill_unit_weight_kn_m3 * course.height_m * soil_depth;
                soil += w_s;
                soil_moment += w_s * (course.back_x_m() + soil_depth / 2.0);
            }
        }

        let total = block + soil;
        SelfWeight {
            block_kn_m: block,
            block_centroid_x_m: block_moment / block,
            soil_kn_m: soil,
            soil_centroid_x_m: if soil > 0.0 { soil_moment / soil } else { 0.0 },
            total_kn_m: total,
            centroid_x_m: (block_moment + soil_moment) / total,
        }
    }

    /// Weight of the block column above elevation `y` (kN/m)
    pub fn block_weight_above(&self, elevation_m: f64) -> f64 {
        self.courses
            .iter()
            .map(|c| {
                let above = (c.top_elevation_m() - c.base_elevation_m.max(elevation_m)).max(0.0);
                c.unit_weight_kn_m3 * c.depth_m * above.min(c.height_m)
            })
            .sum()
    }
}

fn build_layers(specs: &[GeogridSpec], height_m: f64) -> Result<Vec<GeogridLayer>, GeometryError> {
    for (k, spec) in specs.iter().enumerate() {
        if !spec.depth_m.is_finite()
            || spec.depth_m <= LENGTH_TOLERANCE_M
            || spec.depth_m >= height_m - LENGTH_TOLERANCE_M
        {
            return Err(GeometryError::LayerOutsideWall {
                layer: k,
                depth_m: spec.depth_m,
                wall_height_m: height_m,
            });
        }
        let non_negative = [
            ("length_m", spec.length_m),
            ("front_offset_m", spec.front_offset_m),
            ("ultimate_strength_kn_m", spec.ultimate_strength_kn_m),
            ("connection_intercept_kn_m", spec.connection_intercept_kn_m),
            ("connection_slope", spec.connection_slope),
            ("interaction_coefficient", spec.interaction_coefficient),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(GeometryError::invalid_layer(k, field, value, "must be non-negative"));
            }
        }
        if !spec.reduction_factor.is_finite() || spec.reduction_factor < 1.0 {
            return Err(GeometryError::invalid_layer(
                k,
                "reduction_factor",
                spec.reduction_factor,
                "must be at least 1",
            ));
        }
        if !(spec.coverage_ratio > 0.0 && spec.coverage_ratio <= 1.0) {
            return Err(GeometryError::invalid_layer(
                k,
                "coverage_ratio",
                spec.coverage_ratio,
                "must be in (0, 1]",
            ));
        }
    }

    let mut order: Vec<usize> = (0..specs.len()).collect();
    order.sort_by(|&a, &b| specs[a].depth_m.total_cmp(&specs[b].depth_m));

    for pair in order.windows(2) {
        let (upper, lower) = (&specs[pair[0]], &specs[pair[1]]);
        if (lower.depth_m - upper.depth_m).abs() <= LENGTH_TOLERANCE_M {
            return Err(GeometryError::DuplicateLayerDepth {
                first: pair[0].min(pair[1]),
                second: pair[0].max(pair[1]),
                depth_m: upper.depth_m,
            });
        }
    }

    Ok(order
        .into_iter()
        .enumerate()
        .map(|(index, k)| {
            let spec = &specs[k];
            GeogridLayer {
                index,
                label: spec.label.clone().unwrap_or_else(|| format!("Layer {}", index + 1)),
                depth_m: spec.depth_m,
                elevation_m: height_m - spec.depth_m,
                length_m: spec.length_m,
                front_offset_m: spec.front_offset_m,
                ultimate_strength_kn_m: spec.ultimate_strength_kn_m,
                reduction_factor: spec.reduction_factor,
                ltads_kn_m: spec.ultimate_strength_kn_m / spec.reduction_factor,
                connection_intercept_kn_m: spec.connection_intercept_kn_m,
                connection_slope: spec.connection_slope,
                interaction_coefficient: spec.interaction_coefficient,
                coverage_ratio: spec.coverage_ratio,
            }
        })
        .collect())
}

/// Weight of the structure and its centroid about the toe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfWeight {
    /// Block (facing) weight W_f (kN/m)
    pub block_kn_m: f64,
    pub block_centroid_x_m: f64,
    /// Reinforced soil weight W_s (kN/m), 0 when unreinforced
    pub soil_kn_m: f64,
    pub soil_centroid_x_m: f64,
    /// W = W_f + W_s (kN/m)
    pub total_kn_m: f64,
    /// CM_x (m)
    pub centroid_x_m: f64,
}

impl SelfWeight {
    /// Resisting moment about the toe, `W·CM_x` (kN·m/m)
    pub fn moment_about_toe(&self) -> f64 {
        self.total_kn_m * self.centroid_x_m
    }
}

/// English ordinal for course labels: 1st, 2nd, 3rd, 4th, 11th, 22nd.
///
/// ```rust
/// use wall_core::geometry::ordinal;
///
/// assert_eq!(ordinal(3), "3rd");
/// assert_eq!(ordinal(12), "12th");
/// ```
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(count: usize, setback_m: f64) -> Vec<CourseSpec> {
        (0..count)
            .map(|i| {
                let setback = if i == 0 { 0.0 } else { setback_m };
                CourseSpec::new(i as f64 * 0.2, 0.2, 0.3, 21.0).with_setback(setback)
            })
            .collect()
    }

    fn grid(depth_m: f64, length_m: f64) -> GeogridSpec {
        GeogridSpec {
            depth_m,
            length_m,
            front_offset_m: 0.05,
            ultimate_strength_kn_m: 40.0,
            reduction_factor: 2.5,
            connection_intercept_kn_m: 6.0,
            connection_slope: 0.5,
            interaction_coefficient: 0.8,
            coverage_ratio: 1.0,
            label: None,
        }
    }

    #[test]
    fn test_unreinforced_geometry() {
        let (wall, layers) = WallGeometry::build(&stack(6, 0.0), &[], None).unwrap();
        assert!((wall.height_m - 1.2).abs() < 1e-12);
        assert_eq!(wall.base_width_m, 0.3);
        assert_eq!(wall.batter_angle_deg, 0.0);
        assert!(!wall.is_reinforced());
        assert!(layers.is_empty());
        assert_eq!(wall.back_x(0.5), 0.3);
    }

    #[test]
    fn test_batter_angle_runs_through_course_faces() {
        let (wall, _) = WallGeometry::build(&stack(6, 0.02), &[], None).unwrap();
        assert!((wall.batter_offset_m - 0.1).abs() < 1e-12);
        // rise to the base of the top course is 1.0 m
        let expected = (0.1f64 / 1.0).atan().to_degrees();
        assert!((wall.batter_angle_deg - expected).abs() < 1e-12);
        assert!((wall.face_line_x(1.0) - 0.1).abs() < 1e-12);
        assert!((wall.course_at(0.5).face_x_m - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_reinforced_depth_and_layer_order() {
        let specs = vec![grid(0.9, 1.2), grid(0.3, 1.0), grid(0.6, 1.5)];
        let (wall, layers) = WallGeometry::build(&stack(6, 0.0), &specs, None).unwrap();
        assert!(wall.is_reinforced());
        assert!((wall.reinforced_depth_m.unwrap() - 1.55).abs() < 1e-12);
        assert_eq!(wall.base_width_m, wall.reinforced_depth_m.unwrap());

        let depths: Vec<f64> = layers.iter().map(|l| l.depth_m).collect();
        assert_eq!(depths, vec![0.3, 0.6, 0.9]);
        assert_eq!(layers[0].label, "Layer 1");
        assert!((layers[0].ltads_kn_m - 16.0).abs() < 1e-12);
        assert!((layers[2].elevation_m - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_non_contiguous_courses() {
        let mut courses = stack(3, 0.0);
        courses[2].base_elevation_m = 0.45;
        let err = WallGeometry::build(&courses, &[], None).unwrap_err();
        assert!(matches!(err, GeometryError::NonContiguousCourses { course: 2, .. }));
    }

    #[test]
    fn test_base_course_setback_rejected() {
        let mut courses = stack(3, 0.0);
        courses[0].setback_m = 0.01;
        let err = WallGeometry::build(&courses, &[], None).unwrap_err();
        assert!(matches!(err, GeometryError::BaseCourseSetback { .. }));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(WallGeometry::build(&[], &[], None).unwrap_err(), GeometryError::NoCourses);

        let mut courses = stack(2, 0.0);
        courses[1].depth_m = 0.0;
        let err = WallGeometry::build(&courses, &[], None).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidDimension { ref field, .. } if field == "courses[1].depth_m"));

        let mut courses = stack(2, 0.0);
        courses[1].setback_m = -0.01;
        assert!(WallGeometry::build(&courses, &[], None).is_err());

        let footing = Footing { width_m: Some(0.0), thickness_m: 0.15, embedment_m: 0.2 };
        assert!(WallGeometry::build(&stack(2, 0.0), &[], Some(&footing)).is_err());
    }

    #[test]
    fn test_layer_validation() {
        let courses = stack(6, 0.0);

        let err = WallGeometry::build(&courses, &[grid(1.2, 1.0)], None).unwrap_err();
        assert!(matches!(err, GeometryError::LayerOutsideWall { layer: 0, .. }));

        let err = WallGeometry::build(&courses, &[grid(0.4, 1.0), grid(0.4, 1.2)], None).unwrap_err();
        assert!(matches!(err, GeometryError::DuplicateLayerDepth { first: 0, second: 1, .. }));

        let mut weak = grid(0.4, 1.0);
        weak.reduction_factor = 0.9;
        assert!(WallGeometry::build(&courses, &[weak], None).is_err());

        let mut sparse = grid(0.4, 1.0);
        sparse.coverage_ratio = 0.0;
        assert!(WallGeometry::build(&courses, &[sparse], None).is_err());
    }

    #[test]
    fn test_self_weight() {
        let (wall, _) = WallGeometry::build(&stack(6, 0.0), &[], None).unwrap();
        let w = wall.self_weight(18.0);
        assert!((w.block_kn_m - 21.0 * 1.2 * 0.3).abs() < 1e-12);
        assert_eq!(w.soil_kn_m, 0.0);
        assert!((w.centroid_x_m - 0.15).abs() < 1e-12);

        let specs = vec![grid(0.6, 0.95)];
        let (wall, _) = WallGeometry::build(&stack(6, 0.0), &specs, None).unwrap();
        let w = wall.self_weight(18.0);
        // L_t = 1.0, soil slice 0.7 deep behind 0.3 deep blocks
        assert!((w.soil_kn_m - 18.0 * 1.2 * 0.7).abs() < 1e-9);
        assert!((w.soil_centroid_x_m - 0.65).abs() < 1e-12);
        assert!((w.total_kn_m - (w.block_kn_m + w.soil_kn_m)).abs() < 1e-12);
    }

    #[test]
    fn test_block_weight_above() {
        let (wall, _) = WallGeometry::build(&stack(6, 0.0), &[], None).unwrap();
        let per_course = 21.0 * 0.2 * 0.3;
        assert!((wall.block_weight_above(0.8) - 2.0 * per_course).abs() < 1e-12);
        assert!((wall.block_weight_above(0.9) - 1.5 * per_course).abs() < 1e-12);
        assert!(wall.block_weight_above(wall.height_m).abs() < 1e-12);
    }

    #[test]
    fn test_ordinal() {
        let labels: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101].iter().map(|&n| ordinal(n)).collect();
        assert_eq!(labels, vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st"]);
    }
}
