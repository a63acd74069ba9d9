//! # Equation Registry
//!
//! Central registry of every formula the wall analysis uses. Each equation
//! has metadata (formula, reference, variables, assumptions, source
//! location) used for the report appendix and for `EQUATIONS.md`.
//!
//! ## Usage
//!
//! ```rust
//! use wall_core::equations::registry::{Equation, EquationTracker};
//!
//! let mut tracker = EquationTracker::new();
//! tracker.record_for_element(Equation::PulloutResistance, "Geogrid pullout", "Layer 1");
//!
//! let meta = Equation::PulloutResistance.metadata();
//! assert!(meta.formula_plain.contains("LTADS"));
//! assert_eq!(tracker.unique_equations(), vec![Equation::PulloutResistance]);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// References
// ============================================================================

/// Source of an equation, cited in the appendix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeReference {
    /// Coulomb wedge theory of active earth pressure
    Coulomb,
    /// Rankine theory of active and passive earth pressure
    Rankine,
    /// Meyerhof bearing capacity factors
    Meyerhof,
    /// NCMA Design Manual for Segmental Retaining Walls
    Ncma { topic: &'static str },
    /// Fundamental statics (no specific reference needed)
    Mechanics,
}

impl CodeReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Coulomb => "Coulomb active earth pressure theory".to_string(),
            CodeReference::Rankine => "Rankine earth pressure theory".to_string(),
            CodeReference::Meyerhof => "Meyerhof bearing capacity factors".to_string(),
            CodeReference::Ncma { topic } => {
                format!("NCMA Design Manual for Segmental Retaining Walls, {}", topic)
            }
            CodeReference::Mechanics => "Fundamental Mechanics".to_string(),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            CodeReference::Coulomb => "Coulomb",
            CodeReference::Rankine => "Rankine",
            CodeReference::Meyerhof => "Meyerhof",
            CodeReference::Ncma { .. } => "NCMA",
            CodeReference::Mechanics => "Mechanics",
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for organizing equations in the appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Batter, weights, centre of mass
    Geometry,
    /// Active coefficients and pressure diagrams
    EarthPressure,
    /// Sliding and overturning of the whole structure
    ExternalStability,
    /// Base pressure and bearing capacity
    Bearing,
    /// Geogrid demand, rupture and pullout
    Reinforcement,
    /// Connection and course interface checks
    Facing,
    /// Factor of safety definition
    DesignChecks,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::Geometry => "Geometry and Self Weight",
            EquationCategory::EarthPressure => "Earth Pressure",
            EquationCategory::ExternalStability => "External Stability",
            EquationCategory::Bearing => "Bearing",
            EquationCategory::Reinforcement => "Geogrid Reinforcement",
            EquationCategory::Facing => "Facing Stability",
            EquationCategory::DesignChecks => "Design Checks",
        }
    }

    /// Sort order for the appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::Geometry => 1,
            EquationCategory::EarthPressure => 2,
            EquationCategory::ExternalStability => 3,
            EquationCategory::Bearing => 4,
            EquationCategory::Reinforcement => 5,
            EquationCategory::Facing => 6,
            EquationCategory::DesignChecks => 7,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol in Typst math notation (e.g., "K_a", "gamma")
    pub symbol: &'static str,
    pub description: &'static str,
    /// Units (e.g., "kN/m", "m", "kPa")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for one equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// What the equation calculates
    pub description: &'static str,
    /// The formula in Typst math notation
    pub formula_typst: &'static str,
    /// The formula in plain text for markdown
    pub formula_plain: &'static str,
    pub reference: CodeReference,
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    pub category: EquationCategory,
    /// Source module where the equation is implemented
    pub source_module: &'static str,
    /// Function implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used by the wall analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------
    /// ω = atan(X_batt / (H − h_top))
    BatterAngle,
    /// W_f = Σ γ_b h d
    BlockWeight,
    /// W_s = Σ γ_i h (L_t − d)
    ReinforcedSoilWeight,
    /// CM_x = Σ W x / Σ W
    CenterOfMass,

    // -------------------------------------------------------------------------
    // Earth pressure
    // -------------------------------------------------------------------------
    CoulombActiveCoefficient,
    RankineActiveCoefficient,
    /// σ = Ka γ z − 2c√Ka
    ActivePressureDistribution,
    /// σ_q = Ka q between z1 and z2
    SurchargeLateralPressure,
    /// F_h = F cos δ, F_v = F sin δ
    ActiveForceComponents,
    /// P_p = ½ Kp γ D² + 2c√Kp D
    PassiveResistance,

    // -------------------------------------------------------------------------
    // External stability
    // -------------------------------------------------------------------------
    SlidingResistance,
    OverturningMoments,

    // -------------------------------------------------------------------------
    // Bearing
    // -------------------------------------------------------------------------
    BearingEccentricity,
    BearingPressureDistribution,
    BearingCapacityFactors,
    UltimateBearingCapacity,

    // -------------------------------------------------------------------------
    // Reinforcement
    // -------------------------------------------------------------------------
    TributaryLayerLoad,
    LongTermAllowableStrength,
    PulloutEmbedment,
    PulloutResistance,

    // -------------------------------------------------------------------------
    // Facing
    // -------------------------------------------------------------------------
    ConnectionStrength,
    CourseInterfaceShear,

    // -------------------------------------------------------------------------
    // Checks
    // -------------------------------------------------------------------------
    FactorOfSafety,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::BatterAngle => EquationMetadata {
                name: "Face Batter Angle",
                description: "Inclination of the wall face from vertical, through the faces of the bottom and top courses",
                formula_typst: r#"$omega = arctan(X_("batt") / (H - h_("top")))$"#,
                formula_plain: "omega = atan(X_batt / (H - h_top))",
                reference: CodeReference::Mechanics,
                variables: vec![
                    Variable::new("X_(\"batt\")", "Sum of course setbacks (face x of the top course)", "m"),
                    Variable::new("H", "Wall height", "m"),
                    Variable::new("h_(\"top\")", "Height of the top course", "m"),
                ],
                assumptions: vec!["omega = 0 for a single course"],
                category: EquationCategory::Geometry,
                source_module: "geometry.rs",
                source_function: "WallGeometry::build",
            },

            Equation::BlockWeight => EquationMetadata {
                name: "Facing Block Weight",
                description: "Weight of the infilled block column per metre run",
                formula_typst: r#"$W_f = sum_i gamma_(b,i) h_i d_i$"#,
                formula_plain: "W_f = sum(gamma_b,i * h_i * d_i)",
                reference: CodeReference::Mechanics,
                variables: vec![
                    Variable::new("gamma_b", "Unit weight of the infilled block", "kN/m³"),
                    Variable::new("h_i", "Course height", "m"),
                    Variable::new("d_i", "Block depth", "m"),
                ],
                assumptions: vec!["Blocks fully infilled"],
                category: EquationCategory::Geometry,
                source_module: "geometry.rs",
                source_function: "WallGeometry::self_weight",
            },

            Equation::ReinforcedSoilWeight => EquationMetadata {
                name: "Reinforced Soil Weight",
                description: "Weight of the infill between the back of the blocks and the end of the reinforced zone",
                formula_typst: r#"$W_s = sum_i gamma_i h_i (L_t - d_i)$"#,
                formula_plain: "W_s = sum(gamma_i * h_i * (L_t - d_i))",
                reference: CodeReference::Ncma { topic: "external stability of the reinforced mass" },
                variables: vec![
                    Variable::new("gamma_i", "Unit weight of the infill", "kN/m³"),
                    Variable::new("L_t", "Reinforced depth measured from the face", "m"),
                ],
                assumptions: vec!["Reinforced fill and blocks act as one gravity mass"],
                category: EquationCategory::Geometry,
                source_module: "geometry.rs",
                source_function: "WallGeometry::self_weight",
            },

            Equation::CenterOfMass => EquationMetadata {
                name: "Centre of Mass",
                description: "Horizontal position of the self-weight resultant from the toe",
                formula_typst: r#"$"CM"_x = (sum W_j x_j) / (sum W_j)$"#,
                formula_plain: "CM_x = sum(W_j * x_j) / sum(W_j)",
                reference: CodeReference::Mechanics,
                variables: vec![
                    Variable::new("W_j", "Weight of block or soil slice j", "kN/m"),
                    Variable::new("x_j", "Centroid of slice j from the toe", "m"),
                ],
                assumptions: vec![],
                category: EquationCategory::Geometry,
                source_module: "geometry.rs",
                source_function: "WallGeometry::self_weight",
            },

            Equation::CoulombActiveCoefficient => EquationMetadata {
                name: "Coulomb Active Coefficient",
                description: "Active earth pressure coefficient including face batter and wall friction",
                formula_typst: r#"$K_a = ((csc beta sin(beta - phi)) / (sqrt(sin(beta + delta)) + sqrt((sin(phi + delta) sin(phi - i)) / sin(beta - i))))^2$"#,
                formula_plain: "Ka = [csc(beta) sin(beta - phi) / (sqrt(sin(beta + delta)) + sqrt(sin(phi + delta) sin(phi - i) / sin(beta - i)))]^2",
                reference: CodeReference::Coulomb,
                variables: vec![
                    Variable::new("beta", "Back of the wall from horizontal, 90° - omega", "deg"),
                    Variable::new("phi", "Soil friction angle", "deg"),
                    Variable::new("delta", "Wall friction angle (ratio x phi)", "deg"),
                    Variable::new("i", "Backslope", "deg"),
                ],
                assumptions: vec!["Planar failure wedge", "Cohesionless wedge, cohesion handled in the distribution"],
                category: EquationCategory::EarthPressure,
                source_module: "loads/earth_pressure.rs",
                source_function: "coulomb_ka",
            },

            Equation::RankineActiveCoefficient => EquationMetadata {
                name: "Rankine Active Coefficient",
                description: "Active earth pressure coefficient for a sloping backfill, smooth vertical back",
                formula_typst: r#"$K_a = cos i (cos i - sqrt(cos^2 i - cos^2 phi)) / (cos i + sqrt(cos^2 i - cos^2 phi))$"#,
                formula_plain: "Ka = cos(i) (cos(i) - sqrt(cos^2 i - cos^2 phi)) / (cos(i) + sqrt(cos^2 i - cos^2 phi))",
                reference: CodeReference::Rankine,
                variables: vec![
                    Variable::new("phi", "Soil friction angle", "deg"),
                    Variable::new("i", "Backslope", "deg"),
                ],
                assumptions: vec!["Wall batter ignored", "Resultant parallel to the backslope"],
                category: EquationCategory::EarthPressure,
                source_module: "loads/earth_pressure.rs",
                source_function: "rankine_ka",
            },

            Equation::ActivePressureDistribution => EquationMetadata {
                name: "Active Pressure Distribution",
                description: "Active pressure at depth z below the top of the wall",
                formula_typst: r#"$sigma_a (z) = max(0, K_a gamma z - 2 c sqrt(K_a))$"#,
                formula_plain: "sigma_a(z) = max(0, Ka * gamma * z - 2c * sqrt(Ka))",
                reference: CodeReference::Rankine,
                variables: vec![
                    Variable::new("gamma", "Soil unit weight", "kN/m³"),
                    Variable::new("z", "Depth below the top of the wall", "m"),
                    Variable::new("c", "Cohesion", "kPa"),
                ],
                assumptions: vec!["Tension zone ignored", "Resultant from the exact integral of the diagram"],
                category: EquationCategory::EarthPressure,
                source_module: "loads/mod.rs",
                source_function: "PressureState::build",
            },

            Equation::SurchargeLateralPressure => EquationMetadata {
                name: "Surcharge Lateral Pressure",
                description: "Uniform strip surcharge projected onto the back of the wall along the failure plane",
                formula_typst: r#"$sigma_q = K_a q$ for $s tan(45° + phi/2) <= z <= (s + b) tan(45° + phi/2)$"#,
                formula_plain: "sigma_q = Ka * q for s tan(45 + phi/2) <= z <= (s + b) tan(45 + phi/2)",
                reference: CodeReference::Rankine,
                variables: vec![
                    Variable::new("q", "Surcharge pressure", "kPa"),
                    Variable::new("s", "Distance from the back of the wall to the strip", "m"),
                    Variable::new("b", "Strip width (unbounded when absent)", "m"),
                ],
                assumptions: vec!["Band clipped to the wall height"],
                category: EquationCategory::EarthPressure,
                source_module: "loads/surcharge.rs",
                source_function: "Surcharge::lateral_band",
            },

            Equation::ActiveForceComponents => EquationMetadata {
                name: "Active Force Components",
                description: "Horizontal and vertical components of the active resultant",
                formula_typst: r#"$F_h = F cos delta_("eff")$, $F_v = F sin delta_("eff")$"#,
                formula_plain: "F_h = F cos(delta_eff), F_v = F sin(delta_eff)",
                reference: CodeReference::Mechanics,
                variables: vec![
                    Variable::new("F", "Active resultant", "kN/m"),
                    Variable::new("delta_(\"eff\")", "delta (Coulomb) or i (Rankine)", "deg"),
                ],
                assumptions: vec!["Vertical component acts at the back of the structure"],
                category: EquationCategory::EarthPressure,
                source_module: "loads/mod.rs",
                source_function: "PressureState::build",
            },

            Equation::PassiveResistance => EquationMetadata {
                name: "Passive Toe Resistance",
                description: "Rankine passive resistance of the soil in front of the embedded toe",
                formula_typst: r#"$P_p = 1/2 K_p gamma_f D^2 + 2 c_f sqrt(K_p) D$, $K_p = tan^2(45° + phi_f / 2)$"#,
                formula_plain: "P_p = 1/2 Kp gamma_f D^2 + 2 c_f sqrt(Kp) D, Kp = tan^2(45 + phi_f/2)",
                reference: CodeReference::Rankine,
                variables: vec![
                    Variable::new("D", "Embedment depth", "m"),
                    Variable::new("gamma_f", "Foundation soil unit weight", "kN/m³"),
                ],
                assumptions: vec!["Only counted when enabled in the analysis options"],
                category: EquationCategory::ExternalStability,
                source_module: "failure_modes/sliding.rs",
                source_function: "passive_resistance",
            },

            Equation::SlidingResistance => EquationMetadata {
                name: "Base Sliding Resistance",
                description: "Friction along the base of the structure",
                formula_typst: r#"$F_r = (W + F_("av") + W_(q,"dead")) tan phi_("base") + P_p$"#,
                formula_plain: "F_r = (W + F_av + W_q,dead) tan(phi_base) + P_p",
                reference: CodeReference::Ncma { topic: "base sliding" },
                variables: vec![
                    Variable::new("W", "Self weight of the structure", "kN/m"),
                    Variable::new("F_(\"av\")", "Vertical component of the active force", "kN/m"),
                    Variable::new("phi_(\"base\")", "Friction angle at the base", "deg"),
                ],
                assumptions: vec!["Live surcharge never resists sliding"],
                category: EquationCategory::ExternalStability,
                source_module: "failure_modes/sliding.rs",
                source_function: "evaluate",
            },

            Equation::OverturningMoments => EquationMetadata {
                name: "Overturning About the Toe",
                description: "Ratio of restoring to overturning moments about the toe",
                formula_typst: r#"$"FOS" = (sum M_r) / (sum M_o) = (W "CM"_x + F_("av") x_a) / (F_("ah") y_a + F_("qh") y_q)$"#,
                formula_plain: "FOS = sum(M_r) / sum(M_o) = (W CM_x + F_av x_a) / (F_ah y_a + F_qh y_q)",
                reference: CodeReference::Ncma { topic: "overturning" },
                variables: vec![
                    Variable::new("y_a", "Height of the soil resultant", "m"),
                    Variable::new("y_q", "Height of the surcharge resultant", "m"),
                    Variable::new("x_a", "x of the vertical component", "m"),
                ],
                assumptions: vec!["Dead surcharge adds to the restoring moment, live surcharge does not"],
                category: EquationCategory::ExternalStability,
                source_module: "failure_modes/overturning.rs",
                source_function: "evaluate",
            },

            Equation::BearingEccentricity => EquationMetadata {
                name: "Base Eccentricity",
                description: "Position of the base resultant and its eccentricity from the base centre",
                formula_typst: r#"$overline(x) = (sum M_r - sum M_o) / V$, $e = B/2 - overline(x)$"#,
                formula_plain: "x_bar = (sum M_r - sum M_o) / V, e = B/2 - x_bar",
                reference: CodeReference::Mechanics,
                variables: vec![
                    Variable::new("V", "Total vertical load including all surcharge", "kN/m"),
                    Variable::new("B", "Base width", "m"),
                ],
                assumptions: vec!["e > 0 toward the toe"],
                category: EquationCategory::Bearing,
                source_module: "failure_modes/bearing.rs",
                source_function: "base_reaction",
            },

            Equation::BearingPressureDistribution => EquationMetadata {
                name: "Base Pressure Distribution",
                description: "Trapezoidal pressure inside the middle third, triangular outside it",
                formula_typst: r#"$sigma = V/B (1 plus.minus (6 e)/B)$ for $|e| <= B/6$, $sigma_("max") = (2 V) / (3 a)$ otherwise"#,
                formula_plain: "sigma = V/B (1 +/- 6e/B) for |e| <= B/6, sigma_max = 2V/(3a) otherwise",
                reference: CodeReference::Mechanics,
                variables: vec![
                    Variable::new("a", "Distance from the resultant to the nearer base edge", "m"),
                    Variable::new("sigma_(\"max\")", "Peak base pressure", "kPa"),
                ],
                assumptions: vec!["No tension at the base", "Resultant outside the base is a failure"],
                category: EquationCategory::Bearing,
                source_module: "failure_modes/bearing.rs",
                source_function: "bearing_distribution",
            },

            Equation::BearingCapacityFactors => EquationMetadata {
                name: "Bearing Capacity Factors",
                description: "Meyerhof-type bearing capacity factors of the foundation soil",
                formula_typst: r#"$N_q = e^(pi tan phi_f) tan^2(45° + phi_f / 2)$, $N_c = (N_q - 1) cot phi_f$, $N_gamma = (N_q - 1) tan(1.4 phi_f)$"#,
                formula_plain: "N_q = e^(pi tan phi) tan^2(45 + phi/2), N_c = (N_q - 1) cot(phi), N_gamma = (N_q - 1) tan(1.4 phi)",
                reference: CodeReference::Meyerhof,
                variables: vec![Variable::new("phi_f", "Foundation soil friction angle", "deg")],
                assumptions: vec!["N_gamma undefined for phi_f >= 64.3°"],
                category: EquationCategory::Bearing,
                source_module: "failure_modes/bearing.rs",
                source_function: "bearing_capacity_factors",
            },

            Equation::UltimateBearingCapacity => EquationMetadata {
                name: "Ultimate Bearing Capacity",
                description: "Ultimate bearing pressure of the foundation under the leveling pad",
                formula_typst: r#"$q_f = 1/2 gamma_f B_f N_gamma + c_f N_c + gamma_f D N_q$"#,
                formula_plain: "q_f = 1/2 gamma_f B_f N_gamma + c_f N_c + gamma_f D N_q",
                reference: CodeReference::Meyerhof,
                variables: vec![
                    Variable::new("B_f", "Footing width, or the base width without a footing", "m"),
                    Variable::new("D", "Embedment depth", "m"),
                    Variable::new("c_f", "Foundation cohesion", "kPa"),
                ],
                assumptions: vec!["Strip footing, no shape, depth or inclination factors"],
                category: EquationCategory::Bearing,
                source_module: "failure_modes/bearing.rs",
                source_function: "evaluate_ultimate",
            },

            Equation::TributaryLayerLoad => EquationMetadata {
                name: "Tributary Geogrid Load",
                description: "Horizontal internal pressure collected by a layer between the midpoints to its neighbours",
                formula_typst: r#"$F_g = integral_(z_"top")^(z_"bot") sigma_(h,"int")(z) dif z$"#,
                formula_plain: "F_g = integral of sigma_h,int(z) dz from z_top to z_bot",
                reference: CodeReference::Ncma { topic: "internal stability, tributary area method" },
                variables: vec![
                    Variable::new("z_(\"top\")", "Midpoint to the layer above (0 for the top layer)", "m"),
                    Variable::new("z_(\"bot\")", "Midpoint to the layer below (H for the bottom layer)", "m"),
                ],
                assumptions: vec!["Internal pressure state uses the infill soil"],
                category: EquationCategory::Reinforcement,
                source_module: "failure_modes/geogrid.rs",
                source_function: "tributary_demands",
            },

            Equation::LongTermAllowableStrength => EquationMetadata {
                name: "Long-Term Allowable Design Strength",
                description: "Ultimate grid strength reduced for creep, installation damage and durability",
                formula_typst: r#"$"LTADS" = T_("ult") / "RF"$"#,
                formula_plain: "LTADS = T_ult / RF",
                reference: CodeReference::Ncma { topic: "geosynthetic reinforcement strength" },
                variables: vec![
                    Variable::new("T_(\"ult\")", "Ultimate tensile strength", "kN/m"),
                    Variable::new("\"RF\"", "Combined reduction factor", "-"),
                ],
                assumptions: vec![],
                category: EquationCategory::Reinforcement,
                source_module: "geometry.rs",
                source_function: "WallGeometry::build",
            },

            Equation::PulloutEmbedment => EquationMetadata {
                name: "Embedment Beyond the Failure Plane",
                description: "Grid length anchored behind the active zone",
                formula_typst: r#"$L_a = min(0.3 H, (H - d)(tan(45° - phi_i / 2) - tan omega))$, $L_e = L_g - max(0, d_b - L_s) - L_a$"#,
                formula_plain: "L_a = min(0.3H, (H - d)(tan(45 - phi_i/2) - tan(omega))), L_e = L_g - max(0, d_b - L_s) - L_a",
                reference: CodeReference::Ncma { topic: "pullout of reinforcement" },
                variables: vec![
                    Variable::new("d", "Layer depth below the top", "m"),
                    Variable::new("L_g", "Grid length", "m"),
                    Variable::new("L_s", "Front offset of the grid", "m"),
                    Variable::new("d_b", "Depth of the block at the layer", "m"),
                ],
                assumptions: vec!["L_a and L_e are not negative"],
                category: EquationCategory::Reinforcement,
                source_module: "failure_modes/geogrid.rs",
                source_function: "evaluate_pullout",
            },

            Equation::PulloutResistance => EquationMetadata {
                name: "Pullout Resistance",
                description: "Frictional anchorage of the embedded grid, capped by the grid strength",
                formula_typst: r#"$F_("gr") = min(2 L_e sigma_v C_i tan phi_i R_c, "LTADS")$"#,
                formula_plain: "F_gr = min(2 L_e sigma_v C_i tan(phi_i) R_c, LTADS)",
                reference: CodeReference::Ncma { topic: "pullout of reinforcement" },
                variables: vec![
                    Variable::new("sigma_v", "Overburden at the layer, gamma_i d plus dead surcharge", "kPa"),
                    Variable::new("C_i", "Interaction coefficient", "-"),
                    Variable::new("R_c", "Coverage ratio", "-"),
                ],
                assumptions: vec!["Both faces of the grid engaged"],
                category: EquationCategory::Reinforcement,
                source_module: "failure_modes/geogrid.rs",
                source_function: "evaluate_pullout",
            },

            Equation::ConnectionStrength => EquationMetadata {
                name: "Facing Connection",
                description: "Load reaching the face compared with the grid-to-block connection strength",
                formula_typst: r#"$F_W = 2/3 F_g$, $F_("CS") = a + b N$"#,
                formula_plain: "F_W = 2/3 F_g, F_CS = a + b N",
                reference: CodeReference::Ncma { topic: "facing connection strength" },
                variables: vec![
                    Variable::new("N", "Weight of the courses above the layer", "kN/m"),
                    Variable::new("a", "Connection intercept", "kN/m"),
                    Variable::new("b", "Connection slope", "-"),
                ],
                assumptions: vec!["Two thirds of the layer load reaches the face"],
                category: EquationCategory::Facing,
                source_module: "failure_modes/geogrid.rs",
                source_function: "evaluate_connection",
            },

            Equation::CourseInterfaceShear => EquationMetadata {
                name: "Course Interface Shear",
                description: "Shear capacity between stacked courses against the internal pressure above the interface",
                formula_typst: r#"$V_u = a_u + N mu$"#,
                formula_plain: "V_u = a_u + N mu",
                reference: CodeReference::Ncma { topic: "interface shear" },
                variables: vec![
                    Variable::new("a_u", "Interface shear intercept", "kN/m"),
                    Variable::new("mu", "Interface friction coefficient", "-"),
                    Variable::new("N", "Weight of the courses above the interface", "kN/m"),
                ],
                assumptions: vec!["Only evaluated when interface properties are supplied"],
                category: EquationCategory::Facing,
                source_module: "failure_modes/course_sliding.rs",
                source_function: "evaluate",
            },

            Equation::FactorOfSafety => EquationMetadata {
                name: "Factor of Safety",
                description: "Resisting over driving quantity, compared with the required minimum",
                formula_typst: r#"$"FOS" = R / D >= "FOS"_("req")$"#,
                formula_plain: "FOS = R / D >= FOS_req",
                reference: CodeReference::Mechanics,
                variables: vec![
                    Variable::new("R", "Resisting force, moment or pressure", "-"),
                    Variable::new("D", "Driving force, moment or pressure", "-"),
                ],
                assumptions: vec!["Not applicable when the driving quantity is negligible"],
                category: EquationCategory::DesignChecks,
                source_module: "failure_modes/mod.rs",
                source_function: "factor_of_safety",
            },
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }

    /// Get all categories that contain at least one equation
    pub fn all_categories() -> Vec<EquationCategory> {
        use EquationCategory::*;
        let mut cats = vec![
            Geometry,
            EarthPressure,
            ExternalStability,
            Bearing,
            Reinforcement,
            Facing,
            DesignChecks,
        ];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All equations in the registry (for iteration)
pub static ALL_EQUATIONS: &[Equation] = &[
    Equation::BatterAngle,
    Equation::BlockWeight,
    Equation::ReinforcedSoilWeight,
    Equation::CenterOfMass,
    Equation::CoulombActiveCoefficient,
    Equation::RankineActiveCoefficient,
    Equation::ActivePressureDistribution,
    Equation::SurchargeLateralPressure,
    Equation::ActiveForceComponents,
    Equation::PassiveResistance,
    Equation::SlidingResistance,
    Equation::OverturningMoments,
    Equation::BearingEccentricity,
    Equation::BearingPressureDistribution,
    Equation::BearingCapacityFactors,
    Equation::UltimateBearingCapacity,
    Equation::TributaryLayerLoad,
    Equation::LongTermAllowableStrength,
    Equation::PulloutEmbedment,
    Equation::PulloutResistance,
    Equation::ConnectionStrength,
    Equation::CourseInterfaceShear,
    Equation::FactorOfSafety,
];

// ============================================================================
// Equation Usage Tracking
// ============================================================================

/// Record of an equation being used in an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationUsage {
    pub equation: Equation,
    /// Where/why it was used (e.g., "Geogrid pullout")
    pub context: String,
    /// Layer or interface the equation was applied to
    pub element_label: Option<String>,
}

impl EquationUsage {
    pub fn new(equation: Equation, context: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            element_label: None,
        }
    }

    pub fn for_element(equation: Equation, context: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            element_label: Some(label.into()),
        }
    }
}

/// Collector for equation usage, turned into the report appendix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationTracker {
    usages: Vec<EquationUsage>,
}

impl EquationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an equation was used
    pub fn record(&mut self, equation: Equation, context: impl Into<String>) {
        self.usages.push(EquationUsage::new(equation, context));
    }

    /// Record equation usage for a specific layer or interface
    pub fn record_for_element(&mut self, equation: Equation, context: impl Into<String>, label: impl Into<String>) {
        self.usages.push(EquationUsage::for_element(equation, context, label));
    }

    pub fn usages(&self) -> &[EquationUsage] {
        &self.usages
    }

    /// Unique equations in first-use order
    pub fn unique_equations(&self) -> Vec<Equation> {
        let mut seen = std::collections::HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.equation))
            .map(|u| u.equation)
            .collect()
    }

    /// Group usages by equation
    pub fn by_equation(&self) -> std::collections::HashMap<Equation, Vec<&EquationUsage>> {
        let mut map: std::collections::HashMap<Equation, Vec<&EquationUsage>> = std::collections::HashMap::new();
        for usage in &self.usages {
            map.entry(usage.equation).or_default().push(usage);
        }
        map
    }

    /// Group unique equations by category, categories in appendix order
    pub fn by_category(&self) -> Vec<(EquationCategory, Vec<Equation>)> {
        let unique = self.unique_equations();
        let mut by_cat: std::collections::HashMap<EquationCategory, Vec<Equation>> = std::collections::HashMap::new();

        for eq in unique {
            let cat = eq.metadata().category;
            by_cat.entry(cat).or_default().push(eq);
        }

        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }

    /// Merge another tracker into this one
    pub fn merge(&mut self, other: EquationTracker) {
        self.usages.extend(other.usages);
    }
}

// ============================================================================
// Typst Appendix Generation
// ============================================================================

impl EquationTracker {
    /// Generate Typst markup for the "List of Equations" appendix.
    ///
    /// ```rust
    /// use wall_core::equations::registry::{Equation, EquationTracker};
    ///
    /// let mut tracker = EquationTracker::new();
    /// tracker.record_for_element(Equation::TributaryLayerLoad, "Geogrid rupture", "Layer 2");
    ///
    /// let typst = tracker.generate_appendix_typst();
    /// assert!(typst.contains("Tributary Geogrid Load"));
    /// assert!(typst.contains("Layer 2"));
    /// ```
    pub fn generate_appendix_typst(&self) -> String {
        let mut output = String::new();

        output.push_str(r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Appendix: List of Equations]
  ]
]

#v(12pt)

#text(size: 10pt)[
  This appendix lists every equation used in this wall analysis, with its
  reference and the layers or interfaces it was applied to.
]

#v(16pt)
"##);

        let by_category = self.by_category();
        if by_category.is_empty() {
            output.push_str("#text(style: \"italic\")[No equations recorded for this analysis.]\n");
            return output;
        }

        let usage_by_eq = self.by_equation();

        for (category, equations) in by_category {
            output.push_str(&format!("\n== {}\n\n", category.display_name()));

            for equation in equations {
                let meta = equation.metadata();

                output.push_str(&format!("=== {}\n\n", meta.name));
                output.push_str(&format!("#text(size: 10pt)[{}]\n\n", meta.description));
                output.push_str(&format!("*Formula:* {}\n\n", meta.formula_typst));
                output.push_str(&format!("*Reference:* {}\n\n", meta.reference.citation()));

                if !meta.variables.is_empty() {
                    output.push_str("*Variables:*\n");
                    output.push_str("#table(\n");
                    output.push_str("  columns: (auto, 1fr, auto),\n");
                    output.push_str("  inset: 6pt,\n");
                    output.push_str("  stroke: 0.5pt,\n");
                    output.push_str("  align: (left, left, left),\n");
                    output.push_str("  table.header([*Symbol*], [*Description*], [*Units*]),\n");
                    for var in &meta.variables {
                        output.push_str(&format!(
                            "  [${}$], [{}], [{}],\n",
                            escape_typst_math(var.symbol),
                            var.description,
                            var.units
                        ));
                    }
                    output.push_str(")\n\n");
                }

                if let Some(usages) = usage_by_eq.get(&equation) {
                    let mut labels: Vec<&str> = usages
                        .iter()
                        .filter_map(|u| u.element_label.as_deref())
                        .collect();
                    labels.sort();
                    labels.dedup();
                    if !labels.is_empty() {
                        output.push_str(&format!("*Applied to:* {}\n\n", labels.join(", ")));
                    }
                }

                if !meta.assumptions.is_empty() {
                    output.push_str("*Assumptions:*\n");
                    for assumption in &meta.assumptions {
                        output.push_str(&format!("- {}\n", assumption));
                    }
                    output.push('\n');
                }

                output.push_str("#v(8pt)\n");
                output.push_str("#line(length: 100%, stroke: 0.25pt + gray)\n");
                output.push_str("#v(8pt)\n\n");
            }
        }

        output
    }
}

/// Equations the load model always uses for the given theory.
pub fn load_model_equations(coulomb: bool, reinforced: bool) -> Vec<Equation> {
    let mut equations = vec![Equation::BatterAngle, Equation::BlockWeight];
    if reinforced {
        equations.push(Equation::ReinforcedSoilWeight);
    }
    equations.push(Equation::CenterOfMass);
    equations.push(if coulomb {
        Equation::CoulombActiveCoefficient
    } else {
        Equation::RankineActiveCoefficient
    });
    equations.extend([
        Equation::ActivePressureDistribution,
        Equation::SurchargeLateralPressure,
        Equation::ActiveForceComponents,
    ]);
    equations
}

/// Escape special characters for Typst math mode
fn escape_typst_math(s: &str) -> String {
    s.replace('\\', "\\\\")
}

// ============================================================================
// Markdown Generation for EQUATIONS.md
// ============================================================================

/// Generate the EQUATIONS.md reference from the registry.
///
/// ```rust
/// use wall_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("Terrace Equations Reference"));
/// assert!(markdown.contains("## Earth Pressure"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(24_000);

    output.push_str(r#"# Terrace Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

Every formula used by the segmental retaining wall analysis, with its
reference, source location and assumptions.

## Sign Conventions

| Quantity | Positive Direction |
|----------|-------------------|
| x | From the toe into the retained soil |
| y | Up from the base of the wall |
| z | Down from the top of the wall |
| Horizontal earth force | Pushing the wall outward (away from the soil) |
| Vertical force | Downward |
| Eccentricity e | From the base centre toward the toe |

---

"#);

    let categories = Equation::all_categories();

    for category in &categories {
        let equations = Equation::in_category(*category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "| {} | {} | {} |\n",
                        var.symbol.replace('"', ""),
                        var.description,
                        var.units
                    ));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Equations:** {}\n- **Categories:** {}\n",
        ALL_EQUATIONS.len(),
        categories.len()
    ));

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_equations_have_metadata() {
        assert_eq!(ALL_EQUATIONS.len(), 23);

        for eq in ALL_EQUATIONS {
            let meta = eq.metadata();
            assert!(!meta.name.is_empty(), "Equation {:?} has no name", eq);
            assert!(meta.formula_typst.starts_with('$'), "Equation {:?} formula is not math", eq);
            assert!(!meta.variables.is_empty(), "Equation {:?} has no variables", eq);
            assert!(!meta.source_module.is_empty(), "Equation {:?} missing source_module", eq);
            assert!(!meta.source_function.is_empty(), "Equation {:?} missing source_function", eq);
        }

        let connection = Equation::ConnectionStrength.metadata();
        assert!(connection.formula_plain.contains("2/3 F_g"));
    }

    #[test]
    fn test_every_category_is_used() {
        for category in Equation::all_categories() {
            assert!(!Equation::in_category(category).is_empty(), "{:?} is empty", category);
        }
    }

    #[test]
    fn test_code_reference_citation() {
        let ncma = CodeReference::Ncma { topic: "pullout of reinforcement" };
        assert_eq!(
            ncma.citation(),
            "NCMA Design Manual for Segmental Retaining Walls, pullout of reinforcement"
        );
        assert_eq!(CodeReference::Meyerhof.short_form(), "Meyerhof");
    }

    #[test]
    fn test_equation_tracker() {
        let mut tracker = EquationTracker::new();
        tracker.record_for_element(Equation::PulloutResistance, "Pullout", "Layer 1");
        tracker.record_for_element(Equation::PulloutResistance, "Pullout", "Layer 2");
        tracker.record(Equation::SlidingResistance, "Sliding");

        assert_eq!(tracker.usages().len(), 3);
        assert_eq!(
            tracker.unique_equations(),
            vec![Equation::PulloutResistance, Equation::SlidingResistance]
        );

        let by_cat = tracker.by_category();
        assert_eq!(by_cat[0].0, EquationCategory::ExternalStability);
        assert_eq!(by_cat[1].0, EquationCategory::Reinforcement);
    }

    #[test]
    fn test_generate_appendix_typst() {
        let mut tracker = EquationTracker::new();
        tracker.record(Equation::CoulombActiveCoefficient, "Load model");
        tracker.record_for_element(Equation::ConnectionStrength, "Connection", "Layer 3");

        let typst = tracker.generate_appendix_typst();
        assert!(typst.contains("Appendix: List of Equations"));
        assert!(typst.contains("Coulomb Active Coefficient"));
        assert!(typst.contains("== Earth Pressure"));
        assert!(typst.contains("== Facing Stability"));
        assert!(typst.contains("*Applied to:* Layer 3"));
    }

    #[test]
    fn test_generate_appendix_empty_tracker() {
        let typst = EquationTracker::new().generate_appendix_typst();
        assert!(typst.contains("No equations recorded"));
    }

    #[test]
    fn test_load_model_equations() {
        let unreinforced = load_model_equations(false, false);
        assert!(unreinforced.contains(&Equation::RankineActiveCoefficient));
        assert!(!unreinforced.contains(&Equation::ReinforcedSoilWeight));

        let reinforced = load_model_equations(true, true);
        assert!(reinforced.contains(&Equation::CoulombActiveCoefficient));
        assert!(reinforced.contains(&Equation::ReinforcedSoilWeight));
    }

    #[test]
    fn test_generate_equations_markdown() {
        let markdown = generate_equations_markdown();
        assert!(markdown.contains("Auto-generated from source code"));
        assert!(markdown.contains("## Sign Conventions"));
        assert!(markdown.contains("### Pullout Resistance"));
        assert!(markdown.contains("`LTADS = T_ult / RF`"));
        assert!(markdown.contains("failure_modes/geogrid.rs"));
        assert!(markdown.contains("**Total Equations:** 23"));
        assert!(markdown.contains("**Categories:** 7"));
    }
}
