//! # wall_core - Segmental Retaining Wall Analysis Engine
//!
//! `wall_core` is the computational heart of Terrace. It checks a
//! segmental-block retaining wall, optionally reinforced with geogrid,
//! against every external and internal failure mode and produces a
//! [`DesignReport`] that renders to Typst/PDF or dumps to JSON.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: one pass from input to report, no global state
//! - **Deterministic**: identical input gives an identical report
//! - **JSON-First**: all inputs and results implement Serialize/Deserialize
//! - **Rich Errors**: structured error types naming the offending parameter
//!
//! ## Pipeline
//!
//! ```text
//! WallDesign ─► WallGeometry ─► LoadModel ─► FailureMode::evaluate ─► DesignReport ─► render / pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use wall_core::config::WallDesign;
//! use wall_core::analysis::analyze;
//!
//! let design = WallDesign::from_json_str(r#"{
//!     "courses": { "uniform": { "count": 3,
//!         "block": { "height_m": 0.4, "depth_m": 0.9, "unit_weight_kn_m3": 21.6 } } },
//!     "soil": { "retained": { "unit_weight_kn_m3": 17.7, "friction_angle_deg": 30.0 } },
//!     "analysis": { "theory": "rankine" }
//! }"#).unwrap();
//!
//! let report = analyze(&design.analysis_input().unwrap()).unwrap();
//! assert!(report.acceptable);
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Design files (JSON/TOML) and unit conversion
//! - [`geometry`] - Courses, batter, reinforced zone and geogrid layers
//! - [`loads`] - Soil, earth pressure, surcharge and the load model
//! - [`failure_modes`] - The failure mode evaluators
//! - [`analysis`] - The analysis pipeline
//! - [`report`] - Safety aggregation into a [`DesignReport`]
//! - [`render`] / [`pdf`] - Typst markup and PDF output
//! - [`equations`] - Equation registry and report appendix
//! - [`file_io`] - Design loading and atomic output writes
//! - [`units`] - Unit systems and conversions
//! - [`errors`] - Structured error types

pub mod analysis;
pub mod config;
pub mod equations;
pub mod errors;
pub mod failure_modes;
pub mod file_io;
pub mod geometry;
pub mod loads;
pub mod pdf;
pub mod project;
pub mod render;
pub mod report;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use analysis::{analyze, AnalysisOptions, WallAnalysisInput};
pub use config::WallDesign;
pub use errors::{CalcError, CalcResult};
pub use failure_modes::{CheckStatus, FactorsOfSafety, FailureMode, FailureModeResult};
pub use file_io::{load_design, save_report_json, write_atomic};
pub use project::ProjectMetadata;
pub use report::{DesignReport, FailureModeWarning};
