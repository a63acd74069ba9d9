//! # Error Types
//!
//! Structured error types for wall_core. Every fatal error names the
//! offending parameter so a design file can be fixed without reading code.
//!
//! - [`GeometryError`] - the wall/geogrid description is not a buildable wall
//! - [`LoadModelError`] - soil or surcharge parameters give no defined earth pressure
//! - [`CalcError`] - crate-wide error wrapping both, plus configuration, I/O and rendering
//!
//! Failing a factor-of-safety check is NOT an error: it is reported as a
//! [`FailureModeWarning`](crate::report::FailureModeWarning) inside the report.
//!
//! ## Example
//!
//! ```rust
//! use wall_core::errors::{CalcError, CalcResult};
//!
//! fn validate_height(height_m: f64) -> CalcResult<()> {
//!     if height_m <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "height_m",
//!             height_m.to_string(),
//!             "Wall height must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(validate_height(-1.0).unwrap_err().error_code(), "INVALID_INPUT");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for wall_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// The wall description cannot be turned into a valid [`WallGeometry`](crate::geometry::WallGeometry).
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum GeometryError {
    /// No courses were given
    #[error("Wall has no courses")]
    NoCourses,

    /// A course or footing dimension is zero, negative or not finite
    #[error("Invalid dimension '{field}' = {value}: {reason}")]
    InvalidDimension {
        field: String,
        value: f64,
        reason: String,
    },

    /// A course does not start where the course below ends
    #[error("Course {course} starts at {actual_m} m but the course below ends at {expected_m} m")]
    NonContiguousCourses {
        course: usize,
        expected_m: f64,
        actual_m: f64,
    },

    /// The bottom course defines the toe and cannot be set back
    #[error("Bottom course setback must be 0, got {setback_m} m")]
    BaseCourseSetback { setback_m: f64 },

    /// A geogrid layer is not strictly inside the wall height
    #[error("Geogrid layer {layer} at depth {depth_m} m is outside the wall (height {wall_height_m} m)")]
    LayerOutsideWall {
        layer: usize,
        depth_m: f64,
        wall_height_m: f64,
    },

    /// Two geogrid layers at the same depth
    #[error("Geogrid layers {first} and {second} are both at depth {depth_m} m")]
    DuplicateLayerDepth {
        first: usize,
        second: usize,
        depth_m: f64,
    },

    /// A geogrid property is out of range
    #[error("Invalid geogrid property '{field}' on layer {layer}: {value} - {reason}")]
    InvalidLayerProperty {
        layer: usize,
        field: String,
        value: f64,
        reason: String,
    },
}

impl GeometryError {
    /// Create an InvalidDimension error
    pub fn invalid_dimension(field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        GeometryError::InvalidDimension {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create an InvalidLayerProperty error
    pub fn invalid_layer(layer: usize, field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        GeometryError::InvalidLayerProperty {
            layer,
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }
}

/// Soil, surcharge or pressure-theory parameters with no defined active pressure.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum LoadModelError {
    /// Friction angle outside (0°, 90°)
    #[error("Friction angle of {zone} soil must be in (0, 90) degrees, got {value_deg}")]
    FrictionAngleOutOfRange { zone: String, value_deg: f64 },

    /// Unit weight, cohesion or another soil property out of range
    #[error("Invalid {field} for {zone} soil: {value} - {reason}")]
    InvalidSoilProperty {
        zone: String,
        field: String,
        value: f64,
        reason: String,
    },

    /// Backslope is negative or not flatter than the friction angle
    #[error("Backslope {backslope_deg} deg must be in [0, {friction_angle_deg}) for {zone} soil")]
    BackslopeTooSteep {
        zone: String,
        backslope_deg: f64,
        friction_angle_deg: f64,
    },

    /// Wall-friction ratio δ/φ outside [0, 1]
    #[error("Wall friction ratio must be in [0, 1], got {ratio}")]
    InvalidWallFriction { ratio: f64 },

    /// Surcharge pressure, offset or width out of range
    #[error("Invalid surcharge '{field}' = {value}: {reason}")]
    InvalidSurcharge {
        field: String,
        value: f64,
        reason: String,
    },

    /// A pressure or bearing coefficient evaluated to a non-finite or non-positive value
    #[error("{coefficient} undefined for {zone} soil: {reason}")]
    UndefinedCoefficient {
        coefficient: String,
        zone: String,
        reason: String,
    },
}

impl LoadModelError {
    /// Create an InvalidSoilProperty error
    pub fn invalid_soil(zone: impl Into<String>, field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        LoadModelError::InvalidSoilProperty {
            zone: zone.into(),
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create an UndefinedCoefficient error
    pub fn undefined(coefficient: impl Into<String>, zone: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadModelError::UndefinedCoefficient {
            coefficient: coefficient.into(),
            zone: zone.into(),
            reason: reason.into(),
        }
    }
}

/// Structured error type for all wall_core operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by the CLI and other consumers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Wall geometry could not be built
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Earth pressure could not be computed
    #[error("Load model error: {0}")]
    LoadModel(#[from] LoadModelError),

    /// An input value is invalid (out of range, inconsistent, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Design file uses a unit system we do not convert
    #[error("Unknown unit system: {units}")]
    UnknownUnits { units: String },

    /// Calculation could not be completed (degenerate statics)
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Typst compile or PDF export failed
    #[error("Render error during {stage}: {reason}")]
    Render { stage: String, reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Create a Render error
    pub fn render(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Render {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// True when the problem is in the design file rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CalcError::Geometry(_)
                | CalcError::LoadModel(_)
                | CalcError::InvalidInput { .. }
                | CalcError::MissingField { .. }
                | CalcError::UnknownUnits { .. }
                | CalcError::SerializationError { .. }
                | CalcError::VersionMismatch { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Geometry(_) => "GEOMETRY_ERROR",
            CalcError::LoadModel(_) => "LOAD_MODEL_ERROR",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnknownUnits { .. } => "UNKNOWN_UNITS",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Render { .. } => "RENDER_ERROR",
        }
    }
}
