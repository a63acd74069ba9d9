//! # Project Metadata
//!
//! Title block information carried by a design file and printed on the
//! rendered report. None of it takes part in the analysis.
//!
//! ```rust
//! use wall_core::project::ProjectMetadata;
//!
//! let meta = ProjectMetadata::new("Garden wall", "26-014");
//! assert_eq!(meta.job_id, "26-014");
//! assert!(meta.date.is_none());
//! ```

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Current schema version for design files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Who the calculation is for and who prepared it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectMetadata {
    /// Short description of the wall
    #[serde(default)]
    pub title: String,

    /// Job/project number
    #[serde(default)]
    pub job_id: String,

    /// Owner or client
    #[serde(default)]
    pub owner: String,

    /// Engineer who prepared the calculation
    #[serde(default)]
    pub preparer: String,

    /// Engineer who checked it
    #[serde(default)]
    pub reviewer: String,

    /// Calculation date; the rendering day when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl ProjectMetadata {
    pub fn new(title: impl Into<String>, job_id: impl Into<String>) -> Self {
        ProjectMetadata {
            title: title.into(),
            job_id: job_id.into(),
            ..Default::default()
        }
    }

    /// Date printed on the report
    pub fn report_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_parsing() {
        let meta: ProjectMetadata = serde_json::from_str(
            r#"{"title": "Driveway wall", "owner": "A. Client", "preparer": "B. Engineer", "date": "2026-03-01"}"#,
        )
        .unwrap();
        assert_eq!(meta.owner, "A. Client");
        assert_eq!(meta.reviewer, "");
        assert_eq!(meta.report_date(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

        assert!(serde_json::from_str::<ProjectMetadata>(r#"{"engineer": "X"}"#).is_err());
    }

    #[test]
    fn test_report_date_defaults_to_today() {
        let meta = ProjectMetadata::default();
        assert_eq!(meta.report_date(), Local::now().date_naive());
    }
}
