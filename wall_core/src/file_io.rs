//! # File I/O Module
//!
//! - **Design files**: `.json` or `.toml`, checked against the schema version
//! - **Atomic writes**: every output (JSON report, Typst source, PDF) is
//!   written to a `.tmp` sibling, synced, then renamed over the target
//!
//! ## Example
//!
//! ```rust,no_run
//! use wall_core::analysis::analyze;
//! use wall_core::file_io::{load_design, save_report_json};
//! use std::path::Path;
//!
//! let design = load_design(Path::new("wall.toml"))?;
//! let report = analyze(&design.analysis_input()?)?;
//! save_report_json(&report, Path::new("wall.report.json"))?;
//! # Ok::<(), wall_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::config::WallDesign;
use crate::errors::{CalcError, CalcResult};
use crate::project::SCHEMA_VERSION;
use crate::report::DesignReport;

/// Design file formats, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignFormat {
    Json,
    Toml,
}

impl DesignFormat {
    pub fn from_path(path: &Path) -> CalcResult<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Ok(DesignFormat::Json),
            Some("toml") => Ok(DesignFormat::Toml),
            _ => Err(CalcError::file_error(
                "detect format",
                path.display().to_string(),
                "expected a .json or .toml design file",
            )),
        }
    }
}

/// Load and parse a design file.
///
/// # Returns
///
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON/TOML or unknown field
/// * `Err(CalcError::FileError)` - I/O error or unknown extension
pub fn load_design(path: &Path) -> CalcResult<WallDesign> {
    let format = DesignFormat::from_path(path)?;

    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let design = match format {
        DesignFormat::Json => WallDesign::from_json_str(&contents),
        DesignFormat::Toml => WallDesign::from_toml_str(&contents),
    }
    .map_err(|e| match e {
        CalcError::SerializationError { reason } => {
            CalcError::serialization(format!("Invalid design in {}: {}", path.display(), reason))
        }
        other => other,
    })?;

    validate_version(&design.version)?;
    debug!(path = %path.display(), ?format, version = %design.version, "design loaded");
    Ok(design)
}

/// Write bytes with atomic semantics: `.tmp` sibling, fsync, rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut tmp_file = File::create(tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

/// Dump the report as pretty JSON
pub fn save_report_json(report: &DesignReport, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(report).map_err(|e| CalcError::serialization(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.parse().ok()).collect() };

    let (Some(file_parts), Some(current_parts)) = (parse(file_version), parse(SCHEMA_VERSION)) else {
        return Err(mismatch());
    };
    if file_parts.is_empty() || file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // 0.x: a newer minor version may carry fields we do not know
    if current_parts[0] == 0 && file_parts.get(1) > current_parts.get(1) {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("terrace_test_{}_{}", std::process::id(), name))
    }

    const DESIGN_TOML: &str = r#"
version = "0.1.0"

[courses.uniform]
count = 3
block = { height_m = 0.4, depth_m = 0.9, unit_weight_kn_m3 = 21.6 }

[soil.retained]
unit_weight_kn_m3 = 17.7
friction_angle_deg = 30.0
"#;

    #[test]
    fn test_load_toml_and_json() {
        let toml_path = temp_path("design.toml");
        fs::write(&toml_path, DESIGN_TOML).unwrap();
        let design = load_design(&toml_path).unwrap();
        assert_eq!(design.analysis_input().unwrap().courses.len(), 3);

        let json_path = temp_path("design.json");
        fs::write(&json_path, serde_json::to_string(&design).unwrap()).unwrap();
        let reloaded = load_design(&json_path).unwrap();
        assert_eq!(reloaded, design);

        let _ = fs::remove_file(&toml_path);
        let _ = fs::remove_file(&json_path);
    }

    #[test]
    fn test_unknown_extension_and_missing_file() {
        let err = load_design(Path::new("wall.yaml")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        let err = load_design(&temp_path("missing.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_newer_schema_rejected() {
        let path = temp_path("future.toml");
        fs::write(&path, DESIGN_TOML.replace("0.1.0", "0.2.0")).unwrap();
        assert!(matches!(load_design(&path), Err(CalcError::VersionMismatch { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_write_creates_no_tmp_file() {
        let path = temp_path("report.json");
        write_atomic(&path, b"{}").unwrap();

        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        assert!(!Path::new(&tmp).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_demo_designs_load() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos");

        let garden = load_design(&demos.join("garden_wall.toml")).unwrap();
        let report = crate::analysis::analyze(&garden.analysis_input().unwrap()).unwrap();
        assert!(report.acceptable);

        let driveway = load_design(&demos.join("reinforced_wall.json")).unwrap();
        let input = driveway.analysis_input().unwrap();
        assert_eq!(input.courses.len(), 9);
        assert_eq!(input.geogrid.len(), 3);
        assert!(input.options.parallel);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("latest").is_err());
    }
}
