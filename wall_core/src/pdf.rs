//! # PDF Generation Module
//!
//! Compiles the Typst markup from [`crate::render`] into PDF bytes with the
//! embedded Typst compiler.
//!
//! ## Architecture
//!
//! - The document is a single detached source; no file system access
//! - Fonts come from `typst-assets`, loaded once per process
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use wall_core::analysis::analyze;
//! use wall_core::file_io::{load_design, write_atomic};
//! use wall_core::pdf::render_report_pdf;
//! use std::path::Path;
//!
//! let design = load_design(Path::new("wall.toml"))?;
//! let report = analyze(&design.analysis_input()?)?;
//! let pdf = render_report_pdf(&report, &design.project)?;
//! write_atomic(Path::new("wall.pdf"), &pdf)?;
//! # Ok::<(), wall_core::errors::CalcError>(())
//! ```

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use tracing::{debug, info};
use typst::diag::{FileError, FileResult, SourceDiagnostic};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{CalcError, CalcResult};
use crate::project::ProjectMetadata;
use crate::render::render_report_typst;
use crate::report::DesignReport;

/// Bundled fonts, parsed on first use
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    let fonts: Vec<Font> = typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect();
    debug!(count = fonts.len(), "loaded typst fonts");
    fonts
});

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling one in-memory document.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Local::now();
        Datetime::from_ymd(now.year(), now.month().try_into().ok()?, now.day().try_into().ok()?)
    }
}

// ============================================================================
// Compilation
// ============================================================================

fn join_diagnostics(errors: &[SourceDiagnostic]) -> String {
    errors.iter().map(|e| e.message.to_string()).collect::<Vec<_>>().join("; ")
}

/// Compile Typst source to PDF bytes.
pub fn compile_typst(source: String) -> CalcResult<Vec<u8>> {
    let world = PdfWorld::new(source);

    let warned = typst::compile(&world);
    for warning in &warned.warnings {
        debug!(message = %warning.message, "typst warning");
    }
    let document = warned
        .output
        .map_err(|errors| CalcError::render("typst compile", join_diagnostics(&errors)))?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default())
        .map_err(|errors| CalcError::render("pdf export", join_diagnostics(&errors)))?;

    info!(bytes = pdf_bytes.len(), "compiled PDF report");
    Ok(pdf_bytes)
}

/// Render a design report to PDF.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError::Render)` - If compilation or export fails
pub fn render_report_pdf(report: &DesignReport, meta: &ProjectMetadata) -> CalcResult<Vec<u8>> {
    compile_typst(render_report_typst(report, meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, fixtures};

    #[test]
    fn test_pdf_generation() {
        let report = analyze(&fixtures::reinforced()).unwrap();
        let meta = ProjectMetadata::new("Test wall", "TEST-001");
        let pdf = render_report_pdf(&report, &meta);

        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_invalid_markup_is_a_render_error() {
        let err = compile_typst("#let x = ".to_string()).unwrap_err();
        assert_eq!(err.error_code(), "RENDER_ERROR");
    }
}
