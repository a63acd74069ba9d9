//! # Report Rendering
//!
//! Turns a [`DesignReport`] into Typst markup. The report carries the
//! numbers; this module only lays them out, merges in the project title
//! block and the fixed narrative text, and appends the equations appendix.
//! Compiling the markup to PDF lives in [`crate::pdf`].
//!
//! All values are printed in SI units, the units the analysis runs in.
//!
//! ## Example
//!
//! ```rust
//! use wall_core::analysis::analyze;
//! use wall_core::config::WallDesign;
//! use wall_core::render::render_report_typst;
//!
//! let design = WallDesign::from_toml_str(r#"
//! [project]
//! title = "Garden wall"
//! date = "2026-05-04"
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
//! let report = analyze(&design.analysis_input().unwrap()).unwrap();
//! let typst = render_report_typst(&report, &design.project);
//! assert!(typst.contains("Garden wall"));
//! assert!(typst.contains("2026-05-04"));
//! ```

use tracing::debug;

use crate::failure_modes::{CheckStatus, FailureModeResult, Quantity};
use crate::geometry::ordinal;
use crate::loads::SoilProperties;
use crate::project::ProjectMetadata;
use crate::report::DesignReport;

// ============================================================================
// Templates
// ============================================================================

/// Title page, summary and verdict
const REPORT_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2.5cm, bottom: 2.5cm, left: 2.2cm, right: 2.2cm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Terrace Segmental Retaining Wall Calculations]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[Job: {{JOB_ID}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 11pt)
#set heading(numbering: "1.1")

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Segmental Retaining Wall Analysis]
    #v(4pt)
    #text(size: 14pt)[{{TITLE}}]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Project Information*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Owner:], [{{OWNER}}],
      [Job ID:], [{{JOB_ID}}],
      [Prepared by:], [{{PREPARER}}],
      [Reviewed by:], [{{REVIEWER}}],
      [Date:], [{{DATE}}],
    )
  ],
  [
    *Analysis Basis*
    #v(4pt)
    {{THEORY}} active earth pressure, gravity wall with
    {{WALL_TYPE}}. Bearing capacity after Meyerhof. Geogrid checks follow
    the NCMA segmental retaining wall methodology.
  ]
)

#v(16pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

= Summary

#table(
  columns: (1fr, auto, auto, auto),
  inset: 8pt,
  stroke: 0.5pt,
  align: (left, right, right, center),
  table.header([*Failure Mode*], [*FOS*], [*Required*], [*Status*]),
{{SUMMARY_ROWS}}
)

#v(16pt)

#let pass_status = "{{OVERALL_PASS}}"
#align(center)[
  #block(
    width: auto,
    fill: if pass_status == "PASS" { rgb("#d4edda") } else { rgb("#f8d7da") },
    inset: 16pt,
    radius: 4pt
  )[
    #text(size: 16pt, weight: "bold")[
      #if pass_status == "PASS" [
        DESIGN ACCEPTABLE
      ] else [
        DESIGN NOT ACCEPTABLE
      ]
    ]
    #v(4pt)
    #text(size: 12pt)[Governing failure mode: {{GOVERNING}}]
  ]
]
"##;

/// Closing note after the last failure mode
const DISCLAIMER: &str = r##"
#v(24pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

#text(size: 9pt, fill: gray)[
  Generated by Terrace. Results assume the wall, soils and loads as entered;
  global stability and seismic loading are outside the scope of this analysis.
  Calculations should be verified by a licensed professional engineer.
]
"##;

// ============================================================================
// Rendering
// ============================================================================

/// Render the full report as Typst source.
pub fn render_report_typst(report: &DesignReport, meta: &ProjectMetadata) -> String {
    let date = meta.report_date().format("%Y-%m-%d").to_string();
    let title = if meta.title.is_empty() { "Retaining Wall" } else { meta.title.as_str() };
    let governing = report
        .governing_mode
        .map(|m| m.display_name())
        .unwrap_or("none");

    let mut source = REPORT_TEMPLATE
        .replace("{{TITLE}}", &escape_typst(title))
        .replace("{{OWNER}}", &escape_typst(&meta.owner))
        .replace("{{JOB_ID}}", &escape_typst(&meta.job_id))
        .replace("{{PREPARER}}", &escape_typst(&meta.preparer))
        .replace("{{REVIEWER}}", &escape_typst(&meta.reviewer))
        .replace("{{DATE}}", &date)
        .replace("{{THEORY}}", report.options.theory.display_name())
        .replace(
            "{{WALL_TYPE}}",
            if report.geometry.is_reinforced() {
                "a geogrid-reinforced soil mass"
            } else {
                "no soil reinforcement"
            },
        )
        .replace("{{SUMMARY_ROWS}}", &summary_rows(report))
        .replace("{{OVERALL_PASS}}", if report.acceptable { "PASS" } else { "FAIL" })
        .replace("{{GOVERNING}}", governing);

    source.push_str(&input_section(report));
    source.push_str(&derived_section(report));

    source.push_str("\n#pagebreak()\n\n= Failure Mode Checks\n");
    for result in &report.results {
        source.push_str(&mode_section(result));
    }

    source.push_str(&warnings_section(report));
    source.push_str(DISCLAIMER);
    source.push_str(&report.equations_used().generate_appendix_typst());

    debug!(bytes = source.len(), "rendered report markup");
    source
}

fn summary_rows(report: &DesignReport) -> String {
    report
        .results
        .iter()
        .map(|r| {
            format!(
                "  [{}], [{}], [{}], [{}],",
                r.name,
                fmt_fos(r.factor_of_safety),
                fmt_fixed(r.required_factor_of_safety, 2),
                status_cell(r.status)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn input_section(report: &DesignReport) -> String {
    let geometry = &report.geometry;
    let mut wall_rows = vec![
        param_row("Wall height", "H", geometry.height_m, "m"),
        param_row("Number of courses", "n", geometry.courses.len() as f64, ""),
        param_row("Base width", "B", geometry.base_width_m, "m"),
    ];
    if let Some(depth) = geometry.reinforced_depth_m {
        wall_rows.push(param_row("Reinforced zone depth", "L", depth, "m"));
    }
    if let Some(footing) = &geometry.footing {
        wall_rows.push(param_row("Levelling pad thickness", "t_f", footing.thickness_m, "m"));
        wall_rows.push(param_row("Embedment depth", "D", footing.embedment_m, "m"));
    }
    wall_rows.push(param_row(
        "Backslope angle",
        "beta",
        report.options.backslope_deg,
        "deg",
    ));
    wall_rows.push(param_row(
        "Wall friction ratio",
        "delta / phi",
        report.options.wall_friction_ratio,
        "",
    ));

    let course_rows = geometry
        .courses
        .iter()
        .map(|c| {
            format!(
                "  [{}], [{}], [{}], [{}], [{}], [{}],",
                ordinal(c.index + 1),
                fmt_num(c.base_elevation_m),
                fmt_num(c.height_m),
                fmt_num(c.depth_m),
                fmt_num(c.setback_m),
                fmt_num(c.unit_weight_kn_m3),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut soil_rows = vec![soil_row("Retained", &report.soils.retained)];
    if let Some(soil) = &report.soils.reinforced {
        soil_rows.push(soil_row("Reinforced", soil));
    }
    if let Some(soil) = &report.soils.foundation {
        soil_rows.push(soil_row("Foundation", soil));
    }

    let mut out = format!(
        r##"
#pagebreak()

= Input Parameters

== Wall

#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, center, right, left),
  table.header([*Parameter*], [*Symbol*], [*Value*], [*Unit*]),
{wall_rows}
)

== Courses

#table(
  columns: (auto, 1fr, 1fr, 1fr, 1fr, 1fr),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, right, right, right),
  table.header([*Course*], [*Base (m)*], [*Height (m)*], [*Depth (m)*], [*Setback (m)*], [*$gamma$ (kN/m#super[3])*]),
{course_rows}
)

== Soils

#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, right),
  table.header([*Zone*], [*$gamma$ (kN/m#super[3])*], [*$phi$ (deg)*], [*$c$ (kPa)*]),
{soil_rows}
)
"##,
        wall_rows = wall_rows.join("\n"),
        soil_rows = soil_rows.join("\n"),
    );

    if let Some(q) = &report.loads.surcharge {
        let extent = match q.width_m {
            Some(width) => format!("{} m wide strip", fmt_num(width)),
            None => "unbounded".to_string(),
        };
        out.push_str(&format!(
            r##"
== Surcharge

#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, center, right, left),
  table.header([*Parameter*], [*Symbol*], [*Value*], [*Unit*]),
{pressure}
{offset}
  [Extent], [], [{extent}], [],
  [Load type], [], [{kind}], [],
)
"##,
            pressure = param_row("Surcharge pressure", "q", q.pressure_kpa, "kPa"),
            offset = param_row("Offset from wall face", "x_q", q.offset_m, "m"),
            kind = if q.live { "live" } else { "dead" },
        ));
    }

    if !report.layers.is_empty() {
        let layer_rows = report
            .layers
            .iter()
            .map(|l| {
                format!(
                    "  [{}], [{}], [{}], [{}], [{}], [{}], [{}],",
                    escape_typst(&l.label),
                    fmt_num(l.depth_m),
                    fmt_num(l.length_m),
                    fmt_num(l.ultimate_strength_kn_m),
                    fmt_num(l.reduction_factor),
                    fmt_num(l.ltads_kn_m),
                    fmt_num(l.interaction_coefficient),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str(&format!(
            r##"
== Geogrid Layers

#table(
  columns: (1fr, auto, auto, auto, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, right, right, right, right),
  table.header([*Layer*], [*Depth (m)*], [*Length (m)*], [*$T_"ult"$ (kN/m)*], [*RF*], [*LTADS (kN/m)*], [*$C_i$*]),
{layer_rows}
)
"##
        ));
    }

    let required_rows = report
        .results
        .iter()
        .map(|r| format!("  [{}], [{}],", r.name, fmt_fixed(r.required_factor_of_safety, 2)))
        .collect::<Vec<_>>()
        .join("\n");
    out.push_str(&format!(
        r##"
== Required Factors of Safety

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right),
  table.header([*Failure Mode*], [*Minimum FOS*]),
{required_rows}
)
"##
    ));

    out
}

fn derived_section(report: &DesignReport) -> String {
    let d = &report.derived;
    let rows = [
        param_row("Batter offset", "X_\"batt\"", d.batter_offset_m, "m"),
        param_row("Batter angle", "omega", d.batter_angle_deg, "deg"),
        param_row("Wall friction angle", "delta", d.wall_friction_deg, "deg"),
        param_row("Active earth pressure coefficient", "K_a", d.ka, ""),
        param_row("Active force", "F_a", d.active_force_kn_m, "kN/m"),
        param_row("Horizontal component", "F_(a h)", d.active_horizontal_kn_m, "kN/m"),
        param_row("Vertical component", "F_(a v)", d.active_vertical_kn_m, "kN/m"),
        param_row("Height of application", "y_a", d.active_height_m, "m"),
        param_row("Distance of application from toe", "x_a", d.active_x_m, "m"),
        param_row("Block weight", "W_f", d.block_weight_kn_m, "kN/m"),
        param_row("Reinforced soil weight", "W_s", d.soil_weight_kn_m, "kN/m"),
        param_row("Centre of mass from toe", "C M_x", d.centroid_x_m, "m"),
        param_row("Total vertical load", "V_t", d.total_vertical_kn_m, "kN/m"),
    ];

    format!(
        r##"
= Derived Parameters

#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, center, right, left),
  table.header([*Parameter*], [*Symbol*], [*Value*], [*Unit*]),
{}
)
"##,
        rows.join("\n")
    )
}

fn mode_section(result: &FailureModeResult) -> String {
    let mut out = format!("\n== {}\n\n", result.name);

    if !result.is_applicable() {
        out.push_str("#text(style: \"italic\")[Not applicable.]\n\n");
        for note in &result.notes {
            out.push_str(&format!("{}\n\n", escape_typst(note)));
        }
        return out;
    }

    if !result.quantities.is_empty() {
        out.push_str(&quantity_table(&result.quantities));
    }

    if !result.elements.is_empty() {
        let units = result.driving_kind.units();
        let rows = result
            .elements
            .iter()
            .map(|e| {
                let details = e
                    .details
                    .iter()
                    .map(|q| format!("${} = {}$ {}", q.symbol, fmt_num(q.value), q.units))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "  [{}], [{}], [{}], [{}], [{}], [{}],",
                    escape_typst(&e.label),
                    details,
                    fmt_num(e.driving),
                    fmt_num(e.resisting),
                    fmt_fos(e.factor_of_safety),
                    status_cell(e.status)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str(&format!(
            r##"
#table(
  columns: (auto, 1fr, auto, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, left, right, right, right, center),
  table.header([*Element*], [*Details*], [*Demand ({units})*], [*Capacity ({units})*], [*FOS*], [*Status*]),
{rows}
)
"##
        ));
    }

    let units = result.driving_kind.units();
    out.push_str(&format!(
        "\n*Driving:* {} {units} #h(1em) *Resisting:* {} {units} #h(1em) *FOS* = {} (required {}) #h(1em) {}\n\n",
        fmt_num(result.driving),
        fmt_num(result.resisting),
        fmt_fos(result.factor_of_safety),
        fmt_fixed(result.required_factor_of_safety, 2),
        status_cell(result.status)
    ));

    for note in &result.notes {
        out.push_str(&format!("#text(size: 9pt)[{}]\n\n", escape_typst(note)));
    }
    out
}

fn quantity_table(quantities: &[Quantity]) -> String {
    let rows = quantities
        .iter()
        .map(|q| {
            format!(
                "  [{}], [${}$], [{}], [{}],",
                q.description,
                q.symbol,
                fmt_num(q.value),
                q.units
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r##"
#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, center, right, left),
  table.header([*Quantity*], [*Symbol*], [*Value*], [*Unit*]),
{rows}
)
"##
    )
}

fn warnings_section(report: &DesignReport) -> String {
    if report.warnings.is_empty() {
        return String::new();
    }
    let items = report
        .warnings
        .iter()
        .map(|w| format!("- {}", escape_typst(&w.message)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r##"
= Warnings

#block(width: 100%, fill: rgb("#fff3cd"), inset: 10pt, radius: 4pt)[
{items}
]
"##
    )
}

// ============================================================================
// Formatting helpers
// ============================================================================

fn param_row(name: &str, symbol: &str, value: f64, units: &str) -> String {
    format!("  [{}], [${}$], [{}], [{}],", name, symbol, fmt_num(value), units)
}

fn soil_row(zone: &str, soil: &SoilProperties) -> String {
    format!(
        "  [{}], [{}], [{}], [{}],",
        zone,
        fmt_num(soil.unit_weight_kn_m3),
        fmt_num(soil.friction_angle_deg),
        fmt_num(soil.cohesion_kpa)
    )
}

fn status_cell(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "#text(fill: rgb(\"#1e7e34\"))[OK]",
        CheckStatus::Fail => "#text(fill: rgb(\"#c82333\"), weight: \"bold\")[FAIL]",
        CheckStatus::NotApplicable => "N/A",
    }
}

fn fmt_fos(fos: Option<f64>) -> String {
    fos.map(|f| fmt_fixed(f, 2)).unwrap_or_else(|| "N/A".to_string())
}

fn fmt_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Three significant decimals for small values, fewer for large ones
fn fmt_num(value: f64) -> String {
    let magnitude = value.abs();
    if value == value.trunc() && magnitude < 1e6 {
        format!("{}", value as i64)
    } else if magnitude >= 100.0 {
        fmt_fixed(value, 1)
    } else {
        fmt_fixed(value, 3)
    }
}

/// Escape special Typst characters in user-provided text.
///
/// Braces are escaped too, so user text can never form a `{{PLACEHOLDER}}`.
/// Heading and list markers (`=`, `-`, `+`, `/`) only need escaping at the
/// start of a line.
pub fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut line_start = true;
    for c in s.chars() {
        let special = matches!(
            c,
            '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '~' | '{' | '}'
        );
        if special || (line_start && matches!(c, '=' | '-' | '+' | '/')) {
            out.push('\\');
        }
        out.push(c);
        line_start = c == '\n' || (line_start && matches!(c, ' ' | '\t'));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, fixtures};
    use chrono::NaiveDate;

    fn meta() -> ProjectMetadata {
        ProjectMetadata {
            title: "Wall #1 [north]".to_string(),
            job_id: "26-014".to_string(),
            owner: "A_Client".to_string(),
            preparer: "B. Engineer".to_string(),
            reviewer: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 5, 4),
        }
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("Wall #1 [north]"), "Wall \\#1 \\[north\\]");
        assert_eq!(escape_typst("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_typst("plain text"), "plain text");
        assert_eq!(escape_typst("{{OWNER}}"), "\\{\\{OWNER\\}\\}");
    }

    #[test]
    fn test_escape_line_leading_markup() {
        assert_eq!(escape_typst("= North wall"), "\\= North wall");
        assert_eq!(escape_typst("  - item"), "  \\- item");
        assert_eq!(escape_typst("a\n+ b\n/ c"), "a\n\\+ b\n\\/ c");
        assert_eq!(escape_typst("1-2 = 3/4 + 5"), "1-2 = 3/4 + 5");
    }

    #[test]
    fn test_user_text_is_not_substituted() {
        let report = analyze(&fixtures::scenario()).unwrap();
        let mut meta = meta();
        meta.title = "Job {{OWNER}} {{DATE}}".to_string();
        meta.owner = "ACME".to_string();
        let typst = render_report_typst(&report, &meta);

        assert!(typst.contains("Job \\{\\{OWNER\\}\\} \\{\\{DATE\\}\\}"));
        assert!(!typst.contains("Job ACME"));
        assert!(!typst.contains("{{"), "unreplaced placeholder");
    }

    #[test]
    fn test_heading_marker_in_title_is_escaped() {
        let report = analyze(&fixtures::scenario()).unwrap();
        let mut meta = meta();
        meta.title = "= North wall".to_string();
        let typst = render_report_typst(&report, &meta);
        assert!(typst.contains("[\\= North wall]"));
    }

    #[test]
    fn test_render_unreinforced_report() {
        let report = analyze(&fixtures::scenario()).unwrap();
        let typst = render_report_typst(&report, &meta());

        assert!(!typst.contains("{{"), "unreplaced placeholder");
        assert!(typst.contains("Wall \\#1 \\[north\\]"));
        assert!(typst.contains("A\\_Client"));
        assert!(typst.contains("2026-05-04"));
        assert!(typst.contains("Governing failure mode: Ultimate Bearing Capacity"));
        assert!(typst.contains("\"PASS\""));
        for result in &report.results {
            assert!(typst.contains(&format!("== {}", result.name)));
        }
        assert!(typst.contains("no soil reinforcement"));
        assert!(!typst.contains("== Geogrid Layers"));
        assert!(!typst.contains("= Warnings"));
        assert!(typst.contains("Appendix: List of Equations"));
    }

    #[test]
    fn test_render_reinforced_report_lists_layers() {
        let report = analyze(&fixtures::reinforced()).unwrap();
        let typst = render_report_typst(&report, &meta());
        assert!(typst.contains("== Geogrid Layers"));
        for layer in &report.layers {
            assert!(typst.contains(&escape_typst(&layer.label)));
        }
        assert!(typst.contains("*Applied to:*"));
    }

    #[test]
    fn test_render_failing_design_lists_warnings() {
        let mut input = fixtures::scenario();
        input.factors.sliding = 4.0;
        let report = analyze(&input).unwrap();
        let typst = render_report_typst(&report, &meta());
        assert!(typst.contains("\"FAIL\""));
        assert!(typst.contains("= Warnings"));
        assert!(typst.contains("Base Sliding factor of safety"));
    }

    #[test]
    fn test_render_is_deterministic_with_fixed_date() {
        let report = analyze(&fixtures::reinforced()).unwrap();
        assert_eq!(render_report_typst(&report, &meta()), render_report_typst(&report, &meta()));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(0.333_333), "0.333");
        assert_eq!(fmt_num(124.456), "124.5");
        assert_eq!(fmt_fos(None), "N/A");
        assert_eq!(fmt_fos(Some(6.1875)), "6.19");
    }
}
