//! Piecewise-linear lateral pressure diagrams.
//!
//! A diagram is a sum of linear segments over depth `z` below the top of the
//! wall. Forces and moments are exact integrals of the segments, so the
//! resultant of a triangle sits at exactly two thirds of its depth.

use serde::{Deserialize, Serialize};

/// Linear pressure between two depths; zero outside them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureSegment {
    pub top_depth_m: f64,
    pub bottom_depth_m: f64,
    pub top_kpa: f64,
    pub bottom_kpa: f64,
}

impl PressureSegment {
    pub fn new(top_depth_m: f64, bottom_depth_m: f64, top_kpa: f64, bottom_kpa: f64) -> Self {
        PressureSegment {
            top_depth_m,
            bottom_depth_m,
            top_kpa,
            bottom_kpa,
        }
    }

    /// Constant pressure between two depths
    pub fn uniform(top_depth_m: f64, bottom_depth_m: f64, kpa: f64) -> Self {
        Self::new(top_depth_m, bottom_depth_m, kpa, kpa)
    }

    fn span(&self) -> f64 {
        self.bottom_depth_m - self.top_depth_m
    }

    /// Pressure at depth `z` (kPa)
    pub fn pressure_at(&self, z: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 || z < self.top_depth_m || z > self.bottom_depth_m {
            return 0.0;
        }
        let t = (z - self.top_depth_m) / span;
        self.top_kpa + t * (self.bottom_kpa - self.top_kpa)
    }

    /// Force and first moment about z = 0 of the part between `from` and `to`.
    ///
    /// Over a linear piece from `a` to `b`:
    /// `F = (p_a + p_b)(b − a)/2`, `M = (b − a)/6 · [p_a(2a + b) + p_b(a + 2b)]`.
    pub fn integrate(&self, from: f64, to: f64) -> (f64, f64) {
        let a = from.max(self.top_depth_m);
        let b = to.min(self.bottom_depth_m);
        if b <= a {
            return (0.0, 0.0);
        }
        let p_a = self.pressure_at(a);
        let p_b = self.pressure_at(b);
        let length = b - a;
        let force = (p_a + p_b) * length / 2.0;
        let moment = length / 6.0 * (p_a * (2.0 * a + b) + p_b * (a + 2.0 * b));
        (force, moment)
    }
}

/// Sum of pressure segments acting over a wall of height `height_m`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PressureDiagram {
    pub height_m: f64,
    pub segments: Vec<PressureSegment>,
}

/// Resultant of a diagram (or part of one).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagramResultant {
    /// Force per metre run (kN/m)
    pub force_kn_m: f64,
    /// Height of the line of action above the base (m)
    pub height_m: f64,
}

impl PressureDiagram {
    pub fn new(height_m: f64) -> Self {
        PressureDiagram {
            height_m,
            segments: Vec::new(),
        }
    }

    /// Add a segment, clipped to [0, H]; empty pieces are dropped
    pub fn push(&mut self, segment: PressureSegment) {
        let top = segment.top_depth_m.max(0.0);
        let bottom = segment.bottom_depth_m.min(self.height_m);
        if bottom <= top {
            return;
        }
        let clipped = PressureSegment::new(top, bottom, segment.pressure_at(top), segment.pressure_at(bottom));
        self.segments.push(clipped);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total pressure at depth `z` (kPa)
    pub fn pressure_at(&self, z: f64) -> f64 {
        self.segments.iter().map(|s| s.pressure_at(z)).sum()
    }

    /// Force between two depths and its line of action.
    ///
    /// The height is measured above the base of the wall; it is 0 when the
    /// force is zero.
    pub fn resultant_between(&self, from: f64, to: f64) -> DiagramResultant {
        let (force, moment) = self
            .segments
            .iter()
            .map(|s| s.integrate(from, to))
            .fold((0.0, 0.0), |(f, m), (df, dm)| (f + df, m + dm));
        if force <= 0.0 {
            return DiagramResultant::default();
        }
        DiagramResultant {
            force_kn_m: force,
            height_m: self.height_m - moment / force,
        }
    }

    /// Resultant over the full height
    pub fn resultant(&self) -> DiagramResultant {
        self.resultant_between(0.0, self.height_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_resultant_at_third_height() {
        let mut diagram = PressureDiagram::new(3.0);
        diagram.push(PressureSegment::new(0.0, 3.0, 0.0, 18.0));
        let r = diagram.resultant();
        assert!((r.force_kn_m - 27.0).abs() < 1e-12);
        assert!((r.height_m - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rectangle_resultant_at_mid_height() {
        let mut diagram = PressureDiagram::new(2.0);
        diagram.push(PressureSegment::uniform(0.0, 2.0, 5.0));
        let r = diagram.resultant();
        assert!((r.force_kn_m - 10.0).abs() < 1e-12);
        assert!((r.height_m - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_superposition() {
        // triangle 0..12 kPa plus 3 kPa rectangle over 4 m
        let mut diagram = PressureDiagram::new(4.0);
        diagram.push(PressureSegment::new(0.0, 4.0, 0.0, 12.0));
        diagram.push(PressureSegment::uniform(0.0, 4.0, 3.0));
        let r = diagram.resultant();
        let force = 24.0 + 12.0;
        let moment_about_base = 24.0 * 4.0 / 3.0 + 12.0 * 2.0;
        assert!((r.force_kn_m - force).abs() < 1e-12);
        assert!((r.height_m - moment_about_base / force).abs() < 1e-12);
    }

    #[test]
    fn test_partial_integration() {
        let mut diagram = PressureDiagram::new(2.0);
        diagram.push(PressureSegment::new(0.0, 2.0, 0.0, 10.0));
        let upper = diagram.resultant_between(0.0, 1.0);
        let lower = diagram.resultant_between(1.0, 2.0);
        assert!((upper.force_kn_m - 2.5).abs() < 1e-12);
        assert!((lower.force_kn_m - 7.5).abs() < 1e-12);
        assert!((upper.force_kn_m + lower.force_kn_m - diagram.resultant().force_kn_m).abs() < 1e-12);
        assert!((diagram.pressure_at(0.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_clipping() {
        let mut diagram = PressureDiagram::new(1.0);
        diagram.push(PressureSegment::uniform(0.5, 3.0, 4.0));
        diagram.push(PressureSegment::uniform(1.5, 3.0, 4.0));
        assert_eq!(diagram.segments.len(), 1);
        assert!((diagram.resultant().force_kn_m - 2.0).abs() < 1e-12);
        assert!((diagram.resultant().height_m - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_empty_diagram_has_no_resultant() {
        let diagram = PressureDiagram::new(1.0);
        assert!(diagram.is_empty());
        assert_eq!(diagram.resultant(), DiagramResultant::default());
    }
}
