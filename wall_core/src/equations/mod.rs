//! # Wall Analysis Equations
//!
//! Every formula the analysis applies is registered in [`registry`] with its
//! reference, variables and assumptions. The registry feeds two outputs:
//!
//! - the "Equations Used" appendix of the rendered report
//! - `EQUATIONS.md`, regenerated by the `gen-equations` binary
//!
//! ## Sign Conventions
//!
//! - **x**: measured from the toe of the bottom course toward the backfill
//! - **y**: measured up from the base of the bottom course
//! - **Depth**: measured down from the top of the wall
//! - **Moments**: taken about the toe; driving moments overturn outward
//! - **Forces**: per metre run of wall

pub mod registry;

pub use registry::{
    generate_equations_markdown, load_model_equations, CodeReference, Equation, EquationCategory, EquationMetadata,
    EquationTracker, EquationUsage, Variable, ALL_EQUATIONS,
};
