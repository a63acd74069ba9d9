//! # Unit Types
//!
//! Type-safe wrappers for the handful of units a retaining wall design
//! touches. They stay plain `f64` newtypes so JSON/TOML stays just numbers.
//!
//! ## SI Units (Internal)
//!
//! The analysis engine works in SI per metre run of wall:
//! - Length: metres (m)
//! - Unit weight: kilonewtons per cubic metre (kN/m³)
//! - Pressure: kilopascals (kPa)
//! - Line force: kilonewtons per metre (kN/m)
//! - Moment: kilonewton-metres per metre (kN·m/m)
//!
//! Design files may be written in US customary units (ft, pcf, psf, lb/ft);
//! those are converted once when the design is loaded.
//!
//! ## Example
//!
//! ```rust
//! use wall_core::units::{Feet, Meters, Pcf, KnPerM3};
//!
//! let height: Meters = Feet(4.0).into();
//! assert!((height.0 - 1.2192).abs() < 1e-12);
//!
//! let gamma: KnPerM3 = Pcf(120.0).into();
//! assert!((gamma.0 - 18.85).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Standard gravity (m/s²), used to turn a density into a unit weight
pub const STANDARD_GRAVITY: f64 = 9.80665;

const METERS_PER_FOOT: f64 = 0.3048;
const NEWTONS_PER_POUND_FORCE: f64 = 4.448_221_615_260_5;

/// Unit system a design file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// m, kN/m³, kPa, kN/m
    #[default]
    Si,
    /// ft, pcf, psf, lb/ft
    UsCustomary,
}

impl UnitSystem {
    /// Convert a length in this system to metres
    pub fn length_m(self, value: f64) -> f64 {
        match self {
            UnitSystem::Si => value,
            UnitSystem::UsCustomary => Meters::from(Feet(value)).0,
        }
    }

    /// Convert a unit weight in this system to kN/m³
    pub fn unit_weight_kn_m3(self, value: f64) -> f64 {
        match self {
            UnitSystem::Si => value,
            UnitSystem::UsCustomary => KnPerM3::from(Pcf(value)).0,
        }
    }

    /// Convert a pressure in this system to kPa
    pub fn pressure_kpa(self, value: f64) -> f64 {
        match self {
            UnitSystem::Si => value,
            UnitSystem::UsCustomary => Kpa::from(Psf(value)).0,
        }
    }

    /// Convert a line force in this system to kN/m
    pub fn line_force_kn_m(self, value: f64) -> f64 {
        match self {
            UnitSystem::Si => value,
            UnitSystem::UsCustomary => KnPerM::from(LbPerFt(value)).0,
        }
    }

    /// Short label used in reports and log lines
    pub fn label(self) -> &'static str {
        match self {
            UnitSystem::Si => "SI",
            UnitSystem::UsCustomary => "US customary",
        }
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

impl From<Feet> for Meters {
    fn from(ft: Feet) -> Self {
        Meters(ft.0 * METERS_PER_FOOT)
    }
}

impl From<Meters> for Feet {
    fn from(m: Meters) -> Self {
        Feet(m.0 / METERS_PER_FOOT)
    }
}

// ============================================================================
// Unit Weight Units
// ============================================================================

/// Unit weight in kilonewtons per cubic metre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerM3(pub f64);

/// Unit weight in pounds per cubic foot
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pcf(pub f64);

impl From<Pcf> for KnPerM3 {
    fn from(pcf: Pcf) -> Self {
        let n_per_m3 = pcf.0 * NEWTONS_PER_POUND_FORCE / METERS_PER_FOOT.powi(3);
        KnPerM3(n_per_m3 / 1000.0)
    }
}

impl From<KnPerM3> for Pcf {
    fn from(kn: KnPerM3) -> Self {
        Pcf(kn.0 * 1000.0 * METERS_PER_FOOT.powi(3) / NEWTONS_PER_POUND_FORCE)
    }
}

impl KnPerM3 {
    /// Unit weight of a material with the given density (kg/m³)
    ///
    /// ```rust
    /// use wall_core::units::KnPerM3;
    ///
    /// let gamma = KnPerM3::from_density_kg_m3(1800.0);
    /// assert!((gamma.0 - 17.65197).abs() < 1e-9);
    /// ```
    pub fn from_density_kg_m3(density: f64) -> Self {
        KnPerM3(density * STANDARD_GRAVITY / 1000.0)
    }
}

// ============================================================================
// Pressure Units
// ============================================================================

/// Pressure in kilopascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kpa(pub f64);

/// Pressure in pounds per square foot
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Psf(pub f64);

impl From<Psf> for Kpa {
    fn from(psf: Psf) -> Self {
        Kpa(psf.0 * NEWTONS_PER_POUND_FORCE / METERS_PER_FOOT.powi(2) / 1000.0)
    }
}

impl From<Kpa> for Psf {
    fn from(kpa: Kpa) -> Self {
        Psf(kpa.0 * 1000.0 * METERS_PER_FOOT.powi(2) / NEWTONS_PER_POUND_FORCE)
    }
}

// ============================================================================
// Line Force Units
// ============================================================================

/// Force per metre run of wall, kN/m
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerM(pub f64);

/// Force per foot run of wall, lb/ft
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LbPerFt(pub f64);

impl From<LbPerFt> for KnPerM {
    fn from(plf: LbPerFt) -> Self {
        KnPerM(plf.0 * NEWTONS_PER_POUND_FORCE / METERS_PER_FOOT / 1000.0)
    }
}

impl From<KnPerM> for LbPerFt {
    fn from(kn: KnPerM) -> Self {
        LbPerFt(kn.0 * 1000.0 * METERS_PER_FOOT / NEWTONS_PER_POUND_FORCE)
    }
}

// ============================================================================
// Angles
// ============================================================================

/// Angle in degrees (design files always use degrees)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    /// Angle in radians
    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Build from an angle in radians
    pub fn from_radians(rad: f64) -> Self {
        Degrees(rad.to_degrees())
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Feet);
impl_arithmetic!(KnPerM3);
impl_arithmetic!(Pcf);
impl_arithmetic!(Kpa);
impl_arithmetic!(Psf);
impl_arithmetic!(KnPerM);
impl_arithmetic!(LbPerFt);
impl_arithmetic!(Degrees);
