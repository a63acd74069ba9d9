//! Uniform strip surcharge on the ground behind the wall.

use serde::{Deserialize, Serialize};

use super::earth_pressure::failure_plane_slope;
use crate::errors::LoadModelError;

fn default_live() -> bool {
    true
}

/// Uniform surcharge pressure over a strip starting `offset_m` behind the
/// top of the wall face. An absent width means the strip runs indefinitely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Surcharge {
    /// q (kPa)
    #[serde(alias = "pressure")]
    pub pressure_kpa: f64,
    /// Distance from the top of the wall face to the near edge of the strip (m)
    #[serde(default, alias = "offset")]
    pub offset_m: f64,
    /// Strip width (m)
    #[serde(default, alias = "width")]
    pub width_m: Option<f64>,
    /// Live loads never resist failure
    #[serde(default = "default_live")]
    pub live: bool,
}

impl Surcharge {
    /// Live load over the whole backfill
    pub fn uniform(pressure_kpa: f64) -> Self {
        Surcharge {
            pressure_kpa,
            offset_m: 0.0,
            width_m: None,
            live: true,
        }
    }

    pub fn validate(&self) -> Result<(), LoadModelError> {
        if !self.pressure_kpa.is_finite() || self.pressure_kpa < 0.0 {
            return Err(LoadModelError::InvalidSurcharge {
                field: "pressure_kpa".to_string(),
                value: self.pressure_kpa,
                reason: "must be non-negative".to_string(),
            });
        }
        if !self.offset_m.is_finite() || self.offset_m < 0.0 {
            return Err(LoadModelError::InvalidSurcharge {
                field: "offset_m".to_string(),
                value: self.offset_m,
                reason: "must be non-negative".to_string(),
            });
        }
        if let Some(width) = self.width_m {
            if !width.is_finite() || width <= 0.0 {
                return Err(LoadModelError::InvalidSurcharge {
                    field: "width_m".to_string(),
                    value: width,
                    reason: "must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Depth band `[z1, z2)` over which the strip loads a wall back whose top
    /// is `back_offset_m` behind the top of the face.
    ///
    /// The strip is projected down the active failure plane; `z2` is None
    /// for an unbounded strip.
    pub fn lateral_band(&self, back_offset_m: f64, friction_angle_deg: f64) -> (f64, Option<f64>) {
        let slope = failure_plane_slope(friction_angle_deg);
        let s = (self.offset_m - back_offset_m).max(0.0);
        let end = self
            .width_m
            .map(|w| (self.offset_m + w - back_offset_m).max(0.0) * slope);
        (s * slope, end)
    }

    /// Vertical load of the part of the strip lying over `[x_start, x_end]`,
    /// with the top of the face at `face_x`. Returns (kN/m, x of centroid).
    pub fn load_over(&self, face_x: f64, x_start: f64, x_end: f64) -> Option<(f64, f64)> {
        let strip_start = face_x + self.offset_m;
        let start = strip_start.max(x_start);
        let end = match self.width_m {
            Some(w) => (strip_start + w).min(x_end),
            None => x_end,
        };
        let length = end - start;
        if length <= 0.0 || self.pressure_kpa <= 0.0 {
            return None;
        }
        Some((self.pressure_kpa * length, (start + end) / 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(Surcharge::uniform(10.0).validate().is_ok());
        assert!(Surcharge::uniform(-1.0).validate().is_err());
        let strip = Surcharge {
            width_m: Some(0.0),
            ..Surcharge::uniform(10.0)
        };
        assert!(strip.validate().is_err());
    }

    #[test]
    fn test_lateral_band() {
        let strip = Surcharge {
            offset_m: 1.5,
            width_m: Some(1.0),
            ..Surcharge::uniform(10.0)
        };
        // φ = 30° -> slope tan 60°
        let (z1, z2) = strip.lateral_band(0.5, 30.0);
        assert!((z1 - 3f64.sqrt()).abs() < 1e-12);
        assert!((z2.unwrap() - 2.0 * 3f64.sqrt()).abs() < 1e-12);

        let (z1, z2) = Surcharge::uniform(10.0).lateral_band(0.5, 30.0);
        assert_eq!(z1, 0.0);
        assert!(z2.is_none());
    }

    #[test]
    fn test_load_over_structure() {
        let q = Surcharge::uniform(10.0);
        let (force, x) = q.load_over(0.1, 0.4, 1.6).unwrap();
        assert!((force - 12.0).abs() < 1e-12);
        assert!((x - 1.0).abs() < 1e-12);

        let far = Surcharge {
            offset_m: 3.0,
            ..Surcharge::uniform(10.0)
        };
        assert!(far.load_over(0.1, 0.4, 1.6).is_none());
    }
}
