//! Soil zones around the wall.

use serde::{Deserialize, Serialize};

use crate::errors::LoadModelError;

/// Strength and weight of one soil zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoilProperties {
    /// Unit weight γ (kN/m³)
    #[serde(alias = "unit_weight")]
    pub unit_weight_kn_m3: f64,
    /// Internal friction angle φ (deg)
    pub friction_angle_deg: f64,
    /// Cohesion c (kPa)
    #[serde(default, alias = "cohesion")]
    pub cohesion_kpa: f64,
}

impl SoilProperties {
    /// Cohesionless soil
    pub fn granular(unit_weight_kn_m3: f64, friction_angle_deg: f64) -> Self {
        SoilProperties {
            unit_weight_kn_m3,
            friction_angle_deg,
            cohesion_kpa: 0.0,
        }
    }

    /// Check ranges; `zone` names the soil in the error
    pub fn validate(&self, zone: &str) -> Result<(), LoadModelError> {
        if !(self.friction_angle_deg > 0.0 && self.friction_angle_deg < 90.0) {
            return Err(LoadModelError::FrictionAngleOutOfRange {
                zone: zone.to_string(),
                value_deg: self.friction_angle_deg,
            });
        }
        if !self.unit_weight_kn_m3.is_finite() || self.unit_weight_kn_m3 <= 0.0 {
            return Err(LoadModelError::invalid_soil(
                zone,
                "unit_weight_kn_m3",
                self.unit_weight_kn_m3,
                "must be positive",
            ));
        }
        if !self.cohesion_kpa.is_finite() || self.cohesion_kpa < 0.0 {
            return Err(LoadModelError::invalid_soil(
                zone,
                "cohesion_kpa",
                self.cohesion_kpa,
                "must be non-negative",
            ));
        }
        Ok(())
    }

    /// φ in radians
    pub fn friction_angle_rad(&self) -> f64 {
        self.friction_angle_deg.to_radians()
    }

    /// Friction coefficient tan φ
    pub fn friction_coefficient(&self) -> f64 {
        self.friction_angle_rad().tan()
    }
}

/// Retained, reinforced-infill and foundation soils.
///
/// Infill and foundation default to the retained soil when not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoilProfile {
    pub retained: SoilProperties,
    #[serde(default)]
    pub reinforced: Option<SoilProperties>,
    #[serde(default)]
    pub foundation: Option<SoilProperties>,
}

impl SoilProfile {
    /// Same soil everywhere
    pub fn uniform(soil: SoilProperties) -> Self {
        SoilProfile {
            retained: soil,
            reinforced: None,
            foundation: None,
        }
    }

    /// Soil placed behind the face and around the geogrid
    pub fn infill(&self) -> &SoilProperties {
        self.reinforced.as_ref().unwrap_or(&self.retained)
    }

    /// Soil under the wall
    pub fn foundation_soil(&self) -> &SoilProperties {
        self.foundation.as_ref().unwrap_or(&self.retained)
    }

    pub fn validate(&self) -> Result<(), LoadModelError> {
        self.retained.validate("retained")?;
        if let Some(reinforced) = &self.reinforced {
            reinforced.validate("reinforced")?;
        }
        if let Some(foundation) = &self.foundation {
            foundation.validate("foundation")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fall_back_to_retained() {
        let profile = SoilProfile::uniform(SoilProperties::granular(18.0, 32.0));
        assert_eq!(profile.infill().friction_angle_deg, 32.0);
        assert_eq!(profile.foundation_soil().unit_weight_kn_m3, 18.0);

        let profile = SoilProfile {
            reinforced: Some(SoilProperties::granular(19.0, 34.0)),
            ..profile
        };
        assert_eq!(profile.infill().friction_angle_deg, 34.0);
        assert_eq!(profile.foundation_soil().friction_angle_deg, 32.0);
    }

    #[test]
    fn test_validation() {
        assert!(SoilProperties::granular(18.0, 30.0).validate("retained").is_ok());
        assert!(matches!(
            SoilProperties::granular(18.0, 90.0).validate("retained"),
            Err(LoadModelError::FrictionAngleOutOfRange { .. })
        ));
        assert!(SoilProperties::granular(0.0, 30.0).validate("retained").is_err());

        let sticky = SoilProperties {
            cohesion_kpa: -1.0,
            ..SoilProperties::granular(18.0, 30.0)
        };
        let profile = SoilProfile {
            foundation: Some(sticky),
            ..SoilProfile::uniform(SoilProperties::granular(18.0, 30.0))
        };
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, LoadModelError::InvalidSoilProperty { ref zone, .. } if zone == "foundation"));
    }
}
