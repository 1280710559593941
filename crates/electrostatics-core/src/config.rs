use crate::charge::{default_dipole, Charge};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Coulomb's constant in N·m²/C².
pub const COULOMB_CONSTANT: f64 = 8.9875517923e9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Full width of the square sampling domain; the lattice spans `[-extent/2, extent/2]`.
    pub grid_extent: f64,
    /// Samples per axis.
    pub grid_resolution: usize,
    /// Charges closer than this to a sample point contribute nothing at that point.
    pub proximity_threshold: f64,
    pub coulomb_constant: f64,
    /// Evaluate lattice points on the rayon pool.
    pub parallel: bool,
    /// Number of equipotential levels captured into plot frames.
    pub contour_levels: usize,
    pub charges: Vec<Charge>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            grid_extent: 10.0,
            grid_resolution: 30,
            proximity_threshold: 0.1,
            coulomb_constant: COULOMB_CONSTANT,
            parallel: true,
            contour_levels: 20,
            charges: default_dipole(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldConfigError {
    ZeroResolution,
    ResolutionTooLarge { max: usize, actual: usize },
    InvalidExtent(f64),
    InvalidThreshold(f64),
    InvalidCoulombConstant(f64),
    NonFiniteCharge { index: usize },
    /// `k·q` at the proximity threshold does not fit in an `f64`.
    ChargeOutOfRange { index: usize, magnitude: f64 },
}

impl fmt::Display for FieldConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldConfigError::ZeroResolution => write!(f, "grid_resolution must be positive"),
            FieldConfigError::ResolutionTooLarge { max, actual } => write!(
                f,
                "grid_resolution ({actual}) exceeds supported maximum ({max})"
            ),
            FieldConfigError::InvalidExtent(v) => {
                write!(f, "grid_extent must be finite and positive, got {v}")
            }
            FieldConfigError::InvalidThreshold(v) => {
                write!(f, "proximity_threshold must be finite and positive, got {v}")
            }
            FieldConfigError::InvalidCoulombConstant(v) => {
                write!(f, "coulomb_constant must be finite and positive, got {v}")
            }
            FieldConfigError::NonFiniteCharge { index } => {
                write!(f, "charge {index} has a non-finite magnitude or position")
            }
            FieldConfigError::ChargeOutOfRange { index, magnitude } => write!(
                f,
                "charge {index} magnitude {magnitude} overflows the field near the charge"
            ),
        }
    }
}

impl Error for FieldConfigError {}

impl FieldConfig {
    pub const MAX_GRID_RESOLUTION: usize = 4096;

    pub fn validate(&self) -> Result<(), FieldConfigError> {
        if self.grid_resolution == 0 {
            return Err(FieldConfigError::ZeroResolution);
        }
        if self.grid_resolution > Self::MAX_GRID_RESOLUTION {
            return Err(FieldConfigError::ResolutionTooLarge {
                max: Self::MAX_GRID_RESOLUTION,
                actual: self.grid_resolution,
            });
        }
        if !(self.grid_extent.is_finite() && self.grid_extent > 0.0) {
            return Err(FieldConfigError::InvalidExtent(self.grid_extent));
        }
        if !(self.proximity_threshold.is_finite() && self.proximity_threshold > 0.0) {
            return Err(FieldConfigError::InvalidThreshold(self.proximity_threshold));
        }
        if !(self.coulomb_constant.is_finite() && self.coulomb_constant > 0.0) {
            return Err(FieldConfigError::InvalidCoulombConstant(
                self.coulomb_constant,
            ));
        }
        for (index, charge) in self.charges.iter().enumerate() {
            self.check_charge(index, charge)?;
        }
        Ok(())
    }

    /// Checks one charge against the constant and threshold of an already
    /// validated config. `field_at` forms `k·q / |r|³` with `|r| >= t`, so
    /// that term must stay finite at `|r| = t`.
    pub fn check_charge(&self, index: usize, charge: &Charge) -> Result<(), FieldConfigError> {
        if !charge.is_finite() {
            return Err(FieldConfigError::NonFiniteCharge { index });
        }
        let t = self.proximity_threshold;
        let peak = self.coulomb_constant * charge.magnitude.abs() / (t * t * t);
        if !peak.is_finite() {
            return Err(FieldConfigError::ChargeOutOfRange {
                index,
                magnitude: charge.magnitude,
            });
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn default_config_is_valid() {
        let config = FieldConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.grid_resolution, 30);
        assert_eq!(config.grid_extent, 10.0);
        assert_eq!(config.proximity_threshold, 0.1);
        assert_eq!(config.charges.len(), 2);
    }

    #[test]
    fn validate_rejects_zero_resolution() {
        let config = FieldConfig {
            grid_resolution: 0,
            ..FieldConfig::default()
        };
        assert_eq!(config.validate(), Err(FieldConfigError::ZeroResolution));
    }

    #[test]
    fn validate_rejects_oversized_resolution() {
        let config = FieldConfig {
            grid_resolution: FieldConfig::MAX_GRID_RESOLUTION + 1,
            ..FieldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FieldConfigError::ResolutionTooLarge { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_positive_extent() {
        for extent in [0.0, -4.0, f64::NAN, f64::INFINITY] {
            let config = FieldConfig {
                grid_extent: extent,
                ..FieldConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(FieldConfigError::InvalidExtent(_))
            ));
        }
    }

    #[test]
    fn validate_rejects_bad_threshold() {
        for threshold in [0.0, -0.1, f64::NAN] {
            let config = FieldConfig {
                proximity_threshold: threshold,
                ..FieldConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(FieldConfigError::InvalidThreshold(_))
            ));
        }
    }

    #[test]
    fn validate_rejects_non_finite_charge() {
        let mut config = FieldConfig::default();
        config
            .charges
            .push(Charge::new(1e-9, DVec2::new(f64::NAN, 0.0)));
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::NonFiniteCharge { index: 2 })
        );
    }

    #[test]
    fn validate_rejects_non_positive_coulomb_constant() {
        for k in [0.0, -COULOMB_CONSTANT, f64::INFINITY] {
            let config = FieldConfig {
                coulomb_constant: k,
                ..FieldConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(FieldConfigError::InvalidCoulombConstant(_))
            ));
        }
    }

    #[test]
    fn validate_rejects_magnitude_that_overflows_field() {
        let config = FieldConfig {
            charges: vec![
                Charge::nanocoulombs(1.0, 0.0, 0.0),
                Charge::new(-1e300, DVec2::ZERO),
            ],
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::ChargeOutOfRange {
                index: 1,
                magnitude: -1e300
            })
        );
    }

    #[test]
    fn check_charge_accepts_large_but_representable_magnitude() {
        let config = FieldConfig::default();
        assert_eq!(config.check_charge(0, &Charge::new(1.0, DVec2::ZERO)), Ok(()));
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let config = FieldConfig {
            grid_resolution: 12,
            parallel: false,
            ..FieldConfig::default()
        };
        let json = config.to_json_pretty().unwrap();
        assert_eq!(FieldConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = FieldConfig::from_json_str(r#"{"grid_resolution": 7}"#).unwrap();
        assert_eq!(config.grid_resolution, 7);
        assert_eq!(config.grid_extent, 10.0);
        assert_eq!(config.charges, default_dipole());
    }
}
