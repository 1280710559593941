use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Coulombs per nanocoulomb.
pub const NANOCOULOMB: f64 = 1e-9;

/// A point charge: magnitude in Coulombs, position in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub magnitude: f64,
    pub position: DVec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Charge {
    pub fn new(magnitude: f64, position: DVec2) -> Self {
        Self {
            magnitude,
            position,
        }
    }

    pub fn nanocoulombs(q_nc: f64, x: f64, y: f64) -> Self {
        Self::new(q_nc * NANOCOULOMB, DVec2::new(x, y))
    }

    pub fn magnitude_nc(&self) -> f64 {
        self.magnitude / NANOCOULOMB
    }

    pub fn polarity(&self) -> Polarity {
        if self.magnitude > 0.0 {
            Polarity::Positive
        } else if self.magnitude < 0.0 {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.magnitude.is_finite() && self.position.is_finite()
    }
}

/// +1 nC at (-2, 0) and -1 nC at (2, 0).
pub fn default_dipole() -> Vec<Charge> {
    vec![
        Charge::nanocoulombs(1.0, -2.0, 0.0),
        Charge::nanocoulombs(-1.0, 2.0, 0.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanocoulomb_constructor_scales_magnitude() {
        let c = Charge::nanocoulombs(-3.0, 1.5, -0.5);
        assert!((c.magnitude + 3e-9).abs() < 1e-24);
        assert_eq!(c.position, DVec2::new(1.5, -0.5));
        assert!((c.magnitude_nc() + 3.0).abs() < 1e-12);
    }

    #[test]
    fn polarity_follows_sign() {
        assert_eq!(Charge::nanocoulombs(2.0, 0.0, 0.0).polarity(), Polarity::Positive);
        assert_eq!(Charge::nanocoulombs(-2.0, 0.0, 0.0).polarity(), Polarity::Negative);
        assert_eq!(Charge::nanocoulombs(0.0, 0.0, 0.0).polarity(), Polarity::Neutral);
    }

    #[test]
    fn charge_serializes_position_as_pair() {
        let json = serde_json::to_value(Charge::nanocoulombs(1.0, -2.0, 0.0)).unwrap();
        assert_eq!(json["position"], serde_json::json!([-2.0, 0.0]));
    }
}
