
use crate::charge::Charge;
use crate::config::{FieldConfig, FieldConfigError};
use crate::grid::{FieldGrid, Lattice};
use glam::DVec2;
use rayon::prelude::*;
use std::time::Instant;
use std::{error::Error, fmt};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum ChargeUpdateError {
    UnknownCharge { index: usize, len: usize },
    Invalid(FieldConfigError),
}

impl fmt::Display for ChargeUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChargeUpdateError::UnknownCharge { index, len } => {
                write!(f, "charge index {index} out of range for {len} charges")
            }
            ChargeUpdateError::Invalid(e) => write!(f, "{e}"),
        }
    }
}

impl From<FieldConfigError> for ChargeUpdateError {
    fn from(err: FieldConfigError) -> Self {
        ChargeUpdateError::Invalid(err)
    }
}

impl Error for ChargeUpdateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChargeUpdateError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

/// Coulomb superposition over a fixed lattice for a live list of point charges.
///
/// The engine holds no derived state besides the lattice: editing a charge and
/// calling [`FieldEngine::evaluate_grid`] again is the whole update protocol.
#[derive(Clone, Debug)]
pub struct FieldEngine {
    config: FieldConfig,
    lattice: Lattice,
}

impl FieldEngine {
    pub fn new(config: FieldConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: FieldConfig) -> Result<Self, FieldConfigError> {
        config.validate()?;
        let lattice = Lattice::new(config.grid_extent, config.grid_resolution);
        Ok(Self { config, lattice })
    }

    /// Default grid and threshold with the given charges.
    pub fn with_charges(charges: Vec<Charge>) -> Result<Self, FieldConfigError> {
        Self::try_new(FieldConfig {
            charges,
            ..FieldConfig::default()
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn charges(&self) -> &[Charge] {
        &self.config.charges
    }

    pub fn charges_mut(&mut self) -> &mut [Charge] {
        &mut self.config.charges
    }

    pub fn charge_mut(&mut self, index: usize) -> Option<&mut Charge> {
        self.config.charges.get_mut(index)
    }

    /// Replaces the whole charge list; nothing changes if any charge is rejected.
    pub fn set_charges(&mut self, charges: Vec<Charge>) -> Result<(), FieldConfigError> {
        for (index, charge) in charges.iter().enumerate() {
            self.config.check_charge(index, charge)?;
        }
        self.config.charges = charges;
        Ok(())
    }

    pub fn push_charge(&mut self, charge: Charge) -> Result<(), FieldConfigError> {
        self.config.check_charge(self.config.charges.len(), &charge)?;
        self.config.charges.push(charge);
        Ok(())
    }

    pub fn replace_charge(
        &mut self,
        index: usize,
        charge: Charge,
    ) -> Result<(), ChargeUpdateError> {
        let len = self.config.charges.len();
        if index >= len {
            return Err(ChargeUpdateError::UnknownCharge { index, len });
        }
        self.config.check_charge(index, &charge)?;
        self.config.charges[index] = charge;
        Ok(())
    }

    /// Offset and distance from `charge` to `point`, or `None` when the charge
    /// sits strictly inside the proximity threshold and must be skipped.
    #[inline]
    fn separation(&self, charge: &Charge, point: DVec2) -> Option<(DVec2, f64)> {
        let r = point - charge.position;
        let dist = r.length();
        if dist < self.config.proximity_threshold {
            None
        } else {
            Some((r, dist))
        }
    }

    /// Electric field at `point`: sum of `k·q·r / |r|³` over every charge
    /// outside the proximity threshold.
    pub fn field_at(&self, point: DVec2) -> DVec2 {
        let k = self.config.coulomb_constant;
        let mut e = DVec2::ZERO;
        for charge in &self.config.charges {
            if let Some((r, dist)) = self.separation(charge, point) {
                e += (k * charge.magnitude / (dist * dist * dist)) * r;
            }
        }
        e
    }

    /// Electric potential at `point`: sum of `k·q / |r|` with the same exclusion.
    pub fn potential_at(&self, point: DVec2) -> f64 {
        let k = self.config.coulomb_constant;
        let mut v = 0.0;
        for charge in &self.config.charges {
            if let Some((_, dist)) = self.separation(charge, point) {
                v += k * charge.magnitude / dist;
            }
        }
        v
    }

    fn sample(&self, index: usize) -> (DVec2, f64) {
        let point = self.lattice.point_at(index);
        (self.field_at(point), self.potential_at(point))
    }

    /// Recomputes `Ex`, `Ey` and `V` over the whole lattice.
    pub fn evaluate_grid(&self) -> FieldGrid {
        let start = Instant::now();
        let n = self.lattice.len();

        let samples: Vec<(DVec2, f64)> = if self.config.parallel {
            (0..n).into_par_iter().map(|i| self.sample(i)).collect()
        } else {
            (0..n).map(|i| self.sample(i)).collect()
        };

        let mut ex = Vec::with_capacity(n);
        let mut ey = Vec::with_capacity(n);
        let mut potential = Vec::with_capacity(n);
        for (e, v) in samples {
            ex.push(e.x);
            ey.push(e.y);
            potential.push(v);
        }

        debug!(
            resolution = self.lattice.resolution(),
            charges = self.config.charges.len(),
            parallel = self.config.parallel,
            elapsed_us = start.elapsed().as_micros() as u64,
            "evaluated field grid"
        );

        FieldGrid {
            resolution: self.lattice.resolution(),
            ex,
            ey,
            potential,
        }
    }
}
