use crate::charge::Polarity;
use crate::engine::FieldEngine;
use crate::grid::FieldGrid;
use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChargeMarker {
    pub position: DVec2,
    pub magnitude: f64,
    pub polarity: Polarity,
    /// Height of the marker on the potential surface. The charge's own term
    /// is excluded by the proximity threshold.
    pub surface_potential: f64,
}

/// Everything a renderer needs to draw the quiver/contour view and the
/// potential surface for one state of the charge list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotFrame {
    pub revision: u64,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub ex: Vec<Vec<f64>>,
    pub ey: Vec<Vec<f64>>,
    pub potential: Vec<Vec<f64>>,
    pub contour_levels: Vec<f64>,
    pub charges: Vec<ChargeMarker>,
}

impl PlotFrame {
    pub fn capture(engine: &FieldEngine, grid: &FieldGrid, revision: u64) -> Self {
        let lattice = engine.lattice();
        let charges = engine
            .charges()
            .iter()
            .map(|c| ChargeMarker {
                position: c.position,
                magnitude: c.magnitude,
                polarity: c.polarity(),
                surface_potential: engine.potential_at(c.position),
            })
            .collect();
        Self {
            revision,
            xs: lattice.xs().to_vec(),
            ys: lattice.ys().to_vec(),
            ex: grid.to_rows(&grid.ex),
            ey: grid.to_rows(&grid.ey),
            potential: grid.to_rows(&grid.potential),
            contour_levels: grid.contour_levels(engine.config().contour_levels),
            charges,
        }
    }
}
