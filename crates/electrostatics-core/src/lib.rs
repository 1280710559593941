//! 2D electrostatics over point charges: Coulomb superposition sampled on a
//! square lattice, plus the interaction loop that re-evaluates after edits.

pub mod charge;
pub mod config;
pub mod engine;
pub mod grid;
pub mod plot;
pub mod session;

pub use charge::{Charge, Polarity};
pub use config::{FieldConfig, FieldConfigError};
pub use engine::{ChargeUpdateError, FieldEngine};
pub use grid::{FieldGrid, Lattice};
pub use plot::{ChargeMarker, PlotFrame};
pub use session::{
    ChargeControls, ChargeEdit, FieldRenderer, Session, SessionError, SliderRange,
};
