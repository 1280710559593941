use crate::charge::NANOCOULOMB;
use crate::engine::FieldEngine;
use crate::grid::FieldGrid;
use crate::plot::PlotFrame;
use glam::DVec2;
use std::{error::Error, fmt};
use tracing::{debug, warn};

/// Consumer of evaluated frames: draws, serializes or forwards them.
pub trait FieldRenderer {
    type Error;

    fn render(&mut self, frame: &PlotFrame) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
}

impl SliderRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Ranges the interaction layer enforces before values reach a charge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeControls {
    pub magnitude_nc: SliderRange,
    pub position_x: SliderRange,
    pub position_y: SliderRange,
}

impl Default for ChargeControls {
    fn default() -> Self {
        Self {
            magnitude_nc: SliderRange::new(-5.0, 5.0),
            position_x: SliderRange::new(-4.0, 4.0),
            position_y: SliderRange::new(-4.0, 4.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChargeEdit {
    Magnitude { index: usize, nanocoulombs: f64 },
    PositionX { index: usize, x: f64 },
    PositionY { index: usize, y: f64 },
    Move { index: usize, position: DVec2 },
}

impl ChargeEdit {
    pub fn index(&self) -> usize {
        match *self {
            ChargeEdit::Magnitude { index, .. }
            | ChargeEdit::PositionX { index, .. }
            | ChargeEdit::PositionY { index, .. }
            | ChargeEdit::Move { index, .. } => index,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError<E> {
    UnknownCharge { index: usize, len: usize },
    Render(E),
}

impl<E: fmt::Display> fmt::Display for SessionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownCharge { index, len } => {
                write!(f, "charge index {index} out of range for {len} charges")
            }
            SessionError::Render(e) => write!(f, "renderer failed: {e}"),
        }
    }
}

impl<E: Error + 'static> Error for SessionError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Render(e) => Some(e),
            _ => None,
        }
    }
}

/// Owns an engine and a renderer; every accepted edit is followed by a full
/// re-evaluation and one `render` call.
pub struct Session<R: FieldRenderer> {
    engine: FieldEngine,
    renderer: R,
    controls: ChargeControls,
    revision: u64,
}

impl<R: FieldRenderer> Session<R> {
    pub fn new(engine: FieldEngine, renderer: R) -> Self {
        Self::with_controls(engine, renderer, ChargeControls::default())
    }

    pub fn with_controls(engine: FieldEngine, renderer: R, controls: ChargeControls) -> Self {
        Self {
            engine,
            renderer,
            controls,
            revision: 0,
        }
    }

    pub fn engine(&self) -> &FieldEngine {
        &self.engine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn controls(&self) -> &ChargeControls {
        &self.controls
    }

    /// Frames rendered so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn into_parts(self) -> (FieldEngine, R) {
        (self.engine, self.renderer)
    }

    /// Evaluate the current charges and hand the frame to the renderer.
    pub fn refresh(&mut self) -> Result<FieldGrid, SessionError<R::Error>> {
        let grid = self.engine.evaluate_grid();
        let frame = PlotFrame::capture(&self.engine, &grid, self.revision);
        self.renderer.render(&frame).map_err(SessionError::Render)?;
        self.revision += 1;
        Ok(grid)
    }

    /// Apply a control change to one charge, then refresh.
    pub fn apply(&mut self, edit: ChargeEdit) -> Result<FieldGrid, SessionError<R::Error>> {
        let index = edit.index();
        let len = self.engine.charges().len();
        let controls = self.controls;
        let charge = self
            .engine
            .charge_mut(index)
            .ok_or(SessionError::UnknownCharge { index, len })?;

        match edit {
            ChargeEdit::Magnitude { nanocoulombs, .. } => {
                let q = clamped(controls.magnitude_nc, nanocoulombs, "magnitude_nc");
                charge.magnitude = q * NANOCOULOMB;
            }
            ChargeEdit::PositionX { x, .. } => {
                charge.position.x = clamped(controls.position_x, x, "position_x");
            }
            ChargeEdit::PositionY { y, .. } => {
                charge.position.y = clamped(controls.position_y, y, "position_y");
            }
            ChargeEdit::Move { position, .. } => {
                charge.position = DVec2::new(
                    clamped(controls.position_x, position.x, "position_x"),
                    clamped(controls.position_y, position.y, "position_y"),
                );
            }
        }
        debug!(index, charge = ?charge, "applied charge edit");

        self.refresh()
    }
}

fn clamped(range: SliderRange, value: f64, control: &str) -> f64 {
    if range.contains(value) {
        return value;
    }
    // NaN never passes `contains`; fall back to the lower bound.
    let out = if value.is_nan() {
        range.min
    } else {
        range.clamp(value)
    };
    warn!(control, value, clamped = out, "control value outside slider range");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charge::default_dipole;
    use crate::config::FieldConfig;
    use std::convert::Infallible;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<PlotFrame>,
    }

    impl FieldRenderer for Recorder {
        type Error = Infallible;

        fn render(&mut self, frame: &PlotFrame) -> Result<(), Infallible> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    #[derive(Debug, PartialEq)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "refused")
        }
    }

    struct FailingRenderer;

    impl FieldRenderer for FailingRenderer {
        type Error = Refused;

        fn render(&mut self, _frame: &PlotFrame) -> Result<(), Refused> {
            Err(Refused)
        }
    }

    fn session() -> Session<Recorder> {
        let engine = FieldEngine::new(FieldConfig {
            grid_resolution: 5,
            ..FieldConfig::default()
        });
        Session::new(engine, Recorder::default())
    }

    #[test]
    fn refresh_renders_one_frame() {
        let mut s = session();
        let grid = s.refresh().unwrap();
        assert_eq!(grid.shape(), (5, 5));
        assert_eq!(s.renderer().frames.len(), 1);
        assert_eq!(s.revision(), 1);
        assert_eq!(s.renderer().frames[0].revision, 0);
    }

    #[test]
    fn magnitude_edit_updates_charge_and_redraws() {
        let mut s = session();
        let before = s.refresh().unwrap();
        let after = s
            .apply(ChargeEdit::Magnitude {
                index: 0,
                nanocoulombs: 3.0,
            })
            .unwrap();
        assert!((s.engine().charges()[0].magnitude - 3e-9).abs() < 1e-20);
        assert_ne!(before.potential, after.potential);
        assert_eq!(s.renderer().frames.len(), 2);
        assert_eq!(s.renderer().frames[1].revision, 1);
    }

    #[test]
    fn edits_are_clamped_to_slider_ranges() {
        let mut s = session();
        s.apply(ChargeEdit::Magnitude {
            index: 0,
            nanocoulombs: 12.0,
        })
        .unwrap();
        s.apply(ChargeEdit::PositionX { index: 0, x: -9.0 }).unwrap();
        s.apply(ChargeEdit::Move {
            index: 1,
            position: DVec2::new(1.0, 7.5),
        })
        .unwrap();

        let charges = s.engine().charges();
        assert!((charges[0].magnitude_nc() - 5.0).abs() < 1e-12);
        assert_eq!(charges[0].position.x, -4.0);
        assert_eq!(charges[1].position, DVec2::new(1.0, 4.0));
    }

    #[test]
    fn position_y_edit_moves_only_y() {
        let mut s = session();
        s.apply(ChargeEdit::PositionY { index: 1, y: 1.5 }).unwrap();
        assert_eq!(s.engine().charges()[1].position, DVec2::new(2.0, 1.5));
    }

    #[test]
    fn unknown_index_leaves_state_untouched() {
        let mut s = session();
        let err = s
            .apply(ChargeEdit::PositionX { index: 5, x: 0.0 })
            .unwrap_err();
        assert_eq!(err, SessionError::UnknownCharge { index: 5, len: 2 });
        assert_eq!(s.engine().charges(), default_dipole().as_slice());
        assert!(s.renderer().frames.is_empty());
    }

    #[test]
    fn render_failure_is_reported_without_advancing_revision() {
        let engine = FieldEngine::new(FieldConfig {
            grid_resolution: 3,
            ..FieldConfig::default()
        });
        let mut s = Session::new(engine, FailingRenderer);
        assert_eq!(s.refresh().unwrap_err(), SessionError::Render(Refused));
        assert_eq!(s.revision(), 0);
    }

    #[test]
    fn nan_control_value_falls_back_to_lower_bound() {
        let range = SliderRange::new(-4.0, 4.0);
        assert_eq!(clamped(range, f64::NAN, "test"), -4.0);
        assert_eq!(clamped(range, 2.0, "test"), 2.0);
    }
}
