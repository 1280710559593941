use electrostatics_core::{Charge, ChargeUpdateError, FieldConfig, FieldEngine, PlotFrame};
use glam::DVec2;
use pyo3::exceptions::{PyIndexError, PyValueError};
use pyo3::prelude::*;

type Rows = Vec<Vec<f64>>;

#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Field engine for Python renderers. Charges are `(q, x, y)` tuples in
/// Coulombs and meters.
#[pyclass(name = "FieldEngine")]
struct PyFieldEngine {
    inner: FieldEngine,
    revision: u64,
}

#[pymethods]
impl PyFieldEngine {
    #[new]
    #[pyo3(signature = (charges, grid_extent=10.0, grid_resolution=30, proximity_threshold=0.1))]
    fn new(
        charges: Vec<(f64, f64, f64)>,
        grid_extent: f64,
        grid_resolution: usize,
        proximity_threshold: f64,
    ) -> PyResult<Self> {
        let config = FieldConfig {
            grid_extent,
            grid_resolution,
            proximity_threshold,
            charges: charges
                .into_iter()
                .map(|(q, x, y)| Charge::new(q, DVec2::new(x, y)))
                .collect(),
            ..FieldConfig::default()
        };
        let inner =
            FieldEngine::try_new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner, revision: 0 })
    }

    fn field_at(&self, x: f64, y: f64) -> (f64, f64) {
        let e = self.inner.field_at(DVec2::new(x, y));
        (e.x, e.y)
    }

    fn potential_at(&self, x: f64, y: f64) -> f64 {
        self.inner.potential_at(DVec2::new(x, y))
    }

    /// Returns `(ex, ey, v)` as nested row lists.
    fn evaluate_grid(&self) -> (Rows, Rows, Rows) {
        let grid = self.inner.evaluate_grid();
        (
            grid.to_rows(&grid.ex),
            grid.to_rows(&grid.ey),
            grid.to_rows(&grid.potential),
        )
    }

    fn lattice(&self) -> (Vec<f64>, Vec<f64>) {
        let lattice = self.inner.lattice();
        (lattice.xs().to_vec(), lattice.ys().to_vec())
    }

    fn charges(&self) -> Vec<(f64, f64, f64)> {
        self.inner
            .charges()
            .iter()
            .map(|c| (c.magnitude, c.position.x, c.position.y))
            .collect()
    }

    fn set_charge(&mut self, index: usize, q: f64, x: f64, y: f64) -> PyResult<()> {
        self.inner
            .replace_charge(index, Charge::new(q, DVec2::new(x, y)))
            .map_err(|e| match e {
                ChargeUpdateError::UnknownCharge { .. } => PyIndexError::new_err(e.to_string()),
                ChargeUpdateError::Invalid(_) => PyValueError::new_err(e.to_string()),
            })
    }

    /// Evaluates the grid and serializes a full plot frame.
    fn plot_frame_json(&mut self) -> PyResult<String> {
        let grid = self.inner.evaluate_grid();
        let frame = PlotFrame::capture(&self.inner, &grid, self.revision);
        self.revision += 1;
        serde_json::to_string(&frame).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_class::<PyFieldEngine>()?;
    Ok(())
}
