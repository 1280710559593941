use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Square sample lattice centered on the origin.
///
/// Row index walks `ys`, column index walks `xs`, so `point(row, col)` is
/// `(xs[col], ys[row])`.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// `n` evenly spaced samples over `[start, stop]`, endpoint included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = stop;
            out
        }
    }
}

impl Lattice {
    pub fn new(extent: f64, resolution: usize) -> Self {
        let half = extent / 2.0;
        let axis = linspace(-half, half, resolution);
        Self {
            xs: axis.clone(),
            ys: axis,
        }
    }

    pub fn resolution(&self) -> usize {
        self.xs.len()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn point(&self, row: usize, col: usize) -> DVec2 {
        DVec2::new(self.xs[col], self.ys[row])
    }

    /// Row-major flat index into a `resolution × resolution` array.
    pub fn point_at(&self, index: usize) -> DVec2 {
        let n = self.resolution();
        self.point(index / n, index % n)
    }

    pub fn len(&self) -> usize {
        self.xs.len() * self.ys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Field components and potential sampled on a lattice, row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldGrid {
    pub resolution: usize,
    pub ex: Vec<f64>,
    pub ey: Vec<f64>,
    pub potential: Vec<f64>,
}

impl FieldGrid {
    pub fn shape(&self) -> (usize, usize) {
        (self.resolution, self.resolution)
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.resolution && col < self.resolution,
            "grid index ({row}, {col}) out of range for resolution {}",
            self.resolution
        );
        row * self.resolution + col
    }

    pub fn ex(&self, row: usize, col: usize) -> f64 {
        self.ex[self.index(row, col)]
    }

    pub fn ey(&self, row: usize, col: usize) -> f64 {
        self.ey[self.index(row, col)]
    }

    pub fn potential(&self, row: usize, col: usize) -> f64 {
        self.potential[self.index(row, col)]
    }

    /// Splits a flat row-major buffer into nested rows.
    pub fn to_rows(&self, data: &[f64]) -> Vec<Vec<f64>> {
        data.chunks(self.resolution.max(1))
            .map(<[f64]>::to_vec)
            .collect()
    }

    /// Min and max over the finite potential samples.
    pub fn potential_range(&self) -> Option<(f64, f64)> {
        self.potential
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// `n` equipotential levels evenly spaced strictly inside the potential range.
    pub fn contour_levels(&self, n: usize) -> Vec<f64> {
        let Some((lo, hi)) = self.potential_range() else {
            return Vec::new();
        };
        if n == 0 || hi <= lo {
            return Vec::new();
        }
        let step = (hi - lo) / (n + 1) as f64;
        (1..=n).map(|i| lo + step * i as f64).collect()
    }
}
