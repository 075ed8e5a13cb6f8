//! Linear projection of embedding matrices to two dimensions
//!
//! Principal component analysis by power iteration with deflation. The start
//! vector of every iteration is drawn from a seeded RNG, so identical input and
//! seed always give bit-identical coordinates.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// PCA configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcaConfig {
    /// Output components
    pub components: usize,
    pub seed: u64,
    /// Power iterations per component
    pub max_iterations: usize,
    /// Stop when successive vectors differ by less than this (L2)
    pub tolerance: f64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            components: 2,
            seed: 42,
            max_iterations: 500,
            tolerance: 1e-10,
        }
    }
}

/// Result of a PCA projection
#[derive(Debug, Clone)]
pub struct PcaResult {
    /// Projected rows, `n x components`
    pub coordinates: Array2<f64>,
    /// Principal axes, `components x d`. Zero rows for missing variance.
    pub axes: Array2<f64>,
    /// Variance captured by each axis
    pub explained_variance: Vec<f64>,
}

/// Project the rows of `data` onto their leading principal components.
///
/// Degenerate input (no rows, a single row, zero variance, fewer input
/// dimensions than components) produces zero coordinates instead of NaN.
pub fn pca(data: &Array2<f64>, config: &PcaConfig) -> PcaResult {
    let (n, d) = data.dim();
    let k = config.components;
    let mut coordinates = Array2::<f64>::zeros((n, k));
    let mut axes = Array2::<f64>::zeros((k, d));
    let mut explained_variance = vec![0.0; k];

    if n == 0 || d == 0 {
        return PcaResult {
            coordinates,
            axes,
            explained_variance,
        };
    }

    let mean = data.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d));
    let centered = data - &mean;
    let denom = (n.max(2) - 1) as f64;
    let mut covariance = centered.t().dot(&centered) / denom;

    let mut rng = StdRng::seed_from_u64(config.seed);

    for c in 0..k.min(d) {
        let start: Array1<f64> = (0..d).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let Some(axis) = leading_eigenvector(&covariance, start, config) else {
            break;
        };
        let eigenvalue = axis.dot(&covariance.dot(&axis));
        if eigenvalue <= 1e-12 {
            break;
        }

        let outer = axis
            .view()
            .insert_axis(Axis(1))
            .dot(&axis.view().insert_axis(Axis(0)));
        covariance = covariance - outer * eigenvalue;

        axes.row_mut(c).assign(&axis);
        explained_variance[c] = eigenvalue;
    }

    coordinates.assign(&centered.dot(&axes.t()));
    PcaResult {
        coordinates,
        axes,
        explained_variance,
    }
}

/// Convenience wrapper: `n x 2` coordinates with a given seed.
pub fn pca_2d(data: &Array2<f64>, seed: u64) -> Array2<f64> {
    pca(
        data,
        &PcaConfig {
            seed,
            ..Default::default()
        },
    )
    .coordinates
}

fn leading_eigenvector(
    matrix: &Array2<f64>,
    start: Array1<f64>,
    config: &PcaConfig,
) -> Option<Array1<f64>> {
    let mut v = normalized(start)?;
    for _ in 0..config.max_iterations {
        let next = normalized(matrix.dot(&v))?;
        let delta = (&next - &v).mapv(|x| x * x).sum().sqrt();
        v = next;
        if delta < config.tolerance {
            break;
        }
    }
    // Fix the sign: largest-magnitude entry positive
    let pivot = v
        .iter()
        .copied()
        .fold(0.0f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
    Some(v)
}

fn normalized(v: Array1<f64>) -> Option<Array1<f64>> {
    let norm = v.dot(&v).sqrt();
    if !norm.is_finite() || norm < 1e-12 {
        return None;
    }
    Some(v / norm)
}
