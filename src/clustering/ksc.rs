//! K-Spectral Centroid (KSC) clustering.
//!
//! Series are compared with a distance that is invariant to scaling and to
//! circular shifts; each centroid is the dominant eigenvector of the summed
//! outer products of its aligned, unit-normalized members.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::{check_matrix, ShapeClusterer, ShapeClustering};
use crate::config::PipelineConfig;
use crate::error::ClusterError;

const POWER_ITERATIONS: usize = 500;
const POWER_TOLERANCE: f64 = 1e-12;

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Circular shift; a positive `shift` moves samples towards the end.
fn rotate(y: &[f64], shift: isize) -> Vec<f64> {
    let n = y.len() as isize;
    (0..n)
        .map(|i| y[(i - shift).rem_euclid(n) as usize])
        .collect()
}

/// `min_q ‖x − α·y_q‖ / ‖x‖` over circular shifts `q` of `y`, with the
/// optimal scaling `α = x·y_q / ‖y_q‖²`. Returns the distance and `q`.
pub fn shape_distance(x: &[f64], y: &[f64]) -> (f64, isize) {
    let nx = norm(x);
    if nx == 0.0 {
        let d = if norm(y) == 0.0 { 0.0 } else { 1.0 };
        return (d, 0);
    }

    let n = y.len() as isize;
    let mut best = (f64::INFINITY, 0);
    for s in 0..n {
        let shift = if s <= n / 2 { s } else { s - n };
        let shifted = rotate(y, shift);
        let yy = dot(&shifted, &shifted);
        let alpha = if yy > 0.0 { dot(x, &shifted) / yy } else { 0.0 };
        let residual = x
            .iter()
            .zip(&shifted)
            .map(|(a, b)| (a - alpha * b).powi(2))
            .sum::<f64>()
            .sqrt();
        let d = residual / nx;
        if d < best.0 {
            best = (d, shift);
        }
    }
    best
}

/// Power iteration on a symmetric positive semi-definite matrix.
fn dominant_eigenvector(matrix: &[Vec<f64>], start: Vec<f64>) -> Vec<f64> {
    let width = matrix.len();
    let mut v = if norm(&start) > 0.0 {
        start
    } else {
        vec![1.0; width]
    };
    let len = norm(&v);
    v.iter_mut().for_each(|x| *x /= len);

    for _ in 0..POWER_ITERATIONS {
        let next: Vec<f64> = matrix.iter().map(|row| dot(row, &v)).collect();
        let len = norm(&next);
        if len == 0.0 {
            return vec![0.0; width];
        }
        let next: Vec<f64> = next.into_iter().map(|x| x / len).collect();
        let delta: f64 = next.iter().zip(&v).map(|(a, b)| (a - b).powi(2)).sum();
        v = next;
        if delta < POWER_TOLERANCE {
            break;
        }
    }

    if v.iter().sum::<f64>() < 0.0 {
        v.iter_mut().for_each(|x| *x = -*x);
    }
    v
}

/// Refine one centroid from its members, aligning each member to `current`.
fn refine_centroid(members: &[&[f64]], current: &[f64], width: usize) -> Vec<f64> {
    if members.is_empty() {
        return vec![0.0; width];
    }

    let has_reference = norm(current) > 0.0;
    let mut outer = vec![vec![0.0; width]; width];
    let mut start = vec![0.0; width];

    for member in members {
        let aligned = if has_reference {
            let (_, shift) = shape_distance(current, member);
            rotate(member, shift)
        } else {
            member.to_vec()
        };
        let len = norm(&aligned);
        if len == 0.0 {
            continue;
        }
        let unit: Vec<f64> = aligned.iter().map(|v| v / len).collect();
        for (i, row) in outer.iter_mut().enumerate() {
            start[i] += unit[i];
            for (j, cell) in row.iter_mut().enumerate() {
                *cell += unit[i] * unit[j];
            }
        }
    }

    dominant_eigenvector(&outer, start)
}

/// KSC with seeded random restarts. Identical seed and input give identical
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KSpectralClusterer {
    max_iterations: usize,
    restarts: usize,
    seed: u64,
}

impl Default for KSpectralClusterer {
    fn default() -> Self {
        Self::new(100, 10, 42)
    }
}

impl KSpectralClusterer {
    pub fn new(max_iterations: usize, restarts: usize, seed: u64) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            restarts: restarts.max(1),
            seed,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_iterations, config.restarts, config.seed)
    }

    /// One run from a random balanced partition. `None` if a cluster ends empty.
    fn run_once(
        &self,
        series: &[Vec<f64>],
        k: usize,
        rng: &mut ChaCha8Rng,
    ) -> Option<(ShapeClustering, f64)> {
        let n = series.len();
        let width = series[0].len();

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);
        let mut assignments = vec![0; n];
        for (pos, &i) in order.iter().enumerate() {
            assignments[i] = pos % k;
        }

        let mut centroids = vec![vec![0.0; width]; k];
        let mut shifts = vec![0isize; n];
        let mut distances = vec![0.0; n];

        for iteration in 0..self.max_iterations {
            for (j, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<&[f64]> = series
                    .iter()
                    .zip(&assignments)
                    .filter(|(_, a)| **a == j)
                    .map(|(s, _)| s.as_slice())
                    .collect();
                let refined = refine_centroid(&members, centroid, width);
                *centroid = refined;
            }

            let mut changed = false;
            for (i, s) in series.iter().enumerate() {
                let mut best = (0, f64::INFINITY, 0);
                for (j, centroid) in centroids.iter().enumerate() {
                    let (d, shift) = shape_distance(s, centroid);
                    if d < best.1 {
                        best = (j, d, shift);
                    }
                }
                if best.0 != assignments[i] {
                    assignments[i] = best.0;
                    changed = true;
                }
                distances[i] = best.1;
                shifts[i] = best.2;
            }

            if !changed {
                debug!(k, iteration, "ksc converged");
                break;
            }
        }

        if (0..k).any(|j| !assignments.contains(&j)) {
            return None;
        }

        let total = distances.iter().sum();
        Some((
            ShapeClustering {
                centroids,
                assignments,
                shifts,
                distances,
            },
            total,
        ))
    }
}

impl ShapeClusterer for KSpectralClusterer {
    fn cluster(&self, series: &[Vec<f64>], k: usize) -> Result<Option<ShapeClustering>, ClusterError> {
        check_matrix(series)?;

        let distinct: HashSet<Vec<u64>> = series
            .iter()
            .map(|s| s.iter().map(|v| v.to_bits()).collect())
            .collect();
        if k == 0 || k > distinct.len() {
            debug!(k, distinct = distinct.len(), "not enough distinct series");
            return Ok(None);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut best: Option<(ShapeClustering, f64)> = None;
        for restart in 0..self.restarts {
            match self.run_once(series, k, &mut rng) {
                Some((out, total)) => {
                    if best.as_ref().map_or(true, |(_, b)| total < *b) {
                        best = Some((out, total));
                    }
                }
                None => debug!(k, restart, "ksc run left a cluster empty"),
            }
        }

        Ok(best.map(|(out, _)| out))
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> (f64, isize) {
        shape_distance(x, y)
    }
}
