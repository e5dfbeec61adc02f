pub mod ksc;
pub mod mock;

use serde::Serialize;

use crate::error::ClusterError;

pub use ksc::KSpectralClusterer;

/// Raw output of a shape clusterer for one `k`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeClustering {
    /// `k` rows, each as long as the input series
    pub centroids: Vec<Vec<f64>>,
    /// Cluster id per input series
    pub assignments: Vec<usize>,
    /// Circular shift aligning each series with its centroid
    pub shifts: Vec<isize>,
    /// Distance from each series to its centroid
    pub distances: Vec<f64>,
}

impl ShapeClustering {
    /// Whether the output is a usable partition of `series_count` series into
    /// `k` clusters of `series_len` samples.
    pub fn is_consistent(&self, series_count: usize, series_len: usize, k: usize) -> bool {
        self.centroids.len() == k
            && self.centroids.iter().all(|c| c.len() == series_len)
            && self.assignments.len() == series_count
            && self.shifts.len() == series_count
            && self.distances.len() == series_count
            && self.assignments.iter().all(|&a| a < k)
    }
}

/// Shape-based time-series clustering with an alignment-tolerant distance.
pub trait ShapeClusterer: Send + Sync {
    /// Partition `series` into `k` clusters.
    /// `Ok(None)` means no valid partition exists for this `k`.
    fn cluster(&self, series: &[Vec<f64>], k: usize) -> Result<Option<ShapeClustering>, ClusterError>;

    /// Distance between two series and the shift applied to `y` to reach it.
    fn distance(&self, x: &[f64], y: &[f64]) -> (f64, isize);
}

/// Check that `series` is a non-empty rectangular matrix; returns its width.
pub fn check_matrix(series: &[Vec<f64>]) -> Result<usize, ClusterError> {
    let first = series.first().ok_or(ClusterError::EmptyInput)?;
    let width = first.len();
    if width == 0 {
        return Err(ClusterError::EmptyInput);
    }
    for (row, s) in series.iter().enumerate() {
        if s.len() != width {
            return Err(ClusterError::RaggedSeries {
                row,
                expected: width,
                actual: s.len(),
            });
        }
    }
    Ok(width)
}
