use std::collections::HashMap;
use std::sync::Mutex;

use super::{check_matrix, ShapeClusterer, ShapeClustering};
use crate::error::ClusterError;

/// Scripted clusterer for tests: returns a canned result per `k` and records
/// every call. Distances are plain Euclidean with no shift.
#[derive(Default)]
pub struct MockClusterer {
    /// Result returned for each `k`; a missing entry means no clustering
    pub responses: Mutex<HashMap<usize, ShapeClustering>>,
    /// Call log: (k, series count)
    pub calls: Mutex<Vec<(usize, usize)>>,
}

impl MockClusterer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, k: usize, clustering: ShapeClustering) -> Self {
        self.responses.lock().unwrap().insert(k, clustering);
        self
    }

    /// Canned clustering with zero shifts and distances.
    pub fn clustering(assignments: Vec<usize>, centroids: Vec<Vec<f64>>) -> ShapeClustering {
        let n = assignments.len();
        ShapeClustering {
            centroids,
            assignments,
            shifts: vec![0; n],
            distances: vec![0.0; n],
        }
    }

    pub fn called_ks(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(k, _)| *k).collect()
    }
}

impl ShapeClusterer for MockClusterer {
    fn cluster(&self, series: &[Vec<f64>], k: usize) -> Result<Option<ShapeClustering>, ClusterError> {
        check_matrix(series)?;
        self.calls.lock().unwrap().push((k, series.len()));
        Ok(self.responses.lock().unwrap().get(&k).cloned())
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> (f64, isize) {
        let d = x
            .iter()
            .zip(y)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();
        (d, 0)
    }
}
