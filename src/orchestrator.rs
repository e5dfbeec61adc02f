use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzers::cohesion::beta_cv;
use crate::clustering::{ShapeClusterer, ShapeClustering};
use crate::error::ClusterError;
use crate::types::{ActivityRecord, Centroid, ClusterAssignment, SweepPoint};

/// Outcome of clustering a set of records for one `k`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterRun {
    pub k: usize,
    pub assignments: Vec<ClusterAssignment>,
    pub centroids: Vec<Centroid>,
    /// Per-record shift and distance reported by the clusterer
    pub shifts: Vec<isize>,
    pub distances: Vec<f64>,
    /// βCV of the partition; `None` when undefined
    pub cohesion: Option<f64>,
}

impl ClusterRun {
    /// Record indices grouped by cluster id, in record order.
    pub fn members_by_cluster(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for assignment in &self.assignments {
            groups
                .entry(assignment.cluster)
                .or_default()
                .push(assignment.record);
        }
        groups
    }

    /// Records of one cluster.
    pub fn member_records<'r>(
        &'r self,
        cluster: usize,
        records: &'r [ActivityRecord],
    ) -> impl Iterator<Item = &'r ActivityRecord> + 'r {
        self.assignments
            .iter()
            .filter(move |a| a.cluster == cluster)
            .filter_map(move |a| records.get(a.record))
    }
}

/// Drives a [`ShapeClusterer`] over activity records.
pub struct ClusterOrchestrator<C> {
    clusterer: C,
    zero_epsilon: Option<f64>,
}

impl<C: ShapeClusterer> ClusterOrchestrator<C> {
    pub fn new(clusterer: C, zero_epsilon: Option<f64>) -> Self {
        Self {
            clusterer,
            zero_epsilon,
        }
    }

    pub fn clusterer(&self) -> &C {
        &self.clusterer
    }

    /// Clustering input: one row per record. Zero counts become the epsilon
    /// when one is configured; the records themselves are untouched.
    pub fn series_matrix(&self, records: &[ActivityRecord]) -> Vec<Vec<f64>> {
        records
            .iter()
            .map(|record| {
                record
                    .counts
                    .iter()
                    .map(|&count| match (count, self.zero_epsilon) {
                        (0, Some(eps)) => eps,
                        _ => f64::from(count),
                    })
                    .collect()
            })
            .collect()
    }

    /// Cluster `records` into `k` groups.
    ///
    /// `Ok(None)` when the clusterer produces no usable partition (or there is
    /// nothing to cluster); callers skip reporting for that `k`.
    pub fn run(&self, records: &[ActivityRecord], k: usize) -> Result<Option<ClusterRun>, ClusterError> {
        if records.is_empty() {
            warn!(k, "no records to cluster");
            return Ok(None);
        }

        let series = self.series_matrix(records);
        let width = series[0].len();
        let clustering = match self.clusterer.cluster(&series, k)? {
            Some(c) if c.is_consistent(series.len(), width, k) => c,
            Some(_) => {
                warn!(k, "clusterer returned an inconsistent partition");
                return Ok(None);
            }
            None => {
                warn!(k, "no valid clustering");
                return Ok(None);
            }
        };

        let cohesion = beta_cv(&series, &clustering.assignments, &self.clusterer);
        Ok(Some(Self::build_run(k, records, clustering, cohesion)))
    }

    fn build_run(
        k: usize,
        records: &[ActivityRecord],
        clustering: ShapeClustering,
        cohesion: Option<f64>,
    ) -> ClusterRun {
        let assignments = records
            .iter()
            .zip(&clustering.assignments)
            .enumerate()
            .map(|(record, (r, &cluster))| ClusterAssignment {
                record,
                project: r.project.clone(),
                developer: r.developer.clone(),
                cluster,
            })
            .collect();

        let centroids = clustering
            .centroids
            .into_iter()
            .enumerate()
            .map(|(cluster, shape)| Centroid { cluster, shape })
            .collect();

        ClusterRun {
            k,
            assignments,
            centroids,
            shifts: clustering.shifts,
            distances: clustering.distances,
            cohesion,
        }
    }

    /// Cohesion for every `k` in `ks`, computed in parallel and sorted by `k`.
    /// A `k` without a clustering yields `cohesion: None`.
    pub fn sweep(
        &self,
        records: &[ActivityRecord],
        ks: RangeInclusive<usize>,
    ) -> Result<Vec<SweepPoint>, ClusterError> {
        let points = ks
            .into_par_iter()
            .map(|k| {
                let cohesion = self.run(records, k)?.and_then(|run| run.cohesion);
                Ok(SweepPoint { k, cohesion })
            })
            .collect::<Result<Vec<_>, ClusterError>>()?;

        for point in &points {
            info!(k = point.k, cohesion = ?point.cohesion, "sweep point");
        }
        Ok(points)
    }
}
