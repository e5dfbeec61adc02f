use rayon::prelude::*;

use crate::clustering::ShapeClusterer;

#[derive(Debug, Default, Clone, Copy)]
struct PairTotals {
    intra_sum: f64,
    intra_pairs: usize,
    inter_sum: f64,
    inter_pairs: usize,
}

impl PairTotals {
    fn merge(self, other: Self) -> Self {
        Self {
            intra_sum: self.intra_sum + other.intra_sum,
            intra_pairs: self.intra_pairs + other.intra_pairs,
            inter_sum: self.inter_sum + other.inter_sum,
            inter_pairs: self.inter_pairs + other.inter_pairs,
        }
    }
}

/// βCV: mean intra-cluster pairwise distance over mean inter-cluster pairwise
/// distance. Lower means tighter, better separated clusters.
///
/// `None` when there are no intra pairs, no inter pairs, or the inter mean is
/// zero.
pub fn beta_cv<C>(series: &[Vec<f64>], assignments: &[usize], clusterer: &C) -> Option<f64>
where
    C: ShapeClusterer + ?Sized,
{
    let n = series.len().min(assignments.len());

    // Rows are computed in parallel and summed in order so the score does not
    // depend on scheduling.
    let rows: Vec<PairTotals> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut totals = PairTotals::default();
            for j in (i + 1)..n {
                let (d, _) = clusterer.distance(&series[i], &series[j]);
                if assignments[i] == assignments[j] {
                    totals.intra_sum += d;
                    totals.intra_pairs += 1;
                } else {
                    totals.inter_sum += d;
                    totals.inter_pairs += 1;
                }
            }
            totals
        })
        .collect();
    let totals = rows.into_iter().fold(PairTotals::default(), PairTotals::merge);

    if totals.intra_pairs == 0 || totals.inter_pairs == 0 {
        return None;
    }
    let intra_mean = totals.intra_sum / totals.intra_pairs as f64;
    let inter_mean = totals.inter_sum / totals.inter_pairs as f64;
    if inter_mean == 0.0 {
        return None;
    }
    Some(intra_mean / inter_mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::mock::MockClusterer;

    fn points(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    #[test]
    fn tight_separated_clusters_score_low() {
        let series = points(&[0.0, 1.0, 10.0, 11.0]);
        let score = beta_cv(&series, &[0, 0, 1, 1], &MockClusterer::new()).unwrap();
        assert!((score - 0.1).abs() < 1e-12);
    }

    #[test]
    fn mixed_clusters_score_higher() {
        let series = points(&[0.0, 1.0, 10.0, 11.0]);
        let good = beta_cv(&series, &[0, 0, 1, 1], &MockClusterer::new()).unwrap();
        let bad = beta_cv(&series, &[0, 1, 0, 1], &MockClusterer::new()).unwrap();
        assert!(bad > good);
    }

    #[test]
    fn undefined_without_both_pair_kinds() {
        let series = points(&[0.0, 1.0, 2.0]);
        let mock = MockClusterer::new();
        assert_eq!(beta_cv(&series, &[0, 0, 0], &mock), None);
        assert_eq!(beta_cv(&series, &[0, 1, 2], &mock), None);
        assert_eq!(beta_cv(&[], &[], &mock), None);
    }
}
