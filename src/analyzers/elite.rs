use tracing::info;

use crate::analyzers::activity::ActivityMap;
use crate::types::ActivityRecord;

/// Recency-based elite labelling.
///
/// A developer is elite when their most recent active month is not followed
/// by `inactivity_threshold` or more inactive months. Status can be lost and
/// regained along the series; only the state after the last month counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliteClassifier {
    inactivity_threshold: usize,
}

impl Default for EliteClassifier {
    fn default() -> Self {
        Self {
            inactivity_threshold: 3,
        }
    }
}

impl EliteClassifier {
    pub fn new(inactivity_threshold: usize) -> Self {
        Self {
            inactivity_threshold,
        }
    }

    pub fn classify(&self, counts: &[u32]) -> bool {
        let (elite, _) = counts
            .iter()
            .fold((false, 0usize), |(elite, inactive_run), &count| {
                if count > 0 {
                    (true, 0)
                } else {
                    let run = inactive_run + 1;
                    (elite && run < self.inactivity_threshold, run)
                }
            });
        elite
    }

    /// Freeze aggregated series into labelled records, ordered by key.
    pub fn label(&self, activity: ActivityMap) -> Vec<ActivityRecord> {
        let records: Vec<ActivityRecord> = activity
            .into_iter()
            .map(|(key, counts)| ActivityRecord {
                elite: self.classify(&counts),
                project: key.project,
                developer: key.developer,
                counts,
            })
            .collect();

        info!(
            records = records.len(),
            elite = records.iter().filter(|r| r.elite).count(),
            "labelled records"
        );
        records
    }
}
