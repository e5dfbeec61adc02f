use crate::orchestrator::ClusterRun;
use crate::types::{ActivityRecord, ClusterSummary, DeveloperActivity, SubgroupStats};

fn developer_activity(record: &ActivityRecord) -> DeveloperActivity {
    DeveloperActivity {
        project: record.project.clone(),
        developer: record.developer.clone(),
        total: record.total_activity(),
    }
}

/// Totals, average and extrema of total activity over `records`.
///
/// Ties for the maximum or minimum go to the record seen last.
pub fn subgroup_stats<'a, I>(records: I) -> SubgroupStats
where
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let mut members = 0;
    let mut subtotal = 0u64;
    let mut max: Option<DeveloperActivity> = None;
    let mut min: Option<DeveloperActivity> = None;

    for record in records {
        let total = record.total_activity();
        members += 1;
        subtotal += total;

        if max.as_ref().map_or(true, |m| total >= m.total) {
            max = Some(developer_activity(record));
        }
        if min.as_ref().map_or(true, |m| total <= m.total) {
            min = Some(developer_activity(record));
        }
    }

    let average = if members == 0 {
        0.0
    } else {
        subtotal as f64 / members as f64
    };

    SubgroupStats {
        members,
        subtotal,
        average,
        max,
        min,
    }
}

/// Per-cluster elite and non-elite statistics, ordered by cluster id.
/// Members are visited in record order.
pub fn summarize(run: &ClusterRun, records: &[ActivityRecord]) -> Vec<ClusterSummary> {
    run.members_by_cluster()
        .into_iter()
        .map(|(cluster, indices)| {
            let members: Vec<&ActivityRecord> =
                indices.iter().filter_map(|&i| records.get(i)).collect();
            ClusterSummary {
                cluster,
                members: members.len(),
                elite: subgroup_stats(members.iter().copied().filter(|r| r.elite)),
                non_elite: subgroup_stats(members.iter().copied().filter(|r| !r.elite)),
            }
        })
        .collect()
}
