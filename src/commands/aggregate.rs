use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::analyzers::{ActivityAggregator, EliteClassifier};
use crate::config::PipelineConfig;
use crate::parsers::{export_to_path, list_projects};

/// One-line summary printed after export.
#[derive(Debug, Serialize)]
pub struct AggregateSummary {
    pub projects: usize,
    pub records: usize,
    pub elite: usize,
    pub months: usize,
}

/// Build the activity dataset from `<projects_root>/<project>/<project>_<YYYYMM>.*`.
pub fn run(projects_root: &Path, output: &Path, config: &PipelineConfig) -> Result<AggregateSummary> {
    let calendar = config.calendar().context("invalid calendar bounds")?;
    let projects = list_projects(projects_root)
        .with_context(|| format!("failed to list projects in {}", projects_root.display()))?;
    info!(
        root = %projects_root.display(),
        projects = projects.len(),
        start = %calendar.start(),
        end = %calendar.end(),
        "discovered projects"
    );

    let aggregator = ActivityAggregator::new(&calendar, config.elite_event_kinds.iter().cloned());
    let activity = aggregator.aggregate(&projects)?;

    let records = EliteClassifier::new(config.inactivity_threshold).label(activity);
    export_to_path(output, &records, &calendar)
        .with_context(|| format!("failed to export dataset to {}", output.display()))?;

    let summary = AggregateSummary {
        projects: projects.len(),
        records: records.len(),
        elite: records.iter().filter(|r| r.elite).count(),
        months: calendar.len(),
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(summary)
}
