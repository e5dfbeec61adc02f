use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzers::summarize;
use crate::clustering::KSpectralClusterer;
use crate::config::PipelineConfig;
use crate::orchestrator::ClusterOrchestrator;
use crate::parsers::load_from_path;
use crate::types::{ClusterSummary, SubgroupStats, SweepPoint};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("invalid format '{}': expected text or json", s)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CentroidReport {
    pub cluster: usize,
    pub shape: Vec<f64>,
    pub growth: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ClusterReport {
    pub records: usize,
    pub months: usize,
    pub sweep: Vec<SweepPoint>,
    pub k: usize,
    /// `None` when no clustering was produced for `k`
    pub cohesion: Option<f64>,
    pub centroids: Vec<CentroidReport>,
    pub clusters: Vec<ClusterSummary>,
    pub clustered: bool,
}

pub fn run(dataset_path: &Path, config: &PipelineConfig, format: OutputFormat) -> Result<ClusterReport> {
    let dataset = load_from_path(dataset_path)
        .with_context(|| format!("failed to load dataset {}", dataset_path.display()))?;
    let records = &dataset.records;

    let orchestrator =
        ClusterOrchestrator::new(KSpectralClusterer::from_config(config), config.zero_epsilon);

    let sweep = orchestrator.sweep(records, config.sweep_min..=config.sweep_max)?;
    let run = orchestrator.run(records, config.clusters)?;

    let report = match &run {
        Some(run) => {
            info!(k = run.k, cohesion = ?run.cohesion, "clustered dataset");
            ClusterReport {
                records: records.len(),
                months: dataset.calendar.len(),
                sweep,
                k: run.k,
                cohesion: run.cohesion,
                centroids: run
                    .centroids
                    .iter()
                    .map(|c| CentroidReport {
                        cluster: c.cluster,
                        shape: c.shape.clone(),
                        growth: c.growth(),
                    })
                    .collect(),
                clusters: summarize(run, records),
                clustered: true,
            }
        }
        None => {
            warn!(k = config.clusters, "skipping cluster report");
            ClusterReport {
                records: records.len(),
                months: dataset.calendar.len(),
                sweep,
                k: config.clusters,
                cohesion: None,
                centroids: Vec::new(),
                clusters: Vec::new(),
                clustered: false,
            }
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }
    Ok(report)
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.4}", s))
        .unwrap_or_else(|| "n/a".to_string())
}

fn format_subgroup(label: &str, stats: &SubgroupStats) -> String {
    let mut line = format!(
        "  {}: {} developers, subtotal {}, average {:.2}",
        label, stats.members, stats.subtotal, stats.average
    );
    if let Some(max) = &stats.max {
        line.push_str(&format!(", max {}/{} ({})", max.project, max.developer, max.total));
    }
    if let Some(min) = &stats.min {
        line.push_str(&format!(", min {}/{} ({})", min.project, min.developer, min.total));
    }
    line
}

fn print_text(report: &ClusterReport) {
    println!("Dataset: {} series x {} months", report.records, report.months);

    if let (Some(first), Some(last)) = (report.sweep.first(), report.sweep.last()) {
        println!();
        println!("# βCV ({} ≤ k ≤ {}):", first.k, last.k);
        for point in &report.sweep {
            println!("{}: {}", point.k, format_score(point.cohesion));
        }
    }

    println!();
    if !report.clustered {
        println!("No clusters for k={}.", report.k);
        return;
    }

    println!("# K-Spectral Centroids (k={}, βCV {}):", report.k, format_score(report.cohesion));
    for centroid in &report.centroids {
        let shape: Vec<String> = centroid.shape.iter().map(|v| format!("{:.4}", v)).collect();
        let growth = centroid
            .growth
            .map(|g| format!("{:.2}", g))
            .unwrap_or_else(|| "n/a".to_string());
        println!("{}: [{}] (Growth:{})", centroid.cluster, shape.join(", "), growth);
    }

    println!();
    println!("# Clusters:");
    for summary in &report.clusters {
        println!("cluster {}: {} developers", summary.cluster, summary.members);
        println!("{}", format_subgroup("elite", &summary.elite));
        println!("{}", format_subgroup("non-elite", &summary.non_elite));
    }
}
