/// Library-level pipeline: event logs → labelled records → CSV → clustering.
mod helpers;

use activity_clusters::analyzers::{summarize, ActivityAggregator, EliteClassifier};
use activity_clusters::clustering::mock::MockClusterer;
use activity_clusters::config::PipelineConfig;
use activity_clusters::orchestrator::ClusterOrchestrator;
use activity_clusters::parsers::{export_to_path, list_projects, load_from_path};
use activity_clusters::types::ActivityRecord;
use helpers::setup_projects;

fn four_month_config() -> PipelineConfig {
    PipelineConfig {
        calendar_start: "201501".into(),
        calendar_end: "201504".into(),
        ..Default::default()
    }
}

fn labelled_fixture() -> Vec<ActivityRecord> {
    let (_tmp, root) = setup_projects(&["alpha", "beta_tools"]);
    let config = four_month_config();
    let calendar = config.calendar().unwrap();
    let projects = list_projects(&root).unwrap();
    let aggregator = ActivityAggregator::new(&calendar, config.elite_event_kinds.iter().cloned());
    let activity = aggregator.aggregate(&projects).unwrap();
    EliteClassifier::new(config.inactivity_threshold).label(activity)
}

#[test]
fn records_are_ordered_and_labelled() {
    let records = labelled_fixture();
    let keys: Vec<(&str, &str, bool)> = records
        .iter()
        .map(|r| (r.project.as_str(), r.developer.as_str(), r.elite))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("alpha", "alice", true),
            ("alpha", "bob", true),
            ("alpha", "erin", false),
            ("beta_tools", "alice", true),
            ("beta_tools", "dave", true),
        ]
    );
    assert_eq!(records[0].counts, vec![2, 1, 0, 1]);
    assert_eq!(records[4].counts, vec![0, 3, 0, 0]);
}

#[test]
fn export_then_load_preserves_records() {
    let records = labelled_fixture();
    let calendar = four_month_config().calendar().unwrap();
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("activities.csv");

    export_to_path(&path, &records, &calendar).unwrap();
    let dataset = load_from_path(&path).unwrap();

    assert_eq!(dataset.calendar, calendar);
    assert_eq!(dataset.records, records);
}

#[test]
fn scripted_clustering_feeds_summaries() {
    let records = labelled_fixture();
    // alice/bob/erin in cluster 0, the beta_tools developers in cluster 1.
    let clusterer = MockClusterer::new().with_response(
        2,
        MockClusterer::clustering(
            vec![0, 0, 0, 1, 1],
            vec![vec![1.0, 0.0, 0.0, 1.0], vec![0.0, 1.0, 0.0, 0.0]],
        ),
    );
    let orchestrator = ClusterOrchestrator::new(clusterer, None);

    let run = orchestrator.run(&records, 2).unwrap().unwrap();
    let summaries = summarize(&run, &records);
    assert_eq!(summaries.len(), 2);

    let first = &summaries[0];
    assert_eq!(first.members, 3);
    assert_eq!(first.elite.members, 2);
    assert_eq!(first.elite.subtotal, 6);
    assert_eq!(first.elite.max.as_ref().unwrap().developer, "alice");
    assert_eq!(first.elite.min.as_ref().unwrap().developer, "bob");
    assert_eq!(first.non_elite.members, 1);
    assert_eq!(first.non_elite.subtotal, 1);

    let second = &summaries[1];
    assert_eq!(second.members, 2);
    assert_eq!(second.elite.subtotal, 4);
    assert_eq!(second.elite.max.as_ref().unwrap().developer, "dave");
    assert_eq!(second.non_elite.members, 0);
    assert!(second.non_elite.max.is_none());

    assert_eq!(run.centroids[0].growth(), Some(101.0));
    assert!(run.cohesion.is_some());
}

#[test]
fn sweep_reports_missing_clusterings_as_none() {
    let records = labelled_fixture();
    let clusterer = MockClusterer::new().with_response(
        2,
        MockClusterer::clustering(vec![0, 0, 0, 1, 1], vec![vec![1.0; 4], vec![2.0; 4]]),
    );
    let orchestrator = ClusterOrchestrator::new(clusterer, Some(0.0001));

    let sweep = orchestrator.sweep(&records, 2..=4).unwrap();
    let ks: Vec<usize> = sweep.iter().map(|p| p.k).collect();
    assert_eq!(ks, vec![2, 3, 4]);
    assert!(sweep[0].cohesion.is_some());
    assert!(sweep[1].cohesion.is_none());
    assert!(sweep[2].cohesion.is_none());

    let mut called = orchestrator.clusterer().called_ks();
    called.sort();
    assert_eq!(called, vec![2, 3, 4]);
}
