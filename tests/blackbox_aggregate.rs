/// E2E: project directories → aggregate → exact dataset contents.
mod helpers;

use helpers::{aggregate_fixture, cli, fixture_config, setup_projects, write_month};
use predicates::prelude::*;

/// Fixture projects over 201501..=201504:
///   alpha/alice:      Push x2 (01), Push (02), Gollum (04)      → 2,1,0,1  elite
///   alpha/bob:        Create (01), Issues (03, ignored), Delete (04) → 1,0,0,1 elite
///   alpha/carol:      Watch, IssueComment only                  → no row
///   alpha/erin:       Push (01)                                 → 1,0,0,0  not elite
///   beta_tools/alice: Push (02)                                 → 0,1,0,0  elite
///   beta_tools/dave:  Push x3 (02), Fork (04, ignored)          → 0,3,0,0  elite
#[test]
fn aggregate_writes_exact_dataset() {
    let (tmp, root) = setup_projects(&["alpha", "beta_tools"]);
    let output = aggregate_fixture(&tmp, &root);

    let csv = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "project_name,developer,201501,201502,201503,201504,elite",
            "alpha,alice,2,1,0,1,True",
            "alpha,bob,1,0,0,1,True",
            "alpha,erin,1,0,0,0,False",
            "beta_tools,alice,0,1,0,0,True",
            "beta_tools,dave,0,3,0,0,True",
        ]
    );
}

#[test]
fn aggregate_prints_summary_json() {
    let (tmp, root) = setup_projects(&["alpha", "beta_tools"]);
    let output = tmp.path().join("out.csv");

    let stdout = cli()
        .args([
            "aggregate",
            "--projects",
            root.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--config",
            fixture_config("four_months.json").to_str().unwrap(),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(summary["projects"], 2);
    assert_eq!(summary["records"], 5);
    assert_eq!(summary["elite"], 4);
    assert_eq!(summary["months"], 4);
}

#[test]
fn default_calendar_spans_46_months() {
    let (tmp, root) = setup_projects(&["alpha"]);
    let output = tmp.path().join("out.csv");

    cli()
        .args([
            "aggregate",
            "--projects",
            root.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let csv = std::fs::read_to_string(&output).unwrap();
    let header: Vec<&str> = csv.lines().next().unwrap().split(',').collect();
    assert_eq!(header.len(), 46 + 3);
    assert_eq!(header[2], "201501");
    assert_eq!(header[47], "201810");

    // Zero-filled across the full range: alice is inactive after 201504.
    let alice = csv.lines().find(|l| l.starts_with("alpha,alice,")).unwrap();
    assert!(alice.ends_with(",False"));
    assert_eq!(alice.split(',').count(), 49);
}

#[test]
fn month_outside_calendar_fails_without_output() {
    let (tmp, root) = setup_projects(&["alpha"]);
    write_month(
        &root,
        "gamma",
        "201507",
        &[r#"{"type":"PushEvent","actor_login":"zoe"}"#],
    );
    let output = tmp.path().join("out.csv");

    cli()
        .args([
            "aggregate",
            "--projects",
            root.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--config",
            fixture_config("four_months.json").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the calendar"));

    assert!(!output.exists());
}

#[test]
fn malformed_event_line_is_fatal() {
    let (tmp, root) = setup_projects(&[]);
    write_month(
        &root,
        "gamma",
        "201502",
        &[r#"{"type":"PushEvent","actor_login":"zoe"}"#, "{broken"],
    );

    cli()
        .args([
            "aggregate",
            "--projects",
            root.to_str().unwrap(),
            "--output",
            tmp.path().join("out.csv").to_str().unwrap(),
            "--config",
            fixture_config("four_months.json").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed event"));
}

#[test]
fn empty_projects_produce_header_only() {
    let (tmp, root) = setup_projects(&[]);
    std::fs::create_dir_all(root.join("empty")).unwrap();
    let output = aggregate_fixture(&tmp, &root);

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn invalid_config_is_rejected() {
    let (tmp, root) = setup_projects(&["alpha"]);
    let config = tmp.path().join("bad.json");
    std::fs::write(&config, r#"{"calendar_start": "201505", "calendar_end": "201501"}"#).unwrap();

    cli()
        .args([
            "aggregate",
            "--projects",
            root.to_str().unwrap(),
            "--output",
            tmp.path().join("out.csv").to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid calendar"));
}

#[test]
fn config_defaults_prints_template() {
    let stdout = cli()
        .arg("config-defaults")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let config: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(config["calendar_start"], "201501");
    assert_eq!(config["calendar_end"], "201810");
    assert_eq!(config["inactivity_threshold"], 3);
    assert_eq!(config["zero_epsilon"], 0.0001);
}
