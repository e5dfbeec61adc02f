#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Path of a config fixture.
pub fn fixture_config(name: &str) -> PathBuf {
    fixtures_dir().join("config").join(name)
}

/// Create an isolated projects root holding copies of the given fixture projects.
///
/// Returns (TempDir, projects_root). The `TempDir` must outlive the test.
pub fn setup_projects(projects: &[&str]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("projects");
    std::fs::create_dir_all(&root).unwrap();

    for project in projects {
        let src = fixtures_dir().join("projects").join(project);
        let dest = root.join(project);
        std::fs::create_dir_all(&dest).unwrap();
        for entry in std::fs::read_dir(&src).unwrap() {
            let entry = entry.unwrap();
            std::fs::copy(entry.path(), dest.join(entry.file_name())).unwrap();
        }
    }

    (tmp, root)
}

/// Write an ad-hoc month file `<root>/<project>/<project>_<month>.json`.
pub fn write_month(root: &Path, project: &str, month: &str, lines: &[&str]) {
    let dir = root.join(project);
    std::fs::create_dir_all(&dir).unwrap();
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(dir.join(format!("{project}_{month}.json")), content).unwrap();
}

#[allow(deprecated)]
pub fn cli() -> Command {
    let mut cmd = Command::cargo_bin("activity-clusters").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Run `aggregate` over `root` with the four-month fixture config and return
/// the dataset path.
pub fn aggregate_fixture(tmp: &TempDir, root: &Path) -> PathBuf {
    let output = tmp.path().join("activities.csv");
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
        .success();
    output
}
