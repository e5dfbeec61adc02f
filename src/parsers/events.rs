use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::types::{MonthKey, RawEvent};

/// The fields of an event line the aggregator needs; everything else is ignored.
#[derive(Debug, Deserialize)]
struct EventLine {
    #[serde(rename = "type")]
    kind: String,
    actor_login: String,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> IngestError + '_ {
    move |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// List every project under `root`, sorted by name.
/// Each immediate sub-directory is a project named after the directory.
pub fn list_projects(root: &Path) -> Result<Vec<EventLogReader>, IngestError> {
    if !root.exists() {
        warn!(root = %root.display(), "projects root does not exist");
        return Ok(Vec::new());
    }

    let mut projects = Vec::new();
    for entry in fs::read_dir(root).map_err(io_error(root))? {
        let entry = entry.map_err(io_error(root))?;
        if !entry.file_type().map_err(io_error(root))?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            projects.push(EventLogReader::new(name, entry.path()));
        }
    }

    projects.sort_by(|a, b| a.project.cmp(&b.project));
    Ok(projects)
}

/// Month encoded in a `<project>_<YYYYMM>.<ext>` file name.
/// The month is the text after the last `_`, so project names may contain `_`.
pub fn month_from_file_name(path: &Path) -> Result<MonthKey, IngestError> {
    let invalid = || IngestError::InvalidFileName {
        path: path.to_path_buf(),
    };
    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(invalid)?;
    let (_, month) = stem.rsplit_once('_').ok_or_else(invalid)?;
    month.parse().map_err(|_| invalid())
}

/// Reads one project's per-month event files.
#[derive(Debug, Clone)]
pub struct EventLogReader {
    project: String,
    dir: PathBuf,
}

impl EventLogReader {
    pub fn new(project: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            dir: dir.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All month files of the project, sorted by path.
    /// A missing directory yields no files.
    pub fn month_files(&self) -> Result<Vec<(MonthKey, PathBuf)>, IngestError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_error(&self.dir))? {
            let path = entry.map_err(io_error(&self.dir))?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        paths
            .into_iter()
            .map(|path| Ok((month_from_file_name(&path)?, path)))
            .collect()
    }

    /// Parse one month file. Blank lines are skipped; any other line that is
    /// not a valid event is fatal.
    pub fn read_month(&self, month: MonthKey, path: &Path) -> Result<Vec<RawEvent>, IngestError> {
        let file = File::open(path).map_err(io_error(path))?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(io_error(path))?;
            if line.trim().is_empty() {
                continue;
            }

            let event: EventLine =
                serde_json::from_str(&line).map_err(|source| IngestError::MalformedEvent {
                    path: path.to_path_buf(),
                    line: line_num + 1,
                    source,
                })?;
            events.push(RawEvent {
                developer: event.actor_login,
                month,
                kind: event.kind,
            });
        }

        debug!(
            project = %self.project,
            %month,
            events = events.len(),
            "read month file"
        );
        Ok(events)
    }

    /// Every event of the project, month file by month file.
    pub fn events(&self) -> Result<Vec<RawEvent>, IngestError> {
        let mut events = Vec::new();
        for (month, path) in self.month_files()? {
            events.extend(self.read_month(month, &path)?);
        }
        Ok(events)
    }
}
