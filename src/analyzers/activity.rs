use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::parsers::EventLogReader;
use crate::types::{ActivityKey, CalendarRange, MonthKey, RawEvent};

/// Dense monthly counts per (project, developer), one entry per calendar month.
pub type ActivityMap = BTreeMap<ActivityKey, Vec<u32>>;

/// Folds qualifying events into per-developer monthly count vectors.
pub struct ActivityAggregator<'a> {
    calendar: &'a CalendarRange,
    qualifying: HashSet<String>,
}

impl<'a> ActivityAggregator<'a> {
    pub fn new<I, S>(calendar: &'a CalendarRange, qualifying_kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            calendar,
            qualifying: qualifying_kinds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_qualifying(&self, kind: &str) -> bool {
        self.qualifying.contains(kind)
    }

    fn month_index(&self, project: &str, month: MonthKey) -> Result<usize, IngestError> {
        self.calendar
            .index_of(month)
            .ok_or_else(|| IngestError::MonthOutOfRange {
                project: project.to_string(),
                month,
                start: self.calendar.start(),
                end: self.calendar.end(),
            })
    }

    /// Count one event. The month must lie inside the calendar; non-qualifying
    /// kinds are dropped without creating a series.
    pub fn consume(
        &self,
        activity: &mut ActivityMap,
        project: &str,
        event: RawEvent,
    ) -> Result<(), IngestError> {
        let index = self.month_index(project, event.month)?;
        if !self.is_qualifying(&event.kind) {
            return Ok(());
        }

        let counts = activity
            .entry(ActivityKey::new(project, event.developer))
            .or_insert_with(|| vec![0; self.calendar.len()]);
        counts[index] += 1;
        Ok(())
    }

    /// Aggregate an in-memory event source of one project.
    pub fn aggregate_events<I>(&self, project: &str, events: I) -> Result<ActivityMap, IngestError>
    where
        I: IntoIterator<Item = RawEvent>,
    {
        let mut activity = ActivityMap::new();
        for event in events {
            self.consume(&mut activity, project, event)?;
        }
        Ok(activity)
    }

    /// Aggregate one project's month files. Each file's month is checked
    /// against the calendar before the file is parsed.
    pub fn aggregate_project(&self, reader: &EventLogReader) -> Result<ActivityMap, IngestError> {
        let files = reader.month_files()?;
        if files.is_empty() {
            warn!(project = reader.project(), "project has no month files");
            return Ok(ActivityMap::new());
        }

        let mut activity = ActivityMap::new();
        for (month, path) in files {
            self.month_index(reader.project(), month)?;
            for event in reader.read_month(month, &path)? {
                self.consume(&mut activity, reader.project(), event)?;
            }
        }

        debug!(
            project = reader.project(),
            developers = activity.len(),
            "aggregated project"
        );
        Ok(activity)
    }

    /// Aggregate every project in parallel. Projects never share a key, so the
    /// per-project maps merge without conflicts.
    pub fn aggregate(&self, projects: &[EventLogReader]) -> Result<ActivityMap, IngestError> {
        let per_project = projects
            .par_iter()
            .map(|reader| self.aggregate_project(reader))
            .collect::<Result<Vec<_>, _>>()?;

        let mut activity = ActivityMap::new();
        for project_activity in per_project {
            activity.extend(project_activity);
        }

        info!(
            projects = projects.len(),
            series = activity.len(),
            months = self.calendar.len(),
            "aggregated activity"
        );
        Ok(activity)
    }
}
