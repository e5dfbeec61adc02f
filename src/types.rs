use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// A calendar month, written `YYYYMM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, IngestError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| IngestError::InvalidMonth(format!("{year:04}{month:02}")))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month, or `None` past chrono's supported range.
    pub fn succ(&self) -> Option<Self> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)?
            .checked_add_months(Months::new(1))
            .map(|d| Self {
                year: d.year(),
                month: d.month(),
            })
    }

    /// Months elapsed since year 0; consecutive months differ by one.
    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IngestError::InvalidMonth(s.to_string()));
        }
        let year: i32 = s[..4]
            .parse()
            .map_err(|_| IngestError::InvalidMonth(s.to_string()))?;
        let month: u32 = s[4..]
            .parse()
            .map_err(|_| IngestError::InvalidMonth(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = IngestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Contiguous, ordered run of months shared by every series in a run.
/// Its length is the dimensionality of every activity vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarRange {
    months: Vec<MonthKey>,
}

impl CalendarRange {
    /// Every month from `start` to `end`, both inclusive.
    pub fn between(start: MonthKey, end: MonthKey) -> Result<Self, IngestError> {
        if end < start {
            return Err(IngestError::InvalidCalendar(format!(
                "end {end} precedes start {start}"
            )));
        }
        let mut months = vec![start];
        let mut current = start;
        while current < end {
            current = current.succ().ok_or_else(|| {
                IngestError::InvalidCalendar(format!("cannot advance past {current}"))
            })?;
            months.push(current);
        }
        Ok(Self { months })
    }

    /// Rebuild a calendar from an explicit month list, e.g. a dataset header.
    pub fn from_months(months: Vec<MonthKey>) -> Result<Self, IngestError> {
        if months.is_empty() {
            return Err(IngestError::InvalidCalendar("no months".into()));
        }
        for pair in months.windows(2) {
            if pair[1].ordinal() != pair[0].ordinal() + 1 {
                return Err(IngestError::InvalidCalendar(format!(
                    "{} does not directly follow {}",
                    pair[1], pair[0]
                )));
            }
        }
        Ok(Self { months })
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }

    pub fn start(&self) -> MonthKey {
        self.months[0]
    }

    pub fn end(&self) -> MonthKey {
        self.months[self.months.len() - 1]
    }

    /// Position of `month` within the calendar.
    pub fn index_of(&self, month: MonthKey) -> Option<usize> {
        let offset = month.ordinal() - self.start().ordinal();
        usize::try_from(offset).ok().filter(|&i| i < self.months.len())
    }

    pub fn contains(&self, month: MonthKey) -> bool {
        self.index_of(month).is_some()
    }
}

/// One event as read from a month file. Consumed once by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub developer: String,
    pub month: MonthKey,
    pub kind: String,
}

/// Composite key of an activity series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ActivityKey {
    pub project: String,
    pub developer: String,
}

impl ActivityKey {
    pub fn new(project: impl Into<String>, developer: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            developer: developer.into(),
        }
    }
}

/// Monthly qualifying-event counts of one developer in one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub project: String,
    pub developer: String,
    /// One entry per calendar month, in calendar order.
    pub counts: Vec<u32>,
    pub elite: bool,
}

impl ActivityRecord {
    /// Sum of all monthly counts.
    pub fn total_activity(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn key(&self) -> ActivityKey {
        ActivityKey::new(&self.project, &self.developer)
    }
}

/// Cluster membership of one record; `record` indexes the clustered slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    pub record: usize,
    pub project: String,
    pub developer: String,
    pub cluster: usize,
}

/// Representative shape of a cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Centroid {
    pub cluster: usize,
    pub shape: Vec<f64>,
}

impl Centroid {
    /// `first + last * 100`; a descriptive score kept for report parity.
    pub fn growth(&self) -> Option<f64> {
        let first = self.shape.first()?;
        let last = self.shape.last()?;
        Some(first + last * 100.0)
    }
}

/// A developer together with their total activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeveloperActivity {
    pub project: String,
    pub developer: String,
    pub total: u64,
}

/// Aggregates over the elite or the non-elite members of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgroupStats {
    pub members: usize,
    pub subtotal: u64,
    pub average: f64,
    pub max: Option<DeveloperActivity>,
    pub min: Option<DeveloperActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub members: usize,
    pub elite: SubgroupStats,
    pub non_elite: SubgroupStats,
}

/// Cohesion obtained for one candidate cluster count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub k: usize,
    /// `None` when no clustering was produced or the score is undefined.
    pub cohesion: Option<f64>,
}
