//! Persisted activity dataset: the contract between aggregation and clustering.
//!
//! Layout: `project_name,developer,<month_1>,...,<month_T>,elite`, one row per
//! (project, developer), with `elite` written as `True` or `False`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::info;

use crate::error::DatasetError;
use crate::types::{ActivityRecord, CalendarRange, MonthKey};

pub const PROJECT_COLUMN: &str = "project_name";
pub const DEVELOPER_COLUMN: &str = "developer";
pub const ELITE_COLUMN: &str = "elite";

/// A loaded dataset together with the calendar recovered from its header.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub calendar: CalendarRange,
    pub records: Vec<ActivityRecord>,
}

fn elite_label(elite: bool) -> &'static str {
    if elite {
        "True"
    } else {
        "False"
    }
}

fn parse_elite(row: usize, value: &str) -> Result<bool, DatasetError> {
    match value {
        "True" => Ok(true),
        "False" => Ok(false),
        _ => Err(DatasetError::InvalidElite {
            row,
            value: value.to_string(),
        }),
    }
}

/// Write `records` as CSV. Every record must span the whole calendar.
pub fn export<W: Write>(
    writer: W,
    records: &[ActivityRecord],
    calendar: &CalendarRange,
) -> Result<(), DatasetError> {
    let mut csv = csv::WriterBuilder::new().from_writer(writer);
    let width = calendar.len() + 3;

    let mut header = Vec::with_capacity(width);
    header.push(PROJECT_COLUMN.to_string());
    header.push(DEVELOPER_COLUMN.to_string());
    header.extend(calendar.months().iter().map(|m| m.to_string()));
    header.push(ELITE_COLUMN.to_string());
    csv.write_record(&header)?;

    for (i, record) in records.iter().enumerate() {
        if record.counts.len() != calendar.len() {
            return Err(DatasetError::Arity {
                row: i + 1,
                expected: width,
                actual: record.counts.len() + 3,
            });
        }
        let mut row = Vec::with_capacity(width);
        row.push(record.project.clone());
        row.push(record.developer.clone());
        row.extend(record.counts.iter().map(|c| c.to_string()));
        row.push(elite_label(record.elite).to_string());
        csv.write_record(&row)?;
    }

    csv.flush().map_err(|e| DatasetError::Csv(e.into()))?;
    Ok(())
}

pub fn export_to_path(
    path: &Path,
    records: &[ActivityRecord],
    calendar: &CalendarRange,
) -> Result<(), DatasetError> {
    let file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    export(file, records, calendar)?;
    info!(path = %path.display(), rows = records.len(), "exported dataset");
    Ok(())
}

fn calendar_from_header(header: &csv::StringRecord) -> Result<CalendarRange, DatasetError> {
    if header.get(0) != Some(PROJECT_COLUMN) {
        return Err(DatasetError::MissingColumn(PROJECT_COLUMN));
    }
    if header.get(1) != Some(DEVELOPER_COLUMN) {
        return Err(DatasetError::MissingColumn(DEVELOPER_COLUMN));
    }
    if header.len() < 3 || header.get(header.len() - 1) != Some(ELITE_COLUMN) {
        return Err(DatasetError::MissingColumn(ELITE_COLUMN));
    }

    let months = header
        .iter()
        .skip(2)
        .take(header.len() - 3)
        .map(|column| column.parse::<MonthKey>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DatasetError::InvalidHeader(e.to_string()))?;

    CalendarRange::from_months(months).map_err(|e| DatasetError::InvalidHeader(e.to_string()))
}

/// Read a dataset written by [`export`]. Any short row, non-integer count or
/// unknown elite label is fatal.
pub fn load<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = csv.headers()?.clone();
    let calendar = calendar_from_header(&header)?;
    let width = header.len();
    let elite_column = width - 1;

    let mut records = Vec::new();
    for (i, row) in csv.records().enumerate() {
        let row = row?;
        let row_num = i + 1;
        if row.len() != width {
            return Err(DatasetError::Arity {
                row: row_num,
                expected: width,
                actual: row.len(),
            });
        }

        let counts = (2..elite_column)
            .map(|col| {
                let value = &row[col];
                value.trim().parse::<u32>().map_err(|_| DatasetError::NonNumeric {
                    row: row_num,
                    column: header[col].to_string(),
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        records.push(ActivityRecord {
            project: row[0].to_string(),
            developer: row[1].to_string(),
            counts,
            elite: parse_elite(row_num, &row[elite_column])?,
        });
    }

    Ok(Dataset { calendar, records })
}

pub fn load_from_path(path: &Path) -> Result<Dataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load(file)?;
    info!(
        path = %path.display(),
        rows = dataset.records.len(),
        months = dataset.calendar.len(),
        "loaded dataset"
    );
    Ok(dataset)
}
