use std::collections::HashMap;

use crate::course::{PracticalScheduleRow, ScheduleRow, StudentRow};
use crate::groups::GroupIndex;
use crate::serde::{parse_date, parse_time};

use super::{Table, TableError, TableRow};

/// Column names of a schedule sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleColumns {
    pub topic: String,
    pub staff: String,
    pub room: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl Default for ScheduleColumns {
    fn default() -> Self {
        Self {
            topic: "Topic".to_string(),
            staff: "Staff".to_string(),
            room: "Room".to_string(),
            date: "Date".to_string(),
            start_time: "Start Time".to_string(),
            end_time: "End Time".to_string(),
        }
    }
}

/// Reads a wide student sheet. The id and name columns form the identity; every
/// other column becomes a labelled cell, in sheet order.
pub fn student_rows(
    table: &Table,
    id_column: &str,
    name_column: &str,
) -> Result<Vec<StudentRow>, TableError> {
    table.require_column(id_column)?;
    table.require_column(name_column)?;

    let mut students = Vec::new();
    for row in table.rows() {
        let external_id = required(&row, id_column)?;
        let mut student = StudentRow::new(external_id, row.get(name_column).unwrap_or_default());
        student.cells = row
            .labelled()
            .filter(|(label, _)| *label != id_column && *label != name_column)
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect();
        students.push(student);
    }
    Ok(students)
}

/// Reads a schedule sheet. Topic, staff and room are optional, both as columns
/// and as cells; date and times are required.
pub fn schedule_rows(table: &Table, columns: &ScheduleColumns) -> Result<Vec<ScheduleRow>, TableError> {
    table.require_column(&columns.date)?;
    table.require_column(&columns.start_time)?;
    table.require_column(&columns.end_time)?;

    table
        .rows()
        .map(|row| -> Result<ScheduleRow, TableError> {
            let date = parse_cell(&row, &columns.date, parse_date)?;
            let start_time = parse_cell(&row, &columns.start_time, parse_time)?;
            let end_time = parse_cell(&row, &columns.end_time, parse_time)?;
            Ok(ScheduleRow {
                topic: row.non_blank(&columns.topic).map(str::to_string),
                staff: row.non_blank(&columns.staff).map(str::to_string),
                room: row.non_blank(&columns.room).map(str::to_string),
                date,
                start_time,
                end_time,
            })
        })
        .collect()
}

/// Reads a practical timetable: `key_column` names the practical, every other
/// column is a date whose cell names the scheduled group.
pub fn practical_schedule_rows(
    table: &Table,
    key_column: &str,
) -> Result<Vec<PracticalScheduleRow>, TableError> {
    table.require_column(key_column)?;

    table
        .rows()
        .map(|row| -> Result<PracticalScheduleRow, TableError> {
            let mut practical = PracticalScheduleRow::new(required(&row, key_column)?);
            practical.cells = row
                .labelled()
                .filter(|(label, _)| *label != key_column)
                .map(|(label, value)| (label.to_string(), value.to_string()))
                .collect();
            Ok(practical)
        })
        .collect()
}

/// Reads a two-column text map (for example practical -> assignment name).
/// Later rows overwrite earlier ones with the same key.
pub fn text_map(
    table: &Table,
    key_column: &str,
    value_column: &str,
) -> Result<HashMap<String, String>, TableError> {
    table.require_column(key_column)?;
    table.require_column(value_column)?;

    table
        .rows()
        .map(|row| -> Result<(String, String), TableError> {
            Ok((
                required(&row, key_column)?.to_string(),
                required(&row, value_column)?.to_string(),
            ))
        })
        .collect()
}

/// Reads a map from a text key to a numeric platform id (for example
/// assignment code -> assignment id).
pub fn id_map(
    table: &Table,
    key_column: &str,
    id_column: &str,
) -> Result<HashMap<String, u64>, TableError> {
    table.require_column(key_column)?;
    table.require_column(id_column)?;

    table
        .rows()
        .map(|row| -> Result<(String, u64), TableError> {
            let id = parse_cell(&row, id_column, |s| s.trim().parse::<u64>().ok())?;
            Ok((required(&row, key_column)?.to_string(), id))
        })
        .collect()
}

/// Reads a three-column sheet into a two-level index, for example
/// practical, group name and group id.
pub fn scoped_id_index(
    table: &Table,
    scope_column: &str,
    name_column: &str,
    id_column: &str,
) -> Result<GroupIndex<String>, TableError> {
    table.require_column(scope_column)?;
    table.require_column(name_column)?;
    table.require_column(id_column)?;

    let mut index = GroupIndex::new();
    for row in table.rows() {
        let id = parse_cell(&row, id_column, |s| s.trim().parse::<u64>().ok())?;
        index.insert(
            required(&row, scope_column)?.to_string(),
            required(&row, name_column)?,
            id,
        );
    }
    Ok(index)
}

fn required<'a>(row: &TableRow<'a>, column: &str) -> Result<&'a str, TableError> {
    row.non_blank(column).ok_or_else(|| TableError::InvalidCell {
        row: row.line(),
        column: column.to_string(),
        value: String::new(),
    })
}

fn parse_cell<T>(
    row: &TableRow<'_>,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, TableError> {
    let value = row.get(column).unwrap_or_default();
    parse(value).ok_or_else(|| TableError::InvalidCell {
        row: row.line(),
        column: column.to_string(),
        value: value.to_string(),
    })
}
