use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One session from a schedule sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub topic: Option<String>,
    pub staff: Option<String>,
    pub room: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ScheduleRow {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            topic: None,
            staff: None,
            room: None,
            date,
            start_time,
            end_time,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_staff(mut self, staff: impl Into<String>) -> Self {
        self.staff = Some(staff.into());
        self
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }
}

/// A wide student row: identity columns followed by labelled cells.
///
/// Cells keep sheet order. Depending on the sheet, a label is a group set name
/// (cell = group name) or a due date (cell = assignment code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRow {
    pub external_id: String,
    pub name: String,
    pub cells: Vec<(String, String)>,
}

impl StudentRow {
    pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            name: name.into(),
            cells: Vec::new(),
        }
    }

    pub fn with_cell(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.push((label.into(), value.into()));
        self
    }

    /// Value of the first cell with this label.
    pub fn cell(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// A practical timetable row: the practical name followed by one cell per date,
/// each naming the group scheduled on that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticalScheduleRow {
    pub practical: String,
    pub cells: Vec<(String, String)>,
}

impl PracticalScheduleRow {
    pub fn new(practical: impl Into<String>) -> Self {
        Self {
            practical: practical.into(),
            cells: Vec::new(),
        }
    }

    pub fn with_cell(mut self, date_label: impl Into<String>, group: impl Into<String>) -> Self {
        self.cells.push((date_label.into(), group.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_row_combines_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let row = ScheduleRow::new(
            date,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
        );
        assert_eq!(row.start(), date.and_hms_opt(10, 0, 0).unwrap());
        assert_eq!(row.end(), date.and_hms_opt(11, 30, 0).unwrap());
    }

    #[test]
    fn test_student_row_cell_lookup() {
        let row = StudentRow::new("4001", "Ada")
            .with_cell("Labs", "Lab A")
            .with_cell("Tutorials", "T3");
        assert_eq!(row.cell("Tutorials"), Some("T3"));
        assert_eq!(row.cell("Workshops"), None);
    }
}
