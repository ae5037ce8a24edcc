//! Roster reconciliation between platform enrollments and a student sheet.
//!
//! This is part of the Functional Core - all functions are pure with no side effects.

use std::collections::HashSet;

use serde::Serialize;

use crate::course::{EnrollmentRecord, StudentRow};

/// Canonical string form of an identifier.
///
/// Sheets often store student numbers as floats (`40123456.0`) while the platform
/// returns strings, so integral numbers lose their fractional part and surrounding
/// whitespace is dropped.
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((whole, fraction)) = trimmed.split_once('.') {
        if !whole.is_empty()
            && whole.chars().all(|c| c.is_ascii_digit())
            && !fraction.is_empty()
            && fraction.chars().all(|c| c == '0')
        {
            return whole.to_string();
        }
    }
    trimmed.to_string()
}

/// Removes inactive enrollments and keeps one record per stable external id.
///
/// The first remaining occurrence of each id wins and input order is preserved.
/// Records without an external id are deduplicated by platform user id.
pub fn dedupe_roster(records: Vec<EnrollmentRecord>) -> Vec<EnrollmentRecord> {
    let mut seen_external: HashSet<String> = HashSet::new();
    let mut seen_users: HashSet<u64> = HashSet::new();
    records
        .into_iter()
        .filter(|record| !record.is_inactive())
        .filter(|record| match &record.stable_external_id {
            Some(id) => seen_external.insert(id.clone()),
            None => seen_users.insert(record.platform_user_id),
        })
        .collect()
}

/// A student named on one side of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
}

/// Students present on only one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterDiff {
    /// In the sheet but not enrolled on the platform.
    pub missing_from_platform: Vec<RosterEntry>,
    /// Enrolled on the platform but absent from the sheet. Enrollments with no
    /// external id are always listed here, with an empty id.
    pub missing_from_external: Vec<RosterEntry>,
}

impl RosterDiff {
    pub fn is_reconciled(&self) -> bool {
        self.missing_from_platform.is_empty() && self.missing_from_external.is_empty()
    }
}

/// Compares a roster against a student sheet by normalized external id.
///
/// Sheet rows repeated with the same id and name are reported once.
pub fn reconcile(roster: &[EnrollmentRecord], students: &[StudentRow]) -> RosterDiff {
    let platform_ids: HashSet<String> = roster
        .iter()
        .filter_map(|r| r.stable_external_id.as_deref())
        .map(normalize_identifier)
        .collect();
    let sheet_ids: HashSet<String> = students
        .iter()
        .map(|s| normalize_identifier(&s.external_id))
        .collect();

    let mut reported = HashSet::new();
    let missing_from_platform = students
        .iter()
        .map(|s| RosterEntry {
            id: normalize_identifier(&s.external_id),
            name: s.name.clone(),
        })
        .filter(|entry| !platform_ids.contains(&entry.id))
        .filter(|entry| reported.insert((entry.id.clone(), entry.name.clone())))
        .collect();

    let mut reported = HashSet::new();
    let missing_from_external = roster
        .iter()
        .map(|r| RosterEntry {
            id: r
                .stable_external_id
                .as_deref()
                .map(normalize_identifier)
                .unwrap_or_default(),
            name: r.sortable_name.clone(),
        })
        .filter(|entry| entry.id.is_empty() || !sheet_ids.contains(&entry.id))
        .filter(|entry| reported.insert((entry.id.clone(), entry.name.clone())))
        .collect();

    RosterDiff {
        missing_from_platform,
        missing_from_external,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::EnrollmentState;

    fn enrollment(user_id: u64, sis: &str, name: &str) -> EnrollmentRecord {
        EnrollmentRecord::new(user_id, sis, name).with_sortable_name(name)
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("40123456"), "40123456");
        assert_eq!(normalize_identifier("40123456.0"), "40123456");
        assert_eq!(normalize_identifier(" 40123456.00 "), "40123456");
        assert_eq!(normalize_identifier("4012.5"), "4012.5");
        assert_eq!(normalize_identifier("AB12.0"), "AB12.0");
    }

    #[test]
    fn test_dedupe_keeps_first_per_section() {
        let records = vec![
            enrollment(1, "100", "Ada").with_section(10),
            enrollment(2, "200", "Bob").with_section(10),
            enrollment(1, "100", "Ada").with_section(11),
            enrollment(1, "100", "Ada").with_section(12),
        ];

        let roster = dedupe_roster(records);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].course_section_id, Some(10));
        assert_eq!(roster[1].stable_external_id.as_deref(), Some("200"));
    }

    #[test]
    fn test_dedupe_prefers_non_inactive_duplicate() {
        let records = vec![
            enrollment(1, "100", "Ada")
                .with_section(10)
                .with_state(EnrollmentState::Inactive),
            enrollment(1, "100", "Ada").with_section(11),
        ];

        let roster = dedupe_roster(records);

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].course_section_id, Some(11));
        assert!(!roster[0].is_inactive());
    }

    #[test]
    fn test_reconcile_reports_both_sides() {
        let roster = vec![enrollment(1, "100", "Lovelace, Ada"), enrollment(2, "200", "Babbage, Charles")];
        let students = vec![StudentRow::new("100.0", "Ada"), StudentRow::new("300", "Grace")];

        let diff = reconcile(&roster, &students);

        assert!(!diff.is_reconciled());
        assert_eq!(
            diff.missing_from_platform,
            vec![RosterEntry {
                id: "300".to_string(),
                name: "Grace".to_string()
            }]
        );
        assert_eq!(
            diff.missing_from_external,
            vec![RosterEntry {
                id: "200".to_string(),
                name: "Babbage, Charles".to_string()
            }]
        );
    }

    #[test]
    fn test_reconcile_reports_enrollments_without_external_id() {
        let mut unidentified = enrollment(3, "", "Hopper, Grace");
        unidentified.stable_external_id = None;
        let roster = vec![enrollment(1, "100", "Lovelace, Ada"), unidentified];
        let students = vec![StudentRow::new("100", "Ada")];

        let diff = reconcile(&roster, &students);

        assert_eq!(
            diff.missing_from_external,
            vec![RosterEntry {
                id: String::new(),
                name: "Hopper, Grace".to_string()
            }]
        );
    }

    #[test]
    fn test_dedupe_keeps_distinct_students_without_external_id() {
        let mut first = enrollment(1, "", "Ada");
        first.stable_external_id = None;
        let mut second = enrollment(2, "", "Bob");
        second.stable_external_id = None;
        let repeat = first.clone().with_section(11);

        let roster = dedupe_roster(vec![first, second, repeat]);

        let users: Vec<u64> = roster.iter().map(|r| r.platform_user_id).collect();
        assert_eq!(users, vec![1, 2]);
    }

    #[test]
    fn test_reconcile_empty_when_sets_match() {
        let roster = vec![enrollment(1, "100", "Ada"), enrollment(2, "200", "Bob")];
        let students = vec![
            StudentRow::new("200", "Bob"),
            StudentRow::new("100", "Ada"),
            StudentRow::new("100", "Ada"),
        ];

        let diff = reconcile(&roster, &students);

        assert!(diff.is_reconciled());
    }

    #[test]
    fn test_reconcile_sides_are_disjoint() {
        let roster = vec![enrollment(1, "1", "A"), enrollment(2, "2", "B")];
        let students = vec![StudentRow::new("2", "B"), StudentRow::new("3", "C")];

        let diff = reconcile(&roster, &students);

        for entry in &diff.missing_from_platform {
            assert!(!diff.missing_from_external.iter().any(|e| e.id == entry.id));
        }
    }
}
