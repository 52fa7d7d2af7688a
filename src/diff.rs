//! Table-level diff and the shared rendering direction

use crate::compare::{RowDiff, RowsDiff};
use crate::error::{Result, RowdiffError};
use crate::row::Row;
use serde::{Deserialize, Serialize};

/// Differences between two snapshots of one table, with a label per side.
///
/// Constructed once per comparison run and consumed by a single renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDiff {
    pub table1: String,
    pub table2: String,
    pub rows_diff: RowsDiff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    First,
    Second,
}

/// Resolved rendering direction: which label is "before", which one-sided
/// buckets count as added or deleted, and which projection of a changed
/// row is the "after" state. All three invert together.
pub struct Direction<'a> {
    pub before: &'a str,
    pub after: &'a str,
    pub added: &'a [Row],
    pub deleted: &'a [Row],
    after_side: Side,
}

impl<'a> Direction<'a> {
    pub fn before_row(&self, rd: &'a RowDiff) -> &'a Row {
        match self.after_side {
            Side::Second => &rd.row1,
            Side::First => &rd.row2,
        }
    }

    pub fn after_row(&self, rd: &'a RowDiff) -> &'a Row {
        match self.after_side {
            Side::Second => &rd.row2,
            Side::First => &rd.row1,
        }
    }
}

impl TableDiff {
    pub fn new(table1: impl Into<String>, table2: impl Into<String>, rows_diff: RowsDiff) -> Self {
        Self {
            table1: table1.into(),
            table2: table2.into(),
            rows_diff,
        }
    }

    pub fn has_diff(&self) -> bool {
        self.rows_diff.has_diff()
    }

    /// Resolve which side `changes_for` points at.
    ///
    /// `changes_for` must equal one of the two registered labels. Both
    /// renderers go through this single resolution.
    pub fn direction(&self, changes_for: &str) -> Result<Direction<'_>> {
        if changes_for == self.table1 {
            Ok(Direction {
                before: &self.table1,
                after: &self.table2,
                added: &self.rows_diff.rows2_only,
                deleted: &self.rows_diff.rows1_only,
                after_side: Side::Second,
            })
        } else if changes_for == self.table2 {
            Ok(Direction {
                before: &self.table2,
                after: &self.table1,
                added: &self.rows_diff.rows1_only,
                deleted: &self.rows_diff.rows2_only,
                after_side: Side::First,
            })
        } else {
            Err(RowdiffError::config(format!(
                "changes_for must be '{}' or '{}'",
                self.table1, self.table2
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare_rows, DefaultRowComparator};
    use crate::row::ColumnValues;
    use crate::value::ColumnValue;

    fn make_row(pk_cols: &[&str], values: &[(&str, &str)]) -> Row {
        Row::new(
            pk_cols.iter().map(|s| s.to_string()).collect(),
            values
                .iter()
                .map(|(n, v)| (n.to_string(), ColumnValue::Text(v.to_string())))
                .collect::<ColumnValues>(),
        )
    }

    fn sample_diff() -> TableDiff {
        let rows1 = vec![
            make_row(&["id"], &[("id", "only1")]),
            make_row(&["id"], &[("id", "both"), ("name", "na")]),
        ];
        let rows2 = vec![
            make_row(&["id"], &[("id", "only2")]),
            make_row(&["id"], &[("id", "both"), ("name", "nb")]),
        ];
        let rows_diff = compare_rows(&rows1, &rows2, &DefaultRowComparator::default()).unwrap();
        TableDiff::new("t1", "t2", rows_diff)
    }

    #[test]
    fn test_direction_for_first_label() {
        let td = sample_diff();
        let dir = td.direction("t1").unwrap();
        assert_eq!(dir.before, "t1");
        assert_eq!(dir.after, "t2");
        assert_eq!(dir.added[0].columns.get("id").unwrap().format_plain(), "only2");
        assert_eq!(dir.deleted[0].columns.get("id").unwrap().format_plain(), "only1");
        let rd = &td.rows_diff.diff_rows[0];
        assert_eq!(dir.after_row(rd).columns.get("name").unwrap().format_plain(), "nb");
        assert_eq!(dir.before_row(rd).columns.get("name").unwrap().format_plain(), "na");
    }

    #[test]
    fn test_direction_for_second_label_swaps_all_roles() {
        let td = sample_diff();
        let dir = td.direction("t2").unwrap();
        assert_eq!(dir.before, "t2");
        assert_eq!(dir.after, "t1");
        assert_eq!(dir.added[0].columns.get("id").unwrap().format_plain(), "only1");
        assert_eq!(dir.deleted[0].columns.get("id").unwrap().format_plain(), "only2");
        let rd = &td.rows_diff.diff_rows[0];
        assert_eq!(dir.after_row(rd).columns.get("name").unwrap().format_plain(), "na");
        assert_eq!(dir.before_row(rd).columns.get("name").unwrap().format_plain(), "nb");
    }

    #[test]
    fn test_direction_rejects_unknown_label() {
        let td = sample_diff();
        let err = td.direction("elsewhere").unwrap_err();
        assert!(err.to_string().contains("'t1'"));
        assert!(err.to_string().contains("'t2'"));
    }
}
