//! Row comparison and keyed set reconciliation

use crate::error::{Result, RowdiffError};
use crate::row::{ColumnValues, PrimaryKey, Row};
use crate::value::ColumnValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pluggable per-row value-equality policy.
pub trait RowComparator {
    /// Compare a pair of rows sharing a primary key.
    ///
    /// Returns `None` when nothing beyond the primary key differs. Fails
    /// when the two rows disagree on primary-key shape, which is a
    /// configuration defect rather than a data defect.
    fn compare(&self, row1: &Row, row2: &Row) -> Result<Option<RowDiff>>;
}

/// Default policy: values are equal when their generic textual
/// representations are equal.
///
/// Comparing as text means values of different types that format the same
/// compare equal. That is a deliberate simplification; a caller needing
/// type-exact comparison supplies its own [`RowComparator`].
pub struct DefaultRowComparator {
    ignore_columns: HashSet<String>,
}

impl DefaultRowComparator {
    pub fn new<I>(ignore_columns: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            ignore_columns: ignore_columns.into_iter().collect(),
        }
    }

    fn values_equal(&self, v1: &ColumnValue, v2: &ColumnValue) -> bool {
        v1.format_plain() == v2.format_plain()
    }
}

impl Default for DefaultRowComparator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RowComparator for DefaultRowComparator {
    fn compare(&self, row1: &Row, row2: &Row) -> Result<Option<RowDiff>> {
        if row1.pk_cols != row2.pk_cols {
            return Err(RowdiffError::config(
                "the primary key columns of a compared pair of rows must be the same",
            ));
        }

        let mut cols1 = ColumnValues::new();
        let mut cols2 = ColumnValues::new();

        // Primary-key columns are always part of both projections.
        for pk_col in &row1.pk_cols {
            if let Some(v) = row1.columns.get(pk_col) {
                cols1.insert(pk_col.clone(), v.clone());
            }
            if let Some(v) = row2.columns.get(pk_col) {
                cols2.insert(pk_col.clone(), v.clone());
            }
        }

        // The scan is driven by row1's columns; columns unique to row2 are
        // never inspected.
        for (name, v1) in &row1.columns {
            if row1.pk_cols.contains(name) || self.ignore_columns.contains(name) {
                continue;
            }
            match row2.columns.get(name) {
                // One-sided: row1 keeps the value, row2 goes without it.
                None => {
                    cols1.insert(name.clone(), v1.clone());
                }
                Some(v2) if !self.values_equal(v1, v2) => {
                    cols1.insert(name.clone(), v1.clone());
                    cols2.insert(name.clone(), v2.clone());
                }
                Some(_) => {}
            }
        }

        if cols1.len() <= row1.pk_cols.len() && cols2.len() <= row2.pk_cols.len() {
            return Ok(None);
        }
        Ok(Some(RowDiff {
            primary_key: row1.primary_key(),
            row1: Row::new(row1.pk_cols.clone(), cols1),
            row2: Row::new(row1.pk_cols.clone(), cols2),
        }))
    }
}

/// A changed row pair: the shared primary key plus two sparse projections
/// holding only the key columns and the columns whose values differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDiff {
    pub primary_key: PrimaryKey,
    pub row1: Row,
    pub row2: Row,
}

/// Three-way partition of two row collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowsDiff {
    pub rows1_only: Vec<Row>,
    pub rows2_only: Vec<Row>,
    pub diff_rows: Vec<RowDiff>,
}

impl RowsDiff {
    pub fn has_diff(&self) -> bool {
        !self.rows1_only.is_empty() || !self.rows2_only.is_empty() || !self.diff_rows.is_empty()
    }
}

/// Reconcile two row collections keyed by primary key.
///
/// Rows whose key has no counterpart on the other side land in the
/// one-sided buckets; rows present on both sides go through the
/// comparator, and the first comparator error aborts the whole operation
/// with no partial result. A duplicate key within one side resolves
/// last-write-wins in input order.
pub fn compare_rows(
    rows1: &[Row],
    rows2: &[Row],
    comparator: &dyn RowComparator,
) -> Result<RowsDiff> {
    let map1 = rows_by_key(rows1);
    let map2 = rows_by_key(rows2);

    let mut diff = RowsDiff::default();
    for (key, row1) in &map1 {
        match map2.get(key) {
            None => diff.rows1_only.push((*row1).clone()),
            Some(row2) => {
                if let Some(rd) = comparator.compare(row1, row2)? {
                    diff.diff_rows.push(rd);
                }
            }
        }
    }
    for (key, row2) in &map2 {
        if !map1.contains_key(key) {
            diff.rows2_only.push((*row2).clone());
        }
    }
    Ok(diff)
}

fn rows_by_key(rows: &[Row]) -> IndexMap<Vec<String>, &Row> {
    let mut map = IndexMap::with_capacity(rows.len());
    for row in rows {
        map.insert(row.primary_key().lookup_key(), row);
    }
    map
}
