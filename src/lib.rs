//! # rowdiff
//!
//! A keyed row-level diff for relational table snapshots: two materialized
//! row sets are reconciled by primary key, and the result is rendered as a
//! human-readable unified diff or as the SQL statements that bring one
//! side in line with the other.

pub mod cli;
pub mod commands;
pub mod compare;
pub mod datasource;
pub mod diff;
pub mod error;
pub mod row;
pub mod sql_diff;
pub mod unified;
pub mod value;

pub use compare::{compare_rows, DefaultRowComparator, RowComparator, RowDiff, RowsDiff};
pub use diff::TableDiff;
pub use error::{Result, RowdiffError};
pub use row::{ColumnValues, PrimaryKey, Row};
pub use value::ColumnValue;
