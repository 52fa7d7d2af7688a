//! Row model and primary key extraction

use crate::value::ColumnValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mapping from column name to value, in source column order.
pub type ColumnValues = IndexMap<String, ColumnValue>;

/// One materialized table row.
///
/// `pk_cols` names the primary-key columns in key order; every name in it
/// must also be a key of `columns`. Rows are immutable once built by the
/// data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub pk_cols: Vec<String>,
    pub columns: ColumnValues,
}

impl Row {
    pub fn new(pk_cols: Vec<String>, columns: ColumnValues) -> Self {
        Self { pk_cols, columns }
    }

    /// Extract the primary key values in `pk_cols` order.
    ///
    /// A key column missing from the value map yields `Null`, mirroring
    /// what the comparison would see for it.
    pub fn primary_key(&self) -> PrimaryKey {
        PrimaryKey(
            self.pk_cols
                .iter()
                .map(|cn| self.columns.get(cn).cloned().unwrap_or(ColumnValue::Null))
                .collect(),
        )
    }
}

/// Ordered primary-key values extracted from a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKey(pub Vec<ColumnValue>);

impl PrimaryKey {
    pub fn values(&self) -> &[ColumnValue] {
        &self.0
    }

    /// Structural lookup key: one normalized component per key column.
    ///
    /// Components stay separate so a value containing `_` cannot collide
    /// with a neighboring component the way a joined string would.
    pub fn lookup_key(&self) -> Vec<String> {
        self.0.iter().map(|v| v.format_plain()).collect()
    }
}

impl fmt::Display for PrimaryKey {
    /// Human-facing form, components joined with `_`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.format_plain()).collect();
        f.write_str(&parts.join("_"))
    }
}
