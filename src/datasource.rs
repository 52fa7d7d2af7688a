//! DuckDB-backed row materialization

use crate::error::{Result, RowdiffError};
use crate::row::{ColumnValues, Row};
use crate::value::ColumnValue;
use chrono::DateTime;
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection;

/// One side of a comparison: a table within an open DuckDB database.
///
/// Primary-key columns and display order are resolved from
/// `pragma_table_info` when the source is created; `rows` materializes
/// the full snapshot in one pass.
pub struct DataSource<'a> {
    conn: &'a Connection,
    table: String,
    columns: Vec<String>,
    pk_cols: Vec<String>,
}

impl<'a> DataSource<'a> {
    pub fn new(conn: &'a Connection, table: &str) -> Result<Self> {
        let mut stmt = conn.prepare(&format!(
            "SELECT name, pk FROM pragma_table_info('{}')",
            table
        ))?;
        let infos = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, duckdb::Error>>()?;

        if infos.is_empty() {
            return Err(RowdiffError::invalid_input(format!(
                "table '{}' not found or has no columns",
                table
            )));
        }
        let columns: Vec<String> = infos.iter().map(|(name, _)| name.clone()).collect();
        // Composite keys come back in table column order.
        let pk_cols: Vec<String> = infos
            .iter()
            .filter(|(_, pk)| *pk)
            .map(|(name, _)| name.clone())
            .collect();
        if pk_cols.is_empty() {
            return Err(RowdiffError::config(format!(
                "table '{}' has no primary key; its rows cannot be keyed",
                table
            )));
        }

        Ok(Self {
            conn,
            table: table.to_string(),
            columns,
            pk_cols,
        })
    }

    /// Column names in table order, used as the display order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn pk_cols(&self) -> &[String] {
        &self.pk_cols
    }

    /// Materialize the full table snapshot.
    pub fn rows(&self) -> Result<Vec<Row>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM \"{}\"", self.table))?;
        let rows = stmt.query_map([], |row| {
            let mut columns = ColumnValues::with_capacity(self.columns.len());
            for (idx, name) in self.columns.iter().enumerate() {
                columns.insert(name.clone(), map_value(row.get_ref(idx)?));
            }
            Ok(Row::new(self.pk_cols.clone(), columns))
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn map_value(value: ValueRef<'_>) -> ColumnValue {
    match value {
        ValueRef::Null => ColumnValue::Null,
        ValueRef::Boolean(b) => ColumnValue::Bool(b),
        ValueRef::TinyInt(v) => ColumnValue::Int(v as i64),
        ValueRef::SmallInt(v) => ColumnValue::Int(v as i64),
        ValueRef::Int(v) => ColumnValue::Int(v as i64),
        ValueRef::BigInt(v) => ColumnValue::Int(v),
        ValueRef::HugeInt(v) => ColumnValue::Other(v.to_string()),
        ValueRef::UTinyInt(v) => ColumnValue::Uint(v as u64),
        ValueRef::USmallInt(v) => ColumnValue::Uint(v as u64),
        ValueRef::UInt(v) => ColumnValue::Uint(v as u64),
        ValueRef::UBigInt(v) => ColumnValue::Uint(v),
        ValueRef::Float(v) => ColumnValue::Float(v as f64),
        ValueRef::Double(v) => ColumnValue::Float(v),
        ValueRef::Decimal(d) => ColumnValue::Other(d.to_string()),
        ValueRef::Timestamp(unit, raw) => timestamp_value(unit, raw),
        ValueRef::Text(bytes) => ColumnValue::Text(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Blob(bytes) => ColumnValue::Other(hex_string(bytes)),
        ValueRef::Date32(days) => match DateTime::from_timestamp(i64::from(days) * 86_400, 0) {
            Some(ts) => ColumnValue::Other(ts.date_naive().to_string()),
            None => ColumnValue::Other(days.to_string()),
        },
        other => ColumnValue::Other(format!("{:?}", other)),
    }
}

/// Timestamps come back as a raw count in one of four units; everything is
/// normalized to microseconds in UTC.
fn timestamp_value(unit: TimeUnit, raw: i64) -> ColumnValue {
    let micros = match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    };
    match DateTime::from_timestamp_micros(micros) {
        Some(ts) => ColumnValue::Timestamp(ts.fixed_offset()),
        None => ColumnValue::Other(format!("{} {:?}", raw, unit)),
    }
}

fn hex_string(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{:02x}", b);
    }
    s
}
