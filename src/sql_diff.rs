//! SQL statement generation from a table diff

use crate::diff::TableDiff;
use crate::error::Result;
use crate::row::Row;
use crate::value::ColumnValue;
use chrono::SecondsFormat;

impl TableDiff {
    /// Generate the INSERT/UPDATE/DELETE statements that reconcile the
    /// side `changes_for` points at. Statements always reference the first
    /// side's table label.
    pub fn sql(&self, changes_for: &str) -> Result<Vec<String>> {
        let dir = self.direction(changes_for)?;
        let update_rows: Vec<&Row> = self
            .rows_diff
            .diff_rows
            .iter()
            .map(|rd| dir.after_row(rd))
            .collect();

        let mut stmts = Vec::new();
        stmts.extend(insert_sql(&self.table1, dir.added));
        stmts.extend(update_sql(&self.table1, &update_rows));
        stmts.extend(delete_sql(&self.table1, dir.deleted));
        Ok(stmts)
    }
}

/// One multi-row INSERT per batch. The column list comes from the first
/// row, sorted by name; every row is rendered positionally against that
/// list, a missing column becoming NULL.
fn insert_sql(table: &str, rows: &[Row]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut cols: Vec<&String> = first.columns.keys().collect();
    cols.sort();
    let qcols = cols
        .iter()
        .map(|cn| format!("`{}`", cn))
        .collect::<Vec<_>>()
        .join(",");

    let mut vals = Vec::with_capacity(rows.len());
    for row in rows {
        let rendered = cols
            .iter()
            .map(|cn| literal_opt(row.columns.get(*cn)))
            .collect::<Vec<_>>()
            .join(",");
        vals.push(format!("({})", rendered));
    }
    vec![format!(
        "INSERT INTO `{}` ({}) VALUES {}",
        table,
        qcols,
        vals.join(",")
    )]
}

/// One UPDATE per changed row; the SET list excludes primary-key columns
/// and follows the projection's own column order.
fn update_sql(table: &str, rows: &[&Row]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let sets = row
                .columns
                .iter()
                .filter(|(cn, _)| !row.pk_cols.contains(*cn))
                .map(|(cn, cv)| format!("`{}` = {}", cn, literal(cv)))
                .collect::<Vec<_>>()
                .join(",");
            format!(
                "UPDATE `{}` SET {} WHERE {}",
                table,
                sets,
                pk_predicate(row)
            )
        })
        .collect()
}

/// One DELETE per removed row, keyed on the primary-key columns.
fn delete_sql(table: &str, rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| format!("DELETE FROM `{}` WHERE {}", table, pk_predicate(row)))
        .collect()
}

fn pk_predicate(row: &Row) -> String {
    row.pk_cols
        .iter()
        .map(|pk| format!("`{}` = {}", pk, literal_opt(row.columns.get(pk))))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// SQL literal form of a value. Text is single-quoted; embedded quote
/// characters are not escaped.
fn literal(v: &ColumnValue) -> String {
    match v {
        ColumnValue::Null => "NULL".to_string(),
        ColumnValue::Int(v) => v.to_string(),
        ColumnValue::Uint(v) => v.to_string(),
        ColumnValue::Float(v) => format!("{:.6}", v),
        ColumnValue::Text(s) => format!("'{}'", s),
        ColumnValue::Timestamp(ts) => {
            format!("'{}'", ts.to_rfc3339_opts(SecondsFormat::AutoSi, false))
        }
        ColumnValue::Bool(b) => b.to_string(),
        ColumnValue::Other(s) => s.clone(),
    }
}

fn literal_opt(v: Option<&ColumnValue>) -> String {
    match v {
        Some(v) => literal(v),
        None => "NULL".to_string(),
    }
}
