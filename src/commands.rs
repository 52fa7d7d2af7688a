//! Command execution: fetch both sides, compare, render

use crate::cli::{ChangesFor, Cli, DiffType, TableSpec};
use crate::compare::{compare_rows, DefaultRowComparator};
use crate::datasource::DataSource;
use crate::diff::TableDiff;
use crate::error::{Result, RowdiffError};
use crate::unified::{RenderConfig, UnifiedDiff};
use duckdb::Connection;
use log::{debug, info};

/// Run a comparison as described by the parsed command line.
pub fn execute(cli: &Cli) -> Result<()> {
    let spec = TableSpec::parse(&cli.table).map_err(RowdiffError::invalid_input)?;
    let difftype = DiffType::parse(&cli.difftype).map_err(RowdiffError::invalid_input)?;
    let changes_for = ChangesFor::parse(&cli.changes_for).map_err(RowdiffError::invalid_input)?;

    let conn1 = Connection::open(&cli.db1)?;
    let conn2 = Connection::open(&cli.db2)?;
    let source1 = DataSource::new(&conn1, &spec.table1)?;
    let source2 = DataSource::new(&conn2, &spec.table2)?;

    if source1.pk_cols() != source2.pk_cols() {
        return Err(RowdiffError::config(format!(
            "primary key columns differ between sides: {:?} vs {:?}",
            source1.pk_cols(),
            source2.pk_cols()
        )));
    }

    info!(
        "comparing '{}' in {} against '{}' in {}",
        spec.table1,
        cli.db1.display(),
        spec.table2,
        cli.db2.display()
    );
    let rows1 = source1.rows()?;
    let rows2 = source2.rows()?;
    debug!(
        "materialized {} rows on the first side, {} on the second",
        rows1.len(),
        rows2.len()
    );

    let comparator = DefaultRowComparator::new(cli.ignore.iter().cloned());
    let rows_diff = compare_rows(&rows1, &rows2, &comparator)?;
    debug!(
        "partition: {}",
        serde_json::json!({
            "rows1_only": rows_diff.rows1_only.len(),
            "rows2_only": rows_diff.rows2_only.len(),
            "diff_rows": rows_diff.diff_rows.len(),
        })
    );

    let diff = TableDiff::new(&spec.table1, &spec.table2, rows_diff);
    let changes_label = match changes_for {
        ChangesFor::Db1 => diff.table1.clone(),
        ChangesFor::Db2 => diff.table2.clone(),
    };

    match difftype {
        DiffType::Unified => {
            let config = RenderConfig {
                colorize: !cli.no_color,
                ..RenderConfig::default()
            };
            let stdout = std::io::stdout();
            let mut ud = UnifiedDiff::new(stdout.lock(), source1.columns().to_vec(), config);
            ud.write(&diff, &changes_label)?;
        }
        DiffType::Sql => {
            for stmt in diff.sql(&changes_label)? {
                println!("{};", stmt);
            }
        }
    }
    Ok(())
}
