//! Command-line interface for rowdiff

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rowdiff")]
#[command(about = "A keyed row-level diff tool for relational table snapshots")]
#[command(version)]
pub struct Cli {
    /// Table to compare: NAME, or NAME1:NAME2 when the sides are named differently
    pub table: String,

    /// DuckDB database file holding the first snapshot
    #[arg(long)]
    pub db1: PathBuf,

    /// DuckDB database file holding the second snapshot
    #[arg(long)]
    pub db2: PathBuf,

    /// Which side the rendered changes are for: "db1" or "db2"
    #[arg(long, default_value = "db1")]
    pub changes_for: String,

    /// How to display the diff: "unified" or "sql"
    #[arg(long, default_value = "unified")]
    pub difftype: String,

    /// Column name to exclude from comparison (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Disable ANSI colors in unified output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse diff output type
#[derive(Debug, Clone)]
pub enum DiffType {
    Unified,
    Sql,
}

impl DiffType {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "unified" => Ok(Self::Unified),
            "sql" => Ok(Self::Sql),
            _ => Err(format!("Invalid diff type: {}. Use 'unified' or 'sql'", s)),
        }
    }
}

/// Which database the `--changes-for` flag points at
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangesFor {
    Db1,
    Db2,
}

impl ChangesFor {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "db1" => Ok(Self::Db1),
            "db2" => Ok(Self::Db2),
            _ => Err(format!("Invalid changes-for value: {}. Use 'db1' or 'db2'", s)),
        }
    }
}

/// Table argument: one shared name, or `first:second`
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub table1: String,
    pub table2: String,
}

impl TableSpec {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.split_once(':') {
            Some((t1, t2)) if !t1.is_empty() && !t2.is_empty() => Ok(Self {
                table1: t1.to_string(),
                table2: t2.to_string(),
            }),
            Some(_) => Err(format!(
                "Invalid table spec: '{}'. Use NAME or NAME1:NAME2",
                s
            )),
            None if !s.is_empty() => Ok(Self {
                table1: s.to_string(),
                table2: s.to_string(),
            }),
            None => Err("Table name must not be empty".to_string()),
        }
    }
}
