//! Human-oriented unified diff rendering

use crate::compare::RowDiff;
use crate::diff::{Direction, TableDiff};
use crate::error::{Result, RowdiffError};
use crate::row::Row;
use crate::value::{ColumnValue, DEFAULT_DATETIME_PATTERN};
use chrono::{FixedOffset, Local};
use colored::{Color, Colorize};
use std::io::Write;

const COLOR_ADDED: Color = Color::BrightGreen;
const COLOR_DELETED: Color = Color::Red;

/// Presentation options for the unified renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Zone timestamps are converted to before display.
    pub timezone: FixedOffset,
    /// ANSI coloring; semantic content is identical either way.
    pub colorize: bool,
    /// chrono format string for timestamps.
    pub datetime_pattern: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timezone: *Local::now().offset(),
            colorize: true,
            datetime_pattern: DEFAULT_DATETIME_PATTERN.to_string(),
        }
    }
}

impl RenderConfig {
    fn render_value(&self, v: &ColumnValue) -> String {
        match v {
            ColumnValue::Timestamp(ts) => ts
                .with_timezone(&self.timezone)
                .format(&self.datetime_pattern)
                .to_string(),
            other => other.format_plain(),
        }
    }
}

/// Renders a [`TableDiff`] as colorized, human-oriented text: updated rows
/// first, then added, then deleted, each section closed by a count line.
pub struct UnifiedDiff<W: Write> {
    writer: W,
    cols: Vec<String>,
    config: RenderConfig,
}

impl<W: Write> UnifiedDiff<W> {
    /// `cols` is the display order; it is independent of the rows' own
    /// column order.
    pub fn new(writer: W, cols: Vec<String>, config: RenderConfig) -> Self {
        Self {
            writer,
            cols,
            config,
        }
    }

    /// Render the whole diff for the side `changes_for` points at.
    ///
    /// Output is not atomic: a lookup failure partway through leaves the
    /// already-rendered text on the writer.
    pub fn write(&mut self, diff: &TableDiff, changes_for: &str) -> Result<()> {
        let dir = diff.direction(changes_for)?;

        let header = self.paint(format!("--- {}", dir.before), COLOR_DELETED);
        writeln!(self.writer, "{}", header)?;
        let header = self.paint(format!("+++ {}", dir.after), COLOR_ADDED);
        writeln!(self.writer, "{}", header)?;

        if !diff.has_diff() {
            write!(self.writer, "No diff found\n\n")?;
            return Ok(());
        }

        self.write_updated(&dir, &diff.rows_diff.diff_rows)?;
        self.write_added(dir.added)?;
        self.write_deleted(dir.deleted)?;
        Ok(())
    }

    fn write_updated(&mut self, dir: &Direction<'_>, rows: &[RowDiff]) -> Result<()> {
        let width = column_width(&self.cols);
        for (i, rd) in rows.iter().enumerate() {
            self.banner(i)?;
            let before_row = dir.before_row(rd);
            let after_row = dir.after_row(rd);
            for cn in &self.cols {
                let v1 = before_row.columns.get(cn).ok_or_else(|| {
                    RowdiffError::lookup(format!("column '{}' not found on changed row", cn))
                })?;
                // Primary-key columns print once, unprefixed; the value is
                // the same on both sides by construction.
                if rd.row1.pk_cols.iter().any(|pk| pk == cn) {
                    let rendered = self.config.render_value(v1);
                    writeln!(self.writer, "  {:>w$.w$}: {}", cn, rendered, w = width)?;
                    continue;
                }
                let v2 = after_row.columns.get(cn).ok_or_else(|| {
                    RowdiffError::lookup(format!(
                        "column '{}' exists on '{}' but not on '{}'",
                        cn, dir.before, dir.after
                    ))
                })?;
                let rendered = self.config.render_value(v1);
                let line = self.paint(
                    format!("- {:>w$.w$}: {}", cn, rendered, w = width),
                    COLOR_DELETED,
                );
                writeln!(self.writer, "{}", line)?;
                let rendered = self.config.render_value(v2);
                let line = self.paint(
                    format!("+ {:>w$.w$}: {}", cn, rendered, w = width),
                    COLOR_ADDED,
                );
                writeln!(self.writer, "{}", line)?;
            }
        }
        write!(self.writer, "\n {} rows updated\n\n", rows.len())?;
        Ok(())
    }

    fn write_added(&mut self, rows: &[Row]) -> Result<()> {
        let width = column_width(&self.cols);
        for (i, row) in rows.iter().enumerate() {
            self.banner(i)?;
            for cn in &self.cols {
                let rendered = match row.columns.get(cn) {
                    Some(v) => self.config.render_value(v),
                    None => ColumnValue::Null.format_plain(),
                };
                let line = self.paint(
                    format!("+ {:>w$.w$}: {}", cn, rendered, w = width),
                    COLOR_ADDED,
                );
                writeln!(self.writer, "{}", line)?;
            }
        }
        write!(self.writer, "\n {} rows added\n\n", rows.len())?;
        Ok(())
    }

    fn write_deleted(&mut self, rows: &[Row]) -> Result<()> {
        let width = column_width(&self.cols);
        for (i, row) in rows.iter().enumerate() {
            self.banner(i)?;
            for cn in &self.cols {
                let rendered = match row.columns.get(cn) {
                    Some(v) => self.config.render_value(v),
                    None => ColumnValue::Null.format_plain(),
                };
                let line = self.paint(
                    format!("- {:>w$.w$}: {}", cn, rendered, w = width),
                    COLOR_DELETED,
                );
                writeln!(self.writer, "{}", line)?;
            }
        }
        write!(self.writer, "\n {} rows deleted\n\n", rows.len())?;
        Ok(())
    }

    fn banner(&mut self, index: usize) -> Result<()> {
        writeln!(
            self.writer,
            " ************************* {:>5}. row *************************",
            index
        )?;
        Ok(())
    }

    fn paint(&self, line: String, color: Color) -> String {
        if self.config.colorize {
            line.color(color).to_string()
        } else {
            line
        }
    }
}

fn column_width(cols: &[String]) -> usize {
    cols.iter().map(|c| c.len()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare_rows, DefaultRowComparator, RowsDiff};
    use crate::row::ColumnValues;
    use chrono::DateTime;

    fn plain_config() -> RenderConfig {
        RenderConfig {
            timezone: FixedOffset::east_opt(0).unwrap(),
            colorize: false,
            datetime_pattern: DEFAULT_DATETIME_PATTERN.to_string(),
        }
    }

    fn make_row(pk_cols: &[&str], values: &[(&str, ColumnValue)]) -> Row {
        Row::new(
            pk_cols.iter().map(|s| s.to_string()).collect(),
            values
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect::<ColumnValues>(),
        )
    }

    fn text(s: &str) -> ColumnValue {
        ColumnValue::Text(s.to_string())
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn render(diff: &TableDiff, display_cols: &[&str], changes_for: &str) -> Result<String> {
        let mut buf = Vec::new();
        let mut ud = UnifiedDiff::new(&mut buf, cols(display_cols), plain_config());
        ud.write(diff, changes_for)?;
        drop(ud);
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_write_no_diff() {
        let td = TableDiff::new("rows1", "rows2", RowsDiff::default());
        let out = render(&td, &["id"], "rows1").unwrap();
        assert_eq!(out, "--- rows1\n+++ rows2\nNo diff found\n\n");
    }

    #[test]
    fn test_write_updated_rows() {
        let pk = ["id1", "id2"];
        let rows1 = vec![make_row(
            &pk,
            &[("id1", text("a1")), ("id2", text("a2")), ("name", text("name-before"))],
        )];
        let rows2 = vec![make_row(
            &pk,
            &[("id1", text("a1")), ("id2", text("a2")), ("name", text("name-after"))],
        )];
        let rows_diff = compare_rows(&rows1, &rows2, &DefaultRowComparator::default()).unwrap();
        let td = TableDiff::new("rows1", "rows2", rows_diff);

        let out = render(&td, &["id1", "id2", "name"], "rows1").unwrap();
        let expected = "\
--- rows1\n\
+++ rows2\n \
*************************     0. row *************************\n   \
id1: a1\n   \
id2: a2\n\
- name: name-before\n\
+ name: name-after\n\
\n 1 rows updated\n\n\
\n 0 rows added\n\n\
\n 0 rows deleted\n\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_added_and_deleted_rows() {
        let rows1 = vec![make_row(&["id"], &[("id", text("only1")), ("name", text("n1"))])];
        let rows2 = vec![make_row(&["id"], &[("id", text("only2")), ("name", text("n2"))])];
        let rows_diff = compare_rows(&rows1, &rows2, &DefaultRowComparator::default()).unwrap();
        let td = TableDiff::new("rows1", "rows2", rows_diff);

        let out = render(&td, &["id", "name"], "rows1").unwrap();
        let expected = "\
--- rows1\n\
+++ rows2\n\
\n 0 rows updated\n\n \
*************************     0. row *************************\n\
+   id: only2\n\
+ name: n2\n\
\n 1 rows added\n\n \
*************************     0. row *************************\n\
-   id: only1\n\
- name: n1\n\
\n 1 rows deleted\n\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_symmetry_on_flipped_direction() {
        let rows1 = vec![make_row(&["id"], &[("id", text("only1")), ("name", text("n1"))])];
        let rows2 = vec![make_row(&["id"], &[("id", text("only2")), ("name", text("n2"))])];
        let rows_diff = compare_rows(&rows1, &rows2, &DefaultRowComparator::default()).unwrap();
        let td = TableDiff::new("rows1", "rows2", rows_diff);

        let out = render(&td, &["id", "name"], "rows2").unwrap();
        let expected = "\
--- rows2\n\
+++ rows1\n\
\n 0 rows updated\n\n \
*************************     0. row *************************\n\
+   id: only1\n\
+ name: n1\n\
\n 1 rows added\n\n \
*************************     0. row *************************\n\
-   id: only2\n\
- name: n2\n\
\n 1 rows deleted\n\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_updated_fails_when_column_missing_from_after_side() {
        // One-sided column: present on the before side only.
        let rows1 = vec![make_row(&["id"], &[("id", text("a")), ("extra", text("x"))])];
        let rows2 = vec![make_row(&["id"], &[("id", text("a"))])];
        let rows_diff = compare_rows(&rows1, &rows2, &DefaultRowComparator::default()).unwrap();
        let td = TableDiff::new("rows1", "rows2", rows_diff);

        let err = render(&td, &["id", "extra"], "rows1").unwrap_err();
        assert!(matches!(err, RowdiffError::Lookup { .. }));
    }

    #[test]
    fn test_write_updated_fails_when_display_column_not_in_projection() {
        // "name" did not change, so the sparse projection omits it.
        let rows1 = vec![make_row(
            &["id"],
            &[("id", text("a")), ("name", text("same")), ("age", ColumnValue::Int(1))],
        )];
        let rows2 = vec![make_row(
            &["id"],
            &[("id", text("a")), ("name", text("same")), ("age", ColumnValue::Int(2))],
        )];
        let rows_diff = compare_rows(&rows1, &rows2, &DefaultRowComparator::default()).unwrap();
        let td = TableDiff::new("rows1", "rows2", rows_diff);

        let err = render(&td, &["id", "name", "age"], "rows1").unwrap_err();
        assert!(matches!(err, RowdiffError::Lookup { .. }));
    }

    #[test]
    fn test_timestamps_render_in_configured_zone() {
        let ts = DateTime::parse_from_rfc3339("2006-01-02T15:04:05+09:00").unwrap();
        let rows1: Vec<Row> = Vec::new();
        let rows2 = vec![make_row(
            &["id"],
            &[("id", text("a")), ("created_at", ColumnValue::Timestamp(ts))],
        )];
        let rows_diff = compare_rows(&rows1, &rows2, &DefaultRowComparator::default()).unwrap();
        let td = TableDiff::new("rows1", "rows2", rows_diff);

        let out = render(&td, &["id", "created_at"], "rows1").unwrap();
        assert!(out.contains("+ created_at: 2006-01-02 06:04:05.000000+00:00"));
    }

    #[test]
    fn test_missing_display_column_on_added_row_renders_null() {
        let rows1: Vec<Row> = Vec::new();
        let rows2 = vec![make_row(&["id"], &[("id", text("a"))])];
        let rows_diff = compare_rows(&rows1, &rows2, &DefaultRowComparator::default()).unwrap();
        let td = TableDiff::new("rows1", "rows2", rows_diff);

        let out = render(&td, &["id", "age"], "rows1").unwrap();
        assert!(out.contains("+ age: <NULL>"));
    }

    #[test]
    fn test_colorized_output_wraps_semantic_content() {
        let td = TableDiff::new("rows1", "rows2", RowsDiff::default());
        let mut buf = Vec::new();
        let config = RenderConfig {
            colorize: true,
            ..plain_config()
        };
        colored::control::set_override(true);
        let mut ud = UnifiedDiff::new(&mut buf, cols(&["id"]), config);
        ud.write(&td, "rows1").unwrap();
        drop(ud);
        colored::control::unset_override();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("--- rows1"));
        assert!(out.contains("\x1b["));
    }
}
