use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

use crate::error::SegmentResult;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> SegmentResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "csv written");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> SegmentResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    debug!(path = %path.display(), "json written");
    Ok(())
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

/// Print a titled markdown preview of the first `max_rows` rows and where
/// the full table was written.
pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize, path: &Path)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
    println!("(Full table exported to {})\n", path.display());
}
