use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows, or `(no rows)`.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_table(rows, max_rows));
}

/// Write `rows` as CSV to `path` and print a short preview.
pub fn publish<T>(
    path: &Path,
    title: &str,
    note: Option<&str>,
    rows: &[T],
    max_rows: usize,
) -> Result<(), Box<dyn Error>>
where
    T: Tabled + Serialize + Clone,
{
    write_csv(path, rows)?;
    preview_table(title, note, rows, max_rows);
    println!("(Full table exported to {})\n", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CountRow;

    fn row(value: &str) -> CountRow {
        CountRow {
            rank: "1".to_string(),
            value: value.to_string(),
            rejections: "3".to_string(),
            share: "100.00".to_string(),
        }
    }

    #[test]
    fn renders_markdown_or_placeholder() {
        let table = render_table(&[row("Label missing"), row("Height")], 1);
        assert!(table.contains("| Rank"));
        assert!(table.contains("Label missing"));
        assert!(!table.contains("Height |"));
        assert_eq!(render_table::<CountRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn writes_csv_with_renamed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        write_csv(&path, &[row("Label missing")]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Rank,Value,Rejections,Share"));
    }

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.json");
        write_json(&path, &serde_json::json!({"total": 3})).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"total\": 3"));
    }
}
