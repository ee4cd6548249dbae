//! Output formatting for command results.
//!
//! Supports multiple output formats: table (human-readable), JSON, and toon.

use clap::ValueEnum;
use serde::Serialize;

use crate::db::{Row, Value};
use crate::query::Fetched;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Token-efficient toon format
    Toon,
}

/// Trait for types that can be formatted for output
pub trait Outputable: Serialize {
    /// Format as a human-readable table
    fn to_table(&self) -> String;

    /// Format according to the specified output format
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            OutputFormat::Toon => {
                let json_value = serde_json::to_value(self).unwrap_or_default();
                toon::encode(&json_value, None)
            }
        }
    }
}

/// Render a header plus rows as left-aligned columns separated by two spaces.
pub fn format_grid(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(header)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.iter().map(|r| render(r.as_slice())));
    lines.join("\n")
}

fn rows_grid(rows: &[Row]) -> String {
    let header = rows.first().map(|r| r.columns().to_vec()).unwrap_or_default();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.values().iter().map(Value::display).collect())
        .collect();
    format_grid(&header, &cells)
}

/// Table rendering of fetched rows in any shape.
pub fn format_fetched(fetched: &Fetched) -> String {
    if fetched.is_empty() {
        return "No rows.".to_string();
    }
    match fetched {
        Fetched::Assoc(rows) => rows_grid(rows),
        Fetched::Num(rows) => {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            let header: Vec<String> = (0..width).map(|i| i.to_string()).collect();
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|r| r.iter().map(Value::display).collect())
                .collect();
            format_grid(&header, &cells)
        }
        Fetched::Both(rows) => rows
            .iter()
            .enumerate()
            .map(|(i, entries)| {
                let pairs: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| match key {
                        crate::db::ColumnKey::Name(name) => format!("{name}={}", value.display()),
                        crate::db::ColumnKey::Index(idx) => format!("[{idx}]={}", value.display()),
                    })
                    .collect();
                format!("{}: {}", i + 1, pairs.join(" "))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Fetched::Column(values) => values.iter().map(Value::display).collect::<Vec<_>>().join("\n"),
        Fetched::Group(groups) => groups
            .iter()
            .map(|(key, rows)| format!("{} ({}):\n{}", key.display(), rows.len(), rows_grid(rows)))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_format_grid_aligns_columns() {
        let header = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Taylor".to_string()],
            vec!["10".to_string(), "Bo".to_string()],
        ];
        assert_eq!(
            format_grid(&header, &rows),
            "id  name\n--  ------\n1   Taylor\n10  Bo"
        );
    }

    #[test]
    fn test_format_fetched_empty() {
        assert_eq!(format_fetched(&Fetched::Assoc(vec![])), "No rows.");
    }

    #[test]
    fn test_format_fetched_column() {
        let fetched = Fetched::Column(vec![Value::from("a"), Value::Null]);
        assert_eq!(format_fetched(&fetched), "a\nNULL");
    }

    #[test]
    fn test_format_fetched_group() {
        let columns: Arc<[String]> = vec!["team".to_string()].into();
        let fetched = Fetched::Group(vec![(
            Value::from("red"),
            vec![Row::new(columns, vec![Value::from("red")])],
        )]);
        assert_eq!(format_fetched(&fetched), "red (1):\nteam\n----\nred");
    }
}
