//! Table rendering utilities for CLI outputs.
//! Widths are measured in terminal columns, so accented or CJK student
//! names stay aligned.

use unicode_width::UnicodeWidthStr;

pub struct Column {
    pub header: String,
    pub width: usize,
}

impl Column {
    pub fn new(header: &str, width: usize) -> Self {
        Self {
            header: header.to_string(),
            width,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

fn pad_cell(out: &mut String, value: &str, width: usize) {
    out.push_str(value);
    let used = UnicodeWidthStr::width(value);
    out.push_str(&" ".repeat(width.saturating_sub(used) + 1));
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Grow every column to fit its widest cell.
    pub fn fit(&mut self) {
        for (i, col) in self.columns.iter_mut().enumerate() {
            let widest = self
                .rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| UnicodeWidthStr::width(c.as_str()))
                .max()
                .unwrap_or(0);
            col.width = col
                .width
                .max(widest)
                .max(UnicodeWidthStr::width(col.header.as_str()));
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        // Header
        for col in &self.columns {
            pad_cell(&mut out, &col.header, col.width);
        }
        out.push('\n');

        // Rows
        for row in &self.rows {
            for (i, col) in self.columns.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(&mut out, cell, col.width);
            }
            out.push('\n');
        }

        out
    }
}
