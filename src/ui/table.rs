//! Table rendering for formatted output.

use console::{measure_text_width, pad_str, Alignment};

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// A box-drawing table.
///
/// Widths are measured in terminal columns with ANSI styling ignored, so
/// styled cells line up with plain ones.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given headers.
    pub fn new<S: Into<String>>(headers: Vec<S>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let column_widths = headers.iter().map(|h| measure_text_width(h)).collect();
        let align = vec![Align::Left; headers.len()];

        Self {
            headers,
            align,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Set the alignment of a column. Out-of-range columns are ignored.
    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.align.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Right-align each listed column.
    pub fn numeric(mut self, columns: &[usize]) -> Self {
        for &column in columns {
            self = self.align(column, Align::Right);
        }
        self
    }

    /// Add a row to the table.
    pub fn add_row<S: Into<String>>(&mut self, row: Vec<S>) {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        for (width, cell) in self.column_widths.iter_mut().zip(&row) {
            *width = (*width).max(measure_text_width(cell));
        }
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a string.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.render_border('┌', '┬', '┐'));
        lines.push(self.render_row(&self.headers, false));
        lines.push(self.render_border('├', '┼', '┤'));
        for row in &self.rows {
            lines.push(self.render_row(row, true));
        }
        lines.push(self.render_border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let inner: Vec<String> = self
            .column_widths
            .iter()
            .map(|width| "─".repeat(width + 2))
            .collect();
        format!("{}{}{}", left, inner.join(&mid.to_string()), right)
    }

    fn render_row(&self, row: &[String], aligned: bool) -> String {
        let mut s = String::from("│");
        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let alignment = match (aligned, self.align.get(i)) {
                (true, Some(Align::Right)) => Alignment::Right,
                _ => Alignment::Left,
            };
            s.push_str(&format!(" {} │", pad_str(cell, *width, alignment, None)));
        }
        s
    }
}
