//! Terminal UI utilities.
//!
//! A small auto-sizing table drawn with Unicode box characters, used by
//! `kiln status`. Cells may carry ANSI colors; widths are measured on the
//! visible text.

use colored::*;
use console::{Alignment, measure_text_width, pad_str, truncate_str};

/// Column width never shrinks below this when fitting the terminal.
const MIN_COL: usize = 6;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    fn widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(measure_text_width(cell));
            }
        }

        // "  │" + " cell │" per column
        let overhead = 3 + 3 * widths.len();
        while overhead + widths.iter().sum::<usize>() > max_width {
            let Some(widest) = widths
                .iter_mut()
                .filter(|w| **w > MIN_COL)
                .max_by_key(|w| **w)
            else {
                break;
            };
            *widest -= 1;
        }
        widths
    }

    /// Render to lines without printing.
    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.widths(max_width);

        let rule = |left: &str, mid: &str, right: &str| {
            let cols: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, cols.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut s = String::from("  │");
            for (cell, &w) in cells.iter().zip(&widths) {
                let cut = truncate_str(cell, w, "…");
                let padded = pad_str(&cut, w, Alignment::Left, None).into_owned();
                if bold {
                    s.push_str(&format!(" {} │", padded.bold()));
                } else {
                    s.push_str(&format!(" {} │", padded));
                }
            }
            s
        };

        let mut out = vec![rule("┌", "┬", "┐"), line(&self.headers, true), rule("├", "┼", "┤")];
        out.extend(self.rows.iter().map(|row| line(row, false)));
        out.push(rule("└", "┴", "┘"));
        out
    }

    pub fn print(&self) {
        let (_, cols) = console::Term::stdout().size();
        for line in self.render(cols as usize) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shape() {
        let mut table = Table::new(&["Group", "Stale"]);
        table.add_row(vec!["ninja".into(), "3".into()]);
        table.add_row(vec!["short row".into()]);
        let lines = table.render(80);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("  ┌"));
        assert!(lines[3].contains("ninja"));
        let widths: Vec<usize> = lines.iter().map(|l| measure_text_width(l)).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_render_fits_narrow_terminal() {
        let mut table = Table::new(&["Group", "Library"]);
        table.add_row(vec!["luajit".into(), "build/some/very/long/path/libluajit.a".into()]);
        let lines = table.render(30);
        assert!(lines.iter().all(|l| measure_text_width(l) <= 30));
        assert!(lines[3].contains('…'));
    }
}
