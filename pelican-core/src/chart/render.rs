use crate::chart::series::AlignedSeries;
use crate::chart::style::{Style, StyleRun};
use crate::chart::terminal::TerminalSize;
use crate::chart::ChartError;
use crate::filter::FilterResults;

const MAX_ROWS: usize = 20;
const VERTICAL_SEP: char = '|';
const HORIZONTAL_SEP: char = '_';
const DATA_GLYPH: char = 'o';
const ERROR_GLYPH: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Blank,
    VerticalAxis,
    HorizontalAxis,
    Data,
    Error,
}

impl Cell {
    fn glyph(self) -> char {
        match self {
            Cell::Blank => ' ',
            Cell::VerticalAxis => VERTICAL_SEP,
            Cell::HorizontalAxis => HORIZONTAL_SEP,
            Cell::Data => DATA_GLYPH,
            Cell::Error => ERROR_GLYPH,
        }
    }

    /// `None` leaves the active style untouched.
    fn style(self) -> Option<Style> {
        match self {
            Cell::Blank => None,
            Cell::VerticalAxis | Cell::HorizontalAxis => Some(Style::Reset),
            Cell::Data => Some(Style::Normal),
            Cell::Error => Some(Style::Error),
        }
    }
}

/// Laid-out chart: a grid of cells from the top row down to the axis row.
#[derive(Debug, Clone)]
pub struct Chart {
    rows: usize,
    col_pad: usize,
    min: i64,
    max: i64,
    truncated: bool,
    series: AlignedSeries,
    grid: Vec<Vec<Cell>>,
}

impl Chart {
    pub fn from_results(results: &FilterResults, term: TerminalSize) -> Result<Self, ChartError> {
        let series = AlignedSeries::from_results(results)?;
        Ok(Self::layout(series, term))
    }

    pub fn layout(mut series: AlignedSeries, term: TerminalSize) -> Self {
        let width = term.width.max(2);

        let truncated = series.truncate_to_width(width);
        if truncated {
            tracing::warn!(width, points = series.len(), "truncating data to match terminal width");
        }

        let rows = MAX_ROWS.min(term.height.saturating_sub(4)).max(1);
        let columns = series.len();
        let col_pad = (width.max(columns) - columns) / columns;

        let min = series.min();
        let max = series.max();

        let mut grid = Vec::with_capacity(rows + 1);
        for level in (0..=rows).rev() {
            let t = threshold(level, rows, max);
            let line = (0..columns)
                .map(|col| {
                    if level == 0 {
                        Cell::HorizontalAxis
                    } else if col == 0 {
                        Cell::VerticalAxis
                    } else if series.primary[col] >= t {
                        if series.secondary[col] >= t {
                            Cell::Error
                        } else {
                            Cell::Data
                        }
                    } else {
                        Cell::Blank
                    }
                })
                .collect();
            grid.push(line);
        }

        Self {
            rows,
            col_pad,
            min,
            max,
            truncated,
            series,
            grid,
        }
    }

    /// Number of data rows above the axis.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.series.len()
    }

    pub fn column_padding(&self) -> usize {
        self.col_pad
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn series(&self) -> &AlignedSeries {
        &self.series
    }

    /// Minimum value a column needs to reach `level` (0 is the axis row).
    pub fn threshold(&self, level: usize) -> i64 {
        threshold(level, self.rows, self.max)
    }

    pub fn cell(&self, level: usize, column: usize) -> Cell {
        self.grid[self.rows - level][column]
    }

    /// Decorated output lines: data rows, axis row, then the trailing blank line.
    pub fn lines(&self) -> Vec<String> {
        let mut run = StyleRun::new();
        let mut lines = Vec::with_capacity(self.rows + 2);

        for (idx, row) in self.grid.iter().enumerate() {
            let is_axis = idx == self.rows;
            let mut out = String::new();
            let mut glyph = [0u8; 4];

            for cell in row {
                let text = cell.glyph().encode_utf8(&mut glyph);
                match cell.style() {
                    Some(style) => run.push(&mut out, style, text),
                    None => run.push_plain(&mut out, text),
                }

                if is_axis {
                    let pad = HORIZONTAL_SEP.to_string().repeat(self.col_pad);
                    run.push(&mut out, Style::Reset, &pad);
                } else {
                    run.push_plain(&mut out, &" ".repeat(self.col_pad));
                }
            }
            lines.push(out);
        }

        let mut tail = String::new();
        run.finish(&mut tail);
        lines.push(tail);

        lines
    }

    pub fn render(&self) -> String {
        let mut out = self.lines().join("\n");
        out.push('\n');
        out
    }
}

fn threshold(level: usize, rows: usize, max: i64) -> i64 {
    (level as f64 / (rows as f64 / max as f64)) as i64
}
