//! Terminal bar chart for a filter's match and error series.
//!
//! FilterResults
//! AlignedSeries (sorted, truncated to terminal width)
//! Chart (cell grid)
//! StyleRun (ANSI decoration)
//!

mod render;
mod series;
mod style;
mod terminal;


pub use render::{Cell, Chart};
pub use series::AlignedSeries;
pub use style::{Style, StyleRun};
pub use terminal::TerminalSize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("Metrics not available for this filter")]
    NoData,
}
