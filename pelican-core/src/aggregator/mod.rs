//! Per-unit metric aggregation.
//!
//! match events
//! MetricAggregator (AggregateKey -> count)
//! tick
//! FlushSink (one batch per filter)
//!

mod clock;
mod key;
mod metric_aggregator;
mod runner;
mod sink;
mod unit;

#[cfg(test)]
mod tests;

pub use clock::{Clock, SystemClock};
pub use key::AggregateKey;
pub use metric_aggregator::{FlushReport, MetricAggregator};
pub use runner::run_unit;
pub use sink::{DeliveryError, FlushSink, HttpFlushSink, TracingSink};
pub use unit::{MatchEvent, ProcessingUnit};
