use crate::aggregator::clock::{Clock, SystemClock};
use crate::aggregator::key::AggregateKey;
use crate::aggregator::sink::FlushSink;
use crate::aggregator::unit::{MatchEvent, ProcessingUnit};
use crate::filter::{FilterId, ResultRecord};
use std::collections::{BTreeMap, HashMap};

/// Summary of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub batches: usize,
    pub records: usize,
    pub dropped_batches: usize,
}

/// Minute-bucketed counters for one processing unit.
///
/// Several units may run in parallel, each with its own table; the registry
/// sums whatever they send.
pub struct MetricAggregator<S, C = SystemClock> {
    table: HashMap<AggregateKey, i64>,
    sink: S,
    clock: C,
}

impl<S: FlushSink> MetricAggregator<S, SystemClock> {
    pub fn new(sink: S) -> Self {
        Self::with_clock(sink, SystemClock)
    }
}

impl<S: FlushSink, C: Clock> MetricAggregator<S, C> {
    pub fn with_clock(sink: S, clock: C) -> Self {
        Self {
            table: HashMap::new(),
            sink,
            clock,
        }
    }

    /// Number of distinct cells waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.table.len()
    }

    pub fn pending_value(&self, key: &AggregateKey) -> i64 {
        self.table.get(key).copied().unwrap_or(0)
    }

    pub fn record(&mut self, event: MatchEvent) {
        let key = AggregateKey::new(event.filter_id, event.metric, self.clock.current_bucket());
        let cell = self.table.entry(key).or_insert(0);
        *cell = cell.saturating_add(event.increment);
    }

    /// Send one batch per filter, then clear the table whatever the outcome.
    pub fn flush(&mut self) -> FlushReport {
        let mut report = FlushReport::default();
        if self.table.is_empty() {
            return report;
        }

        let mut per_filter: BTreeMap<FilterId, Vec<ResultRecord>> = BTreeMap::new();
        for (key, count) in self.table.drain() {
            per_filter
                .entry(key.filter_id)
                .or_default()
                .push(ResultRecord::new(key.metric, key.bucket, count));
        }

        for (filter_id, mut records) in per_filter {
            records.sort_by_key(|r| (r.metric, r.bucket));
            report.batches += 1;
            report.records += records.len();

            if let Err(e) = self.sink.deliver(&filter_id, &records) {
                report.dropped_batches += 1;
                tracing::warn!(
                    filter_id = %filter_id,
                    records = records.len(),
                    error = %e,
                    "failed to deliver batch, dropping"
                );
            }
        }

        tracing::debug!(
            batches = report.batches,
            records = report.records,
            dropped = report.dropped_batches,
            "flush complete"
        );
        report
    }
}

impl<S: FlushSink, C: Clock> ProcessingUnit for MetricAggregator<S, C> {
    type Event = MatchEvent;

    fn on_start(&mut self) {
        self.table.clear();
        tracing::info!("metric aggregator started");
    }

    fn on_event(&mut self, event: MatchEvent) {
        self.record(event);
    }

    fn on_tick(&mut self) {
        self.flush();
    }

    fn on_stop(&mut self) {
        let report = self.flush();
        tracing::info!(records = report.records, "metric aggregator stopped");
    }
}
