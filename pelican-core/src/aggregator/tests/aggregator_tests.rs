use crate::aggregator::{
    AggregateKey, Clock, DeliveryError, FlushSink, MatchEvent, MetricAggregator, ProcessingUnit,
};
use crate::filter::{BucketId, FilterId, MetricId, ResultRecord};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

//-----------------------------------------------------------------------------
// Test helpers
//-----------------------------------------------------------------------------

#[derive(Clone)]
struct ManualClock(Arc<Mutex<SystemTime>>);

impl ManualClock {
    fn at(secs: u64) -> Self {
        Self(Arc::new(Mutex::new(UNIX_EPOCH + Duration::from_secs(secs))))
    }

    fn set(&self, secs: u64) {
        *self.0.lock().unwrap() = UNIX_EPOCH + Duration::from_secs(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.0.lock().unwrap()
    }
}

type Delivered = Arc<Mutex<Vec<(FilterId, Vec<ResultRecord>)>>>;

#[derive(Clone, Default)]
struct RecordingSink {
    delivered: Delivered,
    fail_for: Option<FilterId>,
}

impl FlushSink for RecordingSink {
    fn deliver(&self, filter_id: &FilterId, records: &[ResultRecord]) -> Result<(), DeliveryError> {
        if self.fail_for.as_ref() == Some(filter_id) {
            return Err(DeliveryError::Status(503));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((filter_id.clone(), records.to_vec()));
        Ok(())
    }
}

fn hit(filter: &str, metric: MetricId, increment: i64) -> MatchEvent {
    MatchEvent::new(FilterId::from(filter), metric, increment)
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------

#[test]
fn events_accumulate_per_key() {
    let clock = ManualClock::at(125);
    let mut agg = MetricAggregator::with_clock(RecordingSink::default(), clock.clone());

    agg.on_event(hit("a", MetricId::MATCHES, 1));
    agg.on_event(hit("a", MetricId::MATCHES, 2));
    clock.set(179);
    agg.on_event(hit("a", MetricId::MATCHES, 4));
    agg.on_event(hit("a", MetricId::ERRORS, 1));
    clock.set(180);
    agg.on_event(hit("a", MetricId::MATCHES, 1));

    assert_eq!(agg.pending(), 3);
    assert_eq!(
        agg.pending_value(&AggregateKey::new(
            FilterId::from("a"),
            MetricId::MATCHES,
            BucketId(120)
        )),
        7
    );
    assert_eq!(
        agg.pending_value(&AggregateKey::new(
            FilterId::from("a"),
            MetricId::MATCHES,
            BucketId(180)
        )),
        1
    );
}

#[test]
fn tick_sends_one_batch_per_filter_and_clears() {
    let sink = RecordingSink::default();
    let delivered = sink.delivered.clone();
    let mut agg = MetricAggregator::with_clock(sink, ManualClock::at(600));

    agg.on_event(hit("b", MetricId::MATCHES, 1));
    agg.on_event(hit("a", MetricId::ERRORS, 2));
    agg.on_event(hit("a", MetricId::MATCHES, 3));
    agg.on_tick();

    assert_eq!(agg.pending(), 0);
    let delivered = delivered.lock().unwrap();
    assert_eq!(
        *delivered,
        vec![
            (
                FilterId::from("a"),
                vec![
                    ResultRecord::new(MetricId::MATCHES, BucketId(600), 3),
                    ResultRecord::new(MetricId::ERRORS, BucketId(600), 2),
                ]
            ),
            (
                FilterId::from("b"),
                vec![ResultRecord::new(MetricId::MATCHES, BucketId(600), 1)]
            ),
        ]
    );
}

#[test]
fn empty_tick_sends_nothing() {
    let sink = RecordingSink::default();
    let delivered = sink.delivered.clone();
    let mut agg = MetricAggregator::with_clock(sink, ManualClock::at(0));

    let report = agg.flush();

    assert_eq!(report.batches, 0);
    assert!(delivered.lock().unwrap().is_empty());
}

#[test]
fn failed_delivery_is_dropped_not_retried() {
    let sink = RecordingSink {
        fail_for: Some(FilterId::from("down")),
        ..Default::default()
    };
    let delivered = sink.delivered.clone();
    let mut agg = MetricAggregator::with_clock(sink, ManualClock::at(60));

    agg.on_event(hit("down", MetricId::MATCHES, 5));
    agg.on_event(hit("up", MetricId::MATCHES, 1));
    let report = agg.flush();

    assert_eq!(report.batches, 2);
    assert_eq!(report.dropped_batches, 1);
    assert_eq!(agg.pending(), 0);

    // Nothing carried over into the next flush.
    let second = agg.flush();
    assert_eq!(second.batches, 0);
    assert_eq!(delivered.lock().unwrap().len(), 1);
}

#[test]
fn stop_flushes_remaining_counts() {
    let sink = RecordingSink::default();
    let delivered = sink.delivered.clone();
    let mut agg = MetricAggregator::with_clock(sink, ManualClock::at(60));

    agg.on_start();
    agg.on_event(hit("a", MetricId::MATCHES, 1));
    agg.on_stop();

    assert_eq!(delivered.lock().unwrap().len(), 1);
}

#[test]
fn counters_saturate_instead_of_wrapping() {
    let mut agg = MetricAggregator::with_clock(RecordingSink::default(), ManualClock::at(60));

    agg.on_event(hit("a", MetricId::MATCHES, i64::MAX));
    agg.on_event(hit("a", MetricId::MATCHES, 1));

    assert_eq!(
        agg.pending_value(&AggregateKey::new(
            FilterId::from("a"),
            MetricId::MATCHES,
            BucketId(60)
        )),
        i64::MAX
    );
}
