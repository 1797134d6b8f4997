use crate::filter::{FilterId, MetricId};

/// A filter hit emitted by the matching stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    pub filter_id: FilterId,
    pub metric: MetricId,
    pub increment: i64,
}

impl MatchEvent {
    pub fn new(filter_id: FilterId, metric: MetricId, increment: i64) -> Self {
        Self {
            filter_id,
            metric,
            increment,
        }
    }
}

/// Lifecycle of one stream-processing unit.
///
/// The host calls these hooks one at a time; an implementation never sees an
/// event and a tick concurrently and needs no internal locking.
pub trait ProcessingUnit {
    type Event;

    fn on_start(&mut self) {}

    fn on_event(&mut self, event: Self::Event);

    fn on_tick(&mut self);

    fn on_stop(&mut self) {}
}
