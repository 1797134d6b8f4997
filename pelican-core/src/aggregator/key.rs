use crate::filter::{BucketId, FilterId, MetricId};

/// Identity of one accumulation cell inside a processing unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregateKey {
    pub filter_id: FilterId,
    pub metric: MetricId,
    pub bucket: BucketId,
}

impl AggregateKey {
    pub fn new(filter_id: FilterId, metric: MetricId, bucket: BucketId) -> Self {
        Self {
            filter_id,
            metric,
            bucket,
        }
    }
}
