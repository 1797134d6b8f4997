use crate::filter::BucketId;
use std::time::SystemTime;

/// Wall-clock source for bucketing events.
pub trait Clock {
    fn now(&self) -> SystemTime;

    fn current_bucket(&self) -> BucketId {
        BucketId::from_system_time(self.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
