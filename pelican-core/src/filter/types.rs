use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Width of a result bucket in seconds.
pub const BUCKET_SECS: i64 = 60;

#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(pub String);

impl FilterId {
    /// Fresh, never reused identifier.
    pub fn generate() -> Self {
        FilterId(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterId {
    fn from(s: &str) -> Self {
        FilterId(s.to_owned())
    }
}

impl From<String> for FilterId {
    fn from(s: String) -> Self {
        FilterId(s)
    }
}

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(pub u16);

impl MetricId {
    pub const MATCHES: MetricId = MetricId(1);
    pub const ERRORS: MetricId = MetricId(2);
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp floored to a minute boundary.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketId(pub i64);

impl BucketId {
    pub fn from_unix(ts: i64) -> Self {
        BucketId(ts - ts.rem_euclid(BUCKET_SECS))
    }

    pub fn from_system_time(t: SystemTime) -> Self {
        let ts = match t.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Self::from_unix(ts)
    }

    pub fn is_aligned(&self) -> bool {
        self.0.rem_euclid(BUCKET_SECS) == 0
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type Series = BTreeMap<BucketId, i64>;
pub type FilterResults = BTreeMap<MetricId, Series>;

/// One additive increment for a `(metric, bucket)` cell of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRecord {
    pub metric: MetricId,
    pub bucket: BucketId,
    pub delta: i64,
}

impl ResultRecord {
    pub fn new(metric: MetricId, bucket: BucketId, delta: i64) -> Self {
        Self {
            metric,
            bucket,
            delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: FilterId,
    pub name: String,
    pub owner: String,
    pub pattern: String,
    #[serde(default)]
    pub results: FilterResults,
}

impl Filter {
    pub fn summary(&self) -> FilterSummary {
        FilterSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            owner: self.owner.clone(),
            pattern: self.pattern.clone(),
        }
    }

    /// Add a record to its cell. A sum outside `i64` leaves the cell untouched
    /// and returns false.
    pub(crate) fn apply(&mut self, record: &ResultRecord) -> bool {
        let cell = self
            .results
            .entry(record.metric)
            .or_default()
            .entry(record.bucket)
            .or_insert(0);
        match cell.checked_add(record.delta) {
            Some(sum) => {
                *cell = sum;
                true
            }
            None => false,
        }
    }

    /// Stored value for a cell; absent cells read as zero.
    pub fn result(&self, metric: MetricId, bucket: BucketId) -> i64 {
        self.results
            .get(&metric)
            .and_then(|series| series.get(&bucket))
            .copied()
            .unwrap_or(0)
    }
}

/// A filter as shipped by listings: everything except the result payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub id: FilterId,
    pub name: String,
    pub owner: String,
    pub pattern: String,
}
