use crate::chart::ChartError;
use crate::filter::{BucketId, FilterResults, MetricId};

/// Primary and error counts aligned on the primary metric's buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedSeries {
    pub buckets: Vec<BucketId>,
    pub primary: Vec<i64>,
    pub secondary: Vec<i64>,
}

impl AlignedSeries {
    pub fn from_results(results: &FilterResults) -> Result<Self, ChartError> {
        let primary = match results.get(&MetricId::MATCHES) {
            Some(series) if !series.is_empty() => series,
            _ => return Err(ChartError::NoData),
        };
        let errors = results.get(&MetricId::ERRORS);

        // BTreeMap iteration is already ascending by bucket.
        let mut out = Self {
            buckets: Vec::with_capacity(primary.len()),
            primary: Vec::with_capacity(primary.len()),
            secondary: Vec::with_capacity(primary.len()),
        };
        for (bucket, count) in primary {
            out.buckets.push(*bucket);
            out.primary.push(*count);
            out.secondary
                .push(errors.and_then(|e| e.get(bucket)).copied().unwrap_or(0));
        }

        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Keep the oldest `width - 1` points when the series is wider than `width`.
    /// Returns whether anything was dropped.
    pub fn truncate_to_width(&mut self, width: usize) -> bool {
        if self.len() <= width {
            return false;
        }
        let keep = width.saturating_sub(1).max(1);
        self.buckets.truncate(keep);
        self.primary.truncate(keep);
        self.secondary.truncate(keep);
        true
    }

    pub fn min(&self) -> i64 {
        self.primary.iter().copied().min().unwrap_or(0)
    }

    pub fn max(&self) -> i64 {
        self.primary.iter().copied().max().unwrap_or(0)
    }
}
