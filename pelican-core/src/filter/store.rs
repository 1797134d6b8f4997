use crate::filter::{Filter, FilterId, FilterResults, FilterSummary, RegistryError, ResultRecord};
use dashmap::DashMap;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared table of filter definitions and their accumulated results.
///
/// Each filter lives behind its shard lock, so a merge batch is applied while
/// holding the write guard for that filter and readers only ever clone a
/// fully-applied value. Unrelated filters on other shards proceed in parallel.
#[derive(Debug, Default)]
pub struct FilterStore {
    filters: DashMap<FilterId, Filter>,

    /// Bumped on every mutation; the snapshot task compares it to skip idle saves.
    generation: AtomicU64,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from previously persisted filters.
    pub fn from_filters(filters: impl IntoIterator<Item = Filter>) -> Self {
        let store = Self::new();
        for filter in filters {
            store.filters.insert(filter.id.clone(), filter);
        }
        store
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Registry operations
impl FilterStore {
    pub fn create(&self, name: &str, owner: &str, pattern: &str) -> Result<FilterId, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::validation("Please provide a name"));
        }
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(RegistryError::validation("Please provide a regex"));
        }
        if let Err(e) = Regex::new(pattern) {
            return Err(RegistryError::validation(format!("Invalid regex: {e}")));
        }

        let id = FilterId::generate();
        self.filters.insert(
            id.clone(),
            Filter {
                id: id.clone(),
                name: name.to_owned(),
                owner: owner.to_owned(),
                pattern: pattern.to_owned(),
                results: FilterResults::new(),
            },
        );
        self.bump();

        tracing::info!(filter_id = %id, name, owner, "filter created");
        Ok(id)
    }

    pub fn get(&self, id: &FilterId) -> Result<Filter, RegistryError> {
        self.filters
            .get(id)
            .map(|f| f.value().clone())
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// All filters without their result payload, ordered by name then id.
    pub fn list(&self) -> Vec<FilterSummary> {
        let mut out: Vec<FilterSummary> = self.filters.iter().map(|f| f.summary()).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// Full copies of every filter, used for persistence.
    pub fn export(&self) -> Vec<Filter> {
        let mut out: Vec<Filter> = self.filters.iter().map(|f| f.value().clone()).collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Returns whether a filter was removed. Deleting an absent id is not an error.
    pub fn delete(&self, id: &FilterId) -> bool {
        let removed = self.filters.remove(id).is_some();
        if removed {
            self.bump();
            tracing::info!(filter_id = %id, "filter deleted");
        }
        removed
    }

    /// Add every record to the filter's results and return how many were applied.
    /// Records whose sum would overflow are skipped.
    pub fn merge_results(
        &self,
        id: &FilterId,
        records: &[ResultRecord],
    ) -> Result<usize, RegistryError> {
        let mut filter = self
            .filters
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;

        let mut applied = 0;
        for record in records {
            if filter.apply(record) {
                applied += 1;
            } else {
                tracing::warn!(
                    filter_id = %id,
                    metric = %record.metric,
                    bucket = %record.bucket,
                    delta = record.delta,
                    "result would overflow, record skipped"
                );
            }
        }
        drop(filter);

        if applied > 0 {
            self.bump();
        }

        tracing::debug!(filter_id = %id, applied, "results merged");
        Ok(applied)
    }
}
