//! Turns raw log lines into match events for the registered filters.

use crate::aggregator::MatchEvent;
use crate::filter::{FilterId, FilterSummary, MetricId};
use regex::Regex;

struct CompiledFilter {
    id: FilterId,
    regex: Regex,
}

pub struct LineMatcher {
    filters: Vec<CompiledFilter>,
    error_pattern: Regex,
}

impl LineMatcher {
    pub fn new(error_pattern: Regex) -> Self {
        Self {
            filters: Vec::new(),
            error_pattern,
        }
    }

    /// Replace the active filter set. Filters whose pattern does not compile are skipped.
    pub fn load(&mut self, filters: &[FilterSummary]) {
        self.filters = filters
            .iter()
            .filter_map(|f| match Regex::new(&f.pattern) {
                Ok(regex) => Some(CompiledFilter {
                    id: f.id.clone(),
                    regex,
                }),
                Err(e) => {
                    tracing::warn!(filter_id = %f.id, error = %e, "skipping filter with invalid pattern");
                    None
                }
            })
            .collect();

        tracing::info!(filters = self.filters.len(), "filter set loaded");
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// One match event per matching filter, plus an error event when the line
    /// also looks like an error.
    pub fn match_line(&self, line: &str) -> Vec<MatchEvent> {
        let mut out = Vec::new();
        let mut is_error = None;

        for f in &self.filters {
            if !f.regex.is_match(line) {
                continue;
            }
            out.push(MatchEvent::new(f.id.clone(), MetricId::MATCHES, 1));

            if *is_error.get_or_insert_with(|| self.error_pattern.is_match(line)) {
                out.push(MatchEvent::new(f.id.clone(), MetricId::ERRORS, 1));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(id: &str, pattern: &str) -> FilterSummary {
        FilterSummary {
            id: FilterId::from(id),
            name: id.to_owned(),
            owner: "o".to_owned(),
            pattern: pattern.to_owned(),
        }
    }

    fn matcher() -> LineMatcher {
        let mut m = LineMatcher::new(Regex::new(r"(?i)\berror\b").unwrap());
        m.load(&[summary("nginx", "nginx"), summary("db", "postgres")]);
        m
    }

    #[test]
    fn counts_matches_per_filter() {
        let events = matcher().match_line("nginx: GET /index.html 200");
        assert_eq!(
            events,
            vec![MatchEvent::new(FilterId::from("nginx"), MetricId::MATCHES, 1)]
        );
    }

    #[test]
    fn error_lines_add_error_metric() {
        let events = matcher().match_line("postgres ERROR: deadlock detected");
        assert_eq!(
            events,
            vec![
                MatchEvent::new(FilterId::from("db"), MetricId::MATCHES, 1),
                MatchEvent::new(FilterId::from("db"), MetricId::ERRORS, 1),
            ]
        );
    }

    #[test]
    fn unmatched_lines_emit_nothing() {
        assert!(matcher().match_line("error in kernel").is_empty());
    }

    #[test]
    fn invalid_patterns_are_skipped() {
        let mut m = LineMatcher::new(Regex::new("error").unwrap());
        m.load(&[summary("bad", "(oops"), summary("good", "ok")]);
        assert_eq!(m.filter_count(), 1);
    }
}
