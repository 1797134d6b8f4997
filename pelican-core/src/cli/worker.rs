use crate::aggregator::{FlushSink, HttpFlushSink, MatchEvent, MetricAggregator, TracingSink, run_unit};
use crate::client::RegistryClient;
use crate::conf::WorkerConfig;
use crate::matcher::LineMatcher;
use anyhow::{Context, Result};
use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

/// Match stdin lines against the registry's filters and flush counts on every tick.
///
/// With `dry_run` the batches are logged instead of sent. Returns when stdin closes.
pub fn run_worker(config: WorkerConfig, dry_run: bool) -> Result<()> {
    let creds = config.supervisor.credentials();
    let client = Arc::new(
        RegistryClient::new(&config.supervisor.url, &creds, config.flush.timeout())
            .context("failed to build registry client")?,
    );

    match client.health() {
        Ok(banner) => tracing::info!(supervisor = client.base_url(), banner = %banner, "supervisor reachable"),
        Err(e) => tracing::warn!(
            supervisor = client.base_url(),
            error = %e,
            "supervisor not reachable; batches are dropped until it answers"
        ),
    }

    let matcher = Arc::new(RwLock::new(LineMatcher::new(config.matcher.compile()?)));
    refresh_filters(&client, &matcher);

    // Dropped on return, which ends the refresh thread.
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let refresher = thread::spawn({
        let client = client.clone();
        let matcher = matcher.clone();
        let every = config.matcher.refresh_interval();
        move || loop {
            match stop_rx.recv_timeout(every) {
                Err(RecvTimeoutError::Timeout) => refresh_filters(&client, &matcher),
                _ => break,
            }
        }
    });

    let (tx, rx) = mpsc::channel::<MatchEvent>();

    // Reader thread: stdin -> match -> send(MatchEvent)
    let reader = thread::spawn({
        let matcher = matcher.clone();
        move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines().map_while(Result::ok) {
                let events = match matcher.read() {
                    Ok(m) => m.match_line(&line),
                    Err(poisoned) => poisoned.into_inner().match_line(&line),
                };
                for event in events {
                    // If receiver is gone, stop early.
                    if tx.send(event).is_err() {
                        return;
                    }
                }
            }
            // tx is dropped here, which will disconnect rx.
        }
    });

    let tick = config.flush.tick();
    if dry_run {
        aggregate(TracingSink, rx, tick);
    } else {
        let sink = HttpFlushSink::new(&config.supervisor.url, &creds, config.flush.timeout())
            .context("failed to build flush sink")?;
        aggregate(sink, rx, tick);
    }

    let _ = reader.join();
    drop(stop_tx);
    let _ = refresher.join();

    Ok(())
}

fn aggregate<S: FlushSink>(sink: S, rx: mpsc::Receiver<MatchEvent>, tick: Duration) {
    let mut aggregator = MetricAggregator::new(sink);
    run_unit(&mut aggregator, rx, tick);
}

/// Reload filter definitions. On failure the previous set stays active.
fn refresh_filters(client: &RegistryClient, matcher: &RwLock<LineMatcher>) {
    match client.list() {
        Ok(filters) => {
            let mut guard = match matcher.write() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.load(&filters);
            tracing::debug!(filters = guard.filter_count(), "filters refreshed");
        }
        Err(e) => {
            tracing::warn!(
                supervisor = client.base_url(),
                error = %e,
                "filter refresh failed; keeping previous filters"
            );
        }
    }
}
