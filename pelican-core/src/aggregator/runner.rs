use crate::aggregator::unit::ProcessingUnit;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Drive a unit from a channel of events and a fixed tick.
///
/// Events and ticks are delivered from this one thread, never interleaved.
/// Returns once every sender is dropped, after calling `on_stop`.
pub fn run_unit<U: ProcessingUnit>(unit: &mut U, events: Receiver<U::Event>, tick: Duration) {
    unit.on_start();

    let mut next_tick = Instant::now() + tick;

    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());

        match events.recv_timeout(wait) {
            Ok(event) => unit.on_event(event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        if now >= next_tick {
            unit.on_tick();
            next_tick += tick;
            // Skip ticks missed while blocked in a slow flush.
            if next_tick <= now {
                next_tick = now + tick;
            }
        }
    }

    unit.on_stop();
}
