use crate::aggregator::{ProcessingUnit, run_unit};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct CountingUnit {
    started: bool,
    stopped: bool,
    events: Vec<u32>,
    ticks: usize,
}

impl ProcessingUnit for CountingUnit {
    type Event = u32;

    fn on_start(&mut self) {
        self.started = true;
    }

    fn on_event(&mut self, event: u32) {
        self.events.push(event);
    }

    fn on_tick(&mut self) {
        self.ticks += 1;
    }

    fn on_stop(&mut self) {
        self.stopped = true;
    }
}

#[test]
fn delivers_events_in_order_and_stops_on_disconnect() {
    let (tx, rx) = mpsc::channel();
    for i in 0..5 {
        tx.send(i).unwrap();
    }
    drop(tx);

    let mut unit = CountingUnit::default();
    run_unit(&mut unit, rx, Duration::from_secs(60));

    assert!(unit.started);
    assert!(unit.stopped);
    assert_eq!(unit.events, vec![0, 1, 2, 3, 4]);
    assert_eq!(unit.ticks, 0);
}

#[test]
fn ticks_fire_while_idle() {
    let (tx, rx) = mpsc::channel::<u32>();

    let handle = thread::spawn(move || {
        let mut unit = CountingUnit::default();
        run_unit(&mut unit, rx, Duration::from_millis(10));
        unit
    });

    thread::sleep(Duration::from_millis(100));
    drop(tx);

    let unit = handle.join().unwrap();
    assert!(unit.ticks >= 2, "ticks = {}", unit.ticks);
    assert!(unit.stopped);
}
