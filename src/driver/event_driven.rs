use crate::channel::Outcome;
use crate::config::SimConfig;
use crate::error::ConfigResult;
use crate::scheduler::{Event, EventQueue, EventType};

use super::{Contention, Driver};

/// Jumps from event to event; idle stretches of the horizon cost nothing.
#[derive(Debug)]
pub struct EventDriven {
    config: SimConfig,
    contention: Contention,
    queue: EventQueue,
    processed: u64,
}

impl EventDriven {
    pub fn new(config: SimConfig) -> ConfigResult<EventDriven> {
        let contention = Contention::new(&config)?;
        let mut queue = EventQueue::new();
        for station in contention.stations() {
            queue.schedule(station.next_arrival_time(), EventType::Arrival, station.get_id());
        }
        Ok(EventDriven {
            config,
            contention,
            queue,
            processed: 0,
        })
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Process the next event before the horizon. Returns false once the
    /// horizon is reached or the queue has drained.
    pub fn handle_next_event(&mut self) -> bool {
        let event = match self.queue.pop_earliest() {
            Some(event) => event,
            None => {
                tracing::debug!(processed = self.processed, "event queue drained before horizon");
                return false;
            }
        };
        if event.time() >= self.config.horizon() {
            return false;
        }

        self.processed += 1;
        tracing::trace!(time = event.time(), kind = %event.kind(), station = event.station_id(), "event");
        match event.kind() {
            EventType::Arrival => self.on_arrival(&event),
            EventType::TransmitStart => self.on_transmit_start(&event),
            EventType::TransmitEnd => self.on_transmit_end(&event),
        }
        true
    }

    fn on_arrival(&mut self, event: &Event) {
        let now = event.time();
        let id = event.station_id();
        let station = self.contention.station_mut(id);
        if station.has_packet() {
            // Held back until the current packet leaves, see `reschedule`.
            return;
        }
        station.advance_arrival(now);
        if !station.has_packet() {
            return;
        }
        let next_arrival = station.next_arrival_time();
        let transmit_at = station.next_transmission_time();
        self.queue.schedule(next_arrival, EventType::Arrival, id);
        self.queue.schedule(transmit_at, EventType::TransmitStart, id);
    }

    fn on_transmit_start(&mut self, event: &Event) {
        let now = event.time();
        if self.contention.window_closed(now) {
            let outcome = self.contention.resolve(now);
            self.reschedule(outcome, now);
        }
        self.contention.offer(event.station_id(), now);
        let end = now + self.config.frame_duration();
        self.queue.schedule(end, EventType::TransmitEnd, event.station_id());
    }

    fn on_transmit_end(&mut self, event: &Event) {
        let now = event.time();
        if self.contention.window_closed(now) {
            let outcome = self.contention.resolve(now);
            self.reschedule(outcome, now);
        }
    }

    fn reschedule(&mut self, outcome: Outcome, now: f64) {
        match outcome {
            Outcome::Idle => {}
            Outcome::Success(id) => {
                // The next arrival is already queued unless it fell due while
                // this packet was still held.
                if self.contention.stations()[id].next_arrival_time() <= now {
                    self.queue.schedule(now, EventType::Arrival, id);
                }
            }
            Outcome::Collision(ids) => {
                for id in ids {
                    let retry_at = self.contention.stations()[id].next_transmission_time();
                    self.queue.schedule(retry_at, EventType::TransmitStart, id);
                }
            }
        }
    }
}

impl Driver for EventDriven {
    fn config(&self) -> &SimConfig {
        &self.config
    }

    fn contention(&self) -> &Contention {
        &self.contention
    }

    fn iterations(&self) -> u64 {
        self.processed
    }

    fn run_to_horizon(&mut self) {
        while self.handle_next_event() {}
    }
}
