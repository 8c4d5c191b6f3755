//! Event queue for the event-driven strategy.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Arrival,
    TransmitStart,
    TransmitEnd,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Arrival => write!(f, "Arrival"),
            EventType::TransmitStart => write!(f, "Start TX"),
            EventType::TransmitEnd => write!(f, "End TX"),
        }
    }
}

/// An event scheduled at a simulated instant.
///
/// `sequence` only orders events that share a timestamp, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    time: f64,
    kind: EventType,
    station_id: usize,
    sequence: u64,
}

impl Event {
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn kind(&self) -> EventType {
        self.kind
    }

    pub fn station_id(&self) -> usize {
        self.station_id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max heap: reverse both keys so the earliest pops first.
        match other.time.total_cmp(&self.time) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ordering => ordering,
        }
    }
}

/// Min-heap of events keyed by `(time, sequence)`.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Event>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event and return the sequence number it was given.
    pub fn schedule(&mut self, time: f64, kind: EventType, station_id: usize) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Event {
            time,
            kind,
            station_id,
            sequence,
        });
        sequence
    }

    pub fn pop_earliest(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn peek_earliest(&self) -> Option<&Event> {
        self.heap.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Number of events ever scheduled.
    pub fn scheduled_total(&self) -> u64 {
        self.next_sequence
    }
}
